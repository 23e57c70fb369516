//! Posting form state.
//!
//! Holds the header fields and the dynamic list of journal lines, performs the
//! presence-only validation and tracks the submit cycle:
//! `Idle -> Submitting -> Idle` (reset on success, untouched on failure).

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::api::{Direction, Posting, TransactionRequest, TransactionResponse, TxType};

fn amount_input() -> &'static Regex {
    static AMOUNT_INPUT: OnceCell<Regex> = OnceCell::new();
    AMOUNT_INPUT.get_or_init(|| Regex::new(r"^-?\d*(\.\d*)?$").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ReferenceId,
    TxType,
    Description,
    Account(usize),
    Direction(usize),
    Amount(usize),
}

impl Field {
    pub fn is_text(&self) -> bool {
        matches!(self, Field::Description | Field::Account(_) | Field::Amount(_))
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Field::Account(i) | Field::Direction(i) | Field::Amount(i) => Some(*i),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostingLine {
    pub account_code: String,
    pub direction: Option<Direction>,
    pub amount: String,
}

impl PostingLine {
    fn with_direction(direction: Direction) -> Self {
        Self { direction: Some(direction), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingForm {
    pub reference_id: String,
    pub tx_type: TxType,
    pub description: String,
    pub lines: Vec<PostingLine>,
    pub focus: Field,
    pub errors: Vec<FieldError>,
    pub state: SubmitState,
    pub last_posted: Option<TransactionResponse>,
}

impl PostingForm {
    /// Initial values: one debit and one credit line, both empty.
    pub fn new(reference_id: String) -> Self {
        Self {
            reference_id,
            tx_type: TxType::default(),
            description: String::new(),
            lines: vec![
                PostingLine::with_direction(Direction::Debit),
                PostingLine::with_direction(Direction::Credit),
            ],
            focus: Field::TxType,
            errors: Vec::new(),
            state: SubmitState::Idle,
            last_posted: None,
        }
    }

    /// Back to initial values under a new reference id; the last posted
    /// result stays visible.
    pub fn reset(&mut self, reference_id: String) {
        let last_posted = self.last_posted.take();
        *self = Self::new(reference_id);
        self.last_posted = last_posted;
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    // Focus

    pub fn focus_order(&self) -> Vec<Field> {
        let mut order = vec![Field::TxType, Field::Description];
        for i in 0..self.lines.len() {
            order.extend([Field::Account(i), Field::Direction(i), Field::Amount(i)]);
        }
        order
    }

    pub fn focus_next(&mut self) {
        let order = self.focus_order();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(idx + 1) % order.len()];
    }

    pub fn focus_prev(&mut self) {
        let order = self.focus_order();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(idx + order.len() - 1) % order.len()];
    }

    // Editing

    /// Type into the focused text field. Returns false when the keystroke was
    /// refused (non-text field, or an amount that would stop looking numeric).
    pub fn insert_char(&mut self, c: char) -> bool {
        let focus = self.focus;
        let accepted = match focus {
            Field::Description => {
                self.description.push(c);
                true
            }
            Field::Account(i) => match self.lines.get_mut(i) {
                Some(line) => {
                    line.account_code.push(c);
                    true
                }
                None => false,
            },
            Field::Amount(i) => match self.lines.get_mut(i) {
                Some(line) => {
                    let mut candidate = line.amount.clone();
                    candidate.push(c);
                    if amount_input().is_match(&candidate) {
                        line.amount = candidate;
                        true
                    } else {
                        false
                    }
                }
                None => false,
            },
            _ => false,
        };
        if accepted {
            self.clear_error(focus);
        }
        accepted
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Field::Description => {
                self.description.pop();
            }
            Field::Account(i) => {
                if let Some(line) = self.lines.get_mut(i) {
                    line.account_code.pop();
                }
            }
            Field::Amount(i) => {
                if let Some(line) = self.lines.get_mut(i) {
                    line.amount.pop();
                }
            }
            _ => {}
        }
    }

    /// Step a select field (transaction type or direction) to its next or
    /// previous option.
    pub fn cycle_option(&mut self, forward: bool) {
        let focus = self.focus;
        match focus {
            Field::TxType => {
                self.tx_type = if forward { self.tx_type.next() } else { self.tx_type.prev() };
            }
            Field::Direction(i) => {
                if let Some(line) = self.lines.get_mut(i) {
                    line.direction = Some(match line.direction {
                        None if forward => Direction::Debit,
                        None => Direction::Credit,
                        Some(d) => d.toggled(),
                    });
                }
            }
            _ => return,
        }
        self.clear_error(focus);
    }

    pub fn set_direction(&mut self, line: usize, direction: Direction) {
        if let Some(l) = self.lines.get_mut(line) {
            l.direction = Some(direction);
            self.clear_error(Field::Direction(line));
        }
    }

    /// Append an empty line; the user has to pick its direction.
    pub fn add_line(&mut self) {
        self.lines.push(PostingLine::default());
        self.focus = Field::Account(self.lines.len() - 1);
        self.errors.retain(|e| e.field.line().is_none());
    }

    pub fn remove_line(&mut self, index: usize) {
        if index >= self.lines.len() {
            return;
        }
        self.lines.remove(index);
        self.errors.retain(|e| e.field.line().is_none());

        self.focus = match self.focus.line() {
            Some(_) if self.lines.is_empty() => Field::Description,
            Some(i) if i >= self.lines.len() => Field::Account(self.lines.len() - 1),
            Some(i) if i > index => Field::Account(i - 1),
            Some(i) => Field::Account(i),
            None => self.focus,
        };
    }

    pub fn remove_focused_line(&mut self) {
        if let Some(i) = self.focus.line() {
            self.remove_line(i);
        }
    }

    fn clear_error(&mut self, field: Field) {
        self.errors.retain(|e| e.field != field);
    }

    pub fn error_for(&self, field: Field) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }

    // Validation and submission

    /// Presence checks only. Debit/credit balance is left to the backend.
    pub fn validate(&self) -> Result<TransactionRequest, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut postings = Vec::with_capacity(self.lines.len());

        if self.reference_id.is_empty() {
            errors.push(FieldError { field: Field::ReferenceId, message: "Reference ID is required" });
        }

        for (i, line) in self.lines.iter().enumerate() {
            if line.account_code.is_empty() {
                errors.push(FieldError { field: Field::Account(i), message: "Missing account" });
            }
            if line.direction.is_none() {
                errors.push(FieldError { field: Field::Direction(i), message: "Missing direction" });
            }
            if line.amount.is_empty() {
                errors.push(FieldError { field: Field::Amount(i), message: "Missing amount" });
            }
            if let Some(direction) = line.direction {
                postings.push(Posting {
                    account_code: line.account_code.clone(),
                    direction,
                    amount: line.amount.clone(),
                });
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TransactionRequest {
            reference_id: self.reference_id.clone(),
            tx_type: self.tx_type.code().to_string(),
            description: (!self.description.is_empty()).then(|| self.description.clone()),
            postings,
        })
    }

    /// Validate and enter `Submitting`. `None` when already submitting or
    /// when a required field is missing (errors are recorded on the form).
    pub fn begin_submit(&mut self) -> Option<TransactionRequest> {
        if self.is_submitting() {
            return None;
        }
        match self.validate() {
            Ok(request) => {
                self.errors.clear();
                self.state = SubmitState::Submitting;
                Some(request)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn complete_success(&mut self, response: TransactionResponse, next_reference_id: String) {
        self.last_posted = Some(response);
        self.reset(next_reference_id);
    }

    /// Leave every entered value as it was so the user can fix and resubmit.
    pub fn complete_failure(&mut self) {
        self.state = SubmitState::Idle;
    }
}
