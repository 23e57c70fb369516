//! Application State and Logic
//!
//! This module defines the core application state for the FinScale CLI. It
//! manages:
//!
//! - View management (posting form, account list)
//! - Key handling for the posting form and the account table
//! - Submitting transactions and loading accounts through the ledger API
//! - The transient notification area and backend health
//!
//! `App` is the central state container. `App::handle_key` turns key presses
//! into state changes plus an optional `Action` that needs the network.
//! `App::dispatch` runs that action on a spawned task whose `Completion` comes
//! back over a channel, and `run_app` drains the channel every tick.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, widgets::TableState, Terminal};
use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::form::{Field, PostingForm};
use super::theme::Theme;
use crate::api::{
    Account, ApiError, Direction, LedgerApi, TransactionRequest, TransactionResponse,
};
use crate::notify::{Notifier, Toasts};
use crate::query::QueryCache;
use crate::reference::ReferenceIdGenerator;

pub type AppResult<T> = anyhow::Result<T>;

/// Cache key of the account list query.
pub const ACCOUNTS_KEY: &str = "accounts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Posting,
    Accounts,
}

impl View {
    pub fn all() -> Vec<View> {
        vec![View::Posting, View::Accounts]
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Posting => "Post Transaction",
            View::Accounts => "Accounts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Unknown,
    Up,
    Down,
}

/// Network work a key press asks `App::dispatch` to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Submit(TransactionRequest),
    LoadAccounts,
    RefreshAccounts,
}

/// Result of a background network call, applied on the UI loop.
#[derive(Debug)]
pub enum Completion {
    Health(Health),
    Posted {
        request: TransactionRequest,
        result: Result<TransactionResponse, ApiError>,
    },
    Accounts(Result<Vec<Account>, ApiError>),
}

pub struct App {
    pub api: LedgerApi,
    pub current_view: View,
    pub running: bool,
    pub theme: Theme,

    // Posting view
    pub form: PostingForm,
    pub references: ReferenceIdGenerator,

    // Accounts view
    pub accounts: QueryCache<Vec<Account>>,
    pub account_state: TableState,

    // Status
    pub notifier: Notifier,
    pub toasts: Toasts,
    pub health: Health,
    pub loading: bool,

    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl App {
    pub fn new(
        api: LedgerApi,
        notifier: Notifier,
        toasts: Toasts,
        mut references: ReferenceIdGenerator,
        accounts: QueryCache<Vec<Account>>,
    ) -> Self {
        let form = PostingForm::new(references.next_id());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            api,
            current_view: View::Posting,
            running: true,
            theme: Theme::default(),
            form,
            references,
            accounts,
            account_state: TableState::default(),
            notifier,
            toasts,
            health: Health::Unknown,
            loading: false,
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    pub fn cached_accounts(&self) -> Option<Arc<Vec<Account>>> {
        self.accounts.get(ACCOUNTS_KEY)
    }

    /// Number of network calls still running in the background.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Start the work `action` asks for without waiting for it.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Submit(request) => self.spawn_submit(request),
            Action::LoadAccounts => self.spawn_load_accounts(),
            Action::RefreshAccounts => {
                if !self.loading {
                    self.accounts.invalidate(ACCOUNTS_KEY);
                    self.spawn_load_accounts();
                }
            }
        }
    }

    pub fn spawn_health_check(&mut self) {
        let api = self.api.clone();
        self.spawn(async move {
            let health = match api.get_health().await {
                Ok(_) => Health::Up,
                Err(_) => Health::Down,
            };
            Completion::Health(health)
        });
    }

    fn spawn_submit(&mut self, request: TransactionRequest) {
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.post_transaction(&request).await;
            Completion::Posted { request, result }
        });
    }

    fn spawn_load_accounts(&mut self) {
        if self.loading || self.cached_accounts().is_some() {
            return;
        }
        self.loading = true;
        let api = self.api.clone();
        let policy = self.accounts.policy();
        self.spawn(async move {
            let result = policy.run(ACCOUNTS_KEY, || api.list_accounts()).await;
            Completion::Accounts(result)
        });
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            // The receiver only goes away when the app has quit.
            let _ = tx.send(work.await);
        });
    }

    /// Apply every finished background call without blocking.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Wait for the next background call to finish and apply it.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Health(health) => self.health = health,
            Completion::Posted { request, result } => match result {
                Ok(response) => {
                    info!(
                        tx_id = response.tx_id,
                        reference_id = %response.reference_id,
                        "transaction posted"
                    );
                    self.notifier
                        .success(format!("{} (TX #{})", response.message, response.tx_id));
                    let next = self.references.next_id();
                    self.form.complete_success(response, next);
                }
                Err(err) => {
                    // The client already notified the user.
                    warn!(reference_id = %request.reference_id, error = %err, "posting failed");
                    self.form.complete_failure();
                }
            },
            Completion::Accounts(result) => {
                self.loading = false;
                if let Ok(accounts) = result {
                    let accounts = self.accounts.insert(ACCOUNTS_KEY, accounts);
                    let selected = match self.account_state.selected() {
                        _ if accounts.is_empty() => None,
                        Some(i) => Some(i.min(accounts.len() - 1)),
                        None => Some(0),
                    };
                    self.account_state.select(selected);
                }
            }
        }
    }

    // Navigation

    pub fn goto_view(&mut self, view: View) -> Action {
        self.current_view = view;
        if view == View::Accounts && self.cached_accounts().is_none() && !self.loading {
            Action::LoadAccounts
        } else {
            Action::None
        }
    }

    pub fn next_view(&mut self) -> Action {
        let views = View::all();
        let idx = views.iter().position(|v| *v == self.current_view).unwrap_or(0);
        self.goto_view(views[(idx + 1) % views.len()])
    }

    pub fn prev_view(&mut self) -> Action {
        let views = View::all();
        let idx = views.iter().position(|v| *v == self.current_view).unwrap_or(0);
        self.goto_view(views[(idx + views.len() - 1) % views.len()])
    }

    pub fn select_next_account(&mut self) {
        let len = self.cached_accounts().map(|a| a.len()).unwrap_or(0);
        let i = self.account_state.selected().unwrap_or(0);
        if len > 0 {
            self.account_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn select_prev_account(&mut self) {
        let i = self.account_state.selected().unwrap_or(0);
        self.account_state.select(Some(i.saturating_sub(1)));
    }

    pub fn reset_form(&mut self) {
        let next = self.references.next_id();
        self.form.reset(next);
    }

    // Keys

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.running = false;
            return Action::None;
        }

        match key.code {
            KeyCode::F(1) => return self.goto_view(View::Posting),
            KeyCode::F(2) => return self.goto_view(View::Accounts),
            _ => {}
        }

        match self.current_view {
            View::Posting => self.handle_posting_key(key.code, ctrl),
            View::Accounts => self.handle_accounts_key(key.code),
        }
    }

    fn handle_posting_key(&mut self, code: KeyCode, ctrl: bool) -> Action {
        let focus = self.form.focus;

        match code {
            KeyCode::Char('a') if ctrl => self.form.add_line(),
            KeyCode::Char('d') if ctrl => self.form.remove_focused_line(),
            KeyCode::Enter => {
                return match self.form.begin_submit() {
                    Some(request) => Action::Submit(request),
                    None => Action::None,
                };
            }
            KeyCode::Esc if !self.form.is_submitting() => self.reset_form(),
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::Left if !focus.is_text() => self.form.cycle_option(false),
            KeyCode::Right if !focus.is_text() => self.form.cycle_option(true),
            KeyCode::Char(' ') if !focus.is_text() => self.form.cycle_option(true),
            KeyCode::Char(c) => match focus {
                Field::Direction(i) if c.eq_ignore_ascii_case(&'d') => {
                    self.form.set_direction(i, Direction::Debit)
                }
                Field::Direction(i) if c.eq_ignore_ascii_case(&'c') => {
                    self.form.set_direction(i, Direction::Credit)
                }
                _ if !ctrl => {
                    self.form.insert_char(c);
                }
                _ => {}
            },
            KeyCode::Backspace => self.form.backspace(),
            _ => {}
        }
        Action::None
    }

    fn handle_accounts_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab | KeyCode::Right => return self.next_view(),
            KeyCode::BackTab | KeyCode::Left => return self.prev_view(),
            KeyCode::Char('1') => return self.goto_view(View::Posting),
            KeyCode::Char('2') => return self.goto_view(View::Accounts),
            KeyCode::Down | KeyCode::Char('j') => self.select_next_account(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev_account(),
            KeyCode::Home => self.account_state.select(Some(0)),
            KeyCode::End => {
                let len = self.cached_accounts().map(|a| a.len()).unwrap_or(0);
                if len > 0 {
                    self.account_state.select(Some(len - 1));
                }
            }
            KeyCode::Char('r') if !self.loading => return Action::RefreshAccounts,
            _ => {}
        }
        Action::None
    }
}

/// Event loop. Network calls run on spawned tasks, so keys (Ctrl+C included)
/// and toasts keep being handled while a call is outstanding.
pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> AppResult<()> {
    app.spawn_health_check();

    loop {
        app.poll_completions();
        app.toasts.tick(Instant::now());
        terminal.draw(|f| super::views::draw(f, &mut app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let action = app.handle_key(key);
                    app.dispatch(action);
                }
            }
        }

        if !app.running {
            if app.pending() > 0 {
                info!(pending = app.pending(), "quitting with calls in flight");
            }
            return Ok(());
        }
    }
}
