// Helper functions for display

use chrono::{DateTime, Local};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::debug;

use crate::api::AccountType;

pub fn account_type_label(code: i32) -> &'static str {
    AccountType::from_code(code).map(|t| t.label()).unwrap_or("Unknown")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedBalance {
    pub text: String,
    pub negative: bool,
}

/// Two decimal places with comma grouping. The wire value is parsed as a
/// decimal, never a float; text that doesn't parse is shown as-is.
pub fn format_balance(raw: &str) -> FormattedBalance {
    let value = match Decimal::from_str(raw.trim()) {
        Ok(value) => value,
        Err(err) => {
            debug!(balance = raw, error = %err, "balance is not a decimal");
            return FormattedBalance { text: raw.to_string(), negative: false };
        }
    };

    let negative = value.is_sign_negative() && !value.is_zero();
    let rounded = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded);
    let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    FormattedBalance {
        text: format!("{}{}.{}", if negative { "-" } else { "" }, group_thousands(whole), cents),
        negative,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `posted_at` in local time, or verbatim when it isn't RFC 3339.
pub fn format_posted_at(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
