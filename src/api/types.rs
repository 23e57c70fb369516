//! Wire shapes shared with the ledger backend.
//!
//! Amounts and balances stay `String` end to end; the backend owns the
//! decimal arithmetic and the client must not round-trip them through floats.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "D")]
    Debit,
    #[serde(rename = "C")]
    Credit,
}

impl Direction {
    pub fn code(&self) -> &'static str {
        match self {
            Direction::Debit => "D",
            Direction::Credit => "C",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Debit => "Debit",
            Direction::Credit => "Credit",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Direction::Debit => Direction::Credit,
            Direction::Credit => Direction::Debit,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account_code: String,
    pub direction: Direction,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub reference_id: String,
    pub tx_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub postings: Vec<Posting>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub tx_id: i64,
    pub reference_id: String,
    pub posted_at: String,
    pub message: String,
}

/// Account as the backend serializes it (Go-style field names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "AccountCode")]
    pub account_code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub account_type: i32,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Balance")]
    pub balance: String,
    #[serde(rename = "Status")]
    pub status: i32,
}

/// Chart-of-accounts categories known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(AccountType::Asset),
            2 => Some(AccountType::Liability),
            3 => Some(AccountType::Equity),
            4 => Some(AccountType::Income),
            5 => Some(AccountType::Expense),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Asset => "Asset",
            AccountType::Liability => "Liability",
            AccountType::Equity => "Equity",
            AccountType::Income => "Income",
            AccountType::Expense => "Expense",
        }
    }
}

/// Transaction categories offered by the posting form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxType {
    #[default]
    Transfer,
    Deposit,
    Withdraw,
    Fee,
}

impl TxType {
    pub const ALL: [TxType; 4] = [TxType::Transfer, TxType::Deposit, TxType::Withdraw, TxType::Fee];

    pub fn code(&self) -> &'static str {
        match self {
            TxType::Transfer => "TRANSFER",
            TxType::Deposit => "DEPOSIT",
            TxType::Withdraw => "WITHDRAW",
            TxType::Fee => "FEE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TxType::Transfer => "Transfer",
            TxType::Deposit => "Deposit",
            TxType::Withdraw => "Withdraw",
            TxType::Fee => "Fee",
        }
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
