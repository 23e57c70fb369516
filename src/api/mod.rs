//! Ledger API Module
//!
//! This module provides the HTTP client for communicating with the FinScale
//! ledger backend. It includes:
//!
//! - `HttpClient`: JSON client with a fixed base URL, a bounded timeout and a
//!   single place where failures become user-facing notifications
//! - `LedgerApi`: the account list, transaction posting and health calls
//! - Wire types for accounts, postings and transaction requests/responses

mod client;
mod error;
mod ledger;
mod types;
#[cfg(test)]
mod tests;

pub use client::HttpClient;
pub use error::{ApiError, FALLBACK_MESSAGE};
pub use ledger::LedgerApi;
pub use types::{
    Account, AccountType, Direction, Posting, TransactionRequest, TransactionResponse, TxType,
};
