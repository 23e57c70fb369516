//! Terminal client for the FinScale general ledger: post double-entry
//! transactions and browse accounts over the ledger's JSON API.

pub mod api;
pub mod config;
pub mod format;
pub mod notify;
pub mod query;
pub mod reference;
pub mod ui;
