#![allow(dead_code)]

//! In-process fake of the ledger backend.

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use finscale::api::{HttpClient, LedgerApi};
use finscale::notify::{Notifier, Toasts};

/// Account code the fake backend refuses to post to.
pub const UNKNOWN_ACCOUNT: &str = "9999";

#[derive(Clone, Default)]
pub struct Backend {
    pub bodies: Arc<Mutex<Vec<Value>>>,
    pub account_calls: Arc<AtomicUsize>,
    pub failing_account_calls: usize,
    pub garbage_accounts: bool,
    pub health_delay: Duration,
}

impl Backend {
    pub fn received(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
}

pub fn sample_accounts() -> Value {
    json!([
        {"ID": 1, "AccountCode": "1001", "Name": "Cash", "Type": 1, "Currency": "CNY",
         "Balance": "1000.5", "Version": 1, "Status": 1},
        {"ID": 2, "AccountCode": "2001", "Name": "Customer Deposits", "Type": 2, "Currency": "CNY",
         "Balance": "-50.5", "Version": 4, "Status": 1}
    ])
}

async fn health(State(backend): State<Backend>) -> Json<Value> {
    tokio::time::sleep(backend.health_delay).await;
    Json(json!({"status": "ok"}))
}

async fn accounts(State(backend): State<Backend>) -> Response {
    let call = backend.account_calls.fetch_add(1, Ordering::SeqCst);
    if call < backend.failing_account_calls {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "ledger warming up"})))
            .into_response();
    }
    if backend.garbage_accounts {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    Json(sample_accounts()).into_response()
}

async fn post_transaction(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let tx_id = {
        let mut bodies = backend.bodies.lock().unwrap();
        bodies.push(body.clone());
        bodies.len()
    };

    let unknown = body["postings"]
        .as_array()
        .map(|p| p.iter().any(|p| p["account_code"] == UNKNOWN_ACCOUNT))
        .unwrap_or(false);
    if unknown {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("account {} not found", UNKNOWN_ACCOUNT)})),
        )
            .into_response();
    }

    Json(json!({
        "message": "Transaction posted successfully",
        "tx_id": tx_id,
        "reference_id": body["reference_id"],
        "posted_at": "2024-03-01T10:00:00.123456+08:00"
    }))
    .into_response()
}

/// Serve the fake backend on an ephemeral port; returns the API base URL.
pub async fn spawn(backend: Backend) -> Result<String> {
    let router = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/ledger/accounts", get(accounts))
        .route("/api/v1/ledger/transactions", post(post_transaction))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}/api/v1", addr))
}

pub fn ledger_api(base_url: &str, timeout: Duration) -> (LedgerApi, Notifier, Toasts) {
    let (notifier, toasts) = Notifier::channel();
    let http = HttpClient::new(base_url, timeout).with_notifier(notifier.clone());
    (LedgerApi::new(http), notifier, toasts)
}

/// An address nothing listens on.
pub async fn dead_base_url() -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}/api/v1", addr))
}

/// An address that accepts connections but never answers.
pub async fn silent_base_url() -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    Ok(format!("http://{}/api/v1", addr))
}
