use serde_json::Value;

use super::client::HttpClient;
use super::error::ApiError;
use super::types::{Account, TransactionRequest, TransactionResponse};

/// Typed calls against the ledger endpoints.
///
/// No retries and no local idempotency bookkeeping: a resubmitted
/// `reference_id` is the backend's problem to deduplicate.
#[derive(Clone)]
pub struct LedgerApi {
    http: HttpClient,
}

impl LedgerApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.http.get("/ledger/accounts").await
    }

    pub async fn post_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionResponse, ApiError> {
        self.http.post("/ledger/transactions", request).await
    }

    /// Backend health; the payload shape is not part of the contract.
    pub async fn get_health(&self) -> Result<Value, ApiError> {
        self.http.get("/health").await
    }
}
