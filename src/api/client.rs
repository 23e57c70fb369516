//! JSON-over-HTTP client with a single error funnel.

use bytes::Bytes;
use http::{header, Method, Request};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::ApiError;
use crate::notify::Notifier;

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client bound to one API base URL.
///
/// Every failure (connect, timeout, non-2xx, undecodable body) is logged and
/// published to the notifier before it is returned, so callers only decide
/// what to do with their own state.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    timeout: Duration,
    notifier: Option<Notifier>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_nodelay(true);
        connector.set_connect_timeout(Some(timeout));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .build(connector);

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = match serde_json::to_vec(body) {
            Ok(payload) => payload,
            Err(err) => {
                let err = ApiError::from(err);
                self.report(&Method::POST, path, &err);
                return Err(err);
            }
        };
        self.request(Method::POST, path, Some(payload)).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        let result = self
            .exchange(method.clone(), path, body)
            .await
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(ApiError::from));

        if let Err(ref err) = result {
            self.report(&method, path, err);
        }
        result
    }

    fn report(&self, method: &Method, path: &str, err: &ApiError) {
        warn!(%method, path, error = %err, "api request failed");
        if let Some(notifier) = &self.notifier {
            notifier.error(err.user_message());
        }
    }

    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, ApiError> {
        let uri = format!("{}{}", self.base_url, path);
        debug!(%method, %uri, "sending request");

        let request = Request::builder()
            .method(method)
            .uri(uri.as_str())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let call = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?
                .to_bytes();
            Ok::<_, ApiError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ApiError::Timeout(self.timeout))??;

        debug!(%status, bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(ApiError::Server {
                status,
                message: server_message(&body),
            });
        }
        Ok(body)
    }
}

fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_reads_error_field() {
        assert_eq!(
            server_message(br#"{"error":"insufficient balance"}"#),
            Some("insufficient balance".to_string())
        );
    }

    #[test]
    fn test_server_message_ignores_other_shapes() {
        assert_eq!(server_message(br#"{"message":"nope"}"#), None);
        assert_eq!(server_message(br#"{"error":""}"#), None);
        assert_eq!(server_message(b"<html>502 Bad Gateway</html>"), None);
        assert_eq!(server_message(b""), None);
    }

    #[test]
    fn test_base_url_drops_trailing_slash() {
        let client = HttpClient::new("http://localhost:8080/api/v1/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://localhost:8080/api/v1");
    }
}
