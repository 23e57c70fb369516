use super::*;

use anyhow::Result;
use http::StatusCode;
use serde_json::json;
use std::time::Duration;

fn transfer_request() -> TransactionRequest {
    TransactionRequest {
        reference_id: "TX-1700000000000-42".to_string(),
        tx_type: "TRANSFER".to_string(),
        description: None,
        postings: vec![
            Posting {
                account_code: "1001".to_string(),
                direction: Direction::Debit,
                amount: "100.00".to_string(),
            },
            Posting {
                account_code: "2001".to_string(),
                direction: Direction::Credit,
                amount: "100.00".to_string(),
            },
        ],
    }
}

#[test]
fn test_request_serializes_exactly_the_entered_fields() -> Result<()> {
    let body = serde_json::to_value(transfer_request())?;

    assert_eq!(
        body,
        json!({
            "reference_id": "TX-1700000000000-42",
            "tx_type": "TRANSFER",
            "postings": [
                {"account_code": "1001", "direction": "D", "amount": "100.00"},
                {"account_code": "2001", "direction": "C", "amount": "100.00"}
            ]
        })
    );
    Ok(())
}

#[test]
fn test_description_is_sent_when_present() -> Result<()> {
    let mut request = transfer_request();
    request.description = Some("Monthly salary payment".to_string());

    let body = serde_json::to_value(request)?;
    assert_eq!(body["description"], "Monthly salary payment");
    Ok(())
}

#[test]
fn test_amounts_keep_their_exact_text() -> Result<()> {
    let mut request = transfer_request();
    request.postings[0].amount = "0.10000000000000000001".to_string();
    request.postings[1].amount = "-007.5".to_string();

    let body = serde_json::to_value(request)?;
    assert_eq!(body["postings"][0]["amount"], "0.10000000000000000001");
    assert_eq!(body["postings"][1]["amount"], "-007.5");
    Ok(())
}

#[test]
fn test_account_decodes_backend_shape_and_ignores_extras() -> Result<()> {
    let raw = r#"{
        "ID": 7,
        "AccountCode": "1001",
        "Name": "Cash",
        "Type": 1,
        "Currency": "CNY",
        "Balance": "-50.5",
        "Version": 3,
        "Status": 1,
        "CreatedAt": "2024-01-01T00:00:00Z",
        "UpdatedAt": "2024-01-02T00:00:00Z"
    }"#;

    let account: Account = serde_json::from_str(raw)?;
    assert_eq!(account.id, 7);
    assert_eq!(account.account_code, "1001");
    assert_eq!(account.account_type, 1);
    assert_eq!(account.balance, "-50.5");
    assert_eq!(account.currency, "CNY");
    assert_eq!(account.status, 1);
    Ok(())
}

#[test]
fn test_response_decodes_backend_shape() -> Result<()> {
    let raw = r#"{
        "message": "Transaction posted successfully",
        "tx_id": 12,
        "reference_id": "TX-1700000000000-42",
        "posted_at": "2024-03-01T10:00:00.123456+08:00"
    }"#;

    let response: TransactionResponse = serde_json::from_str(raw)?;
    assert_eq!(response.tx_id, 12);
    assert_eq!(response.reference_id, "TX-1700000000000-42");
    assert_eq!(response.message, "Transaction posted successfully");
    Ok(())
}

#[test]
fn test_unknown_direction_is_rejected() {
    let raw = r#"{"account_code":"1001","direction":"X","amount":"1"}"#;
    assert!(serde_json::from_str::<Posting>(raw).is_err());
}

#[test]
fn test_account_type_codes() {
    assert_eq!(AccountType::from_code(1), Some(AccountType::Asset));
    assert_eq!(AccountType::from_code(5).map(|t| t.label()), Some("Expense"));
    assert_eq!(AccountType::from_code(0), None);
    assert_eq!(AccountType::from_code(42), None);
}

#[test]
fn test_tx_type_cycles_through_all_options() {
    let mut t = TxType::default();
    assert_eq!(t.code(), "TRANSFER");
    for _ in 0..TxType::ALL.len() {
        t = t.next();
    }
    assert_eq!(t, TxType::Transfer);
    assert_eq!(TxType::Transfer.prev(), TxType::Fee);
}

#[test]
fn test_user_message_prefers_server_text() {
    let err = ApiError::Server {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: Some("duplicate reference_id".to_string()),
    };
    assert_eq!(err.user_message(), "duplicate reference_id");

    let err = ApiError::Server { status: StatusCode::BAD_GATEWAY, message: None };
    assert_eq!(err.user_message(), FALLBACK_MESSAGE);

    let err = ApiError::Timeout(Duration::from_secs(10));
    assert_eq!(err.user_message(), FALLBACK_MESSAGE);

    let err = ApiError::Network("connection refused".to_string());
    assert_eq!(err.user_message(), FALLBACK_MESSAGE);
}
