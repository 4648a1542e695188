use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Profile returned by the backend alongside the auth token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub ethereum_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, ethereum_address: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ethereum_address: ethereum_address.into(),
            balance: None,
        }
    }
}

/// Body of `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Response of both auth endpoints. Either field may be missing on a
/// misbehaving backend, in which case no session is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub recipient: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction: Option<serde_json::Value>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    #[serde(deserialize_with = "deserialize_amount")]
    pub balance: f64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub ethereum_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionHistoryResponse {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub from: String,
    pub to: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub value: f64,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Error body emitted by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|msg| msg.trim().to_string())
            .filter(|msg| !msg.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrString::Number(value) => Ok(value),
            NumberOrString::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid numeric amount '{}'", text))),
        }
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?.into_f64()
}

fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_f64)
        .transpose()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

// Numbers are epoch milliseconds; strings are RFC 3339.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    let parsed = match raw {
        None => None,
        Some(RawTimestamp::Millis(ms)) => Utc.timestamp_millis_opt(ms).single(),
        Some(RawTimestamp::Fractional(ms)) => Utc.timestamp_millis_opt(ms as i64).single(),
        Some(RawTimestamp::Text(text)) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_keeps_wire_field_names() {
        let body = r#"{
            "message": "Login successful",
            "token": "t1",
            "user": {"username": "alice", "ethereum_address": "0xabc", "balance": 10.0}
        }"#;
        let parsed: AuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.token.as_deref(), Some("t1"));
        let user = parsed.user.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.ethereum_address, "0xabc");
        assert_eq!(user.balance, Some(10.0));
    }

    #[test]
    fn transaction_value_accepts_numbers_and_strings() {
        let body = r#"{"transactions": [
            {"from": "0x1", "to": "0x2", "value": 1.5, "timestamp": 1700000000000},
            {"from": "0x2", "to": "0x1", "value": "2.25", "timestamp": "2024-01-02T03:04:05Z"},
            {"from": "0x3", "to": "0x1", "value": 3}
        ]}"#;
        let parsed: TransactionHistoryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.transactions.len(), 3);
        assert_eq!(parsed.transactions[0].value, 1.5);
        assert_eq!(
            parsed.transactions[0].timestamp.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(parsed.transactions[1].value, 2.25);
        assert!(parsed.transactions[1].timestamp.is_some());
        assert!(parsed.transactions[2].timestamp.is_none());
    }

    #[test]
    fn error_body_prefers_error_field() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": "Invalid credentials", "message": "x"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid credentials"));

        let blank: ApiErrorBody = serde_json::from_str(r#"{"error": "  "}"#).unwrap();
        assert_eq!(blank.into_message(), None);
    }

    #[test]
    fn transfer_request_serializes_amount_as_number() {
        let request = TransferRequest {
            recipient: "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0".into(),
            amount: 2.5,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["amount"], serde_json::json!(2.5));
        assert!(value["recipient"].is_string());
    }
}
