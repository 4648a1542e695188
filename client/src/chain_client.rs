/// Direct wallet RPC client
///
/// Talks JSON-RPC to a wallet-enabled Ethereum node (the node owns the keys
/// and signs). It is independent of the custodial backend and is only reached
/// through the `chain` CLI subcommand.
use crate::errors::{WalletError, WalletResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
const ETHER_DECIMALS: usize = 18;

/// HTTP client for node RPC communication
#[derive(Debug, Clone)]
pub struct ChainClient {
    client: Client,
    base_url: String,
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<T: Serialize> {
    jsonrpc: &'static str,
    method: String,
    params: T,
    id: u64,
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl ChainClient {
    pub fn new(base_url: impl Into<String>) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                WalletError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(ChainClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Accounts the node manages
    pub async fn accounts(&self) -> WalletResult<Vec<String>> {
        self.rpc_call("eth_accounts", serde_json::json!([])).await
    }

    /// Balance of `address` in ether, as a decimal string
    pub async fn get_balance(&self, address: &str) -> WalletResult<String> {
        let params = serde_json::json!([address, "latest"]);
        let raw: String = self.rpc_call("eth_getBalance", params).await?;
        let wei = parse_quantity(&raw)?;
        Ok(wei_to_ether(wei))
    }

    /// Ask the node to sign and send a value transfer; returns the transaction hash
    pub async fn send_transaction(
        &self,
        from: &str,
        to: &str,
        amount_ether: &str,
    ) -> WalletResult<String> {
        let wei = ether_to_wei(amount_ether)?;
        let params = serde_json::json!([{
            "from": from,
            "to": to,
            "value": format!("0x{:x}", wei),
        }]);
        self.rpc_call("eth_sendTransaction", params).await
    }

    /// Make a JSON-RPC call to the node
    async fn rpc_call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> WalletResult<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: method.to_string(),
            params,
            id: 1,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::NetworkError(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(WalletError::NetworkError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let rpc_response: JsonRpcResponse<T> = response
            .json()
            .await
            .map_err(|e| WalletError::NetworkError(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = rpc_response.error {
            return Err(WalletError::NetworkError(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }

        rpc_response
            .result
            .ok_or_else(|| WalletError::NetworkError("No result in RPC response".to_string()))
    }
}

/// Parse a hex quantity such as `0x1bc16d674ec80000`.
pub fn parse_quantity(raw: &str) -> WalletResult<u128> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| WalletError::InvalidResponse(format!("Invalid quantity '{}'", raw)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|_| WalletError::InvalidResponse(format!("Invalid quantity '{}'", raw)))
}

/// Render wei as ether without trailing zeros (`1500000000000000000` -> `1.5`).
pub fn wei_to_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", fraction, width = ETHER_DECIMALS);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Parse a decimal ether amount into wei, allowing up to 18 fractional digits.
pub fn ether_to_wei(amount: &str) -> WalletResult<u128> {
    let invalid = || WalletError::InvalidAmount(format!("Invalid ether amount '{}'", amount));
    let trimmed = amount.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if (whole.is_empty() && fraction.is_empty())
        || fraction.len() > ETHER_DECIMALS
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: u128 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = ETHER_DECIMALS);
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(WEI_PER_ETHER)
        .and_then(|wei| wei.checked_add(fraction))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wei_and_ether_conversions() {
        assert_eq!(wei_to_ether(0), "0");
        assert_eq!(wei_to_ether(1_500_000_000_000_000_000), "1.5");
        assert_eq!(wei_to_ether(1), "0.000000000000000001");
        assert_eq!(ether_to_wei("1.5").unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(ether_to_wei(".25").unwrap(), 250_000_000_000_000_000);
        assert_eq!(ether_to_wei("2").unwrap(), 2 * WEI_PER_ETHER);
    }

    #[test]
    fn malformed_ether_amounts_rejected() {
        for amount in ["", ".", "-1", "1.2.3", "abc", "0.0000000000000000001"] {
            assert!(ether_to_wei(amount).is_err(), "{amount} should fail");
        }
    }

    #[test]
    fn hex_quantities() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(
            parse_quantity("0x1bc16d674ec80000").unwrap(),
            2 * WEI_PER_ETHER
        );
        assert!(parse_quantity("12").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }
}
