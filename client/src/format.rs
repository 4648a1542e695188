// Display helpers for addresses, token amounts and timestamps.

use chrono::{DateTime, Local, Utc};

/// Token ticker shown next to amounts.
pub const TOKEN_SYMBOL: &str = "EST";

/// Shorten an address to its first 6 and last 4 characters, e.g. `0x742d...0bEb`.
pub fn format_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    abbreviate(address, 6, 4)
}

/// Keep `head` leading and `tail` trailing characters joined by an ellipsis.
///
/// Shorter inputs keep whatever characters are available at each end, so the
/// result never panics on odd lengths or multi-byte characters.
pub fn abbreviate(text: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start: String = chars.iter().take(head).collect();
    let end: String = chars[chars.len().saturating_sub(tail)..].iter().collect();
    format!("{}...{}", start, end)
}

/// Leading characters followed by an ellipsis, e.g. `0x742d35Cc...`.
pub fn prefix(text: &str, head: usize) -> String {
    let start: String = text.chars().take(head).collect();
    format!("{}...", start)
}

/// Fixed four-decimal rendering used for every token amount.
pub fn format_token_amount(amount: f64) -> String {
    format!("{:.4}", amount)
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_keeps_six_leading_and_four_trailing_chars() {
        assert_eq!(
            format_address("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb"),
            "0x742d...0bEb"
        );
        assert_eq!(format_address(""), "");
    }

    #[test]
    fn short_inputs_do_not_panic() {
        assert_eq!(abbreviate("0x12", 6, 4), "0x12...0x12");
        assert_eq!(abbreviate("ab", 6, 4), "ab...ab");
        assert_eq!(prefix("0x1", 10), "0x1...");
    }

    #[test]
    fn transfer_recipient_abbreviation() {
        let recipient = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";
        assert_eq!(abbreviate(recipient, 10, 8), "0x742d35Cc...95f0bEb0");
        assert_eq!(prefix(recipient, 10), "0x742d35Cc...");
    }

    #[test]
    fn amounts_use_four_decimals() {
        assert_eq!(format_token_amount(10.0), "10.0000");
        assert_eq!(format_token_amount(0.123456), "0.1235");
    }
}
