use crate::errors::{WalletError, WalletResult};
use regex::Regex;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Client-side form validation run before any request leaves the client.
#[derive(Debug, Clone)]
pub struct InputValidator {
    // Compiled regex patterns for performance
    address_pattern: Regex,
    letter_pattern: Regex,
    digit_pattern: Regex,
}

impl InputValidator {
    pub fn new() -> WalletResult<Self> {
        let address_pattern = Regex::new(r"^0x[a-fA-F0-9]{40}$")
            .map_err(|e| WalletError::ValidationError(format!("Invalid address regex: {}", e)))?;

        let letter_pattern = Regex::new(r"[a-zA-Z]")
            .map_err(|e| WalletError::ValidationError(format!("Invalid letter regex: {}", e)))?;

        let digit_pattern = Regex::new(r"[0-9]")
            .map_err(|e| WalletError::ValidationError(format!("Invalid digit regex: {}", e)))?;

        Ok(InputValidator {
            address_pattern,
            letter_pattern,
            digit_pattern,
        })
    }

    pub fn validate_username(&self, username: &str) -> WalletResult<()> {
        if username.chars().count() < MIN_USERNAME_LENGTH {
            return Err(WalletError::ValidationError(format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LENGTH
            )));
        }
        Ok(())
    }

    /// Validate password strength
    pub fn validate_password(&self, password: &str) -> WalletResult<()> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(WalletError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if !self.letter_pattern.is_match(password) {
            return Err(WalletError::ValidationError(
                "Password must contain at least one letter".to_string(),
            ));
        }

        if !self.digit_pattern.is_match(password) {
            return Err(WalletError::ValidationError(
                "Password must contain at least one number".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_password_confirmation(
        &self,
        password: &str,
        confirmation: &str,
    ) -> WalletResult<()> {
        if password != confirmation {
            return Err(WalletError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }
        Ok(())
    }

    /// Full registration form check, in the order the rules are reported.
    pub fn validate_registration(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> WalletResult<()> {
        self.validate_username(username)?;
        self.validate_password(password)?;
        self.validate_password_confirmation(password, confirmation)
    }

    /// Login only requires both fields to be filled in.
    pub fn validate_login(&self, username: &str, password: &str) -> WalletResult<()> {
        if username.trim().is_empty() {
            return Err(WalletError::ValidationError(
                "Username is required".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(WalletError::ValidationError(
                "Password is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_valid_address(&self, address: &str) -> bool {
        self.address_pattern.is_match(address)
    }

    /// Validate a transfer recipient (`0x` followed by 40 hex characters).
    pub fn validate_recipient(&self, recipient: &str) -> WalletResult<()> {
        if recipient.trim().is_empty() {
            return Err(WalletError::ValidationError(
                "Recipient address is required".to_string(),
            ));
        }

        if !self.is_valid_address(recipient) {
            return Err(WalletError::InvalidAddress(
                "Invalid Ethereum address. It must start with 0x and have 42 characters"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Parse a transfer amount, rejecting anything that is not a finite number above zero.
    ///
    /// The whole trimmed input must be a number: `"1abc"` and `"Infinity"` are
    /// refused rather than read as a numeric prefix.
    pub fn parse_amount(&self, amount: &str) -> WalletResult<f64> {
        let parsed = amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value > 0.0);

        parsed.ok_or_else(|| {
            WalletError::InvalidAmount("Amount must be greater than zero".to_string())
        })
    }

    /// Validate the whole transfer form and return the parsed amount.
    pub fn validate_transfer(&self, recipient: &str, amount: &str) -> WalletResult<f64> {
        self.validate_recipient(recipient)?;
        self.parse_amount(amount)
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new().expect("Failed to create InputValidator")
    }
}
