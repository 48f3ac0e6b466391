//! Checks on configuration values that end up inside SQL text.

use crate::error::ConfigError;
use regex::Regex;

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";

/// Schema names are interpolated as quoted identifiers, so only plain identifiers are accepted.
pub fn validate_identifier(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let re = Regex::new(IDENTIFIER_PATTERN)
        .map_err(|e| ConfigError::Validation(format!("identifier pattern: {}", e)))?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(validate_identifier("DB_SCHEMA", "public").is_ok());
        assert!(validate_identifier("DB_SCHEMA", "_sales_2024").is_ok());
    }

    #[test]
    fn rejects_anything_else() {
        let too_long = "x".repeat(64);
        for bad in ["", "1abc", "sales;drop", "a\"b", "with space", too_long.as_str()] {
            assert!(validate_identifier("DB_SCHEMA", bad).is_err(), "{bad}");
        }
    }
}
