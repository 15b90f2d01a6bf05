// Request field checks shared by handlers. Each returns the field-level
// ValidationError envelope on failure.

use crate::error::ApiError;

/// Trimmed, non-empty text
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_field(field, "is required"));
    }
    Ok(trimmed)
}

pub fn max_len<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str, ApiError> {
    let value = required(field, value)?;
    if value.chars().count() > max {
        return Err(ApiError::invalid_field(field, format!("must be at most {} characters", max)));
    }
    Ok(value)
}

/// Lower-cased email with a local part and a dotted domain
pub fn email(value: &str) -> Result<String, ApiError> {
    let value = required("email", value)?.to_lowercase();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::invalid_field("email", "is not a valid email address"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(email("  Parent@Example.COM ").unwrap(), "parent@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "no-at-sign", "@example.com", "a@nodot", "a@.com", "a b@example.com"] {
            assert!(email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn required_and_length() {
        assert!(required("title", "   ").is_err());
        assert_eq!(required("title", " Hi ").unwrap(), "Hi");
        assert!(max_len("title", "abcdef", 5).is_err());
        assert_eq!(max_len("title", "abc", 5).unwrap(), "abc");
    }
}
