//! Input validation helpers
//!
//! DTOs carry `validator` derives; these helpers cover what arrives outside
//! a JSON body (query strings, path params).

use validator::{Validate, ValidateEmail};

use crate::utils::AppError;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Provider link ids (`ORDER_<millis>`)
pub const MAX_LINK_ID_LEN: usize = 64;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Trim + lowercase, then check the result is an email address.
///
/// Customer records are keyed by the normalized form.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    validate_required_text(&email, "email", MAX_EMAIL_LEN)?;
    if !email.validate_email() {
        return Err(AppError::validation(format!("Invalid email: {email}")));
    }
    Ok(email)
}

/// Run `validator` derives, converting failures to `ValidationFailed`
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn email_is_normalized() {
        assert_eq!(
            normalize_email("  Reader@Example.COM ").unwrap(),
            "reader@example.com"
        );
    }

    #[test]
    fn bad_emails_are_rejected() {
        for raw in ["", "   ", "not-an-email", "a@"] {
            let err = normalize_email(raw).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed, "{raw:?}");
        }
    }

    #[test]
    fn required_text_limits() {
        assert!(validate_required_text("ORDER_1", "link_id", MAX_LINK_ID_LEN).is_ok());
        assert!(validate_required_text(&"x".repeat(65), "link_id", MAX_LINK_ID_LEN).is_err());
    }
}
