//! Input validation helpers
//!
//! Centralized text length limits for store records and admin input.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Store names, menu item names, offer titles
pub const MAX_NAME_LEN: usize = 200;

/// Offer descriptions, main offer text
pub const MAX_NOTE_LEN: usize = 500;

/// Phone numbers, prices
pub const MAX_SHORT_TEXT_LEN: usize = 100;

pub const MAX_ADDRESS_LEN: usize = 500;

/// Tagline shown in the catalog header
pub const MAX_TAGLINE_LEN: usize = 200;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// 照片：URL 或 data URL (800px JPEG 的 base64 可达数百 KB)
pub const MAX_PHOTO_LEN: usize = 2 * 1024 * 1024;

/// Menu items / offers per store
pub const MAX_LIST_ITEMS: usize = 200;

/// Validate that a required string is non-empty (after trim) and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    validate_text_len(value, field, max_len)
}

/// Validate that a string, possibly empty, is within the length limit.
pub fn validate_text_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Spice Hub", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
        assert!(validate_text_len("", "contact", MAX_SHORT_TEXT_LEN).is_ok());
    }
}
