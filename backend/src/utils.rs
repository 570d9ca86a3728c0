//! Small input-normalization helpers shared by services and handlers.

use serde::Deserialize;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 25;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Trims `value` and checks it is non-empty and at most `max_chars` long.
pub fn required_text(field: &str, value: &str, max_chars: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    optional_text(field, trimmed, max_chars)
}

/// Trims `value` and checks its length; empty is allowed.
pub fn optional_text(field: &str, value: &str, max_chars: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let valid = email.len() <= 254
        && matches!(email.split_once('@'), Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'));
    if !valid {
        return Err(AppError::validation("email address is invalid"));
    }
    Ok(email)
}

/// Company slugs are 2..=40 characters of lowercase ASCII letters, digits and inner hyphens.
pub fn normalize_slug(slug: &str) -> AppResult<String> {
    let slug = slug.trim().to_ascii_lowercase();
    let valid = (2..=40).contains(&slug.len())
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-');
    if !valid {
        return Err(AppError::validation(
            "slug must be 2-40 lowercase letters, digits or hyphens",
        ));
    }
    Ok(slug)
}

/// Three-letter uppercase ISO 4217 style code.
pub fn normalize_currency(code: &str) -> AppResult<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(AppError::validation("currency must be a three-letter code"));
    }
    Ok(code)
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Clamped `(limit, offset)`.
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(required_text("title", "  Laptop ", 10).ok(), Some("Laptop".to_string()));
        assert!(required_text("title", "   ", 10).is_err());
        assert!(required_text("title", "abcdefghijk", 10).is_err());
        assert_eq!(optional_text("note", "", 10).ok(), Some(String::new()));
    }

    #[test]
    fn emails_are_lowercased_and_checked() {
        assert_eq!(normalize_email(" Ayse@Example.COM ").ok(), Some("ayse@example.com".to_string()));
        for bad in ["", "nobody", "@example.com", "a@localhost", "a@.com"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn slugs_and_currencies() {
        assert_eq!(normalize_slug("Acme-IT").ok(), Some("acme-it".to_string()));
        assert!(normalize_slug("-acme").is_err());
        assert!(normalize_slug("a").is_err());
        assert!(normalize_slug("acme corp").is_err());
        assert_eq!(normalize_currency("try").ok(), Some("TRY".to_string()));
        assert!(normalize_currency("TL").is_err());
    }

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(Pagination::default().resolve(), (DEFAULT_PAGE_SIZE, 0));
        let p = Pagination { limit: Some(1000), offset: Some(-3) };
        assert_eq!(p.resolve(), (MAX_PAGE_SIZE, 0));
    }
}
