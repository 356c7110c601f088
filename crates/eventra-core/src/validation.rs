//! Input validation shared by the identity and catalog layers.
//!
//! Field bounds mirror the relational schema constraints so bad input is
//! rejected with a 400 before it ever reaches the database.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

/// Permissive E.164-style phone pattern: optional `+`, no leading zero,
/// at most 16 digits.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("phone regex"));

/// Minimal email shape check: one `@` with a dotted domain. Deliverability
/// is not our problem; uniqueness is enforced by the database.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate and normalize an email address (lowercased, trimmed).
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(Error::Validation(format!("invalid email: {email}")));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<()> {
    if !PHONE_RE.is_match(phone) {
        return Err(Error::Validation(format!("invalid phone number: {phone}")));
    }
    Ok(())
}

/// Person name fields: 2–50 characters, non-blank.
pub fn validate_person_name(field: &str, value: &str) -> Result<()> {
    let len = value.trim().chars().count();
    if !(2..=50).contains(&len) {
        return Err(Error::Validation(format!(
            "{field} must be between 2 and 50 characters"
        )));
    }
    Ok(())
}

/// Entity name fields (event/venue): 3–100 characters, non-blank.
pub fn validate_entity_name(field: &str, value: &str) -> Result<()> {
    let len = value.trim().chars().count();
    if !(3..=100).contains(&len) {
        return Err(Error::Validation(format!(
            "{field} must be between 3 and 100 characters"
        )));
    }
    Ok(())
}

pub fn validate_guest_count(guest_count: i32) -> Result<()> {
    if !(1..=10_000).contains(&guest_count) {
        return Err(Error::Validation(
            "guest_count must be between 1 and 10000".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_budget(budget: &bigdecimal::BigDecimal) -> Result<()> {
    if *budget < bigdecimal::BigDecimal::from(0) {
        return Err(Error::Validation("budget must be >= 0".to_string()));
    }
    Ok(())
}

pub fn validate_capacity(capacity: i32) -> Result<()> {
    if !(1..=50_000).contains(&capacity) {
        return Err(Error::Validation(
            "capacity must be between 1 and 50000".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_price(field: &str, price: &bigdecimal::BigDecimal) -> Result<()> {
    if *price < bigdecimal::BigDecimal::from(0) {
        return Err(Error::Validation(format!("{field} must be >= 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a@b").is_err());
        assert!(normalize_email("a b@example.com").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("pw123456").is_ok());
        assert!(validate_password("pw1").is_err());
    }

    #[test]
    fn test_phone_pattern() {
        assert!(validate_phone("+23767712345").is_ok());
        assert!(validate_phone("14155550123").is_ok());
        assert!(validate_phone("0123").is_err());
        assert!(validate_phone("+0123").is_err());
        assert!(validate_phone("call-me").is_err());
    }

    #[test]
    fn test_name_bounds() {
        assert!(validate_person_name("first_name", "Al").is_ok());
        assert!(validate_person_name("first_name", "A").is_err());
        assert!(validate_entity_name("name", "Gala").is_ok());
        assert!(validate_entity_name("name", "Ga").is_err());
        assert!(validate_entity_name("name", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(validate_guest_count(1).is_ok());
        assert!(validate_guest_count(10_000).is_ok());
        assert!(validate_guest_count(0).is_err());
        assert!(validate_guest_count(10_001).is_err());
        assert!(validate_budget(&BigDecimal::from(0)).is_ok());
        assert!(validate_budget(&BigDecimal::from_str("2500.50").unwrap()).is_ok());
        assert!(validate_budget(&BigDecimal::from(-1)).is_err());
        assert!(validate_capacity(50_000).is_ok());
        assert!(validate_capacity(0).is_err());
    }

    #[test]
    fn test_price_sign() {
        assert!(validate_price("price_per_day", &BigDecimal::from(0)).is_ok());
        assert!(validate_price("price_per_day", &BigDecimal::from_str("-0.01").unwrap()).is_err());
    }
}
