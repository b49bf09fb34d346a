//! Input validation functions
//!
//! The request DTOs in `types` carry `validator` derives for field
//! bounds. The username charset rule has no derive equivalent, so the
//! account service calls `validate_user_name` directly; the email and
//! password functions mirror the derive rules for callers outside the
//! HTTP layer.

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    let email_regex = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    if !email_regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate username: 3-40 chars, alphanumeric plus `.`, `_` and `-`
pub fn validate_user_name(user_name: &str) -> Result<(), String> {
    if user_name.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if user_name.len() > 40 {
        return Err("Username too long".to_string());
    }
    if !user_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err("Username may only contain letters, digits, '.', '_' and '-'".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("john.doe@example.com").is_ok());
        assert!(validate_email("a@b.co").is_ok());
    }

    #[test]
    fn test_invalid_email() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_email_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[rstest]
    #[case("john.doe", true)]
    #[case("user_42-x", true)]
    #[case("jd", false)]
    #[case("john doe", false)]
    #[case("john@doe", false)]
    fn test_user_name_rules(#[case] user_name: &str, #[case] accepted: bool) {
        assert_eq!(validate_user_name(user_name).is_ok(), accepted);
    }

    #[test]
    fn test_user_name_length_bounds() {
        assert!(validate_user_name(&"u".repeat(40)).is_ok());
        assert!(validate_user_name(&"u".repeat(41)).is_err());
    }
}
