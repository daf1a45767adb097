//! Form checks that run before any request is sent.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Name must be at least 2 characters")]
    NameTooShort,
    #[error("Valid email is required")]
    InvalidEmail,
    #[error("Email and password are required")]
    MissingCredentials,
}

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;

/// Canonical form of an email address, as the identity service stores it
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Same rule the identity service applies: anything with an `@`
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@')
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort);
    }
    if !is_valid_email(&normalize_email(email)) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}
