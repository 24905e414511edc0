//! Local input checks that run before any remote call is made.

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter some text to enhance")]
    EmptyText,
    #[error("Please enter the email content to respond to")]
    EmptyEmailContent,
    #[error("Please enter your email address")]
    EmptyEmail,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters long")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    /// The string-table key holding the user-facing message.
    pub fn translation_key(&self) -> &'static str {
        match self {
            ValidationError::EmptyText => "dashboard.errors.emptyText",
            ValidationError::EmptyEmailContent => "dashboard.errors.emptyEmail",
            ValidationError::EmptyEmail => "landing.errors.emptyEmail",
            ValidationError::InvalidEmail => "common.errors.invalidEmail",
            ValidationError::PasswordTooShort => "auth.signup.passwordTooShort",
            ValidationError::PasswordMismatch => "auth.reset.mismatch",
        }
    }
}

/// Returns the input unchanged when it has content beyond whitespace.
pub fn require_text(input: &str, missing: ValidationError) -> Result<&str, ValidationError> {
    if input.trim().is_empty() {
        Err(missing)
    } else {
        Ok(input)
    }
}

/// Trims and loosely checks an address; the provider does the real check.
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let email = input.trim();
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace) =>
        {
            Ok(email.to_string())
        }
        _ => Err(ValidationError::InvalidEmail),
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        Err(ValidationError::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// Checks a new password and its confirmation, mismatch first.
pub fn validate_password_change(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    validate_password(password)
}
