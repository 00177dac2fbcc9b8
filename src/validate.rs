use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9a-z._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,64}$").expect("Invalid regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+]?[(]?[0-9]{1,4}[)]?[-\s.]?[0-9]{1,4}[-\s.]?[0-9]{1,9}$")
        .expect("Invalid regex")
});

/// Outcome of validating a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error_message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: Some(message.into()),
        }
    }
}

/// Checks that a field has a non-blank value.
pub fn validate_required(value: &str, field: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::invalid(format!("{} is required", field))
    } else {
        ValidationResult::valid()
    }
}

/// Checks that a value looks like an email address.
pub fn validate_email(value: &str) -> ValidationResult {
    if EMAIL_RE.is_match(value) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid("Enter a valid email address")
    }
}

/// Checks that a value looks like a phone number.
pub fn validate_phone(value: &str) -> ValidationResult {
    if PHONE_RE.is_match(value) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid("Enter a valid phone number")
    }
}
