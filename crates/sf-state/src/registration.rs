//! Account registration rules (name, email, password)

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::{Field, FieldError, Rejection, ValidationErrors, validate_person_name};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern"));

/// Minimum password length, in characters
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration form as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Accepted registration (password is not kept)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
}

pub fn validate_name(name: &str) -> Result<String, FieldError> {
    validate_person_name(Field::Name, name)
}

/// Loose `\S+@\S+\.\S+` shape check
pub fn validate_email(email: &str) -> Result<String, FieldError> {
    if email.trim().is_empty() {
        return Err(FieldError::new(Field::Email, Rejection::Missing));
    }
    if !EMAIL.is_match(email) {
        return Err(FieldError::new(Field::Email, Rejection::Format));
    }
    Ok(email.trim().to_string())
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.trim().is_empty() {
        return Err(FieldError::new(Field::Password, Rejection::Missing));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(Field::Password, Rejection::TooShort));
    }
    Ok(())
}

pub fn validate_registration(input: &RegistrationInput) -> Result<Registration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = errors.check(validate_name(&input.name));
    let email = errors.check(validate_email(&input.email));
    errors.check(validate_password(&input.password));

    match (name, email) {
        (Some(name), Some(email)) if errors.is_empty() => Ok(Registration { name, email }),
        _ => Err(errors),
    }
}
