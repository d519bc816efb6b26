//! Field-scoped validation errors shared by the identity and registration rules

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Latin letters, Latin-1 accented letters and whitespace
static PERSON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s]+$").expect("person name pattern"));

/// Form field a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Cpf,
    FullName,
    BirthDate,
    Name,
    Email,
    Password,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Cpf => "cpf",
            Field::FullName => "full name",
            Field::BirthDate => "birth date",
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
        };
        f.write_str(name)
    }
}

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Empty or blank
    Missing,
    /// Wrong shape (e.g. not DD/MM/YYYY)
    Format,
    /// Below the minimum length
    TooShort,
    /// Characters outside the allowed set
    InvalidCharacters,
    /// Parsed, but a component is out of range
    OutOfRange,
    /// Younger than 18 by year difference
    Underage,
    /// Any other rule failure
    Invalid,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::Missing => "is required",
            Rejection::Format => "has an invalid format",
            Rejection::TooShort => "is too short",
            Rejection::InvalidCharacters => "contains invalid characters",
            Rejection::OutOfRange => "is out of range",
            Rejection::Underage => "must be 18 or older",
            Rejection::Invalid => "is invalid",
        };
        f.write_str(text)
    }
}

/// A single field failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub reason: Rejection,
}

impl FieldError {
    pub fn new(field: Field, reason: Rejection) -> Self {
        Self { field, reason }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// All failures of one form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Record the error side of a field check
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Rejection recorded for a field, if any
    pub fn get(&self, field: Field) -> Option<Rejection> {
        self.0.iter().find(|e| e.field == field).map(|e| e.reason)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Person name rule: trimmed length ≥ 3, Latin letters (accents included) and whitespace only
pub(crate) fn validate_person_name(field: Field, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, Rejection::Missing));
    }
    if trimmed.chars().count() < 3 {
        return Err(FieldError::new(field, Rejection::TooShort));
    }
    if !PERSON_NAME.is_match(value) {
        return Err(FieldError::new(field, Rejection::InvalidCharacters));
    }
    Ok(trimmed.to_string())
}
