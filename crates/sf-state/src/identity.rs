//! Identity gate rules (CPF, full name, birth date)
//!
//! The CPF check counts digits only; no checksum is computed. The age rule
//! compares calendar years only (`current_year - birth_year < 18` is
//! rejected), so someone born late in the year passes a few months early.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::{Field, FieldError, Rejection, ValidationErrors, validate_person_name};

static BIRTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("birth date pattern")
});

/// Number of digits in a CPF
pub const CPF_DIGITS: usize = 11;

/// Minimum age, in calendar years
pub const MINIMUM_AGE_YEARS: i32 = 18;

/// Earliest accepted birth year
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// Identity form as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInput {
    pub cpf: String,
    pub full_name: String,
    /// `DD/MM/YYYY`
    pub birth_date: String,
}

/// Parsed `DD/MM/YYYY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
    pub day: u8,
    pub month: u8,
    pub year: i32,
}

/// Accepted identity, as stored on the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Formatted as entered (`000.000.000-00`)
    pub cpf: String,
    pub full_name: String,
    pub birth_date: String,
}

/// Digits of a CPF, if there are exactly 11 of them
pub fn validate_cpf(cpf: &str) -> Result<String, FieldError> {
    if cpf.trim().is_empty() {
        return Err(FieldError::new(Field::Cpf, Rejection::Missing));
    }
    let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != CPF_DIGITS {
        return Err(FieldError::new(Field::Cpf, Rejection::Invalid));
    }
    Ok(digits)
}

/// Progressive `000.000.000-00` mask over whatever digits were typed
pub fn format_cpf(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CPF_DIGITS)
        .collect();
    let len = digits.len();
    match len {
        0..=3 => digits,
        4..=6 => format!("{}.{}", &digits[..3], &digits[3..]),
        7..=9 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        ),
    }
}

pub fn validate_full_name(name: &str) -> Result<String, FieldError> {
    validate_person_name(Field::FullName, name)
}

/// Parse and check a `DD/MM/YYYY` birth date against the current year
pub fn validate_birth_date(value: &str, current_year: i32) -> Result<BirthDate, FieldError> {
    let error = |reason| FieldError::new(Field::BirthDate, reason);

    if value.is_empty() {
        return Err(error(Rejection::Missing));
    }

    let Some(caps) = BIRTH_DATE.captures(value) else {
        return Err(error(Rejection::Format));
    };
    let (Ok(day), Ok(month), Ok(year)) = (
        caps[1].parse::<u8>(),
        caps[2].parse::<u8>(),
        caps[3].parse::<i32>(),
    ) else {
        return Err(error(Rejection::Format));
    };

    if !(1..=31).contains(&day)
        || !(1..=12).contains(&month)
        || year < MIN_BIRTH_YEAR
        || year > current_year
    {
        return Err(error(Rejection::OutOfRange));
    }
    if current_year - year < MINIMUM_AGE_YEARS {
        return Err(error(Rejection::Underage));
    }

    Ok(BirthDate { day, month, year })
}

/// Check all three fields, collecting every failure
pub fn validate_identity(
    input: &IdentityInput,
    current_year: i32,
) -> Result<IdentityRecord, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(validate_cpf(&input.cpf));
    let full_name = errors.check(validate_full_name(&input.full_name));
    errors.check(validate_birth_date(&input.birth_date, current_year));

    match full_name {
        Some(full_name) if errors.is_empty() => Ok(IdentityRecord {
            cpf: format_cpf(&input.cpf),
            full_name,
            birth_date: input.birth_date.clone(),
        }),
        _ => Err(errors),
    }
}
