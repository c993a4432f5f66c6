//! Field rules shared by the API handlers and the client controllers.
//!
//! Every rule returns a [`ValidationError`] carrying the message shown to the
//! user. A [`Report`] collects the failures of one payload in field order.

use std::borrow::Cow;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::models::Gender;

static ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());
static LETTERS_AND_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());
static WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9\s]+$").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").unwrap());
static PHONE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-()]").unwrap());

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_ROLL_NUMBER_LENGTH: usize = 20;
pub const MAX_ADDRESS_LENGTH: usize = 500;
pub const STUDENT_AGE_RANGE: std::ops::RangeInclusive<i64> = 5..=25;
pub const PHONE_DIGITS_RANGE: std::ops::RangeInclusive<usize> = 7..=15;

/// A numeric form field. Browsers post form values as strings, API clients as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl Numeric {
    /// Whole, non-negative value, if the field holds one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Numeric::Integer(value) => Some(*value).filter(|v| *v >= 0),
            Numeric::Decimal(_) => None,
            Numeric::Text(text) => {
                let text = text.trim();
                if DIGITS.is_match(text) {
                    text.parse().ok()
                } else {
                    None
                }
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Numeric::Text(text) if text.trim().is_empty())
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Integer(value)
    }
}

fn failure(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn present(value: Option<&Numeric>) -> Option<&Numeric> {
    value.filter(|v| !v.is_blank())
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn is_only_digits(value: &str) -> bool {
    DIGITS.is_match(value)
}

pub fn class_name(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(failure("required", "Class name cannot be empty"));
    }
    if char_len(value) > MAX_NAME_LENGTH {
        return Err(failure("length", "Class name must be 100 characters or less"));
    }
    if !WORDS.is_match(value) {
        return Err(failure(
            "pattern",
            "Class name can only contain letters, numbers and spaces",
        ));
    }
    if DIGITS.is_match(value) {
        return Err(failure("pattern", "Class name cannot be only numbers"));
    }
    Ok(())
}

/// Required positive integer such as a class number.
pub fn positive_integer(value: Option<&Numeric>, label: &str) -> Result<(), ValidationError> {
    let Some(value) = present(value) else {
        return Err(failure("required", format!("{} is required", label)));
    };
    match value.as_integer() {
        Some(number) if number > 0 => Ok(()),
        _ => Err(failure(
            "range",
            format!("{} must be a positive number", label),
        )),
    }
}

pub fn roll_number(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(failure("required", "Roll number is required"));
    }
    if char_len(value) > MAX_ROLL_NUMBER_LENGTH {
        return Err(failure("length", "Roll number must be 20 characters or less"));
    }
    if !ALPHANUMERIC.is_match(value) {
        return Err(failure(
            "pattern",
            "Roll number can only contain letters and numbers, no special characters",
        ));
    }
    Ok(())
}

pub fn person_name(value: &str, label: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(failure("required", format!("{} is required", label)));
    }
    if char_len(value) > MAX_NAME_LENGTH {
        return Err(failure(
            "length",
            format!("{} must be 100 characters or less", label),
        ));
    }
    if !LETTERS_AND_SPACES.is_match(value) {
        return Err(failure(
            "pattern",
            format!("{} can only contain letters and spaces", label),
        ));
    }
    if DIGITS.is_match(value) {
        return Err(failure(
            "pattern",
            format!("{} cannot be only numbers", label),
        ));
    }
    Ok(())
}

pub fn required_text(value: &str, label: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(failure("required", format!("{} is required", label)));
    }
    if char_len(value.trim()) > MAX_NAME_LENGTH {
        return Err(failure(
            "length",
            format!("{} must be 100 characters or less", label),
        ));
    }
    Ok(())
}

pub fn student_age(value: Option<&Numeric>) -> Result<(), ValidationError> {
    let Some(value) = present(value) else {
        return Ok(());
    };
    match value.as_integer() {
        None => Err(failure("type", "Age must be a positive number")),
        Some(age) if !STUDENT_AGE_RANGE.contains(&age) => {
            Err(failure("range", "Age must be between 5 and 25"))
        }
        Some(_) => Ok(()),
    }
}

pub fn teacher_age(value: Option<&Numeric>) -> Result<(), ValidationError> {
    match present(value) {
        Some(value) if value.as_integer().is_none() => {
            Err(failure("type", "Age must be a positive number"))
        }
        _ => Ok(()),
    }
}

pub fn gender(value: Option<&str>) -> Result<(), ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) if Gender::parse(value).is_none() => Err(failure(
            "choice",
            "Gender must be Male, Female, or Other",
        )),
        _ => Ok(()),
    }
}

pub fn address(value: Option<&str>) -> Result<(), ValidationError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    if DIGITS.is_match(&WHITESPACE.replace_all(value, "")) {
        return Err(failure("pattern", "Address cannot be only numbers"));
    }
    if char_len(value) > MAX_ADDRESS_LENGTH {
        return Err(failure("length", "Address must be 500 characters or less"));
    }
    Ok(())
}

/// Digits left after dropping spaces, hyphens and parentheses.
pub fn phone_digits(value: &str) -> String {
    PHONE_SEPARATORS.replace_all(value.trim(), "").into_owned()
}

pub fn phone(value: Option<&str>) -> Result<(), ValidationError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    let digits = phone_digits(value);
    if !DIGITS.is_match(&digits) {
        return Err(failure(
            "pattern",
            "Phone number can only contain digits, spaces, hyphens, and parentheses",
        ));
    }
    if digits.len() > *PHONE_DIGITS_RANGE.end() {
        return Err(failure("length", "Phone number must be 15 digits or less"));
    }
    if digits.len() < *PHONE_DIGITS_RANGE.start() {
        return Err(failure("length", "Phone number must be at least 7 digits"));
    }
    Ok(())
}

pub fn subject_name(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(failure("required", "Subject name is required"));
    }
    if char_len(value) > MAX_NAME_LENGTH {
        return Err(failure("length", "Subject name must be 100 characters or less"));
    }
    if !WORDS.is_match(value) {
        return Err(failure(
            "pattern",
            "Subject name can only contain letters, numbers and spaces",
        ));
    }
    if DIGITS.is_match(value) {
        return Err(failure("pattern", "Subject name cannot be only numbers"));
    }
    Ok(())
}

pub fn max_marks(value: Option<&Numeric>) -> Result<(), ValidationError> {
    let Some(value) = present(value) else {
        return Ok(());
    };
    match value {
        Numeric::Integer(marks) if *marks < 1 => {
            Err(failure("range", "Maximum marks must be at least 1"))
        }
        _ => match value.as_integer() {
            None => Err(failure(
                "type",
                "Maximum marks can only be positive number",
            )),
            Some(0) => Err(failure("range", "Maximum marks must be at least 1")),
            Some(_) => Ok(()),
        },
    }
}

pub fn hire_date(value: Option<&str>) -> Result<(), ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() => Err(failure(
            "format",
            "Hire date must be a valid date (YYYY-MM-DD)",
        )),
        _ => Ok(()),
    }
}

/// Failures of one payload, kept in the order the fields were checked.
#[derive(Debug, Default)]
pub struct Report {
    failures: Vec<(&'static str, ValidationError)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, field: &'static str, outcome: Result<(), ValidationError>) -> Self {
        if let Err(error) = outcome {
            self.failures.push((field, error));
        }
        self
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.failures.iter().map(|(field, _)| *field).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|(_, error)| {
                error
                    .message
                    .as_deref()
                    .map(str::to_string)
                    .unwrap_or_else(|| error.code.to_string())
            })
            .collect()
    }

    /// All messages joined the way the API reports them.
    pub fn message(&self) -> Option<String> {
        if self.is_clean() {
            None
        } else {
            Some(self.messages().join(", "))
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        let Some(message) = self.message() else {
            return Ok(());
        };

        let mut fields = ValidationErrors::new();
        for (field, error) in self.failures {
            fields.add(field, error);
        }

        Err(AppError::Validation { message, fields })
    }
}

/// A request payload validated against the shared rule set.
pub trait Checked {
    fn report(&self) -> Report;

    fn check(&self) -> Result<(), AppError> {
        self.report().finish()
    }
}
