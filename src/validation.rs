//! Field rules for the teacher form, expressed as pure predicates. Each
//! predicate looks at one raw input value and reports at most one failure; the
//! per-field validators compose them in a fixed priority order so the message
//! shown to the user is stable.

use chrono::NaiveDate;
use thiserror::Error;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const CLASSES_MIN: u32 = 1;
pub const CLASSES_MAX: u32 = 50;
/// Input format accepted for the date of birth.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields of the teacher form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    DateOfBirth,
    NumberOfClasses,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::FullName, Field::DateOfBirth, Field::NumberOfClasses];

    pub fn display_name(self) -> &'static str {
        match self {
            Field::FullName => "Full Name",
            Field::DateOfBirth => "Date of Birth",
            Field::NumberOfClasses => "Number of Classes",
        }
    }
}

/// Which rule a value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    BelowMin { min: u32 },
    AboveMax { max: u32 },
    Pattern,
    InvalidDate,
    NotInPast,
}

/// A rule failure tied to the field it happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct ValidationError {
    pub field: Field,
    pub kind: FieldErrorKind,
}

impl ValidationError {
    pub fn message(&self) -> String {
        let name = self.field.display_name();
        match self.kind {
            FieldErrorKind::Required => format!("{name} is required"),
            FieldErrorKind::TooShort { min } => format!("{name} must be at least {min} characters"),
            FieldErrorKind::TooLong { max } => format!("{name} cannot exceed {max} characters"),
            FieldErrorKind::BelowMin { min } => format!("{name} must be at least {min}"),
            FieldErrorKind::AboveMax { max } => format!("{name} cannot exceed {max}"),
            FieldErrorKind::Pattern => match self.field {
                Field::FullName => "Full name can only contain letters and spaces".to_string(),
                Field::NumberOfClasses => "Number of classes must be a valid number".to_string(),
                Field::DateOfBirth => format!("{name} must be a valid date (YYYY-MM-DD)"),
            },
            FieldErrorKind::InvalidDate => format!("{name} must be a valid date (YYYY-MM-DD)"),
            FieldErrorKind::NotInPast => "Date of birth must be in the past".to_string(),
        }
    }
}

pub fn required(value: &str) -> Option<FieldErrorKind> {
    value.trim().is_empty().then_some(FieldErrorKind::Required)
}

pub fn min_length(value: &str, min: usize) -> Option<FieldErrorKind> {
    (value.chars().count() < min).then_some(FieldErrorKind::TooShort { min })
}

pub fn max_length(value: &str, max: usize) -> Option<FieldErrorKind> {
    (value.chars().count() > max).then_some(FieldErrorKind::TooLong { max })
}

/// Numeric lower bound. Values that do not read as a number are left to the
/// pattern rule.
pub fn min_value(value: &str, min: u32) -> Option<FieldErrorKind> {
    let number = value.trim().parse::<f64>().ok()?;
    (number < f64::from(min)).then_some(FieldErrorKind::BelowMin { min })
}

pub fn max_value(value: &str, max: u32) -> Option<FieldErrorKind> {
    let number = value.trim().parse::<f64>().ok()?;
    (number > f64::from(max)).then_some(FieldErrorKind::AboveMax { max })
}

/// ASCII letters and whitespace only.
pub fn letters_and_spaces(value: &str) -> Option<FieldErrorKind> {
    let ok = value
        .chars()
        .all(|ch| ch.is_ascii_alphabetic() || ch.is_whitespace());
    (!ok).then_some(FieldErrorKind::Pattern)
}

pub fn digits_only(value: &str) -> Option<FieldErrorKind> {
    let trimmed = value.trim();
    let ok = !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit());
    (!ok).then_some(FieldErrorKind::Pattern)
}

/// The date must fall strictly before `today`; only calendar days are compared.
pub fn past_date(value: &str, today: NaiveDate) -> Option<FieldErrorKind> {
    match parse_date(value) {
        Some(date) if date < today => None,
        Some(_) => Some(FieldErrorKind::NotInPast),
        None => Some(FieldErrorKind::InvalidDate),
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn first_failure(
    field: Field,
    rules: impl IntoIterator<Item = Option<FieldErrorKind>>,
) -> Result<(), ValidationError> {
    match rules.into_iter().flatten().next() {
        Some(kind) => Err(ValidationError { field, kind }),
        None => Ok(()),
    }
}

pub fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    if let Some(kind) = required(value) {
        return Err(ValidationError { field: Field::FullName, kind });
    }
    first_failure(
        Field::FullName,
        [
            min_length(value, NAME_MIN_LEN),
            max_length(value, NAME_MAX_LEN),
            letters_and_spaces(value),
        ],
    )
}

pub fn validate_date_of_birth(value: &str, today: NaiveDate) -> Result<(), ValidationError> {
    if let Some(kind) = required(value) {
        return Err(ValidationError { field: Field::DateOfBirth, kind });
    }
    first_failure(Field::DateOfBirth, [past_date(value, today)])
}

pub fn validate_number_of_classes(value: &str) -> Result<(), ValidationError> {
    if let Some(kind) = required(value) {
        return Err(ValidationError { field: Field::NumberOfClasses, kind });
    }
    first_failure(
        Field::NumberOfClasses,
        [
            min_value(value, CLASSES_MIN),
            max_value(value, CLASSES_MAX),
            digits_only(value),
        ],
    )
}

/// Validate one field by name.
pub fn validate_field(field: Field, value: &str, today: NaiveDate) -> Result<(), ValidationError> {
    match field {
        Field::FullName => validate_full_name(value),
        Field::DateOfBirth => validate_date_of_birth(value, today),
        Field::NumberOfClasses => validate_number_of_classes(value),
    }
}
