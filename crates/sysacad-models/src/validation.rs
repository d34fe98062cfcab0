//! Field and cross-field rules for student records.
//!
//! Every function here is pure: it receives the candidate value and "today",
//! and returns either the normalized value or a [`ValidationError`] whose
//! message is meant for the API caller. The DTOs in [`crate::students`] apply
//! these per field and collect the failures into a [`validator::ValidationErrors`].
//!
//! Ages are always computed with [`calculate_age`], which compares calendar
//! (month, day) pairs instead of dividing day counts, so results are exact on
//! birthdays and across leap years.

use std::borrow::Cow;

use chrono::{Datelike, NaiveDate, TimeDelta};
use validator::ValidationError;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;
pub const DOCUMENT_NUMBER_MIN_LEN: usize = 5;
pub const DOCUMENT_NUMBER_MAX_LEN: usize = 50;
pub const MIN_AGE: i32 = 10;
pub const MAX_AGE: i32 = 120;
pub const MAX_AGE_AT_ENROLLMENT: i32 = 100;
pub const ENROLLMENT_MAX_DAYS_AHEAD: i64 = 365;
pub const ENROLLMENT_MAX_DAYS_BEHIND: i64 = 365 * 50;
pub const DESCRIPTION_MAX_LEN: usize = 100;

fn rule_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Whole years elapsed between `birth_date` and `reference`.
///
/// The year difference is decremented when the reference (month, day) falls
/// before the birth (month, day). A reference before the birth date yields a
/// negative number; callers reject that ordering before relying on the value.
pub fn calculate_age(birth_date: NaiveDate, reference: NaiveDate) -> i32 {
    let mut age = reference.year() - birth_date.year();
    if (reference.month(), reference.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Python-style title casing: a letter is upper-cased when it follows a
/// non-letter (or starts the string), lower-cased otherwise.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

/// Validates a first or last name and returns it trimmed and title-cased.
///
/// `label` is the human name of the field used in messages ("First name").
pub fn normalize_name(value: &str, label: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(rule_error(
            "blank",
            format!("{} cannot be only whitespace.", label),
        ));
    }

    if !trimmed.chars().next().is_some_and(char::is_alphabetic) {
        return Err(rule_error(
            "first_char",
            format!("{} must start with a letter.", label),
        ));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-')
    {
        return Err(rule_error(
            "charset",
            format!("{} must contain only letters, spaces, or hyphens.", label),
        ));
    }

    let len = trimmed.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(rule_error(
            "length",
            format!(
                "{} must be between {} and {} characters.",
                label, NAME_MIN_LEN, NAME_MAX_LEN
            ),
        ));
    }

    Ok(title_case(trimmed))
}

/// Validates a document number.
///
/// Dots, hyphens and spaces are separators: they are ignored for the
/// alphanumeric and length checks but kept in the stored value, which is only
/// trimmed.
pub fn normalize_document_number(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(rule_error(
            "blank",
            "Document number cannot be only whitespace.",
        ));
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(char::is_alphanumeric) {
        return Err(rule_error(
            "charset",
            "Document number must contain only alphanumeric characters",
        ));
    }

    let len = cleaned.chars().count();
    if !(DOCUMENT_NUMBER_MIN_LEN..=DOCUMENT_NUMBER_MAX_LEN).contains(&len) {
        return Err(rule_error(
            "length",
            format!(
                "Document number must have between {} and {} alphanumeric characters.",
                DOCUMENT_NUMBER_MIN_LEN, DOCUMENT_NUMBER_MAX_LEN
            ),
        ));
    }

    // Separators are stored too, so the kept value has its own bound.
    if trimmed.chars().count() > DOCUMENT_NUMBER_MAX_LEN {
        return Err(rule_error(
            "too_long",
            format!(
                "Document number must not exceed {} characters.",
                DOCUMENT_NUMBER_MAX_LEN
            ),
        ));
    }

    Ok(trimmed.to_string())
}

pub fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if birth_date > today {
        return Err(rule_error("future", "Birth date cannot be in the future."));
    }

    let age = calculate_age(birth_date, today);

    if age < MIN_AGE {
        return Err(rule_error(
            "too_young",
            format!("Student must be at least {} years old.", MIN_AGE),
        ));
    }

    if age > MAX_AGE {
        return Err(rule_error(
            "too_old",
            "Birth date is too far in the past.",
        ));
    }

    Ok(())
}

pub fn validate_enrollment_date(
    enrollment_date: NaiveDate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if enrollment_date > today + TimeDelta::days(ENROLLMENT_MAX_DAYS_AHEAD) {
        return Err(rule_error(
            "too_far_ahead",
            "Enrollment date cannot be more than 1 year in the future.",
        ));
    }

    if enrollment_date < today - TimeDelta::days(ENROLLMENT_MAX_DAYS_BEHIND) {
        return Err(rule_error(
            "too_far_behind",
            "Enrollment date cannot be more than 50 years in the past.",
        ));
    }

    Ok(())
}

/// Rejects zero and negative identifiers.
pub fn validate_positive_id(value: i64, label: &str) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(rule_error(
            "positive",
            format!("{} must be a positive integer.", label),
        ));
    }
    Ok(())
}

/// Cross-field rule between birth and enrollment dates.
///
/// Ordering is checked first so the age is never computed for an enrollment
/// that precedes the birth.
pub fn validate_enrollment_age(
    birth_date: NaiveDate,
    enrollment_date: NaiveDate,
) -> Result<(), ValidationError> {
    if enrollment_date < birth_date {
        return Err(rule_error(
            "before_birth",
            "Enrollment date cannot be before birth date.",
        ));
    }

    let age_at_enrollment = calculate_age(birth_date, enrollment_date);

    if age_at_enrollment < MIN_AGE {
        return Err(rule_error(
            "too_young_at_enrollment",
            format!("Student must be at least {} years old at enrollment.", MIN_AGE),
        ));
    }

    if age_at_enrollment > MAX_AGE_AT_ENROLLMENT {
        return Err(rule_error(
            "too_old_at_enrollment",
            format!(
                "Age at enrollment is unrealistic (more than {} years).",
                MAX_AGE_AT_ENROLLMENT
            ),
        ));
    }

    Ok(())
}

/// Trims a document type description and enforces its maximum length.
pub fn normalize_description(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(rule_error(
            "length",
            format!(
                "Description must not exceed {} characters.",
                DESCRIPTION_MAX_LEN
            ),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn code(result: Result<impl std::fmt::Debug, ValidationError>) -> String {
        result.unwrap_err().code.to_string()
    }

    #[test]
    fn test_calculate_age_is_calendar_exact() {
        assert_eq!(calculate_age(date(1915, 1, 1), date(2020, 3, 1)), 105);
        assert_eq!(calculate_age(date(2000, 5, 15), date(2020, 5, 14)), 19);
        assert_eq!(calculate_age(date(2000, 5, 15), date(2020, 5, 15)), 20);
        assert_eq!(calculate_age(date(2000, 2, 29), date(2010, 2, 28)), 9);
        assert_eq!(calculate_age(date(2000, 2, 29), date(2010, 3, 1)), 10);
    }

    #[test]
    fn test_calculate_age_before_birth_is_negative() {
        assert_eq!(calculate_age(date(2000, 5, 15), date(2000, 5, 14)), -1);
    }

    #[test]
    fn test_normalize_name_title_cases() {
        assert_eq!(
            normalize_name("  juan carlos ", "First name").unwrap(),
            "Juan Carlos"
        );
        assert_eq!(
            normalize_name("pérez garcía", "Last name").unwrap(),
            "Pérez García"
        );
        assert_eq!(
            normalize_name("o-NEIL", "Last name").unwrap(),
            "O-Neil"
        );
    }

    #[test]
    fn test_normalize_name_rejections() {
        assert_eq!(code(normalize_name("   ", "First name")), "blank");
        assert_eq!(code(normalize_name("-Ana", "First name")), "first_char");
        assert_eq!(code(normalize_name("Ana3", "First name")), "charset");
        assert_eq!(code(normalize_name("O'Brien", "Last name")), "charset");
        assert_eq!(code(normalize_name("A", "First name")), "length");
        assert_eq!(code(normalize_name(&"a".repeat(51), "First name")), "length");
    }

    #[test]
    fn test_normalize_name_message_uses_label() {
        let err = normalize_name("9", "Last name").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Last name must start with a letter."
        );
    }

    #[test]
    fn test_normalize_document_number_keeps_punctuation() {
        assert_eq!(
            normalize_document_number("  12.345.678 ").unwrap(),
            "12.345.678"
        );
        assert_eq!(normalize_document_number("AB-12345").unwrap(), "AB-12345");
    }

    #[test]
    fn test_normalize_document_number_rejections() {
        assert_eq!(code(normalize_document_number("  ")), "blank");
        assert_eq!(code(normalize_document_number("12/345/678")), "charset");
        assert_eq!(code(normalize_document_number("..--")), "charset");
        assert_eq!(code(normalize_document_number("1.2.3.4")), "length");
        assert_eq!(
            code(normalize_document_number(&"1.".repeat(30))),
            "too_long"
        );
    }

    #[test]
    fn test_normalize_document_number_measures_trimmed_value() {
        let padded = format!("    {}    ", "1".repeat(50));
        assert_eq!(normalize_document_number(&padded).unwrap(), "1".repeat(50));
    }

    #[test]
    fn test_validate_birth_date() {
        let today = date(2024, 6, 1);
        assert!(validate_birth_date(date(2000, 5, 15), today).is_ok());
        assert_eq!(code(validate_birth_date(date(2030, 1, 1), today)), "future");
        assert_eq!(code(validate_birth_date(date(2014, 6, 2), today)), "too_young");
        assert!(validate_birth_date(date(2014, 6, 1), today).is_ok());
        assert_eq!(code(validate_birth_date(date(1903, 1, 1), today)), "too_old");
        assert!(validate_birth_date(date(1904, 6, 1), today).is_ok());
    }

    #[test]
    fn test_validate_enrollment_date_window() {
        let today = date(2024, 6, 1);
        assert!(validate_enrollment_date(today, today).is_ok());
        assert!(validate_enrollment_date(date(2025, 6, 1), today).is_ok());
        assert_eq!(
            code(validate_enrollment_date(date(2025, 6, 2), today)),
            "too_far_ahead"
        );
        let limit = today - TimeDelta::days(ENROLLMENT_MAX_DAYS_BEHIND);
        assert!(validate_enrollment_date(limit, today).is_ok());
        assert_eq!(
            code(validate_enrollment_date(limit - TimeDelta::days(1), today)),
            "too_far_behind"
        );
    }

    #[test]
    fn test_validate_positive_id() {
        assert!(validate_positive_id(1, "Specialty ID").is_ok());
        assert_eq!(code(validate_positive_id(0, "Specialty ID")), "positive");
        assert_eq!(code(validate_positive_id(-4, "Document type ID")), "positive");
    }

    #[test]
    fn test_validate_enrollment_age() {
        assert!(validate_enrollment_age(date(2000, 5, 15), date(2020, 3, 1)).is_ok());
        assert_eq!(
            code(validate_enrollment_age(date(2000, 5, 15), date(2000, 5, 14))),
            "before_birth"
        );
        assert_eq!(
            code(validate_enrollment_age(date(2010, 5, 15), date(2020, 5, 14))),
            "too_young_at_enrollment"
        );
        assert!(validate_enrollment_age(date(2010, 5, 15), date(2020, 5, 15)).is_ok());
        assert_eq!(
            code(validate_enrollment_age(date(1915, 1, 1), date(2020, 3, 1))),
            "too_old_at_enrollment"
        );
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  Passport  ").unwrap(), "Passport");
        assert!(normalize_description(&"x".repeat(100)).is_ok());
        assert_eq!(code(normalize_description(&"x".repeat(101))), "length");
    }
}
