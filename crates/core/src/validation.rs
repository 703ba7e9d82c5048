//! Field-level input validators.
//!
//! Each validator checks one user-entered value and returns the message to show beside the
//! field on failure. Validators that depend on the current date take `today` explicitly.

use crate::constants::{
    DEFAULT_MAX_FILE_SIZE, EMAIL_PATTERN, PASSWORD_MIN_LEN, PASSWORD_SPECIAL_CHARS, PHONE_PATTERN,
    SSN_PATTERN, ZIP_CODE_PATTERN,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Message for a field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FieldError(pub String);

impl FieldError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type FieldResult = Result<(), FieldError>;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| compile(EMAIL_PATTERN));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| compile(PHONE_PATTERN));
static ZIP_CODE_RE: LazyLock<Regex> = LazyLock::new(|| compile(ZIP_CODE_PATTERN));
static SSN_RE: LazyLock<Regex> = LazyLock::new(|| compile(SSN_PATTERN));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants covered by the tests below.
    Regex::new(pattern).expect("built-in validation pattern must compile")
}

fn required(value: &str, message: impl Into<String>) -> FieldResult {
    if value.is_empty() {
        return Err(FieldError::new(message));
    }
    Ok(())
}

/// Validates an email address against the built-in address pattern.
///
/// # Arguments
///
/// * `email` - The address as entered. Surrounding whitespace is not trimmed.
///
/// # Errors
///
/// Returns a `FieldError` reading "Email is required" for an empty string, or
/// "Please enter a valid email address" when the pattern does not match.
pub fn validate_email(email: &str) -> FieldResult {
    required(email, "Email is required")?;
    if !EMAIL_RE.is_match(email) {
        return Err(FieldError::new("Please enter a valid email address"));
    }
    Ok(())
}

/// Validates a phone number such as `(555) 123-4567`: three digits, optionally after a `+` or
/// in parentheses, then three digits and four to six digits. Groups may be separated by one
/// space, dash or dot.
///
/// # Errors
///
/// Returns a `FieldError` when `phone` is empty or does not match.
pub fn validate_phone(phone: &str) -> FieldResult {
    required(phone, "Phone number is required")?;
    if !PHONE_RE.is_match(phone) {
        return Err(FieldError::new("Please enter a valid phone number"));
    }
    Ok(())
}

/// Lists every missing character class in one message.
pub fn validate_password(password: &str) -> FieldResult {
    required(password, "Password is required")?;

    let mut missing = Vec::new();
    if password.chars().count() < PASSWORD_MIN_LEN {
        missing.push("at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        missing.push("one special character");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FieldError(format!(
            "Password must contain {}",
            missing.join(", ")
        )))
    }
}

pub fn validate_confirm_password(password: &str, confirm_password: &str) -> FieldResult {
    required(confirm_password, "Please confirm your password")?;
    if password != confirm_password {
        return Err(FieldError::new("Passwords do not match"));
    }
    Ok(())
}

/// Names are 2 to 50 characters of letters and whitespace.
pub fn validate_name(name: &str, field_name: &str) -> FieldResult {
    required(name, format!("{field_name} is required"))?;
    let len = name.chars().count();
    if len < 2 {
        return Err(FieldError(format!(
            "{field_name} must be at least 2 characters"
        )));
    }
    if len > 50 {
        return Err(FieldError(format!(
            "{field_name} must be less than 50 characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        return Err(FieldError(format!("{field_name} can only contain letters")));
    }
    Ok(())
}

/// `None` and the empty string are missing; anything else, including `"0"`, is present.
pub fn validate_required(value: Option<&str>, field_name: &str) -> FieldResult {
    match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(FieldError(format!("{field_name} is required"))),
    }
}

/// Parses `value` as a number and checks it against optional inclusive bounds.
///
/// # Arguments
///
/// * `value` - The raw field text; leading and trailing whitespace is ignored when parsing.
/// * `min` - Smallest accepted value, if any.
/// * `max` - Largest accepted value, if any.
/// * `field_name` - Used as the subject of every message.
///
/// # Errors
///
/// Returns a `FieldError` when the value is empty, is not a number, or falls outside the bounds.
pub fn validate_number(
    value: &str,
    min: Option<f64>,
    max: Option<f64>,
    field_name: &str,
) -> FieldResult {
    required(value, format!("{field_name} is required"))?;
    let num: f64 = value
        .trim()
        .parse()
        .map_err(|_| FieldError(format!("{field_name} must be a number")))?;
    if num.is_nan() {
        return Err(FieldError(format!("{field_name} must be a number")));
    }
    if let Some(min) = min.filter(|&min| num < min) {
        return Err(FieldError(format!("{field_name} must be at least {min}")));
    }
    if let Some(max) = max.filter(|&max| num > max) {
        return Err(FieldError(format!("{field_name} must be at most {max}")));
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339 timestamps.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn checked_date(date: &str, field_name: &str) -> Result<NaiveDate, FieldError> {
    required(date, format!("{field_name} is required"))?;
    parse_date(date).ok_or_else(|| FieldError(format!("{field_name} is invalid")))
}

pub fn validate_date(date: &str, field_name: &str) -> FieldResult {
    checked_date(date, field_name).map(|_| ())
}

/// Today counts as the future.
pub fn validate_future_date(date: &str, field_name: &str, today: NaiveDate) -> FieldResult {
    if checked_date(date, field_name)? < today {
        return Err(FieldError(format!("{field_name} must be in the future")));
    }
    Ok(())
}

/// Today counts as the past.
pub fn validate_past_date(date: &str, field_name: &str, today: NaiveDate) -> FieldResult {
    if checked_date(date, field_name)? > today {
        return Err(FieldError(format!("{field_name} must be in the past")));
    }
    Ok(())
}

/// Whole years between `date_of_birth` and `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

pub fn validate_age(date_of_birth: &str, min_age: i32, max_age: i32, today: NaiveDate) -> FieldResult {
    validate_past_date(date_of_birth, "Date of birth", today)?;
    let dob = checked_date(date_of_birth, "Date of birth")?;
    let age = age_on(dob, today);
    if age < min_age {
        return Err(FieldError(format!("Age must be at least {min_age} years")));
    }
    if age > max_age {
        return Err(FieldError(format!("Age must be at most {max_age} years")));
    }
    Ok(())
}

/// Absolute URLs only: a scheme followed by `:` and a non-empty remainder.
pub fn validate_url(url: &str) -> FieldResult {
    required(url, "URL is required")?;
    let valid = url.split_once(':').is_some_and(|(scheme, rest)| {
        !rest.is_empty()
            && !url.contains(char::is_whitespace)
            && scheme
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    });
    if !valid {
        return Err(FieldError::new("Please enter a valid URL"));
    }
    Ok(())
}

pub fn validate_zip_code(zip_code: &str) -> FieldResult {
    required(zip_code, "ZIP code is required")?;
    if !ZIP_CODE_RE.is_match(zip_code) {
        return Err(FieldError::new("Please enter a valid ZIP code"));
    }
    Ok(())
}

pub fn validate_ssn(ssn: &str) -> FieldResult {
    required(ssn, "SSN is required")?;
    if !SSN_RE.is_match(ssn) {
        return Err(FieldError::new("Please enter a valid SSN (XXX-XX-XXXX)"));
    }
    Ok(())
}

/// Size and media type of a file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate<'a> {
    pub size_bytes: u64,
    pub media_type: &'a str,
}

/// `max_size` defaults to 10 MiB. An empty `allowed_types` accepts any type.
pub fn validate_file(
    file: Option<&FileCandidate<'_>>,
    max_size: Option<u64>,
    allowed_types: &[&str],
) -> FieldResult {
    let Some(file) = file else {
        return Err(FieldError::new("File is required"));
    };
    let max_size = max_size.unwrap_or(DEFAULT_MAX_FILE_SIZE);
    if file.size_bytes > max_size {
        return Err(FieldError(format!(
            "File size must be less than {:.0}MB",
            max_size as f64 / 1_048_576.0
        )));
    }
    if !allowed_types.is_empty() && !allowed_types.contains(&file.media_type) {
        return Err(FieldError::new("File type not allowed"));
    }
    Ok(())
}

pub fn validate_array<T>(items: &[T], min_length: usize, field_name: &str) -> FieldResult {
    if items.len() < min_length {
        return Err(FieldError(format!(
            "At least {min_length} {} required",
            field_name.to_lowercase()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_builtin_patterns_compile() {
        for pattern in [EMAIL_PATTERN, PHONE_PATTERN, ZIP_CODE_PATTERN, SSN_PATTERN] {
            assert!(Regex::new(pattern).is_ok(), "{pattern}");
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("nurse@hospital.org").is_ok());
        assert_eq!(
            validate_email(""),
            Err(FieldError("Email is required".into()))
        );
        assert_eq!(
            validate_email("not-an-email"),
            Err(FieldError("Please enter a valid email address".into()))
        );
        assert!(validate_email("two words@x.io").is_err());
    }

    #[test]
    fn test_validate_phone() {
        for ok in ["1234567890", "(123) 456-7890", "+123.456.7890", "123-456-789012"] {
            assert!(validate_phone(ok).is_ok(), "{ok}");
        }
        assert!(validate_phone("12-34").is_err());
    }

    #[test]
    fn test_validate_password_lists_missing_classes() {
        assert!(validate_password("Str0ng!pw").is_ok());
        let err = validate_password("abc").unwrap_err();
        assert_eq!(
            err.0,
            "Password must contain at least 8 characters, one uppercase letter, one number, one special character"
        );
    }

    #[test]
    fn test_validate_confirm_password() {
        assert_eq!(
            validate_confirm_password("a", ""),
            Err(FieldError("Please confirm your password".into()))
        );
        assert_eq!(
            validate_confirm_password("a", "b"),
            Err(FieldError("Passwords do not match".into()))
        );
        assert!(validate_confirm_password("same", "same").is_ok());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Mary Ann", "First name").is_ok());
        assert_eq!(
            validate_name("M", "First name").unwrap_err().0,
            "First name must be at least 2 characters"
        );
        assert_eq!(
            validate_name(&"a".repeat(51), "Name").unwrap_err().0,
            "Name must be less than 50 characters"
        );
        assert_eq!(
            validate_name("R2D2", "Name").unwrap_err().0,
            "Name can only contain letters"
        );
    }

    #[test]
    fn test_validate_required_accepts_zero_string() {
        assert!(validate_required(Some("0"), "Dose").is_ok());
        assert!(validate_required(Some(""), "Dose").is_err());
        assert_eq!(
            validate_required(None, "Dose").unwrap_err().0,
            "Dose is required"
        );
    }

    #[test]
    fn test_validate_number_bounds() {
        assert!(validate_number("5", Some(1.0), Some(10.0), "Quantity").is_ok());
        assert_eq!(
            validate_number("abc", None, None, "Quantity").unwrap_err().0,
            "Quantity must be a number"
        );
        assert_eq!(
            validate_number("0", Some(1.0), None, "Quantity").unwrap_err().0,
            "Quantity must be at least 1"
        );
        assert_eq!(
            validate_number("11", None, Some(10.0), "Quantity").unwrap_err().0,
            "Quantity must be at most 10"
        );
    }

    #[test]
    fn test_dates_relative_to_today() {
        let today = day("2026-03-15");
        assert!(validate_future_date("2026-03-15", "Appointment", today).is_ok());
        assert_eq!(
            validate_future_date("2026-03-14", "Appointment", today)
                .unwrap_err()
                .0,
            "Appointment must be in the future"
        );
        assert!(validate_past_date("2026-03-15T10:00:00", "Visit", today).is_ok());
        assert!(validate_past_date("2026-03-16", "Visit", today).is_err());
        assert_eq!(
            validate_date("31/02/2026", "Expiry").unwrap_err().0,
            "Expiry is invalid"
        );
    }

    #[test]
    fn test_age_counts_whole_years() {
        let today = day("2026-03-15");
        assert_eq!(age_on(day("2000-03-16"), today), 25);
        assert_eq!(age_on(day("2000-03-15"), today), 26);
        assert!(validate_age("2010-01-01", 18, 150, today).is_err());
        assert!(validate_age("1990-01-01", 18, 150, today).is_ok());
        assert_eq!(
            validate_age("2030-01-01", 0, 150, today).unwrap_err().0,
            "Date of birth must be in the past"
        );
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://hospital.example/portal").is_ok());
        assert!(validate_url("mailto:desk@hospital.example").is_ok());
        assert!(validate_url("hospital dot example").is_err());
        assert!(validate_url("://missing-scheme").is_err());
    }

    #[test]
    fn test_zip_and_ssn() {
        assert!(validate_zip_code("12345").is_ok());
        assert!(validate_zip_code("12345-6789").is_ok());
        assert!(validate_zip_code("1234").is_err());
        assert!(validate_ssn("123-45-6789").is_ok());
        assert_eq!(
            validate_ssn("123456789").unwrap_err().0,
            "Please enter a valid SSN (XXX-XX-XXXX)"
        );
    }

    #[test]
    fn test_validate_file() {
        let pdf = FileCandidate {
            size_bytes: 2_000,
            media_type: "application/pdf",
        };
        assert!(validate_file(Some(&pdf), None, &[]).is_ok());
        assert_eq!(
            validate_file(Some(&pdf), None, &["image/png"]).unwrap_err().0,
            "File type not allowed"
        );
        let big = FileCandidate {
            size_bytes: 11 * 1_048_576,
            media_type: "image/png",
        };
        assert_eq!(
            validate_file(Some(&big), None, &[]).unwrap_err().0,
            "File size must be less than 10MB"
        );
        assert_eq!(
            validate_file(None, None, &[]).unwrap_err().0,
            "File is required"
        );
    }

    #[test]
    fn test_validate_array() {
        assert!(validate_array(&[1], 1, "Medications").is_ok());
        assert_eq!(
            validate_array::<u8>(&[], 1, "Medications").unwrap_err().0,
            "At least 1 medications required"
        );
    }
}
