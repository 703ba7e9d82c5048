//! Display formatting for amounts, identifiers and personal data.
//!
//! Formatters never fail. Input that does not have the expected shape is returned unchanged so
//! that a malformed value is still visible to the user.

use crate::models::Address;
use chrono::{DateTime, Utc};

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// en-US number formatting with a fixed number of decimals and `,` grouping.
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Symbol and minor-unit digits for the currencies the billing screens use.
fn currency_style(code: &str) -> (String, usize) {
    match code.to_ascii_uppercase().as_str() {
        "USD" => ("$".into(), 2),
        "EUR" => ("€".into(), 2),
        "GBP" => ("£".into(), 2),
        "JPY" => ("¥".into(), 0),
        "INR" => ("₹".into(), 2),
        other => (format!("{other} "), 2),
    }
}

/// ```
/// use hms_core::formatters::format_currency;
/// assert_eq!(format_currency(1234.5, "USD"), "$1,234.50");
/// ```
pub fn format_currency(amount: f64, currency: &str) -> String {
    let (symbol, decimals) = currency_style(currency);
    let body = format_number(amount.abs(), decimals);
    if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{symbol}{body}")
    } else {
        format!("{symbol}{body}")
    }
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{}%", format_number(value, decimals))
}

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Ten-digit numbers become `(123) 456-7890`.
pub fn format_phone_number(phone: &str) -> String {
    let d = digits_only(phone);
    if d.len() == 10 {
        format!("({}) {}-{}", &d[..3], &d[3..6], &d[6..])
    } else {
        phone.to_owned()
    }
}

pub fn format_ssn(ssn: &str) -> String {
    let d = digits_only(ssn);
    if d.len() == 9 {
        format!("{}-{}-{}", &d[..3], &d[3..5], &d[5..])
    } else {
        ssn.to_owned()
    }
}

pub fn mask_ssn(ssn: &str) -> String {
    let d = digits_only(ssn);
    if d.len() == 9 {
        format!("XXX-XX-{}", &d[5..])
    } else {
        ssn.to_owned()
    }
}

pub fn format_credit_card(card_number: &str) -> String {
    let d = digits_only(card_number);
    if d.len() == 16 {
        format!("{} {} {} {}", &d[..4], &d[4..8], &d[8..12], &d[12..])
    } else {
        card_number.to_owned()
    }
}

pub fn mask_credit_card(card_number: &str) -> String {
    let d = digits_only(card_number);
    if d.len() == 16 {
        format!("**** **** **** {}", &d[12..])
    } else {
        card_number.to_owned()
    }
}

/// First, middle and last name joined by spaces, skipping blanks.
pub fn format_name(first_name: &str, last_name: &str, middle_name: Option<&str>) -> String {
    [Some(first_name), middle_name, Some(last_name)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_address(address: &Address) -> String {
    [
        &address.street,
        &address.city,
        &address.state,
        &address.zip_code,
        &address.country,
    ]
    .into_iter()
    .filter_map(|part| part.as_deref())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

const BYTE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Binary (1024) units with trailing zeros trimmed: `1536` is `1.5 KB`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{:.*}", decimals, scaled);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    format!("{trimmed} {}", BYTE_UNITS[unit])
}

pub fn format_duration(seconds: u64) -> String {
    match seconds {
        s if s < 60 => format!("{s} sec"),
        s if s < 3_600 => format!("{} min", s / 60),
        s if s < 86_400 => format!("{} hr", s / 3_600),
        s => format!("{} days", s / 86_400),
    }
}

/// Coarse relative time. Instants at or after `now` read as "just now".
pub fn format_time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();
    match seconds {
        s if s < 60 => "just now".to_owned(),
        s if s < 3_600 => format!("{} minutes ago", s / 60),
        s if s < 86_400 => format!("{} hours ago", s / 3_600),
        s if s < 604_800 => format!("{} days ago", s / 86_400),
        s if s < 2_592_000 => format!("{} weeks ago", s / 604_800),
        s if s < 31_536_000 => format!("{} months ago", s / 2_592_000),
        s => format!("{} years ago", s / 31_536_000),
    }
}

/// Lowercases and replaces anything outside `[a-z0-9.]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

pub fn format_mrn(mrn: &str) -> String {
    if mrn.is_empty() {
        return String::new();
    }
    format!("MRN-{:0>8}", digits_only(mrn))
}

fn prefixed_id(prefix: &str, id: u64, width: usize) -> String {
    if id == 0 {
        return String::new();
    }
    format!("{prefix}-{id:0>width$}")
}

pub fn format_appointment_id(id: u64) -> String {
    prefixed_id("APT", id, 6)
}

pub fn format_prescription_id(id: u64) -> String {
    prefixed_id("RX", id, 6)
}

pub fn format_invoice_number(id: u64) -> String {
    prefixed_id("INV", id, 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5, "USD"), "$1,234.50");
        assert_eq!(format_currency(-1.0, "USD"), "-$1.00");
        assert_eq!(format_currency(0.0, "usd"), "$0.00");
        assert_eq!(format_currency(1234567.891, "EUR"), "€1,234,567.89");
        assert_eq!(format_currency(1500.0, "JPY"), "¥1,500");
        assert_eq!(format_currency(10.0, "CHF"), "CHF 10.00");
    }

    #[test]
    fn test_format_number_and_percentage() {
        assert_eq!(format_number(1234567.0, 0), "1,234,567");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(-1000.3, 1), "-1,000.3");
        assert_eq!(format_percentage(12.3, 2), "12.30%");
    }

    #[test]
    fn test_format_phone_number() {
        assert_eq!(format_phone_number("1234567890"), "(123) 456-7890");
        assert_eq!(format_phone_number("123.456.7890"), "(123) 456-7890");
        assert_eq!(format_phone_number("12345"), "12345");
        assert_eq!(format_phone_number(""), "");
    }

    #[test]
    fn test_ssn_and_card_masks() {
        assert_eq!(format_ssn("123456789"), "123-45-6789");
        assert_eq!(mask_ssn("123-45-6789"), "XXX-XX-6789");
        assert_eq!(mask_ssn("12345"), "12345");
        assert_eq!(format_credit_card("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(
            mask_credit_card("4111 1111 1111 1234"),
            "**** **** **** 1234"
        );
    }

    #[test]
    fn test_format_name_and_address() {
        assert_eq!(format_name("Ada", "Lovelace", None), "Ada Lovelace");
        assert_eq!(format_name("Ada", "Lovelace", Some("")), "Ada Lovelace");
        assert_eq!(format_name("John", "Doe", Some("Q")), "John Q Doe");

        let address = Address {
            street: Some("1 Main St".into()),
            city: Some("Springfield".into()),
            state: None,
            zip_code: Some("12345".into()),
            country: Some(String::new()),
        };
        assert_eq!(format_address(&address), "1 Main St, Springfield, 12345");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(512, 2), "512 Bytes");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024, 2), "10 MB");
    }

    #[test]
    fn test_format_duration_and_time_ago() {
        assert_eq!(format_duration(42), "42 sec");
        assert_eq!(format_duration(150), "2 min");
        assert_eq!(format_duration(7_200), "2 hr");
        assert_eq!(format_duration(200_000), "2 days");

        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let ago = |secs: i64| format_time_ago(now - chrono::Duration::seconds(secs), now);
        assert_eq!(ago(10), "just now");
        assert_eq!(ago(-30), "just now");
        assert_eq!(ago(300), "5 minutes ago");
        assert_eq!(ago(7_200), "2 hours ago");
        assert_eq!(ago(3 * 86_400), "3 days ago");
        assert_eq!(ago(14 * 86_400), "2 weeks ago");
        assert_eq!(ago(60 * 86_400), "2 months ago");
        assert_eq!(ago(800 * 86_400), "2 years ago");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Lab Report (v2).PDF"), "lab_report__v2_.pdf");
    }

    #[test]
    fn test_identifier_formats() {
        assert_eq!(format_mrn("1234"), "MRN-00001234");
        assert_eq!(format_mrn("MR 55"), "MRN-00000055");
        assert_eq!(format_mrn(""), "");
        assert_eq!(format_appointment_id(42), "APT-000042");
        assert_eq!(format_prescription_id(42), "RX-000042");
        assert_eq!(format_invoice_number(42), "INV-00000042");
        assert_eq!(format_prescription_id(0), "");
    }
}
