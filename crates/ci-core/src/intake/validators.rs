//! Field-level validators shared by the form schema registry and the
//! registration form.
//!
//! All validators are pure and never panic on user input; they only return
//! whether the value is acceptable. Normalization helpers (trimming, date
//! reformatting) live here as well so every caller formats values the same
//! way.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});

/// Brazilian federative units, used by the `uf` selector on registration.
pub const UFS: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

pub fn is_valid_uf(value: &str) -> bool {
    UFS.contains(&value.trim().to_ascii_uppercase().as_str())
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// CRM (regional medical council registration).
///
/// Product decision pending: only the numeric form (4 to 7 digits) is
/// accepted here. The UF-prefixed form ("CRM/SP 123456") seen on some
/// legacy registration screens is rejected until the council format is
/// settled with the product team.
pub fn is_valid_crm(value: &str) -> bool {
    let v = value.trim();
    (4..=7).contains(&v.len()) && v.bytes().all(|b| b.is_ascii_digit())
}

/// Canonical password policy: 8 to 100 characters, at least one uppercase
/// letter, one lowercase letter and one digit.
///
/// Product decision pending: the legacy screens disagreed between a 6- and
/// an 8-character minimum (and between "lowercase" and "special character"
/// as the second class). The stricter variant is canonical here; see
/// DESIGN.md before changing it.
pub fn is_valid_password(value: &str) -> bool {
    let len = value.chars().count();
    (8..=100).contains(&len)
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_digit())
}

fn digits_of(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

fn cpf_verifier(digits: &[u32]) -> u32 {
    // Weighted sum with weights n+1..2, doubled and reduced mod 11 mod 10.
    let n = digits.len() as u32;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (n + 1 - i as u32))
        .sum();
    sum * 10 % 11 % 10
}

/// CPF checksum validation (11 digits, two verifier digits).
///
/// A string of 11 identical digits is rejected explicitly: such values pass
/// the checksum arithmetic but are not real documents.
pub fn is_valid_cpf(value: &str) -> bool {
    let cleaned: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.len() != 11 || value.trim().chars().any(|c| !c.is_ascii_digit() && !"./-".contains(c))
    {
        return false;
    }
    let digits = digits_of(&cleaned);
    if all_same(&digits) {
        return false;
    }
    cpf_verifier(&digits[..9]) == digits[9] && cpf_verifier(&digits[..10]) == digits[10]
}

fn cnpj_verifier(digits: &[u32]) -> u32 {
    // Weights cycle 2..=9 from the rightmost digit.
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| d * (2 + (i as u32 % 8)))
        .sum();
    match sum % 11 {
        0 | 1 => 0,
        rem => 11 - rem,
    }
}

/// CNPJ checksum validation (14 digits, two verifier digits).
pub fn is_valid_cnpj(value: &str) -> bool {
    let cleaned: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.len() != 14 || value.trim().chars().any(|c| !c.is_ascii_digit() && !"./-".contains(c))
    {
        return false;
    }
    let digits = digits_of(&cleaned);
    if all_same(&digits) {
        return false;
    }
    cnpj_verifier(&digits[..12]) == digits[12] && cnpj_verifier(&digits[..13]) == digits[13]
}

/// Progressive date mask: keeps only digits (at most 8) and inserts `/`
/// after the day and month, producing `DD/MM/YYYY` as the user types.
pub fn format_date_digits(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).take(8).collect();
    let mut out = String::with_capacity(10);
    for (i, c) in digits.chars().enumerate() {
        if i == 2 || i == 4 {
            out.push('/');
        }
        out.push(c);
    }
    out
}

fn parse_date_parts(value: &str) -> Option<(u32, u32, i32)> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 8 {
        return None;
    }
    let day = digits[0..2].parse().ok()?;
    let month = digits[2..4].parse().ok()?;
    let year = digits[4..8].parse().ok()?;
    Some((day, month, year))
}

/// Calendar-correct date check for `DD/MM/YYYY` (or digits-only) input.
///
/// The date is re-derived from its parts; values that do not round-trip
/// (e.g. `31/04/2024`) are rejected.
pub fn is_valid_date(value: &str) -> bool {
    let Some((day, month, year)) = parse_date_parts(value) else {
        return false;
    };
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date.day() == day && date.month() == month && date.year() == year,
        None => false,
    }
}

/// Birth date: calendar-correct, not in the future, and no earlier than 1900.
pub fn is_valid_data_nascimento(value: &str) -> bool {
    let Some((day, month, year)) = parse_date_parts(value) else {
        return false;
    };
    if year < 1900 {
        return false;
    }
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date <= Utc::now().date_naive(),
        None => false,
    }
}
