use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// The last run of exactly eight digits in `s`, wherever it sits.
///
/// Longer or shorter digit runs are skipped, so `"1 20250630"` yields
/// `"20250630"` and `"202506301"` yields nothing.
pub fn last_date_token(s: &str) -> Option<&str> {
    DIGIT_RUN
        .find_iter(s)
        .filter(|m| m.as_str().len() == 8)
        .last()
        .map(|m| m.as_str())
}

/// Parse an 8-digit `YYYYMMDD` token.
pub fn parse_yyyymmdd(token: &str) -> Option<NaiveDate> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = token[0..4].parse().ok()?;
    let month: u32 = token[4..6].parse().ok()?;
    let day: u32 = token[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Date hidden somewhere in a noisy cell, e.g. `"3 20240131"` → 2024-01-31.
pub fn parse_embedded_date(s: &str) -> Option<NaiveDate> {
    last_date_token(s).and_then(parse_yyyymmdd)
}
