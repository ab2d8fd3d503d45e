//! Money and date token recognition shared by the statement and SMS front-ends.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// Caller handed a token to `parse_money` without checking `is_money_token` first.
    #[error("not a money token: {0:?}")]
    InvalidMoney(String),
}

fn money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9,]+\.[0-9]{2}$").expect("invalid money regex"))
}

fn date_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("invalid date token regex"))
}

fn free_text_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})\b").expect("invalid free text date regex")
    })
}

/// `1,234.50` style statement amounts: no sign, no currency, exactly two decimals.
pub fn is_money_token(s: &str) -> bool {
    money_re().is_match(s)
}

/// Parse a money token, dropping thousands separators.
pub fn parse_money(s: &str) -> Result<f64, LexError> {
    let cleaned = s.trim().replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LexError::InvalidMoney(s.to_string()))
}

/// `DD/MM/YYYY` shaped token. Says nothing about whether the day exists.
pub fn is_date_token(s: &str) -> bool {
    date_token_re().is_match(s)
}

/// Resolve a `DD/MM/YYYY` token to a calendar date.
pub fn parse_date_token(s: &str) -> Option<NaiveDate> {
    if !is_date_token(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// Find the first `d/m/yy`-ish date inside a message body.
///
/// Two-digit years are read as 20xx. Returns `None` when the match is out of
/// range so the caller can fall back to the message timestamp.
pub fn extract_date_from_free_text(body: &str) -> Option<NaiveDate> {
    let caps = free_text_date_re().captures(body)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year = match caps[3].len() {
        2 => 2000 + caps[3].parse::<i32>().ok()?,
        4 => caps[3].parse::<i32>().ok()?,
        _ => return None,
    };

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Render a date as `DD/MM/YYYY`.
pub fn format_dmy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Serde adapter keeping `DD/MM/YYYY` on the wire.
pub mod dmy_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_dmy(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y")
            .map_err(|e| D::Error::custom(format!("invalid date '{s}': {e}")))
    }
}
