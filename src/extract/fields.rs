//! Field-level parsers for free-form catalog text
//!
//! Every function here is total: malformed input yields `None`, never an
//! error, so one bad field cannot sink the record it belongs to.

use crate::record::SpecNumber;
use once_cell::sync::Lazy;
use regex::Regex;

/// Currency marker used by the catalog
pub const CURRENCY_MARKER: &str = "Rp";

pub static GB_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*GB").unwrap());
pub static CAMERA_MP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*MP").unwrap());
pub static SCREEN_INCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\d.]+)\s*inch").unwrap());
pub static BATTERY_MAH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*mAh").unwrap());
pub static RELEASE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());
pub static PRICE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"Rp\s*([\d.]+)").unwrap());

/// "RAM 8GB" / "RAM 1.5 GB" as it appears in listing names
pub static RAM_IN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"RAM\s*(\d+(?:\.\d+)?)\s*GB").unwrap());
/// "ROM 128GB" as it appears in listing names
pub static ROM_IN_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"ROM\s*(\d+)\s*GB").unwrap());

/// "8GB RAM" phrasing used in spec blurbs
pub static RAM_SUFFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*GB\s*(?:of\s+)?RAM").unwrap());
/// "128GB ROM" / "128 GB storage" phrasing used in spec blurbs
pub static STORAGE_SUFFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*GB\s*(?:of\s+)?(?:ROM|storage|internal)").unwrap());

/// Parses a price such as `"Rp 1.250.000"` into whole currency units
///
/// The currency marker and `.` thousand separators are stripped; anything
/// left that is not a plain integer yields `None`.
pub fn clean_price(text: &str) -> Option<u64> {
    let cleaned: String = text
        .replace(CURRENCY_MARKER, "")
        .replace('.', "")
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<u64>().ok()
}

/// Applies `pattern`'s first capture group to `text` and parses the capture
///
/// A capture containing a decimal point becomes a float, otherwise an integer.
pub fn extract_spec_value(text: &str, pattern: &Regex) -> Option<SpecNumber> {
    let captures = pattern.captures(text)?;
    let token = captures.get(1)?.as_str();
    SpecNumber::parse(token)
}

/// First `Rp <digits>` price token inside a longer text
pub fn price_in_text(text: &str) -> Option<u64> {
    let token = PRICE_TOKEN.find(text)?;
    clean_price(token.as_str())
}

pub fn camera_mp(text: &str) -> Option<u32> {
    extract_spec_value(text, &CAMERA_MP)?.as_u32()
}

pub fn screen_inches(text: &str) -> Option<f64> {
    extract_spec_value(text, &SCREEN_INCH).map(|v| v.as_f64())
}

pub fn battery_mah(text: &str) -> Option<u32> {
    extract_spec_value(text, &BATTERY_MAH)?.as_u32()
}

/// First 4-digit token in 2000..=2099
pub fn release_year(text: &str) -> Option<u16> {
    let captures = RELEASE_YEAR.captures(text)?;
    captures.get(1)?.as_str().parse::<u16>().ok()
}

/// Parses a bare year value, accepting only 2000..=2099
pub fn parse_year(text: &str) -> Option<u16> {
    text.trim()
        .parse::<u16>()
        .ok()
        .filter(|year| (2000..=2099).contains(year))
}
