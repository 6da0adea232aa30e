// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use chrono::{Datelike, NaiveDate};
use num_format::{Locale, ToFormattedString};

/// Parse a monetary or numeric cell into `f64` while being forgiving about
/// the formatting found in real financial CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Strips currency symbols, thousands separators, and regular or
///   non-breaking spaces: every character except ASCII digits, `.` and `-`
///   is dropped before parsing.
/// - Returns `None` for anything that still cannot be parsed (empty cells,
///   several decimal points, stray dashes).
pub fn parse_money(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // CSV dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Year component of a `YYYY-MM-DD` cell, for tables that carry a release
/// date but no release-year column.
pub fn year_of_date(s: Option<&str>) -> Option<i32> {
    parse_date_safe(s).map(|d| d.year())
}

pub fn average(v: &[f64]) -> Option<f64> {
    // Standard arithmetic mean; `None` for an empty slice so callers can
    // report a missing statistic instead of a fabricated zero.
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

pub fn median(mut v: Vec<f64>) -> Option<f64> {
    // Median of a list of numbers. We accept `Vec<f64>` by value so the
    // function can sort in-place without cloning at the call site.
    if v.is_empty() {
        return None;
    }
    // Use `partial_cmp` to handle floating-point comparisons and fall back to
    // equality if either side is NaN.
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    Some(if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    })
}

/// Quantile of an already-sorted slice by linear interpolation of the
/// empirical distribution: the rank is `h = p * n` (1-based); ranks at or
/// below 1 clamp to the minimum, at or above `n` to the maximum, and
/// fractional ranks interpolate between the two adjacent order statistics.
///
/// Callers must pass `sorted` in ascending order and `p` in `[0, 1]`.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    let h = p * n as f64;
    if h <= 1.0 {
        return Some(sorted[0]);
    }
    if h >= n as f64 {
        return Some(sorted[n - 1]);
    }
    let lo = h.floor() as usize; // 1-based rank of the lower neighbor
    let frac = h - lo as f64;
    Some(sorted[lo - 1] + frac * (sorted[lo] - sorted[lo - 1]))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Render an optional statistic, using a dash for groups that had no
/// usable values.
pub fn format_opt(n: Option<f64>, decimals: usize) -> String {
    match n {
        Some(v) => format_number(v, decimals),
        None => "-".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
