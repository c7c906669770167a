//! Attribute normalization for raw OSM tag values
//!
//! Voltage and capacity tags are free-form strings (`"110000;20000"`,
//! `"380 kV"`, `"500 kW"`). These helpers turn them into volts and megawatts.

/// Values below this are read as kilovolts
const KILOVOLT_CUTOFF: u64 = 1000;

/// Category value folded into the untagged bucket
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Parse a voltage tag into volts, keeping the highest circuit.
///
/// Each `;`-separated segment contributes its first run of digits. Values
/// below 1000 are taken as kV; runs too long for `u64` saturate. Returns
/// `None` when no segment has digits.
pub fn parse_voltage(raw: Option<&str>) -> Option<u64> {
    let raw = raw?;
    raw.split(';')
        .filter_map(first_digit_run)
        // A run of ASCII digits only fails to parse on overflow
        .map(|digits| digits.parse::<u64>().unwrap_or(u64::MAX))
        .map(|value| {
            if value < KILOVOLT_CUTOFF {
                value.saturating_mul(1000)
            } else {
                value
            }
        })
        .max()
}

/// Parse a capacity tag into megawatts.
///
/// Only a case-insensitive `kw` marker changes the unit; anything else is
/// read as MW. Absent or unparseable values yield `0.0`.
pub fn parse_capacity(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let Some(number) = first_decimal_run(raw) else {
        return 0.0;
    };
    let value = match number.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return 0.0,
    };
    if raw.to_lowercase().contains("kw") {
        value / 1000.0
    } else {
        value
    }
}

/// Normalize a generator category tag.
///
/// Absent, blank and literal `unknown` values all map to `None`.
pub fn parse_category(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() || value == UNKNOWN_CATEGORY {
        None
    } else {
        Some(value.to_string())
    }
}

fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    Some(&rest[..len])
}

/// First number made of digits with at most one decimal point, e.g. `2.5` or `.75`
fn first_decimal_run(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let start = (0..bytes.len()).find(|&i| {
        bytes[i].is_ascii_digit()
            || (bytes[i] == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    })?;

    let mut seen_point = false;
    let mut end = start;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {}
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        end += 1;
    }
    Some(s[start..end].trim_end_matches('.'))
}
