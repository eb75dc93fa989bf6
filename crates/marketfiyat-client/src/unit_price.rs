//! Parsing of localized unit-price labels.

/// Turns a label like `"101,37 ₺/kg"` into a comparable number.
///
/// Strips everything that is not an ASCII digit or the upstream locale's
/// decimal comma, then reads the comma as a decimal point. Never fails:
/// absent, empty, or malformed labels return `f64::INFINITY`, which places
/// them after every parseable value under ascending order.
#[must_use]
pub fn parse(label: Option<&str>) -> f64 {
    let Some(label) = label else {
        return f64::INFINITY;
    };

    let cleaned: String = label
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    cleaned.replace(',', ".").parse().unwrap_or(f64::INFINITY)
}
