//! Value normalizer: currency/percent-formatted statement text to numbers.
//!
//! Statement cells arrive as "$1,234.56", "(1,234.50)", "12.5%", "--", or
//! nothing at all. Every input yields a number; malformed cells become 0.0.

/// A raw statement cell: absent, text, or an already-numeric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(s: &'a str) -> Self {
        RawValue::Text(s)
    }
}

impl<'a> From<&'a String> for RawValue<'a> {
    fn from(s: &'a String) -> Self {
        RawValue::Text(s.as_str())
    }
}

impl<'a> From<Option<&'a str>> for RawValue<'a> {
    fn from(s: Option<&'a str>) -> Self {
        s.map_or(RawValue::Missing, RawValue::Text)
    }
}

impl From<f64> for RawValue<'_> {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

/// Normalize a raw cell into a number.
///
/// Strips `$`, `%` and thousands separators; a value wrapped in parentheses
/// is negative. Anything that is still not a finite number yields 0.0.
pub fn normalize<'a>(raw: impl Into<RawValue<'a>>) -> f64 {
    match raw.into() {
        RawValue::Missing => 0.0,
        RawValue::Number(v) if v.is_finite() => v,
        RawValue::Number(_) => 0.0,
        RawValue::Text(s) => normalize_text(s),
    }
}

fn normalize_text(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%'))
        .collect();
    let cleaned = cleaned.trim();
    let negative = cleaned.starts_with('(') && cleaned.ends_with(')');
    let digits: String = cleaned.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    let digits = digits.trim();
    if digits.is_empty() {
        return 0.0;
    }
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if negative {
                -v
            } else {
                v
            }
        }
        _ => 0.0,
    }
}

/// Round to cents.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Render an amount the way statements print it: `$1,234.50`, or
/// `($1,234.50)` when negative.
pub fn format_currency(v: f64) -> String {
    let cents = (v.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if v < 0.0 && cents > 0 {
        format!("(${grouped}.{frac:02})")
    } else {
        format!("${grouped}.{frac:02}")
    }
}
