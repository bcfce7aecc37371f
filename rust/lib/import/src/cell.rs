use serde::{Deserialize, Serialize};

/// A coerced spreadsheet cell. Serializes as a bare number, string or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Coerce a raw cell.
///
/// Accepts `12`, `-3.5`, `12,5`, `1.234,56`, `1,234.56`, `1.234.567` and a
/// trailing `%` (`85%` is 85). With both separators present the last one is
/// the decimal point. A lone comma is a decimal comma; repeated commas or
/// dots are thousands separators.
pub fn coerce_cell(raw: &str) -> Cell {
    let s = raw.trim();
    if s.is_empty() {
        return Cell::Empty;
    }
    match parse_number(s) {
        Some(n) => Cell::Number(n),
        None => Cell::Text(s.to_string()),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.strip_suffix('%').map(str::trim_end).unwrap_or(s);
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        || !digits.starts_with(|c: char| c.is_ascii_digit())
        || !digits.ends_with(|c: char| c.is_ascii_digit())
    {
        return None;
    }

    let commas = digits.matches(',').count();
    let dots = digits.matches('.').count();
    let normalized = match (commas, dots) {
        (0, 0) | (0, 1) => digits.to_string(),
        (1, 0) => digits.replace(',', "."),
        (_, 0) => grouped(digits, ',')?,
        (0, _) => grouped(digits, '.')?,
        _ => {
            let last_comma = digits.rfind(',')?;
            let last_dot = digits.rfind('.')?;
            let (thousands, decimal) = if last_comma > last_dot { ('.', ',') } else { (',', '.') };
            if digits.matches(decimal).count() != 1 {
                return None;
            }
            let (int_part, frac) = digits.split_at(digits.rfind(decimal)?);
            format!("{}.{}", grouped(int_part, thousands)?, &frac[1..])
        }
    };
    format!("{}{}", sign, normalized).parse().ok()
}

/// Strip `sep` thousands separators; groups after the first must be 3 digits.
fn grouped(s: &str, sep: char) -> Option<String> {
    let mut parts = s.split(sep);
    let head = parts.next()?;
    if head.is_empty() || head.len() > 3 && s.contains(sep) {
        return None;
    }
    let mut out = head.to_string();
    for part in parts {
        if part.len() != 3 {
            return None;
        }
        out.push_str(part);
    }
    Some(out)
}
