// src/table/coerce.rs
use super::types::CellValue;

/// Strip currency and thousands punctuation, then trim.
pub fn clean_cell(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Coerce one raw cell. Finite numbers become [`CellValue::Number`]; anything else keeps the
/// cleaned text, so `"$abc"` comes back as `"abc"`.
pub fn coerce(raw: &str) -> CellValue {
    let cleaned = clean_cell(raw);
    if cleaned.is_empty() {
        return CellValue::empty();
    }
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(cleaned),
    }
}

/// Coerce a possibly-absent cell.
pub fn coerce_opt(raw: Option<&str>) -> CellValue {
    raw.map(coerce).unwrap_or_else(CellValue::empty)
}
