// src/table/header.rs
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::types::{Column, ROW_ID_KEY};

/// Prefix of keys synthesized for blank headers.
pub const SYNTHETIC_PREFIX: &str = "column_";

/// Characters that are not safe in an accessor key.
static UNSAFE_KEY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s.()%$]").unwrap());

/// Turn a header row into columns with unique accessor keys.
///
/// Keys are unique within this call only; a fresh pass starts from an empty set apart from
/// the reserved row id key.
pub fn normalize_headers(headers: &[Option<String>]) -> Vec<Column> {
    let mut used: HashSet<String> = HashSet::with_capacity(headers.len() + 1);
    used.insert(ROW_ID_KEY.to_string());

    headers
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let trimmed = raw.as_deref().map(str::trim).unwrap_or("");
            let (header, candidate) = match candidate_key(trimmed) {
                Some(key) => (trimmed.to_string(), key),
                None => {
                    let synthetic = synthetic_key(idx);
                    (synthetic.clone(), synthetic)
                }
            };
            Column {
                header,
                accessor_key: disambiguate(candidate, &mut used),
            }
        })
        .collect()
}

/// `column_<1-based index>`
pub fn synthetic_key(idx: usize) -> String {
    format!("{}{}", SYNTHETIC_PREFIX, idx + 1)
}

/// A header worth plotting: non-blank and not synthesized.
pub fn is_valid_header(header: &str) -> bool {
    !header.trim().is_empty() && !header.starts_with(SYNTHETIC_PREFIX)
}

/// Lowercase, drop the header's own leading/trailing underscores, then map unsafe
/// characters to `_`. `None` when nothing usable is left.
fn candidate_key(trimmed: &str) -> Option<String> {
    let lower = trimmed.to_lowercase();
    let core = lower.trim_matches('_');
    if core.is_empty() {
        return None;
    }
    Some(UNSAFE_KEY_CHARS.replace_all(core, "_").into_owned())
}

/// First of `key`, `key_1`, `key_2`, ... not yet in `used`; registers it.
fn disambiguate(key: String, used: &mut HashSet<String>) -> String {
    if used.insert(key.clone()) {
        return key;
    }
    let mut n = 1usize;
    loop {
        let attempt = format!("{}_{}", key, n);
        if used.insert(attempt.clone()) {
            return attempt;
        }
        n += 1;
    }
}
