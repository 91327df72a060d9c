pub mod nordea_pdf;
pub mod nordea_tsv;

use monies_core::{ParseError, Result};
use std::fmt::Display;

/// Run one field conversion, tagging a failure with the field name and the
/// raw text. Chained with `?`, the first failing field of a record wins.
pub(crate) fn field<T, E: Display>(
    name: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> std::result::Result<T, E>,
) -> Result<T> {
    parse(raw).map_err(|e| ParseError::field(name, raw, e))
}

/// True if `s` is ASCII digits and dots laid out exactly like `pattern`,
/// where `d` stands for a digit (e.g. "dd.mm.yyyy" as "dd.dd.dddd").
pub(crate) fn matches_layout(s: &str, pattern: &str) -> bool {
    s.len() == pattern.len()
        && s.bytes().zip(pattern.bytes()).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
}
