use serde::{Deserialize, Serialize};
use std::path::Path;

use monies_core::{ParseError, Result};

/// Extensions accepted by [`crate::parse_file`].
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "tsv", "pdf"];

/// Which decoder a statement file needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Tab separated account transaction export (`.txt` / `.tsv`)
    AccountExport,
    /// Credit card bill (`.pdf`)
    CardBill,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "txt" | "tsv" => Ok(SourceKind::AccountExport),
            "pdf" => Ok(SourceKind::CardBill),
            _ => Err(ParseError::UnsupportedFormat(format!(".{ext}"))),
        }
    }
}
