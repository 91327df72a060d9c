//! monies-ingest: Nordea statement decoders (account TSV export, credit card PDF bill)
//! and extension-based dispatch.

pub mod parsers;
pub mod pdf_text;
pub mod types;

pub use monies_core::{File, ParseError, ParserConfig, Result, Transaction};
pub use types::SourceKind;

use std::path::Path;

use parsers::{nordea_pdf, nordea_tsv};

/// Parse a statement file, picking the decoder from its extension.
///
/// The returned [`File`] is complete: any structural, field or
/// reconciliation problem fails the whole file.
pub fn parse_file(path: impl AsRef<Path>, config: &ParserConfig) -> Result<File> {
    let path = path.as_ref();
    match SourceKind::from_path(path)? {
        SourceKind::AccountExport => nordea_tsv::from_file(path, config),
        SourceKind::CardBill => nordea_pdf::from_file(path, config),
    }
}

/// Base name of `path`, or empty if it has none.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
