//! Line reconstruction for text-only PDF statements.
//!
//! PDF pages carry positioned text fragments, not rows. Fragments printed at
//! the same height are joined into one line, and only lines with a fragment
//! starting at the statement's left margin are kept.

use pdf::content::Operation;
use pdf::file::File as PdfFile;
use pdf::primitive::Primitive;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use monies_core::{decode_text, ParseError, ParserConfig, Result};

/// Fragments within this distance of the margin count as starting on it.
const MARGIN_SLACK: f32 = 0.05;
/// y coordinates are compared at 1/100 unit resolution.
const Y_RESOLUTION: f32 = 100.0;

/// A piece of text shown at one position (PDF user space, origin bottom left).
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl Fragment {
    pub fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

/// Extract data lines from every page, each page introduced by a
/// `Page N` marker line.
pub fn extract_lines(path: impl AsRef<Path>, config: &ParserConfig) -> Result<Vec<String>> {
    let path = path.as_ref();
    let pdf_error = |reason: String| ParseError::Pdf {
        path: path.to_path_buf(),
        reason,
    };

    let file = PdfFile::<Vec<u8>>::open(path).map_err(|e| pdf_error(e.to_string()))?;

    let mut lines = Vec::new();
    for (i, page) in file.pages().enumerate() {
        let n = i + 1;
        let page = page.map_err(|e| pdf_error(format!("page {n}: {e}")))?;
        lines.push(format!("Page {n}"));

        let fragments = match &page.contents {
            Some(content) => collect_fragments(&content.operations),
            None => Vec::new(),
        };
        let data_lines = group_lines(&fragments, config.margin_x);
        debug!(page = n, fragments = fragments.len(), lines = data_lines.len(), "extracted page");
        lines.extend(data_lines);
    }
    Ok(lines)
}

/// Join fragments sharing a y coordinate into lines, keep the lines anchored
/// at `margin_x` and return them top to bottom. Text within a line keeps the
/// order it was drawn in.
pub fn group_lines(fragments: &[Fragment], margin_x: f32) -> Vec<String> {
    let mut rows: BTreeMap<i64, Vec<&Fragment>> = BTreeMap::new();
    for f in fragments {
        let key = (f.y * Y_RESOLUTION).round() as i64;
        rows.entry(key).or_default().push(f);
    }

    rows.values()
        .rev()
        .filter(|row| row.iter().any(|f| (f.x - margin_x).abs() < MARGIN_SLACK))
        .map(|row| row.iter().map(|f| f.text.as_str()).collect())
        .collect()
}

/// PDF matrix `[a b c d e f]`.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn translate(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// Text positioning state of a content stream.
///
/// Glyph widths are not tracked: a fragment is placed where its string
/// starts, and several strings shown without repositioning share an origin.
struct TextState {
    ctm: Matrix,
    saved: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    leading: f32,
    fragments: Vec<Fragment>,
}

impl TextState {
    fn new() -> Self {
        Self {
            ctm: IDENTITY,
            saved: Vec::new(),
            tm: IDENTITY,
            tlm: IDENTITY,
            leading: 0.0,
            fragments: Vec::new(),
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = multiply(&translate(tx, ty), &self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn show(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let at = multiply(&self.tm, &self.ctm);
        self.fragments.push(Fragment::new(at[4], at[5], text));
    }

    fn apply(&mut self, op: &Operation) {
        let nums = numbers(&op.operands);
        match op.operator.as_str() {
            "q" => self.saved.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.saved.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix(&nums) {
                    self.ctm = multiply(&m, &self.ctm);
                }
            }
            "BT" => {
                self.tm = IDENTITY;
                self.tlm = IDENTITY;
            }
            "Tm" => {
                if let Some(m) = matrix(&nums) {
                    self.tm = m;
                    self.tlm = m;
                }
            }
            "Td" => {
                if let [tx, ty] = nums[..] {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let [tx, ty] = nums[..] {
                    self.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "TL" => {
                if let [leading] = nums[..] {
                    self.leading = leading;
                }
            }
            "T*" => self.next_line(),
            "Tj" => self.show(strings(&op.operands)),
            "TJ" => {
                if let Some(Primitive::Array(parts)) = op.operands.first() {
                    self.show(strings(parts));
                }
            }
            "'" | "\"" => {
                self.next_line();
                self.show(strings(&op.operands));
            }
            _ => {}
        }
    }
}

/// Position every string shown by a page content stream.
pub fn collect_fragments(operations: &[Operation]) -> Vec<Fragment> {
    let mut state = TextState::new();
    for op in operations {
        state.apply(op);
    }
    state.fragments
}

fn numbers(operands: &[Primitive]) -> Vec<f32> {
    operands
        .iter()
        .filter_map(|p| match p {
            Primitive::Integer(i) => Some(*i as f32),
            Primitive::Number(n) => Some(*n),
            _ => None,
        })
        .collect()
}

fn matrix(nums: &[f32]) -> Option<Matrix> {
    match nums {
        [a, b, c, d, e, f] => Some([*a, *b, *c, *d, *e, *f]),
        _ => None,
    }
}

/// Concatenate the string operands (kerning numbers are skipped).
fn strings(operands: &[Primitive]) -> String {
    operands
        .iter()
        .filter_map(|p| match p {
            Primitive::String(s) => Some(decode_pdf_string(s.as_bytes())),
            _ => None,
        })
        .collect()
}

/// Text strings are UTF-16BE when they carry a byte order mark, otherwise
/// single byte (Latin-1 compatible for the statement fonts).
///
/// The page font's encoding is not looked up. A bill set in a font with a
/// custom `/Differences` array or a ToUnicode map would decode wrongly.
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => decode_text(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_lines_orders_top_to_bottom() {
        let fragments = vec![
            Fragment::new(44.4, 100.0, "bottom"),
            Fragment::new(44.4, 300.0, "top"),
            Fragment::new(44.4, 200.0, "middle"),
        ];
        assert_eq!(group_lines(&fragments, 44.4), vec!["top", "middle", "bottom"]);
    }

    #[test]
    fn test_group_lines_keeps_only_anchored_lines() {
        let fragments = vec![
            Fragment::new(44.4, 300.0, "10.11. 02.01."),
            Fragment::new(120.0, 300.0, "  HESBURGER"),
            Fragment::new(60.0, 250.0, "page footer"),
            Fragment::new(300.0, 200.0, "right column"),
        ];
        assert_eq!(
            group_lines(&fragments, 44.4),
            vec!["10.11. 02.01.  HESBURGER"]
        );
    }

    #[test]
    fn test_group_lines_joins_in_emission_order() {
        // Drawn right to left; text order follows drawing, not x.
        let fragments = vec![
            Fragment::new(200.0, 500.0, "B"),
            Fragment::new(44.4, 500.0, "A"),
        ];
        assert_eq!(group_lines(&fragments, 44.4), vec!["BA"]);
    }

    #[test]
    fn test_group_lines_empty() {
        assert!(group_lines(&[], 44.4).is_empty());
    }

    #[test]
    fn test_matrix_multiply_translates() {
        let m = multiply(&translate(10.0, 20.0), &[2.0, 0.0, 0.0, 2.0, 5.0, 5.0]);
        assert_eq!(m, [2.0, 0.0, 0.0, 2.0, 25.0, 45.0]);
    }

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string(b"YHTEENS\xc4"), "YHTEENSÄ");
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0xC4]), "Ä");
    }
}
