//! Text helpers for statement fields.

/// The bank's export breaks long messages into 35 character blocks joined
/// by a single space.
pub const MESSAGE_BLOCK: usize = 35;

const MASK: &str = "************";
const CARD_DIGITS: usize = 16;

/// Undo the export's block wrapping of a message field: after every
/// [`MESSAGE_BLOCK`] characters one separating space is dropped.
///
/// A genuine space that happens to fall on a block boundary is dropped too;
/// the export gives no way to tell the two apart.
pub fn dewrap(message: &str) -> String {
    let chars: Vec<char> = message.chars().collect();
    let mut out = String::with_capacity(message.len());
    let mut i = 0;
    while i < chars.len() {
        let end = (i + MESSAGE_BLOCK).min(chars.len());
        out.extend(&chars[i..end]);
        i = end;
        if chars.get(i) == Some(&' ') {
            i += 1;
        }
    }
    out
}

/// Hide all but the last four digits of a card number behind a fixed-length
/// mask. Anything after the digits (e.g. `/CARD HOLDER`) is kept as is;
/// values not starting with a full card number are returned unchanged.
pub fn mask_card_number(account: &str) -> String {
    let digits = account
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .count();
    if digits < CARD_DIGITS {
        return account.to_string();
    }
    // Digits are ASCII, so byte offsets equal char offsets here.
    format!("{MASK}{}", &account[digits - 4..])
}

/// Decode raw statement bytes. Older exports are ISO-8859-1, which maps
/// byte-for-byte onto the first 256 code points.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
