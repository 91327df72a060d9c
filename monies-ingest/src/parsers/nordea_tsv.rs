//! Nordea account transaction export (tab separated)
//!
//! Layout:
//!   Tilinumero<TAB>FI4612345600007890<LF><CR><LF>
//!   Kirjauspäivä<TAB>Arvopäivä<TAB>Maksupäivä<TAB>Määrä<TAB>...<CR><LF>
//!   23.03.2015<TAB>22.03.2015<TAB>22.03.2015<TAB>-30,00<TAB>Payee ry<TAB>...<CR><LF>
//!
//! Every data row has exactly 14 columns:
//!   Kirjauspäivä, Arvopäivä, Maksupäivä, Määrä, Saaja/Maksaja, Tilinumero,
//!   BIC, Tapahtuma, Viite, Maksajan viite, Viesti, Kortinnumero, Kuitti,
//!   and an empty trailing column.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use monies_core::{
    decode_text, dewrap, local_midnight, File, ParseError, ParserConfig, Result, Transaction,
};

use super::{field, matches_layout};

/// Separates the account line from the transaction table.
const LINE_END: &[u8] = b"\n\r\n";
pub const FIELDS_PER_RECORD: usize = 14;

/// Read and decode an export file.
pub fn from_file(path: impl AsRef<Path>, config: &ParserConfig) -> Result<File> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&data, &crate::file_name(path), config)
}

/// Decode the raw bytes of an export. Either every row converts or nothing
/// is returned.
pub fn decode(data: &[u8], file_name: &str, config: &ParserConfig) -> Result<File> {
    let pos = data
        .windows(LINE_END.len())
        .position(|w| w == LINE_END)
        .ok_or_else(|| ParseError::Format("could not find line break LF CR LF".to_string()))?;
    let (header, body) = (&data[..pos], &data[pos + LINE_END.len()..]);

    // The first line contains the account number.
    let header = decode_text(header);
    let account = header
        .split('\t')
        .nth(1)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ParseError::Format("account number missing from header line".to_string()))?
        .to_string();
    debug!(%account, file_name, "read export header");

    let body = decode_text(body);
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(body.as_bytes());

    let mut transactions = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| ParseError::Format(format!("record {}: {e}", i + 1)))?;
        // Column titles
        if i == 0 {
            continue;
        }
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }
        if record.len() != FIELDS_PER_RECORD {
            return Err(ParseError::Format(format!(
                "record {}: expected {FIELDS_PER_RECORD} fields, found {}",
                i + 1,
                record.len()
            )));
        }
        let fields: Vec<&str> = record.iter().collect();
        transactions.push(from_record(&fields, config)?);
    }

    info!(file_name, %account, transactions = transactions.len(), "decoded account export");
    Ok(File::new(file_name, account, transactions))
}

/// Convert one data row into a transaction.
pub fn from_record(r: &[&str], config: &ParserConfig) -> Result<Transaction> {
    if r.len() < 12 {
        return Err(ParseError::Format(format!(
            "expected {FIELDS_PER_RECORD} fields, found {}",
            r.len()
        )));
    }

    let transaction_date = field("transaction date", r[0], |s| parse_date(s, config.zone))?;
    let value_date = field("value date", r[1], |s| parse_date(s, config.zone))?;
    let payment_date = field("payment date", r[2], |s| parse_date(s, config.zone))?;
    let amount = field("amount", r[3], parse_amount)?;

    Ok(Transaction {
        transaction_date,
        value_date,
        payment_date: Some(payment_date),
        amount,
        payee_payer: r[4].to_string(),
        account: r[5].to_string(),
        bic: r[6].to_string(),
        transaction_code: r[7].to_string(),
        reference: r[8].to_string(),
        payer_reference: r[9].to_string(),
        message: dewrap(r[10]),
        card_number: r[11].to_string(),
        // r[12] is the receipt flag, not carried over
    })
}

/// `dd.mm.yyyy`, zero padded, anchored at local midnight.
fn parse_date(s: &str, zone: Tz) -> std::result::Result<DateTime<Tz>, String> {
    if !matches_layout(s, "dd.dd.dddd") {
        return Err("expected dd.mm.yyyy".to_string());
    }
    let date = NaiveDate::parse_from_str(s, "%d.%m.%Y").map_err(|e| e.to_string())?;
    local_midnight(date, zone).map_err(|e| e.to_string())
}

/// Comma decimal with an optional leading minus, e.g. `-1234,50`.
fn parse_amount(s: &str) -> std::result::Result<Decimal, String> {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (whole, fraction) = match unsigned.split_once(',') {
        Some((w, f)) => (w, Some(f)),
        None => (unsigned, None),
    };
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !fraction.is_none_or(digits) {
        return Err("expected [-]digits[,digits]".to_string());
    }
    s.replacen(',', ".", 1)
        .parse()
        .map_err(|e: rust_decimal::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use monies_core::ErrorKind;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row<'a>(overrides: &[(usize, &'a str)]) -> Vec<&'a str> {
        let mut r = vec![
            "23.03.2015",
            "22.03.2015",
            "22.03.2015",
            "-30,00",
            "Payee ry",
            "FI1012345600007890",
            "ASDFFIHHXXX",
            "Itsepalvelu",
            "1 27650",
            "",
            "",
            "",
            "",
            "",
        ];
        for &(i, v) in overrides {
            r[i] = v;
        }
        r
    }

    #[test]
    fn test_from_record_valid() {
        let tx = from_record(&row(&[]), &ParserConfig::default()).unwrap();
        assert_eq!(tx.amount, dec!(-30.00));
        assert_eq!(tx.booking_day(), ymd(2015, 3, 23));
        assert_eq!(tx.value_day(), ymd(2015, 3, 22));
        assert_eq!(tx.payment_day(), Some(ymd(2015, 3, 22)));
        assert_eq!(tx.transaction_date.to_rfc3339(), "2015-03-23T00:00:00+02:00");
        assert_eq!(tx.payee_payer, "Payee ry");
        assert_eq!(tx.account, "FI1012345600007890");
        assert_eq!(tx.bic, "ASDFFIHHXXX");
        assert_eq!(tx.transaction_code, "Itsepalvelu");
        assert_eq!(tx.reference, "1 27650");
        assert_eq!(tx.message, "");
    }

    #[test]
    fn test_from_record_long_message() {
        let r = row(&[
            (0, "07.12.2016"),
            (1, "07.12.2016"),
            (2, "05.12.2016"),
            (3, "50,00"),
            (10, "Merry xmas and happy new year to yo u and your family. "),
        ]);
        let tx = from_record(&r, &ParserConfig::default()).unwrap();
        assert_eq!(tx.amount, dec!(50));
        assert!(tx.is_credit());
        assert_eq!(tx.message, "Merry xmas and happy new year to you and your family. ");
    }

    #[test]
    fn test_from_record_bad_fields() {
        let cfg = ParserConfig::default();
        let cases = [
            (row(&[(0, "")]), "transaction date"),
            (row(&[(1, "22.3.2015")]), "value date"),
            (row(&[(2, "22.13.2015")]), "payment date"),
            (row(&[(3, "invalid")]), "amount"),
            (row(&[(3, "-1_000,00")]), "amount"),
            (row(&[(3, "-,50")]), "amount"),
            // First failing field wins
            (row(&[(0, ""), (3, "invalid")]), "transaction date"),
        ];
        for (r, want) in cases {
            match from_record(&r, &cfg).unwrap_err() {
                ParseError::FieldParse { field, .. } => assert_eq!(field, want),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_skips_titles_and_reads_account() {
        let data = "Tilinumero\tFI4612345600007890\n\r\n\
            Kirjauspäivä\tArvopäivä\tMaksupäivä\tMäärä\tSaaja/Maksaja\tTilinumero\tBIC\tTapahtuma\tViite\tMaksajan viite\tViesti\tKortinnumero\tKuitti\t\r\n\
            23.03.2015\t22.03.2015\t22.03.2015\t-30,00\tPayee ry\tFI1012345600007890\tASDFFIHHXXX\tItsepalvelu\t1 27650\t\t\t\t\t\r\n\
            \r\n";
        let file = decode(data.as_bytes(), "t.txt", &ParserConfig::default()).unwrap();
        assert_eq!(file.account(), "FI4612345600007890");
        assert_eq!(file.file_name(), "t.txt");
        assert_eq!(file.transactions().len(), 1);
        assert_eq!(file.transactions()[0].amount, dec!(-30.00));
    }

    #[test]
    fn test_decode_missing_separator() {
        let data = b"Tilinumero\tFI4612345600007890\r\n23.03.2015\t22.03.2015\r\n";
        let err = decode(data, "t.txt", &ParserConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_decode_wrong_width() {
        let data = "Tilinumero\tFI4612345600007890\n\r\n\
            a\tb\tc\td\te\tf\tg\th\ti\tj\tk\tl\tm\t\r\n\
            23.03.2015\t22.03.2015\t22.03.2015\t-30,00\tPayee ry\r\n";
        let err = decode(data.as_bytes(), "t.txt", &ParserConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_decode_bad_row_returns_nothing() {
        let data = "Tilinumero\tFI4612345600007890\n\r\n\
            a\tb\tc\td\te\tf\tg\th\ti\tj\tk\tl\tm\t\r\n\
            23.03.2015\t22.03.2015\t22.03.2015\t-30,00\tPayee ry\t\t\t\t\t\t\t\t\t\r\n\
            23.03.2015\t22.3.2015\t22.03.2015\t-30,00\tPayee ry\t\t\t\t\t\t\t\t\t\r\n";
        let err = decode(data.as_bytes(), "t.txt", &ParserConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldParse);
    }
}
