//! Nordea credit card bill (PDF)
//!
//! Expected data lines after line reconstruction:
//!   1234567890123456/HOLDER CARD
//!   10.11. 02.01.  012765012765      HESBURGER                      13.37
//!   02.12. 02.01.  101010010010      ITUNES.COM/BILL  /HYVITYS       4.99-
//!                                    KORTTITAPAHTUMAT YHTEENSÄ       22.67
//!                                    LASKUN LOPPUSALDO YHTEENSÄ      02.01.17      22.67
//!
//! Rows carry day and month only; the year comes from the bill's due date.
//! The itemized amounts must add up to the KORTTITAPAHTUMAT total or the whole
//! bill is rejected.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::{debug, info, warn};

use monies_core::{
    fix_year, local_midnight, mask_card_number, File, ParseError, ParserConfig, Result,
    Transaction,
};

use super::{field, matches_layout};
use crate::pdf_text::extract_lines;

/// Year given to `dd.mm.` dates before fix-up; a leap year so 29 Feb parses.
const PLACEHOLDER_YEAR: i32 = 2000;

/// Line patterns of the bill. Tested independently against every line.
/// Digits are ASCII only; `\d` would also accept other scripts' digits.
pub struct StatementPatterns {
    account: Regex,
    bill_total: Regex,
    payments_total: Regex,
    transaction: Regex,
}

impl StatementPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            account: Regex::new(r"^(?P<card>[0-9]{16})(?P<holder>/[A-ZÅÄÖ ]*[A-ZÅÄÖ]) *$")?,
            bill_total: Regex::new(concat!(
                r"^ *LASKUN LOPPUSALDO YHTEENSÄ *",
                r"(?P<due>[0-9]{2}\.[0-9]{2}\.[0-9]{2}) *",
                r"(?P<total>[0-9 ]+\.[0-9]{2}) *$"
            ))?,
            payments_total: Regex::new(r"^ *KORTTITAPAHTUMAT YHTEENSÄ *(?P<total>[0-9 ]+\.[0-9]{2}) *$")?,
            transaction: Regex::new(concat!(
                r"^(?P<date>[0-9]+\.[0-9]+\.) +",
                r"(?P<value_date>[0-9]+\.[0-9]+\.) +",
                r"(?P<code>[^ ]{12}) +",
                r"(?P<payee>.*[^ ]) +",
                r"(?P<amount>[0-9]+\.[0-9]{2}-?) *$"
            ))?,
        })
    }
}

/// Everything read from one bill.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Card number and holder as printed, unmasked
    pub account: String,
    pub due_date: NaiveDate,
    pub bill_total: Decimal,
    /// Sum of card transactions stated on the bill
    pub payments_total: Decimal,
    pub transactions: Vec<Transaction>,
}

impl Statement {
    pub fn masked_account(&self) -> String {
        mask_card_number(&self.account)
    }

    pub fn into_file(self, file_name: impl Into<String>) -> File {
        let account = self.masked_account();
        File::new(file_name, account, self.transactions)
    }
}

/// A matched transaction line whose fields are not converted yet.
struct RawRow<'a> {
    date: &'a str,
    value_date: &'a str,
    code: &'a str,
    payee: &'a str,
    amount: &'a str,
}

impl RawRow<'_> {
    fn to_transaction(&self, due_date: NaiveDate, config: &ParserConfig) -> Result<Transaction> {
        let date = field("transaction date", self.date, |s| day_month(s, due_date))?;
        let value_date = field("value date", self.value_date, |s| day_month(s, due_date))?;
        let amount = field("amount", self.amount, parse_amount)?;

        let mut tx = Transaction::new(
            local_midnight(date, config.zone)?,
            local_midnight(value_date, config.zone)?,
            amount,
            self.payee,
        );
        tx.transaction_code = self.code.to_string();
        Ok(tx)
    }
}

/// Read a bill from a PDF file.
pub fn from_file(path: impl AsRef<Path>, config: &ParserConfig) -> Result<File> {
    let path = path.as_ref();
    let lines = extract_lines(path, config)?;
    let statement = parse_lines(&lines, config)?;
    info!(
        file = %path.display(),
        transactions = statement.transactions.len(),
        total = %statement.payments_total,
        "parsed card bill"
    );
    Ok(statement.into_file(crate::file_name(path)))
}

/// Classify extracted lines, convert transaction rows and reconcile them
/// against the bill's payments total.
pub fn parse_lines<S: AsRef<str>>(lines: &[S], config: &ParserConfig) -> Result<Statement> {
    let patterns = StatementPatterns::new()?;

    let mut account = None;
    let mut due = None;
    let mut payments_total = None;
    let mut rows = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if let Some(caps) = patterns.account.captures(line) {
            account = Some(format!("{}{}", group(&caps, "card"), group(&caps, "holder")));
        }
        if let Some(caps) = patterns.bill_total.captures(line) {
            let due_date = field("due date", group(&caps, "due"), |s| {
                NaiveDate::parse_from_str(s, "%d.%m.%y")
            })?;
            let total = field("bill total", group(&caps, "total"), parse_amount)?;
            due = Some((due_date, total));
        }
        if let Some(caps) = patterns.payments_total.captures(line) {
            payments_total = Some(field("payments total", group(&caps, "total"), parse_amount)?);
        }
        if let Some(caps) = patterns.transaction.captures(line) {
            rows.push(RawRow {
                date: group(&caps, "date"),
                value_date: group(&caps, "value_date"),
                code: group(&caps, "code"),
                payee: group(&caps, "payee"),
                amount: group(&caps, "amount"),
            });
        }
    }

    let account = account.ok_or_else(|| {
        ParseError::Format("could not find account number header from file".to_string())
    })?;
    let (due_date, bill_total) = due.ok_or_else(|| {
        ParseError::Format("could not find bill total and due date from file".to_string())
    })?;
    let payments_total = payments_total.ok_or_else(|| {
        ParseError::Format("could not find card transactions total from file".to_string())
    })?;
    debug!(rows = rows.len(), %due_date, "classified bill lines");

    let transactions = rows
        .iter()
        .map(|row| row.to_transaction(due_date, config))
        .collect::<Result<Vec<_>>>()?;

    reconcile(&transactions, payments_total, config.tolerance)?;

    Ok(Statement {
        account,
        due_date,
        bill_total,
        payments_total,
        transactions,
    })
}

/// Fail unless the amounts add up to `total` within `tolerance`.
pub fn reconcile(transactions: &[Transaction], total: Decimal, tolerance: Decimal) -> Result<()> {
    let sum = transactions.iter().try_fold(Decimal::ZERO, |acc, t| {
        acc.checked_add(t.amount)
            .ok_or_else(|| ParseError::field("amount", t.amount.to_string(), "sum of amounts out of range"))
    })?;
    let mismatch = sum
        .checked_sub(total)
        .map(|d| d.abs() > tolerance)
        .unwrap_or(true);
    if mismatch {
        warn!(%sum, %total, "card transactions do not add up to bill total");
        return Err(ParseError::Reconciliation { sum, total });
    }
    Ok(())
}

/// Bill amount: `1 234.56`, negative with a trailing hyphen (`4.99-`).
pub fn parse_amount(s: &str) -> std::result::Result<Decimal, rust_decimal::Error> {
    let s = s.replace(' ', "");
    match s.strip_suffix('-') {
        Some(abs) => format!("-{abs}").parse(),
        None => s.parse(),
    }
}

/// `dd.mm.` placed in the year window ending at the due date.
fn day_month(s: &str, due_date: NaiveDate) -> std::result::Result<NaiveDate, String> {
    if !matches_layout(s, "dd.dd.") {
        return Err("expected dd.mm.".to_string());
    }
    let with_placeholder = format!("{s}{PLACEHOLDER_YEAR}");
    let date = NaiveDate::parse_from_str(&with_placeholder, "%d.%m.%Y").map_err(|e| e.to_string())?;
    fix_year(date, due_date).ok_or_else(|| format!("cannot place {s} before {due_date}"))
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}
