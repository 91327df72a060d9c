//! Transaction and file types produced by every statement parser.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// One account transaction, normalized across sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// Booking date (local midnight in the statement zone)
    pub transaction_date: DateTime<Tz>,
    pub value_date: DateTime<Tz>,
    /// Not printed on card bills
    pub payment_date: Option<DateTime<Tz>>,
    /// Negative = outgoing, positive = incoming
    pub amount: Decimal,
    pub payee_payer: String,
    /// Counterparty account (IBAN) when the source has one
    pub account: String,
    pub bic: String,
    /// Bank transaction type ("Itsepalvelu") or the card bill's 12 character archive code
    pub transaction_code: String,
    pub reference: String,
    pub payer_reference: String,
    pub message: String,
    pub card_number: String,
}

impl Transaction {
    /// A transaction with only the mandatory fields set.
    pub fn new(
        transaction_date: DateTime<Tz>,
        value_date: DateTime<Tz>,
        amount: Decimal,
        payee_payer: impl Into<String>,
    ) -> Self {
        Self {
            transaction_date,
            value_date,
            payment_date: None,
            amount,
            payee_payer: payee_payer.into(),
            account: String::new(),
            bic: String::new(),
            transaction_code: String::new(),
            reference: String::new(),
            payer_reference: String::new(),
            message: String::new(),
            card_number: String::new(),
        }
    }

    /// Calendar day of the booking
    pub fn booking_day(&self) -> NaiveDate {
        self.transaction_date.date_naive()
    }

    pub fn value_day(&self) -> NaiveDate {
        self.value_date.date_naive()
    }

    pub fn payment_day(&self) -> Option<NaiveDate> {
        self.payment_date.map(|d| d.date_naive())
    }

    pub fn is_debit(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    pub fn is_credit(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<30} {:>8.2}",
            self.transaction_date.format("%d.%m.%Y"),
            self.payee_payer,
            self.amount
        )
    }
}

/// Transactions of one account from one source file.
///
/// Only constructed from a complete, validated transaction list; there is no
/// way to add or remove transactions afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct File {
    file_name: String,
    account: String,
    transactions: Vec<Transaction>,
}

impl File {
    pub fn new(
        file_name: impl Into<String>,
        account: impl Into<String>,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            account: account.into(),
            transactions,
        }
    }

    /// Base name of the parsed file
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// IBAN, or masked card number for card bills
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    /// Sum of all amounts, `None` if it does not fit in a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.transactions
            .iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::local_midnight;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Tz> {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        local_midnight(date, chrono_tz::Europe::Helsinki).unwrap()
    }

    #[test]
    fn test_transaction_sign_helpers() {
        let tx = Transaction::new(day(2015, 3, 23), day(2015, 3, 22), dec!(-30.00), "Payee ry");
        assert!(tx.is_debit());
        assert!(!tx.is_credit());
        assert_eq!(tx.booking_day(), NaiveDate::from_ymd_opt(2015, 3, 23).unwrap());
        assert_eq!(tx.payment_day(), None);
    }

    #[test]
    fn test_transaction_display() {
        let tx = Transaction::new(day(2015, 3, 23), day(2015, 3, 22), dec!(-30.00), "Payee ry");
        assert_eq!(
            tx.to_string(),
            "23.03.2015 Payee ry                         -30.00"
        );
    }

    #[test]
    fn test_file_total_and_accessors() {
        let file = File::new(
            "bill.pdf",
            "************3456/HOLDER CARD",
            vec![
                Transaction::new(day(2016, 11, 10), day(2017, 1, 2), dec!(13.37), "HESBURGER"),
                Transaction::new(day(2016, 12, 2), day(2017, 1, 2), dec!(-4.99), "ITUNES.COM/BILL"),
            ],
        );
        assert_eq!(file.file_name(), "bill.pdf");
        assert_eq!(file.total(), Some(dec!(8.38)));
        assert_eq!(file.transactions().len(), 2);
    }

    #[test]
    fn test_file_total_overflow() {
        let big = Transaction::new(day(2016, 11, 10), day(2017, 1, 2), Decimal::MAX, "BIG");
        let file = File::new("bill.pdf", "", vec![big.clone(), big]);
        assert_eq!(file.total(), None);
    }

    #[test]
    fn test_serializes_dates_with_zone_offset() {
        let tx = Transaction::new(day(2015, 3, 23), day(2015, 3, 22), dec!(-30.00), "Payee ry");
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["transaction_date"], "2015-03-23T00:00:00+02:00");
        assert_eq!(json["amount"], "-30.00");
        assert!(json["payment_date"].is_null());
    }
}
