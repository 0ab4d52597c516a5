use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::facets::{Category, PaymentMode};
use crate::error::AppError;

pub const MAX_NOTES_LEN: usize = 100;

/// A stored expense. Records are never edited once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: Category,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub payment_mode: PaymentMode,
}

/// Body of a submitted expense. `amount` accepts a JSON number or a numeric
/// string, which is what an HTML number input posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub amount: Decimal,
    pub category: Category,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub payment_mode: PaymentMode,
}

impl NewExpense {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(AppError::Validation(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }
        if let Some(notes) = self.notes() {
            let len = notes.chars().count();
            if len > MAX_NOTES_LEN {
                return Err(AppError::Validation(format!(
                    "notes must be at most {} characters, got {}",
                    MAX_NOTES_LEN, len
                )));
            }
        }
        if !(0..=9999).contains(&self.date.year()) {
            return Err(AppError::Validation(format!(
                "date {} is outside years 0000-9999",
                self.date
            )));
        }
        Ok(())
    }

    /// Blank notes are stored as absent.
    pub fn notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// An `expenses` row exactly as SQLite hands it back, before any parsing.
#[derive(FromRow, Debug, Clone)]
pub struct StoredExpense {
    pub expense_id: i64,
    pub amount: String,
    pub category: String,
    pub notes: Option<String>,
    pub expense_date: Option<String>,
    pub payment_mode: String,
}

impl TryFrom<StoredExpense> for Expense {
    type Error = AppError;

    /// Rejects rows whose text columns do not decode instead of guessing.
    fn try_from(row: StoredExpense) -> Result<Self, Self::Error> {
        let id = row.expense_id;

        let raw_date = row
            .expense_date
            .ok_or_else(|| AppError::integrity(id, "date is missing"))?;
        let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
            .map_err(|e| AppError::integrity(id, format!("date '{}' is not YYYY-MM-DD: {}", raw_date, e)))?;

        let amount = Decimal::from_str(row.amount.trim())
            .map_err(|e| AppError::integrity(id, format!("amount '{}' is not a decimal: {}", row.amount, e)))?;
        let category = Category::from_str(&row.category).map_err(|e| AppError::integrity(id, e))?;
        let payment_mode = PaymentMode::from_str(&row.payment_mode).map_err(|e| AppError::integrity(id, e))?;

        Ok(Expense {
            id,
            amount,
            category,
            notes: row.notes,
            date,
            payment_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn sample() -> NewExpense {
        NewExpense {
            amount: Decimal::new(12_550, 2),
            category: Category::Travel,
            notes: Some("cab to airport".into()),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            payment_mode: PaymentMode::Upi,
        }
    }

    #[test]
    fn amount_accepts_string_or_number() {
        let from_str: NewExpense = serde_json::from_str(
            r#"{"amount":"125.50","category":"Travel","notes":"cab to airport","date":"2024-05-02","paymentMode":"UPI"}"#,
        )
        .unwrap();
        assert_eq!(from_str, sample());

        let from_num: NewExpense = serde_json::from_str(
            r#"{"amount":40,"category":"Others","date":"2024-05-02","paymentMode":"Cash"}"#,
        )
        .unwrap();
        assert_eq!(from_num.amount, Decimal::from(40));
        assert_eq!(from_num.notes, None);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut e = sample();
        e.amount = Decimal::from_i32(-1).unwrap();
        assert!(matches!(e.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_amount_is_allowed() {
        let mut e = sample();
        e.amount = Decimal::ZERO;
        assert!(e.validate().is_ok());
    }

    #[test]
    fn notes_length_is_bounded_in_characters() {
        let mut e = sample();
        e.notes = Some("₹".repeat(MAX_NOTES_LEN));
        assert!(e.validate().is_ok());
        e.notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        assert!(matches!(e.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn surrounding_whitespace_does_not_count_toward_notes_length() {
        let mut e = sample();
        e.notes = Some(format!("  {}\n", "x".repeat(MAX_NOTES_LEN)));
        assert!(e.validate().is_ok());
        assert_eq!(e.notes().map(|n| n.chars().count()), Some(MAX_NOTES_LEN));
    }

    #[test]
    fn dates_beyond_four_digit_years_are_rejected() {
        let mut e = sample();
        e.date = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert!(matches!(e.validate(), Err(AppError::Validation(_))));
        e.date = NaiveDate::from_ymd_opt(-1, 12, 31).unwrap();
        assert!(matches!(e.validate(), Err(AppError::Validation(_))));
        e.date = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert!(e.validate().is_ok());
    }

    #[test]
    fn blank_notes_read_as_absent() {
        let mut e = sample();
        e.notes = Some("   ".into());
        assert_eq!(e.notes(), None);
    }

    #[test]
    fn expense_serializes_with_camel_case_and_numeric_amount() {
        let e = Expense {
            id: 7,
            amount: Decimal::from(500),
            category: Category::Rental,
            notes: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            payment_mode: PaymentMode::NetBanking,
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["amount"], serde_json::json!(500.0));
        assert_eq!(v["paymentMode"], "Net Banking");
        assert_eq!(v["date"], "2024-01-05");
    }

    fn stored(date: Option<&str>) -> StoredExpense {
        StoredExpense {
            expense_id: 9,
            amount: "12.50".into(),
            category: "Groceries".into(),
            notes: Some("milk".into()),
            expense_date: date.map(String::from),
            payment_mode: "Credit Card".into(),
        }
    }

    #[test]
    fn stored_row_decodes() {
        let e = Expense::try_from(stored(Some("2024-02-29"))).unwrap();
        assert_eq!(e.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(e.amount, Decimal::new(1250, 2));
        assert_eq!(e.payment_mode, PaymentMode::CreditCard);
    }

    #[test]
    fn missing_or_malformed_date_is_an_integrity_error() {
        for bad in [None, Some(""), Some("2024-13-01"), Some("next tuesday")] {
            match Expense::try_from(stored(bad)) {
                Err(AppError::DataIntegrity { id, .. }) => assert_eq!(id, 9),
                other => panic!("expected integrity error for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn unknown_category_is_an_integrity_error() {
        let mut row = stored(Some("2024-01-01"));
        row.category = "Food".into();
        assert!(matches!(Expense::try_from(row), Err(AppError::DataIntegrity { .. })));
    }
}
