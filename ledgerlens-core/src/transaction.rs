//! Transaction record types shared by every front-end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::categorizer::classify;
use crate::lexical::{dmy_date, format_dmy};

/// A transaction as produced by one of the parsers, before a store assigns it an id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// Calendar date, DD/MM/YYYY on the wire
    #[serde(with = "dmy_date")]
    pub date: NaiveDate,
    /// Trimmed label; parsers synthesize one when the source has none
    pub description: String,
    /// Positive = credit (income), negative = debit (expense)
    pub amount: f64,
    pub category: Category,
    /// Running balance after this row (statement rows only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    /// Delivery time of the originating message, epoch millis (SMS rows only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_timestamp: Option<i64>,
    #[serde(default)]
    pub source: TransactionSource,
}

/// Where a transaction was read from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    #[default]
    Statement,
    Sms,
    Manual,
}

/// Direction of a manually entered transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Expense,
    Income,
}

/// Fixed category taxonomy. Declaration order is the classifier's rule order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Rent")]
    Rent,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Subscriptions")]
    Subscriptions,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Utilities")]
    Utilities,
    #[serde(rename = "Health")]
    Health,
    #[serde(rename = "Savings")]
    Savings,
    #[serde(rename = "Income")]
    Income,
    #[serde(rename = "Others")]
    Others,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::FoodAndDining,
        Category::Transportation,
        Category::Rent,
        Category::Travel,
        Category::Shopping,
        Category::Subscriptions,
        Category::Entertainment,
        Category::Education,
        Category::Utilities,
        Category::Health,
        Category::Savings,
        Category::Income,
        Category::Others,
    ];

    /// Display label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Rent => "Rent",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Subscriptions => "Subscriptions",
            Category::Entertainment => "Entertainment",
            Category::Education => "Education",
            Category::Utilities => "Utilities",
            Category::Health => "Health",
            Category::Savings => "Savings",
            Category::Income => "Income",
            Category::Others => "Others",
        }
    }

    /// Income/expense-only rule used for SMS imports.
    pub fn from_sign(amount: f64) -> Self {
        if amount > 0.0 {
            Category::Income
        } else {
            Category::Others
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl RawTransaction {
    /// Create a statement row
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: f64,
        category: Category,
    ) -> Self {
        Self {
            date,
            description: description.into().trim().to_string(),
            amount,
            category,
            balance: None,
            source_timestamp: None,
            source: TransactionSource::Statement,
        }
    }

    /// Build a manual entry. `amount` is the magnitude the user typed; the
    /// kind decides the sign. Returns `None` for non-positive amounts.
    pub fn manual(
        date: NaiveDate,
        description: impl Into<String>,
        amount: f64,
        kind: EntryKind,
    ) -> Option<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        let description = description.into();
        let (amount, category) = match kind {
            EntryKind::Expense => (-amount, classify(&description)),
            EntryKind::Income => (amount, Category::Income),
        };
        Some(Self::new(date, description, amount, category).with_source(TransactionSource::Manual))
    }

    pub fn with_balance(self, balance: f64) -> Self {
        Self {
            balance: Some(balance),
            ..self
        }
    }

    pub fn with_source_timestamp(self, timestamp: i64) -> Self {
        Self {
            source_timestamp: Some(timestamp),
            ..self
        }
    }

    pub fn with_source(self, source: TransactionSource) -> Self {
        Self { source, ..self }
    }

    /// Duplicate key: `DD/MM/YYYY|amount|description`, description trimmed and lowercased
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{:.2}|{}",
            format_dmy(self.date),
            self.amount,
            self.description.trim().to_lowercase()
        )
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true if this is income (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coffee() -> RawTransaction {
        RawTransaction::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            "Coffee Shop",
            -250.0,
            Category::FoodAndDining,
        )
    }

    #[test]
    fn test_fingerprint_format() {
        assert_eq!(coffee().fingerprint(), "01/02/2024|-250.00|coffee shop");
    }

    #[test]
    fn test_fingerprint_trims_description() {
        let t = coffee();
        let padded = RawTransaction {
            description: format!("  {}  ", t.description),
            ..t.clone()
        };
        assert_eq!(t.fingerprint(), padded.fingerprint());
    }

    #[test]
    fn test_fingerprint_lowercases() {
        let t = coffee();
        let shouted = RawTransaction {
            description: t.description.to_uppercase(),
            ..t.clone()
        };
        assert_eq!(t.fingerprint(), shouted.fingerprint());
    }

    #[test]
    fn test_serializes_dmy_and_labels() {
        let t = coffee().with_balance(9750.0);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["date"], "01/02/2024");
        assert_eq!(json["category"], "Food & Dining");
        assert_eq!(json["balance"], 9750.0);
        assert_eq!(json["source"], "statement");
        assert!(json.get("sourceTimestamp").is_none());

        let back: RawTransaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_manual_entry() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let lunch = RawTransaction::manual(date, "Swiggy lunch", 320.0, EntryKind::Expense).unwrap();
        assert_eq!(lunch.amount, -320.0);
        assert_eq!(lunch.category, Category::FoodAndDining);
        assert_eq!(lunch.source, TransactionSource::Manual);

        let pay = RawTransaction::manual(date, "March payout", 50000.0, EntryKind::Income).unwrap();
        assert_eq!(pay.category, Category::Income);
        assert!(pay.is_income());

        assert!(RawTransaction::manual(date, "nothing", 0.0, EntryKind::Expense).is_none());
    }

    #[test]
    fn test_category_labels_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_label(c.label()), Some(c));
        }
        assert_eq!(Category::from_sign(10.0), Category::Income);
        assert_eq!(Category::from_sign(-10.0), Category::Others);
    }
}
