//! Daily stock records and the per-date ledger that groups them.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, StockKey};

/// The three user-editable quantities of a [`StockRecord`]. `sales` is derived and
/// deliberately has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockField {
    OpeningBalance,
    Purchase,
    ClosingStock,
}

impl StockField {
    pub const ALL: [StockField; 3] = [
        StockField::OpeningBalance,
        StockField::Purchase,
        StockField::ClosingStock,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StockField::OpeningBalance => "opening",
            StockField::Purchase => "purchase",
            StockField::ClosingStock => "closing",
        }
    }
}

impl fmt::Display for StockField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StockField {
    type Err = StockFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "opening" | "openingbalance" => Ok(StockField::OpeningBalance),
            "purchase" | "purchases" => Ok(StockField::Purchase),
            "closing" | "closingstock" => Ok(StockField::ClosingStock),
            "sales" => Err(StockFieldError::Derived),
            _ => Err(StockFieldError::Unknown(value.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors produced when parsing a [`StockField`] name.
pub enum StockFieldError {
    Derived,
    Unknown(String),
}

impl fmt::Display for StockFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockFieldError::Derived => {
                f.write_str("sales is derived from opening + purchase - closing")
            }
            StockFieldError::Unknown(name) => write!(
                f,
                "unknown field `{name}` (expected opening, purchase or closing)"
            ),
        }
    }
}

impl std::error::Error for StockFieldError {}

/// One brand/size row of a day's stock sheet.
///
/// `sales` always equals `opening_balance + purchase - closing_stock`; every
/// mutator recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub brand: String,
    pub size: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub opening_balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub purchase: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub closing_stock: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub sales: Decimal,
}

impl StockRecord {
    /// Creates an all-zero record for `key`.
    pub fn zeroed(key: &StockKey) -> Self {
        Self {
            brand: key.brand.clone(),
            size: key.size.clone(),
            opening_balance: Decimal::ZERO,
            purchase: Decimal::ZERO,
            closing_stock: Decimal::ZERO,
            sales: Decimal::ZERO,
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.brand.clone(), self.size.clone())
    }

    pub fn matches(&self, key: &StockKey) -> bool {
        self.brand == key.brand && self.size == key.size
    }

    pub fn get(&self, field: StockField) -> Decimal {
        match field {
            StockField::OpeningBalance => self.opening_balance,
            StockField::Purchase => self.purchase,
            StockField::ClosingStock => self.closing_stock,
        }
    }

    /// Assigns `value` to `field` and recomputes sales.
    pub fn set(&mut self, field: StockField, value: Decimal) {
        match field {
            StockField::OpeningBalance => self.opening_balance = value,
            StockField::Purchase => self.purchase = value,
            StockField::ClosingStock => self.closing_stock = value,
        }
        self.recompute_sales();
    }

    pub fn derived_sales(&self) -> Decimal {
        self.opening_balance + self.purchase - self.closing_stock
    }

    pub fn recompute_sales(&mut self) {
        self.sales = self.derived_sales();
    }

    pub fn is_consistent(&self) -> bool {
        self.sales == self.derived_sales()
    }

    pub fn is_zero(&self) -> bool {
        self.opening_balance.is_zero()
            && self.purchase.is_zero()
            && self.closing_stock.is_zero()
            && self.sales.is_zero()
    }
}

/// All stock records for one calendar date, one per catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLedger {
    pub date: NaiveDate,
    pub records: Vec<StockRecord>,
}

impl DayLedger {
    pub fn new(date: NaiveDate, records: Vec<StockRecord>) -> Self {
        Self { date, records }
    }

    pub fn record(&self, key: &StockKey) -> Option<&StockRecord> {
        self.records.iter().find(|record| record.matches(key))
    }

    pub fn record_mut(&mut self, key: &StockKey) -> Option<&mut StockRecord> {
        self.records.iter_mut().find(|record| record.matches(key))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = StockKey> + '_ {
        self.records.iter().map(StockRecord::key)
    }

    /// Returns `true` when the ledger holds exactly one record per catalog entry.
    pub fn covers(&self, catalog: &Catalog) -> bool {
        self.records.len() == catalog.len() && catalog.iter().all(|key| self.record(key).is_some())
    }

    pub fn is_consistent(&self) -> bool {
        self.records.iter().all(StockRecord::is_consistent)
    }

    /// Column sums shown in the daily summary.
    pub fn totals(&self) -> LedgerTotals {
        self.records
            .iter()
            .fold(LedgerTotals::default(), |mut totals, record| {
                totals.opening_balance += record.opening_balance;
                totals.purchase += record.purchase;
                totals.closing_stock += record.closing_stock;
                totals.sales += record.sales;
                totals
            })
    }
}

/// Sum of each quantity across a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub opening_balance: Decimal,
    pub purchase: Decimal,
    pub closing_stock: Decimal,
    pub sales: Decimal,
}
