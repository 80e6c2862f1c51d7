//! Per-bottle selling prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::StockKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub brand: String,
    pub size: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl PriceEntry {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.brand.clone(), self.size.clone())
    }
}

/// Price table keyed by brand and size. Keys without an entry price at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceList {
    #[serde(default)]
    entries: Vec<PriceEntry>,
}

impl PriceList {
    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn price_of(&self, key: &StockKey) -> Decimal {
        self.entries
            .iter()
            .find(|entry| entry.brand == key.brand && entry.size == key.size)
            .map(|entry| entry.price)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn set(&mut self, key: &StockKey, price: Decimal) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.brand == key.brand && entry.size == key.size)
        {
            Some(entry) => entry.price = price,
            None => self.entries.push(PriceEntry {
                brand: key.brand.clone(),
                size: key.size.clone(),
                price,
            }),
        }
    }

    /// Sets every price back to zero.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn rename_brand(&mut self, from: &str, to: &str) {
        for entry in self.entries.iter_mut().filter(|entry| entry.brand == from) {
            entry.brand = to.to_string();
        }
    }

    pub fn remove_brand(&mut self, brand: &str) {
        self.entries.retain(|entry| entry.brand != brand);
    }
}
