//! The persisted shop document: everything except the daily stock sheets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Brand, Catalog, DEFAULT_BRANDS, DEFAULT_SIZES},
    common::same_name,
    expense::Expense,
    pricing::PriceList,
    purchase::PurchaseOrder,
    vendor::Vendor,
};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopBook {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub name: String,
    pub brands: Vec<Brand>,
    pub sizes: Vec<String>,
    #[serde(default)]
    pub prices: PriceList,
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    #[serde(default)]
    pub purchase_orders: Vec<PurchaseOrder>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub last_order_number: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShopBook {
    /// Creates an empty book with no brands or sizes.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            name: name.into(),
            brands: Vec::new(),
            sizes: Vec::new(),
            prices: PriceList::default(),
            vendors: Vec::new(),
            purchase_orders: Vec::new(),
            expenses: Vec::new(),
            last_order_number: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a book seeded with the supplied brands and sizes.
    pub fn seeded<B, S>(name: impl Into<String>, brands: B, sizes: S) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let mut book = Self::new(name);
        book.brands = brands.into_iter().map(Brand::new).collect();
        book.sizes = sizes.into_iter().map(Into::into).collect();
        book
    }

    /// Creates a book with the stock brand and bottle-size lists.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::seeded(
            name,
            DEFAULT_BRANDS.iter().copied(),
            DEFAULT_SIZES.iter().copied(),
        )
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// The catalog implied by the current brands and sizes.
    pub fn catalog(&self) -> Catalog {
        Catalog::from_grid(
            self.brands.iter().map(|brand| brand.name.as_str()),
            self.sizes.iter().map(String::as_str),
        )
    }

    pub fn brand(&self, name: &str) -> Option<&Brand> {
        self.brands.iter().find(|brand| same_name(&brand.name, name))
    }

    pub fn vendor(&self, name: &str) -> Option<&Vendor> {
        self.vendors.iter().find(|vendor| same_name(&vendor.name, name))
    }

    pub fn order(&self, order_number: &str) -> Option<&PurchaseOrder> {
        self.purchase_orders
            .iter()
            .find(|order| same_name(&order.order_number, order_number))
    }

    pub fn order_mut(&mut self, order_number: &str) -> Option<&mut PurchaseOrder> {
        self.purchase_orders
            .iter_mut()
            .find(|order| same_name(&order.order_number, order_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_book_has_forty_eight_entries() {
        let book = ShopBook::with_defaults("Main");
        assert_eq!(book.brands.len(), 12);
        assert_eq!(book.sizes.len(), 4);
        assert_eq!(book.catalog().len(), 48);
    }

    #[test]
    fn missing_optional_sections_deserialize() {
        let json = r#"{
            "name": "Legacy",
            "brands": [],
            "sizes": ["720ML"],
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let book: ShopBook = serde_json::from_str(json).expect("legacy book");
        assert_eq!(book.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(book.purchase_orders.is_empty());
        assert_eq!(book.last_order_number, 0);
    }
}
