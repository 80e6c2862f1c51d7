use rust_decimal::Decimal;
use stock_domain::{DayLedger, PriceEntry, ShopBook, StockKey};

use crate::{quantity::RawQuantity, CoreError, CoreResult};

pub struct PriceService;

impl PriceService {
    /// Sets the selling price of a catalog entry. Brand and size are matched
    /// case-insensitively and stored with the catalog's spelling. The price is
    /// read like a stock cell, so junk input prices the entry at zero.
    pub fn set(
        book: &mut ShopBook,
        brand: &str,
        size: &str,
        price: impl Into<RawQuantity>,
    ) -> CoreResult<(StockKey, Decimal)> {
        let price = price.into().resolve();
        let catalog = book.catalog();
        let key = catalog
            .find(brand, size)
            .cloned()
            .ok_or_else(|| CoreError::RecordNotFound(StockKey::new(brand.trim(), size.trim())))?;
        book.prices.set(&key, price);
        book.touch();
        Ok((key, price))
    }

    pub fn price_of(book: &ShopBook, key: &StockKey) -> Decimal {
        book.prices.price_of(key)
    }

    pub fn reset(book: &mut ShopBook) {
        book.prices.reset();
        book.touch();
    }

    pub fn list(book: &ShopBook) -> Vec<PriceEntry> {
        book.catalog()
            .iter()
            .map(|key| PriceEntry {
                brand: key.brand.clone(),
                size: key.size.clone(),
                price: book.prices.price_of(key),
            })
            .collect()
    }

    /// Money taken for a day: sales quantity times price, summed.
    pub fn sales_value(book: &ShopBook, ledger: &DayLedger) -> Decimal {
        ledger
            .records
            .iter()
            .map(|record| record.sales * book.prices.price_of(&record.key()))
            .sum()
    }
}
