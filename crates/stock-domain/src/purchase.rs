//! Purchase orders placed with vendors.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{catalog::StockKey, common::Identifiable};

const ORDER_PREFIX: &str = "PO";
const ORDER_DIGITS: usize = 6;

/// Formats a sequence number as `PO000042`.
pub fn format_order_number(sequence: u32) -> String {
    format!("{ORDER_PREFIX}{sequence:0width$}", width = ORDER_DIGITS)
}

/// Extracts the sequence number from an order number such as `PO000042`.
pub fn parse_order_number(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix(ORDER_PREFIX)
        .or_else(|| trimmed.strip_prefix("po"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Received,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Received => "received",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub brand: String,
    pub size: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

impl OrderItem {
    pub fn new(key: &StockKey, quantity: Decimal, rate: Decimal) -> Self {
        Self {
            brand: key.brand.clone(),
            size: key.size.clone(),
            quantity,
            rate,
            amount: quantity * rate,
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.brand.clone(), self.size.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub order_number: String,
    pub vendor: String,
    pub order_date: NaiveDate,
    pub expected_delivery: NaiveDate,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_on: Option<NaiveDate>,
}

impl PurchaseOrder {
    pub fn new(
        order_number: impl Into<String>,
        vendor: impl Into<String>,
        order_date: NaiveDate,
        expected_delivery: NaiveDate,
        items: Vec<OrderItem>,
    ) -> Self {
        let total_amount = items.iter().map(|item| item.amount).sum();
        Self {
            id: Uuid::new_v4(),
            order_number: order_number.into(),
            vendor: vendor.into(),
            order_date,
            expected_delivery,
            items,
            total_amount,
            status: OrderStatus::Pending,
            received_on: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn total_quantity(&self) -> Decimal {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

impl Identifiable for PurchaseOrder {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_numbers_are_zero_padded() {
        assert_eq!(format_order_number(7), "PO000007");
        assert_eq!(parse_order_number("PO000007"), Some(7));
        assert_eq!(parse_order_number("12"), Some(12));
        assert_eq!(parse_order_number("POX"), None);
    }

    #[test]
    fn totals_follow_item_amounts() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let items = vec![
            OrderItem::new(&StockKey::new("IB", "720ML"), dec!(12), dec!(400)),
            OrderItem::new(&StockKey::new("IB", "90ML"), dec!(48), dec!(55.5)),
        ];
        let order = PurchaseOrder::new("PO000001", "Acme", date, date, items);
        assert_eq!(order.total_amount, dec!(7464));
        assert_eq!(order.total_quantity(), dec!(60));
        assert!(order.is_pending());
    }
}
