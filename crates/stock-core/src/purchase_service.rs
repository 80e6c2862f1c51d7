//! Purchase orders and their receipt into the day's stock sheet.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stock_domain::{
    format_order_number, DayLedger, OrderItem, OrderStatus, PurchaseOrder, ShopBook, StockField,
    StockKey,
};
use tracing::{info, warn};

use crate::{CoreError, CoreResult};

/// One requested line of a new order, as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub brand: String,
    pub size: String,
    pub quantity: Decimal,
    pub rate: Decimal,
}

impl OrderLine {
    pub fn new(
        brand: impl Into<String>,
        size: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            brand: brand.into(),
            size: size.into(),
            quantity,
            rate,
        }
    }
}

/// Outcome of receiving an order into a ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Receipt {
    pub applied: Vec<StockKey>,
    pub skipped: Vec<StockKey>,
}

pub struct PurchaseService;

impl PurchaseService {
    /// The number the next order will get, e.g. `PO000004`.
    pub fn next_order_number(book: &ShopBook) -> String {
        format_order_number(book.last_order_number.saturating_add(1))
    }

    pub fn create_order(
        book: &mut ShopBook,
        vendor: &str,
        order_date: NaiveDate,
        expected_delivery: NaiveDate,
        lines: Vec<OrderLine>,
    ) -> CoreResult<PurchaseOrder> {
        if vendor.trim().is_empty() {
            return Err(CoreError::Validation("Vendor is required".into()));
        }
        let vendor = book
            .vendor(vendor)
            .map(|vendor| vendor.name.clone())
            .ok_or_else(|| CoreError::VendorNotFound(vendor.trim().to_string()))?;
        if lines.is_empty() {
            return Err(CoreError::Validation(
                "An order needs at least one item".into(),
            ));
        }
        if expected_delivery < order_date {
            return Err(CoreError::Validation(
                "Expected delivery cannot precede the order date".into(),
            ));
        }

        let catalog = book.catalog();
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let key = catalog.find(&line.brand, &line.size).cloned().ok_or_else(|| {
                CoreError::RecordNotFound(StockKey::new(line.brand.trim(), line.size.trim()))
            })?;
            if line.quantity <= Decimal::ZERO {
                return Err(CoreError::Validation(format!(
                    "Quantity for {key} must be positive"
                )));
            }
            if line.rate.is_sign_negative() && !line.rate.is_zero() {
                return Err(CoreError::Validation(format!(
                    "Rate for {key} cannot be negative"
                )));
            }
            items.push(OrderItem::new(&key, line.quantity, line.rate));
        }

        let sequence = book.last_order_number.saturating_add(1);
        let order = PurchaseOrder::new(
            format_order_number(sequence),
            vendor,
            order_date,
            expected_delivery,
            items,
        );
        book.last_order_number = sequence;
        book.purchase_orders.push(order.clone());
        book.touch();
        info!(
            order = %order.order_number,
            vendor = %order.vendor,
            total = %order.total_amount,
            "purchase order created"
        );
        Ok(order)
    }

    /// Adds each item's quantity to the purchase column of `ledger` and marks
    /// the order received on the ledger's date. Items with no row in the
    /// ledger are skipped.
    pub fn receive_order(
        book: &mut ShopBook,
        ledger: &mut DayLedger,
        order_number: &str,
    ) -> CoreResult<Receipt> {
        let order = Self::pending_order(book, order_number)?;
        let mut receipt = Receipt::default();
        for item in &order.items {
            let key = item.key();
            let matched = ledger.keys().find(|candidate| {
                stock_domain::same_name(&candidate.brand, &key.brand)
                    && stock_domain::same_name(&candidate.size, &key.size)
            });
            match matched.and_then(|found| ledger.record_mut(&found)) {
                Some(record) => {
                    let updated = record.purchase + item.quantity;
                    record.set(StockField::Purchase, updated);
                    receipt.applied.push(key);
                }
                None => {
                    warn!(order = %order.order_number, item = %key, "item not in ledger, skipped");
                    receipt.skipped.push(key);
                }
            }
        }
        order.status = OrderStatus::Received;
        order.received_on = Some(ledger.date);
        info!(
            order = %order.order_number,
            date = %ledger.date,
            applied = receipt.applied.len(),
            skipped = receipt.skipped.len(),
            "purchase order received"
        );
        book.touch();
        Ok(receipt)
    }

    pub fn cancel_order(book: &mut ShopBook, order_number: &str) -> CoreResult<()> {
        let order = Self::pending_order(book, order_number)?;
        order.status = OrderStatus::Cancelled;
        info!(order = %order.order_number, "purchase order cancelled");
        book.touch();
        Ok(())
    }

    pub fn list(book: &ShopBook, status: Option<OrderStatus>) -> Vec<&PurchaseOrder> {
        book.purchase_orders
            .iter()
            .filter(|order| status.map_or(true, |wanted| order.status == wanted))
            .collect()
    }

    fn pending_order<'a>(
        book: &'a mut ShopBook,
        order_number: &str,
    ) -> CoreResult<&'a mut PurchaseOrder> {
        let order = book
            .order_mut(order_number)
            .ok_or_else(|| CoreError::OrderNotFound(order_number.trim().to_string()))?;
        if !order.is_pending() {
            return Err(CoreError::InvalidOperation(format!(
                "Order {} is already {}",
                order.order_number, order.status
            )));
        }
        Ok(order)
    }
}
