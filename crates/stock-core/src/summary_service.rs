//! Analytics rollup over a range of days.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stock_domain::{DateWindow, DayLedger, LedgerTotals, OrderStatus, ShopBook, StockKey};
use tracing::debug;

use crate::{expense_service::ExpenseService, storage::StockStore, CoreResult};

/// Latest recorded closing stock of a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentStock {
    pub key: StockKey,
    pub closing_stock: Decimal,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReport {
    /// `None` covers every recorded day.
    pub window: Option<DateWindow>,
    pub days_recorded: usize,
    /// Total of received purchase orders, by order date.
    pub purchases: Decimal,
    pub sales_quantity: Decimal,
    pub sales_value: Decimal,
    pub expenses: Decimal,
    pub current_stock: Vec<CurrentStock>,
}

impl PeriodReport {
    /// Sales value less purchases and expenses.
    pub fn profit(&self) -> Decimal {
        self.sales_value - self.purchases - self.expenses
    }
}

pub struct SummaryService;

impl SummaryService {
    /// The daily summary row shown under a ledger.
    pub fn day_totals(ledger: &DayLedger) -> LedgerTotals {
        ledger.totals()
    }

    pub fn period_report<S>(
        store: &S,
        book: &ShopBook,
        window: Option<DateWindow>,
    ) -> CoreResult<PeriodReport>
    where
        S: StockStore + ?Sized,
    {
        let in_window = |date: NaiveDate| window.map_or(true, |window| window.contains(date));
        let up_to_end = |date: NaiveDate| window.map_or(true, |window| date <= window.end);

        let mut days_recorded = 0;
        let mut sales_quantity = Decimal::ZERO;
        let mut sales_value = Decimal::ZERO;
        let mut latest: HashMap<StockKey, (Decimal, NaiveDate)> = HashMap::new();

        for date in store.recorded_dates()? {
            if !up_to_end(date) {
                continue;
            }
            let records = store.fetch_day(date)?;
            if in_window(date) {
                days_recorded += 1;
                for record in &records {
                    let sales = record.derived_sales();
                    sales_quantity += sales;
                    sales_value += sales * book.prices.price_of(&record.key());
                }
            }
            for record in records {
                latest.insert(record.key(), (record.closing_stock, date));
            }
        }

        let purchases = book
            .purchase_orders
            .iter()
            .filter(|order| order.status == OrderStatus::Received && in_window(order.order_date))
            .map(|order| order.total_amount)
            .sum();
        let expenses = ExpenseService::total_in(book, window.as_ref());

        let current_stock = book
            .catalog()
            .iter()
            .filter_map(|key| {
                latest.get(key).map(|(closing_stock, as_of)| CurrentStock {
                    key: key.clone(),
                    closing_stock: *closing_stock,
                    as_of: *as_of,
                })
            })
            .collect();

        debug!(days = days_recorded, "period report computed");
        Ok(PeriodReport {
            window,
            days_recorded,
            purchases,
            sales_quantity,
            sales_value,
            expenses,
            current_stock,
        })
    }
}
