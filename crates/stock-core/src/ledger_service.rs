//! The daily ledger engine: materializes, edits, loads and saves day ledgers.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use stock_domain::{Catalog, DayLedger, StockField, StockKey, StockRecord};
use tracing::{debug, info, warn};

use crate::{
    quantity::RawQuantity,
    storage::{stock_warnings, StockStore},
    CoreError, CoreResult,
};

/// Where the records of a loaded ledger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOrigin {
    /// The store held a record for every catalog entry.
    Saved,
    /// Some entries were missing and yesterday's closing stock filled at
    /// least one opening balance.
    CarriedForward,
    /// Some entries were saved; the rest were zero-filled.
    Partial,
    /// Nothing was stored for today or yesterday.
    Blank,
    /// The store could not be reached; the ledger is a display-only blank.
    Fallback,
}

/// Result of [`LedgerEngine::load_day`].
#[derive(Debug, Clone)]
pub struct LoadedDay {
    pub ledger: DayLedger,
    pub origin: LedgerOrigin,
    /// Records taken from the store for the requested date.
    pub saved: usize,
    /// Records whose opening balance came from the previous day's close.
    pub carried: usize,
}

/// Stateless operations over [`DayLedger`] values. Every call takes its full
/// input and returns a complete ledger; nothing is cached between calls.
pub struct LedgerEngine;

impl LedgerEngine {
    /// One all-zero record per catalog entry, in catalog order.
    pub fn initialize(date: NaiveDate, catalog: &Catalog) -> DayLedger {
        DayLedger::new(date, catalog.iter().map(StockRecord::zeroed).collect())
    }

    /// Sets `field` of the record at `key` from a raw cell value and
    /// recomputes that record's sales. Unparseable input is stored as zero.
    pub fn update_field<'a>(
        ledger: &'a mut DayLedger,
        key: &StockKey,
        field: StockField,
        raw: impl Into<RawQuantity>,
    ) -> CoreResult<&'a StockRecord> {
        let value = raw.into().resolve();
        let record = ledger
            .record_mut(key)
            .ok_or_else(|| CoreError::RecordNotFound(key.clone()))?;
        record.set(field, value);
        debug!(%key, %field, %value, sales = %record.sales, "stock field updated");
        Ok(record)
    }

    /// Same as [`LedgerEngine::update_field`] with the field given by name.
    /// `sales` and unknown names are rejected.
    pub fn update_named_field<'a>(
        ledger: &'a mut DayLedger,
        key: &StockKey,
        field: &str,
        raw: impl Into<RawQuantity>,
    ) -> CoreResult<&'a StockRecord> {
        let field: StockField = field.parse()?;
        Self::update_field(ledger, key, field, raw)
    }

    /// Loads the ledger for `date`. See [`LedgerEngine::load_day`].
    pub fn load_for_date<S>(
        store: &S,
        date: NaiveDate,
        catalog: &Catalog,
    ) -> CoreResult<DayLedger>
    where
        S: StockStore + ?Sized,
    {
        Self::load_day(store, date, catalog).map(|loaded| loaded.ledger)
    }

    /// Loads the ledger for `date` without writing anything back.
    ///
    /// Saved records for `date` are used as-is (sales recomputed) and come
    /// back ordered by brand then size. If they do not cover the catalog, each
    /// missing entry starts at zero with its opening balance taken from the
    /// previous day's closing stock when the previous day has that entry; that
    /// ledger follows catalog order. Records for keys outside the catalog are
    /// ignored.
    pub fn load_day<S>(store: &S, date: NaiveDate, catalog: &Catalog) -> CoreResult<LoadedDay>
    where
        S: StockStore + ?Sized,
    {
        let stored = store.fetch_day(date)?;
        for warning in stock_warnings(&stored, catalog) {
            debug!(%date, "{warning}");
        }
        let today = index_by_key(stored, catalog);

        if !today.is_empty() && today.len() == catalog.len() {
            let mut records: Vec<StockRecord> =
                today.into_values().map(with_derived_sales).collect();
            records.sort_by(|a, b| a.brand.cmp(&b.brand).then_with(|| a.size.cmp(&b.size)));
            info!(%date, records = catalog.len(), "loaded saved ledger");
            return Ok(LoadedDay {
                ledger: DayLedger::new(date, records),
                origin: LedgerOrigin::Saved,
                saved: catalog.len(),
                carried: 0,
            });
        }

        let previous = match date.pred_opt() {
            Some(previous_date) => index_by_key(store.fetch_day(previous_date)?, catalog),
            None => HashMap::new(),
        };

        let mut carried = 0;
        let records = catalog
            .iter()
            .map(|key| match today.get(key) {
                Some(saved) => with_derived_sales(saved.clone()),
                None => {
                    let mut record = StockRecord::zeroed(key);
                    if let Some(yesterday) = previous.get(key) {
                        record.set(StockField::OpeningBalance, yesterday.closing_stock);
                        carried += 1;
                    }
                    record
                }
            })
            .collect();

        let origin = if carried > 0 {
            LedgerOrigin::CarriedForward
        } else if !today.is_empty() {
            LedgerOrigin::Partial
        } else {
            LedgerOrigin::Blank
        };
        info!(%date, saved = today.len(), carried, ?origin, "materialized ledger");
        Ok(LoadedDay {
            ledger: DayLedger::new(date, records),
            origin,
            saved: today.len(),
            carried,
        })
    }

    /// Like [`LedgerEngine::load_day`], but an unreachable store yields a blank
    /// ledger marked [`LedgerOrigin::Fallback`] instead of an error. The
    /// fallback is for display only and must not be saved as if it were data.
    pub fn load_or_blank<S>(
        store: &S,
        date: NaiveDate,
        catalog: &Catalog,
    ) -> CoreResult<LoadedDay>
    where
        S: StockStore + ?Sized,
    {
        match Self::load_day(store, date, catalog) {
            Err(CoreError::StorageUnavailable(reason)) => {
                warn!(%date, %reason, "stock store unavailable, showing blank ledger");
                Ok(LoadedDay {
                    ledger: Self::initialize(date, catalog),
                    origin: LedgerOrigin::Fallback,
                    saved: 0,
                    carried: 0,
                })
            }
            other => other,
        }
    }

    /// Upserts every record of `ledger` under `ledger.date`. Sales are
    /// recomputed on the way out so a stale value is never written.
    pub fn save<S>(store: &S, ledger: &DayLedger) -> CoreResult<()>
    where
        S: StockStore + ?Sized,
    {
        let records: Vec<StockRecord> = ledger
            .records
            .iter()
            .cloned()
            .map(with_derived_sales)
            .collect();
        store
            .upsert_day(ledger.date, &records)
            .map_err(|err| match err {
                CoreError::StorageUnavailable(_) | CoreError::Persistence(_) => err,
                other => CoreError::Persistence(other.to_string()),
            })?;
        info!(date = %ledger.date, records = records.len(), "saved ledger");
        Ok(())
    }

    /// Saves a ledger that came from [`LedgerEngine::load_or_blank`]. A
    /// [`LedgerOrigin::Fallback`] ledger was never read from the store and
    /// saving it would zero every stored row for the date, so it is refused.
    pub fn save_loaded<S>(store: &S, ledger: &DayLedger, origin: LedgerOrigin) -> CoreResult<()>
    where
        S: StockStore + ?Sized,
    {
        if origin == LedgerOrigin::Fallback {
            warn!(date = %ledger.date, "refusing to save a fallback ledger");
            return Err(CoreError::InvalidOperation(format!(
                "The sheet for {} was not read from storage; reopen the day before saving",
                ledger.date
            )));
        }
        Self::save(store, ledger)
    }

    /// Opening balances are hand-entered only on the first day of a month;
    /// other days derive them from the previous close. Enforcement is up to
    /// the caller.
    pub fn opening_balance_editable(date: NaiveDate) -> bool {
        date.day() == 1
    }
}

fn index_by_key(records: Vec<StockRecord>, catalog: &Catalog) -> HashMap<StockKey, StockRecord> {
    records
        .into_iter()
        .filter(|record| catalog.contains(&record.key()))
        .map(|record| (record.key(), record))
        .collect()
}

fn with_derived_sales(mut record: StockRecord) -> StockRecord {
    record.recompute_sales();
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStockStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::from_grid(["A", "B"], ["720ML", "360ML"])
    }

    #[test]
    fn initialize_is_all_zero_in_catalog_order() {
        let ledger = LedgerEngine::initialize(date(3), &catalog());
        assert_eq!(ledger.len(), 4);
        assert!(ledger.records.iter().all(StockRecord::is_zero));
        assert_eq!(ledger.records[1].key(), StockKey::new("A", "360ML"));
    }

    #[test]
    fn update_field_rejects_unknown_key() {
        let mut ledger = LedgerEngine::initialize(date(3), &catalog());
        let err = LedgerEngine::update_field(
            &mut ledger,
            &StockKey::new("Z", "720ML"),
            StockField::Purchase,
            "5",
        )
        .expect_err("unknown key");
        assert!(matches!(err, CoreError::RecordNotFound(_)));
    }

    #[test]
    fn update_field_leaves_other_records_untouched() {
        let mut ledger = LedgerEngine::initialize(date(3), &catalog());
        let before = ledger.clone();
        let key = StockKey::new("B", "720ML");
        LedgerEngine::update_field(&mut ledger, &key, StockField::ClosingStock, "2").unwrap();
        for (after, original) in ledger.records.iter().zip(&before.records) {
            if after.matches(&key) {
                assert_eq!(after.sales, dec!(-2));
            } else {
                assert_eq!(after, original);
            }
        }
    }

    #[test]
    fn update_named_field_refuses_sales() {
        let mut ledger = LedgerEngine::initialize(date(3), &catalog());
        let err = LedgerEngine::update_named_field(
            &mut ledger,
            &StockKey::new("A", "720ML"),
            "sales",
            "9",
        )
        .expect_err("sales is derived");
        assert!(matches!(err, CoreError::InvalidField(_)));
    }

    #[test]
    fn stored_sales_are_recomputed_on_load() {
        let store = MemoryStockStore::new();
        let catalog = Catalog::from_grid(["A"], ["720ML"]);
        let mut record = StockRecord::zeroed(&StockKey::new("A", "720ML"));
        record.opening_balance = dec!(9);
        record.sales = dec!(100);
        store.upsert_day(date(4), &[record]).unwrap();

        let loaded = LedgerEngine::load_day(&store, date(4), &catalog).unwrap();
        assert_eq!(loaded.origin, LedgerOrigin::Saved);
        assert_eq!(loaded.ledger.records[0].sales, dec!(9));
    }

    #[test]
    fn orphaned_records_are_ignored() {
        let store = MemoryStockStore::new();
        let catalog = Catalog::from_grid(["A"], ["720ML"]);
        let mut renamed = StockRecord::zeroed(&StockKey::new("Old Name", "720ML"));
        renamed.set(StockField::ClosingStock, dec!(4));
        store.upsert_day(date(4), &[renamed]).unwrap();

        let loaded = LedgerEngine::load_day(&store, date(4), &catalog).unwrap();
        assert_eq!(loaded.origin, LedgerOrigin::Blank);
        assert_eq!(loaded.ledger.len(), 1);
        assert!(loaded.ledger.records[0].is_zero());
    }

    #[test]
    fn save_rewrites_stale_sales() {
        let store = MemoryStockStore::new();
        let mut ledger = LedgerEngine::initialize(date(5), &Catalog::from_grid(["A"], ["90ML"]));
        ledger.records[0].purchase = dec!(3);
        LedgerEngine::save(&store, &ledger).unwrap();
        let stored = store.fetch_day(date(5)).unwrap();
        assert_eq!(stored[0].sales, dec!(3));
    }

    #[test]
    fn unavailable_store_falls_back_to_blank() {
        let store = MemoryStockStore::new();
        store.set_available(false);
        let err = LedgerEngine::load_for_date(&store, date(6), &catalog()).expect_err("offline");
        assert!(matches!(err, CoreError::StorageUnavailable(_)));

        let loaded = LedgerEngine::load_or_blank(&store, date(6), &catalog()).unwrap();
        assert_eq!(loaded.origin, LedgerOrigin::Fallback);
        assert_eq!(loaded.ledger.len(), 4);
        assert!(loaded
            .ledger
            .records
            .iter()
            .all(|record| record.sales == Decimal::ZERO));
    }

    #[test]
    fn save_reports_unavailable_store() {
        let store = MemoryStockStore::new();
        store.set_available(false);
        let ledger = LedgerEngine::initialize(date(6), &catalog());
        let err = LedgerEngine::save(&store, &ledger).expect_err("offline");
        assert!(matches!(err, CoreError::StorageUnavailable(_)));
    }

    #[test]
    fn opening_balance_is_editable_on_the_first() {
        assert!(LedgerEngine::opening_balance_editable(date(1)));
        assert!(!LedgerEngine::opening_balance_editable(date(2)));
    }
}
