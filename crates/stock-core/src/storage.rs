use std::{
    collections::{BTreeMap, HashSet},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
};

use chrono::{DateTime, NaiveDate, Utc};
use stock_domain::{Catalog, ShopBook, StockRecord};

use crate::{CoreError, CoreResult};

/// Describes a persisted backup of the shop book.
#[derive(Debug, Clone)]
pub struct BookBackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Persistence for daily stock records, addressed by `(date, brand, size)`.
///
/// Writes are upserts: the last write for a key wins and keys absent from a
/// write are left untouched. Implementations report an unreachable backend as
/// [`CoreError::StorageUnavailable`] and failed writes as
/// [`CoreError::Persistence`].
pub trait StockStore: Send + Sync {
    /// Every stored record for `date`, ordered by brand then size.
    fn fetch_day(&self, date: NaiveDate) -> CoreResult<Vec<StockRecord>>;
    /// Upserts `records` for `date`. Either all records are written or none.
    fn upsert_day(&self, date: NaiveDate, records: &[StockRecord]) -> CoreResult<()>;
    /// Dates that have at least one stored record, ascending.
    fn recorded_dates(&self) -> CoreResult<Vec<NaiveDate>>;
}

/// Persistence for the shop book (brands, prices, vendors, orders, expenses).
pub trait ShopStorage: Send + Sync {
    fn save_book(&self, book: &ShopBook) -> CoreResult<()>;
    /// Returns `None` when no book has been saved yet.
    fn load_book(&self) -> CoreResult<Option<ShopBook>>;
    fn backup_book(&self, book: &ShopBook, note: Option<&str>) -> CoreResult<BookBackupInfo>;
    fn list_backups(&self) -> CoreResult<Vec<BookBackupInfo>>;
    fn restore_backup(&self, backup: &BookBackupInfo) -> CoreResult<ShopBook>;
}

/// In-process [`StockStore`] that can be switched offline to exercise the
/// unavailable-backend paths.
#[derive(Debug, Default)]
pub struct MemoryStockStore {
    days: RwLock<BTreeMap<NaiveDate, Vec<StockRecord>>>,
    offline: AtomicBool,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> CoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CoreError::StorageUnavailable(
                "in-memory store is offline".into(),
            ))
        } else {
            Ok(())
        }
    }
}

impl StockStore for MemoryStockStore {
    fn fetch_day(&self, date: NaiveDate) -> CoreResult<Vec<StockRecord>> {
        self.ensure_available()?;
        let days = self
            .days
            .read()
            .map_err(|_| CoreError::StorageUnavailable("stock lock poisoned".into()))?;
        Ok(days.get(&date).cloned().unwrap_or_default())
    }

    fn upsert_day(&self, date: NaiveDate, records: &[StockRecord]) -> CoreResult<()> {
        self.ensure_available()?;
        let mut days = self
            .days
            .write()
            .map_err(|_| CoreError::Persistence("stock lock poisoned".into()))?;
        let stored = days.entry(date).or_default();
        merge_records(stored, records);
        Ok(())
    }

    fn recorded_dates(&self) -> CoreResult<Vec<NaiveDate>> {
        self.ensure_available()?;
        let days = self
            .days
            .read()
            .map_err(|_| CoreError::StorageUnavailable("stock lock poisoned".into()))?;
        Ok(days
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(date, _)| *date)
            .collect())
    }
}

/// Upserts `incoming` into `stored` by brand/size and keeps the result sorted
/// by brand then size.
pub fn merge_records(stored: &mut Vec<StockRecord>, incoming: &[StockRecord]) {
    for record in incoming {
        match stored
            .iter_mut()
            .find(|existing| existing.brand == record.brand && existing.size == record.size)
        {
            Some(existing) => *existing = record.clone(),
            None => stored.push(record.clone()),
        }
    }
    stored.sort_by(|a, b| a.brand.cmp(&b.brand).then_with(|| a.size.cmp(&b.size)));
}

/// Detects stored records that no longer match the catalog or whose sales
/// disagree with their quantities.
pub fn stock_warnings(records: &[StockRecord], catalog: &Catalog) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    for record in records {
        let key = record.key();
        if !catalog.contains(&key) {
            warnings.push(format!("record {key} is not in the catalog and was ignored"));
        }
        if !seen.insert(key.clone()) {
            warnings.push(format!("record {key} is stored more than once"));
        }
        if !record.is_consistent() {
            warnings.push(format!(
                "record {key} stored sales {} but quantities give {}",
                record.sales,
                record.derived_sales()
            ));
        }
    }
    warnings
}
