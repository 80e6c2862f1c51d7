use std::fs;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use stock_core::{
    storage::{ShopStorage, StockStore},
    CoreError, LedgerEngine, LedgerOrigin,
};
use stock_domain::{Catalog, ShopBook, StockField, StockKey, StockRecord};
use stock_storage_json::{JsonStockStorage, StoragePaths};
use tempfile::tempdir;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

fn record(brand: &str, size: &str, closing: u32) -> StockRecord {
    let mut record = StockRecord::zeroed(&StockKey::new(brand, size));
    record.set(StockField::ClosingStock, closing.into());
    record
}

#[test]
fn json_storage_upserts_day_records() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonStockStorage::new(StoragePaths::under(dir.path())).expect("create storage");

    storage
        .upsert_day(date(1), &[record("Romano", "90ML", 4), record("IB", "720ML", 2)])
        .expect("first write");
    storage
        .upsert_day(date(1), &[record("IB", "720ML", 9)])
        .expect("second write");

    let stored = storage.fetch_day(date(1)).expect("fetch");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].brand, "IB");
    assert_eq!(stored[0].closing_stock, dec!(9));
    assert_eq!(stored[1].closing_stock, dec!(4));

    let path = storage.day_path(date(1));
    assert!(path.ends_with("days/inventory_2024-06-01.json"));
    assert!(!path.with_extension("json.tmp").exists());
    assert!(storage.fetch_day(date(2)).expect("empty day").is_empty());
    assert_eq!(storage.recorded_dates().expect("dates"), vec![date(1)]);
}

#[test]
fn json_storage_reports_corrupt_day_as_unavailable() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonStockStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    fs::write(storage.day_path(date(3)), "{ not json").expect("write junk");

    let err = storage.fetch_day(date(3)).expect_err("corrupt file");
    assert!(matches!(err, CoreError::StorageUnavailable(_)));

    let catalog = Catalog::from_grid(["IB"], ["720ML"]);
    let loaded = LedgerEngine::load_or_blank(&storage, date(3), &catalog).expect("fallback");
    assert_eq!(loaded.origin, LedgerOrigin::Fallback);
}

#[test]
fn ledger_engine_carries_forward_through_files() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonStockStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    let catalog = Catalog::from_grid(["A"], ["720ML", "360ML"]);
    let key = StockKey::new("A", "720ML");

    let mut first = LedgerEngine::initialize(date(1), &catalog);
    LedgerEngine::update_field(&mut first, &key, StockField::OpeningBalance, "10").unwrap();
    LedgerEngine::update_field(&mut first, &key, StockField::Purchase, "5").unwrap();
    LedgerEngine::update_field(&mut first, &key, StockField::ClosingStock, "3").unwrap();
    LedgerEngine::save(&storage, &first).expect("save day one");

    let reopened = JsonStockStorage::new(StoragePaths::under(dir.path())).expect("reopen");
    let again = LedgerEngine::load_for_date(&reopened, date(1), &catalog).expect("reload");
    assert_eq!(again.record(&key), first.record(&key));

    let second = LedgerEngine::load_for_date(&reopened, date(2), &catalog).expect("day two");
    let carried = second.record(&key).unwrap();
    assert_eq!(carried.opening_balance, dec!(3));
    assert_eq!(carried.sales, dec!(3));
}

#[test]
fn json_storage_saves_and_loads_book() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonStockStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    assert!(storage.load_book().expect("no book").is_none());

    let book = ShopBook::with_defaults("Corner Store");
    storage.save_book(&book).expect("save book");
    let loaded = storage.load_book().expect("load").expect("book present");
    assert_eq!(loaded, book);
    assert!(storage.book_path().ends_with("shop/shop.json"));
    assert!(storage.list_backups().expect("list").is_empty());

    storage.save_book(&book).expect("second save");
    assert_eq!(storage.list_backups().expect("list").len(), 1);
}

#[test]
fn json_storage_creates_and_restores_backups() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonStockStorage::new(StoragePaths::under(dir.path())).expect("create storage");

    let original = ShopBook::with_defaults("Backups");
    storage.save_book(&original).expect("save");
    let info = storage
        .backup_book(&original, Some("Before price change"))
        .expect("backup");
    assert!(info.id.starts_with("shop_"));
    assert!(info.id.ends_with("_before-price-change.json"));
    assert!(info.created_at.is_some());

    let mut changed = original.clone();
    changed.name = "Renamed".into();
    storage.save_book(&changed).expect("save changed");

    let backups = storage.list_backups().expect("list");
    assert!(backups.iter().any(|entry| entry.id == info.id));

    let restored = storage.restore_backup(&info).expect("restore");
    assert_eq!(restored.name, "Backups");
    let current = storage.load_book().expect("load").expect("book");
    assert_eq!(current.name, "Backups");
}

#[test]
fn json_storage_prunes_old_backups() {
    let dir = tempdir().expect("tempdir");
    let storage =
        JsonStockStorage::with_retention(StoragePaths::under(dir.path()), 2).expect("storage");
    let book = ShopBook::new("Prune");
    for note in ["one", "two", "three", "four"] {
        storage.backup_book(&book, Some(note)).expect("backup");
    }
    assert_eq!(storage.list_backups().expect("list").len(), 2);
}
