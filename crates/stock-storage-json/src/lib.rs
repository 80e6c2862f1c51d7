//! Filesystem JSON backend for daily stock sheets and the shop book.
//!
//! Layout under the data root:
//!
//! ```text
//! days/inventory_2024-06-01.json
//! shop/shop.json
//! shop/backups/shop_20240601_0930_before-restock.json
//! ```

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use stock_core::{
    storage::{merge_records, BookBackupInfo, ShopStorage, StockStore},
    CoreError, CoreResult,
};
use stock_domain::{ShopBook, StockRecord};
use tracing::{debug, info, warn};

const JSON_EXTENSION: &str = "json";
const DAY_PREFIX: &str = "inventory_";
const DAY_FORMAT: &str = "%Y-%m-%d";
const BOOK_STEM: &str = "shop";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Directories used by [`JsonStockStorage`].
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub days_root: PathBuf,
    pub shop_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// The standard layout beneath `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let shop_root = root.join("shop");
        Self {
            days_root: root.join("days"),
            backup_root: shop_root.join("backups"),
            shop_root,
        }
    }
}

/// Stores one JSON array of records per day and a single shop-book document
/// with rolling backups.
#[derive(Debug, Clone)]
pub struct JsonStockStorage {
    paths: StoragePaths,
    retention: usize,
}

impl JsonStockStorage {
    pub fn new(paths: StoragePaths) -> CoreResult<Self> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> CoreResult<Self> {
        for dir in [&paths.days_root, &paths.shop_root, &paths.backup_root] {
            fs::create_dir_all(dir).map_err(|err| unavailable(dir, err))?;
        }
        Ok(Self {
            paths,
            retention: retention.max(1),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.paths.days_root.join(format!(
            "{DAY_PREFIX}{}.{JSON_EXTENSION}",
            date.format(DAY_FORMAT)
        ))
    }

    pub fn book_path(&self) -> PathBuf {
        self.paths
            .shop_root
            .join(format!("{BOOK_STEM}.{JSON_EXTENSION}"))
    }

    fn backup_existing_book(&self, path: &Path) -> CoreResult<()> {
        if !path.exists() {
            return Ok(());
        }
        let backup_path = self.paths.backup_root.join(backup_file_name(None));
        fs::copy(path, &backup_path).map_err(|err| persistence(&backup_path, err))?;
        self.prune_backups()
    }

    fn prune_backups(&self) -> CoreResult<()> {
        let entries = self.list_backups()?;
        for entry in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(path = %entry.path.display(), %err, "could not prune backup");
            }
        }
        Ok(())
    }
}

impl StockStore for JsonStockStorage {
    fn fetch_day(&self, date: NaiveDate) -> CoreResult<Vec<StockRecord>> {
        let path = self.day_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut records = read_records(&path)?;
        records.sort_by(|a, b| a.brand.cmp(&b.brand).then_with(|| a.size.cmp(&b.size)));
        debug!(%date, records = records.len(), "read stock day");
        Ok(records)
    }

    fn upsert_day(&self, date: NaiveDate, records: &[StockRecord]) -> CoreResult<()> {
        let path = self.day_path(date);
        let mut stored = if path.exists() {
            read_records(&path)?
        } else if records.is_empty() {
            return Ok(());
        } else {
            Vec::new()
        };
        merge_records(&mut stored, records);
        let data = serde_json::to_string_pretty(&stored)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        replace_file(&path, &data)?;
        info!(%date, written = records.len(), stored = stored.len(), "stock day written");
        Ok(())
    }

    fn recorded_dates(&self) -> CoreResult<Vec<NaiveDate>> {
        let entries = fs::read_dir(&self.paths.days_root)
            .map_err(|err| unavailable(&self.paths.days_root, err))?;
        let mut dates = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| unavailable(&self.paths.days_root, err))?
                .path();
            if let Some(date) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_day_file_name)
            {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }
}

impl ShopStorage for JsonStockStorage {
    fn save_book(&self, book: &ShopBook) -> CoreResult<()> {
        let path = self.book_path();
        self.backup_existing_book(&path)?;
        replace_file(&path, &serialize_book(book)?)?;
        info!(shop = %book.name, "shop book saved");
        Ok(())
    }

    fn load_book(&self) -> CoreResult<Option<ShopBook>> {
        let path = self.book_path();
        if !path.exists() {
            return Ok(None);
        }
        read_book(&path).map(Some)
    }

    fn backup_book(&self, book: &ShopBook, note: Option<&str>) -> CoreResult<BookBackupInfo> {
        let file_name = backup_file_name(note);
        let path = self.paths.backup_root.join(&file_name);
        let tmp = tmp_path(&path);
        write_file(&tmp, &serialize_book(book)?)?;
        fs::rename(&tmp, &path).map_err(|err| persistence(&path, err))?;
        self.prune_backups()?;
        info!(backup = %file_name, "shop book backed up");
        Ok(BookBackupInfo {
            created_at: parse_backup_timestamp(&file_name),
            id: file_name,
            path,
        })
    }

    fn list_backups(&self) -> CoreResult<Vec<BookBackupInfo>> {
        let dir = &self.paths.backup_root;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|err| unavailable(dir, err))? {
            let path = entry.map_err(|err| unavailable(dir, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BookBackupInfo {
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by(|a, b| {
            Reverse(a.created_at)
                .cmp(&Reverse(b.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    fn restore_backup(&self, backup: &BookBackupInfo) -> CoreResult<ShopBook> {
        if !backup.path.exists() {
            return Err(CoreError::StorageUnavailable(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let book = read_book(&backup.path)?;
        let target = self.book_path();
        fs::copy(&backup.path, &target).map_err(|err| persistence(&target, err))?;
        info!(backup = %backup.id, "shop book restored");
        Ok(book)
    }
}

fn read_records(path: &Path) -> CoreResult<Vec<StockRecord>> {
    let data = fs::read_to_string(path).map_err(|err| unavailable(path, err))?;
    serde_json::from_str(&data).map_err(|err| {
        CoreError::StorageUnavailable(format!("{} is unreadable: {err}", path.display()))
    })
}

fn read_book(path: &Path) -> CoreResult<ShopBook> {
    let data = fs::read_to_string(path).map_err(|err| unavailable(path, err))?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn serialize_book(book: &ShopBook) -> CoreResult<String> {
    serde_json::to_string_pretty(book).map_err(|err| CoreError::Serde(err.to_string()))
}

fn parse_day_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name
        .strip_prefix(DAY_PREFIX)?
        .strip_suffix(&format!(".{JSON_EXTENSION}"))?;
    NaiveDate::parse_from_str(stem, DAY_FORMAT).ok()
}

fn backup_file_name(note: Option<&str>) -> String {
    let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let mut stem = format!("{BOOK_STEM}_{timestamp}");
    if let Some(label) = sanitize_backup_note(note) {
        stem.push('_');
        stem.push_str(&label);
    }
    format!("{stem}.{JSON_EXTENSION}")
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads the `YYYYMMDD_HHMM` stamp out of a backup file name. A trailing
/// note after the stamp is allowed.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{JSON_EXTENSION}"))?;
    let segments: Vec<&str> = stem.split('_').collect();
    segments.windows(2).find_map(|pair| {
        if !is_digits(pair[0], 8) || !is_digits(pair[1], 4) {
            return None;
        }
        NaiveDateTime::parse_from_str(&format!("{}{}", pair[0], pair[1]), "%Y%m%d%H%M")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes to a sibling temp file and renames it over `path`, so readers see
/// either the old contents or the new ones.
fn replace_file(path: &Path, data: &str) -> CoreResult<()> {
    let tmp = tmp_path(path);
    write_file(&tmp, data)?;
    fs::rename(&tmp, path).map_err(|err| {
        let _ = fs::remove_file(&tmp);
        persistence(path, err)
    })
}

fn write_file(path: &Path, data: &str) -> CoreResult<()> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()
    };
    write().map_err(|err| persistence(path, err))
}

fn unavailable(path: &Path, err: io::Error) -> CoreError {
    CoreError::StorageUnavailable(format!("{}: {err}", path.display()))
}

fn persistence(path: &Path, err: io::Error) -> CoreError {
    CoreError::Persistence(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_names_carry_timestamp_and_note() {
        let stamp = parse_backup_timestamp("shop_20240601_0930_before-restock.json").unwrap();
        assert_eq!(stamp.format("%Y-%m-%d %H:%M").to_string(), "2024-06-01 09:30");
        assert!(parse_backup_timestamp("shop_latest.json").is_none());
        assert_eq!(
            sanitize_backup_note(Some("  Before Restock!! ")),
            Some("before-restock".into())
        );
        assert_eq!(sanitize_backup_note(Some("***")), None);
    }

    #[test]
    fn day_file_names_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            parse_day_file_name("inventory_2024-02-29.json"),
            Some(date)
        );
        assert_eq!(parse_day_file_name("inventory_2024-02-29.json.tmp"), None);
        assert_eq!(parse_day_file_name("notes.json"), None);
    }
}
