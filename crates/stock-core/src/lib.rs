//! stock-core
//!
//! Business logic for the shop: the daily ledger engine plus catalog, price,
//! vendor, purchase, expense and reporting services.
//! Depends on stock-domain. No CLI, no terminal I/O; persistence goes through
//! the traits in [`storage`].

pub mod catalog_service;
pub mod error;
pub mod expense_service;
pub mod ledger_service;
pub mod price_service;
pub mod purchase_service;
pub mod quantity;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod vendor_service;

pub use catalog_service::*;
pub use error::{CoreError, CoreResult};
pub use expense_service::*;
pub use ledger_service::*;
pub use price_service::*;
pub use purchase_service::*;
pub use quantity::{normalize_quantity, parse_quantity, RawQuantity};
pub use storage::{BookBackupInfo, MemoryStockStore, ShopStorage, StockStore};
pub use summary_service::*;
pub use time::Clock;
pub use vendor_service::*;
