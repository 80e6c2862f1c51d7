//! stock-domain
//!
//! Pure domain models for the shop: catalog, daily stock records, prices,
//! vendors, purchase orders and expenses. No I/O, no CLI, no storage.

pub mod book;
pub mod catalog;
pub mod common;
pub mod expense;
pub mod pricing;
pub mod purchase;
pub mod stock;
pub mod vendor;
pub mod window;

pub use book::*;
pub use catalog::*;
pub use common::*;
pub use expense::*;
pub use pricing::*;
pub use purchase::*;
pub use stock::*;
pub use vendor::*;
pub use window::*;
