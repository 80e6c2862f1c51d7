//! stock-config
//!
//! User preferences for the stock ledger and their persistence.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, ConfigKey};
