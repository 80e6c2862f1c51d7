//! Configuration types re-exported from `stock-config`.

pub use stock_config::{Config, ConfigError, ConfigKey, ConfigManager};
