use stock_config::ConfigError;
use stock_core::CoreError;
use thiserror::Error;

/// Unified error type for the core, storage and configuration layers.
#[derive(Error, Debug)]
pub enum StockError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] StockError),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CoreError> for StockError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StorageUnavailable(message) => StockError::StorageUnavailable(message),
            CoreError::Persistence(message) | CoreError::Serde(message) => {
                StockError::Persistence(message)
            }
            CoreError::Io(err) => StockError::Persistence(err.to_string()),
            CoreError::RecordNotFound(key) => {
                StockError::NotFound(format!("no stock entry for {key}"))
            }
            CoreError::BrandNotFound(name) => StockError::NotFound(format!("brand `{name}`")),
            CoreError::VendorNotFound(name) => StockError::NotFound(format!("vendor `{name}`")),
            CoreError::OrderNotFound(number) => {
                StockError::NotFound(format!("purchase order `{number}`"))
            }
            CoreError::InvalidField(message)
            | CoreError::InvalidOperation(message)
            | CoreError::Validation(message) => StockError::InvalidInput(message),
        }
    }
}

impl From<ConfigError> for StockError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => StockError::Persistence(io.to_string()),
            ConfigError::Serde(message) => StockError::Config(message),
            other @ (ConfigError::InvalidValue { .. } | ConfigError::UnknownKey(_)) => {
                StockError::InvalidInput(other.to_string())
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(StockError::from(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(StockError::from(err))
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}
