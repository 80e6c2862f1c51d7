use stock_domain::{CatalogError, DateWindowError, StockFieldError, StockKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stock record not found: {0}")]
    RecordNotFound(StockKey),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("Brand not found: {0}")]
    BrandNotFound(String),
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),
    #[error("Purchase order not found: {0}")]
    OrderNotFound(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<StockFieldError> for CoreError {
    fn from(err: StockFieldError) -> Self {
        CoreError::InvalidField(err.to_string())
    }
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

impl From<DateWindowError> for CoreError {
    fn from(err: DateWindowError) -> Self {
        CoreError::Validation(err.to_string())
    }
}
