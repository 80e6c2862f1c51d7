#![doc(test(attr(deny(warnings))))]

//! Stock Ledger keeps the daily stock sheet of a liquor shop: opening balance,
//! purchases and closing stock per brand and bottle size, with sales derived
//! from the three. This crate wires the workspace libraries into a shell.

pub mod cli;
pub mod config;
pub mod errors;
pub mod utils;

pub use stock_core as core;
pub use stock_domain as domain;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Stock Ledger tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
