//! Shared runtime state for CLI interactions and command execution.

use std::{path::PathBuf, sync::Arc};

use dialoguer::theme::ColorfulTheme;
use stock_core::{Clock, LedgerOrigin};
use stock_domain::{DayLedger, ShopBook};
use stock_storage_json::JsonStockStorage;

use crate::config::{Config, ConfigManager};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// The day sheet currently open in the shell.
#[derive(Debug, Clone)]
pub struct OpenDay {
    pub ledger: DayLedger,
    pub origin: LedgerOrigin,
    /// Edited since it was loaded or last saved.
    pub dirty: bool,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub storage: JsonStockStorage,
    pub clock: Arc<dyn Clock>,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub data_root: PathBuf,
    pub book: ShopBook,
    pub day: OpenDay,
    pub last_command: Option<String>,
    pub running: bool,
}
