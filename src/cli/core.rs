//! Command dispatch, error reporting and the state helpers commands share.

use std::{io, path::Path, sync::Arc};

use chrono::{Days, NaiveDate};
use dialoguer::{theme::ColorfulTheme, Confirm};
use rust_decimal::Decimal;
use strsim::levenshtein;
use thiserror::Error;
use tracing::warn;

use stock_core::{Clock, CoreError, LedgerEngine, LedgerOrigin, ShopStorage};
use stock_domain::{Catalog, DayLedger, ShopBook, StockRecord};
use stock_storage_json::{JsonStockStorage, StoragePaths};

use crate::{
    config::{Config, ConfigError, ConfigManager},
    errors::{CliError, StockError},
    utils::paths::PathResolver,
};

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};
use super::system_clock::SystemClock;
pub use super::shell_context::{CliMode, OpenDay, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] StockError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(StockError::from(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Core(StockError::from(err))
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = PathResolver::base_dir();
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        Self::with_parts(mode, config_manager, config, &base, Arc::new(SystemClock))
    }

    /// Builds a context over explicit directories and clock.
    pub fn with_parts(
        mode: CliMode,
        config_manager: ConfigManager,
        config: Config,
        base: &Path,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CliError> {
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let data_root = PathResolver::data_root(&config, base);
        let storage = JsonStockStorage::with_retention(
            StoragePaths::under(&data_root),
            config.backup_retention,
        )?;
        let book = match storage.load_book()? {
            Some(book) => book,
            None => {
                let book = ShopBook::seeded(
                    config.shop_name.clone(),
                    config.default_brands.iter().cloned(),
                    config.default_sizes.iter().cloned(),
                );
                storage.save_book(&book)?;
                book
            }
        };

        let today = clock.today();
        let catalog = book.catalog();
        let loaded = LedgerEngine::load_or_blank(&storage, today, &catalog)?;

        let context = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            storage,
            clock,
            config_manager,
            config,
            data_root,
            book,
            day: OpenDay {
                ledger: loaded.ledger,
                origin: loaded.origin,
                dirty: false,
            },
            last_command: None,
            running: true,
        };
        if context.day.origin == LedgerOrigin::Fallback {
            output::warning("Stock data could not be read; showing a blank sheet.");
        }
        Ok(context)
    }

    pub(crate) fn is_interactive(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub(crate) fn prompt(&self) -> String {
        let marker = if self.day.dirty { "*" } else { "" };
        format!("stock [{}{}]> ", self.day.ledger.date, marker)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{name}`?"));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        let prompt = if self.day.dirty {
            "Discard unsaved changes and exit?"
        } else {
            "Exit shell?"
        };
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|err| CliError::Command(err.to_string()))
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(StockError::StorageUnavailable(message)) => {
                output::error(format!("Storage unavailable: {message}"));
                output::hint("Nothing was written. Check the data directory and retry.");
            }
            other => output::error(other),
        }
        Ok(())
    }

    pub(crate) fn catalog(&self) -> Catalog {
        self.book.catalog()
    }

    /// Opens `date`, replacing the current sheet.
    pub(crate) fn open_day(&mut self, date: NaiveDate) -> CommandResult {
        if self.day.dirty {
            output::warning(format!(
                "Unsaved changes to {} were discarded.",
                self.day.ledger.date
            ));
        }
        let loaded = LedgerEngine::load_or_blank(&self.storage, date, &self.catalog())?;
        match loaded.origin {
            LedgerOrigin::Saved => output::info(format!("Loaded saved sheet for {date}.")),
            LedgerOrigin::Partial => output::info(format!(
                "Loaded {} saved entries for {date}; the rest start at zero.",
                loaded.saved
            )),
            LedgerOrigin::CarriedForward => output::info(format!(
                "New sheet for {date}: {} opening balances carried forward from the previous \
                 day.",
                loaded.carried
            )),
            LedgerOrigin::Blank => output::info(format!("New blank sheet for {date}.")),
            LedgerOrigin::Fallback => output::warning(format!(
                "Stock data for {date} could not be read; showing a blank sheet that cannot \
                 be saved."
            )),
        }
        self.day = OpenDay {
            ledger: loaded.ledger,
            origin: loaded.origin,
            dirty: false,
        };
        Ok(())
    }

    /// Writes the open sheet.
    pub(crate) fn save_day(&mut self) -> CommandResult {
        LedgerEngine::save_loaded(&self.storage, &self.day.ledger, self.day.origin)?;
        self.day.origin = LedgerOrigin::Saved;
        self.day.dirty = false;
        Ok(())
    }

    /// Saves `book` and makes it current. The shell keeps its previous book
    /// when the write fails.
    pub(crate) fn commit_book(&mut self, book: ShopBook) -> CommandResult {
        self.storage.save_book(&book)?;
        self.book = book;
        Ok(())
    }

    /// Brings the open sheet in line with a changed catalog. Clean sheets are
    /// reloaded; edited ones keep their rows and gain zero rows for new
    /// entries.
    pub(crate) fn realign_day(&mut self) -> CommandResult {
        let catalog = self.catalog();
        if !self.day.dirty {
            let date = self.day.ledger.date;
            let loaded = LedgerEngine::load_or_blank(&self.storage, date, &catalog)?;
            self.day.ledger = loaded.ledger;
            self.day.origin = loaded.origin;
            return Ok(());
        }
        let records = catalog
            .iter()
            .map(|key| {
                self.day
                    .ledger
                    .record(key)
                    .cloned()
                    .unwrap_or_else(|| StockRecord::zeroed(key))
            })
            .collect();
        self.day.ledger = DayLedger::new(self.day.ledger.date, records);
        Ok(())
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Accepts `today`, `yesterday`, `+N`/`-N` days from the open sheet, or
    /// `YYYY-MM-DD`.
    pub(crate) fn parse_date(&self, raw: &str) -> Result<NaiveDate, CommandError> {
        let value = raw.trim().to_ascii_lowercase();
        let current = self.day.ledger.date;
        let shifted = |days: &str, forward: bool| {
            let days: u64 = days.parse().ok()?;
            if forward {
                current.checked_add_days(Days::new(days))
            } else {
                current.checked_sub_days(Days::new(days))
            }
        };
        let parsed = match value.as_str() {
            "today" => Some(self.today()),
            "yesterday" => self.today().pred_opt(),
            other => {
                if let Some(days) = other.strip_prefix('+') {
                    shifted(days, true)
                } else if let Some(days) = other.strip_prefix('-') {
                    shifted(days, false)
                } else {
                    NaiveDate::parse_from_str(other, "%Y-%m-%d").ok()
                }
            }
        };
        parsed.ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "`{raw}` is not a date; use YYYY-MM-DD, today, yesterday, +N or -N"
            ))
        })
    }

    pub(crate) fn money(&self, amount: Decimal) -> String {
        format!("{} {:.2}", self.config.currency, amount)
    }
}

/// Formats a quantity without trailing zeros.
pub(crate) fn qty(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Parses a user-entered amount strictly; unlike stock cells, money fields
/// reject junk.
pub(crate) fn parse_amount(raw: &str, what: &str) -> Result<Decimal, CommandError> {
    raw.trim().parse::<Decimal>().map_err(|_| {
        warn!(input = raw, "rejected amount");
        CommandError::InvalidArguments(format!("{what} must be a number, got `{raw}`"))
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{DateTime, NaiveDate, Utc};
    use stock_core::Clock;
    use tempfile::TempDir;

    use super::*;

    pub struct FixedClock(pub NaiveDate);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
                .and_hms_opt(12, 0, 0)
                .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
                .unwrap()
        }
    }

    /// A script-mode context over a fresh directory, opened on `today`.
    pub fn context_on(today: NaiveDate) -> (TempDir, ShellContext) {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let context = ShellContext::with_parts(
            CliMode::Script,
            manager,
            Config::default(),
            dir.path(),
            Arc::new(FixedClock(today)),
        )
        .unwrap();
        (dir, context)
    }

    pub fn run(context: &mut ShellContext, line: &str) -> CommandResult {
        let tokens = crate::cli::shell::parse_command_line(line)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        match context.dispatch(&tokens[0].to_lowercase(), &tokens[0], &args)? {
            LoopControl::Continue | LoopControl::Exit => Ok(()),
        }
    }
}
