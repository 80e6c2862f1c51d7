use stock_core::{BookBackupInfo, ShopStorage};
use stock_storage_json::JsonStockStorage;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::config::ConfigKey;

const CONFIG_USAGE: &str = "config [show|set <key> <value>|backup [note]|backups|restore <name>]";
const BACKUP_USAGE: &str = "backup [create [note]|list|restore <n|name>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "config",
            "View and manage preferences",
            CONFIG_USAGE,
            cmd_config,
        ),
        CommandEntry::new(
            "backup",
            "Back up or restore the shop book",
            BACKUP_USAGE,
            cmd_backup,
        ),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            output::section("Configuration");
            for key in ConfigKey::ALL {
                let value = match key {
                    ConfigKey::DataRoot => context.data_root.display().to_string(),
                    other => context.config.get(other),
                };
                output::info(format!("  {:<24} {}", key.name(), value));
            }
            output::hint(format!(
                "Stored at {}",
                context.config_manager.config_path().display()
            ));
            Ok(())
        }
        ["set", key, value @ ..] if !value.is_empty() => {
            set_value(context, key, &value.join(" "))
        }
        ["backup", note @ ..] => {
            let note = (!note.is_empty()).then(|| note.join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            output::success(format!("Configuration backed up as {name}."));
            Ok(())
        }
        ["backups"] => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                output::info("No configuration backups.");
            }
            for name in backups {
                output::info(format!("  {name}"));
            }
            Ok(())
        }
        ["restore", name] => {
            let restored = context.config_manager.restore(name)?;
            context.config = restored;
            context.persist_config()?;
            output::set_color_enabled(context.config.ui_color_enabled && context.is_interactive());
            output::success(format!("Configuration restored from {name}."));
            output::hint("Storage location changes apply on next start.");
            Ok(())
        }
        _ => Err(CommandError::usage(CONFIG_USAGE)),
    }
}

fn set_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key: ConfigKey = key.parse()?;
    let mut config = context.config.clone();
    config.set(key, value)?;
    context.config = config;
    context.persist_config()?;

    match key {
        ConfigKey::UiColorEnabled => {
            output::set_color_enabled(context.config.ui_color_enabled && context.is_interactive())
        }
        ConfigKey::BackupRetention => {
            context.storage = JsonStockStorage::with_retention(
                context.storage.paths().clone(),
                context.config.backup_retention,
            )?;
        }
        ConfigKey::ShopName => {
            let mut book = context.book.clone();
            book.name = context.config.shop_name.clone();
            book.touch();
            context.commit_book(book)?;
        }
        ConfigKey::DataRoot => output::hint("The new data location is used from the next start."),
        ConfigKey::DefaultBrands | ConfigKey::DefaultSizes => {
            output::hint(
                "Defaults only seed a new shop book; use `brand` and `size` to edit this one.",
            )
        }
        _ => {}
    }
    output::success(format!("{} = {}", key, context.config.get(key)));
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => create_backup(context, &[]),
        ["create", note @ ..] => create_backup(context, note),
        ["list"] => {
            let backups = context.storage.list_backups()?;
            if backups.is_empty() {
                output::info("No shop book backups.");
                return Ok(());
            }
            output::section("Shop book backups");
            for (index, backup) in backups.iter().enumerate() {
                let when = backup
                    .created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "unknown time".into());
                output::info(format!("  {:>2}. {} ({when})", index + 1, backup.id));
            }
            Ok(())
        }
        ["restore", target] => {
            let backup = find_backup(context.storage.list_backups()?, target)?;
            let book = context.storage.restore_backup(&backup)?;
            context.commit_book(book)?;
            context.realign_day()?;
            output::success(format!("Shop book restored from {}.", backup.id));
            Ok(())
        }
        _ => Err(CommandError::usage(BACKUP_USAGE)),
    }
}

fn create_backup(context: &ShellContext, note: &[&str]) -> CommandResult {
    let note = (!note.is_empty()).then(|| note.join(" "));
    let info = context.storage.backup_book(&context.book, note.as_deref())?;
    output::success(format!("Shop book backed up as {}.", info.id));
    Ok(())
}

/// Finds a backup by its number in `backup list` or by file name.
fn find_backup(
    backups: Vec<BookBackupInfo>,
    target: &str,
) -> Result<BookBackupInfo, CommandError> {
    let by_position = target
        .parse::<usize>()
        .ok()
        .and_then(|position| backups.get(position.wrapping_sub(1)).cloned());
    by_position
        .or_else(|| backups.into_iter().find(|backup| backup.id == target))
        .ok_or_else(|| CommandError::Message(format!("No shop book backup `{target}`.")))
}
