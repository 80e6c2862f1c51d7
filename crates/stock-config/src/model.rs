use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use stock_domain::{DEFAULT_BRANDS, DEFAULT_SIZES};

use crate::ConfigError;

const DATA_DIR_NAME: &str = ".stock_ledger";

/// User preferences for the shop ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_shop_name")]
    pub shop_name: String,
    #[serde(default = "Config::default_true")]
    pub ui_color_enabled: bool,
    /// Only allow opening-balance edits on the first day of a month.
    #[serde(default = "Config::default_true")]
    pub restrict_opening_edits: bool,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    /// Brands used to seed a new shop book.
    #[serde(default = "Config::default_brands")]
    pub default_brands: Vec<String>,
    #[serde(default = "Config::default_sizes")]
    pub default_sizes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Where day sheets and the shop book live. Defaults to `~/.stock_ledger`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-IN".into(),
            currency: "INR".into(),
            shop_name: Self::default_shop_name(),
            ui_color_enabled: true,
            restrict_opening_edits: true,
            backup_retention: Self::default_backup_retention(),
            default_brands: Self::default_brands(),
            default_sizes: Self::default_sizes(),
            data_root: None,
        }
    }
}

impl Config {
    fn default_true() -> bool {
        true
    }

    pub fn default_shop_name() -> String {
        "Liquor Store".into()
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_brands() -> Vec<String> {
        DEFAULT_BRANDS.iter().map(|brand| brand.to_string()).collect()
    }

    pub fn default_sizes() -> Vec<String> {
        DEFAULT_SIZES.iter().map(|size| size.to_string()).collect()
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_DIR_NAME)
    }

    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::Locale => self.locale.clone(),
            ConfigKey::Currency => self.currency.clone(),
            ConfigKey::ShopName => self.shop_name.clone(),
            ConfigKey::UiColorEnabled => self.ui_color_enabled.to_string(),
            ConfigKey::RestrictOpeningEdits => self.restrict_opening_edits.to_string(),
            ConfigKey::BackupRetention => self.backup_retention.to_string(),
            ConfigKey::DefaultBrands => self.default_brands.join(", "),
            ConfigKey::DefaultSizes => self.default_sizes.join(", "),
            ConfigKey::DataRoot => self.resolve_data_root().display().to_string(),
        }
    }

    /// Applies a textual value to `key`. List settings take comma-separated
    /// values.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        match key {
            ConfigKey::Locale | ConfigKey::Currency | ConfigKey::ShopName if value.is_empty() => {
                return Err(invalid("value cannot be empty"));
            }
            ConfigKey::Locale => self.locale = value.to_string(),
            ConfigKey::Currency => self.currency = value.to_ascii_uppercase(),
            ConfigKey::ShopName => self.shop_name = value.to_string(),
            ConfigKey::UiColorEnabled => {
                self.ui_color_enabled = parse_bool(value).ok_or_else(|| invalid("expected on/off"))?
            }
            ConfigKey::RestrictOpeningEdits => {
                self.restrict_opening_edits =
                    parse_bool(value).ok_or_else(|| invalid("expected on/off"))?
            }
            ConfigKey::BackupRetention => {
                let retention: usize = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number"))?;
                if retention == 0 {
                    return Err(invalid("must keep at least one backup"));
                }
                self.backup_retention = retention;
            }
            ConfigKey::DefaultBrands => {
                self.default_brands = split_list(value);
                if self.default_brands.is_empty() {
                    return Err(invalid("list cannot be empty"));
                }
            }
            ConfigKey::DefaultSizes => {
                self.default_sizes = split_list(value);
                if self.default_sizes.is_empty() {
                    return Err(invalid("list cannot be empty"));
                }
            }
            ConfigKey::DataRoot => {
                self.data_root = if value.is_empty() || value.eq_ignore_ascii_case("default") {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
        }
        Ok(())
    }
}

/// Settings addressable from the `config` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Locale,
    Currency,
    ShopName,
    UiColorEnabled,
    RestrictOpeningEdits,
    BackupRetention,
    DefaultBrands,
    DefaultSizes,
    DataRoot,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 9] = [
        ConfigKey::Locale,
        ConfigKey::Currency,
        ConfigKey::ShopName,
        ConfigKey::UiColorEnabled,
        ConfigKey::RestrictOpeningEdits,
        ConfigKey::BackupRetention,
        ConfigKey::DefaultBrands,
        ConfigKey::DefaultSizes,
        ConfigKey::DataRoot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::Locale => "locale",
            ConfigKey::Currency => "currency",
            ConfigKey::ShopName => "shop_name",
            ConfigKey::UiColorEnabled => "ui_color_enabled",
            ConfigKey::RestrictOpeningEdits => "restrict_opening_edits",
            ConfigKey::BackupRetention => "backup_retention",
            ConfigKey::DefaultBrands => "default_brands",
            ConfigKey::DefaultSizes => "default_sizes",
            ConfigKey::DataRoot => "data_root",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownKey(value.trim().to_string()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
