//! Locations of the configuration and data directories.

use std::{
    env,
    path::{Path, PathBuf},
};

use stock_config::Config;

/// Overrides the base directory for configuration and data.
pub const HOME_ENV: &str = "STOCK_LEDGER_HOME";
const DEFAULT_DIR_NAME: &str = ".stock_ledger";

pub struct PathResolver;

impl PathResolver {
    /// `$STOCK_LEDGER_HOME` if set, otherwise `~/.stock_ledger`.
    pub fn base_dir() -> PathBuf {
        match env::var_os(HOME_ENV) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_DIR_NAME),
        }
    }

    /// Day sheets and the shop book live under the configured `data_root`,
    /// falling back to the base directory.
    pub fn data_root(config: &Config, base: &Path) -> PathBuf {
        config
            .data_root
            .clone()
            .unwrap_or_else(|| base.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_root_prefers_config() {
        let base = PathBuf::from("/tmp/base");
        let mut config = Config::default();
        assert_eq!(PathResolver::data_root(&config, &base), base);
        config.data_root = Some(PathBuf::from("/srv/shop"));
        assert_eq!(
            PathResolver::data_root(&config, &base),
            PathBuf::from("/srv/shop")
        );
    }
}
