use stock_config::{Config, ConfigError, ConfigKey, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_seeds_full_catalog() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert!(!cfg.locale.is_empty());
    assert!(cfg.restrict_opening_edits);
    assert_eq!(cfg.default_brands.len(), 12);
    assert_eq!(cfg.default_sizes, vec!["720ML", "360ML", "180ML", "90ML"]);
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));
    assert_eq!(manager.load().expect("defaults"), Config::default());

    let mut cfg = Config::default();
    cfg.currency = "USD".to_string();
    cfg.restrict_opening_edits = false;

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.currency, "USD");
    assert!(!loaded.restrict_opening_edits);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn partial_config_files_fill_in_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "locale": "en-GB", "currency": "GBP" }"#).expect("write");
    let manager = ConfigManager::new(path, dir.path().join("backups"));

    let loaded = manager.load().expect("load");
    assert_eq!(loaded.currency, "GBP");
    assert!(loaded.ui_color_enabled);
    assert_eq!(loaded.backup_retention, 5);
    assert_eq!(loaded.default_sizes.len(), 4);
}

#[test]
fn config_manager_backs_up_and_restores() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert!(manager.config_path().ends_with("config/config.json"));

    let mut cfg = Config::default();
    cfg.shop_name = "Station Road".into();
    let name = manager.backup(&cfg, Some("Before move")).expect("backup");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_before-move.json"));
    assert_eq!(manager.list_backups().expect("list"), vec![name.clone()]);

    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.shop_name, "Station Road");
    assert!(matches!(
        manager.restore("config_missing.json"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn settings_are_set_by_name() {
    let mut cfg = Config::default();
    let key: ConfigKey = "restrict-opening-edits".parse().expect("key");
    cfg.set(key, "off").expect("set flag");
    assert!(!cfg.restrict_opening_edits);

    cfg.set(ConfigKey::DefaultSizes, "750ML, 375ML,,").expect("sizes");
    assert_eq!(cfg.default_sizes, vec!["750ML", "375ML"]);
    assert_eq!(cfg.get(ConfigKey::DefaultSizes), "750ML, 375ML");

    assert!(matches!(
        cfg.set(ConfigKey::BackupRetention, "0"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        "colour".parse::<ConfigKey>(),
        Err(ConfigError::UnknownKey(_))
    ));
}
