use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    currency::Locale,
    errors::{Result, TrackerError},
    storage::DEFAULT_STORAGE_KEY,
    utils::paths::{app_data_dir, config_file_in, ensure_dir},
};

const TMP_SUFFIX: &str = "tmp";

/// Keys accepted by [`Config::set_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "currency",
    "locale",
    "storage_key",
    "autosave_interval_secs",
    "backup_retention",
    "data_dir",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub locale: String,
    pub storage_key: String,
    pub autosave_interval_secs: u64,
    pub backup_retention: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            locale: "es-ES".into(),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            autosave_interval_secs: 30,
            backup_retention: 5,
            data_dir: None,
        }
    }
}

impl Config {
    /// Updates a single field from its textual form.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "currency" => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(TrackerError::Config(format!(
                        "currency must be a three letter code, got `{value}`"
                    )));
                }
                self.currency = value.to_ascii_uppercase();
            }
            "locale" => {
                let locale = Locale::from_tag(value).ok_or_else(|| {
                    TrackerError::Config(format!(
                        "unsupported locale `{value}` (expected one of: {})",
                        Locale::SUPPORTED.join(", ")
                    ))
                })?;
                self.locale = locale.tag().to_string();
            }
            "storage_key" => {
                if value.is_empty() {
                    return Err(TrackerError::Config("storage_key cannot be empty".into()));
                }
                self.storage_key = value.to_string();
            }
            "autosave_interval_secs" => {
                self.autosave_interval_secs = parse_number(key, value)?;
            }
            "backup_retention" => {
                let retention: usize = parse_number(key, value)?;
                if retention == 0 {
                    return Err(TrackerError::Config(
                        "backup_retention must be at least 1".into(),
                    ));
                }
                self.backup_retention = retention;
            }
            "data_dir" => {
                self.data_dir = match value {
                    "" | "default" | "none" => None,
                    path => Some(PathBuf::from(path)),
                };
            }
            other => {
                return Err(TrackerError::Config(format!(
                    "unknown key `{other}` (expected one of: {})",
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Locale used for dates and month labels; unknown tags fall back to `es-ES`.
    pub fn display_locale(&self) -> Locale {
        Locale::from_tag(&self.locale).unwrap_or_default()
    }

    /// Key/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("currency", self.currency.clone()),
            ("locale", self.locale.clone()),
            ("storage_key", self.storage_key.clone()),
            (
                "autosave_interval_secs",
                self.autosave_interval_secs.to_string(),
            ),
            ("backup_retention", self.backup_retention.to_string()),
            (
                "data_dir",
                self.data_dir
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "(default)".into()),
            ),
        ]
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        TrackerError::Config(format!("{key} expects a non-negative integer, got `{value}`"))
    })
}

/// Loads and saves `config.json` inside the application data directory.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            TrackerError::Config(format!("{} is not valid: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Directory holding the snapshot: the configured override or the base dir.
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config.data_dir.clone().unwrap_or_else(|| self.base.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    tmp.set_extension(format!("json.{TMP_SUFFIX}"));
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_returns_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_key, "financeTransactions");
        assert_eq!(config.autosave_interval_secs, 30);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set_value("currency", "eur").unwrap();
        config.set_value("backup_retention", "2").unwrap();
        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency, "EUR");
        assert_eq!(loaded.backup_retention, 2);
    }

    #[test]
    fn partial_files_fill_missing_fields() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"currency":"GBP"}"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency, "GBP");
        assert_eq!(loaded.locale, "es-ES");
    }

    #[test]
    fn set_value_rejects_unknown_keys_and_bad_numbers() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_value("theme", "dark"),
            Err(TrackerError::Config(_))
        ));
        assert!(config.set_value("autosave_interval_secs", "soon").is_err());
        assert!(config.set_value("backup_retention", "0").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn locale_is_validated_and_drives_display_locale() {
        let mut config = Config::default();
        assert_eq!(config.display_locale(), Locale::EsEs);
        config.set_value("locale", "en_us").unwrap();
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.display_locale(), Locale::EnUs);
        assert!(config.set_value("locale", "xx-YY").is_err());
        assert_eq!(config.locale, "en-US");

        config.locale = "tlh".into();
        assert_eq!(config.display_locale(), Locale::EsEs);
    }

    #[test]
    fn data_dir_prefers_override() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        assert_eq!(manager.data_dir(&config), temp.path());
        config.set_value("data_dir", "/tmp/elsewhere").unwrap();
        assert_eq!(manager.data_dir(&config), PathBuf::from("/tmp/elsewhere"));
    }
}
