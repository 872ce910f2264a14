//! # Cart Configuration
//!
//! ## Configuration Sources (priority order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Loading                                │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     PANIERR_STORAGE_KEY, PANIERR_LOCALE, PANIERR_CURRENCY,              │
//! │     PANIERR_AUTO_SAVE, PANIERR_AUTO_LOAD                                │
//! │                            │                                            │
//! │                            ▼                                            │
//! │  2. Config File (panierr.toml)                                          │
//! │     Located in the platform config dir:                                 │
//! │     - Linux: ~/.config/panierr/panierr.toml                             │
//! │     - macOS: ~/Library/Application Support/com.panierr.panierr/         │
//! │     - Windows: %APPDATA%\panierr\panierr\config\                        │
//! │                            │                                            │
//! │                            ▼                                            │
//! │  3. Defaults (lowest priority)                                          │
//! │     storageKey = "panierrCartItems", autoSave/autoLoad = true,          │
//! │     no discounts, USD currency, en-US locale                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! storageKey = "shopCart"
//! locale = "de-DE"
//!
//! [currencyFormat]
//! currency = "EUR"
//!
//! [[discounts]]
//! code = "SAVE10"
//! type = "percentage"
//! amount = 10
//! ```

use std::path::PathBuf;

use panierr_core::{
    validation, CurrencyFormat, Discount, PriceFormatter, DEFAULT_LOCALE, DEFAULT_STORAGE_KEY,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// Engine configuration. The storage adapter is injected separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanierrConfig {
    /// Key the snapshot is stored under.
    pub storage_key: String,

    /// Persist after every mutating operation.
    pub auto_save: bool,

    /// Read the stored snapshot on construction.
    pub auto_load: bool,

    /// BCP 47 locale tag for price rendering.
    pub locale: String,

    /// How prices are rendered.
    pub currency_format: CurrencyFormat,

    /// Catalog of codes shoppers may apply.
    pub discounts: Vec<Discount>,
}

impl Default for PanierrConfig {
    fn default() -> Self {
        PanierrConfig {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            auto_save: true,
            auto_load: true,
            locale: DEFAULT_LOCALE.to_string(),
            currency_format: CurrencyFormat::default(),
            discounts: Vec::new(),
        }
    }
}

impl PanierrConfig {
    // =========================================================================
    // Builders
    // =========================================================================

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn with_auto_load(mut self, auto_load: bool) -> Self {
        self.auto_load = auto_load;
        self
    }

    pub fn with_discounts(mut self, discounts: Vec<Discount>) -> Self {
        self.discounts = discounts;
        self
    }

    pub fn with_currency_format(mut self, format: CurrencyFormat) -> Self {
        self.currency_format = format;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    // =========================================================================
    // Loading & Saving
    // =========================================================================

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (panierr.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// ## Rules
    /// - Storage key is not empty
    /// - Currency is a three-letter code
    /// - Discount codes are unique, amounts finite and non-negative,
    ///   percentages at most 100
    pub fn validate(&self) -> ConfigResult<()> {
        validation::validate_storage_key(&self.storage_key)?;
        validation::validate_currency_code(&self.currency_format.currency)?;
        validation::validate_catalog(&self.discounts)?;
        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("PANIERR_STORAGE_KEY") {
            debug!(storage_key = %key, "Overriding storage key from environment");
            self.storage_key = key;
        }

        if let Some(locale) = var("PANIERR_LOCALE") {
            self.locale = locale;
        }

        if let Some(currency) = var("PANIERR_CURRENCY") {
            debug!(currency = %currency, "Overriding currency from environment");
            self.currency_format.currency = currency.to_ascii_uppercase();
        }

        if let Some(value) = var("PANIERR_AUTO_SAVE") {
            match parse_flag(&value) {
                Some(flag) => self.auto_save = flag,
                None => warn!(value = %value, "Ignoring PANIERR_AUTO_SAVE"),
            }
        }

        if let Some(value) = var("PANIERR_AUTO_LOAD") {
            match parse_flag(&value) {
                Some(flag) => self.auto_load = flag,
                None => warn!(value = %value, "Ignoring PANIERR_AUTO_LOAD"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "panierr", "panierr")
            .map(|dirs| dirs.config_dir().join("panierr.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Catalog entry with exactly this code.
    pub fn find_discount(&self, code: &str) -> Option<&Discount> {
        self.discounts.iter().find(|d| d.code == code)
    }

    /// Formatter for the configured locale and currency format.
    pub fn price_formatter(&self) -> PriceFormatter {
        PriceFormatter::new(&self.locale, &self.currency_format)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
