use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use super::currency::{self, Currency};

pub const DEFAULT_CENTRAL_BANK_URL: &str = "https://www.cbr-xml-daily.ru";
pub const DEFAULT_MARKET_URL: &str = "https://open.er-api.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CentralBankProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub central_bank: Option<CentralBankProviderConfig>,
    pub market: Option<MarketProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            central_bank: Some(CentralBankProviderConfig {
                base_url: DEFAULT_CENTRAL_BANK_URL.to_string(),
            }),
            market: Some(MarketProviderConfig {
                base_url: DEFAULT_MARKET_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn central_bank_url(&self) -> &str {
        self.central_bank
            .as_ref()
            .map_or(DEFAULT_CENTRAL_BANK_URL, |p| &p.base_url)
    }

    pub fn market_url(&self) -> &str {
        self.market
            .as_ref()
            .map_or(DEFAULT_MARKET_URL, |p| &p.base_url)
    }
}

/// Longest accepted refresh interval, one day.
pub const MAX_REFRESH_MINUTES: u64 = 24 * 60;

fn default_refresh_minutes() -> u64 {
    60
}

fn default_from() -> String {
    "USD".to_string()
}

fn default_to() -> String {
    "RUB".to_string()
}

fn default_widget_currencies() -> Vec<String> {
    ["USD", "EUR", "TRY", "AED"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
    #[serde(default = "default_widget_currencies")]
    pub widget_currencies: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            refresh_minutes: default_refresh_minutes(),
            from: default_from(),
            to: default_to(),
            widget_currencies: default_widget_currencies(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or defaults when none exists yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxcalc", "fxcalc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.refresh_minutes == 0 {
            bail!("refresh_minutes must be greater than zero");
        }
        if self.refresh_minutes > MAX_REFRESH_MINUTES {
            bail!("refresh_minutes must be at most {MAX_REFRESH_MINUTES}");
        }
        self.from_currency()?;
        self.to_currency()?;
        Ok(())
    }

    pub fn from_currency(&self) -> Result<Currency> {
        currency::find(&self.from).with_context(|| format!("Unknown currency: {}", self.from))
    }

    pub fn to_currency(&self) -> Result<Currency> {
        currency::find(&self.to).with_context(|| format!("Unknown currency: {}", self.to))
    }
}
