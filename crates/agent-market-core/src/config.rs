use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{MarketError, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Settings for the catalog service, from `agent-market.toml` plus env overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub bind: String,
    /// JSON file backing the catalog. `None` keeps it in memory.
    pub data_file: Option<PathBuf>,
    /// TOML catalog used for seeding. `None` uses the bundled one.
    pub seed_file: Option<PathBuf>,
    /// Seed at startup when the store is empty.
    pub seed_on_start: bool,
    pub payment: PaymentConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Without a key the checkout endpoint reports the service unavailable.
    pub secret_key: Option<String>,
    pub api_base: String,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub session_url: Option<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            data_file: None,
            seed_file: None,
            seed_on_start: false,
            payment: PaymentConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            api_base: "https://api.stripe.com".to_string(),
            currency: "usd".to_string(),
            success_url: "http://localhost:3000/success".to_string(),
            cancel_url: "http://localhost:3000/".to_string(),
        }
    }
}

/// Parse config from a TOML string. Missing keys take defaults.
pub fn parse_config(toml_str: &str) -> Result<MarketConfig> {
    toml::from_str(toml_str).map_err(|e| MarketError::Config(format!("bad agent-market.toml: {e}")))
}

impl MarketConfig {
    /// Apply overrides from a variable lookup (the process env in `load`).
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        if let Some(bind) = non_empty("AGENT_MARKET_BIND") {
            self.bind = bind;
        }
        if let Some(path) = non_empty("AGENT_MARKET_DATA") {
            self.data_file = Some(PathBuf::from(path));
        }
        if let Some(key) = non_empty("STRIPE_SECRET_KEY") {
            self.payment.secret_key = Some(key);
        }
        if let Some(url) = non_empty("AGENT_MARKET_IDENTITY_URL") {
            self.identity.session_url = Some(url);
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|k| std::env::var(k).ok());
    }

    /// Load from `path` if given (it must exist), else from the user config
    /// dir if a file is there, else defaults. Env overrides apply last.
    #[cfg(feature = "network")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => match crate::paths::config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => MarketConfig::default(),
            },
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "reading config");
        let content = std::fs::read_to_string(path)
            .map_err(|e| MarketError::Io(format!("failed to read {}: {e}", path.display())))?;
        parse_config(&content)
    }
}
