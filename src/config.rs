use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,

    #[serde(default = "default_marker_base")]
    pub marker_base: f64,

    #[serde(default = "default_marker_scale")]
    pub marker_scale: f64,
}

// Marker size in degrees: base + hoehe * scale
fn default_marker_base() -> f64 {
    0.0012
}

fn default_marker_scale() -> f64 {
    0.00011
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            marker_base: default_marker_base(),
            marker_scale: default_marker_scale(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        // Environment takes precedence over the file, so the same build
        // works against .env-style deployments.
        if let Ok(url) = std::env::var("SUPABASE_URL") {
            if !url.is_empty() {
                config.supabase_url = Some(url);
            }
        }
        if let Ok(key) = std::env::var("SUPABASE_KEY") {
            if !key.is_empty() {
                config.supabase_key = Some(key);
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gipfelbuch")
            .join("config.toml")
    }

    /// Credentials for the hosted store, or a config error telling the
    /// user where to put them.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.supabase_url.as_deref(), self.supabase_key.as_deref()) {
            (Some(url), Some(key)) => Ok((url, key)),
            _ => Err(AppError::Config(format!(
                "supabase_url and supabase_key must be set in {} or via SUPABASE_URL/SUPABASE_KEY",
                Self::config_path().display()
            ))),
        }
    }
}
