//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use buddy_retrieval::VectorSearchClient;

/// Configuration for buddy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat provider (ollama, databricks)
    pub provider: Option<String>,
    /// Model name (ollama) or serving endpoint name (databricks)
    pub model: Option<String>,
    /// Base URL for the ollama provider
    pub base_url: Option<String>,
    /// Path to the product catalog JSONL file
    pub catalog: Option<String>,
    /// Vector search index to query
    pub index: Option<String>,
    /// Number of products requested per search
    pub top_k: Option<usize>,
    /// Databricks credentials (alternative to environment variables)
    #[serde(default)]
    pub databricks: DatabricksConfig,
}

/// Databricks workspace credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabricksConfig {
    pub host: Option<String>,
    pub token: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shopbuddy")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for SHOPBUDDY_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("SHOPBUDDY_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        let dir = path.parent().unwrap();
        fs::create_dir_all(dir)?;

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            provider: Some("ollama".to_string()),
            model: Some("llama3.1".to_string()),
            base_url: None,
            catalog: Some("products.jsonl".to_string()),
            index: Some(VectorSearchClient::DEFAULT_INDEX.to_string()),
            top_k: Some(5),
            databricks: DatabricksConfig::default(),
        };

        default_config.save()?;
        Ok(path)
    }

    /// Databricks workspace host, checking config then env
    pub fn databricks_host(&self) -> Option<String> {
        self.databricks
            .host
            .clone()
            .or_else(|| std::env::var("DATABRICKS_HOST").ok())
    }

    /// Databricks access token, checking config then env
    pub fn databricks_token(&self) -> Option<String> {
        self.databricks
            .token
            .clone()
            .or_else(|| std::env::var("DATABRICKS_TOKEN").ok())
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# shopbuddy configuration file
# Place at ~/.config/shopbuddy/config.toml (Linux/Mac) or %APPDATA%\shopbuddy\config.toml (Windows)

# Chat provider (ollama, databricks)
provider = "ollama"

# Model name (ollama) or serving endpoint name (databricks)
model = "llama3.1"

# Base URL for the ollama provider (optional)
# base_url = "http://localhost:11434/v1"

# Path to the product catalog JSONL file
catalog = "products.jsonl"

# Vector search index to query
index = "main.default.best_buy_products_index"

# Number of products requested per search
top_k = 5

# Databricks workspace credentials (optional - can also use the
# DATABRICKS_HOST and DATABRICKS_TOKEN environment variables)
[databricks]
# host = "https://your-workspace.cloud.databricks.com"
# token = "dapi..."
"#
}
