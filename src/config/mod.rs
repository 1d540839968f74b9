//! Configuration management for Nutrisage
//!
//! Loads the TOML configuration file, applies `NUTRISAGE_*` environment
//! overrides and validates the result before anything is constructed from it.

use crate::error::{NutriError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

/// Prefix for environment variable overrides
const ENV_PREFIX: &str = "NUTRISAGE_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub corpus: CorpusConfig,
    pub embedding: EmbeddingConfig,
    pub indexing: IndexingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Document corpus location and matching rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Root directory of the corpus
    pub path: PathBuf,
    /// File extension (without the dot) of documents to load
    pub extension: String,
    /// Descend into subdirectories
    pub recursive: bool,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub batch_size: usize,
}

/// Similarity search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Brute-force cosine similarity over every entry
    Exact,
    /// Approximate nearest neighbours with HNSW
    Hnsw,
}

/// When a built index may be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    /// Rebuild the index for every question
    None,
    /// Reuse the index until the corpus fingerprint changes
    Fingerprint,
}

/// Indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub backend: IndexBackend,
    pub cache: CachePolicy,
    /// Background refresh period (e.g. "30s"); no refresher when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<String>,
    pub hnsw_ef_construction: usize,
    pub hnsw_m: usize,
    pub hnsw_ef_search: usize,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub base_url: String,
    pub api_key_env: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: String,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl LlmConfig {
    /// Read the API credential from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            Ok(_) => Err(NutriError::Config(format!(
                "Environment variable {} is empty",
                self.api_key_env
            ))),
            Err(_) => Err(NutriError::Config(format!(
                "Environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }

    /// Bound on a single generative model call
    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(&self.timeout).ok_or_else(|| NutriError::InvalidConfigValue {
            path: "llm.timeout".to_string(),
            message: format!("Invalid duration format: {}", self.timeout),
        })
    }
}

impl IndexingConfig {
    /// Background refresh period, if one is configured
    pub fn refresh_interval(&self) -> Result<Option<Duration>> {
        match &self.refresh_interval {
            None => Ok(None),
            Some(raw) => parse_duration(raw)
                .map(Some)
                .ok_or_else(|| NutriError::InvalidConfigValue {
                    path: "indexing.refresh_interval".to_string(),
                    message: format!("Invalid duration format: {}", raw),
                }),
        }
    }
}

/// Parse durations like "500ms", "30s", "5m", "1h" or a bare number of seconds
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let value: u64 = digits.parse().ok()?;

    match unit {
        "" | "s" => Some(Duration::from_secs(value)),
        "ms" => Some(Duration::from_millis(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs),
        "h" => value.checked_mul(3600).map(Duration::from_secs),
        _ => None,
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NutriError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| NutriError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| NutriError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: NUTRISAGE_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// Apply overrides from an arbitrary set of `(name, value)` pairs
    pub fn apply_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "LLM__MODEL" => {
                self.llm.model = value.to_string();
            }
            "LLM__BASE_URL" => {
                self.llm.base_url = value.to_string();
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "RETRIEVAL__TOP_K" => {
                self.retrieval.top_k =
                    value.parse().map_err(|_| NutriError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as integer", value),
                    })?;
            }
            "CORPUS__PATH" => {
                self.corpus.path = PathBuf::from(value);
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| NutriError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("nutrisage").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            corpus: CorpusConfig {
                path: PathBuf::from("data"),
                extension: "txt".to_string(),
                recursive: true,
            },
            embedding: EmbeddingConfig {
                model: "all-MiniLM-L6-v2".to_string(),
                batch_size: 32,
            },
            indexing: IndexingConfig {
                backend: IndexBackend::Exact,
                cache: CachePolicy::Fingerprint,
                refresh_interval: None,
                hnsw_ef_construction: 200,
                hnsw_m: 16,
                hnsw_ef_search: 64,
            },
            llm: LlmConfig {
                provider: "groq".to_string(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
                api_key_env: "GROQ_API_KEY".to_string(),
                model: "llama-3.3-70b-versatile".to_string(),
                temperature: 0.7,
                timeout: "30s".to_string(),
            },
            retrieval: RetrievalConfig { top_k: 4 },
        }
    }
}
