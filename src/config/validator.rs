use crate::config::{parse_duration, Config};
use crate::embedding::{FastEmbedProvider, HNSW_MAX_CONNECTIONS};
use crate::error::{NutriError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_corpus(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_indexing(config, &mut errors);
        Self::validate_llm(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NutriError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_corpus(config: &Config, errors: &mut Vec<ValidationError>) {
        // Existence is checked at index build time; a missing corpus is a
        // recoverable build failure, not a bad configuration.
        if config.corpus.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "corpus.path",
                "Corpus path cannot be empty",
            ));
        }

        let ext = &config.corpus.extension;
        if ext.is_empty() || ext.starts_with('.') {
            errors.push(ValidationError::new(
                "corpus.extension",
                format!("Extension must be non-empty and given without a dot, got '{}'", ext),
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        let model = &config.embedding.model;
        if model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        } else if !FastEmbedProvider::supports(model) {
            errors.push(ValidationError::new(
                "embedding.model",
                format!(
                    "Unsupported model '{}'. Supported: {}",
                    model,
                    FastEmbedProvider::SUPPORTED_MODELS.join(", ")
                ),
            ));
        }
    }

    fn validate_indexing(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.indexing.hnsw_ef_construction == 0 {
            errors.push(ValidationError::new(
                "indexing.hnsw_ef_construction",
                "HNSW ef_construction must be greater than 0",
            ));
        }

        let m = config.indexing.hnsw_m;
        if m == 0 || m > HNSW_MAX_CONNECTIONS {
            errors.push(ValidationError::new(
                "indexing.hnsw_m",
                format!(
                    "HNSW M must be between 1 and {}, got {}",
                    HNSW_MAX_CONNECTIONS, m
                ),
            ));
        }

        if config.indexing.hnsw_ef_search == 0 {
            errors.push(ValidationError::new(
                "indexing.hnsw_ef_search",
                "HNSW ef_search must be greater than 0",
            ));
        }

        if let Some(interval) = &config.indexing.refresh_interval {
            match parse_duration(interval) {
                Some(d) if !d.is_zero() => {}
                _ => errors.push(ValidationError::new(
                    "indexing.refresh_interval",
                    format!("Invalid non-zero duration: {}", interval),
                )),
            }
        }
    }

    fn validate_llm(config: &Config, errors: &mut Vec<ValidationError>) {
        let temp = config.llm.temperature;
        if !(0.0..=2.0).contains(&temp) {
            errors.push(ValidationError::new(
                "llm.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {}", temp),
            ));
        }

        // All supported providers speak the OpenAI chat-completions protocol
        let provider = &config.llm.provider;
        let valid_providers = ["groq", "openai", "ollama"];
        if !valid_providers.contains(&provider.as_str()) {
            errors.push(ValidationError::new(
                "llm.provider",
                format!(
                    "Provider must be one of {:?}, got '{}'",
                    valid_providers, provider
                ),
            ));
        }

        let base_url = &config.llm.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(ValidationError::new(
                "llm.base_url",
                format!("Base URL must start with http:// or https://, got '{}'", base_url),
            ));
        }

        if config.llm.model.is_empty() {
            errors.push(ValidationError::new("llm.model", "Model cannot be empty"));
        }

        if config.llm.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "llm.api_key_env",
                "API key variable name cannot be empty",
            ));
        }

        match parse_duration(&config.llm.timeout) {
            Some(d) if !d.is_zero() => {}
            _ => errors.push(ValidationError::new(
                "llm.timeout",
                format!("Invalid non-zero duration: {}", config.llm.timeout),
            )),
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.retrieval.top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }
    }
}
