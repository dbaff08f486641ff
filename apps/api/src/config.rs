use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL_ID: &str = "distilbert-base-uncased-distilled-squad";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub model: ModelConfig,
    /// Characters of extracted text shown in the page; the download always carries everything.
    pub display_char_limit: usize,
    pub inference_timeout: Duration,
}

/// Where the QA model comes from and how long contexts are windowed.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_id: String,
    pub revision: String,
    /// Local directory with config.json, tokenizer.json and model.safetensors. Skips the Hub.
    pub local_dir: Option<PathBuf>,
    pub max_seq_len: usize,
    pub doc_stride: usize,
    pub max_answer_tokens: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: "main".to_string(),
            local_dir: None,
            max_seq_len: 384,
            doc_stride: 128,
            max_answer_tokens: 15,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ModelConfig::default();
        let model = ModelConfig {
            model_id: std::env::var("QA_MODEL_ID").unwrap_or(defaults.model_id),
            revision: std::env::var("QA_MODEL_REVISION").unwrap_or(defaults.revision),
            local_dir: std::env::var("QA_MODEL_DIR").ok().map(PathBuf::from),
            max_seq_len: parse_env("MAX_SEQ_LEN", defaults.max_seq_len)?,
            doc_stride: parse_env("DOC_STRIDE", defaults.doc_stride)?,
            max_answer_tokens: parse_env("MAX_ANSWER_TOKENS", defaults.max_answer_tokens)?,
        };

        let config = Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            model,
            display_char_limit: parse_env("DISPLAY_CHAR_LIMIT", 3000)?,
            inference_timeout: Duration::from_secs(parse_env("INFERENCE_TIMEOUT_SECS", 120)?),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let m = &self.model;
        if m.max_answer_tokens == 0 {
            anyhow::bail!("MAX_ANSWER_TOKENS must be at least 1");
        }
        if m.doc_stride >= m.max_seq_len {
            anyhow::bail!(
                "DOC_STRIDE ({}) must be smaller than MAX_SEQ_LEN ({})",
                m.doc_stride,
                m.max_seq_len
            );
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(model: ModelConfig) -> Config {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            model,
            display_char_limit: 3000,
            inference_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_default_model_config_is_valid() {
        assert!(config_with(ModelConfig::default()).validate().is_ok());
    }

    #[test]
    fn test_stride_must_be_below_seq_len() {
        let model = ModelConfig {
            doc_stride: 384,
            ..ModelConfig::default()
        };
        assert!(config_with(model).validate().is_err());
    }

    #[test]
    fn test_zero_answer_tokens_rejected() {
        let model = ModelConfig {
            max_answer_tokens: 0,
            ..ModelConfig::default()
        };
        assert!(config_with(model).validate().is_err());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: usize = parse_env("RESUME_TITLE_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
