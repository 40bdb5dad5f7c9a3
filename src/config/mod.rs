//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `HOPON_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_CACHE_DIR, DEFAULT_CACHE_FILENAME, DEFAULT_ENCODE_BATCH_SIZE, DEFAULT_LOG_DIR,
    DEFAULT_MAX_SEQ_LEN, DEFAULT_SIMILAR_TOP_K,
};
use crate::embedding::EncoderConfig;

/// Matcher configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `HOPON_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Embedding cache record. Default: `data/processed/embeddings.rkyv`.
    pub cache_path: PathBuf,

    /// Sentence-transformer model directory.
    pub model_dir: Option<PathBuf>,

    /// Project dataset (`.json` / `.jsonl`).
    pub dataset_path: Option<PathBuf>,

    /// Directory for the session log. Default: `logs`.
    pub log_dir: PathBuf,

    /// Default result count for similarity lookups. Default: `5`.
    pub similar_top_k: usize,

    /// Max tokens per encoder input. Default: `256`.
    pub max_seq_len: usize,

    /// Inputs per encoder forward pass. Default: `32`.
    pub encode_batch_size: usize,

    /// Use the deterministic stub encoder instead of a model.
    pub encoder_stub: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: Path::new(DEFAULT_CACHE_DIR).join(DEFAULT_CACHE_FILENAME),
            model_dir: None,
            dataset_path: None,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            similar_top_k: DEFAULT_SIMILAR_TOP_K,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            encode_batch_size: DEFAULT_ENCODE_BATCH_SIZE,
            encoder_stub: false,
        }
    }
}

impl Config {
    const ENV_CACHE_PATH: &'static str = "HOPON_CACHE_PATH";
    const ENV_DATASET_PATH: &'static str = "HOPON_DATASET_PATH";
    const ENV_LOG_DIR: &'static str = "HOPON_LOG_DIR";
    const ENV_SIMILAR_TOP_K: &'static str = "HOPON_SIMILAR_TOP_K";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cache_path = Self::parse_path_from_env(Self::ENV_CACHE_PATH, defaults.cache_path);
        let model_dir = Self::parse_optional_path_from_env(EncoderConfig::ENV_MODEL_DIR);
        let dataset_path = Self::parse_optional_path_from_env(Self::ENV_DATASET_PATH);
        let log_dir = Self::parse_path_from_env(Self::ENV_LOG_DIR, defaults.log_dir);
        let similar_top_k =
            Self::parse_positive_from_env(Self::ENV_SIMILAR_TOP_K, defaults.similar_top_k)?;
        let max_seq_len =
            Self::parse_positive_from_env(EncoderConfig::ENV_MAX_SEQ_LEN, defaults.max_seq_len)?;
        let encode_batch_size = Self::parse_positive_from_env(
            EncoderConfig::ENV_BATCH_SIZE,
            defaults.encode_batch_size,
        )?;
        let encoder_stub = Self::parse_bool_from_env(EncoderConfig::ENV_STUB, false)?;

        Ok(Self {
            cache_path,
            model_dir,
            dataset_path,
            log_dir,
            similar_top_k,
            max_seq_len,
            encode_batch_size,
            encoder_stub,
        })
    }

    /// Validates path shapes (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: self.cache_path.clone(),
            });
        }

        if self.log_dir.exists() && !self.log_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.log_dir.clone(),
            });
        }

        if let Some(ref path) = self.model_dir {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.dataset_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if self.similar_top_k == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_SIMILAR_TOP_K,
            });
        }

        Ok(())
    }

    /// Encoder settings derived from this config.
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            model_dir: self.model_dir.clone(),
            max_seq_len: self.max_seq_len,
            batch_size: self.encode_batch_size,
            testing_stub: self.encoder_stub,
            ..EncoderConfig::default()
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        Self::parse_optional_path_from_env(var_name).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_positive_from_env(name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(name) {
            Ok(value) => {
                let parsed: usize =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::InvalidNumber {
                            name,
                            value: value.clone(),
                            source: e,
                        })?;

                if parsed == 0 {
                    return Err(ConfigError::ZeroValue { name });
                }

                Ok(parsed)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" | "" => Ok(false),
                _ => Err(ConfigError::InvalidBool { name, value }),
            },
            Err(_) => Ok(default),
        }
    }
}
