use crate::domain::ports::ConfigProvider;
use crate::utils::error::{GenError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_MAX_IMAGES: usize = 8;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, Parser)]
#[command(name = "listing-gen")]
#[command(about = "Generates marketplace listings from product photos")]
pub struct CliConfig {
    /// Product photo, repeatable. Order matters: the first image is
    /// treated as the primary angle.
    #[arg(long = "image", required = true)]
    pub images: Vec<PathBuf>,

    #[arg(long, default_value = "ru")]
    pub lang: String,

    /// Optional free-text guidance for the model.
    #[arg(long)]
    pub hint: Option<String>,

    /// Append a history record here after a successful generation.
    #[arg(long)]
    pub history_path: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Model endpoint configuration, resolved from the environment. Presence is
/// the only thing checked for the credential; the endpoint and bounds get
/// structural validation.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_base: String,
    pub api_key: String,
    pub model_id: String,
    pub max_images: usize,
    pub timeout: Duration,
}

impl ModelConfig {
    /// Reads `LISTING_API_KEY` (falling back to `OPENAI_API_KEY`),
    /// `LISTING_API_BASE`, `LISTING_MODEL`, `LISTING_MAX_IMAGES` and
    /// `LISTING_TIMEOUT_SECONDS`, with documented defaults for everything
    /// but the credential.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LISTING_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| GenError::MissingConfig {
                field: "LISTING_API_KEY".to_string(),
            })?;

        let api_base =
            std::env::var("LISTING_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model_id =
            std::env::var("LISTING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_images = parse_env_number("LISTING_MAX_IMAGES", DEFAULT_MAX_IMAGES)?;
        let timeout_seconds = parse_env_number("LISTING_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)?;

        Ok(Self {
            api_base,
            api_key,
            model_id,
            max_images,
            timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

fn parse_env_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| GenError::InvalidConfigValue {
            field: name.to_string(),
            value: raw,
            reason: "expected a positive integer".to_string(),
        }),
    }
}

impl ConfigProvider for ModelConfig {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn max_images(&self) -> usize {
        self.max_images
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }
}

impl Validate for ModelConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_base", &self.api_base)?;
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_non_empty_string("model_id", &self.model_id)?;
        validate_range("max_images", self.max_images, 1, 32)?;
        validate_range("timeout_seconds", self.timeout.as_secs(), 1, 600)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: "sk-test".to_string(),
            model_id: DEFAULT_MODEL.to_string(),
            max_images: DEFAULT_MAX_IMAGES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_image_cap() {
        let mut bad = config();
        bad.max_images = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut bad = config();
        bad.api_base = "ftp://somewhere".to_string();
        assert!(matches!(
            bad.validate(),
            Err(GenError::InvalidConfigValue { .. })
        ));
    }
}
