//! Configuration module
//!
//! Client settings read from the environment (and a `.env` file when present).
//! A command-line base URL replaces the environment one before validation.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://compressor-api-3771.onrender.com";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_UPLOAD_MB: u64 = 50;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Service base URL without a trailing slash.
    pub api_url: String,
    pub timeout_secs: u64,
    pub max_upload_bytes: u64,
    /// Directory compressed results are written into.
    pub output_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
            max_upload_bytes: MAX_UPLOAD_MB * 1024 * 1024,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    /// Load from SQUISH_API_URL (or API_URL), SQUISH_TIMEOUT_SECS,
    /// SQUISH_MAX_UPLOAD_MB and SQUISH_OUTPUT_DIR.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_env_with_api_url(None)
    }

    /// Like [`from_env`](Self::from_env), with `api_url` taking precedence over
    /// the environment before anything is validated.
    pub fn from_env_with_api_url(api_url: Option<&str>) -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok(), api_url)
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        api_url_override: Option<&str>,
    ) -> Result<Self, anyhow::Error> {
        let api_url = match api_url_override {
            Some(url) => url.to_string(),
            None => lookup("SQUISH_API_URL")
                .or_else(|| lookup("API_URL"))
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };

        let timeout_secs = lookup("SQUISH_TIMEOUT_SECS")
            .unwrap_or_else(|| REQUEST_TIMEOUT_SECS.to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("SQUISH_TIMEOUT_SECS must be a valid number"))?;

        let max_upload_mb: u64 = lookup("SQUISH_MAX_UPLOAD_MB")
            .unwrap_or_else(|| MAX_UPLOAD_MB.to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("SQUISH_MAX_UPLOAD_MB must be a valid number"))?;
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("SQUISH_MAX_UPLOAD_MB is too large"))?;

        let output_dir = lookup("SQUISH_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = Self {
            api_url: normalize_base_url(&api_url),
            timeout_secs,
            max_upload_bytes,
            output_dir,
        };
        config.validate()?;

        tracing::debug!(
            api_url = %config.api_url,
            timeout_secs = config.timeout_secs,
            max_upload_bytes = config.max_upload_bytes,
            "Loaded client configuration"
        );

        Ok(config)
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "SQUISH_API_URL must start with http:// or https:// (got {})",
                self.api_url
            ));
        }

        if self.timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "SQUISH_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!(
                "SQUISH_MAX_UPLOAD_MB must be greater than zero"
            ));
        }

        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], api_url: Option<&str>) -> Result<ClientConfig, anyhow::Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned(), api_url)
    }

    #[test]
    fn loads_defaults_from_empty_environment() {
        let config = load(&[], None).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn reads_upload_limit_and_fallback_url() {
        let config = load(
            &[("API_URL", "http://localhost:5000/"), ("SQUISH_MAX_UPLOAD_MB", "10")],
            None,
        )
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn overflowing_upload_limit_is_an_error() {
        let err = load(&[("SQUISH_MAX_UPLOAD_MB", "18446744073709551615")], None).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn unparseable_upload_limit_is_an_error() {
        let err = load(&[("SQUISH_MAX_UPLOAD_MB", "not-a-number")], None).unwrap_err();
        assert!(err.to_string().contains("SQUISH_MAX_UPLOAD_MB"));
    }

    #[test]
    fn api_url_override_wins_over_invalid_environment() {
        let vars = [("SQUISH_API_URL", "not a url")];
        assert!(load(&vars, None).is_err());

        let config = load(&vars, Some("http://127.0.0.1:8080")).unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = load(&[], Some("http://localhost:5000/")).unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(load(&[("SQUISH_API_URL", "ftp://example.com")], None).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
