use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub text_timeout: Option<Duration>,
    pub image_timeout: Option<Duration>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;
        let mut gemini = GeminiConfig::new(api_key);
        if let Some(base) = get("GEMINI_API_BASE") {
            gemini.base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("GEMINI_TEXT_MODEL") {
            gemini.text_model = model;
        }
        if let Some(model) = get("GEMINI_IMAGE_MODEL") {
            gemini.image_model = model;
        }

        let seconds = |name: &'static str| -> Result<Option<Duration>, ConfigError> {
            get(name)
                .map(|raw| match raw.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                    _ => Err(ConfigError::Invalid { name, value: raw }),
                })
                .transpose()
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            gemini,
            text_timeout: seconds("TEXT_TIMEOUT_SECS")?,
            image_timeout: seconds("IMAGE_TIMEOUT_SECS")?,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = load(&[("GEMINI_API_KEY", "secret")]).unwrap();
        assert_eq!(config.gemini.api_key, "secret");
        assert_eq!(config.gemini.base_url, DEFAULT_API_BASE);
        assert_eq!(config.gemini.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.gemini.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.text_timeout, None);
        assert_eq!(config.image_timeout, None);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn missing_key_is_an_error() {
        assert_eq!(load(&[("GEMINI_API_KEY", "  ")]).unwrap_err(), ConfigError::Missing("GEMINI_API_KEY"));
    }

    #[test]
    fn overrides_and_timeouts_are_read() {
        let config = load(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_API_BASE", "http://localhost:9000/v1beta/"),
            ("GEMINI_IMAGE_MODEL", "imagen"),
            ("TEXT_TIMEOUT_SECS", "30"),
            ("PORT", "3000"),
        ])
        .unwrap();
        assert_eq!(config.gemini.base_url, "http://localhost:9000/v1beta");
        assert_eq!(config.gemini.image_model, "imagen");
        assert_eq!(config.text_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let config = load(&[("GEMINI_API_KEY", "AIzaSy-very-secret")]).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("AIza"), "{printed}");
        assert!(printed.contains("api_key: \"***\""), "{printed}");
    }

    #[test]
    fn zero_or_garbage_timeout_is_rejected() {
        for raw in ["0", "soon"] {
            let err = load(&[("GEMINI_API_KEY", "k"), ("IMAGE_TIMEOUT_SECS", raw)]).unwrap_err();
            assert_eq!(err, ConfigError::Invalid { name: "IMAGE_TIMEOUT_SECS", value: raw.to_string() });
        }
    }
}
