use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(
        PathBuf,
        #[source] std::io::Error,
    ),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("config file validation error: {0}")]
    Validation(String),
}

// for default value in serde
pub mod serde_defaults {
    pub fn home_url() -> String { "https://example.com".into() }

    pub fn types() -> Vec<String> { vec!["page".into()] }

    pub fn meta_key() -> String { "custom_permalink".into() }

    pub fn alias_meta_key() -> String { "custom_permalink_alias".into() }

    pub fn dispatch() -> String { "index.php".into() }
}

// `[permalink]` in toml (or a standalone config file)
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct PermalinkConfig {
    // e.g., "https://example.com"
    #[serde(default = "serde_defaults::home_url")]
    #[educe(Default = serde_defaults::home_url())]
    pub home_url: String,

    // content types managed by this crate
    #[serde(default = "serde_defaults::types")]
    #[educe(Default = serde_defaults::types())]
    pub types: Vec<String>,

    // prefix prepended to every path when the platform cannot rewrite urls
    // at the web-server level, e.g. "index.php/"
    #[serde(default)]
    pub front: Option<String>,

    // metadata key holding the custom path
    #[serde(default = "serde_defaults::meta_key")]
    #[educe(Default = serde_defaults::meta_key())]
    pub meta_key: String,

    // metadata key holding the optional alias path
    #[serde(default = "serde_defaults::alias_meta_key")]
    #[educe(Default = serde_defaults::alias_meta_key())]
    pub alias_meta_key: String,

    // dispatch script rewrite targets point at, e.g. "index.php"
    #[serde(default = "serde_defaults::dispatch")]
    #[educe(Default = serde_defaults::dispatch())]
    pub dispatch: String,
}

impl PermalinkConfig {
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: PermalinkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io (
            path.to_path_buf(),
            err
        ))?;
        Self::from_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.home_url.starts_with("http") {
            return Err(ConfigError::Validation(
                "`home_url` should start with `http://` or `https://`".into()
            ));
        }

        if self.types.is_empty() {
            return Err(ConfigError::Validation(
                "`types` should list at least one content type".into()
            ));
        }

        if self.meta_key.is_empty() {
            return Err(ConfigError::Validation(
                "`meta_key` should not be empty".into()
            ));
        }

        if self.front.as_ref().is_some_and(|front| !front.ends_with('/')) {
            return Err(ConfigError::Validation(
                "`front` should end with `/`".into()
            ));
        }

        Ok(())
    }

    /// Extension point: register an additional content type to manage.
    pub fn add_type(&mut self, kind: &str) {
        if !self.types.iter().any(|t| t == kind) {
            self.types.push(kind.to_owned());
        }
    }

    pub fn is_eligible(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }

    pub fn front_prefix(&self) -> &str {
        self.front.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
        home_url = "https://blog.example.com"
        types = ["page", "article"]
        front = "index.php/"
        meta_key = "permalink_override"
    "#;

    #[test]
    fn parse_config() {
        let config = PermalinkConfig::from_str(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.home_url, "https://blog.example.com");
        assert_eq!(config.types, vec!["page", "article"]);
        assert_eq!(config.front_prefix(), "index.php/");
        assert_eq!(config.meta_key, "permalink_override");
        assert_eq!(config.dispatch, "index.php");
    }

    #[test]
    fn default_values() {
        let config = PermalinkConfig::from_str("").unwrap();

        assert_eq!(config.types, vec!["page"]);
        assert_eq!(config.meta_key, "custom_permalink");
        assert_eq!(config.front_prefix(), "");
    }

    #[test]
    fn config_validation() {
        assert!(PermalinkConfig::from_str(r#"home_url = "example.com""#).is_err());
        assert!(PermalinkConfig::from_str(r#"types = []"#).is_err());
        assert!(PermalinkConfig::from_str(r#"front = "index.php""#).is_err());
    }

    #[test]
    fn add_type_deduplicates() {
        let mut config = PermalinkConfig::default();
        config.add_type("product");
        config.add_type("product");

        assert_eq!(config.types, vec!["page", "product"]);
        assert!(config.is_eligible("product"));
        assert!(!config.is_eligible("post"));
    }
}
