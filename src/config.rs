//! Configuration loading and defaults for brain-cli.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::panel::Language;

// === Constants ===

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

// === Types ===

/// Resolved CLI configuration, including defaults and environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Root URL of the portal backend (the `/api/*` routes hang off it).
    pub base_url: Option<String>,
    /// Language preselected in the code generation and review panels.
    pub default_language: Option<String>,
    /// UI theme name (`default`, `dark`, `light`).
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(flatten)]
    base: Config,
    profiles: Option<HashMap<String, Config>>,
}

// === Config Loading ===

impl Config {
    /// Load configuration from disk and merge with environment overrides.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// # use crate::config::Config;
    /// let config = Config::load(None, None)?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: Option<PathBuf>, profile: Option<&str>) -> Result<Self> {
        let mut config = match config_path(path) {
            Some(ConfigPath::Explicit(path)) if !path.exists() => {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(ConfigPath::Explicit(path) | ConfigPath::Implicit(path)) if path.exists() => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::parse(&contents, profile)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            _ => Config::default(),
        };

        apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn parse(contents: &str, profile: Option<&str>) -> Result<Self> {
        let parsed: ConfigFile = toml::from_str(contents)?;
        apply_profile(parsed, profile)
    }

    /// Validate user-supplied values before anything connects.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.base_url {
            let url = url.trim();
            if url.is_empty() {
                anyhow::bail!("base_url cannot be empty string");
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("base_url must start with http:// or https:// (got '{url}')");
            }
        }
        if let Some(ref language) = self.default_language {
            language
                .parse::<Language>()
                .map_err(|err| anyhow::anyhow!("Invalid default_language: {err}"))?;
        }
        Ok(())
    }

    /// Return the portal base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Language preselected in the code panels.
    #[must_use]
    pub fn default_language(&self) -> Language {
        self.default_language
            .as_deref()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn theme(&self) -> &str {
        self.theme.as_deref().unwrap_or("default")
    }
}

// === Defaults ===

/// A config location, and whether the user asked for it by name.
enum ConfigPath {
    /// From `--config` or `BRAIN_CONFIG_PATH`; it must exist.
    Explicit(PathBuf),
    /// `~/.brain/config.toml`; missing means defaults.
    Implicit(PathBuf),
}

fn config_path(cli_path: Option<PathBuf>) -> Option<ConfigPath> {
    if let Some(path) = cli_path {
        return Some(ConfigPath::Explicit(path));
    }
    if let Ok(path) = std::env::var("BRAIN_CONFIG_PATH")
        && !path.trim().is_empty()
    {
        return Some(ConfigPath::Explicit(expand_path(&path)));
    }
    dirs::home_dir().map(|home| ConfigPath::Implicit(home.join(".brain").join("config.toml")))
}

/// Where the TUI appends its diagnostic log (`BRAIN_LOG_PATH` overrides).
pub fn default_log_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BRAIN_LOG_PATH")
        && !path.trim().is_empty()
    {
        return Some(expand_path(&path));
    }
    dirs::home_dir().map(|home| home.join(".brain").join("brain.log"))
}

pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

// === Environment Overrides ===

fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var("BRAIN_BASE_URL") {
        config.base_url = Some(value);
    }
    if let Ok(value) = std::env::var("BRAIN_DEFAULT_LANGUAGE") {
        config.default_language = Some(value);
    }
    if let Ok(value) = std::env::var("BRAIN_THEME") {
        config.theme = Some(value);
    }
}

fn apply_profile(config: ConfigFile, profile: Option<&str>) -> Result<Config> {
    let Some(profile_name) = profile else {
        return Ok(config.base);
    };

    let profiles = config.profiles.as_ref();
    match profiles.and_then(|profiles| profiles.get(profile_name)) {
        Some(override_cfg) => Ok(merge_config(config.base, override_cfg.clone())),
        None => {
            let available = profiles
                .map(|profiles| {
                    let mut keys = profiles.keys().cloned().collect::<Vec<_>>();
                    keys.sort();
                    if keys.is_empty() {
                        "none".to_string()
                    } else {
                        keys.join(", ")
                    }
                })
                .unwrap_or_else(|| "none".to_string());
            anyhow::bail!("Profile '{profile_name}' not found. Available profiles: {available}")
        }
    }
}

fn merge_config(base: Config, override_cfg: Config) -> Config {
    Config {
        base_url: override_cfg.base_url.or(base.base_url),
        default_language: override_cfg.default_language.or(base.default_language),
        theme: override_cfg.theme.or(base.theme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_point_at_local_portal() {
        let config = Config::default();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.default_language(), Language::Python);
        assert_eq!(config.theme(), "default");
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = Config {
            base_url: Some("https://brain.example.com/ ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.base_url(), "https://brain.example.com");
    }

    #[test]
    fn profile_overrides_base_values() {
        let contents = r#"
base_url = "http://localhost:8000"
default_language = "python"

[profiles.staging]
base_url = "https://staging.example.com"
theme = "dark"
"#;
        let config = Config::parse(contents, Some("staging")).expect("parse");
        assert_eq!(config.base_url(), "https://staging.example.com");
        assert_eq!(config.default_language(), Language::Python);
        assert_eq!(config.theme(), "dark");
    }

    #[test]
    fn unknown_profile_lists_available() {
        let contents = r#"
[profiles.prod]
base_url = "https://prod.example.com"

[profiles.dev]
base_url = "http://localhost:9000"
"#;
        let err = Config::parse(contents, Some("qa")).expect_err("missing profile");
        assert_eq!(
            err.to_string(),
            "Profile 'qa' not found. Available profiles: dev, prod"
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = Config {
            base_url: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            base_url: Some("localhost:8000".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            default_language: Some("cobol".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            base_url: Some("https://brain.example.com".to_string()),
            default_language: Some("rust".to_string()),
            theme: None,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_language = \"go\"\ntheme = \"light\"\n").expect("write");

        let config = Config::load(Some(path), None).expect("load");
        if std::env::var("BRAIN_DEFAULT_LANGUAGE").is_err() {
            assert_eq!(config.default_language(), Language::Go);
        }
        if std::env::var("BRAIN_THEME").is_err() {
            assert_eq!(config.theme(), "light");
        }
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nao-existe.toml");

        let err = Config::load(Some(path.clone()), None).expect_err("missing file");
        assert!(err.to_string().contains("Config file not found"));
        assert!(err.to_string().contains("nao-existe.toml"));
    }
}
