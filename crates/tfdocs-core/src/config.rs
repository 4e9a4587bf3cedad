//! Configuration for the documentation pipeline.
//!
//! Configuration is a single TOML document. It names the registry and
//! documentation hosts, the release channel policy, how long a resolved
//! provider version stays fresh, and which providers are available.
//!
//! ## File Location
//!
//! 1. The path in the `TFDOCS_CONFIG` environment variable, if set
//! 2. Otherwise the platform config directory:
//!    - Linux: `~/.config/tfdocs/config.toml`
//!    - macOS: `~/Library/Application Support/dev.tfdocs.tfdocs/config.toml`
//!    - Windows: `%APPDATA%\tfdocs\tfdocs\config\config.toml`
//!
//! A missing file yields [`Config::default`], which registers the
//! `hashicorp/aws` provider.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [registry]
//! base_url = "https://registry.terraform.io"
//! channel = "stable"
//! version_ttl_secs = 3600
//!
//! [docs]
//! base_url = "https://raw.githubusercontent.com"
//! timeout_secs = 30
//!
//! [[providers]]
//! name = "aws"
//! org = "hashicorp"
//! docs_ref = "version_tag"
//!
//! [[providers]]
//! name = "random"
//! org = "hashicorp"
//! docs_ref = { branch = "main" }
//! pinned_version = "3.6.0"
//! resources = ["id", "password", "string"]
//! ```

use crate::{Channel, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "TFDOCS_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry API settings used by version resolution.
    pub registry: RegistryConfig,
    /// Documentation source settings used by the fetcher.
    pub docs: DocsConfig,
    /// Providers to register, in order.
    pub providers: Vec<ProviderConfig>,
}

/// Registry API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the registry, without trailing slash.
    pub base_url: String,
    /// Which versions count as candidates.
    pub channel: Channel,
    /// How long a resolved version is reused before asking the registry again.
    ///
    /// Zero means every lookup re-resolves.
    pub version_ttl_secs: u64,
}

/// Documentation source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Base URL of the raw documentation host, without trailing slash.
    pub base_url: String,
    /// Per-request timeout of the HTTP transport.
    pub timeout_secs: u64,
}

/// Which git ref of the provider repository documentation is read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocsRef {
    /// The release tag of the resolved version, `v{version}`.
    #[default]
    VersionTag,
    /// A fixed branch, independent of the resolved version.
    Branch(String),
}

/// One registry provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name and type-name prefix (`aws`).
    pub name: String,
    /// Registry namespace / GitHub organization (`hashicorp`).
    pub org: String,
    /// Skip registry resolution and always use this version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_version: Option<String>,
    /// Extra resource short names appended to the bundled catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Extra data source short names appended to the bundled catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_sources: Vec<String>,
    /// Must stay the last field: TOML needs plain values before the `branch` table.
    #[serde(default)]
    pub docs_ref: DocsRef,
}

impl ProviderConfig {
    pub fn new(org: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            org: org.to_string(),
            docs_ref: DocsRef::VersionTag,
            pinned_version: None,
            resources: Vec::new(),
            data_sources: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_docs_ref(mut self, docs_ref: DocsRef) -> Self {
        self.docs_ref = docs_ref;
        self
    }

    #[must_use]
    pub fn with_pinned_version(mut self, version: &str) -> Self {
        self.pinned_version = Some(version.to_string());
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://registry.terraform.io".to_string(),
            channel: Channel::Stable,
            version_ttl_secs: 3600,
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://raw.githubusercontent.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            docs: DocsConfig::default(),
            providers: vec![ProviderConfig::new("hashicorp", "aws")],
        }
    }
}

impl RegistryConfig {
    pub const fn version_ttl(&self) -> Duration {
        Duration::from_secs(self.version_ttl_secs)
    }
}

impl DocsConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from `TFDOCS_CONFIG` or the platform config directory.
    ///
    /// Returns the defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, or the
    /// file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Look up a provider entry by name.
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Reject configurations the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        for (i, provider) in self.providers.iter().enumerate() {
            if provider.name.trim().is_empty() || provider.org.trim().is_empty() {
                return Err(Error::Config(format!(
                    "provider #{i} needs both 'name' and 'org'"
                )));
            }
            if self.providers[..i].iter().any(|p| p.name == provider.name) {
                return Err(Error::Config(format!(
                    "provider '{}' is configured twice",
                    provider.name
                )));
            }
            if let Some(pinned) = &provider.pinned_version {
                semver::Version::parse(pinned).map_err(|e| {
                    Error::Config(format!(
                        "provider '{}' has invalid pinned_version '{pinned}': {e}",
                        provider.name
                    ))
                })?;
            }
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let project_dirs = directories::ProjectDirs::from("dev", "tfdocs", "tfdocs")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn create_test_config() -> Config {
        Config {
            registry: RegistryConfig {
                base_url: "http://localhost:9000".to_string(),
                channel: Channel::Prerelease,
                version_ttl_secs: 60,
            },
            docs: DocsConfig {
                base_url: "http://localhost:9001".to_string(),
                timeout_secs: 5,
            },
            providers: vec![
                ProviderConfig::new("hashicorp", "aws"),
                ProviderConfig::new("hashicorp", "random")
                    .with_docs_ref(DocsRef::Branch("main".to_string()))
                    .with_pinned_version("3.6.0"),
            ],
        }
    }

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.registry.base_url, "https://registry.terraform.io");
        assert_eq!(config.registry.channel, Channel::Stable);
        assert_eq!(config.registry.version_ttl(), Duration::from_secs(3600));
        assert_eq!(config.docs.base_url, "https://raw.githubusercontent.com");
        assert_eq!(config.docs.timeout(), Duration::from_secs(30));
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].name, "aws");
        assert_eq!(config.providers[0].docs_ref, DocsRef::VersionTag);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("config.toml");
        let original = create_test_config();

        original.save(&path)?;
        let loaded = Config::load_from(&path)?;

        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[registry]\nchannel = \"prerelease\"\n\n[[providers]]\nname = \"google\"\norg = \"hashicorp\"\n",
        )?;

        let loaded = Config::load_from(&path)?;

        assert_eq!(loaded.registry.channel, Channel::Prerelease);
        assert_eq!(loaded.registry.base_url, "https://registry.terraform.io");
        assert_eq!(loaded.docs, DocsConfig::default());
        assert_eq!(loaded.providers.len(), 1);
        assert_eq!(loaded.providers[0].docs_ref, DocsRef::VersionTag);
        Ok(())
    }

    #[test]
    fn test_branch_docs_ref_parses() -> Result<()> {
        let parsed: Config = toml::from_str(
            "[[providers]]\nname = \"random\"\norg = \"hashicorp\"\ndocs_ref = { branch = \"main\" }\n",
        )?;
        assert_eq!(
            parsed.providers[0].docs_ref,
            DocsRef::Branch("main".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_config_parse_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[registry\nbase_url = ").unwrap();

        match Config::load_from(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains("Failed to parse config")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_load_missing_file() {
        let missing = PathBuf::from("/definitely/does/not/exist/config.toml");
        match Config::load_from(&missing) {
            Err(Error::Config(msg)) => assert!(msg.contains("Failed to read config")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_pins() {
        let mut config = Config::default();
        config.providers.push(ProviderConfig::new("hashicorp", "aws"));
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.providers[0].pinned_version = Some("five".to_string());
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.providers[0].org = String::new();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_provider_lookup() {
        let config = create_test_config();
        assert_eq!(config.provider("random").unwrap().org, "hashicorp");
        assert!(config.provider("azurerm").is_none());
    }

    proptest! {
        #[test]
        fn test_version_ttl_roundtrip(ttl in 0u64..=7 * 24 * 3600) {
            let mut config = Config::default();
            config.registry.version_ttl_secs = ttl;
            let serialized = toml::to_string_pretty(&config).unwrap();
            let parsed: Config = toml::from_str(&serialized).unwrap();
            prop_assert_eq!(parsed.registry.version_ttl(), Duration::from_secs(ttl));
        }
    }
}
