//! Resolver configuration
//!
//! Loads resolver settings from YAML and wires up the Data Commons client,
//! concordance table and override rules they describe.
//!
//! ```yaml
//! entity_type: Country
//! batch_size: 30
//! default_overrides: true
//! overrides:
//!   Kosovo: country/XKX
//! concordance:
//!   path: data/concordance.csv
//!   id_column: dcid
//! datacommons:
//!   instance: datacommons.one.org
//!   timeout_secs: 30
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::concordance::{ConcordanceIndex, DEFAULT_ID_COLUMN};
use crate::disambiguation::{OverrideRules, DEFAULT_BATCH_SIZE};
use crate::resolver::PlaceResolver;
use crate::service::{DataCommonsClient, DataCommonsSettings, PlaceService};

/// Environment variable pointing at a YAML config file.
pub const CONFIG_PATH_ENV: &str = "PLACE_RESOLVER_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Knowledge-graph type candidates are restricted to, e.g. `Country`.
    pub entity_type: Option<String>,
    pub batch_size: usize,
    /// Install the built-in country override rules.
    pub default_overrides: bool,
    /// Extra override rules, reference -> canonical identifier.
    pub overrides: HashMap<String, String>,
    pub concordance: Option<ConcordanceConfig>,
    pub datacommons: DataCommonsSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcordanceConfig {
    pub path: PathBuf,
    #[serde(default = "default_id_column")]
    pub id_column: String,
}

fn default_id_column() -> String {
    DEFAULT_ID_COLUMN.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            entity_type: None,
            batch_size: DEFAULT_BATCH_SIZE,
            default_overrides: false,
            overrides: HashMap::new(),
            concordance: None,
            datacommons: DataCommonsSettings::default(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid resolver configuration")
    }

    /// File named by `PLACE_RESOLVER_CONFIG` (defaults otherwise), then
    /// `DC_INSTANCE`, `DC_URL` and `DC_API_KEY` on top. A `.env` file is
    /// honoured.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(instance) = lookup("DC_INSTANCE") {
            self.datacommons.instance = Some(instance);
        }
        if let Some(url) = lookup("DC_URL") {
            self.datacommons.url = Some(url);
        }
        if let Some(key) = lookup("DC_API_KEY") {
            self.datacommons.api_key = Some(key);
        }
    }

    pub fn override_rules(&self) -> OverrideRules {
        let mut rules = if self.default_overrides {
            OverrideRules::countries()
        } else {
            OverrideRules::new()
        };
        rules.extend(&self.overrides);
        rules
    }

    /// Build a resolver talking to the configured Data Commons instance.
    pub fn build(&self) -> Result<PlaceResolver> {
        let client = DataCommonsClient::new(self.datacommons.clone())?;
        info!(base_url = client.base_url(), "Using Data Commons");
        self.build_with_service(Arc::new(client))
    }

    /// Build a resolver around an existing service.
    pub fn build_with_service(&self, service: Arc<dyn PlaceService>) -> Result<PlaceResolver> {
        let mut resolver = PlaceResolver::new(service)
            .with_batch_size(self.batch_size)
            .with_overrides(self.override_rules());

        if let Some(entity_type) = &self.entity_type {
            resolver = resolver.with_entity_type(entity_type.clone());
        }
        if let Some(concordance) = &self.concordance {
            let index = ConcordanceIndex::from_csv_path(&concordance.path, &concordance.id_column)?;
            resolver = resolver.with_concordance(index);
        }
        Ok(resolver)
    }
}

impl PlaceResolver {
    /// Build a resolver from configuration.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        config.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::InMemoryPlaceService;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
entity_type: Country
batch_size: 10
default_overrides: true
overrides:
  Kosovo: country/XKX
concordance:
  path: data/concordance.csv
datacommons:
  instance: datacommons.one.org
  api_key: secret
"#;
        let config = ResolverConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.entity_type.as_deref(), Some("Country"));
        assert_eq!(config.batch_size, 10);
        assert!(config.default_overrides);
        let concordance = config.concordance.as_ref().unwrap();
        assert_eq!(concordance.id_column, "dcid");
        assert_eq!(config.datacommons.api_key.as_deref(), Some("secret"));
        assert_eq!(config.datacommons.timeout_secs, 30);
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.batch_size, 30);
        assert!(config.override_rules().is_empty());
    }

    #[test]
    fn test_invalid_field_type() {
        let err = ResolverConfig::from_yaml("batch_size: many").unwrap_err();
        assert!(err.to_string().contains("Invalid resolver configuration"));
    }

    #[test]
    fn test_override_rules_merge() {
        let config = ResolverConfig {
            default_overrides: true,
            overrides: HashMap::from([("France".to_string(), "custom/FRA".to_string())]),
            ..ResolverConfig::default()
        };
        let rules = config.override_rules();
        assert_eq!(rules.get("Congo"), Some("country/COG"));
        assert_eq!(rules.get("FRANCE"), Some("custom/FRA"));
    }

    #[test]
    fn test_apply_env() {
        let mut config = ResolverConfig::default();
        let env = HashMap::from([
            ("DC_URL", "http://localhost:8080/core/api/v2"),
            ("DC_API_KEY", "from-env"),
        ]);
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.datacommons.url.as_deref(),
            Some("http://localhost:8080/core/api/v2")
        );
        assert_eq!(config.datacommons.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.datacommons.instance.as_deref(), Some("datacommons.one.org"));
    }

    #[test]
    fn test_from_file_and_build() {
        let mut table = tempfile::NamedTempFile::new().unwrap();
        table
            .write_all(b"dcid,name,iso3\ncountry/ITA,Italy,ITA\n")
            .unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "entity_type: Country\nconcordance:\n  path: {}\n",
            table.path().display()
        )
        .unwrap();

        let config = ResolverConfig::from_file(file.path()).unwrap();
        let resolver = config
            .build_with_service(Arc::new(InMemoryPlaceService::new()))
            .unwrap();
        assert_eq!(resolver.concordance().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = ResolverConfig::from_file("/no/such/config.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
