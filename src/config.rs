use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};

use crate::monitoring::{DependencyGate, FeatureSet, ResolverDefaults};
use crate::monitoring::compatibility::DEFAULT_MIN_ACM_VERSION;

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

pub const CONFIG_ENV_VAR: &str = "UIPLUGIN_RESOLVER_CONFIG";

/// Operator settings loaded from TOML
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a ConfigManager from an in-memory configuration
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using the discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using empty configuration");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from an explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Get value with section fallback: `<selected>.<section>`, the selected
    /// section itself, then `section`, then `base`
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        if let Some(selected) = &self.selected_section {
            let scoped = format!("{}.{}", selected, section);
            for name in [scoped.as_str(), selected.as_str()] {
                if let Some(value) = self.config.get(name).and_then(|s| s.get(key)) {
                    return Some(value);
                }
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select an overriding section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        match self.get_value(section, key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(anyhow::anyhow!(
                    "Invalid boolean value for {}.{}: {}",
                    section,
                    key,
                    value
                )),
            },
            None => Ok(None),
        }
    }

    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Explicit compatibility feature list, if configured
    pub fn get_features(&self) -> Result<Option<FeatureSet>> {
        match self.get_value("compatibility", "features") {
            Some(value) => FeatureSet::parse_list(value)
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Invalid compatibility.features in config: {}", e)),
            None => Ok(None),
        }
    }

    /// Dashboard defaults applied to requested dashboards with empty fields
    pub fn get_resolver_defaults(&self) -> ResolverDefaults {
        ResolverDefaults {
            dashboard_name: self.get_value("dashboards", "default-name").cloned(),
            dashboard_namespace: self.get_value("dashboards", "default-namespace").cloned(),
        }
    }

    pub fn get_dependency_gate(&self) -> DependencyGate {
        let min_version = self
            .get_value("compatibility", "min-acm-version")
            .map(String::as_str)
            .unwrap_or(DEFAULT_MIN_ACM_VERSION);
        DependencyGate::new("acm", min_version)
    }
}

/// Configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("uiplugin-resolver").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".uiplugin-resolver.toml"));
    }

    paths.push(PathBuf::from("./.uiplugin-resolver.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse().context("Failed to parse TOML content")?;

    let mut config = Configuration::new();
    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Flatten nested tables into `section.subsection` keys
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        if let Value::Table(subtable) = value {
            let (leaves, nested): (Vec<_>, Vec<_>) = subtable
                .iter()
                .partition(|(_, v)| !matches!(v, Value::Table(_)));

            if !leaves.is_empty() {
                let section = config.entry(section_name.clone()).or_default();
                for (subkey, subvalue) in leaves {
                    section.insert(subkey.clone(), toml_value_to_string(subvalue));
                }
            }
            for (subkey, subvalue) in nested {
                if let Value::Table(inner) = subvalue {
                    flatten_toml_table(inner, format!("{}.{}", section_name, subkey), config);
                }
            }
        } else {
            // top-level scalars land in [base]
            config
                .entry("base".to_string())
                .or_default()
                .insert(section_name, toml_value_to_string(value));
        }
    }
}

fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(toml_value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
