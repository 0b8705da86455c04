//! Configuration for pyinspect.
//!
//! All keys are optional; missing keys fall back to the PEP 8 defaults.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::{DEFAULT_MAX_LINE_LENGTH, DEFAULT_NAMING_PATTERN, DEFAULT_RESOURCE_FUNCTIONS};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["pyinspect.yaml", ".pyinspect.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Lines longer than this many characters are reported.
    pub max_line_length: usize,
    /// Regex every name reference must match.
    pub naming_pattern: String,
    /// Functions whose calls must sit inside a `with` block.
    pub resource_functions: Vec<String>,
    /// Glob patterns for paths to exclude from directory scans.
    pub excluded_paths: Vec<String>,
    /// Which analyses to run.
    pub checks: Checks,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            naming_pattern: DEFAULT_NAMING_PATTERN.to_string(),
            resource_functions: DEFAULT_RESOURCE_FUNCTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_paths: Vec::new(),
            checks: Checks::default(),
        }
    }
}

/// Per-analysis switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Checks {
    pub complexity: bool,
    pub style: bool,
    pub resources: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            complexity: true,
            style: true,
            resources: true,
        }
    }
}

impl InspectorConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a config from YAML text. Empty text yields the defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: InspectorConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Compile `excluded_paths` into a matcher.
    pub fn exclusions(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

/// Look for a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Validate a config.
pub fn validate(config: &InspectorConfig) -> anyhow::Result<()> {
    if config.max_line_length == 0 {
        anyhow::bail!("max_line_length must be greater than zero");
    }

    if config.resource_functions.is_empty() {
        anyhow::bail!("resource_functions must name at least one function");
    }

    regex::Regex::new(&config.naming_pattern)
        .map_err(|e| anyhow::anyhow!("invalid naming_pattern {:?}: {}", config.naming_pattern, e))?;

    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = InspectorConfig::default();
        assert_eq!(config.max_line_length, 79);
        assert_eq!(config.naming_pattern, "^[a-z_][a-z0-9_]*$");
        assert_eq!(config.resource_functions, vec!["open"]);
        assert!(config.checks.complexity && config.checks.style && config.checks.resources);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
max_line_length: 100
excluded_paths:
  - "**/venv/**"
checks:
  complexity: false
"#;
        let config = InspectorConfig::parse_str(yaml).unwrap();
        assert_eq!(config.max_line_length, 100);
        assert_eq!(config.naming_pattern, DEFAULT_NAMING_PATTERN);
        assert!(!config.checks.complexity);
        assert!(config.checks.style);

        let exclusions = config.exclusions().unwrap();
        assert!(exclusions.is_match("project/venv/lib/site.py"));
        assert!(!exclusions.is_match("project/src/app.py"));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = InspectorConfig::parse_str("  \n").unwrap();
        assert_eq!(config.max_line_length, DEFAULT_MAX_LINE_LENGTH);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero = InspectorConfig {
            max_line_length: 0,
            ..Default::default()
        };
        assert!(validate(&zero).is_err());

        let no_functions = InspectorConfig {
            resource_functions: vec![],
            ..Default::default()
        };
        assert!(validate(&no_functions).is_err());

        let bad_regex = InspectorConfig {
            naming_pattern: "([a-z".to_string(),
            ..Default::default()
        };
        assert!(validate(&bad_regex)
            .unwrap_err()
            .to_string()
            .contains("naming_pattern"));

        let bad_glob = InspectorConfig {
            excluded_paths: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(validate(&bad_glob).is_err());
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().unwrap();
        assert!(discover(temp.path()).is_none());

        std::fs::write(temp.path().join(".pyinspect.yaml"), "max_line_length: 88\n").unwrap();
        let found = discover(temp.path()).unwrap();
        assert!(found.ends_with(".pyinspect.yaml"));
        assert_eq!(InspectorConfig::parse_file(found).unwrap().max_line_length, 88);
    }
}
