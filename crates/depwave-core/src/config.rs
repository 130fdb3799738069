use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "depwave.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discover: DiscoverConfig,
    #[serde(default)]
    pub sequence: SequenceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverConfig {
    /// Keep the built-in keyword → concept table.
    #[serde(default = "default_true")]
    pub builtin_couplings: bool,
    /// Extra keyword → concept couplings.
    #[serde(default)]
    pub couplings: BTreeMap<String, Vec<String>>,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            builtin_couplings: default_true(),
            couplings: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Append the traced longest chain to `sequence` output.
    #[serde(default)]
    pub show_critical_path: bool,
}

const fn default_true() -> bool {
    true
}

/// Parse a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<Config>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the effective config.
///
/// An explicit path must exist. Without one, `depwave.toml` in `dir` is used
/// when present; otherwise defaults apply.
///
/// # Errors
///
/// Returns an error if an explicit path is missing or any selected file
/// fails to load.
pub fn resolve_config(dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if !candidate.exists() {
                tracing::debug!("no {CONFIG_FILE_NAME} found; using defaults");
                return Ok(Config::default());
            }
            candidate
        }
    };

    let config = load_config(&path)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_file() {
        let dir = TempDir::new().expect("tempdir");
        let config = resolve_config(dir.path(), None).expect("resolve");
        assert_eq!(config, Config::default());
        assert!(config.discover.builtin_couplings);
        assert!(!config.sequence.show_critical_path);
    }

    #[test]
    fn loads_file_from_directory() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
[discover]
builtin_couplings = false

[discover.couplings]
billing = ["ledger", "invoicing"]

[sequence]
show_critical_path = true
"#,
        )
        .expect("write config");

        let config = resolve_config(dir.path(), None).expect("resolve");
        assert!(!config.discover.builtin_couplings);
        assert_eq!(
            config.discover.couplings.get("billing"),
            Some(&vec!["ledger".to_string(), "invoicing".to_string()])
        );
        assert!(config.sequence.show_critical_path);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[sequence]\nshow_critical_path = true\n").expect("write config");

        let config = resolve_config(dir.path(), Some(&path)).expect("resolve");
        assert!(config.discover.builtin_couplings);
        assert!(config.sequence.show_critical_path);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        assert!(resolve_config(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[discover\n").expect("write config");
        let err = resolve_config(dir.path(), None).expect_err("parse failure");
        assert!(format!("{err:#}").contains("Failed to parse"));
    }
}
