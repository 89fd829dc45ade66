//! Optional TOML configuration.
//!
//! ```toml
//! [batteryless]
//! payload = "payload.bin"
//! auto_mode = true
//!
//! [padding]
//! alignment = 16
//! interchangeable_empty_byte = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cartpatch_core::{PatchMode, PatchOptions, PatchOptionsBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub batteryless: BatterylessConfig,
    pub padding: PaddingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatterylessConfig {
    /// Payload blob used when `--payload` is not given
    pub payload: Option<PathBuf>,
    pub auto_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    pub alignment: usize,
    pub interchangeable_empty_byte: bool,
}

impl Default for PaddingConfig {
    fn default() -> Self {
        let options = PatchOptions::default();
        Self {
            alignment: options.alignment,
            interchangeable_empty_byte: options.interchangeable_empty_byte,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Options builder seeded from this config; command-line flags override on top.
    pub fn options(&self) -> PatchOptionsBuilder {
        let mode = if self.batteryless.auto_mode {
            PatchMode::Auto
        } else {
            PatchMode::Manual
        };
        PatchOptions::builder()
            .mode(mode)
            .alignment(self.padding.alignment)
            .interchangeable_empty_byte(self.padding.interchangeable_empty_byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
[batteryless]
payload = "payload.bin"
auto_mode = true

[padding]
alignment = 256
interchangeable_empty_byte = false
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(
            config.batteryless.payload,
            Some(PathBuf::from("payload.bin"))
        );

        let options = config.options().build();
        assert_eq!(options.mode, PatchMode::Auto);
        assert_eq!(options.alignment, 256);
        assert!(!options.interchangeable_empty_byte);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_config("[batteryless]\nauto_mode = true\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.padding, PaddingConfig::default());
        assert_eq!(config.padding.alignment, 16);
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let file = write_config("[padding]\nalignment = \"wide\"\n");
        assert!(Config::load(file.path()).is_err());
        assert_eq!(Config::load_or_default(file.path()), Config::default());
    }

    #[test]
    fn test_missing_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.options().build(), PatchOptions::default());
    }
}
