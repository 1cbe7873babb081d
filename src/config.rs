use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::controller::feature::{FeatureRange, KeyValue};

/// Static description of the DAC and its control interface.
///
/// Built once at startup and handed to the controller; nothing in here
/// changes for the lifetime of the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DacConfig {
    /// Parent directory holding one subdirectory per codec instance
    pub sysfs_root: PathBuf,
    /// Substring identifying the active codec instance directory
    pub chip_id: String,
    pub avc_volume: AvcVolumeConfig,
    pub hifi_mode: HifiModeConfig,
}

/// Analog volume control settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvcVolumeConfig {
    /// Control file name, relative to the codec directory
    pub control_file: String,
    pub property: String,
    pub default_value: i32,
    pub range: FeatureRange,
}

/// Hifi output mode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HifiModeConfig {
    /// Control file name, relative to the codec directory
    pub control_file: String,
    pub property: String,
    pub default_value: i32,
    /// Selectable modes, in presentation order
    pub modes: Vec<KeyValue>,
}

impl Default for DacConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys/bus/i2c/drivers/es9218-codec"),
            chip_id: "0048".to_string(),
            avc_volume: AvcVolumeConfig::default(),
            hifi_mode: HifiModeConfig::default(),
        }
    }
}

impl Default for AvcVolumeConfig {
    fn default() -> Self {
        Self {
            control_file: "avc_volume".to_string(),
            property: "persist.vendor.lge.audio.hifi_dac.avc_volume".to_string(),
            default_value: 0,
            range: FeatureRange {
                min: -24,
                max: 0,
                step: 1,
            },
        }
    }
}

impl Default for HifiModeConfig {
    fn default() -> Self {
        Self {
            control_file: "headset_type".to_string(),
            property: "persist.vendor.lge.audio.hifi_dac.mode".to_string(),
            default_value: 0,
            modes: vec![
                KeyValue::new("Normal", 0),
                KeyValue::new("High Impedance", 1),
                KeyValue::new("AUX", 2),
            ],
        }
    }
}

impl DacConfig {
    /// Load a configuration file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading DAC configuration from {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: DacConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!("Loaded DAC configuration from {:?}", path);
        Ok(config)
    }

    /// Resolve a hifi mode label (case-insensitive) to its numeric value
    pub fn hifi_mode_value(&self, label: &str) -> Option<i32> {
        self.hifi_mode
            .modes
            .iter()
            .find(|mode| mode.key.eq_ignore_ascii_case(label))
            .and_then(|mode| mode.value.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_value_space() {
        let config = DacConfig::default();
        assert_eq!(config.avc_volume.range, FeatureRange { min: -24, max: 0, step: 1 });
        let labels: Vec<&str> = config.hifi_mode.modes.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(labels, ["Normal", "High Impedance", "AUX"]);
    }

    #[test]
    fn test_hifi_mode_value_lookup() {
        let config = DacConfig::default();
        assert_eq!(config.hifi_mode_value("normal"), Some(0));
        assert_eq!(config.hifi_mode_value("High Impedance"), Some(1));
        assert_eq!(config.hifi_mode_value("AUX"), Some(2));
        assert_eq!(config.hifi_mode_value("Loud"), None);
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "chip_id": "001a", "avc_volume": {{ "default_value": -12 }} }}"#
        )
        .unwrap();

        let config = DacConfig::load(file.path()).unwrap();
        assert_eq!(config.chip_id, "001a");
        assert_eq!(config.avc_volume.default_value, -12);
        assert_eq!(config.avc_volume.control_file, "avc_volume");
        assert_eq!(config.hifi_mode, HifiModeConfig::default());
    }

    #[test]
    fn test_load_rejects_malformed_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(DacConfig::load(file.path()).is_err());
    }
}
