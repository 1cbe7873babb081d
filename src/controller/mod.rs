pub mod feature;
pub mod init;
pub mod sysfs;

use crate::config::DacConfig;
use crate::property::{self, PropertyStore};
use feature::{AdvancedFeature, Capabilities, FeatureStates};
use init::DacPaths;
use log::{debug, error, warn};
use std::path::Path;
use std::sync::Arc;

/// Returned by `get_feature_value` for features the codec does not expose
pub const UNSUPPORTED_VALUE: i32 = -1;

/// Service interface for the DAC's advanced audio controls
pub trait DacAdvancedControl {
    /// Features exposed by the kernel driver, in discovery order
    fn get_supported_advanced_features(&self) -> Vec<AdvancedFeature>;

    /// Value space of a supported feature.
    /// Returns None (no reply) for unsupported features.
    fn get_supported_advanced_feature_values(&self, feature: AdvancedFeature) -> Option<FeatureStates>;

    /// Cached value of a feature, or `UNSUPPORTED_VALUE`
    fn get_feature_value(&self, feature: AdvancedFeature) -> i32;

    /// Apply a value to the kernel and the property cache.
    /// The result reflects the property write only.
    fn set_feature_value(&self, feature: AdvancedFeature, value: i32) -> bool;
}

/// Controller for a single DAC instance found in sysfs
pub struct DacController {
    config: DacConfig,
    properties: Arc<dyn PropertyStore>,
    paths: Option<DacPaths>,
    capabilities: Capabilities,
}

impl DacController {
    /// Discover the codec and restore its controls from the property cache
    pub fn new(config: DacConfig, properties: Arc<dyn PropertyStore>) -> Self {
        let mut controller = Self {
            config,
            properties,
            paths: None,
            capabilities: Capabilities::default(),
        };

        controller.initialize();
        controller
    }

    pub fn config(&self) -> &DacConfig {
        &self.config
    }

    /// Codec directory, if discovery succeeded
    pub fn base_path(&self) -> Option<&Path> {
        self.paths.as_ref().map(|paths| paths.base.as_path())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Raw value currently held by the kernel control file.
    ///
    /// Diagnostic only; the property cache stays authoritative.
    pub fn kernel_value(&self, feature: AdvancedFeature) -> Option<i32> {
        if !self.capabilities.supports(feature) {
            return None;
        }
        let path = self.control_path(feature)?;
        match sysfs::read_value(path) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Cannot read {} kernel value: {}", feature, e);
                None
            }
        }
    }

    fn property_key(&self, feature: AdvancedFeature) -> &str {
        match feature {
            AdvancedFeature::AvcVolume => &self.config.avc_volume.property,
            AdvancedFeature::HifiMode => &self.config.hifi_mode.property,
        }
    }

    fn default_value(&self, feature: AdvancedFeature) -> i32 {
        match feature {
            AdvancedFeature::AvcVolume => self.config.avc_volume.default_value,
            AdvancedFeature::HifiMode => self.config.hifi_mode.default_value,
        }
    }

    fn cached_value(&self, feature: AdvancedFeature) -> i32 {
        property::get_int32(
            self.properties.as_ref(),
            self.property_key(feature),
            self.default_value(feature),
        )
    }

    /// Write to the kernel control, then record the value in the property cache
    fn write_state(&self, feature: AdvancedFeature, value: i32) -> bool {
        // The kernel takes attenuation as a positive magnitude
        let kernel_value = match feature {
            AdvancedFeature::AvcVolume => value.saturating_neg(),
            AdvancedFeature::HifiMode => value,
        };

        match self.control_path(feature) {
            Some(path) => {
                if let Err(e) = sysfs::write_value(path, kernel_value) {
                    warn!("Kernel write for {} failed: {}", feature, e);
                }
            }
            None => warn!("No control path for {}", feature),
        }

        let key = self.property_key(feature);
        match property::set_int32(self.properties.as_ref(), key, value) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to store {} = {}: {}", key, value, e);
                false
            }
        }
    }
}

impl DacAdvancedControl for DacController {
    fn get_supported_advanced_features(&self) -> Vec<AdvancedFeature> {
        self.capabilities.features()
    }

    fn get_supported_advanced_feature_values(&self, feature: AdvancedFeature) -> Option<FeatureStates> {
        if !self.capabilities.supports(feature) {
            error!("Tried to get values for unsupported feature {}", feature);
            return None;
        }

        Some(match feature {
            AdvancedFeature::AvcVolume => FeatureStates::Range(self.config.avc_volume.range),
            AdvancedFeature::HifiMode => FeatureStates::States(self.config.hifi_mode.modes.clone()),
        })
    }

    fn get_feature_value(&self, feature: AdvancedFeature) -> i32 {
        if !self.capabilities.supports(feature) {
            error!("Tried to get value for unsupported feature {}", feature);
            return UNSUPPORTED_VALUE;
        }

        debug!("get_feature_value: {} found", feature);
        self.cached_value(feature)
    }

    fn set_feature_value(&self, feature: AdvancedFeature, value: i32) -> bool {
        if !self.capabilities.supports(feature) {
            error!("Tried to set value for unsupported feature {}", feature);
            return false;
        }

        debug!("set_feature_value: {} = {}", feature, value);
        self.write_state(feature, value)
    }
}
