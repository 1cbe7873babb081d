use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Optional DAC features a kernel driver may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvancedFeature {
    /// Analog volume control, attenuation in dB
    AvcVolume,
    /// Headphone output impedance / routing mode
    HifiMode,
}

impl AdvancedFeature {
    /// All features, in discovery order
    pub const ALL: [AdvancedFeature; 2] = [AdvancedFeature::AvcVolume, AdvancedFeature::HifiMode];

    /// Stable lowercase name used on the command line and in logs
    pub fn name(&self) -> &'static str {
        match self {
            AdvancedFeature::AvcVolume => "avc-volume",
            AdvancedFeature::HifiMode => "hifi-mode",
        }
    }
}

impl fmt::Display for AdvancedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdvancedFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "avc-volume" | "avc" => Ok(AdvancedFeature::AvcVolume),
            "hifi-mode" | "hifi" => Ok(AdvancedFeature::HifiMode),
            other => Err(format!("unknown feature: {}", other)),
        }
    }
}

/// Inclusive numeric value range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

/// Label/value pair; the value travels as a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: &str, value: i32) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Value space of a feature: a range or a fixed set of labelled values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStates {
    Range(FeatureRange),
    States(Vec<KeyValue>),
}

/// Which features the kernel driver exposed at discovery time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub avc_volume: bool,
    pub hifi_mode: bool,
}

impl Capabilities {
    pub fn supports(&self, feature: AdvancedFeature) -> bool {
        match feature {
            AdvancedFeature::AvcVolume => self.avc_volume,
            AdvancedFeature::HifiMode => self.hifi_mode,
        }
    }

    /// Supported features in discovery order
    pub fn features(&self) -> Vec<AdvancedFeature> {
        AdvancedFeature::ALL
            .into_iter()
            .filter(|feature| self.supports(*feature))
            .collect()
    }
}
