use super::feature::{AdvancedFeature, Capabilities};
use super::DacController;
use crate::config::DacConfig;
use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Control paths resolved from the sysfs tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DacPaths {
    pub base: PathBuf,
    pub avc_volume: PathBuf,
    pub hifi_mode: PathBuf,
}

/// Find the codec instance directory under `root` whose name contains `chip_id`.
///
/// Entries are visited in name order so the choice is stable when more than
/// one directory matches.
pub fn find_codec_dir(root: &Path, chip_id: &str) -> Option<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Cannot list codec directory {:?}: {}", root, e);
            return None;
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| entry.file_name().to_string_lossy().contains(chip_id))
        .map(|entry| entry.path())
        .collect();
    candidates.sort();

    candidates.into_iter().next()
}

/// Locate the codec directory and check which control files it exposes
pub fn discover(config: &DacConfig) -> Option<(DacPaths, Capabilities)> {
    let base = find_codec_dir(&config.sysfs_root, &config.chip_id)?;

    let paths = DacPaths {
        avc_volume: base.join(&config.avc_volume.control_file),
        hifi_mode: base.join(&config.hifi_mode.control_file),
        base,
    };
    let capabilities = Capabilities {
        avc_volume: paths.avc_volume.exists(),
        hifi_mode: paths.hifi_mode.exists(),
    };

    Some((paths, capabilities))
}

impl DacController {
    /// Run discovery and push cached values back into the kernel
    pub(super) fn initialize(&mut self) {
        debug!(
            "Scanning {:?} for codec {}",
            self.config.sysfs_root, self.config.chip_id
        );

        let Some((paths, capabilities)) = discover(&self.config) else {
            error!(
                "No codec directory matching {} under {:?}, advanced features disabled",
                self.config.chip_id, self.config.sysfs_root
            );
            return;
        };

        info!("DAC base path: {:?}", paths.base);
        self.paths = Some(paths);
        self.capabilities = capabilities;

        // Kernel controls reset on reboot; restore them from the property cache
        for feature in capabilities.features() {
            info!("Adding {} feature", feature);
            let cached = self.cached_value(feature);
            if !self.write_state(feature, cached) {
                error!("Failed to persist restored {} value {}", feature, cached);
            }
        }

        if capabilities.features().is_empty() {
            info!("Codec exposes no advanced controls");
        }
    }

    /// Control file for a feature, if the codec directory was found
    pub fn control_path(&self, feature: AdvancedFeature) -> Option<&Path> {
        let paths = self.paths.as_ref()?;
        Some(match feature {
            AdvancedFeature::AvcVolume => paths.avc_volume.as_path(),
            AdvancedFeature::HifiMode => paths.hifi_mode.as_path(),
        })
    }
}
