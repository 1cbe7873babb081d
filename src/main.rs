use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dac_control::{
    AdvancedFeature, DacAdvancedControl, DacConfig, DacController, FeatureStates, FilePropertyStore,
    MemoryPropertyStore, PropertyStore,
};
use log::debug;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// dacctl - query and adjust DAC advanced audio controls
#[derive(Parser, Debug)]
#[command(name = "dacctl")]
#[command(about = "Query and adjust DAC advanced audio controls", long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the sysfs directory scanned for the codec
    #[arg(long)]
    sysfs_root: Option<PathBuf>,

    /// Property store file (defaults to ~/.dacctl/properties.json)
    #[arg(short, long)]
    properties: Option<PathBuf>,

    /// Keep properties in memory only
    #[arg(long, conflicts_with = "properties")]
    ephemeral: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List features exposed by the codec
    Features,
    /// Show the value space of a feature
    Values { feature: AdvancedFeature },
    /// Show the current value of a feature
    Get { feature: AdvancedFeature },
    /// Set a feature; hifi-mode also accepts mode labels
    Set {
        feature: AdvancedFeature,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Show discovery results and cached/kernel values
    Status,
}

fn main() -> Result<ExitCode> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DacConfig::load(path)?,
        None => DacConfig::default(),
    };
    if let Some(root) = &args.sysfs_root {
        config.sysfs_root = root.clone();
    }

    let mut store_path = None;
    let properties: Arc<dyn PropertyStore> = if args.ephemeral {
        Arc::new(MemoryPropertyStore::new())
    } else {
        let path = args.properties.clone().unwrap_or_else(FilePropertyStore::default_path);
        debug!("Using property store {:?}", path);
        let store = FilePropertyStore::new(path);
        store_path = Some(store.path().to_path_buf());
        Arc::new(store)
    };

    let controller = DacController::new(config, properties);
    run(&controller, &args, store_path.as_deref())
}

/// `store_path` is None for the in-memory store
fn run(controller: &DacController, args: &Args, store_path: Option<&Path>) -> Result<ExitCode> {
    match &args.command {
        Command::Features => {
            let features = controller.get_supported_advanced_features();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&features)?);
            } else {
                for feature in features {
                    println!("{}", feature);
                }
            }
        }
        Command::Values { feature } => {
            let Some(states) = controller.get_supported_advanced_feature_values(*feature) else {
                eprintln!("{} is not supported", feature);
                return Ok(ExitCode::FAILURE);
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&states)?);
            } else {
                print_states(&states);
            }
        }
        Command::Get { feature } => {
            let value = controller.get_feature_value(*feature);
            if args.json {
                println!("{}", json!({ "feature": feature, "value": value }));
            } else {
                println!("{}", value);
            }
        }
        Command::Set { feature, value } => {
            let value = parse_value(controller.config(), *feature, value)?;
            let ok = controller.set_feature_value(*feature, value);
            if args.json {
                println!("{}", json!({ "feature": feature, "value": value, "ok": ok }));
            } else {
                println!("{}", ok);
            }
            if !ok {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Status => print_status(controller, store_path, args.json)?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Accept a plain integer, or a mode label for hifi-mode
fn parse_value(config: &DacConfig, feature: AdvancedFeature, raw: &str) -> Result<i32> {
    if let Ok(value) = raw.trim().parse::<i32>() {
        return Ok(value);
    }
    match feature {
        AdvancedFeature::HifiMode => config
            .hifi_mode_value(raw.trim())
            .ok_or_else(|| anyhow!("Unknown hifi mode: {}", raw)),
        AdvancedFeature::AvcVolume => Err(anyhow!("Invalid volume: {}", raw)),
    }
}

fn print_states(states: &FeatureStates) {
    match states {
        FeatureStates::Range(range) => {
            println!("range {}..={} step {}", range.min, range.max, range.step);
        }
        FeatureStates::States(modes) => {
            for mode in modes {
                println!("{}\t{}", mode.value, mode.key);
            }
        }
    }
}

fn print_status(controller: &DacController, store_path: Option<&Path>, as_json: bool) -> Result<()> {
    let features: Vec<_> = AdvancedFeature::ALL
        .into_iter()
        .map(|feature| {
            let supported = controller.capabilities().supports(feature);
            json!({
                "feature": feature,
                "supported": supported,
                "path": controller.control_path(feature).map(|p| p.display().to_string()),
                "value": supported.then(|| controller.get_feature_value(feature)),
                "kernel": controller.kernel_value(feature),
            })
        })
        .collect();

    if as_json {
        let status = json!({
            "base_path": controller.base_path().map(|p| p.display().to_string()),
            "properties": store_path.map(|p| p.display().to_string()),
            "features": features,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    match controller.base_path() {
        Some(path) => println!("codec: {}", path.display()),
        None => println!("codec: not found"),
    }
    match store_path {
        Some(path) => println!("properties: {}", path.display()),
        None => println!("properties: in memory"),
    }
    for entry in &features {
        println!(
            "{:<12} supported={} value={} kernel={}",
            entry["feature"].as_str().unwrap_or_default(),
            entry["supported"],
            entry["value"],
            entry["kernel"]
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_labels_for_hifi_mode() {
        let config = DacConfig::default();
        assert_eq!(parse_value(&config, AdvancedFeature::HifiMode, "AUX").unwrap(), 2);
        assert_eq!(parse_value(&config, AdvancedFeature::HifiMode, "1").unwrap(), 1);
        assert!(parse_value(&config, AdvancedFeature::HifiMode, "loud").is_err());
    }

    #[test]
    fn test_parse_value_volume_is_numeric() {
        let config = DacConfig::default();
        assert_eq!(parse_value(&config, AdvancedFeature::AvcVolume, "-10").unwrap(), -10);
        assert!(parse_value(&config, AdvancedFeature::AvcVolume, "Normal").is_err());
    }

    #[test]
    fn test_cli_parses_negative_value() {
        let args = Args::try_parse_from(["dacctl", "--ephemeral", "set", "avc-volume", "-10"]).unwrap();
        match args.command {
            Command::Set { feature, value } => {
                assert_eq!(feature, AdvancedFeature::AvcVolume);
                assert_eq!(value, "-10");
            }
            other => panic!("Expected Set command, got {:?}", other),
        }
    }
}
