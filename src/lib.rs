//! Advanced audio controls for ES9218-class DACs exposed through sysfs.
//!
//! The kernel driver publishes one plain-text control file per feature; the
//! last applied value of each feature is cached in a property store and
//! pushed back into the kernel whenever a controller is constructed.

pub mod config;
pub mod controller;
pub mod property;

pub use config::DacConfig;
pub use controller::feature::{AdvancedFeature, FeatureRange, FeatureStates, KeyValue};
pub use controller::{DacAdvancedControl, DacController, UNSUPPORTED_VALUE};
pub use property::{FilePropertyStore, MemoryPropertyStore, PropertyStore};
