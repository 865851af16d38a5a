//! Global configuration shared by the network construction and annotation steps
use std::sync::{LazyLock, RwLock};

use crate::crossref::MergePolicy;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Organism prefix carried by gene names inside a pathway (e.g. `mtu:Rv0001`), which the
    /// well-id lookup table leaves out
    pub species_prefix: String,
    /// Absolute expression change at or above which a measurement counts as significant
    pub significance_threshold: f64,
    /// How colliding keys are resolved when building cross-reference and effect maps
    pub merge_policy: MergePolicy,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            species_prefix: "mtu:".to_string(),
            significance_threshold: 1.0,
            merge_policy: MergePolicy::KeepLast,
        }
    }
}

impl Configuration {
    /// Snapshot of the current global configuration
    ///
    /// # Note:
    /// A poisoned lock still holds a valid configuration, so the value is read regardless.
    pub fn current() -> Configuration {
        match CONFIGURATION.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the global configuration
    pub fn set_global(config: Configuration) {
        match CONFIGURATION.write() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }
}
