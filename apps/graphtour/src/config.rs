//! # Run Configuration
//!
//! Optional TOML configuration for the `plan` command. Anything set on the
//! command line overrides the file.
//!
//! ```toml
//! input = "triplets.json"
//! output = "plan.json"
//! state = "tour.state"
//! seed = 42
//! ```

use graphtour_core::PlanError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    /// Triplets JSON to plan over.
    pub input: Option<PathBuf>,
    /// Where to write the plan JSON.
    pub output: Option<PathBuf>,
    /// Where to write the binary state file.
    pub state: Option<PathBuf>,
    /// Community-detection seed.
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Load a run configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PlanError::Io(format!("cannot read config '{}': {e}", path.display()))
        })?;
        toml::from_str(&raw)
            .map_err(|e| PlanError::Serialization(format!("invalid config file: {e}")))
    }
}
