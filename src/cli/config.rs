//! TOML run files.
//!
//! Instead of passing one `--path` per acquisition, a run file lists every
//! acquisition with its options:
//!
//! ```toml
//! # plate1.toml
//! on_error = "skip"
//!
//! [[acquisitions]]
//! path = "/data/plate1/"
//! plate_name = "plate1"
//! acquisition_id = 0
//!
//! [acquisitions.advanced]
//! condition_table_path = "conditions.csv"
//! pixelsize = 0.65
//!
//! [[acquisitions.advanced.filters]]
//! type = "well"
//! wells_to_remove = ["A01"]
//! ```

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use hcs_converters::parser::OnAcquisitionError;

/// Root of a run file, generic over the vendor acquisition model.
#[derive(Debug, Deserialize)]
pub struct RunConfig<A> {
    /// What to do when one acquisition fails.
    #[serde(default)]
    pub on_error: OnAcquisitionError,

    /// Acquisitions to parse, in order.
    #[serde(default = "Vec::new")]
    pub acquisitions: Vec<A>,
}

impl<A: DeserializeOwned> RunConfig<A> {
    /// Load a run file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run file: {}", path.display()))?;

        Self::from_str(&content)
            .with_context(|| format!("Invalid run file: {}", path.display()))
    }

    /// Parse a run file from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML run configuration")
    }
}
