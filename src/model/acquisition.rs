use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::details::{AcquisitionDetails, Axis, ChannelInfo, DataType};
use crate::aggregation::TileFilter;
use crate::condition::ConditionTable;
use crate::error::ConfigurationError;

/// Advanced per-acquisition options.
///
/// Holds the condition-table location, user overrides for the inferred
/// geometry and the tile filters applied by the aggregation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionOptions {
    /// CSV file mapping wells to experimental conditions
    pub condition_table_path: Option<PathBuf>,
    /// Pixel size override (micrometers)
    pub pixelsize: Option<f64>,
    /// Z spacing override (micrometers)
    pub z_spacing: Option<f64>,
    /// Time spacing override
    pub t_spacing: Option<f64>,
    /// Channel list override
    pub channels: Option<Vec<ChannelInfo>>,
    /// Axis order override
    pub axes: Option<Vec<Axis>>,
    /// Data type override
    pub data_type: Option<DataType>,
    /// Filters applied to the built tiles
    pub filters: Vec<TileFilter>,
}

impl AcquisitionOptions {
    /// Check that every override is usable
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let spacings = [
            ("pixelsize", self.pixelsize),
            ("z_spacing", self.z_spacing),
            ("t_spacing", self.t_spacing),
        ];
        for (name, value) in spacings {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.0) {
                    return Err(ConfigurationError::InvalidAcquisition(format!(
                        "{name} override must be a positive number, got {value}"
                    )));
                }
            }
        }
        if let Some(axes) = &self.axes {
            for required in [Axis::C, Axis::Z, Axis::Y, Axis::X] {
                if !axes.contains(&required) {
                    return Err(ConfigurationError::InvalidAcquisition(format!(
                        "axes override must contain '{}'",
                        required.name()
                    )));
                }
            }
        }
        for filter in &self.filters {
            filter.validate()?;
        }
        Ok(())
    }

    /// Load the condition table, if one is configured
    pub fn condition_table(&self) -> Result<Option<ConditionTable>, ConfigurationError> {
        match &self.condition_table_path {
            Some(path) => ConditionTable::from_csv_path(path).map(Some),
            None => Ok(None),
        }
    }

    /// Apply the user overrides on top of an inferred descriptor
    pub fn update_acquisition_details(&self, mut details: AcquisitionDetails) -> AcquisitionDetails {
        if let Some(pixelsize) = self.pixelsize {
            details.pixelsize = pixelsize;
        }
        if let Some(z_spacing) = self.z_spacing {
            details.z_spacing = z_spacing;
        }
        if let Some(t_spacing) = self.t_spacing {
            details.t_spacing = t_spacing;
        }
        if let Some(channels) = &self.channels {
            details.channels = Some(channels.clone());
        }
        if let Some(axes) = &self.axes {
            details.axes = axes.clone();
        }
        if let Some(data_type) = self.data_type {
            details.data_type = Some(data_type);
        }
        details
    }
}

#[derive(Deserialize)]
struct AcquisitionInputDef {
    path: String,
    #[serde(default)]
    plate_name: Option<String>,
    #[serde(default)]
    acquisition_id: u32,
    #[serde(default)]
    advanced: AcquisitionOptions,
}

impl From<AcquisitionInputDef> for AcquisitionInput {
    fn from(def: AcquisitionInputDef) -> Self {
        AcquisitionInput::new(def.path)
            .with_plate_name(def.plate_name)
            .with_acquisition_id(def.acquisition_id)
            .with_advanced(def.advanced)
    }
}

/// Vendor-independent part of an acquisition model.
///
/// The path is stored without trailing slashes. Fields are read-only once the
/// value has been built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AcquisitionInputDef")]
pub struct AcquisitionInput {
    path: String,
    plate_name: Option<String>,
    acquisition_id: u32,
    advanced: AcquisitionOptions,
}

impl AcquisitionInput {
    /// New acquisition rooted at `path`
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let trimmed = path.trim_end_matches('/');
        // keep "/" itself rather than collapsing it to ""
        let path = if trimmed.is_empty() && !path.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        };
        Self {
            path,
            plate_name: None,
            acquisition_id: 0,
            advanced: AcquisitionOptions::default(),
        }
    }

    /// Set an explicit plate name
    pub fn with_plate_name(mut self, plate_name: Option<String>) -> Self {
        self.plate_name = plate_name;
        self
    }

    /// Set the acquisition id
    pub fn with_acquisition_id(mut self, acquisition_id: u32) -> Self {
        self.acquisition_id = acquisition_id;
        self
    }

    /// Set the advanced options
    pub fn with_advanced(mut self, advanced: AcquisitionOptions) -> Self {
        self.advanced = advanced;
        self
    }

    /// Drop a trailing vendor sub-directory (e.g. "data") from the path
    pub(crate) fn strip_path_segment(mut self, segment: &str) -> Self {
        let suffix = format!("/{segment}");
        if let Some(stripped) = self.path.strip_suffix(suffix.as_str()) {
            self.path = stripped.to_string();
        }
        self
    }

    /// Normalized acquisition path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Explicit plate name, if any
    pub fn plate_name(&self) -> Option<&str> {
        self.plate_name.as_deref()
    }

    /// Plate name, falling back to the last path segment
    pub fn normalized_plate_name(&self) -> String {
        match &self.plate_name {
            Some(name) => name.clone(),
            None => self
                .path
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Acquisition id
    pub fn acquisition_id(&self) -> u32 {
        self.acquisition_id
    }

    /// Advanced options
    pub fn advanced(&self) -> &AcquisitionOptions {
        &self.advanced
    }
}

/// Common view over the vendor acquisition models
pub trait AcquisitionModel {
    /// Vendor-independent fields
    fn input(&self) -> &AcquisitionInput;

    /// Normalized acquisition path
    fn path(&self) -> &str {
        self.input().path()
    }

    /// Plate name used for every image of the acquisition
    fn plate_name(&self) -> String {
        self.input().normalized_plate_name()
    }

    /// Acquisition id
    fn acquisition_id(&self) -> u32 {
        self.input().acquisition_id()
    }

    /// Advanced options
    fn advanced(&self) -> &AcquisitionOptions {
        self.input().advanced()
    }
}
