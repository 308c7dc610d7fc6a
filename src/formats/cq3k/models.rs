//! Data models for CellVoyager CQ3K measurement files
//!
//! `MeasurementData.mlf` lists one record per acquired plane (or acquisition
//! error); `MeasurementDetail.mrf` describes the plate and the channels.

/// One image plane record from `MeasurementData.mlf`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRecord {
    /// Acquisition timestamp as written by the instrument
    pub time: Option<String>,

    /// 1-based plate column
    pub column: u32,

    /// 1-based plate row
    pub row: u32,

    /// Field-of-view index within the well
    pub field_index: u32,

    /// 1-based timepoint
    pub time_point: u32,

    /// Timeline index
    pub timeline_index: u32,

    /// Stage x position (micrometers)
    pub x: f64,

    /// Stage y position (micrometers, y up)
    pub y: f64,

    /// Stage z position (micrometers)
    pub z: f64,

    /// 1-based z plane index
    pub z_index: u32,

    /// 1-based channel number
    pub ch: u32,

    /// Acquisition action name
    pub action: String,

    /// Acquisition action index
    pub action_index: u32,

    /// Tile column for tiled acquisitions
    pub tile_x_index: Option<u32>,

    /// Tile row for tiled acquisitions
    pub tile_y_index: Option<u32>,

    /// Z projection type (e.g. "MIP"), absent for plain stacks
    pub z_image_processing: Option<String>,

    /// Top of the projected z range
    pub z_top: Option<f64>,

    /// Bottom of the projected z range
    pub z_bottom: Option<f64>,

    /// Partial tile index
    pub partial_tile_index: Option<u32>,

    /// Pixel file name, relative to the acquisition directory
    pub value: String,
}

/// Record of a plane the instrument failed to acquire
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorRecord {
    /// 1-based plate column
    pub column: u32,

    /// 1-based plate row
    pub row: u32,

    /// Field-of-view index within the well
    pub field_index: u32,

    /// Error text
    pub value: String,
}

/// Entry of `MeasurementData.mlf`
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementRecord {
    /// `Type="IMG"`
    Image(ImageRecord),
    /// `Type="ERR"`
    Error(ErrorRecord),
}

/// Parsed `MeasurementData.mlf`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementData {
    /// Document version
    pub version: String,

    /// All records in file order
    pub records: Vec<MeasurementRecord>,
}

impl MeasurementData {
    /// Image records in file order
    pub fn images(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter().filter_map(|record| match record {
            MeasurementRecord::Image(image) => Some(image),
            MeasurementRecord::Error(_) => None,
        })
    }

    /// Number of error records
    pub fn error_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| matches!(record, MeasurementRecord::Error(_)))
            .count()
    }
}

/// Per-channel camera settings from `MeasurementDetail.mrf`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementChannel {
    /// Channel number
    pub ch: u32,

    /// Pixel width (micrometers)
    pub horizontal_pixel_dimension: f64,

    /// Pixel height (micrometers)
    pub vertical_pixel_dimension: f64,

    /// Image width in pixels
    pub horizontal_pixels: u64,

    /// Image height in pixels
    pub vertical_pixels: u64,

    /// Camera bit depth
    pub input_bit_depth: Option<u32>,

    /// Objective magnification
    pub objective_magnification_ratio: Option<f64>,
}

/// Parsed `MeasurementDetail.mrf`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementDetail {
    /// Document version
    pub version: String,

    /// Measurement title
    pub title: Option<String>,

    /// Plate columns
    pub column_count: Option<u32>,

    /// Plate rows
    pub row_count: Option<u32>,

    /// Timepoints acquired
    pub time_point_count: Option<u32>,

    /// Fields per well
    pub field_count: Option<u32>,

    /// Planes per stack
    pub z_count: Option<u32>,

    /// Sample plate name
    pub plate_name: Option<String>,

    /// Channels in declared order; never empty once loaded
    pub channels: Vec<MeasurementChannel>,
}
