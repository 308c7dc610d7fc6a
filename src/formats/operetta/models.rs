//! Data models for Harmony `Index.idx.xml` image entries

use crate::model::MeasureWithUnit;

/// One `EvaluationInputData/Images/Image` entry
#[derive(Debug, Clone, PartialEq)]
pub struct OperettaImage {
    /// Plane file, relative to the `Images` directory
    pub url: String,

    /// Row letter; numeric rows 1..=26 are converted on load
    pub row: String,

    /// 1-based plate column
    pub column: u32,

    /// Field-of-view id
    pub field_id: u32,

    /// 1-based z plane id
    pub plane_id: u32,

    /// 1-based channel id
    pub channel_id: u32,

    /// 0-based timepoint id
    pub timepoint_id: u32,

    /// Channel name
    pub channel_name: String,

    /// Pixel width
    pub resolution_x: MeasureWithUnit,

    /// Pixel height
    pub resolution_y: MeasureWithUnit,

    /// Image width in pixels
    pub image_size_x: u64,

    /// Image height in pixels
    pub image_size_y: u64,

    /// Brightest pixel value of the plane
    pub max_intensity: u64,

    /// Stage x position
    pub position_x: MeasureWithUnit,

    /// Stage y position
    pub position_y: MeasureWithUnit,

    /// Stage z position relative to the focus reference
    pub position_z: MeasureWithUnit,

    /// Absolute stage z position
    pub abs_position_z: Option<MeasureWithUnit>,
}

impl OperettaImage {
    /// Well id such as "A01"
    pub fn well_id(&self) -> String {
        format!("{}{:02}", self.row, self.column)
    }

    /// Well and field, e.g. "A01_FOV3"
    pub fn image_id(&self) -> String {
        format!("{}_FOV{}", self.well_id(), self.field_id)
    }
}
