//! Subset of OME-XML written by Olympus ScanR
//!
//! Only what tile building needs is kept: pixel geometry, channel names,
//! the TiffData blocks pointing at the plane files and the stage positions
//! recorded per plane.

use crate::model::MeasureWithUnit;

/// OME `Channel`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OmeChannel {
    /// Channel id
    pub id: Option<String>,

    /// Channel name (fluorophore or filter set)
    pub name: Option<String>,
}

/// OME `TiffData` block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TiffData {
    /// First timepoint stored in the file
    pub first_t: u64,

    /// First channel stored in the file
    pub first_c: u64,

    /// First z plane stored in the file
    pub first_z: u64,

    /// File name from the nested `UUID` element
    pub file_name: Option<String>,
}

/// OME `Plane`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plane {
    /// Timepoint index
    pub the_t: u64,

    /// Channel index
    pub the_c: u64,

    /// Z index
    pub the_z: u64,

    /// Stage x position
    pub position_x: Option<f64>,

    /// Stage y position
    pub position_y: Option<f64>,

    /// Stage z position
    pub position_z: Option<f64>,
}

impl Plane {
    /// (t, c, z) lookup key
    pub fn key(&self) -> (u64, u64, u64) {
        (self.the_t, self.the_c, self.the_z)
    }
}

/// OME `Pixels`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pixels {
    /// Image width
    pub size_x: u64,

    /// Image height
    pub size_y: u64,

    /// Number of z planes
    pub size_z: Option<u64>,

    /// Number of channels
    pub size_c: Option<u64>,

    /// Number of timepoints
    pub size_t: Option<u64>,

    /// OME pixel type, e.g. "uint16"
    pub pixel_type: Option<String>,

    /// Physical pixel width
    pub physical_size_x: Option<MeasureWithUnit>,

    /// Physical pixel height
    pub physical_size_y: Option<MeasureWithUnit>,

    /// Channels in declared order
    pub channels: Vec<OmeChannel>,

    /// Plane file blocks
    pub tiff_data: Vec<TiffData>,

    /// Per-plane stage positions
    pub planes: Vec<Plane>,
}

impl Pixels {
    /// Channel names, only when every channel has one
    pub fn channel_names(&self) -> Option<Vec<&str>> {
        if self.channels.is_empty() {
            return None;
        }
        self.channels.iter().map(|c| c.name.as_deref()).collect()
    }
}

/// OME `Image`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OmeImage {
    /// Image id, e.g. "Image:W1P2"
    pub id: String,

    /// Image name
    pub name: Option<String>,

    /// Pixel description
    pub pixels: Pixels,
}

/// Parsed `metadata.ome.xml`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OmeMetadata {
    /// Images in document order
    pub images: Vec<OmeImage>,
}
