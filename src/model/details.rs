use serde::{Deserialize, Serialize};

/// Image axis in the order images are stored downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Time
    T,
    /// Channel
    C,
    /// Depth
    Z,
    /// Rows
    Y,
    /// Columns
    X,
}

impl Axis {
    /// Single-letter axis name
    pub fn name(&self) -> &'static str {
        match self {
            Axis::T => "t",
            Axis::C => "c",
            Axis::Z => "z",
            Axis::Y => "y",
            Axis::X => "x",
        }
    }
}

/// How a tile coordinate is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    /// Physical stage units (micrometers)
    World,
    /// Pixel or plane index
    Pixel,
}

/// Coordinate system of each tile start/length.
///
/// All three vendors report x/y starts as stage positions and everything else
/// as pixels or indices, which is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCoordinates {
    /// Start along x
    pub start_x: CoordinateSystem,
    /// Length along x
    pub length_x: CoordinateSystem,
    /// Start along y
    pub start_y: CoordinateSystem,
    /// Length along y
    pub length_y: CoordinateSystem,
    /// Start along z
    pub start_z: CoordinateSystem,
    /// Length along z
    pub length_z: CoordinateSystem,
    /// Start along t
    pub start_t: CoordinateSystem,
    /// Length along t
    pub length_t: CoordinateSystem,
}

impl Default for AxisCoordinates {
    fn default() -> Self {
        Self {
            start_x: CoordinateSystem::World,
            length_x: CoordinateSystem::Pixel,
            start_y: CoordinateSystem::World,
            length_y: CoordinateSystem::Pixel,
            start_z: CoordinateSystem::Pixel,
            length_z: CoordinateSystem::Pixel,
            start_t: CoordinateSystem::Pixel,
            length_t: CoordinateSystem::Pixel,
        }
    }
}

/// Channel description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Human readable label, e.g. "DAPI"
    pub channel_label: String,
}

impl ChannelInfo {
    /// Channel with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            channel_label: label.into(),
        }
    }
}

/// Pixel data type of the stored images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 8-bit unsigned
    Uint8,
    /// 16-bit unsigned
    Uint16,
    /// 32-bit unsigned
    Uint32,
}

/// Geometry and channel descriptor shared by every tile of one stack.
///
/// Built once per field-of-view group from that group's records only, then
/// shared by reference (`Arc`) across its tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionDetails {
    /// Physical pixel size in micrometers (x and y)
    pub pixelsize: f64,
    /// Distance between z planes in micrometers
    pub z_spacing: f64,
    /// Distance between timepoints
    pub t_spacing: f64,
    /// Channel list, when the vendor metadata names the channels
    pub channels: Option<Vec<ChannelInfo>>,
    /// Axis order; includes `t` only for time series
    pub axes: Vec<Axis>,
    /// Coordinate system of tile starts and lengths
    pub coordinates: AxisCoordinates,
    /// Pixel data type, when it can be inferred
    pub data_type: Option<DataType>,
}

impl AcquisitionDetails {
    /// Whether the axis order includes time
    pub fn is_time_series(&self) -> bool {
        self.axes.contains(&Axis::T)
    }

    /// Axis names joined, e.g. "czyx"
    pub fn axes_string(&self) -> String {
        self.axes.iter().map(Axis::name).collect()
    }
}
