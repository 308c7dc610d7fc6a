//! # Vendor-agnostic model
//!
//! Types shared by every vendor parser:
//!
//! - **Acquisition models**: user input describing one acquisition directory
//!   ([`AcquisitionInput`], [`AcquisitionModel`], [`AcquisitionOptions`])
//! - **Plate geometry**: row names, plate layouts and the grouping key
//!   ([`PlateLayout`], [`WellKey`])
//! - **Units**: physical quantities reported by the instruments ([`MeasureWithUnit`])
//! - **Resolved geometry**: the per-stack descriptor shared by all of its tiles
//!   ([`AcquisitionDetails`])
//! - **Tiles**: one plane each, handed to the aggregation step ([`Tile`], [`TiledImage`])

mod acquisition;
mod details;
mod plate;
mod tile;
mod units;


pub use acquisition::{AcquisitionInput, AcquisitionModel, AcquisitionOptions};
pub use details::{
    AcquisitionDetails, Axis, AxisCoordinates, ChannelInfo, CoordinateSystem, DataType,
};
pub use plate::{parse_well_id, row_name, PlateLayout, WellKey, STANDARD_ROW_NAMES};
pub use tile::{AttributeValue, Attributes, ImageInPlate, Tile, TileStack, TiledImage};
pub use units::{to_micrometers, MeasureWithUnit};
