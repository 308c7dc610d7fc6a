//! # hcs-converters - High-Content Screening Metadata Normalization
//!
//! `hcs_converters` reads the metadata that high-content screening
//! microscopes write next to their image planes and turns it into a flat list
//! of [`Tile`](model::Tile) descriptors: one per acquired plane, carrying the
//! stage position, zero-based z/channel/time indices, the owning well and
//! field of view, the resolved physical geometry and the experimental
//! conditions of the well.
//!
//! ## Supported Instruments
//!
//! - **Yokogawa CellVoyager CQ3K**: `MeasurementData.mlf` + `MeasurementDetail.mrf`
//! - **Olympus ScanR**: OME-XML in `data/metadata.ome.xml`
//! - **PerkinElmer Operetta / Harmony**: `Images/Index.idx.xml`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hcs_converters::prelude::*;
//!
//! let log = RunLogger::default();
//! let acquisitions = vec![Cq3kAcquisition::new(
//!     AcquisitionInput::new("/data/cq3k/plate_1").with_plate_name(Some("plate_1".into())),
//! )];
//!
//! let images = parse_acquisitions(
//!     &Cq3kParser,
//!     &acquisitions,
//!     &CollectionAggregator,
//!     OnAcquisitionError::Abort,
//!     &log,
//! )?;
//!
//! for image in &images {
//!     println!("{}: {} tiles", image.path(), image.tiles.len());
//! }
//! # Ok::<(), hcs_converters::error::ConvertError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`model`]: acquisition models, plate geometry, units, tiles
//! - [`formats`]: one parser per vendor
//! - [`parser`]: the [`AcquisitionParser`](parser::AcquisitionParser) trait,
//!   record grouping and the cross-acquisition driver
//! - [`geometry`]: z spacing, pixel size, data type and axes inference
//! - [`condition`]: condition-table loading and per-well attribute lookup
//! - [`aggregation`]: tile filters and grouping into tiled images
//! - [`logging`]: the per-run [`RunLogger`](logging::RunLogger)
//! - [`error`]: error types
//!
//! ## Coordinates
//!
//! Stage positions are in micrometers. Instruments report y pointing up,
//! images put the origin in the top-left corner, so every tile carries the
//! negated stage y.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod aggregation;
pub mod condition;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod parser;

mod xml;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregation::{CollectionAggregator, TileAggregator, TileFilter};
    pub use crate::condition::{attributes_from_condition_table, ConditionTable};
    pub use crate::error::{
        ConfigurationError, ConvertError, MetadataParseError, ParseErrorKind, Result,
    };
    pub use crate::formats::cq3k::{Cq3kAcquisition, Cq3kParser};
    pub use crate::formats::operetta::{OperettaAcquisition, OperettaParser};
    pub use crate::formats::scanr::{ScanRAcquisition, ScanRParser};
    pub use crate::logging::RunLogger;
    pub use crate::model::{
        AcquisitionDetails, AcquisitionInput, AcquisitionModel, AcquisitionOptions,
        AttributeValue, Attributes, Axis, ChannelInfo, DataType, ImageInPlate, MeasureWithUnit,
        PlateLayout, Tile, TiledImage,
    };
    pub use crate::parser::{parse_acquisitions, AcquisitionParser, OnAcquisitionError};
}
