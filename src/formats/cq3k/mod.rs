//! # Yokogawa CellVoyager CQ3K
//!
//! An acquisition directory holds `MeasurementData.mlf` (one record per
//! acquired plane) and `MeasurementDetail.mrf` (plate and channel settings)
//! next to the TIFF planes. Records are grouped by z projection type, well
//! and field; a projection type such as `MIP` becomes its own plate
//! (`<plate>_MIP`).
//!
//! `TimePoint`, `ZIndex` and `Ch` are 1-based in the vendor files (zero is
//! rejected by the loader) and are shifted to 0-based tile starts.

mod loader;
mod models;


use std::path::Path;

use serde::{Deserialize, Serialize};

pub use loader::{
    load_measurement_data, load_measurement_detail, parse_measurement_data,
    parse_measurement_detail, SUPPORTED_VERSION,
};
pub use models::{
    ErrorRecord, ImageRecord, MeasurementChannel, MeasurementData, MeasurementDetail,
    MeasurementRecord,
};

use crate::error::{MetadataParseError, ParseErrorKind, Result};
use crate::geometry::{is_time_series, resolve_pixel_size, z_spacing, GroupGeometry};
use crate::logging::RunLogger;
use crate::model::{row_name, AcquisitionInput, AcquisitionModel, Tile, WellKey};
use crate::parser::{group_records, AcquisitionParser, StackBuilder};

/// Measurement record file name
pub const MEASUREMENT_DATA_FILE: &str = "MeasurementData.mlf";

/// Measurement detail file name
pub const MEASUREMENT_DETAIL_FILE: &str = "MeasurementDetail.mrf";

/// CQ3K acquisition directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cq3kAcquisition {
    input: AcquisitionInput,
}

impl Cq3kAcquisition {
    /// Wrap a vendor-independent acquisition description
    pub fn new(input: AcquisitionInput) -> Self {
        Self { input }
    }
}

impl AcquisitionModel for Cq3kAcquisition {
    fn input(&self) -> &AcquisitionInput {
        &self.input
    }
}

/// Grouping key of one image record
fn record_key(record: &ImageRecord) -> std::result::Result<WellKey, ParseErrorKind> {
    let row = row_name(record.row)
        .ok_or_else(|| ParseErrorKind::invalid("Row", record.row.to_string()))?;
    Ok(WellKey::new(row, record.column, record.field_index)
        .with_tag(record.z_image_processing.clone()))
}

/// Parser for CQ3K acquisitions
#[derive(Debug, Clone, Copy, Default)]
pub struct Cq3kParser;

impl AcquisitionParser for Cq3kParser {
    type Acquisition = Cq3kAcquisition;

    fn vendor(&self) -> &'static str {
        "CQ3K"
    }

    fn build_tiles(&self, acquisition: &Cq3kAcquisition, log: &RunLogger) -> Result<Vec<Tile>> {
        let root = Path::new(acquisition.path());
        let data_path = root.join(MEASUREMENT_DATA_FILE);
        let data = load_measurement_data(&data_path)?;
        let detail_path = root.join(MEASUREMENT_DETAIL_FILE);
        let detail = load_measurement_detail(&detail_path)?;

        if data.records.is_empty() {
            return Err(MetadataParseError::new(&data_path, ParseErrorKind::NoRecords).into());
        }
        let errors = data.error_count();
        if errors > 0 {
            log.debug(format_args!(
                "Ignoring {errors} error records in {}",
                data_path.display()
            ));
        }

        let mut keyed = Vec::new();
        for record in data.images() {
            let key = record_key(record).map_err(|kind| MetadataParseError::new(&data_path, kind))?;
            keyed.push((key, record));
        }

        // loader guarantees at least one channel
        let Some(channel) = detail.channels.first() else {
            return Err(MetadataParseError::new(
                &detail_path,
                ParseErrorKind::MissingElement("MeasurementChannel".to_string()),
            )
            .into());
        };

        let pixelsize = resolve_pixel_size(
            "HorizontalPixelDimension",
            channel.horizontal_pixel_dimension,
            channel.vertical_pixel_dimension,
            log,
        )
        .map_err(|kind| MetadataParseError::new(&detail_path, kind))?;

        let builder = StackBuilder::new(acquisition, log)?;
        let mut tiles = Vec::new();
        for (key, group) in group_records(keyed, |(key, _)| key.clone()) {
            let records: Vec<&ImageRecord> = group.into_iter().map(|(_, record)| record).collect();
            let geometry = GroupGeometry {
                pixelsize,
                z_spacing: z_spacing(records.iter().map(|r| r.z), log),
                is_time_series: is_time_series(records.iter().map(|r| r.time_point)),
                channels: None,
                data_type: None,
            };
            let stack = builder.stack(
                &key,
                channel.horizontal_pixels,
                channel.vertical_pixels,
                geometry,
            )?;
            log.debug(format_args!(
                "{} {}: {} planes",
                stack.collection.path(),
                stack.fov_name,
                records.len()
            ));

            for record in records {
                tiles.push(stack.tile(
                    record.x,
                    record.y,
                    u64::from(record.z_index - 1),
                    u64::from(record.ch - 1),
                    u64::from(record.time_point - 1),
                    root.join(&record.value),
                ));
            }
        }

        Ok(tiles)
    }
}
