//! # Olympus ScanR
//!
//! ScanR writes an OME-XML document, `data/metadata.ome.xml`, next to one
//! TIFF file per plane. Each OME `Image` is one field of view; its id carries
//! the well and position numbers (`W<well>P<position>`), and the well number
//! is turned into a row letter and column through the plate layout.

mod loader;
mod models;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use loader::{load_ome_metadata, parse_ome_metadata};
pub use models::{OmeChannel, OmeImage, OmeMetadata, Pixels, Plane, TiffData};

use crate::error::{MetadataParseError, ParseErrorKind, Result};
use crate::geometry::{is_time_series, resolve_pixel_size, z_spacing, GroupGeometry};
use crate::logging::RunLogger;
use crate::model::{
    AcquisitionInput, AcquisitionModel, ChannelInfo, DataType, MeasureWithUnit, PlateLayout, Tile,
    WellKey,
};
use crate::parser::{AcquisitionParser, StackBuilder};

/// Directory holding the metadata and the plane files
pub const DATA_DIR: &str = "data";

/// OME-XML file name inside [`DATA_DIR`]
pub const METADATA_FILE: &str = "metadata.ome.xml";

fn well_position_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"W(\d+)P(\d+)").expect("valid well position regex"))
}

/// Well and position numbers from an image id such as "Image:W12P3"
pub fn well_position_ids(image_id: &str) -> Option<(u32, u32)> {
    let captures = well_position_pattern().captures(image_id)?;
    let well = captures.get(1)?.as_str().parse().ok()?;
    let position = captures.get(2)?.as_str().parse().ok()?;
    Some((well, position))
}

/// Data type for an OME pixel type name
fn data_type(pixel_type: &str) -> Option<DataType> {
    match pixel_type {
        "uint8" => Some(DataType::Uint8),
        "uint16" => Some(DataType::Uint16),
        "uint32" => Some(DataType::Uint32),
        _ => None,
    }
}

#[derive(Deserialize)]
struct ScanRAcquisitionDef {
    #[serde(flatten)]
    input: AcquisitionInput,
    #[serde(default)]
    layout: PlateLayout,
}

impl From<ScanRAcquisitionDef> for ScanRAcquisition {
    fn from(def: ScanRAcquisitionDef) -> Self {
        ScanRAcquisition::new(def.input, def.layout)
    }
}

/// ScanR acquisition directory.
///
/// The path may point at the acquisition itself or at its `data`
/// sub-directory; both resolve to the acquisition directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScanRAcquisitionDef")]
pub struct ScanRAcquisition {
    #[serde(flatten)]
    input: AcquisitionInput,
    layout: PlateLayout,
}

impl ScanRAcquisition {
    /// New acquisition; a trailing `data` directory is dropped from the path
    pub fn new(input: AcquisitionInput, layout: PlateLayout) -> Self {
        Self {
            input: input.strip_path_segment(DATA_DIR),
            layout,
        }
    }

    /// Plate layout used to decode well numbers
    pub fn layout(&self) -> PlateLayout {
        self.layout
    }
}

impl AcquisitionModel for ScanRAcquisition {
    fn input(&self) -> &AcquisitionInput {
        &self.input
    }
}

/// Pair every plane with the file of the TiffData block for the same
/// (t, c, z). Repeated planes are kept once.
fn match_planes(pixels: &Pixels) -> std::result::Result<Vec<(&Plane, &str)>, ParseErrorKind> {
    let files: HashMap<(u64, u64, u64), &TiffData> = pixels
        .tiff_data
        .iter()
        .map(|block| ((block.first_t, block.first_c, block.first_z), block))
        .collect();

    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for plane in &pixels.planes {
        if !seen.insert(plane.key()) {
            continue;
        }
        let (t, c, z) = plane.key();
        let block = files
            .get(&plane.key())
            .ok_or(ParseErrorKind::UnmatchedPlane { t, c, z })?;
        let file = block
            .file_name
            .as_deref()
            .ok_or_else(|| ParseErrorKind::MissingAttribute("UUID FileName".to_string()))?;
        matched.push((plane, file));
    }
    Ok(matched)
}

fn physical_size_um(size: Option<&MeasureWithUnit>) -> Result<f64> {
    Ok(size.map(MeasureWithUnit::to_um).transpose()?.unwrap_or(1.0))
}

/// Parser for ScanR acquisitions
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanRParser;

impl AcquisitionParser for ScanRParser {
    type Acquisition = ScanRAcquisition;

    fn vendor(&self) -> &'static str {
        "ScanR"
    }

    fn build_tiles(&self, acquisition: &ScanRAcquisition, log: &RunLogger) -> Result<Vec<Tile>> {
        let data_dir = Path::new(acquisition.path()).join(DATA_DIR);
        let metadata_path = data_dir.join(METADATA_FILE);
        let metadata = load_ome_metadata(&metadata_path)?;
        if metadata.images.is_empty() {
            return Err(MetadataParseError::new(&metadata_path, ParseErrorKind::NoRecords).into());
        }
        let invalid = |kind: ParseErrorKind| MetadataParseError::new(&metadata_path, kind);

        let builder = StackBuilder::new(acquisition, log)?;
        let mut tiles = Vec::new();
        for image in &metadata.images {
            let (well, position) = well_position_ids(&image.id)
                .ok_or_else(|| invalid(ParseErrorKind::invalid("Image ID", image.id.as_str())))?;
            let (row, column) = acquisition.layout().well_position(well)?;
            let key = WellKey::new(row, column, position);

            let pixels = &image.pixels;
            let planes = match_planes(pixels).map_err(invalid)?;

            let size_x = physical_size_um(pixels.physical_size_x.as_ref())?;
            let size_y = physical_size_um(pixels.physical_size_y.as_ref())?;
            let geometry = GroupGeometry {
                pixelsize: resolve_pixel_size("PhysicalSizeX", size_x, size_y, log)
                    .map_err(invalid)?,
                z_spacing: z_spacing(
                    pixels
                        .planes
                        .iter()
                        .filter(|p| p.the_t == 0 && p.the_c == 0)
                        .filter_map(|p| p.position_z),
                    log,
                ),
                is_time_series: is_time_series(pixels.planes.iter().map(|p| p.the_t)),
                channels: pixels
                    .channel_names()
                    .map(|names| names.into_iter().map(ChannelInfo::new).collect()),
                data_type: pixels.pixel_type.as_deref().and_then(data_type),
            };
            let stack = builder.stack(&key, pixels.size_x, pixels.size_y, geometry)?;
            log.debug(format_args!(
                "{} {} ({}): {} planes",
                stack.collection.path(),
                stack.fov_name,
                image.id,
                planes.len()
            ));

            for (plane, file) in planes {
                tiles.push(stack.tile(
                    plane.position_x.unwrap_or(0.0),
                    plane.position_y.unwrap_or(0.0),
                    plane.the_z,
                    plane.the_c,
                    plane.the_t,
                    data_dir.join(file),
                ));
            }
        }

        Ok(tiles)
    }
}
