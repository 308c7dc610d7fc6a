//! # PerkinElmer Operetta / Harmony
//!
//! Harmony exports put `Index.idx.xml` inside the `Images` directory along
//! with the plane files it lists. Every `Image` entry describes one plane
//! and carries its well, field, plane, channel and timepoint ids as well as
//! stage positions with explicit units.

mod loader;
mod models;


use std::path::Path;

use serde::{Deserialize, Serialize};

pub use loader::{load_index, parse_index};
pub use models::OperettaImage;

use crate::error::{MetadataParseError, ParseErrorKind, Result};
use crate::geometry::{
    channels_by_id, data_type_for_max_intensity, is_time_series, resolve_pixel_size, z_spacing,
    GroupGeometry,
};
use crate::logging::RunLogger;
use crate::model::{AcquisitionInput, AcquisitionModel, Tile, WellKey};
use crate::parser::{group_records, AcquisitionParser, StackBuilder};

/// Directory holding the index and the plane files
pub const IMAGES_DIR: &str = "Images";

/// Index file name inside [`IMAGES_DIR`]
pub const INDEX_FILE: &str = "Index.idx.xml";

impl From<AcquisitionInput> for OperettaAcquisition {
    fn from(input: AcquisitionInput) -> Self {
        OperettaAcquisition::new(input)
    }
}

/// Operetta acquisition directory.
///
/// A path ending in `Images` is accepted and resolves to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AcquisitionInput")]
pub struct OperettaAcquisition {
    #[serde(flatten)]
    input: AcquisitionInput,
}

impl OperettaAcquisition {
    /// New acquisition; a trailing `Images` directory is dropped from the path
    pub fn new(input: AcquisitionInput) -> Self {
        Self {
            input: input.strip_path_segment(IMAGES_DIR),
        }
    }
}

impl AcquisitionModel for OperettaAcquisition {
    fn input(&self) -> &AcquisitionInput {
        &self.input
    }
}

/// Parser for Operetta acquisitions
#[derive(Debug, Clone, Copy, Default)]
pub struct OperettaParser;

impl OperettaParser {
    fn geometry(
        images: &[&OperettaImage],
        index_path: &Path,
        log: &RunLogger,
    ) -> Result<GroupGeometry> {
        let first = images[0];
        let size_x = first.resolution_x.to_um()?;
        let size_y = first.resolution_y.to_um()?;
        let positions_z = images
            .iter()
            .map(|image| image.position_z.to_um())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let max_intensity = images.iter().map(|image| image.max_intensity).max().unwrap_or(0);

        Ok(GroupGeometry {
            pixelsize: resolve_pixel_size("ImageResolutionX", size_x, size_y, log)
                .map_err(|kind| MetadataParseError::new(index_path, kind))?,
            z_spacing: z_spacing(positions_z, log),
            is_time_series: is_time_series(images.iter().map(|image| image.timepoint_id)),
            channels: Some(channels_by_id(images.iter().map(|image| {
                (u64::from(image.channel_id), image.channel_name.as_str())
            }))),
            data_type: Some(data_type_for_max_intensity(max_intensity)),
        })
    }
}

impl AcquisitionParser for OperettaParser {
    type Acquisition = OperettaAcquisition;

    fn vendor(&self) -> &'static str {
        "Operetta"
    }

    fn build_tiles(&self, acquisition: &OperettaAcquisition, log: &RunLogger) -> Result<Vec<Tile>> {
        let images_dir = Path::new(acquisition.path()).join(IMAGES_DIR);
        let index_path = images_dir.join(INDEX_FILE);
        let images = load_index(&index_path)?;
        if images.is_empty() {
            return Err(MetadataParseError::new(&index_path, ParseErrorKind::NoRecords).into());
        }

        let builder = StackBuilder::new(acquisition, log)?;
        let mut tiles = Vec::new();
        let groups = group_records(&images, |image| {
            WellKey::new(image.row.clone(), image.column, image.field_id)
        });
        for (key, group) in groups {
            // groups are never empty
            let first = group[0];
            let stack = builder.stack(
                &key,
                first.image_size_x,
                first.image_size_y,
                Self::geometry(&group, &index_path, log)?,
            )?;
            log.debug(format_args!(
                "{} {} ({}): {} planes",
                stack.collection.path(),
                stack.fov_name,
                first.image_id(),
                group.len()
            ));

            for image in group {
                tiles.push(stack.tile(
                    image.position_x.to_um()?,
                    image.position_y.to_um()?,
                    u64::from(image.plane_id - 1),
                    u64::from(image.channel_id - 1),
                    u64::from(image.timepoint_id),
                    images_dir.join(&image.url),
                ));
            }
        }

        Ok(tiles)
    }
}
