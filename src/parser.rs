//! Shared parsing pipeline.
//!
//! Each vendor implements [`AcquisitionParser::build_tiles`]; everything
//! around it (option validation, the aggregation hand-off and the
//! cross-acquisition loop in [`parse_acquisitions`]) lives here.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregation::TileAggregator;
use crate::condition::{attributes_from_condition_table, ConditionTable};
use crate::error::{ConfigurationError, Result};
use crate::geometry::GroupGeometry;
use crate::logging::RunLogger;
use crate::model::{AcquisitionModel, AcquisitionOptions, ImageInPlate, Tile, TileStack, TiledImage, WellKey};

/// Group records by key, keeping keys and records in first-seen order
pub fn group_records<T, K, F>(records: impl IntoIterator<Item = T>, mut key: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for record in records {
        let k = key(&record);
        match index.get(&k) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![record]));
            }
        }
    }
    groups
}

/// Per-acquisition state needed to turn a record group into a [`TileStack`]
pub struct StackBuilder<'a> {
    plate_name: String,
    acquisition_id: u32,
    options: &'a AcquisitionOptions,
    table: Option<ConditionTable>,
    log: &'a RunLogger,
}

impl<'a> StackBuilder<'a> {
    /// Load the condition table of `acquisition`, if any
    pub fn new<A: AcquisitionModel>(acquisition: &'a A, log: &'a RunLogger) -> Result<Self> {
        let options = acquisition.advanced();
        Ok(Self {
            plate_name: acquisition.plate_name(),
            acquisition_id: acquisition.acquisition_id(),
            options,
            table: options.condition_table()?,
            log,
        })
    }

    /// Plate name, suffixed with the key's tag when it has one
    pub fn plate_name(&self, key: &WellKey) -> String {
        match &key.tag {
            Some(tag) => format!("{}_{}", self.plate_name, tag),
            None => self.plate_name.clone(),
        }
    }

    /// Stack for one group: attributes resolved, overrides applied
    pub fn stack(
        &self,
        key: &WellKey,
        length_x: u64,
        length_y: u64,
        geometry: GroupGeometry,
    ) -> Result<TileStack> {
        let attributes = attributes_from_condition_table(
            self.table.as_ref(),
            &key.row,
            key.column,
            self.acquisition_id,
            self.log,
        )?;
        let details = self
            .options
            .update_acquisition_details(geometry.into_details());
        Ok(TileStack {
            fov_name: key.fov_name(),
            collection: ImageInPlate {
                plate_name: self.plate_name(key),
                row: key.row.clone(),
                column: key.column,
                acquisition: self.acquisition_id,
            },
            length_x,
            length_y,
            acquisition_details: Arc::new(details),
            attributes: Arc::new(attributes),
        })
    }
}

/// One vendor's metadata-to-tiles conversion
pub trait AcquisitionParser {
    /// Vendor acquisition model
    type Acquisition: AcquisitionModel;

    /// Vendor name used in log messages
    fn vendor(&self) -> &'static str;

    /// Read the vendor metadata and build every tile of the acquisition
    fn build_tiles(&self, acquisition: &Self::Acquisition, log: &RunLogger) -> Result<Vec<Tile>>;

    /// Build the tiles and hand them to `aggregator`
    fn parse(
        &self,
        acquisition: &Self::Acquisition,
        aggregator: &dyn TileAggregator,
        log: &RunLogger,
    ) -> Result<Vec<TiledImage>> {
        acquisition.advanced().validate()?;
        let tiles = self.build_tiles(acquisition, log)?;
        log.info(format_args!(
            "Built {} {} tiles from {}",
            tiles.len(),
            self.vendor(),
            acquisition.path()
        ));
        aggregator.aggregate(tiles, &acquisition.advanced().filters)
    }
}

/// What the driver does when one acquisition fails to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnAcquisitionError {
    /// Return the first error
    #[default]
    Abort,
    /// Log the error as a warning and continue with the next acquisition
    Skip,
}

/// Parse every acquisition and concatenate the tiled images.
///
/// Acquisitions are processed in order. One that yields no image is logged
/// and skipped; the run fails only when the list is empty or nothing at all
/// was found.
pub fn parse_acquisitions<P: AcquisitionParser>(
    parser: &P,
    acquisitions: &[P::Acquisition],
    aggregator: &dyn TileAggregator,
    policy: OnAcquisitionError,
    log: &RunLogger,
) -> Result<Vec<TiledImage>> {
    if acquisitions.is_empty() {
        return Err(ConfigurationError::EmptyAcquisitionList.into());
    }

    let mut images = Vec::new();
    for acquisition in acquisitions {
        let parsed = match parser.parse(acquisition, aggregator, log) {
            Ok(parsed) => parsed,
            Err(e) if policy == OnAcquisitionError::Skip => {
                log.warn(format_args!(
                    "Skipping acquisition {}: {e}",
                    acquisition.path()
                ));
                continue;
            }
            Err(e) => return Err(e),
        };
        if parsed.is_empty() {
            log.warn(format_args!("No images found in {}", acquisition.path()));
            continue;
        }
        log.info(format_args!(
            "Found {} images in {}",
            parsed.len(),
            acquisition.path()
        ));
        images.extend(parsed);
    }

    if images.is_empty() {
        return Err(ConfigurationError::NoImagesFound.into());
    }
    log.info(format_args!(
        "Parsed {} images from {} acquisitions",
        images.len(),
        acquisitions.len()
    ));
    Ok(images)
}
