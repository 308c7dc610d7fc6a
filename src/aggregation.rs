//! Hand-off from built tiles to output images.
//!
//! Vendor parsers only produce flat tile lists. A [`TileAggregator`] turns
//! them into [`TiledImage`]s after applying the acquisition's
//! [`TileFilter`]s. [`CollectionAggregator`] is the default: it groups by
//! plate, row, column and acquisition in first-seen order.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::model::{parse_well_id, ImageInPlate, Tile, TiledImage};

/// Post-processing filter applied to the tiles of one acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TileFilter {
    /// Drop every tile of the listed wells ("A01", "B3", ...)
    Well {
        /// Well ids to remove
        wells_to_remove: Vec<String>,
    },
    /// Keep only tiles whose source path matches
    RegexInclude {
        /// Pattern searched in the source path
        regex: String,
    },
    /// Drop tiles whose source path matches
    RegexExclude {
        /// Pattern searched in the source path
        regex: String,
    },
}

impl TileFilter {
    /// Check well ids and regular expressions
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.compile().map(|_| ())
    }

    fn compile(&self) -> Result<CompiledFilter, ConfigurationError> {
        match self {
            TileFilter::Well { wells_to_remove } => {
                let wells = wells_to_remove
                    .iter()
                    .map(|well| {
                        parse_well_id(well).ok_or_else(|| {
                            ConfigurationError::InvalidAcquisition(format!(
                                "invalid well id '{well}' in well filter"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledFilter::Wells(wells))
            }
            TileFilter::RegexInclude { regex } => compile_regex(regex).map(CompiledFilter::Include),
            TileFilter::RegexExclude { regex } => compile_regex(regex).map(CompiledFilter::Exclude),
        }
    }
}

fn compile_regex(pattern: &str) -> Result<Regex, ConfigurationError> {
    Regex::new(pattern).map_err(|e| ConfigurationError::InvalidFilter {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

enum CompiledFilter {
    Wells(Vec<(String, u32)>),
    Include(Regex),
    Exclude(Regex),
}

impl CompiledFilter {
    fn keeps(&self, tile: &Tile) -> bool {
        match self {
            CompiledFilter::Wells(wells) => !wells
                .iter()
                .any(|(row, column)| *row == tile.collection.row && *column == tile.collection.column),
            CompiledFilter::Include(regex) => regex.is_match(&tile.source_path.to_string_lossy()),
            CompiledFilter::Exclude(regex) => !regex.is_match(&tile.source_path.to_string_lossy()),
        }
    }
}

/// Groups filtered tiles into output images
pub trait TileAggregator {
    /// Filter `tiles` and group the survivors into images
    fn aggregate(&self, tiles: Vec<Tile>, filters: &[TileFilter]) -> Result<Vec<TiledImage>>;
}

/// One image per distinct [`ImageInPlate`], in the order the images first
/// appear in the tile list. Tiles keep their relative order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionAggregator;

impl TileAggregator for CollectionAggregator {
    fn aggregate(&self, tiles: Vec<Tile>, filters: &[TileFilter]) -> Result<Vec<TiledImage>> {
        let compiled = filters
            .iter()
            .map(TileFilter::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let mut index: HashMap<ImageInPlate, usize> = HashMap::new();
        let mut images: Vec<TiledImage> = Vec::new();

        for tile in tiles {
            if !compiled.iter().all(|filter| filter.keeps(&tile)) {
                continue;
            }
            let slot = *index.entry(tile.collection.clone()).or_insert_with(|| {
                images.push(TiledImage {
                    collection: tile.collection.clone(),
                    tiles: Vec::new(),
                });
                images.len() - 1
            });
            images[slot].tiles.push(tile);
        }

        Ok(images)
    }
}
