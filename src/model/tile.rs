use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::details::AcquisitionDetails;

/// Condition-table attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Missing or placeholder value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Free text
    String(String),
}

impl AttributeValue {
    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Int(_) => "int",
            AttributeValue::Float(_) => "float",
            AttributeValue::String(_) => "str",
        }
    }

    /// Whether the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// String content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => f.write_str("null"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(i) => write!(f, "{i}"),
            AttributeValue::Float(x) => write!(f, "{x}"),
            AttributeValue::String(s) => f.write_str(s),
        }
    }
}

/// Attribute name to value mapping attached to every tile of a well
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Identity of the image a tile belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageInPlate {
    /// Plate name (CQ3K appends the z processing type)
    pub plate_name: String,
    /// Row letter
    pub row: String,
    /// 1-based column
    pub column: u32,
    /// Acquisition id
    pub acquisition: u32,
}

impl ImageInPlate {
    /// Relative image path inside the output store
    pub fn path(&self) -> String {
        format!(
            "{}.zarr/{}/{}/{}",
            self.plate_name, self.row, self.column, self.acquisition
        )
    }

    /// Well id such as "B03"
    pub fn well_id(&self) -> String {
        format!("{}{:02}", self.row, self.column)
    }
}

/// One image plane at one stage position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// Field-of-view name
    pub fov_name: String,
    /// Stage x position (micrometers)
    pub start_x: f64,
    /// Width in pixels
    pub length_x: u64,
    /// Stage y position, flipped to image-space convention (micrometers)
    pub start_y: f64,
    /// Height in pixels
    pub length_y: u64,
    /// Zero-based z index
    pub start_z: u64,
    /// Planes along z
    pub length_z: u64,
    /// Zero-based channel index
    pub start_c: u64,
    /// Channels covered
    pub length_c: u64,
    /// Zero-based timepoint index
    pub start_t: u64,
    /// Timepoints covered
    pub length_t: u64,
    /// Image the tile belongs to
    pub collection: ImageInPlate,
    /// Pixel file holding the plane
    pub source_path: PathBuf,
    /// Resolved geometry shared by the whole stack
    pub acquisition_details: Arc<AcquisitionDetails>,
    /// Condition-table attributes of the well
    pub attributes: Arc<Attributes>,
}

/// Everything the tiles of one field-of-view stack have in common.
///
/// Vendor parsers fill one of these per group and stamp out tiles with
/// [`TileStack::tile`], which is where the y axis gets flipped.
#[derive(Debug, Clone)]
pub struct TileStack {
    /// Field-of-view name
    pub fov_name: String,
    /// Image the stack belongs to
    pub collection: ImageInPlate,
    /// Width in pixels
    pub length_x: u64,
    /// Height in pixels
    pub length_y: u64,
    /// Shared descriptor
    pub acquisition_details: Arc<AcquisitionDetails>,
    /// Shared attributes
    pub attributes: Arc<Attributes>,
}

impl TileStack {
    /// Single-plane tile from a raw stage position and zero-based indices.
    ///
    /// Vendor stages use cartesian coordinates (y up) while images put the
    /// origin in the top-left corner, so `stage_y` is negated.
    pub fn tile(
        &self,
        stage_x: f64,
        stage_y: f64,
        z: u64,
        c: u64,
        t: u64,
        source_path: PathBuf,
    ) -> Tile {
        Tile {
            fov_name: self.fov_name.clone(),
            start_x: stage_x,
            length_x: self.length_x,
            start_y: -stage_y,
            length_y: self.length_y,
            start_z: z,
            length_z: 1,
            start_c: c,
            length_c: 1,
            start_t: t,
            length_t: 1,
            collection: self.collection.clone(),
            source_path,
            acquisition_details: Arc::clone(&self.acquisition_details),
            attributes: Arc::clone(&self.attributes),
        }
    }
}

/// Tiles grouped into one output image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiledImage {
    /// Image identity
    pub collection: ImageInPlate,
    /// Tiles in input order
    pub tiles: Vec<Tile>,
}

impl TiledImage {
    /// Relative output path
    pub fn path(&self) -> String {
        self.collection.path()
    }

    /// Distinct field-of-view names, in first-seen order
    pub fn fov_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for tile in &self.tiles {
            if !names.contains(&tile.fov_name.as_str()) {
                names.push(&tile.fov_name);
            }
        }
        names
    }
}
