use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Row letters of a standard multi-well plate, in order
pub const STANDARD_ROW_NAMES: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Letter for a 1-based row index (1 → "A", 26 → "Z")
pub fn row_name(index: u32) -> Option<String> {
    let index = usize::try_from(index).ok()?.checked_sub(1)?;
    STANDARD_ROW_NAMES
        .chars()
        .nth(index)
        .map(|c| c.to_string())
}

/// Split a well id such as "B03" into ("B", 3)
pub fn parse_well_id(well: &str) -> Option<(String, u32)> {
    let well = well.trim();
    let split = well.find(|c: char| c.is_ascii_digit())?;
    let (row, column) = well.split_at(split);
    if row.is_empty() || !row.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((row.to_string(), column.parse().ok()?))
}

/// Standard plate layouts supported for well-id to row/column conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlateLayout {
    /// 4 rows x 6 columns
    #[serde(rename = "24-well")]
    Wells24,
    /// 6 rows x 8 columns
    #[serde(rename = "48-well")]
    Wells48,
    /// 8 rows x 12 columns
    #[default]
    #[serde(rename = "96-well")]
    Wells96,
    /// 16 rows x 24 columns
    #[serde(rename = "384-well")]
    Wells384,
}

impl PlateLayout {
    /// Number of rows
    pub fn rows(&self) -> u32 {
        match self {
            PlateLayout::Wells24 => 4,
            PlateLayout::Wells48 => 6,
            PlateLayout::Wells96 => 8,
            PlateLayout::Wells384 => 16,
        }
    }

    /// Number of columns
    pub fn columns(&self) -> u32 {
        match self {
            PlateLayout::Wells24 => 6,
            PlateLayout::Wells48 => 8,
            PlateLayout::Wells96 => 12,
            PlateLayout::Wells384 => 24,
        }
    }

    /// Layout name as written in configuration ("96-well")
    pub fn name(&self) -> &'static str {
        match self {
            PlateLayout::Wells24 => "24-well",
            PlateLayout::Wells48 => "48-well",
            PlateLayout::Wells96 => "96-well",
            PlateLayout::Wells384 => "384-well",
        }
    }

    /// Row letter and 1-based column for a 1-based, row-major well id
    pub fn well_position(&self, well_id: u32) -> Result<(String, u32), ConfigurationError> {
        let out_of_bounds = |well_id: u32| ConfigurationError::WellOutOfBounds {
            well_id,
            layout: self.name().to_string(),
        };
        let index = well_id.checked_sub(1).ok_or_else(|| out_of_bounds(well_id))?;
        let row = index / self.columns();
        let column = index % self.columns() + 1;
        if row >= self.rows() {
            return Err(out_of_bounds(index));
        }
        let row = row_name(row + 1).ok_or_else(|| out_of_bounds(index))?;
        Ok((row, column))
    }
}

impl fmt::Display for PlateLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlateLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24-well" | "24" => Ok(PlateLayout::Wells24),
            "48-well" | "48" => Ok(PlateLayout::Wells48),
            "96-well" | "96" => Ok(PlateLayout::Wells96),
            "384-well" | "384" => Ok(PlateLayout::Wells384),
            other => Err(format!(
                "unknown plate layout '{other}', expected one of 24-well, 48-well, 96-well, 384-well"
            )),
        }
    }
}

/// Grouping key for the records of one field-of-view stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WellKey {
    /// Row letter
    pub row: String,
    /// 1-based column number
    pub column: u32,
    /// Field-of-view index as reported by the vendor
    pub field: u32,
    /// Vendor processing variant (CQ3K z image processing)
    pub tag: Option<String>,
}

impl WellKey {
    /// Key without a vendor tag
    pub fn new(row: impl Into<String>, column: u32, field: u32) -> Self {
        Self {
            row: row.into(),
            column,
            field,
            tag: None,
        }
    }

    /// Attach a vendor tag
    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Field-of-view name used for every tile of the stack
    pub fn fov_name(&self) -> String {
        format!("FOV_{}", self.field)
    }
}
