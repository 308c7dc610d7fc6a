//! Error types shared by every vendor parser.
//!
//! Two failure families exist: [`ConfigurationError`] for problems with what the
//! user asked for (acquisition list, condition table, units, filters) and
//! [`MetadataParseError`] for problems with the vendor files themselves. The
//! latter always carries the offending file path.

use std::path::{Path, PathBuf};

/// Crate-wide result alias
pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

/// Top-level error returned by parsers and the acquisition driver
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Invalid user input or condition table
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Missing, unreadable or malformed vendor metadata
    #[error(transparent)]
    MetadataParse(#[from] MetadataParseError),
}

/// Errors caused by user-supplied configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The driver was called without any acquisition
    #[error("Acquisitions list is empty.")]
    EmptyAcquisitionList,

    /// Every acquisition yielded zero tiled images
    #[error("No images found in any of the provided acquisitions.")]
    NoImagesFound,

    /// Physical quantity with a unit we cannot convert to micrometers
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Condition table could not be read or parsed
    #[error("Failed to read condition table at {path}: {reason}")]
    ConditionTable {
        /// Path of the table
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Condition table rows do not line up with its headers, or a key column
    /// holds non-numeric values
    #[error("Malformed condition table: {0}")]
    MalformedConditionTable(String),

    /// Condition table has no `row` header
    #[error("Condition table must contain a 'row' column.")]
    MissingRowColumn,

    /// Condition table has neither a `column` nor a `col` header
    #[error("Condition table must contain a 'column' or 'col' column.")]
    MissingColumnColumn,

    /// Attribute column mixes strings with numbers or booleans
    #[error(
        "Condition table column '{column}' must contain either all strings, bools, \
         or all numbers, but found types: {{{types}}}"
    )]
    MixedTypeColumn {
        /// Offending column header
        column: String,
        /// Comma separated type names found in the column
        types: String,
    },

    /// Acquisition parameters that cannot be honored
    #[error("Invalid acquisition: {0}")]
    InvalidAcquisition(String),

    /// ScanR well id outside of the configured plate layout
    #[error("Well id {well_id} is out of bounds for layout {layout}.")]
    WellOutOfBounds {
        /// Zero-based well id
        well_id: u32,
        /// Layout name, e.g. "96-well"
        layout: String,
    },

    /// Tile filter with an invalid regular expression
    #[error("Invalid filter regex '{pattern}': {reason}")]
    InvalidFilter {
        /// Pattern as written by the user
        pattern: String,
        /// Compiler message
        reason: String,
    },
}

/// Failure to read or interpret one vendor metadata file
#[derive(Debug, thiserror::Error)]
#[error("Failed to parse metadata file {}: {kind}", path.display())]
pub struct MetadataParseError {
    /// File that could not be parsed
    pub path: PathBuf,
    /// What went wrong
    #[source]
    pub kind: ParseErrorKind,
}

impl MetadataParseError {
    /// Attach a file path to a parse failure
    pub fn new(path: impl AsRef<Path>, kind: impl Into<ParseErrorKind>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind: kind.into(),
        }
    }
}

/// The reason a metadata file was rejected
#[derive(Debug, thiserror::Error)]
pub enum ParseErrorKind {
    /// I/O error reading the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML syntax error
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required XML attribute is missing
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    /// Required XML element is missing
    #[error("Missing required element: {0}")]
    MissingElement(String),

    /// Attribute or element text that does not parse into the expected type
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue {
        /// Attribute or element name
        field: String,
        /// Raw text
        value: String,
    },

    /// Document version this crate does not understand
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(String),

    /// Document parsed but contains no usable image record
    #[error("No measurement records found")]
    NoRecords,

    /// OME plane without a TiffData block for the same (t, c, z)
    #[error("Could not find matching TIFF for plane (t={t}, c={c}, z={z})")]
    UnmatchedPlane {
        /// Timepoint index
        t: u64,
        /// Channel index
        c: u64,
        /// Z index
        z: u64,
    },
}

impl From<quick_xml::events::attributes::AttrError> for ParseErrorKind {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        ParseErrorKind::Xml(quick_xml::Error::from(error))
    }
}

impl ParseErrorKind {
    /// Build an [`ParseErrorKind::InvalidValue`]
    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        ParseErrorKind::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}
