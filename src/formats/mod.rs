//! Vendor-specific metadata parsers.
//!
//! Each vendor lives in its own module with typed records, an XML loader and
//! an [`AcquisitionParser`](crate::parser::AcquisitionParser) implementation:
//!
//! - [`cq3k`] - Yokogawa CellVoyager CQ3K (`MeasurementData.mlf` / `MeasurementDetail.mrf`)
//! - [`scanr`] - Olympus ScanR (`data/metadata.ome.xml`)
//! - [`operetta`] - PerkinElmer Operetta / Harmony (`Images/Index.idx.xml`)

/// Yokogawa CQ3K parser.
pub mod cq3k;

/// PerkinElmer Operetta parser.
pub mod operetta;

/// Olympus ScanR parser.
pub mod scanr;
