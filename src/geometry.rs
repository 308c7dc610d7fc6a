//! Geometry and axes resolution shared by the vendor parsers.
//!
//! Every function here works on one field-of-view group at a time; nothing is
//! pooled across wells.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use crate::error::ParseErrorKind;
use crate::logging::RunLogger;
use crate::model::{AcquisitionDetails, Axis, AxisCoordinates, ChannelInfo, DataType};

const REL_TOLERANCE: f64 = 1e-5;
const ABS_TOLERANCE: f64 = 1e-8;

/// Approximate float equality (`|a - b| <= atol + rtol * |b|`)
pub fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ABS_TOLERANCE + REL_TOLERANCE * b.abs()
}

/// Constant z step inferred from stage z positions.
///
/// Distinct positions are sorted; one (or no) plane gives 1.0. Non-uniform
/// steps produce a warning and the mean step is returned.
pub fn z_spacing<I>(positions: I, log: &RunLogger) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut distinct: Vec<f64> = Vec::new();
    for z in positions {
        if !distinct.iter().any(|seen| *seen == z) {
            distinct.push(z);
        }
    }
    distinct.sort_by(f64::total_cmp);

    if distinct.len() <= 1 {
        return 1.0;
    }

    let deltas: Vec<f64> = distinct.windows(2).map(|w| w[1] - w[0]).collect();
    if !deltas.iter().all(|d| is_close(*d, deltas[0])) {
        log.warn(format_args!("Z spacing is not constant, using mean value."));
    }
    deltas.iter().sum::<f64>() / deltas.len() as f64
}

/// Whether more than one distinct timepoint is present
pub fn is_time_series<I, T>(timepoints: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash,
{
    timepoints.into_iter().collect::<HashSet<T>>().len() > 1
}

/// Single pixel size from the x and y physical sizes.
///
/// The x size is authoritative and must be finite and positive; `field` names
/// the vendor attribute it came from. A mismatch with y is only a warning.
pub fn resolve_pixel_size(
    field: &str,
    size_x: f64,
    size_y: f64,
    log: &RunLogger,
) -> Result<f64, ParseErrorKind> {
    if !(size_x.is_finite() && size_x > 0.0) {
        return Err(ParseErrorKind::invalid(field, size_x.to_string()));
    }
    if !is_close(size_x, size_y) {
        log.warn(format_args!(
            "Physical size x ({size_x}) and y ({size_y}) are not equal. Using x size for pixelsize."
        ));
    }
    Ok(size_x)
}

/// Smallest unsigned type holding the given maximum intensity
pub fn data_type_for_max_intensity(max_intensity: u64) -> DataType {
    if max_intensity <= u64::from(u8::MAX) {
        DataType::Uint8
    } else if max_intensity <= u64::from(u16::MAX) {
        DataType::Uint16
    } else {
        DataType::Uint32
    }
}

/// Canonical axis order; time only for time series
pub fn default_axes(is_time_series: bool) -> Vec<Axis> {
    if is_time_series {
        vec![Axis::T, Axis::C, Axis::Z, Axis::Y, Axis::X]
    } else {
        vec![Axis::C, Axis::Z, Axis::Y, Axis::X]
    }
}

/// Channel labels ordered by channel id; the first label seen for an id wins
pub fn channels_by_id<'a, I>(channels: I) -> Vec<ChannelInfo>
where
    I: IntoIterator<Item = (u64, &'a str)>,
{
    let mut seen = BTreeSet::new();
    let mut labelled: Vec<(u64, &str)> = Vec::new();
    for (id, name) in channels {
        if seen.insert(id) {
            labelled.push((id, name));
        }
    }
    labelled.sort_by_key(|(id, _)| *id);
    labelled
        .into_iter()
        .map(|(_, name)| ChannelInfo::new(name))
        .collect()
}

/// Inferred geometry of one group, before user overrides
#[derive(Debug, Clone, PartialEq)]
pub struct GroupGeometry {
    /// Pixel size (micrometers)
    pub pixelsize: f64,
    /// Z spacing (micrometers)
    pub z_spacing: f64,
    /// Time axis present
    pub is_time_series: bool,
    /// Channel list, when known
    pub channels: Option<Vec<ChannelInfo>>,
    /// Data type, when known
    pub data_type: Option<DataType>,
}

impl GroupGeometry {
    /// Base descriptor with the default coordinate systems and `t_spacing = 1`
    pub fn into_details(self) -> AcquisitionDetails {
        AcquisitionDetails {
            pixelsize: self.pixelsize,
            z_spacing: self.z_spacing,
            t_spacing: 1.0,
            channels: self.channels,
            axes: default_axes(self.is_time_series),
            coordinates: AxisCoordinates::default(),
            data_type: self.data_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_z_spacing_single_plane() {
        let log = RunLogger::default();
        assert_eq!(z_spacing([4.2, 4.2, 4.2], &log), 1.0);
        assert_eq!(z_spacing(std::iter::empty(), &log), 1.0);
        assert_eq!(log.warning_count(), 0);
    }

    #[test]
    fn test_z_spacing_uniform_unsorted() {
        let log = RunLogger::default();
        let spacing = z_spacing([3.0, 1.0, 2.0, 1.0, 3.0], &log);
        assert!((spacing - 1.0).abs() < 1e-12);
        assert_eq!(log.warning_count(), 0);

        let spacing = z_spacing([10.0, 10.5, 11.0], &log);
        assert!((spacing - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_z_spacing_non_uniform_warns_and_averages() {
        let log = RunLogger::default();
        let spacing = z_spacing([0.0, 1.0, 3.0], &log);
        assert!((spacing - 1.5).abs() < 1e-12);
        assert_eq!(
            log.warnings(),
            vec!["Z spacing is not constant, using mean value.".to_string()]
        );
    }

    #[test]
    fn test_is_time_series() {
        assert!(!is_time_series([1, 1, 1]));
        assert!(is_time_series([0, 1]));
        assert!(!is_time_series(Vec::<u64>::new()));
    }

    #[test]
    fn test_pixel_size_mismatch_uses_x() {
        let log = RunLogger::default();
        assert_eq!(resolve_pixel_size("X", 0.65, 0.65, &log).unwrap(), 0.65);
        assert_eq!(log.warning_count(), 0);

        assert_eq!(resolve_pixel_size("X", 0.65, 0.7, &log).unwrap(), 0.65);
        assert_eq!(log.warning_count(), 1);
        assert!(log.warnings()[0].contains("Using x size"));
    }

    #[test]
    fn test_pixel_size_must_be_positive_and_finite() {
        let log = RunLogger::default();
        for size in [0.0, -0.65, f64::NAN, f64::INFINITY] {
            let err = resolve_pixel_size("PhysicalSizeX", size, 0.65, &log).unwrap_err();
            assert!(matches!(
                err,
                ParseErrorKind::InvalidValue { ref field, .. } if field == "PhysicalSizeX"
            ));
        }
        assert_eq!(log.warning_count(), 0);
    }

    #[test]
    fn test_data_type_thresholds() {
        assert_eq!(data_type_for_max_intensity(0), DataType::Uint8);
        assert_eq!(data_type_for_max_intensity(255), DataType::Uint8);
        assert_eq!(data_type_for_max_intensity(256), DataType::Uint16);
        assert_eq!(data_type_for_max_intensity(65535), DataType::Uint16);
        assert_eq!(data_type_for_max_intensity(65536), DataType::Uint32);
    }

    #[test]
    fn test_default_axes() {
        assert_eq!(default_axes(false), vec![Axis::C, Axis::Z, Axis::Y, Axis::X]);
        assert_eq!(default_axes(true)[0], Axis::T);
    }

    #[test]
    fn test_channels_by_id_first_name_wins() {
        let channels = channels_by_id([(2, "GFP"), (1, "DAPI"), (2, "other"), (3, "RFP")]);
        let labels: Vec<&str> = channels.iter().map(|c| c.channel_label.as_str()).collect();
        assert_eq!(labels, vec!["DAPI", "GFP", "RFP"]);
    }

    #[test]
    fn test_group_geometry_into_details() {
        let details = GroupGeometry {
            pixelsize: 0.65,
            z_spacing: 1.0,
            is_time_series: true,
            channels: None,
            data_type: Some(DataType::Uint16),
        }
        .into_details();
        assert_eq!(details.t_spacing, 1.0);
        assert_eq!(details.axes_string(), "tczyx");
        assert_eq!(details.data_type, Some(DataType::Uint16));
    }

    proptest! {
        #[test]
        fn prop_single_distinct_z_is_one(z in -1.0e6f64..1.0e6, n in 1usize..20) {
            let log = RunLogger::default();
            prop_assert_eq!(z_spacing(std::iter::repeat(z).take(n), &log), 1.0);
        }

        #[test]
        fn prop_uniform_stack_spacing(start in -1000.0f64..1000.0, step in 0.1f64..10.0, n in 2usize..30) {
            let log = RunLogger::default();
            let positions: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            let spacing = z_spacing(positions, &log);
            prop_assert!((spacing - step).abs() < 1e-6);
            prop_assert!(spacing > 0.0);
        }
    }
}
