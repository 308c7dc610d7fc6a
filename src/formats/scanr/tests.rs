use std::fs;

use super::*;
use crate::error::{ConfigurationError, ConvertError};

fn ome_image(id: &str, pixels_attrs: &str, body: &str) -> String {
    format!(
        r#"<Image ID="{id}" Name="{id}"><AcquisitionDate>2024-01-01T00:00:00</AcquisitionDate><Pixels ID="Pixels:0" DimensionOrder="XYCZT" SizeX="512" SizeY="256" SizeZ="2" SizeC="2" SizeT="1" Type="uint16" {pixels_attrs}>{body}</Pixels></Image>"#
    )
}

fn ome(images: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06" UUID="urn:uuid:0">
{}
</OME>"#,
        images.join("\n")
    )
}

/// Two channels, two z planes, one file per plane
fn two_by_two_body(channel_names: [&str; 2]) -> String {
    let mut body = String::new();
    for (c, name) in channel_names.iter().enumerate() {
        if name.is_empty() {
            body.push_str(&format!(r#"<Channel ID="Channel:0:{c}"/>"#));
        } else {
            body.push_str(&format!(r#"<Channel ID="Channel:0:{c}" Name="{name}"/>"#));
        }
    }
    for z in 0..2 {
        for c in 0..2 {
            body.push_str(&format!(
                r#"<TiffData FirstC="{c}" FirstT="0" FirstZ="{z}" IFD="0" PlaneCount="1"><UUID FileName="W0001P0002_C{c}_Z{z}.tif">urn:uuid:{c}{z}</UUID></TiffData>"#
            ));
        }
    }
    for z in 0..2 {
        for c in 0..2 {
            let position_z = 5.0 + 1.5 * z as f64;
            body.push_str(&format!(
                r#"<Plane TheC="{c}" TheT="0" TheZ="{z}" PositionX="1000.5" PositionY="250" PositionZ="{position_z}"/>"#
            ));
        }
    }
    body
}

fn write_metadata(root: &Path, xml: &str) {
    let data = root.join(DATA_DIR);
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join(METADATA_FILE), xml).unwrap();
}

fn acquisition(path: &Path, layout: PlateLayout) -> ScanRAcquisition {
    ScanRAcquisition::new(AcquisitionInput::new(path.to_string_lossy()), layout)
}

#[test]
fn test_well_position_ids() {
    assert_eq!(well_position_ids("Image:W1P2"), Some((1, 2)));
    assert_eq!(well_position_ids("W0013P0004"), Some((13, 4)));
    assert_eq!(well_position_ids("Image:0"), None);
}

#[test]
fn test_data_suffix_is_stripped() {
    let acq = acquisition(Path::new("/scans/plate_a/data/"), PlateLayout::Wells96);
    assert_eq!(acq.path(), "/scans/plate_a");
    assert_eq!(acq.plate_name(), "plate_a");

    let plain = acquisition(Path::new("/scans/plate_a"), PlateLayout::Wells96);
    assert_eq!(plain.path(), "/scans/plate_a");
}

#[test]
fn test_acquisition_from_toml() {
    let acq: ScanRAcquisition = toml::from_str(
        r#"
        path = "/scans/plate_b/data"
        layout = "384-well"
        acquisition_id = 1

        [advanced]
        pixelsize = 0.5
        "#,
    )
    .unwrap();
    assert_eq!(acq.path(), "/scans/plate_b");
    assert_eq!(acq.layout(), PlateLayout::Wells384);
    assert_eq!(acq.acquisition_id(), 1);
    assert_eq!(acq.advanced().pixelsize, Some(0.5));

    let default_layout: ScanRAcquisition = toml::from_str(r#"path = "/x""#).unwrap();
    assert_eq!(default_layout.layout(), PlateLayout::Wells96);
}

#[test]
fn test_parse_ome_metadata() {
    let xml = ome(&[ome_image(
        "Image:W1P2",
        r#"PhysicalSizeX="0.325" PhysicalSizeXUnit="µm" PhysicalSizeY="325" PhysicalSizeYUnit="nm""#,
        &two_by_two_body(["DAPI", "GFP"]),
    )]);
    let metadata = parse_ome_metadata(xml.as_bytes()).unwrap();
    assert_eq!(metadata.images.len(), 1);

    let pixels = &metadata.images[0].pixels;
    assert_eq!((pixels.size_x, pixels.size_y), (512, 256));
    assert_eq!(pixels.pixel_type.as_deref(), Some("uint16"));
    assert_eq!(pixels.physical_size_y.as_ref().unwrap().unit, "nm");
    assert_eq!(pixels.channel_names(), Some(vec!["DAPI", "GFP"]));
    assert_eq!(pixels.tiff_data.len(), 4);
    assert_eq!(
        pixels.tiff_data[1].file_name.as_deref(),
        Some("W0001P0002_C1_Z0.tif")
    );
    assert_eq!(pixels.planes[2].key(), (0, 0, 1));
}

#[test]
fn test_build_tiles() {
    let dir = tempfile::tempdir().unwrap();
    write_metadata(
        dir.path(),
        &ome(&[ome_image(
            "Image:W14P2",
            r#"PhysicalSizeX="0.325" PhysicalSizeY="0.325""#,
            &two_by_two_body(["DAPI", "GFP"]),
        )]),
    );

    let log = RunLogger::default();
    let tiles = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells96), &log)
        .unwrap();
    assert_eq!(tiles.len(), 4);

    let first = &tiles[0];
    // well 14 in a 12-column plate
    assert_eq!(first.collection.row, "B");
    assert_eq!(first.collection.column, 2);
    assert_eq!(first.fov_name, "FOV_2");
    assert_eq!((first.length_x, first.length_y), (512, 256));
    assert_eq!((first.start_x, first.start_y), (1000.5, -250.0));
    assert_eq!(
        first.source_path,
        dir.path().join(DATA_DIR).join("W0001P0002_C0_Z0.tif")
    );
    assert_eq!((tiles[3].start_c, tiles[3].start_z), (1, 1));

    let details = &first.acquisition_details;
    assert_eq!(details.pixelsize, 0.325);
    assert!((details.z_spacing - 1.5).abs() < 1e-12);
    assert_eq!(details.data_type, Some(DataType::Uint16));
    let labels: Vec<&str> = details
        .channels
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.channel_label.as_str())
        .collect();
    assert_eq!(labels, vec!["DAPI", "GFP"]);
    assert_eq!(log.warning_count(), 0);
}

#[test]
fn test_partial_channel_names_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    write_metadata(
        dir.path(),
        &ome(&[ome_image("W1P1", "", &two_by_two_body(["DAPI", ""]))]),
    );
    let tiles = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells96), &RunLogger::default())
        .unwrap();
    assert_eq!(tiles[0].acquisition_details.channels, None);
    // no physical size means 1 micrometer
    assert_eq!(tiles[0].acquisition_details.pixelsize, 1.0);
}

#[test]
fn test_missing_positions_default_to_origin() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"<TiffData FirstC="0" FirstT="0" FirstZ="0"><UUID FileName="a.tif">urn:uuid:a</UUID></TiffData><Plane TheC="0" TheT="0" TheZ="0"/>"#;
    write_metadata(dir.path(), &ome(&[ome_image("W2P1", "", body)]));
    let tiles = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells24), &RunLogger::default())
        .unwrap();
    assert_eq!(tiles.len(), 1);
    assert_eq!((tiles[0].start_x, tiles[0].start_y), (0.0, 0.0));
    assert_eq!(tiles[0].acquisition_details.z_spacing, 1.0);
    assert_eq!(tiles[0].collection.well_id(), "A02");
}

#[test]
fn test_unmatched_plane_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"<TiffData FirstC="0" FirstT="0" FirstZ="0"><UUID FileName="a.tif">urn:uuid:a</UUID></TiffData><Plane TheC="1" TheT="0" TheZ="0"/>"#;
    write_metadata(dir.path(), &ome(&[ome_image("W1P1", "", body)]));
    let err = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells96), &RunLogger::default())
        .unwrap_err();
    match err {
        ConvertError::MetadataParse(e) => {
            assert!(e.path.ends_with(METADATA_FILE));
            assert!(matches!(
                e.kind,
                ParseErrorKind::UnmatchedPlane { t: 0, c: 1, z: 0 }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_well_outside_layout() {
    let dir = tempfile::tempdir().unwrap();
    write_metadata(
        dir.path(),
        &ome(&[ome_image("W25P1", "", &two_by_two_body(["a", "b"]))]),
    );
    let err = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells24), &RunLogger::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Configuration(ConfigurationError::WellOutOfBounds { well_id: 24, .. })
    ));
}

#[test]
fn test_image_id_without_well_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write_metadata(
        dir.path(),
        &ome(&[ome_image("Image:0", "", &two_by_two_body(["a", "b"]))]),
    );
    let err = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells96), &RunLogger::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::MetadataParse(_)));
}

#[test]
fn test_no_images_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write_metadata(dir.path(), &ome(&[]));
    let err = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells96), &RunLogger::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::MetadataParse(MetadataParseError {
            kind: ParseErrorKind::NoRecords,
            ..
        })
    ));
}

#[test]
fn test_unknown_physical_unit() {
    let dir = tempfile::tempdir().unwrap();
    write_metadata(
        dir.path(),
        &ome(&[ome_image(
            "W1P1",
            r#"PhysicalSizeX="1" PhysicalSizeXUnit="furlong""#,
            &two_by_two_body(["a", "b"]),
        )]),
    );
    let err = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells96), &RunLogger::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Configuration(ConfigurationError::UnknownUnit(unit)) if unit == "furlong"
    ));
}

#[test]
fn test_non_positive_physical_size_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_metadata(
        dir.path(),
        &ome(&[ome_image(
            "W1P1",
            r#"PhysicalSizeX="-0.5" PhysicalSizeY="0.5""#,
            &two_by_two_body(["a", "b"]),
        )]),
    );
    let err = ScanRParser
        .build_tiles(&acquisition(dir.path(), PlateLayout::Wells96), &RunLogger::default())
        .unwrap_err();
    match err {
        ConvertError::MetadataParse(e) => {
            assert!(e.path.ends_with(METADATA_FILE));
            assert!(matches!(
                e.kind,
                ParseErrorKind::InvalidValue { ref field, ref value }
                    if field == "PhysicalSizeX" && value == "-0.5"
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}
