use std::io::BufRead;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::models::*;
use crate::error::{MetadataParseError, ParseErrorKind};
use crate::xml::{self, Element};

/// Only document version understood by this loader
pub const SUPPORTED_VERSION: &str = "1.0";

/// Load `MeasurementData.mlf`
pub fn load_measurement_data(path: &Path) -> Result<MeasurementData, MetadataParseError> {
    let source = xml::open(path)?;
    parse_measurement_data(source).map_err(|kind| MetadataParseError::new(path, kind))
}

/// Load `MeasurementDetail.mrf`
pub fn load_measurement_detail(path: &Path) -> Result<MeasurementDetail, MetadataParseError> {
    let source = xml::open(path)?;
    parse_measurement_detail(source).map_err(|kind| MetadataParseError::new(path, kind))
}

fn check_version(e: &Element) -> Result<String, ParseErrorKind> {
    let version = e.required_attribute("Version")?;
    if version != SUPPORTED_VERSION {
        return Err(ParseErrorKind::UnsupportedVersion(version));
    }
    Ok(version)
}

/// 1-based index attribute; zero is rejected
fn parse_one_based(e: &Element, name: &str) -> Result<u32, ParseErrorKind> {
    let value: u32 = e.parse_required(name)?;
    if value == 0 {
        return Err(ParseErrorKind::invalid(name, "0"));
    }
    Ok(value)
}

/// Parse `MeasurementData` XML
pub fn parse_measurement_data<R: BufRead>(source: R) -> Result<MeasurementData, ParseErrorKind> {
    let mut reader = xml::reader(source);
    let mut data: Option<MeasurementData> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let e = Element::new(&e, reader.decoder());
                on_data_element(&e, true, &mut reader, &mut data)?;
            }
            Event::Empty(e) => {
                let e = Element::new(&e, reader.decoder());
                on_data_element(&e, false, &mut reader, &mut data)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    data.ok_or_else(|| ParseErrorKind::MissingElement("MeasurementData".to_string()))
}

fn on_data_element<R: BufRead>(
    e: &Element,
    has_body: bool,
    reader: &mut Reader<R>,
    data: &mut Option<MeasurementData>,
) -> Result<(), ParseErrorKind> {
    match e.local_name().as_str() {
        "MeasurementData" => {
            *data = Some(MeasurementData {
                version: check_version(e)?,
                records: Vec::new(),
            });
        }
        "MeasurementRecord" => {
            let document = data
                .as_mut()
                .ok_or_else(|| ParseErrorKind::MissingElement("MeasurementData".to_string()))?;
            document.records.push(parse_record(e, reader, has_body)?);
        }
        _ => {}
    }
    Ok(())
}

fn parse_record<R: BufRead>(
    e: &Element,
    reader: &mut Reader<R>,
    has_body: bool,
) -> Result<MeasurementRecord, ParseErrorKind> {
    let record_type = e.required_attribute("Type")?;
    let column = e.parse_required("Column")?;
    let row = e.parse_required("Row")?;
    let field_index = e.parse_required("FieldIndex")?;

    let record = match record_type.as_str() {
        "IMG" => MeasurementRecord::Image(ImageRecord {
            time: e.attribute("Time")?,
            column,
            row,
            field_index,
            time_point: parse_one_based(e, "TimePoint")?,
            timeline_index: e.parse_attribute("TimelineIndex")?.unwrap_or_default(),
            x: e.parse_required("X")?,
            y: e.parse_required("Y")?,
            z: e.parse_required("Z")?,
            z_index: parse_one_based(e, "ZIndex")?,
            ch: parse_one_based(e, "Ch")?,
            action: e.attribute("Action")?.unwrap_or_default(),
            action_index: e.parse_attribute("ActionIndex")?.unwrap_or_default(),
            tile_x_index: e.parse_attribute("TileXIndex")?,
            tile_y_index: e.parse_attribute("TileYIndex")?,
            z_image_processing: e.attribute("ZImageProcessing")?,
            z_top: e.parse_attribute("ZTop")?,
            z_bottom: e.parse_attribute("ZBottom")?,
            partial_tile_index: e.parse_attribute("PartialTileIndex")?,
            value: String::new(),
        }),
        "ERR" => MeasurementRecord::Error(ErrorRecord {
            column,
            row,
            field_index,
            value: String::new(),
        }),
        other => return Err(ParseErrorKind::invalid("Type", other)),
    };

    let value = if has_body {
        xml::read_text(reader)?.trim().to_string()
    } else {
        String::new()
    };

    Ok(match record {
        MeasurementRecord::Image(image) => {
            if value.is_empty() {
                return Err(ParseErrorKind::MissingElement(
                    "MeasurementRecord file name".to_string(),
                ));
            }
            MeasurementRecord::Image(ImageRecord { value, ..image })
        }
        MeasurementRecord::Error(error) => MeasurementRecord::Error(ErrorRecord { value, ..error }),
    })
}

/// Parse `MeasurementDetail` XML
pub fn parse_measurement_detail<R: BufRead>(
    source: R,
) -> Result<MeasurementDetail, ParseErrorKind> {
    let mut reader = xml::reader(source);
    let mut detail: Option<MeasurementDetail> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                on_detail_element(&Element::new(&e, reader.decoder()), &mut detail)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let detail =
        detail.ok_or_else(|| ParseErrorKind::MissingElement("MeasurementDetail".to_string()))?;
    if detail.channels.is_empty() {
        return Err(ParseErrorKind::MissingElement("MeasurementChannel".to_string()));
    }
    Ok(detail)
}

fn on_detail_element(
    e: &Element,
    detail: &mut Option<MeasurementDetail>,
) -> Result<(), ParseErrorKind> {
    let name = e.local_name();
    if name == "MeasurementDetail" {
        *detail = Some(MeasurementDetail {
            version: check_version(e)?,
            title: e.attribute("Title")?,
            column_count: e.parse_attribute("ColumnCount")?,
            row_count: e.parse_attribute("RowCount")?,
            time_point_count: e.parse_attribute("TimePointCount")?,
            field_count: e.parse_attribute("FieldCount")?,
            z_count: e.parse_attribute("ZCount")?,
            ..Default::default()
        });
        return Ok(());
    }
    let Some(document) = detail.as_mut() else {
        return Ok(());
    };
    match name.as_str() {
        "MeasurementSamplePlate" => document.plate_name = e.attribute("Name")?,
        "MeasurementChannel" => document.channels.push(MeasurementChannel {
            ch: e.parse_required("Ch")?,
            horizontal_pixel_dimension: e.parse_required("HorizontalPixelDimension")?,
            vertical_pixel_dimension: e.parse_required("VerticalPixelDimension")?,
            horizontal_pixels: e.parse_required("HorizontalPixels")?,
            vertical_pixels: e.parse_required("VerticalPixels")?,
            input_bit_depth: e.parse_attribute("InputBitDepth")?,
            objective_magnification_ratio: e.parse_attribute("ObjectiveMagnificationRatio")?,
        }),
        _ => {}
    }
    Ok(())
}
