use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::Event;

use super::models::OperettaImage;
use crate::error::{MetadataParseError, ParseErrorKind};
use crate::model::{row_name, MeasureWithUnit};
use crate::xml::{self, local_name, ChildElement};

/// Load `Index.idx.xml`
pub fn load_index(path: &Path) -> Result<Vec<OperettaImage>, MetadataParseError> {
    let source = xml::open(path)?;
    parse_index(source).map_err(|kind| MetadataParseError::new(path, kind))
}

/// Parse the image entries of a Harmony index.
///
/// Only `Image` elements directly under `EvaluationInputData/Images` are
/// read; the `Image` references inside `Wells` are skipped.
pub fn parse_index<R: BufRead>(source: R) -> Result<Vec<OperettaImage>, ParseErrorKind> {
    let mut reader = xml::reader(source);
    let mut path: Vec<String> = Vec::new();
    let mut images = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = local_name(&e);
                if name == "Image" && path == ["EvaluationInputData", "Images"] {
                    let children = xml::read_children(&mut reader)?;
                    images.push(image_from_children(&children)?);
                } else {
                    path.push(name);
                }
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(images)
}

struct Fields<'a>(&'a [ChildElement]);

impl Fields<'_> {
    fn get(&self, name: &str) -> Option<&ChildElement> {
        self.0.iter().find(|child| child.name == name)
    }

    fn text(&self, name: &str) -> Result<&str, ParseErrorKind> {
        self.get(name)
            .map(|child| child.text.as_str())
            .ok_or_else(|| ParseErrorKind::MissingElement(name.to_string()))
    }

    fn parse<T: FromStr>(&self, name: &str) -> Result<T, ParseErrorKind> {
        xml::parse_value(name, self.text(name)?)
    }

    fn one_based(&self, name: &str) -> Result<u32, ParseErrorKind> {
        let value: u32 = self.parse(name)?;
        if value == 0 {
            return Err(ParseErrorKind::invalid(name, "0"));
        }
        Ok(value)
    }

    fn measure(&self, name: &str) -> Result<MeasureWithUnit, ParseErrorKind> {
        let child = self
            .get(name)
            .ok_or_else(|| ParseErrorKind::MissingElement(name.to_string()))?;
        let unit = child
            .attribute("Unit")
            .ok_or_else(|| ParseErrorKind::MissingAttribute(format!("{name}/@Unit")))?;
        Ok(MeasureWithUnit::new(xml::parse_value(name, &child.text)?, unit))
    }
}

/// Numeric rows 1..=26 become letters, anything else is kept as written
fn normalize_row(raw: &str) -> String {
    raw.trim()
        .parse::<u32>()
        .ok()
        .and_then(row_name)
        .unwrap_or_else(|| raw.trim().to_string())
}

fn image_from_children(children: &[ChildElement]) -> Result<OperettaImage, ParseErrorKind> {
    let fields = Fields(children);
    Ok(OperettaImage {
        url: fields.text("URL")?.to_string(),
        row: normalize_row(fields.text("Row")?),
        column: fields.parse("Col")?,
        field_id: fields.parse("FieldID")?,
        plane_id: fields.one_based("PlaneID")?,
        channel_id: fields.one_based("ChannelID")?,
        timepoint_id: fields.parse("TimepointID")?,
        channel_name: fields.text("ChannelName")?.to_string(),
        resolution_x: fields.measure("ImageResolutionX")?,
        resolution_y: fields.measure("ImageResolutionY")?,
        image_size_x: fields.parse("ImageSizeX")?,
        image_size_y: fields.parse("ImageSizeY")?,
        max_intensity: fields.parse("MaxIntensity")?,
        position_x: fields.measure("PositionX")?,
        position_y: fields.measure("PositionY")?,
        position_z: fields.measure("PositionZ")?,
        abs_position_z: fields
            .get("AbsPositionZ")
            .map(|_| fields.measure("AbsPositionZ"))
            .transpose()?,
    })
}
