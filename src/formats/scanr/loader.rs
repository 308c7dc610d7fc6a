use std::io::BufRead;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::models::*;
use crate::error::{MetadataParseError, ParseErrorKind};
use crate::model::MeasureWithUnit;
use crate::xml::{self, local_name, Element};

/// Default OME length unit
const MICROMETER: &str = "\u{b5}m";

/// Load `metadata.ome.xml`
pub fn load_ome_metadata(path: &Path) -> Result<OmeMetadata, MetadataParseError> {
    let source = xml::open(path)?;
    parse_ome_metadata(source).map_err(|kind| MetadataParseError::new(path, kind))
}

/// Parse OME-XML
pub fn parse_ome_metadata<R: BufRead>(source: R) -> Result<OmeMetadata, ParseErrorKind> {
    let mut reader = xml::reader(source);
    let mut metadata = OmeMetadata::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if local_name(&e) == "Image" => {
                let e = Element::new(&e, reader.decoder());
                metadata.images.push(parse_image(&e, &mut reader)?);
            }
            Event::Empty(e) if local_name(&e) == "Image" => {
                return Err(ParseErrorKind::MissingElement("Pixels".to_string()));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(metadata)
}

fn parse_image<R: BufRead>(e: &Element, reader: &mut Reader<R>) -> Result<OmeImage, ParseErrorKind> {
    let id = e.required_attribute("ID")?;
    let name = e.attribute("Name")?;
    let mut pixels = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(child) => {
                if local_name(&child) == "Pixels" {
                    let mut parsed = pixels_attributes(&Element::new(&child, reader.decoder()))?;
                    read_pixels_children(reader, &mut parsed)?;
                    pixels = Some(parsed);
                } else {
                    xml::skip_element(reader)?;
                }
            }
            Event::Empty(child) if local_name(&child) == "Pixels" => {
                pixels = Some(pixels_attributes(&Element::new(&child, reader.decoder()))?);
            }
            Event::End(_) => break,
            Event::Eof => return Err(ParseErrorKind::MissingElement("Image end tag".to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(OmeImage {
        id,
        name,
        pixels: pixels.ok_or_else(|| ParseErrorKind::MissingElement("Pixels".to_string()))?,
    })
}

fn physical_size(e: &Element, axis: &str) -> Result<Option<MeasureWithUnit>, ParseErrorKind> {
    let size: Option<f64> = e.parse_attribute(&format!("PhysicalSize{axis}"))?;
    let unit = e.attribute(&format!("PhysicalSize{axis}Unit"))?;
    Ok(size.map(|value| MeasureWithUnit::new(value, unit.unwrap_or_else(|| MICROMETER.to_string()))))
}

fn pixels_attributes(e: &Element) -> Result<Pixels, ParseErrorKind> {
    Ok(Pixels {
        size_x: e.parse_required("SizeX")?,
        size_y: e.parse_required("SizeY")?,
        size_z: e.parse_attribute("SizeZ")?,
        size_c: e.parse_attribute("SizeC")?,
        size_t: e.parse_attribute("SizeT")?,
        pixel_type: e.attribute("Type")?,
        physical_size_x: physical_size(e, "X")?,
        physical_size_y: physical_size(e, "Y")?,
        ..Default::default()
    })
}

fn channel(e: &Element) -> Result<OmeChannel, ParseErrorKind> {
    Ok(OmeChannel {
        id: e.attribute("ID")?,
        name: e.attribute("Name")?,
    })
}

fn tiff_data(e: &Element) -> Result<TiffData, ParseErrorKind> {
    Ok(TiffData {
        first_t: e.parse_attribute("FirstT")?.unwrap_or(0),
        first_c: e.parse_attribute("FirstC")?.unwrap_or(0),
        first_z: e.parse_attribute("FirstZ")?.unwrap_or(0),
        file_name: None,
    })
}

fn plane(e: &Element) -> Result<Plane, ParseErrorKind> {
    Ok(Plane {
        the_t: e.parse_required("TheT")?,
        the_c: e.parse_required("TheC")?,
        the_z: e.parse_required("TheZ")?,
        position_x: e.parse_attribute("PositionX")?,
        position_y: e.parse_attribute("PositionY")?,
        position_z: e.parse_attribute("PositionZ")?,
    })
}

/// Channels, TiffData blocks and planes up to the `Pixels` end tag
fn read_pixels_children<R: BufRead>(
    reader: &mut Reader<R>,
    pixels: &mut Pixels,
) -> Result<(), ParseErrorKind> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let e = Element::new(&e, reader.decoder());
                match e.local_name().as_str() {
                    "Channel" => {
                        pixels.channels.push(channel(&e)?);
                        xml::skip_element(reader)?;
                    }
                    "TiffData" => {
                        let mut block = tiff_data(&e)?;
                        block.file_name = xml::read_children(reader)?
                            .into_iter()
                            .find(|child| child.name == "UUID")
                            .and_then(|uuid| uuid.attribute("FileName").map(str::to_string));
                        pixels.tiff_data.push(block);
                    }
                    "Plane" => {
                        pixels.planes.push(plane(&e)?);
                        xml::skip_element(reader)?;
                    }
                    _ => xml::skip_element(reader)?,
                }
            }
            Event::Empty(e) => {
                let e = Element::new(&e, reader.decoder());
                match e.local_name().as_str() {
                    "Channel" => pixels.channels.push(channel(&e)?),
                    "TiffData" => pixels.tiff_data.push(tiff_data(&e)?),
                    "Plane" => pixels.planes.push(plane(&e)?),
                    _ => {}
                }
            }
            Event::End(_) => break,
            Event::Eof => return Err(ParseErrorKind::MissingElement("Pixels end tag".to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}
