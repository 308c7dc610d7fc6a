//! quick-xml helpers shared by the vendor loaders.
//!
//! Vendor files use namespaces inconsistently (CQ3K prefixes everything with
//! `bts:`, Operetta and OME-XML declare default namespaces), so elements and
//! attributes are always matched by local name.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Decoder, Reader};

use crate::error::{MetadataParseError, ParseErrorKind};

/// Open a metadata file for reading
pub(crate) fn open(path: &Path) -> Result<BufReader<File>, MetadataParseError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| MetadataParseError::new(path, e))
}

/// Pull parser with whitespace-only text dropped
pub(crate) fn reader<R: BufRead>(source: R) -> Reader<R> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);
    reader
}

/// Local name of an element as an owned string
pub(crate) fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Parse a raw value, reporting the field name on failure
pub(crate) fn parse_value<T: FromStr>(field: &str, value: &str) -> Result<T, ParseErrorKind> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseErrorKind::invalid(field, value))
}

/// Start tag paired with the decoder of the document it was read from.
///
/// Attribute values are decoded with the document's declared encoding
/// before unescaping.
#[derive(Clone, Copy)]
pub(crate) struct Element<'a> {
    start: &'a BytesStart<'a>,
    decoder: Decoder,
}

impl<'a> Element<'a> {
    pub fn new(start: &'a BytesStart<'a>, decoder: Decoder) -> Self {
        Self { start, decoder }
    }

    /// Local name of the tag
    pub fn local_name(&self) -> String {
        local_name(self.start)
    }

    /// Attribute value looked up by local name
    pub fn attribute(&self, name: &str) -> Result<Option<String>, ParseErrorKind> {
        for attr in self.start.attributes() {
            let attr = attr?;
            if attr.key.local_name().as_ref() == name.as_bytes() {
                return Ok(Some(
                    attr.decode_and_unescape_value(self.decoder)?.into_owned(),
                ));
            }
        }
        Ok(None)
    }

    /// Attribute value that must be present
    pub fn required_attribute(&self, name: &str) -> Result<String, ParseErrorKind> {
        self.attribute(name)?
            .ok_or_else(|| ParseErrorKind::MissingAttribute(name.to_string()))
    }

    /// Optional attribute parsed into `T`
    pub fn parse_attribute<T: FromStr>(&self, name: &str) -> Result<Option<T>, ParseErrorKind> {
        self.attribute(name)?
            .map(|value| parse_value(name, &value))
            .transpose()
    }

    /// Required attribute parsed into `T`
    pub fn parse_required<T: FromStr>(&self, name: &str) -> Result<T, ParseErrorKind> {
        parse_value(name, &self.required_attribute(name)?)
    }

    /// Every attribute as (local name, value)
    fn attributes(&self) -> Result<Vec<(String, String)>, ParseErrorKind> {
        let mut attributes = Vec::new();
        for attr in self.start.attributes() {
            let attr = attr?;
            attributes.push((
                String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned(),
                attr.decode_and_unescape_value(self.decoder)?.into_owned(),
            ));
        }
        Ok(attributes)
    }
}

/// Text content of the element whose start tag was just read.
///
/// Consumes everything up to and including the matching end tag; text of
/// nested elements is concatenated.
pub(crate) fn read_text<R: BufRead>(reader: &mut Reader<R>) -> Result<String, ParseErrorKind> {
    let mut text = String::new();
    let mut depth = 1usize;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::Eof => return Err(ParseErrorKind::MissingElement("end tag".to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

/// Flat child element: local name, attributes and text
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ChildElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl ChildElement {
    /// Attribute value by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Direct children of the element whose start tag was just read.
///
/// Children nested deeper than one level contribute their text to the
/// direct child that contains them.
pub(crate) fn read_children<R: BufRead>(
    reader: &mut Reader<R>,
) -> Result<Vec<ChildElement>, ParseErrorKind> {
    let mut children = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let mut child = ChildElement {
                    name: local_name(&e),
                    attributes: Element::new(&e, reader.decoder()).attributes()?,
                    text: String::new(),
                };
                child.text = read_text(reader)?.trim().to_string();
                children.push(child);
            }
            Event::Empty(e) => children.push(ChildElement {
                name: local_name(&e),
                attributes: Element::new(&e, reader.decoder()).attributes()?,
                text: String::new(),
            }),
            Event::End(_) => break,
            Event::Eof => return Err(ParseErrorKind::MissingElement("end tag".to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(children)
}

/// Skip the element whose start tag was just read
pub(crate) fn skip_element<R: BufRead>(reader: &mut Reader<R>) -> Result<(), ParseErrorKind> {
    read_text(reader).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_start(reader: &mut Reader<&[u8]>) -> BytesStart<'static> {
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) | Event::Empty(e) => return e.into_owned(),
                Event::Eof => panic!("no element"),
                _ => {}
            }
            buf.clear();
        }
    }

    #[test]
    fn test_attributes_match_local_name() {
        let xml = r#"<bts:Record xmlns:bts="urn:x" bts:Row="2" Col="x"/>"#;
        let mut r = reader(xml.as_bytes());
        let start = first_start(&mut r);
        let e = Element::new(&start, r.decoder());
        assert_eq!(e.local_name(), "Record");
        assert_eq!(e.parse_required::<u32>("Row").unwrap(), 2);
        assert_eq!(e.parse_attribute::<u32>("Missing").unwrap(), None);
        assert!(matches!(
            e.required_attribute("Missing"),
            Err(ParseErrorKind::MissingAttribute(_))
        ));
        assert!(matches!(
            e.parse_required::<u32>("Col"),
            Err(ParseErrorKind::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_read_text_and_children() {
        let mut r = reader(
            r#"<Image><URL>r01c01.tiff</URL><Res Unit="m">1E-06</Res><Empty/></Image>"#.as_bytes(),
        );
        first_start(&mut r);
        let children = read_children(&mut r).unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].text, "r01c01.tiff");
        assert_eq!(children[1].attribute("Unit"), Some("m"));
        assert_eq!(children[1].text, "1E-06");
        assert_eq!(children[2].name, "Empty");
    }

    #[test]
    fn test_read_text_unescapes() {
        let mut r = reader("<a>x &amp; y<b>z</b></a>".as_bytes());
        first_start(&mut r);
        assert_eq!(read_text(&mut r).unwrap(), "x & yz");
    }

    #[test]
    fn test_attribute_values_are_decoded_and_unescaped() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><Plate Name="A&amp;B &lt;96&gt;" Unit="&#181;m"><Res Unit="&quot;m&quot;">1</Res></Plate>"#;
        let mut r = reader(xml.as_bytes());
        let start = first_start(&mut r);
        let e = Element::new(&start, r.decoder());
        assert_eq!(e.attribute("Name").unwrap().as_deref(), Some("A&B <96>"));
        assert_eq!(e.attribute("Unit").unwrap().as_deref(), Some("\u{b5}m"));
        let children = read_children(&mut r).unwrap();
        assert_eq!(children[0].attribute("Unit"), Some("\"m\""));
    }
}
