//! JaCoCo XML driver
//!
//! Pulls events from quick-xml one at a time and feeds them to a
//! [`ContextStack`]; the document is never held in memory as a whole.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::info;

use super::context::{ContextStack, Element, Open};
use super::counter::{Counter, CoverageStyle};
use super::ConversionSummary;
use crate::error::{ConvertError, Result};
use crate::report::RowWriter;

/// Convert the JaCoCo report at `path`, writing CSV to `output`
pub fn convert_file<W: Write>(
    path: &Path,
    output: W,
    style: CoverageStyle,
) -> Result<ConversionSummary> {
    let file = File::open(path)?;
    convert(BufReader::new(file), output, style)
}

/// Convert JaCoCo XML content held in a string
pub fn convert_str(xml: &str, style: CoverageStyle) -> Result<String> {
    let mut out = Vec::new();
    convert(xml.as_bytes(), &mut out, style)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Stream `input` through the converter.
///
/// The header is written before the first event is read; each row is
/// written as soon as its method closes.
pub fn convert<R: BufRead, W: Write>(
    input: R,
    output: W,
    style: CoverageStyle,
) -> Result<ConversionSummary> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut rows = RowWriter::new(output, style);
    rows.write_header()?;

    let mut stack = ContextStack::new();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| ConvertError::Xml {
                position: reader.buffer_position(),
                source,
            })?;
        let position = reader.buffer_position();

        match event {
            Event::Start(ref e) => {
                if let Some(element) = Element::from_tag(e.local_name().as_ref()) {
                    stack.open(open_event(element, e, position)?)?;
                }
            }
            Event::Empty(ref e) => {
                // Self-closing element: open and close in one go
                if let Some(element) = Element::from_tag(e.local_name().as_ref()) {
                    stack.open(open_event(element, e, position)?)?;
                    if let Some(row) = stack.close(element)? {
                        rows.write_row(&row)?;
                    }
                }
            }
            Event::End(ref e) => {
                if let Some(element) = Element::from_tag(e.local_name().as_ref()) {
                    if let Some(row) = stack.close(element)? {
                        rows.write_row(&row)?;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    rows.flush()?;
    let summary = stack.finish()?;
    info!(
        packages = summary.packages,
        classes = summary.classes,
        methods = summary.methods,
        counters = summary.counters,
        dropped = summary.dropped_counters,
        "conversion finished"
    );
    Ok(summary)
}

/// Extract the attributes an element needs
fn open_event(element: Element, start: &BytesStart, position: usize) -> Result<Open> {
    let attrs = ElementAttributes::read(element, start, position)?;
    let open = match element {
        Element::Package => Open::Package {
            name: attrs.required("name")?,
        },
        Element::Class => Open::Class {
            name: attrs.required("name")?,
            source_file: attrs.optional("sourcefilename"),
        },
        Element::SourceFile => Open::SourceFile {
            name: attrs.required("name")?,
        },
        Element::Method => Open::Method {
            name: attrs.required("name")?,
            descriptor: attrs.required("desc")?,
        },
        Element::Counter => Open::Counter(Counter::new(
            attrs.required("type")?,
            attrs.count("missed")?,
            attrs.count("covered")?,
        )),
    };
    Ok(open)
}

struct ElementAttributes {
    element: &'static str,
    values: Vec<(Vec<u8>, String)>,
}

impl ElementAttributes {
    fn read(element: Element, start: &BytesStart, position: usize) -> Result<Self> {
        let xml_error = |source: quick_xml::Error| ConvertError::Xml { position, source };

        let mut values = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(e.into()))?;
            let value = attr.unescape_value().map_err(xml_error)?;
            values.push((attr.key.as_ref().to_vec(), value.into_owned()));
        }

        Ok(ElementAttributes {
            element: element.tag(),
            values,
        })
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.values
            .iter()
            .find(|(k, _)| k.as_slice() == key.as_bytes())
            .map(|(_, v)| v.clone())
    }

    fn required(&self, key: &'static str) -> Result<String> {
        self.optional(key).ok_or(ConvertError::MissingAttribute {
            element: self.element,
            attribute: key,
        })
    }

    fn count(&self, key: &'static str) -> Result<u64> {
        let value = self.required(key)?;
        value.trim().parse().map_err(|_| ConvertError::InvalidCount {
            element: self.element,
            attribute: key,
            value,
        })
    }
}
