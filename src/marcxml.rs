//! MARCXML parsing.
//!
//! Reads `<collection>` documents (or a bare `<record>`) as returned by the
//! INSPIRE search endpoint into [`MarcRecord`]s. Element names are matched on
//! their local part, so both `<record xmlns="...">` and `<marc:record>` forms
//! are accepted.
//!
//! Parsing is deliberately lenient about subfield content: a `<subfield>`
//! without a `code` attribute or without text is kept in the raw record and
//! dropped later by [`MarcRecord::field_maps`].
//!
//! # Examples
//!
//! ```
//! use marcfix::marcxml;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record>
//!     <controlfield tag="001">1474840</controlfield>
//!     <datafield tag="773" ind1=" " ind2=" ">
//!       <subfield code="x">Nucl. Instrum. Methods A630 (2011) 1-319</subfield>
//!     </datafield>
//!   </record>
//! </collection>"#;
//!
//! let records = marcxml::parse_collection(xml)?;
//! assert_eq!(records[0].recid(), Some("1474840"));
//! assert_eq!(records[0].field_maps("773")[0].get('x'),
//!            Some("Nucl. Instrum. Methods A630 (2011) 1-319"));
//! # Ok(())
//! # }
//! ```

use crate::error::{MarcfixError, Result};
use crate::record::{MarcRecord, RawDataField, RawSubfield};
use lazy_static::lazy_static;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

/// Marker of the comment INSPIRE embeds with the total number of hits.
const TOTAL_RESULTS_MARKER: &str = "Search-Engine-Total-Number-Of-Results";

lazy_static! {
    static ref TOTAL_RESULTS: Regex = Regex::new(r"Results:\s*(\d+)").unwrap();
}

/// Element currently collecting text.
#[derive(Debug)]
enum Open {
    Control(String, String),
    Subfield(RawSubfield),
}

/// Get an attribute value by local name, unescaped.
fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn start_datafield(e: &BytesStart<'_>) -> Result<RawDataField> {
    Ok(RawDataField {
        tag: attr_value(e, b"tag")?.unwrap_or_default(),
        ind1: attr_value(e, b"ind1")?.unwrap_or_else(|| " ".to_string()),
        ind2: attr_value(e, b"ind2")?.unwrap_or_else(|| " ".to_string()),
        subfields: Vec::new(),
    })
}

fn no_record(element: &str) -> MarcfixError {
    MarcfixError::Xml(format!("<{element}> found outside of a <record>"))
}

/// Parse a MARCXML document into records.
///
/// # Errors
///
/// Returns [`MarcfixError::Xml`] if the document is not well-formed, or if
/// it ends inside an open `<record>`.
pub fn parse_collection(xml: &str) -> Result<Vec<MarcRecord>> {
    // Whitespace between elements is dropped by `push_text`; text inside
    // fields is kept exactly, so unchanged fields round-trip.
    let mut reader = Reader::from_str(xml);

    let mut records = Vec::new();
    let mut record: Option<MarcRecord> = None;
    let mut datafield: Option<RawDataField> = None;
    let mut open: Option<Open> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"record" => record = Some(MarcRecord::new()),
                b"controlfield" => {
                    let tag = attr_value(e, b"tag")?.unwrap_or_default();
                    open = Some(Open::Control(tag, String::new()));
                }
                b"datafield" => datafield = Some(start_datafield(e)?),
                b"subfield" => {
                    open = Some(Open::Subfield(RawSubfield {
                        code: attr_value(e, b"code")?,
                        value: None,
                    }));
                }
                _ => (),
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"record" => records.push(MarcRecord::new()),
                b"controlfield" => {
                    let tag = attr_value(e, b"tag")?.unwrap_or_default();
                    record
                        .as_mut()
                        .ok_or_else(|| no_record("controlfield"))?
                        .add_control_field(tag, String::new());
                }
                b"datafield" => {
                    let df = start_datafield(e)?;
                    record
                        .as_mut()
                        .ok_or_else(|| no_record("datafield"))?
                        .datafields
                        .push(df);
                }
                b"subfield" => {
                    if let Some(df) = datafield.as_mut() {
                        df.subfields.push(RawSubfield {
                            code: attr_value(e, b"code")?,
                            value: None,
                        });
                    }
                }
                _ => (),
            },
            Event::Text(ref e) => {
                let text = e.unescape()?;
                push_text(&mut open, &text);
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                push_text(&mut open, &String::from_utf8_lossy(&raw));
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"record" => {
                    if let Some(r) = record.take() {
                        records.push(r);
                    }
                }
                b"controlfield" => {
                    if let Some(Open::Control(tag, value)) = open.take() {
                        record
                            .as_mut()
                            .ok_or_else(|| no_record("controlfield"))?
                            .add_control_field(tag, value);
                    }
                }
                b"datafield" => {
                    if let Some(df) = datafield.take() {
                        record
                            .as_mut()
                            .ok_or_else(|| no_record("datafield"))?
                            .datafields
                            .push(df);
                    }
                }
                b"subfield" => {
                    if let (Some(Open::Subfield(sf)), Some(df)) = (open.take(), datafield.as_mut())
                    {
                        df.subfields.push(sf);
                    }
                }
                _ => (),
            },
            Event::Eof => break,
            _ => (),
        }
    }

    if record.is_some() {
        return Err(MarcfixError::Xml(
            "Unexpected end of document inside <record>".to_string(),
        ));
    }

    Ok(records)
}

fn push_text(open: &mut Option<Open>, text: &str) {
    match open {
        Some(Open::Control(_, value)) => value.push_str(text),
        Some(Open::Subfield(sf)) => {
            if !text.is_empty() {
                sf.value.get_or_insert_with(String::new).push_str(text);
            }
        }
        None => (),
    }
}

/// Count the `<record>` elements in a document.
///
/// # Errors
///
/// Returns [`MarcfixError::Xml`] if the document is not well-formed.
pub fn count_records(xml: &str) -> Result<usize> {
    let mut reader = Reader::from_str(xml);
    let mut count = 0;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"record" => {
                count += 1;
            }
            Event::Eof => break,
            _ => (),
        }
    }

    Ok(count)
}

/// Total number of search hits announced in the result page.
///
/// INSPIRE embeds `<!-- Search-Engine-Total-Number-Of-Results: N -->` in
/// every MARCXML result page. Returns `None` if the comment is absent.
///
/// # Errors
///
/// Returns [`MarcfixError::Xml`] if the document is not well-formed.
pub fn total_results(xml: &str) -> Result<Option<usize>> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event()? {
            Event::Comment(e) => {
                let text = String::from_utf8_lossy(&e);
                if text.contains(TOTAL_RESULTS_MARKER) {
                    return Ok(TOTAL_RESULTS
                        .captures(&text)
                        .and_then(|caps| caps[1].parse().ok()));
                }
            }
            Event::Eof => return Ok(None),
            _ => (),
        }
    }
}
