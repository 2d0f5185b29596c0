//! MARCXML output for corrected records.
//!
//! The output is the minimal collection document accepted by the INSPIRE
//! batch uploader in `correct` mode: each record carries its 001 control
//! field and only the data fields being replaced. Indicators are written
//! blank and subfields are sorted by code.

use crate::error::Result;
use crate::record::CorrectedRecord;
use quick_xml::se::Serializer;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// MARCXML collection wrapper for serialization.
#[derive(Debug, Serialize)]
#[serde(rename = "collection")]
struct CollectionXml {
    #[serde(rename = "record")]
    records: Vec<RecordXml>,
}

#[derive(Debug, Serialize)]
struct RecordXml {
    controlfield: Vec<ControlFieldXml>,
    datafield: Vec<DataFieldXml>,
}

#[derive(Debug, Serialize)]
struct ControlFieldXml {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "$value")]
    value: String,
}

#[derive(Debug, Serialize)]
struct DataFieldXml {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "@ind1")]
    ind1: String,
    #[serde(rename = "@ind2")]
    ind2: String,
    subfield: Vec<SubfieldXml>,
}

#[derive(Debug, Serialize)]
struct SubfieldXml {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "$value")]
    value: String,
}

impl From<&CorrectedRecord> for RecordXml {
    fn from(record: &CorrectedRecord) -> Self {
        let controlfield = record
            .recid
            .iter()
            .map(|id| ControlFieldXml {
                tag: "001".to_string(),
                value: id.clone(),
            })
            .collect();

        let datafield = record
            .fields
            .iter()
            .map(|field| DataFieldXml {
                tag: field.tag.clone(),
                ind1: " ".to_string(),
                ind2: " ".to_string(),
                subfield: field
                    .sorted_subfields()
                    .into_iter()
                    .map(|(code, value)| SubfieldXml {
                        code: code.to_string(),
                        value: value.to_string(),
                    })
                    .collect(),
            })
            .collect();

        RecordXml {
            controlfield,
            datafield,
        }
    }
}

/// Serialize corrected records into a MARCXML collection string.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use marcfix::{writer, CorrectedRecord, Field};
///
/// let field = Field::builder("773").subfield('v', "1").subfield('p', "X").build();
/// let record = CorrectedRecord::new(Some("12345".to_string()), vec![field]);
/// let xml = writer::to_marcxml(&[record]).unwrap();
/// assert!(xml.contains(r#"<controlfield tag="001">12345</controlfield>"#));
/// ```
pub fn to_marcxml(records: &[CorrectedRecord]) -> Result<String> {
    let collection = CollectionXml {
        records: records.iter().map(RecordXml::from).collect(),
    };

    let mut body = String::new();
    collection.serialize(Serializer::new(&mut body))?;

    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}\n"
    ))
}

/// Write `contents` to a new, uniquely named file in `dir`.
///
/// The directory is created if it does not exist. The file name is
/// `{prefix}XXXXXX{suffix}` with a random middle part.
pub(crate) fn write_unique(dir: &Path, prefix: &str, suffix: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)?;
    file.write_all(contents.as_bytes())?;

    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

/// Write corrected records to a new `correct_*.xml` file in `outdir`.
///
/// Returns the path of the file written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write_corrected_marcxml(records: &[CorrectedRecord], outdir: &Path) -> Result<PathBuf> {
    let xml = to_marcxml(records)?;
    let path = write_unique(outdir, "correct_", ".xml", &xml)?;
    log::info!(
        "Wrote {} correct records to file {}",
        records.len(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marcxml::parse_collection;
    use crate::record::Field;

    fn sample() -> Vec<CorrectedRecord> {
        let field = Field::builder("773")
            .subfield('v', "1")
            .subfield('p', "X")
            .build();
        vec![CorrectedRecord::new(Some("12345".to_string()), vec![field])]
    }

    #[test]
    fn test_single_record_layout() {
        let xml = to_marcxml(&sample()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(xml.matches("<record>").count(), 1);
        assert_eq!(xml.matches("<controlfield").count(), 1);
        assert!(xml.contains(r#"<controlfield tag="001">12345</controlfield>"#));
        assert_eq!(xml.matches("<datafield").count(), 1);
        assert!(xml.contains(r#"<datafield tag="773" ind1=" " ind2=" ">"#));

        let p = xml.find(r#"<subfield code="p">X</subfield>"#).unwrap();
        let v = xml.find(r#"<subfield code="v">1</subfield>"#).unwrap();
        assert!(p < v);
    }

    #[test]
    fn test_output_parses_back() {
        let xml = to_marcxml(&sample()).unwrap();
        let records = parse_collection(&xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].recid(), Some("12345"));
        let field = &records[0].field_maps("773")[0];
        assert_eq!(field.get('p'), Some("X"));
        assert_eq!(field.get('v'), Some("1"));
    }

    #[test]
    fn test_missing_recid_omits_controlfield() {
        let record = CorrectedRecord::new(None, vec![Field::builder("035").subfield('9', "arXiv").build()]);
        let xml = to_marcxml(&[record]).unwrap();
        assert!(!xml.contains("controlfield"));
        assert!(xml.contains(r#"<subfield code="9">arXiv</subfield>"#));
    }

    #[test]
    fn test_values_are_escaped() {
        let field = Field::builder("773").subfield('p', "A & B <C>").build();
        let xml = to_marcxml(&[CorrectedRecord::new(Some("1".to_string()), vec![field])]).unwrap();
        assert!(xml.contains("A &amp; B &lt;C"));
        let records = parse_collection(&xml).unwrap();
        assert_eq!(records[0].field_maps("773")[0].get('p'), Some("A & B <C>"));
    }

    #[test]
    fn test_write_corrected_marcxml_creates_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let outdir = dir.path().join("correct");

        let first = write_corrected_marcxml(&sample(), &outdir).unwrap();
        let second = write_corrected_marcxml(&sample(), &outdir).unwrap();

        assert_ne!(first, second);
        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("correct_"));
        assert!(name.ends_with(".xml"));
        let contents = fs::read_to_string(&first).unwrap();
        assert!(contents.contains("12345"));
    }
}
