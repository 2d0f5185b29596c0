//! Record and field structures.
//!
//! A [`MarcRecord`] keeps a `<record>` element as it was found in the source
//! document, including subfields that are missing a code or a value. Correction
//! rules never look at the raw form directly; they work on [`Field`] mappings
//! projected out of it with [`MarcRecord::field_maps`], which is where
//! malformed subfields are dropped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Subfield code to value mapping for one occurrence of a tag.
///
/// Insertion order is preserved so that pass-through fields keep the order
/// they had in the source; the writer sorts by code on output.
pub type Subfields = IndexMap<char, String>;

/// A MARC record as parsed from MARCXML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarcRecord {
    /// Control fields (tag, value) in document order
    pub control_fields: Vec<(String, String)>,
    /// Data fields in document order, subfields untouched
    pub datafields: Vec<RawDataField>,
}

/// A `<datafield>` element exactly as found in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataField {
    /// Field tag
    pub tag: String,
    /// First indicator
    pub ind1: String,
    /// Second indicator
    pub ind2: String,
    /// Subfields in document order
    pub subfields: Vec<RawSubfield>,
}

/// A `<subfield>` element; either part may be absent in malformed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubfield {
    /// Value of the `code` attribute
    pub code: Option<String>,
    /// Text content
    pub value: Option<String>,
}

impl RawSubfield {
    /// Code and value, if both are present and the code is a single character.
    #[must_use]
    pub fn as_pair(&self) -> Option<(char, &str)> {
        let code = self.code.as_deref()?;
        let value = self.value.as_deref()?;
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some((c, value)),
            _ => None,
        }
    }
}

impl MarcRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a control field.
    pub fn add_control_field(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.control_fields.push((tag.into(), value.into()));
    }

    /// Get the first control field with the given tag.
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// The record ID held in control field 001, trimmed.
    #[must_use]
    pub fn recid(&self) -> Option<&str> {
        self.get_control_field("001")
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Project every occurrence of `tag` into a subfield mapping.
    ///
    /// Subfields without a code, with a code longer than one character, or
    /// without text are skipped; the rest of the field is still extracted.
    /// If a code repeats within one occurrence the last value wins.
    #[must_use]
    pub fn field_maps(&self, tag: &str) -> Vec<Field> {
        self.datafields
            .iter()
            .filter(|df| df.tag == tag)
            .map(|df| {
                let mut field = Field::new(tag);
                for (code, value) in df.subfields.iter().filter_map(RawSubfield::as_pair) {
                    field.subfields.insert(code, value.to_string());
                }
                field
            })
            .collect()
    }
}

/// One occurrence of a data field reduced to its subfield mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 digits)
    pub tag: String,
    /// Subfield code to value
    pub subfields: Subfields,
}

impl Field {
    /// Create an empty field.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Field {
            tag: tag.into(),
            subfields: Subfields::new(),
        }
    }

    /// Create a builder for constructing fields fluently
    ///
    /// # Examples
    ///
    /// ```
    /// use marcfix::Field;
    ///
    /// let field = Field::builder("037")
    ///     .subfield('a', "arXiv:1608.01541")
    ///     .subfield('9', "arXiv")
    ///     .build();
    /// assert_eq!(field.get('9'), Some("arXiv"));
    /// ```
    #[must_use]
    pub fn builder(tag: impl Into<String>) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag),
        }
    }

    /// Get the value for a subfield code.
    #[must_use]
    pub fn get(&self, code: char) -> Option<&str> {
        self.subfields.get(&code).map(String::as_str)
    }

    /// Set a subfield, replacing any previous value.
    pub fn set(&mut self, code: char, value: impl Into<String>) {
        self.subfields.insert(code, value.into());
    }

    /// Remove a subfield, returning its value.
    ///
    /// Order of the remaining subfields is preserved.
    pub fn remove(&mut self, code: char) -> Option<String> {
        self.subfields.shift_remove(&code)
    }

    /// Whether subfield `code` contains `needle`, ignoring ASCII case.
    #[must_use]
    pub fn subfield_contains_ci(&self, code: char, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.get(code)
            .is_some_and(|value| value.to_ascii_lowercase().contains(&needle))
    }

    /// Subfields sorted by code, as written to MARCXML.
    #[must_use]
    pub fn sorted_subfields(&self) -> Vec<(char, &str)> {
        let mut pairs: Vec<(char, &str)> = self
            .subfields
            .iter()
            .map(|(code, value)| (*code, value.as_str()))
            .collect();
        pairs.sort_by_key(|(code, _)| *code);
        pairs
    }
}

/// Builder for [`Field`].
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield.
    #[must_use]
    pub fn subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.field.set(code, value);
        self
    }

    /// Build the field.
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}

/// Replacement fields for one record, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectedRecord {
    /// Record ID (control field 001), if the source record had one
    pub recid: Option<String>,
    /// Fields to upload, in output order
    pub fields: Vec<Field>,
}

impl CorrectedRecord {
    /// Create a corrected record.
    #[must_use]
    pub fn new(recid: Option<String>, fields: Vec<Field>) -> Self {
        CorrectedRecord { recid, fields }
    }
}
