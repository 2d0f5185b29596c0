//! arXiv report number (035/037) correction.
//!
//! Records harvested from arXiv sometimes lack the primary category in
//! `037__c` and the OAI identifier in `035`. The rule takes the report number
//! from the arXiv 037, asks a [`CategoryLookup`] for its primary category and
//! adds the missing 035 if needed.

use super::{is_arxiv_sourced, CorrectionRule};
use crate::arxiv::CategoryLookup;
use crate::error::{MarcfixError, Result};
use crate::record::{Field, MarcRecord};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref NEW_STYLE_ID: Regex = Regex::new(r"^\d{4}\.\d{4,5}(v\d+)?$").unwrap();
    static ref OLD_STYLE_ID: Regex =
        Regex::new(r"^[a-z]+(-[a-z]+)*(\.[a-z-]+)?/\d{7}(v\d+)?$").unwrap();
}

/// Normalize an arXiv report number as found in `037__a`.
///
/// The text is lowercased, an `arxiv:` prefix is removed and leading or
/// trailing slashes are trimmed.
///
/// # Examples
///
/// ```
/// use marcfix::rules::normalize_report_number;
///
/// assert_eq!(normalize_report_number("arXiv:1608.01541"), "1608.01541");
/// assert_eq!(normalize_report_number("hep-th/9901001/"), "hep-th/9901001");
/// ```
#[must_use]
pub fn normalize_report_number(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let stripped = lower.strip_prefix("arxiv:").unwrap_or(&lower);
    stripped.trim_matches('/').trim().to_string()
}

/// Whether a normalized report number looks like an arXiv identifier.
///
/// Submission handles (`submit/NNNNNNN`) are not identifiers.
#[must_use]
pub fn is_valid_arxiv_id(report_number: &str) -> bool {
    if report_number.starts_with("submit/") {
        return false;
    }
    NEW_STYLE_ID.is_match(report_number) || OLD_STYLE_ID.is_match(report_number)
}

/// Fills in `037__c` and the arXiv 035 using a category lookup.
pub struct ArxivRule<L> {
    lookup: L,
}

impl<L> fmt::Debug for ArxivRule<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArxivRule").finish_non_exhaustive()
    }
}

impl<L: CategoryLookup> ArxivRule<L> {
    /// Create the rule around a lookup.
    pub fn new(lookup: L) -> Self {
        ArxivRule { lookup }
    }
}

impl<L: CategoryLookup> CorrectionRule for ArxivRule<L> {
    fn name(&self) -> &'static str {
        "arxiv"
    }

    fn correct(&self, record: &MarcRecord) -> Result<Option<Vec<Field>>> {
        let mut fields_035 = record.field_maps("035");
        let mut fields_037 = record.field_maps("037");

        let index = fields_037
            .iter()
            .position(|f| f.get('a').is_some() && is_arxiv_sourced(f))
            .ok_or_else(|| {
                MarcfixError::InvalidInput("no 037 with an arXiv report number".to_string())
            })?;

        let raw = fields_037[index].get('a').unwrap_or_default();
        let report_number = normalize_report_number(raw);
        if report_number.is_empty() {
            return Err(MarcfixError::InvalidInput(format!(
                "empty arXiv report number '{raw}'"
            )));
        }
        if !is_valid_arxiv_id(&report_number) {
            return Err(MarcfixError::PatternMismatch(format!(
                "'{raw}' is not an arXiv identifier"
            )));
        }

        let category = self
            .lookup
            .primary_category(&report_number)?
            .ok_or_else(|| {
                MarcfixError::Lookup(format!("no arXiv category for {report_number}"))
            })?;
        log::debug!("arXiv category of {report_number}: {category}");
        fields_037[index].set('c', category);

        if !fields_035.iter().any(is_arxiv_sourced) {
            fields_035.push(
                Field::builder("035")
                    .subfield('a', format!("oai:arXiv.org:{report_number}"))
                    .subfield('9', "arXiv")
                    .build(),
            );
        }

        fields_035.extend(fields_037);
        Ok(Some(fields_035))
    }
}
