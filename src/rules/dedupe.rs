//! Duplicate arXiv 035 cleanup.
//!
//! An earlier correction run added a second arXiv 035 to some records. For
//! the records listed in the denylist, every arXiv 035 after the first is
//! dropped; other 035s and all 037s are written back unchanged.

use super::{is_arxiv_sourced, CorrectionRule};
use crate::error::{MarcfixError, Result};
use crate::record::{Field, MarcRecord};
use std::collections::BTreeSet;

/// Removes repeated arXiv 035 fields from denylisted records.
#[derive(Debug, Clone, Default)]
pub struct Dedupe035Rule {
    denylist: BTreeSet<u64>,
}

impl Dedupe035Rule {
    /// Create the rule for the given record IDs.
    pub fn new(recids: impl IntoIterator<Item = u64>) -> Self {
        Dedupe035Rule {
            denylist: recids.into_iter().collect(),
        }
    }

    /// Parse a whitespace separated list of record IDs.
    ///
    /// # Errors
    ///
    /// Returns [`MarcfixError::InvalidInput`] for a token that is not a
    /// record ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use marcfix::rules::Dedupe035Rule;
    ///
    /// let rule = Dedupe035Rule::from_id_list("1474840 1397051\n1384910").unwrap();
    /// assert_eq!(rule.len(), 3);
    /// assert!(Dedupe035Rule::from_id_list("1474840 abc").is_err());
    /// ```
    pub fn from_id_list(text: &str) -> Result<Self> {
        let recids = text
            .split_whitespace()
            .map(|token| {
                token.parse::<u64>().map_err(|_| {
                    MarcfixError::InvalidInput(format!("'{token}' is not a record ID"))
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Dedupe035Rule { denylist: recids })
    }

    /// Whether a record ID is on the denylist.
    #[must_use]
    pub fn contains(&self, recid: &str) -> bool {
        recid
            .parse::<u64>()
            .is_ok_and(|id| self.denylist.contains(&id))
    }

    /// Number of record IDs on the denylist.
    #[must_use]
    pub fn len(&self) -> usize {
        self.denylist.len()
    }

    /// Whether the denylist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.denylist.is_empty()
    }
}

/// Keep only the first arXiv 035; others pass through.
fn dedupe_arxiv_035(fields: &mut Vec<Field>) {
    let mut seen = false;
    fields.retain(|field| {
        if !is_arxiv_sourced(field) {
            return true;
        }
        let keep = !seen;
        seen = true;
        keep
    });
}

impl CorrectionRule for Dedupe035Rule {
    fn name(&self) -> &'static str {
        "dedupe-035"
    }

    fn correct(&self, record: &MarcRecord) -> Result<Option<Vec<Field>>> {
        if !record.recid().is_some_and(|id| self.contains(id)) {
            return Ok(None);
        }

        let mut fields = record.field_maps("035");
        dedupe_arxiv_035(&mut fields);
        fields.extend(record.field_maps("037"));
        Ok(Some(fields))
    }
}
