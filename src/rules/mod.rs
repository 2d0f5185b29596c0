//! Field correction rules.
//!
//! Each known data-entry error is handled by one [`CorrectionRule`]. A rule
//! looks at a single [`MarcRecord`] and either produces the replacement
//! fields, declares the record out of its scope, or fails with an error that
//! the caller turns into a review item. Rules hold their parameters (venue
//! names, denylists, lookup clients) and keep no state between records.
//!
//! # Example
//!
//! ```
//! use marcfix::marcxml;
//! use marcfix::rules::{CorrectionRule, PubinfoRule, RuleOutcome, VenueCorrection};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xml = r#"<record>
//!   <controlfield tag="001">1189273</controlfield>
//!   <datafield tag="773" ind1=" " ind2=" ">
//!     <subfield code="x">Nucl. Instrum. Methods A630 (2011) 1-319,</subfield>
//!   </datafield>
//! </record>"#;
//!
//! let rule = PubinfoRule::new(vec![VenueCorrection::new(
//!     "Nucl. Instrum. Methods",
//!     "Nucl.Instrum.Meth.",
//! )?]);
//!
//! let record = &marcxml::parse_collection(xml)?[0];
//! match rule.apply(record) {
//!     RuleOutcome::Corrected(fixed) => {
//!         assert_eq!(fixed.fields[0].get('c'), Some("pp.1-319"));
//!     }
//!     other => panic!("unexpected outcome {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod arxiv;
pub mod dedupe;
pub mod pubinfo;

pub use arxiv::{normalize_report_number, ArxivRule};
pub use dedupe::Dedupe035Rule;
pub use pubinfo::{PubinfoRule, VenueCorrection};

use crate::error::Result;
use crate::record::{CorrectedRecord, Field, MarcRecord};
use serde::{Deserialize, Serialize};

/// A record that could not be corrected automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    /// Record ID, if the record had one
    pub recid: Option<String>,
    /// Why the record was set aside
    pub reason: String,
}

/// Result of applying a rule to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Replacement fields were produced.
    Corrected(CorrectedRecord),
    /// The record does not have the error this rule fixes.
    NotApplicable,
    /// The record has the error but could not be fixed automatically.
    NeedsReview(ReviewItem),
}

/// A correction for one known kind of malformed record.
pub trait CorrectionRule: std::fmt::Debug {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Compute replacement fields for a record.
    ///
    /// Returns `Ok(None)` when the record is outside this rule's scope.
    ///
    /// # Errors
    ///
    /// Returns an error when the record is in scope but cannot be corrected,
    /// e.g. an unparseable citation or a failed external lookup.
    fn correct(&self, record: &MarcRecord) -> Result<Option<Vec<Field>>>;

    /// Apply the rule, folding errors into [`RuleOutcome::NeedsReview`].
    fn apply(&self, record: &MarcRecord) -> RuleOutcome {
        let recid = record.recid().map(String::from);
        match self.correct(record) {
            Ok(Some(fields)) => RuleOutcome::Corrected(CorrectedRecord::new(recid, fields)),
            Ok(None) => RuleOutcome::NotApplicable,
            Err(e) => RuleOutcome::NeedsReview(ReviewItem {
                recid,
                reason: e.to_string(),
            }),
        }
    }
}

impl<R: CorrectionRule + ?Sized> CorrectionRule for &R {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn correct(&self, record: &MarcRecord) -> Result<Option<Vec<Field>>> {
        (**self).correct(record)
    }
}

impl<R: CorrectionRule + ?Sized> CorrectionRule for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn correct(&self, record: &MarcRecord) -> Result<Option<Vec<Field>>> {
        (**self).correct(record)
    }
}

/// Whether a field's subfield 9 (source) mentions arXiv.
pub(crate) fn is_arxiv_sourced(field: &Field) -> bool {
    field.subfield_contains_ci('9', "arxiv")
}
