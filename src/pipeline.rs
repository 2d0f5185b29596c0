//! Running one correction rule over a batch of collections.

use crate::error::Result;
use crate::marcxml::parse_collection;
use crate::record::CorrectedRecord;
use crate::rules::{CorrectionRule, ReviewItem, RuleOutcome};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Counts and review items collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Name of the rule that was applied
    pub rule: String,
    /// Records looked at
    pub records_seen: usize,
    /// Records for which replacement fields were produced
    pub corrected: usize,
    /// Records the rule did not apply to
    pub not_applicable: usize,
    /// Records set aside for manual review
    pub needs_review: Vec<ReviewItem>,
}

impl RunSummary {
    /// Create an empty summary for a rule.
    #[must_use]
    pub fn new(rule: &str) -> Self {
        RunSummary {
            rule: rule.to_string(),
            ..Default::default()
        }
    }

    /// Log the totals and every review item.
    pub fn log(&self) {
        log::info!(
            "{}: {} records seen, {} corrected, {} not applicable, {} need review",
            self.rule,
            self.records_seen,
            self.corrected,
            self.not_applicable,
            self.needs_review.len()
        );
        for item in &self.needs_review {
            log::warn!(
                "Record {} needs review: {}",
                item.recid.as_deref().unwrap_or("<no 001>"),
                item.reason
            );
        }
    }

    /// Write the summary as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Records corrected in a run together with its summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Corrected records, in input order
    pub corrected: Vec<CorrectedRecord>,
    /// Summary of the run
    pub summary: RunSummary,
}

/// Read every `*.xml` file in `dir`, sorted by file name.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be read.
pub fn load_local_collections(dir: &Path) -> Result<Vec<String>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "xml"));
    paths.sort();

    log::debug!("Loading {} files from {}", paths.len(), dir.display());
    paths
        .iter()
        .map(|p| fs::read_to_string(p).map_err(Into::into))
        .collect()
}

/// Apply `rule` to every record of every document, in order.
///
/// # Errors
///
/// Returns an error if a document is not well-formed MARCXML. Problems with
/// individual records end up in [`RunSummary::needs_review`] instead.
pub fn run_rule<R, D>(rule: &R, documents: &[D]) -> Result<RunResult>
where
    R: CorrectionRule + ?Sized,
    D: AsRef<str>,
{
    let mut result = RunResult {
        corrected: Vec::new(),
        summary: RunSummary::new(rule.name()),
    };

    for document in documents {
        for record in parse_collection(document.as_ref())? {
            result.summary.records_seen += 1;
            match rule.apply(&record) {
                RuleOutcome::Corrected(fixed) => {
                    result.summary.corrected += 1;
                    result.corrected.push(fixed);
                }
                RuleOutcome::NotApplicable => result.summary.not_applicable += 1,
                RuleOutcome::NeedsReview(item) => {
                    log::debug!(
                        "{}: record {} needs review: {}",
                        rule.name(),
                        item.recid.as_deref().unwrap_or("<no 001>"),
                        item.reason
                    );
                    result.summary.needs_review.push(item);
                }
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{PubinfoRule, VenueCorrection};

    const PAGE: &str = r#"<collection>
  <record>
    <controlfield tag="001">1</controlfield>
    <datafield tag="773" ind1=" " ind2=" ">
      <subfield code="x">Nucl. Instrum. Methods A630 (2011) 1-319</subfield>
    </datafield>
  </record>
  <record>
    <controlfield tag="001">2</controlfield>
    <datafield tag="773" ind1=" " ind2=" ">
      <subfield code="p">Phys.Lett.B</subfield>
    </datafield>
  </record>
  <record>
    <controlfield tag="001">3</controlfield>
    <datafield tag="773" ind1=" " ind2=" ">
      <subfield code="x">Nucl. Instrum. Methods, to appear</subfield>
    </datafield>
  </record>
</collection>"#;

    fn rule() -> PubinfoRule {
        PubinfoRule::new(vec![
            VenueCorrection::new("Nucl. Instrum. Methods", "Nucl.Instrum.Meth.").unwrap()
        ])
    }

    #[test]
    fn test_summary_counts() {
        let result = run_rule(&rule(), &[PAGE]).unwrap();

        assert_eq!(result.summary.rule, "pubinfo");
        assert_eq!(result.summary.records_seen, 3);
        assert_eq!(result.summary.corrected, 1);
        assert_eq!(result.summary.not_applicable, 1);
        assert_eq!(result.summary.needs_review.len(), 1);
        assert_eq!(result.summary.needs_review[0].recid.as_deref(), Some("3"));
        assert_eq!(result.corrected[0].recid.as_deref(), Some("1"));
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(run_rule(&rule(), &["<collection><record>"]).is_err());
    }

    #[test]
    fn test_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        let result = run_rule(&rule(), &[PAGE]).unwrap();
        result.summary.write_json(&path).unwrap();

        let back: RunSummary =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, result.summary);
    }

    #[test]
    fn test_load_local_collections_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("records51_b.xml"), "<collection/>").unwrap();
        fs::write(dir.path().join("records1_a.xml"), PAGE).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load_local_collections(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], PAGE);
        assert_eq!(docs[1], "<collection/>");
    }
}
