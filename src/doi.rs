//! DOI extraction from tab-separated publisher exports.
//!
//! Exports carry DOIs in a `DOI` column and, often mangled, inside the free
//! text of a `Reference` column. Both are scanned; DOIs already known to
//! INSPIRE can then be filtered out and the rest written one per line.

use crate::error::{MarcfixError, Result};
use crate::fetch::{count_matches, RecordSource};
use crate::writer::write_unique;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref DOI: Regex = Regex::new(r"(\d{2}\.\d{4}.*/.*)").unwrap();
}

/// Columns scanned for DOIs.
const DOI_COLUMNS: [&str; 2] = ["DOI", "Reference"];

/// Clean up a DOI candidate.
///
/// Trailing `>`, `.` and `,` are removed, as are non-breaking spaces and
/// anything from `/meta` on.
///
/// # Examples
///
/// ```
/// use marcfix::doi::clean_doi;
///
/// assert_eq!(clean_doi("10.1016/j.nima.2011.01.001."), "10.1016/j.nima.2011.01.001");
/// assert_eq!(clean_doi("10.1088/1748-0221/7/01/P01001/meta>"), "10.1088/1748-0221/7/01/P01001");
/// ```
#[must_use]
pub fn clean_doi(text: &str) -> String {
    let text = text
        .trim_end_matches('>')
        .trim_end_matches('.')
        .trim_end_matches(',')
        .replace('\u{a0}', "");
    match text.split_once("/meta") {
        Some((head, _)) => head.to_string(),
        None => text,
    }
}

/// Find a DOI in a piece of text.
#[must_use]
pub fn find_doi(text: &str) -> Option<String> {
    let found = DOI.captures(text)?.get(1)?.as_str();
    let first_word = found.split(' ').next().unwrap_or(found);
    Some(clean_doi(first_word))
}

/// Extract the distinct DOIs from a tab-separated export with a header row.
///
/// # Errors
///
/// Returns an error if the input cannot be read as CSV, or if it has neither
/// a `DOI` nor a `Reference` column.
pub fn extract_dois<R: Read>(input: R) -> Result<BTreeSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| DOI_COLUMNS.contains(&name.trim()))
        .map(|(i, _)| i)
        .collect();
    if columns.is_empty() {
        return Err(MarcfixError::InvalidInput(
            "input has no DOI or Reference column".to_string(),
        ));
    }

    let mut dois = BTreeSet::new();
    for row in reader.records() {
        let row = row?;
        for text in columns.iter().filter_map(|&i| row.get(i)) {
            if let Some(doi) = find_doi(text) {
                dois.insert(doi);
            }
        }
    }

    log::info!("Found {} distinct DOIs", dois.len());
    Ok(dois)
}

/// Keep the DOIs for which a `doi:` search finds no record.
///
/// # Errors
///
/// Returns an error if a search fails.
pub fn dois_not_in_inspire<S: RecordSource + ?Sized>(
    source: &S,
    dois: &BTreeSet<String>,
) -> Result<Vec<String>> {
    let mut missing = Vec::new();
    for doi in dois {
        if count_matches(source, &format!("doi:{doi}"))? == 0 {
            missing.push(doi.clone());
        } else {
            log::debug!("{doi} already in INSPIRE");
        }
    }
    Ok(missing)
}

/// Write DOIs one per line to a new `new_dois_*.txt` file in `outdir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_doi_list(dois: &[String], outdir: &Path) -> Result<PathBuf> {
    let mut contents = String::new();
    for doi in dois {
        contents.push_str(doi);
        contents.push('\n');
    }
    let path = write_unique(outdir, "new_dois_", ".txt", &contents)?;
    log::info!("Wrote {} new DOIs to file {}", dois.len(), path.display());
    Ok(path)
}
