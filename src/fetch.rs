//! Paginated record retrieval from INSPIRE.
//!
//! INSPIRE returns at most `rg` records per request and reports the total
//! number of hits in a comment inside the first page. Pages are requested
//! with `jrec = 1, 1 + rg, 1 + 2·rg, …` until the total is covered, and each
//! page is written verbatim to its own `records<jrec>_*.xml` file.

use crate::config::InspireConfig;
use crate::error::Result;
use crate::marcxml;
use crate::writer::write_unique;
use std::path::{Path, PathBuf};

/// A search service returning MARCXML result pages.
pub trait RecordSource {
    /// Run `pattern` and return the page of up to `page_size` records
    /// starting at the 1-based position `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the search cannot be performed.
    fn search(&self, pattern: &str, page_size: usize, start: usize) -> Result<String>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn search(&self, pattern: &str, page_size: usize, start: usize) -> Result<String> {
        (**self).search(pattern, page_size, start)
    }
}

/// Blocking client for the INSPIRE search endpoint.
#[derive(Debug)]
pub struct InspireClient {
    client: reqwest::blocking::Client,
    config: InspireConfig,
}

impl InspireClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: InspireConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("marcfix/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(InspireClient { client, config })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &InspireConfig {
        &self.config
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

impl RecordSource for InspireClient {
    fn search(&self, pattern: &str, page_size: usize, start: usize) -> Result<String> {
        let url = self.search_url();
        log::debug!("GET {url} p={pattern} rg={page_size} jrec={start}");

        let rg = page_size.to_string();
        let jrec = start.to_string();
        let body = self
            .client
            .get(&url)
            .query(&[
                ("p", pattern),
                ("of", "xm"),
                ("rg", rg.as_str()),
                ("jrec", jrec.as_str()),
                ("wl", "0"),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }
}

/// The `jrec` values needed to cover `total` hits.
///
/// # Examples
///
/// ```
/// use marcfix::fetch::page_starts;
///
/// assert_eq!(page_starts(120, 50).collect::<Vec<_>>(), vec![1, 51, 101]);
/// assert_eq!(page_starts(0, 50).count(), 0);
/// ```
pub fn page_starts(total: usize, page_size: usize) -> impl Iterator<Item = usize> {
    (1..=total).step_by(page_size.max(1))
}

/// Build a search pattern matching the given record IDs.
///
/// # Examples
///
/// ```
/// use marcfix::fetch::recid_pattern;
///
/// assert_eq!(recid_pattern(["1474840", "1397051"]), "recid 1474840 or 1397051");
/// ```
pub fn recid_pattern<I, S>(recids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ids: Vec<String> = recids
        .into_iter()
        .map(|id| id.as_ref().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return String::new();
    }
    format!("recid {}", ids.join(" or "))
}

/// Number of hits for a pattern, as reported by the first result page.
///
/// A page without the total-count comment counts as zero hits.
///
/// # Errors
///
/// Returns an error if the search fails or the page is not XML.
pub fn count_matches<S: RecordSource + ?Sized>(source: &S, pattern: &str) -> Result<usize> {
    let page = source.search(pattern, 1, 1)?;
    Ok(marcxml::total_results(&page)?.unwrap_or(0))
}

fn write_page(outdir: &Path, start: usize, xml: &str) -> Result<PathBuf> {
    let n_records = marcxml::count_records(xml)?;
    let path = write_unique(outdir, &format!("records{start}_"), ".xml", xml)?;
    log::info!("Wrote {n_records} records to file {}", path.display());
    Ok(path)
}

/// Fetch every page of results for `pattern` into `outdir`.
///
/// Returns the paths of the files written, in page order. If the first page
/// reports no hits, nothing is written and the list is empty.
///
/// # Errors
///
/// Returns an error if a request fails, a page is not XML, or a file cannot
/// be written.
pub fn fetch_records<S: RecordSource + ?Sized>(
    source: &S,
    pattern: &str,
    page_size: usize,
    outdir: &Path,
) -> Result<Vec<PathBuf>> {
    let page_size = page_size.max(1);
    if pattern.contains('*') {
        log::warn!("Wildcard searches may need an authenticated INSPIRE session");
    }

    let first = source.search(pattern, page_size, 1)?;
    let total = match marcxml::total_results(&first)? {
        Some(total) if total > 0 => total,
        _ => {
            log::info!("No records found for '{pattern}'");
            return Ok(Vec::new());
        }
    };
    log::info!("Total amount of results: {total}");

    let mut paths = vec![write_page(outdir, 1, &first)?];
    for start in page_starts(total, page_size).skip(1) {
        let page = source.search(pattern, page_size, start)?;
        paths.push(write_page(outdir, start, &page)?);
    }

    Ok(paths)
}
