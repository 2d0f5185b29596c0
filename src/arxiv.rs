//! arXiv primary category lookup over OAI-PMH.
//!
//! The category of a preprint is read from the `arXiv` metadata format:
//! the `<categories>` element holds a space separated list whose first entry
//! is the primary category. Old identifiers may carry a `physics:` archive
//! prefix on the category, which is removed.

use crate::config::ArxivConfig;
use crate::error::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::cell::Cell;
use std::thread;
use std::time::Instant;

/// Something that can tell the primary category of an arXiv report.
pub trait CategoryLookup {
    /// Look up the primary category for a normalized report number
    /// (e.g. `1608.01541` or `hep-th/9901001`).
    ///
    /// Returns `Ok(None)` when the service has no category for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or answers with a
    /// document that is not XML.
    fn primary_category(&self, report_number: &str) -> Result<Option<String>>;
}

impl<L: CategoryLookup + ?Sized> CategoryLookup for &L {
    fn primary_category(&self, report_number: &str) -> Result<Option<String>> {
        (**self).primary_category(report_number)
    }
}

/// Read the primary category out of an OAI-PMH `GetRecord` response.
///
/// Returns `Ok(None)` for OAI error documents and records without
/// categories.
///
/// # Errors
///
/// Returns an error if the response is not well-formed XML.
///
/// # Examples
///
/// ```
/// use marcfix::arxiv::parse_primary_category;
///
/// let xml = r#"<OAI-PMH><GetRecord><record><metadata>
///   <arXiv><categories>physics:hep-ex hep-ph</categories></arXiv>
/// </metadata></record></GetRecord></OAI-PMH>"#;
/// assert_eq!(parse_primary_category(xml).unwrap(), Some("hep-ex".to_string()));
/// ```
pub fn parse_primary_category(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_record = false;
    let mut in_categories = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"record" => in_record = true,
                b"categories" if in_record => in_categories = true,
                _ => {}
            },
            Event::Text(e) if in_categories => {
                let text = e.unescape()?;
                let primary = text
                    .split_whitespace()
                    .next()
                    .map(|cat| cat.replace("physics:", "").trim().to_string())
                    .filter(|cat| !cat.is_empty());
                return Ok(primary);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"categories" => in_categories = false,
                b"record" => in_record = false,
                _ => {}
            },
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Blocking client for the arXiv OAI-PMH endpoint.
///
/// Consecutive requests are spaced by [`ArxivConfig::delay`].
#[derive(Debug)]
pub struct ArxivClient {
    client: reqwest::blocking::Client,
    config: ArxivConfig,
    last_request: Cell<Option<Instant>>,
}

impl ArxivClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ArxivConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("marcfix/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(ArxivClient {
            client,
            config,
            last_request: Cell::new(None),
        })
    }

    /// Sleep until the configured delay since the previous request has passed.
    fn pace(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.config.delay {
                thread::sleep(self.config.delay - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    /// Fetch the raw `GetRecord` response for a report number.
    ///
    /// Returns `Ok(None)` if the endpoint answers with a non-success status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn get_record(&self, report_number: &str) -> Result<Option<String>> {
        self.pace();

        let identifier = format!("oai:arXiv.org:{report_number}");
        log::debug!("Requesting {identifier} from {}", self.config.base_url);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("verb", "GetRecord"),
                ("identifier", identifier.as_str()),
                ("metadataPrefix", "arXiv"),
            ])
            .send()?;

        if !response.status().is_success() {
            log::debug!("arXiv returned {} for {identifier}", response.status());
            return Ok(None);
        }

        Ok(Some(response.text()?))
    }
}

impl CategoryLookup for ArxivClient {
    fn primary_category(&self, report_number: &str) -> Result<Option<String>> {
        match self.get_record(report_number)? {
            Some(body) => parse_primary_category(&body),
            None => Ok(None),
        }
    }
}
