//! Configuration for the external services used during a run.
//!
//! Both structs are plain data with public fields and a [`Default`] that
//! points at the public production endpoints. The binary fills them from
//! command-line flags and the `INSPIRE_URL` / `ARXIV_OAI_URL` environment
//! variables.

use std::time::Duration;

/// Default INSPIRE base URL.
pub const DEFAULT_INSPIRE_URL: &str = "https://inspirehep.net";

/// Default arXiv OAI-PMH endpoint.
pub const DEFAULT_ARXIV_OAI_URL: &str = "http://export.arxiv.org/oai2";

/// Settings for INSPIRE searches.
///
/// # Examples
///
/// ```
/// use marcfix::config::InspireConfig;
///
/// let config = InspireConfig::default().with_page_size(10);
/// assert_eq!(config.page_size, 10);
/// assert_eq!(config.base_url, "https://inspirehep.net");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspireConfig {
    /// Base URL; `/search` is appended
    pub base_url: String,
    /// Records requested per page (`rg`)
    pub page_size: usize,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for InspireConfig {
    fn default() -> Self {
        InspireConfig {
            base_url: DEFAULT_INSPIRE_URL.to_string(),
            page_size: 50,
            timeout: Duration::from_secs(60),
        }
    }
}

impl InspireConfig {
    /// Use a different base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Use a different page size. Zero is raised to one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Use a different request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Settings for arXiv category lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArxivConfig {
    /// OAI-PMH endpoint
    pub base_url: String,
    /// Minimum pause between two requests
    pub delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        ArxivConfig {
            base_url: DEFAULT_ARXIV_OAI_URL.to_string(),
            delay: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ArxivConfig {
    /// Use a different OAI endpoint.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Use a different pause between requests.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Use a different request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let inspire = InspireConfig::default();
        assert_eq!(inspire.page_size, 50);

        let arxiv = ArxivConfig::default();
        assert_eq!(arxiv.base_url, DEFAULT_ARXIV_OAI_URL);
        assert_eq!(arxiv.delay, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_page_size_is_raised() {
        assert_eq!(InspireConfig::default().with_page_size(0).page_size, 1);
    }

    #[test]
    fn test_struct_update_syntax() {
        let config = ArxivConfig {
            delay: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.delay, Duration::ZERO);
    }
}
