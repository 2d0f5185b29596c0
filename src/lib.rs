#![warn(missing_docs)]

//! # marcfix: batch corrections for INSPIRE-HEP MARCXML
//!
//! Tools for fixing known data-entry errors in bibliographic records held by
//! INSPIRE-HEP. Records are fetched from the search endpoint (or read from
//! files saved earlier), each record is checked by one correction rule, and
//! the replacement fields are written to a minimal MARCXML file for upload
//! with the batch uploader in `correct` mode.
//!
//! ## Quick Start
//!
//! ```
//! use marcfix::pipeline::run_rule;
//! use marcfix::rules::{PubinfoRule, VenueCorrection};
//! use marcfix::writer::to_marcxml;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record>
//!     <controlfield tag="001">1189273</controlfield>
//!     <datafield tag="773" ind1=" " ind2=" ">
//!       <subfield code="x">Nucl. Instrum. Methods A630 (2011) 1-319,</subfield>
//!     </datafield>
//!   </record>
//! </collection>"#;
//!
//! let rule = PubinfoRule::new(vec![VenueCorrection::new(
//!     "Nucl. Instrum. Methods",
//!     "Nucl.Instrum.Meth.",
//! )?]);
//! let result = run_rule(&rule, &[page])?;
//! assert_eq!(result.summary.corrected, 1);
//!
//! let xml = to_marcxml(&result.corrected)?;
//! assert!(xml.contains(r#"<subfield code="c">pp.1-319</subfield>"#));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`marcxml`]: Parsing MARCXML result pages into records
//! - [`record`]: Raw records and subfield mappings
//! - [`rules`]: The correction rules (773 pubinfo, arXiv 035/037, duplicate 035)
//! - [`arxiv`]: Primary category lookup over arXiv OAI-PMH
//! - [`fetch`]: Paginated INSPIRE searches
//! - [`writer`]: MARCXML output of corrected fields
//! - [`pipeline`]: Running a rule over a batch and summarizing the run
//! - [`doi`]: DOI extraction from tab-separated exports
//! - [`config`]: Service endpoints, page size, timeouts
//! - [`error`]: Error type

pub mod arxiv;
pub mod config;
pub mod doi;
pub mod error;
pub mod fetch;
pub mod marcxml;
pub mod pipeline;
pub mod record;
pub mod rules;
pub mod writer;

pub use arxiv::{ArxivClient, CategoryLookup};
pub use config::{ArxivConfig, InspireConfig};
pub use error::{MarcfixError, Result};
pub use fetch::{fetch_records, InspireClient, RecordSource};
pub use pipeline::{run_rule, RunResult, RunSummary};
pub use record::{CorrectedRecord, Field, FieldBuilder, MarcRecord, RawDataField, RawSubfield, Subfields};
pub use rules::{CorrectionRule, ReviewItem, RuleOutcome};
pub use writer::{to_marcxml, write_corrected_marcxml};
