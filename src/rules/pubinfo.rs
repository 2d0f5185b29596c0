//! Publication info (773) correction.
//!
//! Some records carry the whole citation as free text in `773__x`, e.g.
//! `Nucl. Instrum. Methods A630 (2011) 1-319,`, sometimes with a venue name
//! that is not the canonical INSPIRE short title. The rule splits that text
//! into journal (`p`), volume (`v`), year (`y`) and pages (`c`, prefixed with
//! `pp.`) and drops `x`.

use super::CorrectionRule;
use crate::error::{MarcfixError, Result};
use crate::record::{Field, MarcRecord};
use regex::Regex;

/// A known-wrong venue name and the name it should be replaced with.
#[derive(Debug, Clone)]
pub struct VenueCorrection {
    wrong: String,
    correct: String,
    name: Regex,
    citation: Regex,
}

/// Build a pattern for a venue name that tolerates whitespace differences.
fn venue_pattern(name: &str) -> String {
    name.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*")
}

impl VenueCorrection {
    /// Create a correction from the wrong and the correct venue name.
    ///
    /// # Errors
    ///
    /// Returns [`MarcfixError::InvalidInput`] if either name is blank.
    pub fn new(wrong: &str, correct: &str) -> Result<Self> {
        // Matched against cleaned pubinfo, so the name is cleaned the same way.
        let cleaned = clean_pubinfo(wrong);
        if cleaned.is_empty() || correct.trim().is_empty() {
            return Err(MarcfixError::InvalidInput(
                "Venue names must not be empty".to_string(),
            ));
        }

        let name = venue_pattern(&cleaned);
        let citation = format!(
            r"{name}\s*(?P<volume>[^\s(]+)\s*\((?P<year>\d{{4}})\)\s*(?P<pages>[^\s-]+(?:\s*-\s*[^\s-]+)?)\s*$"
        );

        Ok(VenueCorrection {
            wrong: wrong.trim().to_string(),
            correct: correct.trim().to_string(),
            name: Regex::new(&name).map_err(|e| MarcfixError::InvalidInput(e.to_string()))?,
            citation: Regex::new(&citation)
                .map_err(|e| MarcfixError::InvalidInput(e.to_string()))?,
        })
    }

    /// The wrong venue name as given.
    #[must_use]
    pub fn wrong(&self) -> &str {
        &self.wrong
    }

    /// The replacement venue name.
    #[must_use]
    pub fn correct(&self) -> &str {
        &self.correct
    }

    /// Whether the wrong name occurs in `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.name.is_match(text)
    }
}

/// Remove commas and `pp.` markers from a pubinfo string.
#[must_use]
pub fn clean_pubinfo(text: &str) -> String {
    text.replace(',', "").replace("pp.", "").trim().to_string()
}

/// Splits `773__x` pubinfo into structured subfields.
#[derive(Debug, Clone)]
pub struct PubinfoRule {
    venues: Vec<VenueCorrection>,
}

impl PubinfoRule {
    /// Create the rule with venue corrections tried in order.
    #[must_use]
    pub fn new(venues: Vec<VenueCorrection>) -> Self {
        PubinfoRule { venues }
    }

    /// Correct a single 773 mapping.
    ///
    /// If `x` names one of the wrong venues, it is replaced by `c`, `v`, `y`
    /// and `p`; otherwise `x` is just removed. Other subfields are kept.
    ///
    /// # Errors
    ///
    /// Returns [`MarcfixError::PatternMismatch`] if the wrong venue occurs
    /// but the text is not of the form `<name> <volume> (<year>) <pages>`,
    /// or if removing `x` would leave the field without subfields.
    pub fn correct_field(&self, field: &Field) -> Result<Field> {
        let mut fixed = field.clone();
        let Some(pubinfo) = fixed.remove('x') else {
            return Ok(fixed);
        };

        let text = clean_pubinfo(&pubinfo);
        let Some(venue) = self.venues.iter().find(|v| v.matches(&text)) else {
            if fixed.subfields.is_empty() {
                return Err(MarcfixError::PatternMismatch(format!(
                    "'{pubinfo}' names no known venue and is the only pubinfo"
                )));
            }
            return Ok(fixed);
        };

        let caps = venue.citation.captures(&text).ok_or_else(|| {
            MarcfixError::PatternMismatch(format!(
                "'{pubinfo}' does not look like '{} <volume> (<year>) <pages>'",
                venue.wrong()
            ))
        })?;

        let pages: String = caps["pages"].split_whitespace().collect();
        fixed.set('c', format!("pp.{pages}"));
        fixed.set('v', &caps["volume"]);
        fixed.set('y', &caps["year"]);
        fixed.set('p', venue.correct());

        Ok(fixed)
    }
}

impl CorrectionRule for PubinfoRule {
    fn name(&self) -> &'static str {
        "pubinfo"
    }

    fn correct(&self, record: &MarcRecord) -> Result<Option<Vec<Field>>> {
        let fields = record.field_maps("773");
        if !fields.iter().any(|f| f.get('x').is_some()) {
            return Ok(None);
        }

        fields
            .iter()
            .map(|f| self.correct_field(f))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawDataField;
    use crate::record::RawSubfield;

    fn nim_rule() -> PubinfoRule {
        PubinfoRule::new(vec![
            VenueCorrection::new("Nucl. Instrum. Methods", "Nucl.Instrum.Meth.").unwrap()
        ])
    }

    fn x_field(text: &str) -> Field {
        Field::builder("773").subfield('x', text).build()
    }

    #[test]
    fn test_worked_example() {
        let fixed = nim_rule()
            .correct_field(&x_field("Nucl. Instrum. Methods A630 (2011) 1-319,"))
            .unwrap();

        let expected = Field::builder("773")
            .subfield('c', "pp.1-319")
            .subfield('v', "A630")
            .subfield('y', "2011")
            .subfield('p', "Nucl.Instrum.Meth.")
            .build();
        assert_eq!(fixed, expected);
    }

    #[test]
    fn test_pp_marker_and_spaced_range() {
        let err = nim_rule()
            .correct_field(&x_field("Nucl. Instrum. Methods A 630, (2011), pp. 12 - 19"))
            .unwrap_err();
        // Volume must be a single token.
        assert!(matches!(err, MarcfixError::PatternMismatch(_)));

        let fixed = nim_rule()
            .correct_field(&x_field("Nucl. Instrum. Methods A630, (2011), pp. 12 - 19"))
            .unwrap();
        assert_eq!(fixed.get('c'), Some("pp.12-19"));
        assert_eq!(fixed.get('v'), Some("A630"));
    }

    #[test]
    fn test_whitespace_variant_of_venue() {
        let fixed = nim_rule()
            .correct_field(&x_field("Nucl.Instrum.Methods A630 (2011) 1-319"))
            .unwrap();
        assert_eq!(fixed.get('p'), Some("Nucl.Instrum.Meth."));
    }

    #[test]
    fn test_single_page() {
        let fixed = nim_rule()
            .correct_field(&x_field("Nucl. Instrum. Methods A630 (2011) 04001"))
            .unwrap();
        assert_eq!(fixed.get('c'), Some("pp.04001"));
    }

    #[test]
    fn test_other_venue_only_drops_x() {
        let field = Field::builder("773")
            .subfield('c', "04001")
            .subfield('p', "EPJ Web Conf.")
            .subfield('v', "95")
            .subfield('x', "EPJ Web Conf. 95 (2015) 04001")
            .subfield('y', "2015")
            .build();

        let fixed = nim_rule().correct_field(&field).unwrap();

        let mut expected = field.clone();
        expected.remove('x');
        assert_eq!(fixed, expected);
    }

    #[test]
    fn test_unparseable_pubinfo() {
        let err = nim_rule()
            .correct_field(&x_field("Nucl. Instrum. Methods, in press"))
            .unwrap_err();
        assert!(matches!(err, MarcfixError::PatternMismatch(_)));
    }

    #[test]
    fn test_empty_venue_rejected() {
        assert!(VenueCorrection::new("  ", "Nucl.Instrum.Meth.").is_err());
        assert!(VenueCorrection::new(", pp.", "Nucl.Instrum.Meth.").is_err());
    }

    #[test]
    fn test_venue_with_comma() {
        let rule = PubinfoRule::new(vec![VenueCorrection::new(
            "Nucl. Instrum. Methods Phys. Res., Sect. A",
            "Nucl.Instrum.Meth.A",
        )
        .unwrap()]);

        let fixed = rule
            .correct_field(&x_field(
                "Nucl. Instrum. Methods Phys. Res., Sect. A 630 (2011) 1-319",
            ))
            .unwrap();

        assert_eq!(fixed.get('p'), Some("Nucl.Instrum.Meth.A"));
        assert_eq!(fixed.get('v'), Some("630"));
        assert_eq!(fixed.get('c'), Some("pp.1-319"));
        assert_eq!(fixed.get('x'), None);
    }

    #[test]
    fn test_lone_unknown_pubinfo_is_not_erased() {
        let err = nim_rule()
            .correct_field(&x_field("Phys. Rev. D 93 (2016) 012001"))
            .unwrap_err();
        assert!(matches!(err, MarcfixError::PatternMismatch(_)));

        let mut record = MarcRecord::new();
        record.add_control_field("001", "1245045");
        record.datafields.push(RawDataField {
            tag: "773".to_string(),
            subfields: vec![RawSubfield {
                code: Some("x".to_string()),
                value: Some("Phys. Rev. D 93 (2016) 012001".to_string()),
            }],
            ..Default::default()
        });
        assert!(matches!(
            nim_rule().apply(&record),
            crate::rules::RuleOutcome::NeedsReview(_)
        ));
    }

    #[test]
    fn test_first_matching_venue_wins() {
        let rule = PubinfoRule::new(vec![
            VenueCorrection::new("Phys. Rev. Lett.", "Phys.Rev.Lett.").unwrap(),
            VenueCorrection::new("Nucl. Instrum. Methods", "Nucl.Instrum.Meth.").unwrap(),
        ]);
        let fixed = rule
            .correct_field(&x_field("Phys. Rev. Lett. 116 (2016) 061102"))
            .unwrap();
        assert_eq!(fixed.get('p'), Some("Phys.Rev.Lett."));
        assert_eq!(fixed.get('v'), Some("116"));
    }

    #[test]
    fn test_record_without_x_is_not_applicable() {
        let mut record = MarcRecord::new();
        record.datafields.push(RawDataField {
            tag: "773".to_string(),
            subfields: vec![RawSubfield {
                code: Some("p".to_string()),
                value: Some("Nucl.Instrum.Meth.".to_string()),
            }],
            ..Default::default()
        });
        assert_eq!(nim_rule().correct(&record).unwrap(), None);
    }

    #[test]
    fn test_record_emits_all_773s() {
        let mut record = MarcRecord::new();
        for (code, value) in [
            ("x", "Nucl. Instrum. Methods A630 (2011) 1-319"),
            ("p", "Phys.Lett.B"),
        ] {
            record.datafields.push(RawDataField {
                tag: "773".to_string(),
                subfields: vec![RawSubfield {
                    code: Some(code.to_string()),
                    value: Some(value.to_string()),
                }],
                ..Default::default()
            });
        }

        let fields = nim_rule().correct(&record).unwrap().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].get('v'), Some("A630"));
        assert_eq!(fields[1].get('p'), Some("Phys.Lett.B"));
    }
}
