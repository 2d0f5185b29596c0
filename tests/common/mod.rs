//! Common test helpers and fixtures shared across the test suite.

#![allow(dead_code)]

use marcfix::{CategoryLookup, MarcfixError, RecordSource, Result};
use std::cell::RefCell;
use std::collections::HashMap;

/// A result page as returned by INSPIRE for a 773 pubinfo search.
pub const PUBINFO_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Search-Engine-Total-Number-Of-Results: 3 -->
<collection xmlns="http://www.loc.gov/MARC21/slim">
<record>
  <controlfield tag="001">1189273</controlfield>
  <controlfield tag="005">20160802131042.0</controlfield>
  <datafield tag="773" ind1=" " ind2=" ">
    <subfield code="x">Nucl. Instrum. Methods A630 (2011) 1-319,</subfield>
  </datafield>
</record>
<record>
  <controlfield tag="001">1397051</controlfield>
  <datafield tag="773" ind1=" " ind2=" ">
    <subfield code="c">04001</subfield>
    <subfield code="p">EPJ Web Conf.</subfield>
    <subfield code="v">95</subfield>
    <subfield code="x">EPJ Web Conf. 95 (2015) 04001</subfield>
    <subfield code="y">2015</subfield>
  </datafield>
</record>
<record>
  <controlfield tag="001">1245045</controlfield>
  <datafield tag="773" ind1=" " ind2=" ">
    <subfield code="x">Nucl. Instrum. Methods, in press</subfield>
  </datafield>
</record>
</collection>"#;

/// A result page with arXiv 035/037 fields in various states.
pub const ARXIV_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<collection xmlns="http://www.loc.gov/MARC21/slim">
<record>
  <controlfield tag="001">1474840</controlfield>
  <datafield tag="035" ind1=" " ind2=" ">
    <subfield code="a">Gorkavyi:2016bcu</subfield>
    <subfield code="9">INSPIRETeX</subfield>
  </datafield>
  <datafield tag="037" ind1=" " ind2=" ">
    <subfield code="a">arXiv:1608.01541</subfield>
    <subfield code="9">arXiv</subfield>
  </datafield>
</record>
<record>
  <controlfield tag="001">1384910</controlfield>
  <datafield tag="035" ind1=" " ind2=" ">
    <subfield code="a">oai:arXiv.org:hep-th/9901001</subfield>
    <subfield code="9">arXiv</subfield>
  </datafield>
  <datafield tag="037" ind1=" " ind2=" ">
    <subfield code="a">hep-th/9901001</subfield>
    <subfield code="9">arXiv</subfield>
  </datafield>
</record>
<record>
  <controlfield tag="001">1374332</controlfield>
  <datafield tag="037" ind1=" " ind2=" ">
    <subfield code="a">arXiv:submit/0123456</subfield>
    <subfield code="9">arXiv</subfield>
  </datafield>
</record>
<record>
  <controlfield tag="001">1358160</controlfield>
  <datafield tag="037" ind1=" " ind2=" ">
    <subfield code="a">1301.00001</subfield>
    <subfield code="9">arXiv</subfield>
  </datafield>
</record>
</collection>"#;

/// Build a result page with `n` minimal records and the total-count comment.
pub fn result_page(total: usize, first_recid: usize, n: usize) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!-- Search-Engine-Total-Number-Of-Results: {total} -->\n\
         <collection xmlns=\"http://www.loc.gov/MARC21/slim\">\n"
    );
    for recid in first_recid..first_recid + n {
        xml.push_str(&format!(
            "<record><controlfield tag=\"001\">{recid}</controlfield></record>\n"
        ));
    }
    xml.push_str("</collection>\n");
    xml
}

/// A record source that serves a fixed number of synthetic hits and
/// remembers every request.
#[derive(Debug, Default)]
pub struct MockSource {
    /// Hits per pattern; unknown patterns have none
    pub totals: HashMap<String, usize>,
    /// (pattern, page_size, start) of every call
    pub requests: RefCell<Vec<(String, usize, usize)>>,
}

impl MockSource {
    pub fn with_total(pattern: &str, total: usize) -> Self {
        let mut source = MockSource::default();
        source.totals.insert(pattern.to_string(), total);
        source
    }

    pub fn starts(&self) -> Vec<usize> {
        self.requests.borrow().iter().map(|(_, _, s)| *s).collect()
    }
}

impl RecordSource for MockSource {
    fn search(&self, pattern: &str, page_size: usize, start: usize) -> Result<String> {
        self.requests
            .borrow_mut()
            .push((pattern.to_string(), page_size, start));

        let Some(&total) = self.totals.get(pattern) else {
            return Ok(result_page(0, 0, 0));
        };
        let remaining = total.saturating_sub(start - 1);
        Ok(result_page(total, start, remaining.min(page_size)))
    }
}

/// Category lookup backed by a map; unknown reports have no category.
#[derive(Debug, Default)]
pub struct MockLookup {
    pub categories: HashMap<String, String>,
    pub unreachable: bool,
    pub calls: RefCell<Vec<String>>,
}

impl MockLookup {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        MockLookup {
            categories: entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..Default::default()
        }
    }
}

impl CategoryLookup for MockLookup {
    fn primary_category(&self, report_number: &str) -> Result<Option<String>> {
        self.calls.borrow_mut().push(report_number.to_string());
        if self.unreachable {
            return Err(MarcfixError::Lookup("export.arxiv.org unreachable".to_string()));
        }
        Ok(self.categories.get(report_number).cloned())
    }
}
