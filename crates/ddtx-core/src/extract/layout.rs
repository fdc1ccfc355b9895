//! Layout recognizers: supplier-specific record shapes tried before the
//! generic field cascades.

use tracing::{debug, trace};

use super::rules::patterns::{ADDRESS_LINE, POSTAL_CODE_START, POSTAL_LINE, SINGLE_LINE_RECORD};
use super::rules::{normalize_date, FieldExtractor, TaxIdExtractor};
use crate::models::Customer;

/// Fields recovered by a layout recognizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutMatch {
    pub number: String,
    /// Normalized `dd/mm/yyyy`, or empty if the record date was invalid.
    pub date: String,
    pub page: String,
    pub customer: Customer,
    /// Zero-based line where the record was found.
    pub line_index: usize,
}

/// A document layout that can be recognized from page lines.
///
/// Recognizers are tried in order by the orchestrator; the first match
/// takes priority over the generic cascades for the fields it fills.
pub trait LayoutRecognizer: Send + Sync {
    /// Layout name, reported on the extraction result.
    fn name(&self) -> &str;

    /// Try to recognize the layout in the given lines.
    fn recognize(&self, lines: &[&str]) -> Option<LayoutMatch>;
}

/// Address split into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

impl PostalAddress {
    /// Street followed by the postal line, as printed.
    pub fn full(&self, postal_line: &str) -> String {
        if postal_line.is_empty() {
            self.street.clone()
        } else {
            format!("{} {}", self.street, postal_line)
        }
    }
}

/// Parse a `ddddd [-] CITY [(PR)]` line.
pub fn parse_postal_line(line: &str) -> Option<(String, String, String)> {
    let caps = POSTAL_LINE.captures(line.trim())?;
    let city = caps[2].trim_end_matches(['-', ',']).trim().to_string();
    let province = caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default();
    Some((caps[1].to_string(), city, province))
}

/// Find the first address line in `lines`, joined with a following postal
/// line when present.
///
/// Returns the printed address and its parts.
pub fn find_address(lines: &[&str]) -> Option<(String, PostalAddress)> {
    let (offset, street) = lines
        .iter()
        .map(|l| l.trim())
        .enumerate()
        .find(|(_, l)| ADDRESS_LINE.is_match(l))?;

    let mut address = PostalAddress {
        street: street.to_string(),
        ..PostalAddress::default()
    };

    let postal_line = lines.get(offset + 1).map(|l| l.trim()).unwrap_or_default();
    let Some(code) = POSTAL_CODE_START.captures(postal_line) else {
        return Some((address.full(""), address));
    };

    match parse_postal_line(postal_line) {
        Some((postal_code, city, province)) => {
            address.postal_code = postal_code;
            address.city = city;
            address.province = province;
        }
        None => address.postal_code = code[1].to_string(),
    }
    Some((address.full(postal_line), address))
}

/// Composite single-line header record:
/// `<number> <date> <page> <customer code> <customer name>`, e.g.
/// `5023 3/06/25 1 20322 DONAC S.R.L.`.
///
/// The customer address and tax id are looked up in a bounded window of
/// lines after the record.
#[derive(Debug, Clone)]
pub struct SingleLineLayout {
    window: usize,
    tax_ids: TaxIdExtractor,
}

impl SingleLineLayout {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            tax_ids: TaxIdExtractor::new(),
        }
    }

    /// Skip these tax ids when looking for the customer's.
    pub fn excluding_tax_ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tax_ids = self.tax_ids.excluding(ids);
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.tax_ids = self.tax_ids.with_validation(validate);
        self
    }
}

impl Default for SingleLineLayout {
    fn default() -> Self {
        Self::new(10)
    }
}

impl LayoutRecognizer for SingleLineLayout {
    fn name(&self) -> &str {
        "single_line"
    }

    fn recognize(&self, lines: &[&str]) -> Option<LayoutMatch> {
        let (index, caps) = lines.iter().enumerate().find_map(|(i, line)| {
            trace!("single_line: checking line {}", i);
            SINGLE_LINE_RECORD.captures(line.trim()).map(|c| (i, c))
        })?;

        debug!("Single-line record found at line {}", index + 1);

        let mut customer = Customer {
            name: caps[5].trim().to_string(),
            code: caps[4].to_string(),
            ..Customer::default()
        };

        let after_end = lines.len().min(index + 1 + self.window);
        if let Some((printed, parts)) = find_address(&lines[index + 1..after_end]) {
            customer.address = printed;
            customer.postal_code = parts.postal_code;
            customer.city = parts.city;
            customer.province = parts.province;
        }

        let window_text = lines[index..after_end].join("\n");
        if let Some(tax_id) = self.tax_ids.extract(&window_text) {
            customer.tax_id = tax_id.value;
        }

        Some(LayoutMatch {
            number: caps[1].to_string(),
            date: normalize_date(&caps[2]),
            page: caps[3].to_string(),
            customer,
            line_index: index,
        })
    }
}
