//! Partita IVA (11-digit Italian tax id) extraction and validation.

use tracing::debug;

use super::patterns::TAX_ID;
use super::{ExtractionMatch, FieldExtractor};

/// Tax id field extractor.
///
/// Returns every labelled tax id in text order, optionally dropping those
/// that fail the checksum or belong to an excluded party.
#[derive(Debug, Clone, Default)]
pub struct TaxIdExtractor {
    validate: bool,
    excluded: Vec<String>,
}

impl TaxIdExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to drop ids that fail the checksum.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Skip these ids (typically the known suppliers' own).
    pub fn excluding(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded.extend(ids.into_iter().map(Into::into));
        self
    }

    fn accepts(&self, id: &str) -> bool {
        if self.excluded.iter().any(|e| e == id) {
            return false;
        }
        if self.validate && !validate_tax_id(id) {
            debug!("Tax id {} rejected by checksum", id);
            return false;
        }
        true
    }
}

impl FieldExtractor for TaxIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();
        for m in TAX_ID.scan(text) {
            if self.accepts(&m.value) && !results.iter().any(|r| r.value == m.value) {
                results.push(m);
            }
        }
        results
    }
}

/// Validate a partita IVA.
///
/// Digits at even positions are summed as-is; digits at odd positions are
/// doubled, minus 9 when the result exceeds 9. The eleventh digit must
/// equal `(10 - sum % 10) % 10`.
pub fn validate_tax_id(id: &str) -> bool {
    let id = id.trim();
    let id = id
        .strip_prefix("IT")
        .or_else(|| id.strip_prefix("it"))
        .unwrap_or(id);

    if id.len() != 11 || !id.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = id.chars().filter_map(|c| c.to_digit(10)).collect();

    let sum: u32 = digits
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                d
            } else if d * 2 > 9 {
                d * 2 - 9
            } else {
                d * 2
            }
        })
        .sum();

    (10 - sum % 10) % 10 == digits[10]
}
