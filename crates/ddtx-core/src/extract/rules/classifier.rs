//! Document type classification from keyword markers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cascade::PatternCascade;
use super::patterns::{DELIVERY_NOTE_MARKERS, INVOICE_MARKERS};
use crate::models::DocumentType;

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub doc_type: DocumentType,
    /// False when no marker matched and the default was applied.
    pub matched: bool,
    /// Index of the marker that matched within its set.
    pub marker: Option<usize>,
}

/// Decides the document type.
///
/// Marker sets are checked in order, delivery notes first. Text with no
/// marker at all is classified as a delivery note.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentClassifier;

impl DocumentClassifier {
    pub fn new() -> Self {
        Self
    }

    fn marker_sets() -> [(DocumentType, &'static PatternCascade); 2] {
        [
            (DocumentType::DeliveryNote, &DELIVERY_NOTE_MARKERS),
            (DocumentType::Invoice, &INVOICE_MARKERS),
        ]
    }

    /// Classify lower-cased text.
    pub fn classify(&self, text: &str) -> DocumentType {
        self.classify_with_confidence(text).doc_type
    }

    /// Classify lower-cased text, reporting whether a marker matched.
    pub fn classify_with_confidence(&self, text: &str) -> Classification {
        for (doc_type, markers) in Self::marker_sets() {
            if let Some(marker) = markers.matching_pattern(text) {
                debug!("Classified as {} by marker {}", doc_type.label(), marker);
                return Classification {
                    doc_type,
                    matched: true,
                    marker: Some(marker),
                };
            }
        }

        debug!("No type marker found, defaulting to delivery note");
        Classification {
            doc_type: DocumentType::DeliveryNote,
            matched: false,
            marker: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_note_marker() {
        let c = DocumentClassifier::new().classify_with_confidence("documento di trasporto n. 5023");
        assert_eq!(c.doc_type, DocumentType::DeliveryNote);
        assert!(c.matched);
        assert_eq!(c.marker, Some(0));
    }

    #[test]
    fn test_invoice_marker() {
        let classifier = DocumentClassifier::new();
        assert_eq!(classifier.classify("fattura n. 12 del 01/02/2024"), DocumentType::Invoice);
        assert_eq!(classifier.classify("commercial invoice"), DocumentType::Invoice);
    }

    #[test]
    fn test_delivery_markers_checked_first() {
        let text = "fattura accompagnatoria - documento di trasporto";
        assert_eq!(DocumentClassifier::new().classify(text), DocumentType::DeliveryNote);
    }

    #[test]
    fn test_no_marker_defaults_to_delivery_note() {
        let c = DocumentClassifier::new().classify_with_confidence("elenco merci");
        assert_eq!(c.doc_type, DocumentType::DeliveryNote);
        assert!(!c.matched);
        assert_eq!(c.marker, None);
    }
}
