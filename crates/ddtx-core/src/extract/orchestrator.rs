//! Composes classification, layout recognition, field cascades and line-item
//! extraction into one document per input.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::layout::{LayoutRecognizer, SingleLineLayout};
use super::parties::PartyExtractor;
use super::rules::patterns::{
    DOCUMENT_NUMBER, GROSS_WEIGHT, PACKAGE_COUNT, TAXABLE_AMOUNT, TAX_AMOUNT, TOTAL,
};
use super::rules::{
    normalize_count, normalize_number, parse_amount, DateExtractor, DocumentClassifier,
    FieldExtractor,
};
use super::tables::TableLineItemExtractor;
use super::text_items::TextLineItemExtractor;
use super::{DocumentExtractor, Result};
use crate::error::ExtractionError;
use crate::models::{Customer, DdtxConfig, Document, RawTable};
use crate::pdf::PdfContent;

/// Result of document extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted document.
    pub document: Document,
    /// Fields that could not be found and other extraction issues.
    pub warnings: Vec<String>,
    /// Name of the layout recognizer that matched, if any.
    pub layout: Option<String>,
    /// Whether the document type came from a marker rather than the default.
    pub type_recognized: bool,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Stateless extraction pipeline, shareable across threads.
pub struct ExtractionOrchestrator {
    classifier: DocumentClassifier,
    layouts: Vec<Box<dyn LayoutRecognizer>>,
    parties: PartyExtractor,
    tables: TableLineItemExtractor,
    text_items: TextLineItemExtractor,
    dates: DateExtractor,
}

impl ExtractionOrchestrator {
    /// Create an orchestrator with the default configuration.
    pub fn new() -> Self {
        Self::from_config(&DdtxConfig::default())
    }

    /// Create an orchestrator from configuration.
    pub fn from_config(config: &DdtxConfig) -> Self {
        let extraction = &config.extraction;

        let single_line = SingleLineLayout::new(extraction.layout_window)
            .excluding_tax_ids(extraction.supplier_tax_ids())
            .with_validation(extraction.validate_tax_ids);

        Self {
            classifier: DocumentClassifier::new(),
            layouts: vec![Box::new(single_line)],
            parties: PartyExtractor::new(extraction.known_suppliers.clone())
                .with_validation(extraction.validate_tax_ids),
            tables: TableLineItemExtractor::new(),
            text_items: TextLineItemExtractor::new(),
            dates: DateExtractor::new(),
        }
    }

    /// Register an additional layout, tried after the existing ones.
    pub fn with_layout(mut self, layout: Box<dyn LayoutRecognizer>) -> Self {
        self.layouts.push(layout);
        self
    }

    /// Names of the registered layouts, in the order they are tried.
    pub fn layout_names(&self) -> Vec<&str> {
        self.layouts.iter().map(|l| l.name()).collect()
    }

    /// Extract a document from page text and table grids.
    pub fn parse(&self, text: &str, tables: &[RawTable], source: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        if text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }

        info!("Extracting document from {} characters of text", text.len());

        let lowered = text.to_lowercase();
        let mut document = Document::new(source);

        let classification = self.classifier.classify_with_confidence(&lowered);
        document.doc_type = classification.doc_type;
        if !classification.matched {
            warnings.push("Document type not recognized, assumed delivery note".to_string());
        }

        // Layout recognizers take priority over the generic cascades
        let lines: Vec<&str> = text.lines().collect();
        let mut layout = None;
        for recognizer in &self.layouts {
            if let Some(found) = recognizer.recognize(&lines) {
                debug!("Layout '{}' matched at line {}", recognizer.name(), found.line_index + 1);
                document.number = found.number;
                document.date = found.date;
                document.customer = found.customer;
                layout = Some(recognizer.name().to_string());
                break;
            }
        }

        if document.number.is_empty() {
            document.number = DOCUMENT_NUMBER.first(text);
        }
        if document.date.is_empty() {
            document.date = self.dates.extract(text).map(|m| m.value).unwrap_or_default();
        }

        document.supplier = self.parties.supplier(text, &lowered);
        if document.supplier.is_empty() {
            warnings.push("Missing supplier information".to_string());
        }

        let generic = self.parties.customer(text, &document.supplier.tax_id);
        fill_customer(&mut document.customer, generic);

        document.agent = self.parties.agent(text);
        document.carrier = self.parties.carrier(text);

        document.line_items = self.tables.extract(tables);
        if document.line_items.is_empty() {
            document.line_items = self.text_items.extract(text);
            debug!("Text fallback found {} line items", document.line_items.len());
        }

        document.total_amount = parse_amount(&TOTAL.first(text)).unwrap_or(Decimal::ZERO);
        if document.total_amount.is_zero() {
            document.total_amount = document.line_items_total();
            debug!("Total taken from line items: {}", document.total_amount);
        }
        document.taxable_amount = normalize_number(&TAXABLE_AMOUNT.first(text));
        document.tax_amount = normalize_number(&TAX_AMOUNT.first(text));
        document.package_count = normalize_count(&PACKAGE_COUNT.first(text));
        document.gross_weight = normalize_number(&GROSS_WEIGHT.first(text));

        warnings.extend(document.validate());
        for warning in &warnings {
            warn!("{}: {}", source, warning);
        }

        info!(
            "Extracted {} {} with {} line items",
            document.doc_type.label(),
            document.number,
            document.line_items.len()
        );

        Ok(ExtractionResult {
            document,
            warnings,
            layout,
            type_recognized: classification.matched,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Fill empty customer fields from a second source.
fn fill_customer(customer: &mut Customer, other: Customer) {
    let fields = [
        (&mut customer.name, other.name),
        (&mut customer.code, other.code),
        (&mut customer.address, other.address),
        (&mut customer.postal_code, other.postal_code),
        (&mut customer.city, other.city),
        (&mut customer.province, other.province),
        (&mut customer.tax_id, other.tax_id),
        (&mut customer.fiscal_code, other.fiscal_code),
    ];
    for (field, value) in fields {
        if field.is_empty() {
            *field = value;
        }
    }
}

impl Default for ExtractionOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for ExtractionOrchestrator {
    fn extract(&self, content: &PdfContent) -> Result<Document> {
        self.parse(&content.text, &content.tables, &content.source)
            .map(|r| r.document)
    }

    fn extract_from_text(&self, text: &str) -> Result<Document> {
        self.parse(text, &[], "").map(|r| r.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::layout::LayoutMatch;
    use crate::models::DocumentType;
    use pretty_assertions::assert_eq;

    const DONAC: &str = "\
ALFIERI SPECIALITA' ALIMENTARI S.P.A.
C.so G. Marconi 10/E - Tel. 0173 66457 - Fax 0173 266898
12050 MAGLIANO ALFIERI (CN)
R.E.A. Cn 275071 - P.IVA E C.F. 03247720042
Documento di trasporto
Numero Del Pag. Cod. Cliente
5023 3/06/25 1 20322 DONAC S.R.L.
Cliente Luogo di consegna
DONAC S.R.L.
VIA MARGARITA, 8 LOC. TETTO GARETTO
12100 - CUNEO CN
P.IVA: 04064060041
Agente: 507 SAFFIRIO FLAVIO
Vettore: S.A.F.I.M. S.P.A
";

    #[test]
    fn test_single_line_layout_end_to_end() {
        let result = ExtractionOrchestrator::new().parse(DONAC, &[], "ddt.pdf").unwrap();
        let doc = &result.document;

        assert_eq!(result.layout.as_deref(), Some("single_line"));
        assert_eq!(doc.doc_type, DocumentType::DeliveryNote);
        assert_eq!(doc.number, "5023");
        assert_eq!(doc.date, "03/06/2025");
        assert_eq!(doc.customer.code, "20322");
        assert_eq!(doc.customer.name, "DONAC S.R.L.");
        assert_eq!(doc.customer.tax_id, "04064060041");
        assert_eq!(doc.customer.city, "CUNEO");
        assert_eq!(doc.supplier.tax_id, "03247720042");
        assert_eq!(doc.agent.code, "507");
        assert_eq!(doc.agent.name, "SAFFIRIO FLAVIO");
        assert_eq!(doc.carrier, "S.A.F.I.M. S.P.A");
        assert_eq!(doc.source_file, "ddt.pdf");
    }

    #[test]
    fn test_empty_text_is_fatal() {
        let result = ExtractionOrchestrator::new().parse("  \n ", &[], "a.pdf");
        assert!(matches!(result, Err(ExtractionError::NoText)));
    }

    #[test]
    fn test_missing_fields_become_warnings() {
        let result = ExtractionOrchestrator::new()
            .parse("nessun dato utile", &[], "a.pdf")
            .unwrap();
        let doc = &result.document;

        assert_eq!(doc.number, "");
        assert_eq!(doc.total_amount, Decimal::ZERO);
        assert!(!result.type_recognized);
        assert!(result.warnings.iter().any(|w| w == "Missing document number"));
        assert!(result.warnings.iter().any(|w| w == "No line items"));
    }

    #[test]
    fn test_tables_take_priority_and_total_falls_back() {
        let cell = |s: &str| Some(s.to_string());
        let tables = vec![vec![
            vec![cell("Descrizione"), cell("Quantità"), cell("Importo")],
            vec![cell("PASTA"), cell("2"), cell("10,50")],
            vec![cell("SUGO"), cell("1"), cell("4,00")],
        ]];
        let text = "Fattura n. 12 del 01/02/2024\nCodice Descrizione\n\
                    X1 ALTRO PZ 1 1,00 0,00 1,00 22\nNote";

        let result = ExtractionOrchestrator::new().parse(text, &tables, "f.pdf").unwrap();
        let doc = &result.document;

        assert_eq!(doc.doc_type, DocumentType::Invoice);
        assert_eq!(doc.number, "12");
        assert_eq!(doc.date, "01/02/2024");
        assert_eq!(doc.line_items.len(), 2);
        assert_eq!(doc.total_amount, Decimal::new(1450, 2));
    }

    struct FixedLayout;

    impl LayoutRecognizer for FixedLayout {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, lines: &[&str]) -> Option<LayoutMatch> {
            lines.iter().any(|l| l.starts_with("FIXED")).then(|| LayoutMatch {
                number: "42".to_string(),
                ..LayoutMatch::default()
            })
        }
    }

    #[test]
    fn test_additional_layout() {
        let orchestrator = ExtractionOrchestrator::new().with_layout(Box::new(FixedLayout));
        assert_eq!(orchestrator.layout_names(), vec!["single_line", "fixed"]);

        let result = orchestrator.parse("FIXED\nNumero: 7", &[], "a.pdf").unwrap();
        assert_eq!(result.layout.as_deref(), Some("fixed"));
        assert_eq!(result.document.number, "42");
    }

    #[test]
    fn test_orchestrator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExtractionOrchestrator>();
    }

    #[test]
    fn test_document_extractor_trait() {
        let orchestrator = ExtractionOrchestrator::new();
        let content = PdfContent::from_text("x.txt", DONAC);
        let doc = orchestrator.extract(&content).unwrap();
        assert_eq!(doc.number, "5023");
        assert_eq!(doc.source_file, "x.txt");

        assert!(orchestrator.extract_from_text("").is_err());
    }
}
