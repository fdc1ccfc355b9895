//! Line items from plain text, used when no table yields any.

use tracing::{debug, trace};

use super::rules::normalize_number;
use super::rules::patterns::{ITEMS_SECTION_END, ITEMS_SECTION_START, ITEM_ROW};
use crate::models::LineItem;

/// Fixed-shape row matcher over the item section of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLineItemExtractor;

impl TextLineItemExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Text between the item header and the next totals/transport/notes
    /// marker. `None` when either bound is missing.
    pub fn section<'t>(&self, text: &'t str) -> Option<&'t str> {
        let start = ITEMS_SECTION_START.find(text)?.end();
        let end = ITEMS_SECTION_END.find(&text[start..])?.start();
        Some(&text[start..start + end])
    }

    /// Extract every well-formed row, in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<LineItem> {
        let Some(section) = self.section(text) else {
            debug!("No item section found in text");
            return Vec::new();
        };

        ITEM_ROW
            .captures_iter(section)
            .map(|caps| {
                trace!("Item row: {}", caps[0].trim());
                LineItem {
                    code: caps[1].to_string(),
                    description: caps[2].trim().to_string(),
                    unit: caps[3].to_uppercase(),
                    quantity: normalize_number(&caps[4]),
                    unit_price: normalize_number(&caps[5]),
                    discount: normalize_number(&caps[6]),
                    amount: normalize_number(&caps[7]),
                    tax_rate: normalize_number(&caps[8]),
                }
            })
            .filter(LineItem::is_meaningful)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const SECTION: &str = "\
Codice Art. Descrizione U.M. Q.tà Prezzo Sconto% Importo IVA
060041 AGNOLOTTI BRASATO CARNE LC 250 G PZ 120 1,9000 15,00 193,80 10
070017 PASTA SFOGLIA ROTONDA 230 GR PZ 48 2,1000 10,00 90,72 10
segue pagina
200527 GNOCCHI PATATE RETT. S/GLUT 400 pz 24 1,8500 8,00 40,85 10
Totale documento €: 325,37
999999 DOPO IL TOTALE PZ 1 1,00 0,00 1,00 22
";

    #[test]
    fn test_extracts_rows_in_section() {
        let items = TextLineItemExtractor::new().extract(SECTION);
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].code, "060041");
        assert_eq!(items[0].description, "AGNOLOTTI BRASATO CARNE LC 250 G");
        assert_eq!(items[0].quantity, Decimal::new(120, 0));
        assert_eq!(items[0].amount, Decimal::new(19380, 2));

        assert_eq!(items[2].unit, "PZ");
        assert_eq!(items[2].description, "GNOCCHI PATATE RETT. S/GLUT 400");

        let total: Decimal = items.iter().map(|i| i.amount).sum();
        assert_eq!(total, Decimal::new(32537, 2));
    }

    #[test]
    fn test_requires_both_markers() {
        let extractor = TextLineItemExtractor::new();
        assert!(extractor.section("060041 PASTA PZ 1 1,00 0,00 1,00 10\nTotale 1,00").is_none());
        assert!(extractor
            .extract("Codice Descrizione\n060041 PASTA PZ 1 1,00 0,00 1,00 10\n")
            .is_empty());
    }
}
