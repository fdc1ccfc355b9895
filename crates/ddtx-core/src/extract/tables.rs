//! Line items from table grids.

use std::collections::HashMap;

use tracing::debug;

use super::rules::normalize_number;
use crate::models::{LineItem, RawTable};

/// Role of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Code,
    Description,
    Unit,
    Quantity,
    UnitPrice,
    Discount,
    Amount,
    TaxRate,
}

struct ColumnRule {
    role: ColumnRole,
    /// Substrings of the lower-cased header.
    keywords: &'static [&'static str],
    /// Whole-header matches, for abbreviations too short to search for.
    tokens: &'static [&'static str],
    /// Substrings that veto the rule.
    excludes: &'static [&'static str],
}

/// Header rules in priority order; the first rule that matches a header
/// decides its role.
const COLUMN_RULES: &[ColumnRule] = &[
    ColumnRule {
        role: ColumnRole::Code,
        keywords: &["cod"],
        tokens: &[],
        excludes: &[],
    },
    ColumnRule {
        role: ColumnRole::Description,
        keywords: &["descr", "articolo"],
        tokens: &[],
        excludes: &[],
    },
    ColumnRule {
        role: ColumnRole::Unit,
        keywords: &["u.m", "unità", "unita"],
        tokens: &["um", "u/m"],
        excludes: &[],
    },
    ColumnRule {
        role: ColumnRole::Quantity,
        keywords: &["quant", "q.tà", "q.ta", "qta", "qtà", "q.t"],
        tokens: &[],
        excludes: &[],
    },
    ColumnRule {
        role: ColumnRole::UnitPrice,
        keywords: &["prezzo"],
        tokens: &[],
        excludes: &[],
    },
    ColumnRule {
        role: ColumnRole::Discount,
        keywords: &["sconto", "sc%", "sc.%"],
        tokens: &["sc", "sc."],
        excludes: &[],
    },
    ColumnRule {
        role: ColumnRole::Amount,
        keywords: &["importo", "imponibile", "valore"],
        tokens: &[],
        excludes: &["iva"],
    },
    ColumnRule {
        role: ColumnRole::TaxRate,
        keywords: &["iva", "aliq"],
        tokens: &[],
        excludes: &["importo", "imposta"],
    },
];

impl ColumnRule {
    fn matches(&self, header: &str) -> bool {
        if self.excludes.iter().any(|e| header.contains(e)) {
            return false;
        }
        self.tokens.iter().any(|t| header == *t) || self.keywords.iter().any(|k| header.contains(k))
    }
}

/// Role of a single header cell, if any.
pub fn column_role(header: &str) -> Option<ColumnRole> {
    let header = header.trim().to_lowercase();
    if header.is_empty() {
        return None;
    }
    COLUMN_RULES.iter().find(|r| r.matches(&header)).map(|r| r.role)
}

/// Map each recognized role to its column. When two columns claim the same
/// role, the leftmost keeps it.
pub fn infer_columns(header: &[Option<String>]) -> HashMap<ColumnRole, usize> {
    let mut columns = HashMap::new();
    for (index, cell) in header.iter().enumerate() {
        let Some(role) = cell.as_deref().and_then(column_role) else {
            continue;
        };
        columns.entry(role).or_insert(index);
    }
    columns
}

/// Extracts line items from table grids using header keywords.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableLineItemExtractor;

impl TableLineItemExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract items from every table, concatenated in table order.
    pub fn extract(&self, tables: &[RawTable]) -> Vec<LineItem> {
        tables
            .iter()
            .enumerate()
            .flat_map(|(index, table)| self.extract_table(index, table))
            .collect()
    }

    /// Extract items from one table. Tables without a description column
    /// yield nothing.
    pub fn extract_table(&self, index: usize, table: &RawTable) -> Vec<LineItem> {
        if table.len() < 2 {
            return Vec::new();
        }

        let columns = infer_columns(&table[0]);
        if !columns.contains_key(&ColumnRole::Description) {
            debug!("Table {} has no description column, skipped", index);
            return Vec::new();
        }

        debug!("Table {} looks like a line-item table ({} rows)", index, table.len() - 1);

        table[1..]
            .iter()
            .filter(|row| row.iter().any(|c| c.as_deref().is_some_and(|s| !s.trim().is_empty())))
            .map(|row| build_item(row, &columns))
            .filter(LineItem::is_meaningful)
            .collect()
    }
}

fn cell<'a>(row: &'a [Option<String>], columns: &HashMap<ColumnRole, usize>, role: ColumnRole) -> &'a str {
    columns
        .get(&role)
        .and_then(|&i| row.get(i))
        .and_then(|c| c.as_deref())
        .map(str::trim)
        .unwrap_or_default()
}

fn build_item(row: &[Option<String>], columns: &HashMap<ColumnRole, usize>) -> LineItem {
    let text = |role| cell(row, columns, role).split_whitespace().collect::<Vec<_>>().join(" ");
    let number = |role| normalize_number(cell(row, columns, role));

    LineItem {
        code: text(ColumnRole::Code),
        description: text(ColumnRole::Description),
        unit: text(ColumnRole::Unit),
        quantity: number(ColumnRole::Quantity),
        unit_price: number(ColumnRole::UnitPrice),
        discount: number(ColumnRole::Discount),
        amount: number(ColumnRole::Amount),
        tax_rate: number(ColumnRole::TaxRate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn row(cells: &[Option<&str>]) -> Vec<Option<String>> {
        cells.iter().map(|c| c.map(str::to_string)).collect()
    }

    fn header() -> Vec<Option<String>> {
        row(&[
            Some("Codice Art."),
            Some("Descrizione"),
            Some("U.M."),
            Some("Q.tà"),
            Some("Prezzo"),
            Some("Sconto%"),
            Some("Importo"),
            Some("IVA"),
        ])
    }

    #[test]
    fn test_column_roles() {
        assert_eq!(column_role("Codice Art."), Some(ColumnRole::Code));
        assert_eq!(column_role("Descrizione"), Some(ColumnRole::Description));
        assert_eq!(column_role("UM"), Some(ColumnRole::Unit));
        assert_eq!(column_role("Quantità"), Some(ColumnRole::Quantity));
        assert_eq!(column_role("Sc."), Some(ColumnRole::Discount));
        assert_eq!(column_role("Importo IVA"), None);
        assert_eq!(column_role("Aliquota IVA"), Some(ColumnRole::TaxRate));
        assert_eq!(column_role("Scadenza"), None);
        assert_eq!(column_role(""), None);
    }

    #[test]
    fn test_extract_rows() {
        let table = vec![
            header(),
            row(&[
                Some("060041"),
                Some("AGNOLOTTI BRASATO\nCARNE LC 250 G"),
                Some("PZ"),
                Some("120"),
                Some("1,9000"),
                Some("15,00"),
                Some("193,80"),
                Some("10"),
            ]),
            row(&[None, None, None, None, None, None, None, None]),
        ];

        let items = TableLineItemExtractor::new().extract(&[table]);
        assert_eq!(
            items,
            vec![LineItem {
                code: "060041".to_string(),
                description: "AGNOLOTTI BRASATO CARNE LC 250 G".to_string(),
                unit: "PZ".to_string(),
                quantity: Decimal::new(120, 0),
                unit_price: Decimal::new(19, 1),
                discount: Decimal::new(15, 0),
                amount: Decimal::new(19380, 2),
                tax_rate: Decimal::new(10, 0),
            }]
        );
    }

    #[test]
    fn test_invariant_filters_rows() {
        let table = vec![
            header(),
            row(&[Some("1"), Some("OMAGGIO"), None, Some("1"), None, None, Some("0"), None]),
            row(&[Some("2"), Some("NOTA"), None, Some("0"), None, None, Some("0"), None]),
            row(&[Some("3"), None, None, Some("5"), None, None, Some("10,00"), None]),
        ];

        let items = TableLineItemExtractor::new().extract(&[table]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "OMAGGIO");
    }

    #[test]
    fn test_table_without_description_skipped() {
        let table = vec![
            row(&[Some("Colli"), Some("Peso")]),
            row(&[Some("92"), Some("181,5")]),
        ];
        assert!(TableLineItemExtractor::new().extract(&[table]).is_empty());
        assert!(TableLineItemExtractor::new().extract(&[vec![header()]]).is_empty());
    }

    #[test]
    fn test_leftmost_column_keeps_role() {
        let columns = infer_columns(&row(&[
            Some("Descrizione"),
            Some("Descrizione aggiuntiva"),
            Some("Importo"),
        ]));
        assert_eq!(columns[&ColumnRole::Description], 0);
        assert_eq!(columns[&ColumnRole::Amount], 2);
    }

    #[test]
    fn test_short_rows_default_to_zero() {
        let table = vec![header(), row(&[Some("X1"), Some("CARTONE"), Some("CT"), Some("4")])];
        let items = TableLineItemExtractor::new().extract(&[table]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, Decimal::new(4, 0));
        assert_eq!(items[0].amount, Decimal::ZERO);
    }

    #[test]
    fn test_cells_are_read_strictly() {
        let table = vec![
            header(),
            row(&[Some("A1"), Some("PASTA"), Some("KG"), Some("0.500"), None, None, Some("3/06/25"), None]),
            row(&[Some("A2"), Some("SUGO"), Some("PZ"), Some("2 x 500"), None, None, Some("4,00"), None]),
        ];

        let items = TableLineItemExtractor::new().extract(&[table]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, Decimal::new(5, 1));
        assert_eq!(items[0].amount, Decimal::ZERO);
        assert_eq!(items[1].quantity, Decimal::ZERO);
        assert_eq!(items[1].amount, Decimal::new(400, 2));
    }
}
