//! Transport note and invoice data models.
//!
//! Every field has a concrete default (empty string, zero) so a document is
//! always serializable, even when extraction found almost nothing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw table grid as produced by the upstream reader: row-major, untyped,
/// nullable cells.
pub type RawTable = Vec<Vec<Option<String>>>;

/// An extracted transport note or invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document type.
    #[serde(rename = "type")]
    pub doc_type: DocumentType,

    /// Document number.
    pub number: String,

    /// Document date as `dd/mm/yyyy`, or empty.
    pub date: String,

    /// Issuing supplier.
    pub supplier: Supplier,

    /// Receiving customer.
    pub customer: Customer,

    /// Sales agent.
    pub agent: Agent,

    /// Carrier named on the document.
    pub carrier: String,

    /// Line items in order of appearance.
    pub line_items: Vec<LineItem>,

    /// Document total.
    pub total_amount: Decimal,

    /// Taxable amount (imponibile).
    pub taxable_amount: Decimal,

    /// Tax amount.
    pub tax_amount: Decimal,

    /// Number of packages (colli).
    pub package_count: u32,

    /// Gross weight.
    pub gross_weight: Decimal,

    /// File the document was read from.
    pub source_file: String,
}

/// Type of business document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Transport / accompanying document (DDT).
    DeliveryNote,
    /// Billing document (fattura).
    Invoice,
    /// Not classified yet.
    #[default]
    Unknown,
}

impl DocumentType {
    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::DeliveryNote => "DDT",
            DocumentType::Invoice => "FATTURA",
            DocumentType::Unknown => "UNKNOWN",
        }
    }
}

/// Supplier (issuer) of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
    pub tax_id: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

impl Supplier {
    /// Check if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.tax_id.is_empty() && self.address.is_empty()
    }
}

/// Customer (receiver) of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,

    /// Supplier-assigned customer code, distinct from the tax id.
    pub code: String,

    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
    pub tax_id: String,

    /// Personal fiscal code (16 characters).
    pub fiscal_code: String,
}

/// Sales agent. Code and name are set together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub code: String,
    pub name: String,
}

impl Agent {
    /// Build an agent only when both parts are present.
    pub fn pair(code: &str, name: &str) -> Option<Self> {
        let (code, name) = (code.trim(), name.trim());
        if code.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            code: code.to_string(),
            name: name.to_string(),
        })
    }
}

/// A single product row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code.
    pub code: String,

    /// Product description.
    pub description: String,

    /// Unit of measure (PZ, KG, ...).
    pub unit: String,

    pub quantity: Decimal,
    pub unit_price: Decimal,

    /// Discount percentage.
    pub discount: Decimal,

    /// Line amount, excluding tax.
    pub amount: Decimal,

    /// Tax rate percentage.
    pub tax_rate: Decimal,
}

impl LineItem {
    /// A row is kept only when it describes something and carries either a
    /// quantity or an amount. Header and blank rows fail this check.
    pub fn is_meaningful(&self) -> bool {
        !self.description.trim().is_empty()
            && (self.quantity > Decimal::ZERO || self.amount > Decimal::ZERO)
    }
}

impl Document {
    /// Create an empty document for the given source file.
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            ..Self::default()
        }
    }

    /// Sum of line-item amounts.
    pub fn line_items_total(&self) -> Decimal {
        self.line_items.iter().map(|i| i.amount).sum()
    }

    /// Check the document for missing core data and return the issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.number.is_empty() {
            issues.push("Missing document number".to_string());
        }

        if self.date.is_empty() {
            issues.push("Missing document date".to_string());
        }

        if self.customer.name.is_empty() && self.customer.tax_id.is_empty() {
            issues.push("Missing customer information".to_string());
        }

        if self.line_items.is_empty() {
            issues.push("No line items".to_string());
        }

        let calculated = self.line_items_total();
        if !self.line_items.is_empty()
            && (calculated - self.total_amount).abs() > Decimal::new(1, 2)
        {
            issues.push(format!(
                "Line item total ({}) differs from document total ({})",
                calculated, self.total_amount
            ));
        }

        issues
    }
}
