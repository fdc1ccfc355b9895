//! Document output formats.

use serde::Serialize;

use ddtx_core::extract::rules::format_amount;
use ddtx_core::Document;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for outputs in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Format a document.
pub fn format_document(
    document: &Document,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Json => Ok(serde_json::to_string(document)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(document)),
        OutputFormat::Text => Ok(format_text(document)),
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "type")]
    doc_type: &'a str,
    number: &'a str,
    date: &'a str,
    supplier_name: &'a str,
    supplier_tax_id: &'a str,
    customer_code: &'a str,
    customer_name: &'a str,
    customer_tax_id: &'a str,
    total_amount: String,
    item_code: &'a str,
    item_description: &'a str,
    item_unit: &'a str,
    item_quantity: String,
    item_unit_price: String,
    item_amount: String,
    source_file: &'a str,
}

/// Documents as CSV: one row per line item, or a single row for a document
/// without items.
pub fn format_csv(documents: &[Document]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    for doc in documents {
        let base = CsvRow {
            doc_type: doc.doc_type.label(),
            number: &doc.number,
            date: &doc.date,
            supplier_name: &doc.supplier.name,
            supplier_tax_id: &doc.supplier.tax_id,
            customer_code: &doc.customer.code,
            customer_name: &doc.customer.name,
            customer_tax_id: &doc.customer.tax_id,
            total_amount: doc.total_amount.to_string(),
            item_code: "",
            item_description: "",
            item_unit: "",
            item_quantity: String::new(),
            item_unit_price: String::new(),
            item_amount: String::new(),
            source_file: &doc.source_file,
        };

        if doc.line_items.is_empty() {
            wtr.serialize(&base)?;
            continue;
        }

        for item in &doc.line_items {
            wtr.serialize(CsvRow {
                item_code: &item.code,
                item_description: &item.description,
                item_unit: &item.unit,
                item_quantity: item.quantity.to_string(),
                item_unit_price: item.unit_price.to_string(),
                item_amount: item.amount.to_string(),
                total_amount: base.total_amount.clone(),
                ..base
            })?;
        }
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(doc: &Document) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} {}\n", doc.doc_type.label(), doc.number));
    output.push_str(&format!("Date: {}\n", doc.date));
    output.push('\n');

    output.push_str("Supplier:\n");
    output.push_str(&format!("  {}\n", doc.supplier.name));
    if !doc.supplier.tax_id.is_empty() {
        output.push_str(&format!("  P.IVA: {}\n", doc.supplier.tax_id));
    }
    output.push('\n');

    output.push_str("Customer:\n");
    if doc.customer.code.is_empty() {
        output.push_str(&format!("  {}\n", doc.customer.name));
    } else {
        output.push_str(&format!("  [{}] {}\n", doc.customer.code, doc.customer.name));
    }
    if !doc.customer.address.is_empty() {
        output.push_str(&format!("  {}\n", doc.customer.address));
    }
    if !doc.customer.tax_id.is_empty() {
        output.push_str(&format!("  P.IVA: {}\n", doc.customer.tax_id));
    }

    if !doc.agent.code.is_empty() {
        output.push_str(&format!("\nAgent: {} {}\n", doc.agent.code, doc.agent.name));
    }
    if !doc.carrier.is_empty() {
        output.push_str(&format!("Carrier: {}\n", doc.carrier));
    }

    output.push_str(&format!("\nLine items ({}):\n", doc.line_items.len()));
    for item in &doc.line_items {
        output.push_str(&format!(
            "  {:<10} {:<40} {:>4} {:>8} {:>12}\n",
            item.code,
            item.description,
            item.unit,
            item.quantity,
            format_amount(item.amount)
        ));
    }

    output.push_str(&format!("\nTotal: € {}\n", format_amount(doc.total_amount)));
    if doc.package_count > 0 {
        output.push_str(&format!("Packages: {}\n", doc.package_count));
    }

    output
}
