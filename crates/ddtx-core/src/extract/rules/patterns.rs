//! Pattern tables for transport note and invoice extraction.
//!
//! Cascades are compiled case-insensitive and multi-line; their order is the
//! order in which candidates are tried.

use lazy_static::lazy_static;
use regex::Regex;

use super::cascade::PatternCascade;

/// Optional currency marker around an amount label.
const CUR: &str = r"(?:€|eur)?";

/// Amount capture: digits with any mix of separators.
const AMOUNT: &str = r"(\d[\d.,]*)";

/// Day/month/year with `/`, `-` or `.`.
const DMY: &str = r"(\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4})\b";

fn amount_after(label: &str) -> String {
    format!(r"\b{label}[ \t]*{CUR}[ \t]*[:.]?[ \t]*{CUR}[ \t]*{AMOUNT}")
}

lazy_static! {
    // Document type markers, checked in this order
    pub static ref DELIVERY_NOTE_MARKERS: PatternCascade = PatternCascade::new("delivery_note", &[
        r"documento\s+di\s+trasporto",
        r"d\.d\.t\.",
        r"\bddt\s+n",
        r"bolla\s+di\s+accompagnamento",
    ]).unwrap();

    pub static ref INVOICE_MARKERS: PatternCascade = PatternCascade::new("invoice", &[
        r"\bfattura\s+n",
        r"fattura\s+accompagnatoria",
        r"\binvoice\b",
        r"\bft\s+n",
    ]).unwrap();

    // Document header
    pub static ref DOCUMENT_NUMBER: PatternCascade = PatternCascade::new("number", &[
        r"\bnumero\s*[:.]?\s*(\d+)",
        r"\bddt\s*n[°.]?\s*[:.]?\s*(\d+)",
        r"\bfattura\s*n[°.]?\s*[:.]?\s*(\d+)",
        r"\bn[°.]\s*[:.]?\s*(\d+)",
        r"\bdocumento\s*[:.]?\s*(\d+)",
    ]).unwrap();

    pub static ref DOCUMENT_DATE: PatternCascade = PatternCascade::new("date", &[
        format!(r"\bdel\s*[:.]?\s*{DMY}"),
        format!(r"\bdata\s*(?:documento|doc\.?)?\s*[:.]?\s*{DMY}"),
        format!(r"\bemess[ao]\s+il\s*[:.]?\s*{DMY}"),
    ]).unwrap();

    // Identifiers
    pub static ref TAX_ID: PatternCascade = PatternCascade::new("tax_id", &[
        r"\bp\.?\s*iva\s*[:.]?\s*(\d{11})\b",
        r"\bpartita\s+iva\s*[:.]?\s*(\d{11})\b",
        r"\bvat\s*(?:no\.?|number)?\s*[:.]?\s*(?:it)?\s*(\d{11})\b",
        r"\bp\.?\s*iva\s+e\s+c\.?\s*f\.?\s*[:.]?\s*(\d{11})\b",
    ]).unwrap();

    pub static ref FISCAL_CODE: PatternCascade = PatternCascade::new("fiscal_code", &[
        r"\bc\.?\s*f\.?\s*[:.]?\s*([A-Z]{6}\d{2}[A-Z]\d{2}[A-Z]\d{3}[A-Z])\b",
        r"\bcodice\s+fiscale\s*[:.]?\s*([A-Z]{6}\d{2}[A-Z]\d{2}[A-Z]\d{3}[A-Z])\b",
    ]).unwrap();

    // Parties
    pub static ref CUSTOMER_NAME: PatternCascade = PatternCascade::new("customer", &[
        r"^[ \t]*cliente\b(?:[ \t]+luogo\b[^\n]*)?[ \t]*[:.]?\s*([^\n]+?)(?:[ \t]+luogo\b[^\n]*)?[ \t]*$",
        r"^[ \t]*destinatario\b[ \t]*[:.]?\s*([^\n]+?)[ \t]*$",
        r"^[ \t]*spett(?:\.le|abile)\b[ \t]*[:.]?\s*([^\n]+?)[ \t]*$",
    ]).unwrap();

    pub static ref CUSTOMER_CODE: PatternCascade = PatternCascade::new("customer_code", &[
        r"\bcod\.?\s*cliente[ \t]*[:.]?[ \t]*(\d{3,6})\b",
        r"\bcodice\s+cliente[ \t]*[:.]?[ \t]*(\d{3,6})\b",
        r"\bcliente\s+n[°.]?[ \t]*[:.]?[ \t]*(\d{3,6})\b",
    ]).unwrap();

    pub static ref AGENT: PatternCascade = PatternCascade::new("agent", &[
        r"\bagente\b[ \t]*[:.]?[ \t]*(\d+)[ \t]+([^\n]+?)[ \t]*$",
        r"\brappresentante\b[ \t]*[:.]?[ \t]*(\d+)[ \t]+([^\n]+?)[ \t]*$",
    ]).unwrap();

    pub static ref CARRIER: PatternCascade = PatternCascade::new("carrier", &[
        r"\bvettore\b[ \t]*[:.]?[ \t]*(\S[^\n]*?)[ \t]*$",
        r"\btrasportatore\b[ \t]*[:.]?[ \t]*(\S[^\n]*?)[ \t]*$",
        r"\bspedizioniere\b[ \t]*[:.]?[ \t]*(\S[^\n]*?)[ \t]*$",
    ]).unwrap();

    // Totals
    pub static ref TOTAL: PatternCascade = PatternCascade::new("total", &[
        amount_after(r"totale\s+documento"),
        amount_after(r"totale\s+fattura"),
        amount_after(r"totale\s+generale"),
        amount_after(r"totale"),
        amount_after(r"importo\s+totale"),
    ]).unwrap();

    pub static ref TAXABLE_AMOUNT: PatternCascade = PatternCascade::new("taxable_amount", &[
        amount_after(r"totale\s+imponibile"),
        amount_after(r"imponibile"),
    ]).unwrap();

    pub static ref TAX_AMOUNT: PatternCascade = PatternCascade::new("tax_amount", &[
        amount_after(r"totale\s+iva"),
        amount_after(r"totale\s+imposta"),
        amount_after(r"(?:importo\s+iva|imposta)"),
    ]).unwrap();

    pub static ref PACKAGE_COUNT: PatternCascade = PatternCascade::new("package_count", &[
        r"\b(?:n\.?\s*|numero\s+)?colli[ \t]*[:.]?[ \t]*(\d+)\b",
        r"\bpacchi[ \t]*[:.]?[ \t]*(\d+)\b",
    ]).unwrap();

    pub static ref GROSS_WEIGHT: PatternCascade = PatternCascade::new("gross_weight", &[
        r"\bpeso\s+lordo[ \t]*(?:kg\.?)?[ \t]*[:.]?[ \t]*(\d[\d.,]*)",
        r"\bpeso[ \t]*(?:kg\.?)?[ \t]*[:.]?[ \t]*(\d[\d.,]*)",
    ]).unwrap();

    // Line-level shapes
    pub static ref SINGLE_LINE_RECORD: Regex = Regex::new(
        r"^(\d{4})\s+(\d{1,2}/\d{2}/\d{2}(?:\d{2})?)\s+(\d+)\s+(\d{5})\s+(.+?)\s*$"
    ).unwrap();

    pub static ref ADDRESS_LINE: Regex = Regex::new(
        r"(?i)^(?:via|viale|v\.le|corso|c\.so|piazza|p\.za|p\.zza|largo|strada|loc\.|localit[aà]|frazione|fraz\.)(?:[\s,]|$)"
    ).unwrap();

    pub static ref POSTAL_LINE: Regex = Regex::new(
        r"^(\d{5})\s*-?\s*(.+?)\s*(?:\(?\b([A-Z]{2})\)?)?$"
    ).unwrap();

    pub static ref CONTACT: Regex = Regex::new(
        r"(?i)\b(?:tel|fax|e-?mail|www|pec)\b"
    ).unwrap();

    pub static ref TAX_LABEL: Regex = Regex::new(
        r"(?i)(?:\bp\.?\s*iva\b|\bpartita\s+iva\b|\bc\.\s*f\.|\bcodice\s+fiscale\b|\br\.e\.a\.)"
    ).unwrap();

    pub static ref POSTAL_CODE_START: Regex = Regex::new(
        r"^(\d{5})\b"
    ).unwrap();

    pub static ref THOUSANDS_GROUPED: Regex = Regex::new(
        r"^[1-9]\d{0,2}(?:\.\d{3})+$"
    ).unwrap();

    // Line items in plain text
    pub static ref ITEMS_SECTION_START: Regex = Regex::new(
        r"(?i)\b(?:codice|cod\.?|articolo)(?:\s+art\.?)?\s+descrizione\b"
    ).unwrap();

    pub static ref ITEMS_SECTION_END: Regex = Regex::new(
        r"(?i)\b(?:totale|trasporto|note)\b"
    ).unwrap();

    pub static ref ITEM_ROW: Regex = Regex::new(
        r"(?im)^[ \t]*([\w./\-]+)[ \t]+(\S.*?)[ \t]+(PZ|KG|LT|CF|CT|NR)[ \t]+(\d[\d.,]*)[ \t]+(\d[\d.,]*)[ \t]+(\d[\d.,]*)[ \t]+(\d[\d.,]*)[ \t]+(\d{1,2})%?(?:[ \t]|$)"
    ).unwrap();
}
