//! Core library for transport note (DDT) and invoice extraction.
//!
//! This crate provides:
//! - PDF reading (text per page and for the whole document)
//! - Document classification and ordered pattern-cascade field extraction
//! - Line items from table grids, with a plain-text fallback
//! - Locale-aware number and date normalization, partita IVA validation

pub mod error;
pub mod extract;
pub mod input;
pub mod models;
pub mod pdf;

pub use error::{DdtxError, ExtractionError, PdfError, Result};
pub use extract::{
    DocumentExtractor, ExtractionOrchestrator, ExtractionResult, LayoutMatch, LayoutRecognizer,
    SingleLineLayout,
};
pub use input::{load_content, ReaderDump};
pub use models::{
    Agent, Customer, DdtxConfig, Document, DocumentType, LineItem, RawTable, Supplier,
};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor};
