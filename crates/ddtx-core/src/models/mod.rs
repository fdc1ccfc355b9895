//! Data models for extracted documents and pipeline configuration.

pub mod config;
pub mod document;

pub use config::{DdtxConfig, ExtractionConfig, OutputConfig, PdfConfig, SupplierProfile};
pub use document::{Agent, Customer, Document, DocumentType, LineItem, RawTable, Supplier};
