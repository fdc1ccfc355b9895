//! Document field extraction module.

pub mod layout;
mod orchestrator;
pub mod parties;
pub mod rules;
pub mod tables;
pub mod text_items;

pub use layout::{LayoutMatch, LayoutRecognizer, SingleLineLayout};
pub use orchestrator::{ExtractionOrchestrator, ExtractionResult};
pub use parties::PartyExtractor;
pub use tables::{ColumnRole, TableLineItemExtractor};
pub use text_items::TextLineItemExtractor;

use crate::error::ExtractionError;
use crate::models::Document;
use crate::pdf::PdfContent;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for document extractors.
pub trait DocumentExtractor {
    /// Extract a document from reader output.
    fn extract(&self, content: &PdfContent) -> Result<Document>;

    /// Extract a document from plain text.
    fn extract_from_text(&self, text: &str) -> Result<Document>;
}
