//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::RawTable;

/// PDF text extractor.
///
/// lopdf loads and decrypts the file and provides per-page text;
/// pdf-extract provides the full-document text, which keeps the reading
/// order of multi-column layouts better.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Text and tables read from one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfContent {
    /// File the content was read from.
    pub source: String,
    /// Text handed to extraction: the first page or all pages.
    pub text: String,
    /// Per-page text.
    pub pages: Vec<PdfPage>,
    /// Table grids. Always empty when read by [`PdfExtractor`].
    pub tables: Vec<RawTable>,
}

impl PdfContent {
    /// Content with text only.
    pub fn from_text(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Text of a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Read the loaded document.
    ///
    /// With `all_pages` the full text is used, otherwise only the first
    /// page's.
    pub fn extract_content(&self, source: &str, all_pages: bool) -> Result<PdfContent> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let pages: Vec<PdfPage> = (1..=page_count)
            .map(|number| PdfPage {
                number,
                text: self.extract_page_text(number).unwrap_or_else(|e| {
                    warn!("Page {} unreadable: {}", number, e);
                    String::new()
                }),
            })
            .collect();

        let text = if all_pages {
            match self.extract_text() {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => join_pages(&pages),
                Err(e) => {
                    warn!("Full-text extraction failed, joining pages: {}", e);
                    join_pages(&pages)
                }
            }
        } else {
            pages.first().map(|p| p.text.clone()).unwrap_or_default()
        };

        debug!("Read {} pages, {} chars from {}", page_count, text.len(), source);

        Ok(PdfContent {
            source: source.to_string(),
            text,
            pages,
            tables: Vec::new(),
        })
    }
}

fn join_pages(pages: &[PdfPage]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Documents encrypted with an empty user password are still readable
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}
