//! Error types for the ddtx-core library.

use thiserror::Error;

/// Main error type for the ddtx library.
#[derive(Error, Debug)]
pub enum DdtxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Reader dump could not be decoded.
    #[error("invalid reader dump: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input format is not handled by any reader.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to document extraction.
///
/// Field-level misses and parse misses are not errors: they leave the field
/// at its default and show up as warnings on the extraction result.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The reader produced no usable text for the input.
    #[error("no text obtainable from input")]
    NoText,
}

/// Result type for the ddtx library.
pub type Result<T> = std::result::Result<T, DdtxError>;
