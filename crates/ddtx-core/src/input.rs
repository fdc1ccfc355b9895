//! Input loading: PDFs, plain text and reader dumps.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DdtxError, ExtractionError, Result};
use crate::models::{PdfConfig, RawTable};
use crate::pdf::{PdfContent, PdfExtractor, PdfPage, PdfProcessor};

/// Output of an upstream table-aware reader, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderDump {
    pub text: String,
    pub tables: Vec<RawTable>,
}

/// File extensions accepted by [`load_content`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "json"];

/// Load an input file as text and tables.
///
/// `.pdf` files are read with [`PdfExtractor`], `.txt` files are taken as
/// page text (pages separated by form feeds) and `.json` files as a
/// [`ReaderDump`]. Content shorter than `config.min_text_length` is
/// rejected as having no text.
pub fn load_content(path: &Path, config: &PdfConfig) -> Result<PdfContent> {
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let content = match extension.as_str() {
        "pdf" => {
            let data = std::fs::read(path)?;
            let mut extractor = PdfExtractor::new();
            extractor.load(&data)?;
            extractor.extract_content(&source, config.all_pages)?
        }
        "txt" => text_content(&source, &std::fs::read_to_string(path)?, config.all_pages),
        "json" => {
            let dump: ReaderDump = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            PdfContent {
                tables: dump.tables,
                ..PdfContent::from_text(source, dump.text)
            }
        }
        _ => return Err(DdtxError::UnsupportedFormat(path.display().to_string())),
    };

    if content.text.trim().chars().count() < config.min_text_length.max(1) {
        return Err(ExtractionError::NoText.into());
    }

    debug!(
        "Loaded {}: {} pages, {} chars, {} tables",
        content.source,
        content.pages.len(),
        content.text.len(),
        content.tables.len()
    );
    Ok(content)
}

fn text_content(source: &str, raw: &str, all_pages: bool) -> PdfContent {
    let pages: Vec<PdfPage> = raw
        .split('\x0c')
        .enumerate()
        .map(|(i, text)| PdfPage {
            number: i as u32 + 1,
            text: text.to_string(),
        })
        .collect();

    let text = if all_pages {
        raw.replace('\x0c', "\n")
    } else {
        pages.first().map(|p| p.text.clone()).unwrap_or_default()
    };

    PdfContent {
        pages,
        ..PdfContent::from_text(source, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_text_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ddt.txt");
        fs::write(&path, "pagina uno\x0cpagina due").unwrap();

        let content = load_content(&path, &PdfConfig::default()).unwrap();
        assert_eq!(content.source, "ddt.txt");
        assert_eq!(content.pages.len(), 2);
        assert_eq!(content.text, "pagina uno\npagina due");

        let first_only = PdfConfig {
            all_pages: false,
            ..PdfConfig::default()
        };
        assert_eq!(load_content(&path, &first_only).unwrap().text, "pagina uno");
    }

    #[test]
    fn test_load_reader_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.JSON");
        fs::write(&path, r#"{"text": "DDT n. 1", "tables": [[["Descrizione", null]]]}"#).unwrap();

        let content = load_content(&path, &PdfConfig::default()).unwrap();
        assert_eq!(content.text, "DDT n. 1");
        assert_eq!(content.tables[0][0], vec![Some("Descrizione".to_string()), None]);
    }

    #[test]
    fn test_empty_input_has_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "  \n").unwrap();

        let err = load_content(&path, &PdfConfig::default()).unwrap_err();
        assert!(matches!(err, DdtxError::Extraction(ExtractionError::NoText)));
    }

    #[test]
    fn test_short_text_below_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        fs::write(&path, "abc").unwrap();

        let config = PdfConfig {
            min_text_length: 10,
            ..PdfConfig::default()
        };
        assert!(load_content(&path, &config).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_content(Path::new("scan.tiff"), &PdfConfig::default()).unwrap_err();
        assert!(matches!(err, DdtxError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_invalid_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, "not a pdf").unwrap();

        let err = load_content(&path, &PdfConfig::default()).unwrap_err();
        assert!(matches!(err, DdtxError::Pdf(_)));
    }
}
