//! Rule-based field extractors and normalizers.

pub mod cascade;
pub mod classifier;
pub mod dates;
pub mod numbers;
pub mod patterns;
pub mod tax_id;

pub use cascade::PatternCascade;
pub use classifier::{Classification, DocumentClassifier};
pub use dates::{normalize_date, parse_date, DateExtractor};
pub use numbers::{format_amount, normalize_count, normalize_number, parse_amount};
pub use tax_id::{validate_tax_id, TaxIdExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all candidate values for the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in text, with where and how it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Index of the cascade pattern that produced the value.
    pub pattern: usize,
    /// Byte span of the captured value in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pattern: usize, source: impl Into<String>) -> Self {
        Self {
            value,
            pattern,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Transform the value, keeping the match context.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            pattern: self.pattern,
            position: self.position,
            source: self.source,
        }
    }
}
