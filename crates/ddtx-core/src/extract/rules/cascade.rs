//! Ordered pattern cascades: the first pattern that matches wins.

use regex::{Captures, Regex};
use tracing::{debug, trace};

use super::{ExtractionMatch, FieldExtractor};

/// An ordered list of patterns for one logical field.
///
/// Patterns are compiled case-insensitive and multi-line and tried in
/// declaration order. Once one matches, later patterns are not evaluated.
#[derive(Debug, Clone)]
pub struct PatternCascade {
    field: &'static str,
    patterns: Vec<Regex>,
}

impl PatternCascade {
    /// Compile a cascade from pattern sources.
    pub fn new<S: AsRef<str>>(field: &'static str, patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?im){}", p.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { field, patterns })
    }

    /// Index of the first pattern that matches anywhere in `text`.
    pub fn matching_pattern(&self, text: &str) -> Option<usize> {
        self.patterns.iter().position(|re| re.is_match(text))
    }

    /// Captures of the first matching pattern, with its index.
    pub fn captures<'t>(&self, text: &'t str) -> Option<(usize, Captures<'t>)> {
        for (index, re) in self.patterns.iter().enumerate() {
            if let Some(caps) = re.captures(text) {
                trace!("{}: pattern {} matched", self.field, index);
                return Some((index, caps));
            }
        }
        None
    }

    /// First capture of the first matching pattern, or an empty string.
    pub fn first(&self, text: &str) -> String {
        self.extract(text).map(|m| m.value).unwrap_or_default()
    }

    /// Every match of every pattern, ordered by position in the text.
    ///
    /// Overlapping matches found by a later pattern are dropped.
    pub fn scan(&self, text: &str) -> Vec<ExtractionMatch<String>> {
        let mut results: Vec<ExtractionMatch<String>> = Vec::new();

        for (index, re) in self.patterns.iter().enumerate() {
            for caps in re.captures_iter(text) {
                let Some(m) = to_match(index, &caps) else {
                    continue;
                };
                let overlaps = results.iter().any(|r| match (r.position, m.position) {
                    (Some((s1, e1)), Some((s2, e2))) => s1 < e2 && s2 < e1,
                    _ => false,
                });
                if !overlaps {
                    results.push(m);
                }
            }
        }

        results.sort_by_key(|m| m.position.map(|(start, _)| start).unwrap_or(0));
        results
    }
}

fn to_match(index: usize, caps: &Captures<'_>) -> Option<ExtractionMatch<String>> {
    let group = caps.get(1).or_else(|| caps.get(0))?;
    let full = caps.get(0)?;

    Some(
        ExtractionMatch::new(group.as_str().trim().to_string(), index, full.as_str())
            .with_position(group.start(), group.end()),
    )
}

impl FieldExtractor for PatternCascade {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let (index, caps) = self.captures(text)?;
        let found = to_match(index, &caps)?;
        debug!("Field '{}' found by pattern {}: {}", self.field, index, found.value);
        Some(found)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.patterns
            .iter()
            .enumerate()
            .filter_map(|(index, re)| re.captures(text).and_then(|caps| to_match(index, &caps)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Numero: 5023\nDDT n. 777\n";

    #[test]
    fn test_first_pattern_wins() {
        let cascade =
            PatternCascade::new("number", &[r"numero\s*:\s*(\d+)", r"ddt\s+n\.\s*(\d+)"]).unwrap();
        let found = cascade.extract(TEXT).unwrap();
        assert_eq!(found.value, "5023");
        assert_eq!(found.pattern, 0);
    }

    #[test]
    fn test_reordering_changes_result() {
        let cascade =
            PatternCascade::new("number", &[r"ddt\s+n\.\s*(\d+)", r"numero\s*:\s*(\d+)"]).unwrap();
        let found = cascade.extract(TEXT).unwrap();
        assert_eq!(found.value, "777");
        assert_eq!(found.pattern, 0);
    }

    #[test]
    fn test_falls_through_to_later_pattern() {
        let cascade =
            PatternCascade::new("number", &[r"fattura\s+n\.\s*(\d+)", r"ddt\s+n\.\s*(\d+)"]).unwrap();
        let found = cascade.extract(TEXT).unwrap();
        assert_eq!(found.value, "777");
        assert_eq!(found.pattern, 1);
    }

    #[test]
    fn test_case_insensitive_multiline() {
        let cascade = PatternCascade::new("number", &[r"^ddt\s+N\.\s*(\d+)$"]).unwrap();
        assert_eq!(cascade.first(TEXT), "777");
    }

    #[test]
    fn test_miss_is_empty() {
        let cascade = PatternCascade::new("number", &[r"fattura\s+(\d+)"]).unwrap();
        assert_eq!(cascade.first(TEXT), "");
        assert!(cascade.extract_all(TEXT).is_empty());
    }

    #[test]
    fn test_extract_all_one_per_pattern() {
        let cascade =
            PatternCascade::new("number", &[r"numero\s*:\s*(\d+)", r"ddt\s+n\.\s*(\d+)"]).unwrap();
        let values: Vec<String> = cascade.extract_all(TEXT).into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["5023", "777"]);
    }

    #[test]
    fn test_scan_orders_by_position() {
        let cascade = PatternCascade::new("id", &[r"b=(\d+)", r"a=(\d+)"]).unwrap();
        let values: Vec<String> = cascade
            .scan("a=1 b=2 a=3")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }
}
