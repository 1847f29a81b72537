// Content classifier
//
// Stateless, constructed once per invocation from two optional patterns.
// The filter pattern decides keep-or-drop from entry *content* only; the
// naming pattern derives an output name from the first capture group of
// its match. Both run over raw bytes, entries are not assumed to be UTF-8.

use regex::bytes::Regex;

/// Extension appended to names derived from the naming pattern. Entries
/// that keep their original name are left untouched.
pub const DERIVED_EXTENSION: &str = "xml";

/// Classifier verdict for one extracted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub keep: bool,
    pub output_name: String,
}

/// Pure keep-or-filter plus output-name derivation.
pub struct Classifier {
    naming: Option<Regex>,
    filter: Option<Regex>,
}

impl Classifier {
    /// Build a classifier from optional naming and filter patterns.
    pub fn new(
        naming_pattern: Option<&str>,
        filter_pattern: Option<&str>,
    ) -> Result<Self, regex::Error> {
        let naming = naming_pattern.map(Regex::new).transpose()?;
        let filter = filter_pattern.map(Regex::new).transpose()?;
        Ok(Self { naming, filter })
    }

    /// Classify one entry. Without a filter pattern everything is kept;
    /// without a naming pattern (or when it does not match) the original
    /// entry name is used verbatim.
    pub fn classify(&self, original_name: &str, content: &[u8]) -> Classification {
        let keep = match &self.filter {
            Some(filter) => !filter.is_match(content),
            None => true,
        };

        let output_name = self
            .naming
            .as_ref()
            .and_then(|naming| naming.captures(content))
            .and_then(|caps| caps.get(1))
            .map(|m| {
                format!(
                    "{}.{}",
                    String::from_utf8_lossy(m.as_bytes()),
                    DERIVED_EXTENSION
                )
            })
            .unwrap_or_else(|| original_name.to_string());

        Classification { keep, output_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_patterns_keeps_everything_with_original_name() {
        let classifier = Classifier::new(None, None).unwrap();
        let verdict = classifier.classify("entry-01.txt", b"hello");
        assert!(verdict.keep);
        assert_eq!(verdict.output_name, "entry-01.txt");
    }

    #[test]
    fn filter_pattern_drops_matching_content_regardless_of_name() {
        let classifier = Classifier::new(None, Some("<test-document>")).unwrap();

        let dropped = classifier.classify("real-looking.xml", b"<test-document>x</test-document>");
        assert!(!dropped.keep);

        // Same pattern, different name, non-matching content: kept.
        let kept = classifier.classify("real-looking.xml", b"<invoice>1</invoice>");
        assert!(kept.keep);
    }

    #[test]
    fn naming_pattern_uses_first_capture_group_and_derived_extension() {
        let classifier = Classifier::new(Some(r"<id>(\w+)</id>"), None).unwrap();
        let verdict = classifier.classify("entry-01.txt", b"<doc><id>INV42</id></doc>");
        assert_eq!(verdict.output_name, "INV42.xml");
    }

    #[test]
    fn unmatched_naming_pattern_falls_back_to_original_name() {
        let classifier = Classifier::new(Some(r"<id>(\w+)</id>"), None).unwrap();
        let verdict = classifier.classify("entry-01.txt", b"no identifier here");
        assert_eq!(verdict.output_name, "entry-01.txt");
    }

    #[test]
    fn naming_and_filter_are_independent() {
        let classifier = Classifier::new(Some(r"<id>(\w+)</id>"), Some("skip-me")).unwrap();
        let verdict = classifier.classify("x.bin", b"skip-me <id>A1</id>");
        assert!(!verdict.keep);
        // The derived name is still computed; the caller discards it.
        assert_eq!(verdict.output_name, "A1.xml");
    }

    #[test]
    fn invalid_pattern_is_rejected_at_construction() {
        assert!(Classifier::new(Some("("), None).is_err());
        assert!(Classifier::new(None, Some("(")).is_err());
    }
}
