// Output-name deduplication
//
// Scoped to one archive attempt: the set of used names is discarded with
// the deduper. The first occurrence of a name passes through unchanged;
// later occurrences get an 8-hex disambiguator inserted before the last
// extension separator, regenerated in the (vanishingly unlikely) event it
// still collides.

use std::collections::HashSet;

/// Resolves output-name collisions within one archive attempt.
#[derive(Debug, Default)]
pub struct NameDeduper {
    used: HashSet<String>,
}

impl NameDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a name guaranteed unused within this attempt.
    pub fn resolve(&mut self, candidate: String) -> String {
        if self.used.insert(candidate.clone()) {
            return candidate;
        }

        loop {
            let tag = format!("{:08x}", rand::random::<u32>());
            let renamed = insert_disambiguator(&candidate, &tag);
            if self.used.insert(renamed.clone()) {
                return renamed;
            }
        }
    }
}

/// Insert `-{tag}` before the last `.`, or append it when the name has no
/// extension.
fn insert_disambiguator(name: &str, tag: &str) -> String {
    match name.rfind('.') {
        Some(idx) => format!("{}-{}{}", &name[..idx], tag, &name[idx..]),
        None => format!("{}-{}", name, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_disambiguated(resolved: &str, stem: &str, ext: &str) -> bool {
        let Some(rest) = resolved.strip_prefix(stem) else {
            return false;
        };
        let Some(tag) = rest.strip_prefix('-').and_then(|r| r.strip_suffix(ext)) else {
            return false;
        };
        tag.len() == 8 && tag.chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn first_occurrence_passes_through() {
        let mut deduper = NameDeduper::new();
        assert_eq!(deduper.resolve("a.xml".to_string()), "a.xml");
    }

    #[test]
    fn second_occurrence_gets_tag_before_extension() {
        let mut deduper = NameDeduper::new();
        assert_eq!(deduper.resolve("a.xml".to_string()), "a.xml");
        let second = deduper.resolve("a.xml".to_string());
        assert_ne!(second, "a.xml");
        assert!(is_disambiguated(&second, "a", ".xml"), "got {second}");
    }

    #[test]
    fn name_without_extension_gets_tag_appended() {
        let mut deduper = NameDeduper::new();
        deduper.resolve("README".to_string());
        let second = deduper.resolve("README".to_string());
        assert!(is_disambiguated(&second, "README", ""), "got {second}");
    }

    #[test]
    fn tag_lands_before_the_last_separator_only() {
        let mut deduper = NameDeduper::new();
        deduper.resolve("report.2024.xml".to_string());
        let second = deduper.resolve("report.2024.xml".to_string());
        assert!(
            is_disambiguated(&second, "report.2024", ".xml"),
            "got {second}"
        );
    }

    #[test]
    fn many_duplicates_stay_pairwise_distinct() {
        let mut deduper = NameDeduper::new();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let resolved = deduper.resolve("a.xml".to_string());
            assert!(seen.insert(resolved));
        }
    }
}
