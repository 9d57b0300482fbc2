//! Incremental suggestion filtering.
//!
//! A candidate matches when its folded form contains the folded query term.
//! Folding lowercases and strips combining marks after canonical
//! decomposition, so `"ETRE"` matches `"Être"`. Nothing else is relaxed:
//! no ranking, no deduplication, no fuzzy matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lazy, restartable view over the candidates matching a term.
///
/// Cloning yields an iterator positioned where the original was, so a
/// fresh `matches(..)` call (or a clone taken before consuming) replays the
/// result from the start.
#[derive(Debug, Clone)]
pub struct Matches<'a, S> {
    needle: String,
    candidates: std::slice::Iter<'a, S>,
}

impl<'a, S: AsRef<str>> Matches<'a, S> {
    pub fn term(&self) -> &str {
        &self.needle
    }
}

impl<'a, S: AsRef<str>> Iterator for Matches<'a, S> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = self.needle.as_str();
        self.candidates
            .by_ref()
            .map(|candidate| candidate.as_ref())
            .find(|candidate| needle.is_empty() || fold(candidate).contains(needle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates.len()))
    }
}

impl<'a, S: AsRef<str>> std::iter::FusedIterator for Matches<'a, S> {}

pub fn matches<'a, S: AsRef<str>>(term: &str, candidates: &'a [S]) -> Matches<'a, S> {
    Matches {
        needle: fold(term),
        candidates: candidates.iter(),
    }
}

pub fn filter_candidates<S: AsRef<str>>(term: &str, candidates: &[S]) -> Vec<String> {
    matches(term, candidates).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verbs() -> Vec<String> {
        ["parler", "manger", "partir", "courir"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn substring_match_keeps_candidate_order() {
        assert_eq!(filter_candidates("par", &verbs()), vec!["parler", "partir"]);
        assert_eq!(filter_candidates("ir", &verbs()), vec!["partir", "courir"]);
    }

    #[test]
    fn empty_term_yields_every_candidate() {
        assert_eq!(filter_candidates("", &verbs()), verbs());
    }

    #[test]
    fn empty_candidate_set_yields_nothing() {
        let empty: Vec<String> = Vec::new();
        assert!(filter_candidates("go", &empty).is_empty());
        assert!(filter_candidates("", &empty).is_empty());
    }

    #[test]
    fn comparison_ignores_case() {
        let candidates = ["Run", "rerun", "RUNNER", "walk"];
        assert_eq!(
            filter_candidates("RUN", &candidates),
            filter_candidates("run", &candidates)
        );
        assert_eq!(
            filter_candidates("run", &candidates),
            vec!["Run", "rerun", "RUNNER"]
        );
    }

    #[test]
    fn comparison_folds_diacritics() {
        assert_eq!(filter_candidates("ETRE", &["Être", "avoir"]), vec!["Être"]);
        assert_eq!(filter_candidates("fur", &["für", "fahren"]), vec!["für"]);
        assert_eq!(filter_candidates("Über", &["übersetzen", "geben"]), vec!["übersetzen"]);
    }

    #[test]
    fn sharp_s_is_not_transliterated() {
        assert_eq!(filter_candidates("ss", &["heißen", "essen"]), vec!["essen"]);
        assert_eq!(filter_candidates("ß", &["heißen", "essen"]), vec!["heißen"]);
    }

    #[test]
    fn unsanitized_terms_are_matched_literally() {
        assert!(filter_candidates(" par", &verbs()).is_empty());
        assert!(filter_candidates(".*", &verbs()).is_empty());
    }

    #[test]
    fn results_are_a_subsequence_of_candidates() {
        let candidates = verbs();
        for term in ["", "a", "r", "er", "our", "x"] {
            let result = filter_candidates(term, &candidates);
            let mut rest = candidates.iter();
            for item in &result {
                assert!(rest.any(|c| c == item), "{item} out of order for {term:?}");
            }
        }
    }

    #[test]
    fn matches_is_lazy_and_restartable() {
        let candidates = verbs();
        let mut iter = matches("r", &candidates);
        let snapshot = iter.clone();
        assert_eq!(iter.next(), Some("parler"));
        assert_eq!(iter.next(), Some("manger"));
        assert_eq!(snapshot.collect::<Vec<_>>().len(), 4);
        assert_eq!(matches("r", &candidates).count(), 4);
        assert_eq!(matches("R", &candidates).term(), "r");
    }

    #[test]
    fn fold_decomposes_then_lowercases() {
        assert_eq!(fold("Être"), "etre");
        assert_eq!(fold("e\u{0301}couter"), "ecouter");
        assert_eq!(fold("ÄÖÜ"), "aou");
    }
}
