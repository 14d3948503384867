//! Merging ranked extractor outputs into one deduplicated keyword set

use crate::types::{KeywordCandidate, Method, RankedMethodOutput, UniqueKeywordSet};
use std::collections::HashSet;

/// Merges per-method rankings with first-seen-wins deduplication.
///
/// Outputs are visited in method precedence order (RAKE, RAKE_ALT, KeyBERT,
/// YAKE, BERTopic) and candidates in rank order. A candidate whose normalized
/// key was already seen is dropped, whatever its score.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Merge all outputs into a set of distinct keywords
    pub fn aggregate(&self, outputs: &[RankedMethodOutput]) -> UniqueKeywordSet {
        let mut ordered: Vec<&RankedMethodOutput> = outputs.iter().collect();
        // stable: outputs sharing a method keep their input order
        ordered.sort_by_key(|output| output.method);

        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for output in ordered {
            for candidate in &output.candidates {
                if seen.insert(candidate.normalized_key().to_string()) {
                    unique.push(candidate.clone());
                }
            }
        }
        UniqueKeywordSet::from_unique(unique)
    }

    /// Drop repeated phrases inside a single method's ranking, keeping the first
    pub fn dedupe_within_method(&self, output: RankedMethodOutput) -> RankedMethodOutput {
        let mut seen = HashSet::new();
        let candidates = output
            .candidates
            .into_iter()
            .filter(|c| seen.insert(c.normalized_key().to_string()))
            .collect();
        RankedMethodOutput {
            method: output.method,
            candidates,
        }
    }

    /// Split a deduplicated RAKE ranking into its primary and alternate slices
    pub fn split_rake(
        &self,
        output: RankedMethodOutput,
        primary_count: usize,
        alternate_count: usize,
    ) -> (RankedMethodOutput, RankedMethodOutput) {
        let deduped = self.dedupe_within_method(output);
        let mut candidates = deduped.candidates.into_iter();

        let primary: Vec<KeywordCandidate> = candidates
            .by_ref()
            .take(primary_count)
            .map(|c| c.with_method(Method::Rake))
            .collect();
        let alternate: Vec<KeywordCandidate> = candidates
            .take(alternate_count)
            .map(|c| c.with_method(Method::RakeAlt))
            .collect();

        (
            RankedMethodOutput {
                method: Method::Rake,
                candidates: primary,
            },
            RankedMethodOutput {
                method: Method::RakeAlt,
                candidates: alternate,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(method: Method, pairs: &[(&str, f64)]) -> RankedMethodOutput {
        RankedMethodOutput::from_pairs(method, pairs.iter().map(|(p, s)| (*p, *s)))
    }

    #[test]
    fn test_first_seen_wins_across_methods() {
        let outputs = vec![
            output(Method::Rake, &[("data science", 0.9)]),
            output(Method::RakeAlt, &[]),
            output(Method::KeyBert, &[("Data Science", 0.5)]),
        ];
        let set = Aggregator::new().aggregate(&outputs);

        assert_eq!(set.len(), 1);
        let only = &set.candidates()[0];
        assert_eq!(only.phrase(), "data science");
        assert_eq!(only.method, Method::Rake);
        assert_eq!(only.score, 0.9);
    }

    #[test]
    fn test_later_higher_score_is_still_dropped() {
        let outputs = vec![
            output(Method::KeyBert, &[("solar power", 0.1)]),
            output(Method::Yake, &[("Solar Power ", 99.0), ("wind", 0.2)]),
        ];
        let set = Aggregator::new().aggregate(&outputs);
        let phrases: Vec<&str> = set.iter().map(|c| c.phrase()).collect();
        assert_eq!(phrases, vec!["solar power", "wind"]);
        assert_eq!(set.get("SOLAR POWER").unwrap().method, Method::KeyBert);
    }

    #[test]
    fn test_precedence_ignores_input_order() {
        let outputs = vec![
            output(Method::BerTopic, &[("energy", 0.3)]),
            output(Method::Yake, &[("energy", 0.01)]),
            output(Method::Rake, &[("grid", 4.0)]),
        ];
        let set = Aggregator::new().aggregate(&outputs);
        let methods: Vec<Method> = set.iter().map(|c| c.method).collect();
        assert_eq!(methods, vec![Method::Rake, Method::Yake]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let outputs = vec![
            output(Method::Rake, &[("a b", 2.0), ("c", 1.0), ("A B", 0.5)]),
            output(Method::KeyBert, &[("c", 0.7), ("d", 0.6)]),
        ];
        let aggregator = Aggregator::new();
        let first = aggregator.aggregate(&outputs);
        let again = aggregator.aggregate(&[RankedMethodOutput {
            method: Method::Rake,
            candidates: first.candidates().to_vec(),
        }]);
        assert_eq!(first, again);

        let keys: HashSet<&str> = first.iter().map(|c| c.normalized_key()).collect();
        assert_eq!(keys.len(), first.len());
    }

    #[test]
    fn test_absent_output_equals_empty_output() {
        let base = vec![
            output(Method::Rake, &[("x", 1.0)]),
            output(Method::KeyBert, &[("y", 0.5)]),
        ];
        let mut with_empty = base.clone();
        with_empty.push(RankedMethodOutput::empty(Method::Yake));

        let aggregator = Aggregator::new();
        assert_eq!(aggregator.aggregate(&base), aggregator.aggregate(&with_empty));
    }

    #[test]
    fn test_split_rake_dedupes_before_slicing() {
        let pairs: Vec<(String, f64)> = ["a", "b", "A", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"]
            .iter()
            .enumerate()
            .map(|(i, p)| (p.to_string(), 100.0 - i as f64))
            .collect();
        let ranked = RankedMethodOutput::from_pairs(Method::Rake, pairs);
        let (primary, alternate) = Aggregator::new().split_rake(ranked, 5, 5);

        assert_eq!(primary.phrases(), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(alternate.phrases(), vec!["f", "g", "h", "i", "j"]);
        assert!(alternate.candidates.iter().all(|c| c.method == Method::RakeAlt));
    }

    #[test]
    fn test_split_rake_short_list() {
        let ranked = output(Method::Rake, &[("cats", 1.0), ("cats", 1.0), ("dogs", 1.0)]);
        let (primary, alternate) = Aggregator::new().split_rake(ranked, 5, 5);
        assert_eq!(primary.phrases(), vec!["cats", "dogs"]);
        assert!(alternate.is_empty());
    }
}
