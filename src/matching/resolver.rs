// src/matching/resolver.rs
//
// Layered name resolution. A query is tried against the reference set with
// four strategies in a fixed order and the first one that finds an entry
// wins:
//
//   1. exact match on the normalized form
//   2. fuzzy similarity, best score at or above the threshold
//   3. query contained in a reference entry as whole tokens
//   4. reference entry contained in the query as whole tokens
//
// Resolution is total: every query yields a result and nothing is mutated.

use log::trace;
use std::sync::Arc;

use crate::matching::normalize::{contains_as_tokens, NormalizedKey};
use crate::matching::reference::ReferenceSet;
use crate::matching::scorer::{SimilarityScorer, StrsimScorer};
use crate::models::matching::{MatchResult, MatchStage, Resolution};
use crate::utils::matcher_config::MatcherConfig;

#[derive(Clone)]
pub struct NameResolver {
    config: MatcherConfig,
    scorer: Arc<dyn SimilarityScorer>,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}

impl std::fmt::Debug for NameResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NameResolver {
    /// Resolver scoring with the strsim metric named in `config`.
    pub fn new(config: MatcherConfig) -> Self {
        let scorer = StrsimScorer::new(config.algorithm);
        Self::with_scorer(config, Arc::new(scorer))
    }

    /// Resolver with a caller-supplied similarity provider.
    pub fn with_scorer(config: MatcherConfig, scorer: Arc<dyn SimilarityScorer>) -> Self {
        Self {
            config: config.sanitized(),
            scorer,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn resolve(&self, query: &str, reference: &ReferenceSet) -> MatchResult {
        self.resolve_detailed(query, reference).result
    }

    /// Resolves `query` and reports which stage matched and, for fuzzy
    /// matches, the accepted score.
    pub fn resolve_detailed(&self, query: &str, reference: &ReferenceSet) -> Resolution {
        let key = NormalizedKey::new(query);

        if reference.is_empty() || (self.config.guard_empty_query && key.is_empty()) {
            return Resolution::unmatched(query);
        }

        if let Some(original) = reference.first_with_key(&key) {
            trace!("'{}' -> '{}' (exact)", query, original);
            return Resolution::matched(query, original, MatchStage::Exact, None);
        }

        if let Some((original, score)) = self.fuzzy_match(&key, reference) {
            trace!("'{}' -> '{}' (fuzzy, score {:.2})", query, original, score);
            return Resolution::matched(query, original, MatchStage::Fuzzy, Some(score));
        }

        if let Some(original) = reference
            .iter()
            .find(|(_, ref_key)| contains_as_tokens(ref_key.as_str(), key.as_str()))
            .map(|(original, _)| original)
        {
            trace!("'{}' -> '{}' (forward containment)", query, original);
            return Resolution::matched(query, original, MatchStage::ForwardContainment, None);
        }

        if let Some(original) = reference
            .iter()
            .find(|(_, ref_key)| contains_as_tokens(key.as_str(), ref_key.as_str()))
            .map(|(original, _)| original)
        {
            trace!("'{}' -> '{}' (backward containment)", query, original);
            return Resolution::matched(query, original, MatchStage::BackwardContainment, None);
        }

        trace!("'{}' -> no match", query);
        Resolution::unmatched(query)
    }

    /// Best candidate at or above the threshold among the top
    /// `candidate_limit` ranked keys. A later candidate replaces the current
    /// best only with a strictly higher score, so ties resolve to whichever
    /// the scorer ranked first.
    fn fuzzy_match<'r>(
        &self,
        key: &NormalizedKey,
        reference: &'r ReferenceSet,
    ) -> Option<(&'r str, f64)> {
        let keys = reference.distinct_keys();
        let ranked = self
            .scorer
            .top_candidates(key.as_str(), &keys, self.config.candidate_limit);

        let mut best: Option<(usize, f64)> = None;
        for candidate in ranked {
            if candidate.score.is_nan() || candidate.score < self.config.similarity_threshold {
                continue;
            }
            match best {
                Some((_, best_score)) if candidate.score <= best_score => {}
                _ => best = Some((candidate.index, candidate.score)),
            }
        }

        let (key_idx, score) = best?;
        let entry_idx = *reference.distinct_indices().get(key_idx)?;
        reference.entry(entry_idx).map(|original| (original, score))
    }

    /// Resolves every query in order.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        queries: &[S],
        reference: &ReferenceSet,
    ) -> Vec<MatchResult> {
        queries
            .iter()
            .map(|q| self.resolve(q.as_ref(), reference))
            .collect()
    }

    pub fn resolve_all_detailed<S: AsRef<str>>(
        &self,
        queries: &[S],
        reference: &ReferenceSet,
    ) -> Vec<Resolution> {
        queries
            .iter()
            .map(|q| self.resolve_detailed(q.as_ref(), reference))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scorer::{ScoredCandidate, SimilarityAlgorithm};
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Scorer returning fixed scores per candidate, 0 otherwise.
    struct FixedScorer(HashMap<&'static str, f64>);

    impl FixedScorer {
        fn new(scores: &[(&'static str, f64)]) -> Arc<Self> {
            Arc::new(Self(scores.iter().cloned().collect()))
        }
    }

    impl SimilarityScorer for FixedScorer {
        fn score(&self, _a: &str, b: &str) -> f64 {
            self.0.get(b).copied().unwrap_or(0.0)
        }
    }

    fn reference(entries: &[&str]) -> ReferenceSet {
        ReferenceSet::new(entries.iter().copied())
    }

    fn matched(name: &str) -> MatchResult {
        MatchResult::Matched(name.to_string())
    }

    #[test]
    fn test_end_to_end_scenario() {
        let resolver = NameResolver::default();
        let refs = reference(&["Empresa A", "Empresa B", "Empresa C"]);
        let queries = ["Empresa B Ltda", "Empreza C", "EMPRESA A"];

        let detailed = resolver.resolve_all_detailed(&queries, &refs);
        let results: Vec<MatchResult> = detailed.iter().map(|r| r.result.clone()).collect();
        assert_eq!(
            results,
            vec![matched("Empresa B"), matched("Empresa C"), matched("Empresa A")]
        );
        assert_eq!(detailed[0].stage, Some(MatchStage::BackwardContainment));
        assert_eq!(detailed[1].stage, Some(MatchStage::Fuzzy));
        assert!(detailed[1].score.unwrap() >= 90.0);
        assert_eq!(detailed[2].stage, Some(MatchStage::Exact));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let resolver = NameResolver::default();
        assert_eq!(
            resolver.resolve("  EMPRESA A  ", &reference(&["Empresa A"])),
            matched("Empresa A")
        );
    }

    #[test]
    fn test_exact_match_returns_first_duplicate() {
        let resolver = NameResolver::default();
        let refs = reference(&["EMPRESA a", "Empresa A", "empresa a"]);
        assert_eq!(resolver.resolve("empresa a", &refs), matched("EMPRESA a"));
    }

    #[test]
    fn test_exact_match_beats_higher_fuzzy_score() {
        let scorer = FixedScorer::new(&[("empresa a", 10.0), ("empresa ab", 100.0)]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), scorer);
        let refs = reference(&["Empresa AB", "Empresa A"]);
        assert_eq!(resolver.resolve("Empresa A", &refs), matched("Empresa A"));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let refs = reference(&["Alpha", "Beta"]);

        let at_threshold = FixedScorer::new(&[("beta", 90.0)]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), at_threshold);
        let detailed = resolver.resolve_detailed("gamma", &refs);
        assert_eq!(detailed.result, matched("Beta"));
        assert_eq!(detailed.score, Some(90.0));

        let below_threshold = FixedScorer::new(&[("beta", 89.0)]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), below_threshold);
        assert_eq!(resolver.resolve("gamma", &refs), MatchResult::Unmatched);
    }

    #[test]
    fn test_nan_score_is_never_accepted() {
        struct NanRanker;
        impl SimilarityScorer for NanRanker {
            fn score(&self, _a: &str, _b: &str) -> f64 {
                f64::NAN
            }

            fn top_candidates<'a>(
                &self,
                _query: &str,
                candidates: &[&'a str],
                _k: usize,
            ) -> Vec<ScoredCandidate<'a>> {
                candidates
                    .iter()
                    .enumerate()
                    .map(|(index, &candidate)| ScoredCandidate {
                        index,
                        candidate,
                        score: if candidate == "alpha" { f64::NAN } else { 92.0 },
                    })
                    .collect()
            }
        }

        let resolver = NameResolver::with_scorer(MatcherConfig::default(), Arc::new(NanRanker));
        let detailed = resolver.resolve_detailed("gamma", &reference(&["Beta", "Alpha"]));
        assert_eq!(detailed.result, matched("Beta"));
        assert_eq!(detailed.score, Some(92.0));

        let only_nan = FixedScorer::new(&[("alpha", f64::NAN)]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), only_nan);
        assert_eq!(resolver.resolve("gamma", &reference(&["Alpha"])), MatchResult::Unmatched);
    }

    #[test]
    fn test_highest_score_wins() {
        let scorer = FixedScorer::new(&[("alpha", 91.0), ("beta", 97.0), ("delta", 93.0)]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), scorer);
        let refs = reference(&["Alpha", "Beta", "Delta"]);
        assert_eq!(resolver.resolve("gamma", &refs), matched("Beta"));
    }

    #[test]
    fn test_tie_goes_to_first_in_scorer_order() {
        let scorer = FixedScorer::new(&[("alpha", 95.0), ("beta", 95.0)]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), scorer);
        assert_eq!(
            resolver.resolve("gamma", &reference(&["Alpha", "Beta"])),
            matched("Alpha")
        );
        assert_eq!(
            resolver.resolve("gamma", &reference(&["Beta", "Alpha"])),
            matched("Beta")
        );
    }

    #[test]
    fn test_jaro_winkler_rewards_shared_prefix() {
        // Plain Jaro scores "empresa b ltda" equally against "empresa a" and
        // "empresa b"; the Winkler prefix bonus separates them.
        let config = MatcherConfig {
            algorithm: SimilarityAlgorithm::JaroWinkler,
            ..Default::default()
        };
        let resolver = NameResolver::new(config);
        let refs = reference(&["Empresa A", "Empresa B", "Empresa C"]);
        let detailed = resolver.resolve_detailed("Empresa B Ltda", &refs);
        assert_eq!(detailed.stage, Some(MatchStage::Fuzzy));
        assert_eq!(detailed.result, matched("Empresa B"));
    }

    #[test]
    fn test_candidate_limit_of_one_keeps_best() {
        let scorer = FixedScorer::new(&[("alpha", 99.0), ("beta", 98.0), ("delta", 95.0)]);
        let config = MatcherConfig {
            similarity_threshold: 96.0,
            candidate_limit: 1,
            ..Default::default()
        };
        let resolver = NameResolver::with_scorer(config, scorer);
        let refs = reference(&["Beta", "Alpha", "Delta"]);
        assert_eq!(resolver.resolve("gamma", &refs), matched("Alpha"));
    }

    #[test]
    fn test_duplicate_keys_do_not_crowd_candidates() {
        let scorer = FixedScorer::new(&[("alpha", 80.0), ("beta", 92.0)]);
        let config = MatcherConfig {
            candidate_limit: 2,
            ..Default::default()
        };
        let resolver = NameResolver::with_scorer(config, scorer);
        let refs = reference(&["Alpha", "ALPHA", "alpha", "Beta"]);
        assert_eq!(resolver.resolve("gamma", &refs), matched("Beta"));
    }

    #[test]
    fn test_fuzzy_match_returns_first_original_of_key() {
        let scorer = FixedScorer::new(&[("beta", 95.0)]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), scorer);
        let refs = reference(&["Alpha", "BETA", "Beta"]);
        assert_eq!(resolver.resolve("gamma", &refs), matched("BETA"));
    }

    #[test]
    fn test_forward_containment() {
        let resolver = NameResolver::default();
        assert_eq!(resolver.resolve("b", &reference(&["a b c"])), matched("a b c"));
    }

    #[test]
    fn test_backward_containment() {
        let resolver = NameResolver::default();
        assert_eq!(resolver.resolve("a b c", &reference(&["b"])), matched("b"));
    }

    #[test]
    fn test_forward_containment_checked_before_backward() {
        let scorer = FixedScorer::new(&[]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), scorer);
        let refs = reference(&["Empresa", "Grupo Empresa Norte"]);
        let detailed = resolver.resolve_detailed("empresa norte", &refs);
        assert_eq!(detailed.result, matched("Grupo Empresa Norte"));
        assert_eq!(detailed.stage, Some(MatchStage::ForwardContainment));
    }

    #[test]
    fn test_containment_returns_first_in_reference_order() {
        let scorer = FixedScorer::new(&[]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), scorer);
        let refs = reference(&["Norte Empresa Sul", "Empresa Sul Ltda"]);
        assert_eq!(resolver.resolve("Empresa Sul", &refs), matched("Norte Empresa Sul"));
    }

    #[test]
    fn test_containment_requires_word_boundaries() {
        let scorer = FixedScorer::new(&[]);
        let resolver = NameResolver::with_scorer(MatcherConfig::default(), scorer);
        assert_eq!(
            resolver.resolve("Empresa B", &reference(&["EmpresaBC"])),
            MatchResult::Unmatched
        );
        assert_eq!(
            resolver.resolve("EmpresaBC", &reference(&["Empresa B"])),
            MatchResult::Unmatched
        );
    }

    #[test]
    fn test_empty_reference_is_unmatched() {
        let resolver = NameResolver::default();
        let refs = ReferenceSet::default();
        assert_eq!(resolver.resolve("Empresa A", &refs), MatchResult::Unmatched);
        assert_eq!(resolver.resolve("", &refs), MatchResult::Unmatched);
    }

    #[test]
    fn test_empty_query_runs_full_pipeline() {
        let resolver = NameResolver::default();
        // The padded empty query is a double space, found only in entries
        // that contain one.
        let refs = reference(&["Empresa A", "Empresa  B"]);
        let detailed = resolver.resolve_detailed("   ", &refs);
        assert_eq!(detailed.result, matched("Empresa  B"));
        assert_eq!(detailed.stage, Some(MatchStage::ForwardContainment));

        assert_eq!(
            resolver.resolve("", &reference(&["Empresa A"])),
            MatchResult::Unmatched
        );
    }

    #[test]
    fn test_empty_query_matches_empty_reference_exactly() {
        let resolver = NameResolver::default();
        let detailed = resolver.resolve_detailed(" ", &reference(&["Empresa A", "  "]));
        assert_eq!(detailed.result, matched("  "));
        assert_eq!(detailed.stage, Some(MatchStage::Exact));
    }

    #[test]
    fn test_empty_query_guard() {
        let config = MatcherConfig {
            guard_empty_query: true,
            ..Default::default()
        };
        let resolver = NameResolver::new(config);
        let refs = reference(&["Empresa  B", ""]);
        assert_eq!(resolver.resolve("  ", &refs), MatchResult::Unmatched);
        assert_eq!(resolver.resolve("Empresa  B", &refs), matched("Empresa  B"));
    }

    #[test]
    fn test_resolve_all_preserves_order_and_length() {
        let resolver = NameResolver::default();
        let refs = reference(&["Empresa A", "Empresa B"]);
        let queries = vec![
            "empresa b".to_string(),
            "xyz".to_string(),
            "EMPRESA A".to_string(),
            "empresa b".to_string(),
        ];
        let results = resolver.resolve_all(&queries, &refs);
        assert_eq!(
            results,
            vec![
                matched("Empresa B"),
                MatchResult::Unmatched,
                matched("Empresa A"),
                matched("Empresa B"),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_empty_reference_never_matches(query in ".{0,24}") {
            let resolver = NameResolver::default();
            prop_assert_eq!(
                resolver.resolve(&query, &ReferenceSet::default()),
                MatchResult::Unmatched
            );
        }

        #[test]
        fn prop_resolution_is_deterministic(
            query in "[a-c ]{0,8}",
            entries in proptest::collection::vec("[a-c ]{0,8}", 0..6),
        ) {
            let resolver = NameResolver::default();
            let refs = ReferenceSet::new(entries);
            prop_assert_eq!(resolver.resolve(&query, &refs), resolver.resolve(&query, &refs));
        }

        #[test]
        fn prop_exact_match_takes_precedence(
            entries in proptest::collection::vec("[a-zA-Z ]{1,10}", 1..8),
            pick in any::<proptest::sample::Index>(),
            pad in "[ ]{0,3}",
        ) {
            let resolver = NameResolver::default();
            let refs = ReferenceSet::new(entries.clone());
            let target = &entries[pick.index(entries.len())];
            let query = format!("{}{}{}", pad, target.to_uppercase(), pad);
            let expected = refs
                .first_with_key(&NormalizedKey::new(target))
                .map(str::to_string);
            prop_assert_eq!(resolver.resolve(&query, &refs).into_option(), expected);
        }

        #[test]
        fn prop_output_length_matches_input(
            queries in proptest::collection::vec(".{0,12}", 0..10),
            entries in proptest::collection::vec("[a-z ]{0,10}", 0..5),
        ) {
            let resolver = NameResolver::default();
            let refs = ReferenceSet::new(entries);
            let detailed = resolver.resolve_all_detailed(&queries, &refs);
            prop_assert_eq!(detailed.len(), queries.len());
            for (resolution, query) in detailed.iter().zip(queries.iter()) {
                prop_assert_eq!(&resolution.query, query);
            }
        }
    }
}
