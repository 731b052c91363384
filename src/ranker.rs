use std::collections::HashSet;

use crate::error::EngineError;
use crate::index::SimilarityIndex;
use crate::lexical::LexicalIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub doc_id: usize,
    pub semantic_distance: f64,
    pub semantic_similarity: f64,
    pub lexical_score: f64,
    pub combined_score: f64,
}

// Lexical scores are only computed over the semantic candidate pool, never
// the full corpus: a document with a strong keyword match but weak semantic
// similarity cannot surface. Known limitation of this ranking, kept on
// purpose; widening it to a full lexical pass would change result sets.
pub struct HybridRanker<'a> {
    index: &'a SimilarityIndex,
    lexical: &'a LexicalIndex,
}

impl<'a> HybridRanker<'a> {
    pub fn new(index: &'a SimilarityIndex, lexical: &'a LexicalIndex) -> Self {
        Self { index, lexical }
    }

    // `oversample` widens the semantic pool to `k * oversample` before
    // fusion. Fewer than `k` unique candidates is a thin result, not an
    // error.
    pub fn rank(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        k: usize,
        alpha: f64,
        oversample: usize,
    ) -> Result<Vec<RankedCandidate>, EngineError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(EngineError::InvalidWeight { alpha });
        }
        if k == 0 {
            return Err(EngineError::InvalidK);
        }

        let pool_size = k.saturating_mul(oversample.max(1));
        let semantic_hits = self.index.query(query_embedding, pool_size)?;
        let query_vector = self.lexical.query_vector(query_text);

        Ok(fuse_candidates(
            &semantic_hits,
            |doc_id| self.lexical.similarity(&query_vector, doc_id),
            alpha,
            k,
        ))
    }
}

// Distance becomes the bounded similarity `1 / (1 + d)`; dedup keeps the
// first (closest) occurrence.
fn fuse_candidates(
    semantic_hits: &[(usize, f64)],
    lexical_score_of: impl Fn(usize) -> f64,
    alpha: f64,
    k: usize,
) -> Vec<RankedCandidate> {
    let mut seen = HashSet::<usize>::new();
    let mut candidates = Vec::<RankedCandidate>::with_capacity(semantic_hits.len());

    for &(doc_id, distance) in semantic_hits {
        if !seen.insert(doc_id) {
            continue;
        }
        let similarity = 1.0 / (1.0 + distance);
        let lexical_score = lexical_score_of(doc_id);
        candidates.push(RankedCandidate {
            doc_id,
            semantic_distance: distance,
            semantic_similarity: similarity,
            lexical_score,
            combined_score: alpha * similarity + (1.0 - alpha) * lexical_score,
        });
    }

    candidates.sort_by(|left, right| {
        right
            .combined_score
            .total_cmp(&left.combined_score)
            .then(left.semantic_distance.total_cmp(&right.semantic_distance))
            .then(left.doc_id.cmp(&right.doc_id))
    });
    candidates.truncate(k);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_heavy_tail_candidate_overtakes_closer_neighbors() {
        // Five docs by ascending semantic distance; the furthest one carries
        // the same strong keyword overlap as the closest.
        let semantic_hits = vec![(0, 0.1), (1, 0.2), (2, 0.3), (3, 0.4), (4, 0.5)];
        let lexical_scores = [0.9, 0.1, 0.1, 0.1, 0.9];

        let ranked = fuse_candidates(&semantic_hits, |doc_id| lexical_scores[doc_id], 0.5, 2);

        let ids = ranked
            .iter()
            .map(|candidate| candidate.doc_id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![0, 4]);
        assert!((ranked[0].semantic_similarity - 1.0 / 1.1).abs() < 1e-9);
        assert!((ranked[0].combined_score - 0.9045).abs() < 1e-3);
        assert!((ranked[1].combined_score - 0.7835).abs() < 1e-3);
    }

    #[test]
    fn returns_at_most_k_in_non_increasing_order() {
        let semantic_hits = vec![(0, 0.5), (1, 0.1), (2, 0.9), (3, 0.3)];
        for alpha in [0.0, 0.25, 0.5, 1.0] {
            let ranked = fuse_candidates(&semantic_hits, |doc_id| doc_id as f64 / 10.0, alpha, 3);
            assert!(ranked.len() <= 3);
            for pair in ranked.windows(2) {
                assert!(pair[0].combined_score >= pair[1].combined_score);
            }
        }
    }

    #[test]
    fn duplicate_doc_ids_keep_first_occurrence() {
        let semantic_hits = vec![(7, 0.1), (7, 0.4), (3, 0.2)];
        let ranked = fuse_candidates(&semantic_hits, |_| 0.0, 1.0, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].doc_id, 7);
        assert!((ranked[0].semantic_distance - 0.1).abs() < 1e-12);
    }

    #[test]
    fn score_ties_break_on_distance_then_doc_id() {
        // alpha 0 makes combined equal to the lexical score alone.
        let semantic_hits = vec![(5, 0.3), (2, 0.3), (9, 0.1)];
        let ranked = fuse_candidates(&semantic_hits, |_| 0.5, 0.0, 3);
        assert_eq!(ranked[0].doc_id, 9);
        assert_eq!(ranked[1].doc_id, 2);
        assert_eq!(ranked[2].doc_id, 5);
    }

    #[test]
    fn invalid_alpha_and_k_fail_fast() {
        let index = SimilarityIndex::build(vec![vec![1.0, 0.0]]).unwrap();
        let lexical = LexicalIndex::build(&["policy reform news"]);
        let ranker = HybridRanker::new(&index, &lexical);

        assert_eq!(
            ranker.rank(&[1.0, 0.0], "reform", 3, 1.5, 3).err(),
            Some(EngineError::InvalidWeight { alpha: 1.5 })
        );
        assert_eq!(
            ranker.rank(&[1.0, 0.0], "reform", 0, 0.5, 3).err(),
            Some(EngineError::InvalidK)
        );
    }

    #[test]
    fn rank_fuses_index_and_lexical_scores() {
        let index =
            SimilarityIndex::build(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]]).unwrap();
        let lexical = LexicalIndex::build(&[
            "tax reform announced",
            "sports final tonight",
            "reform debate continues",
        ]);
        let ranker = HybridRanker::new(&index, &lexical);

        let ranked = ranker.rank(&[1.0, 0.0], "tax reform", 2, 0.5, 3).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].doc_id, 0);
        for candidate in &ranked {
            let expected = 0.5 * candidate.semantic_similarity + 0.5 * candidate.lexical_score;
            assert!((candidate.combined_score - expected).abs() < 1e-12);
        }
    }
}
