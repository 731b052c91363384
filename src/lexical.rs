use std::collections::HashMap;

// Term weights use the smoothed idf `ln((1 + n) / (1 + df)) + 1` and every
// vector is l2-normalized, so cosine similarity reduces to a sparse dot
// product. Terms the corpus never saw contribute nothing to a query vector.
#[derive(Debug)]
pub struct LexicalIndex {
    idf: HashMap<String, f64>,
    doc_vectors: Vec<HashMap<String, f64>>,
}

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "an", "and", "are", "as", "at", "be", "been", "but", "by",
    "for", "from", "had", "has", "have", "he", "her", "his", "in", "into", "is", "it", "its",
    "more", "new", "not", "of", "on", "or", "our", "she", "that", "the", "their", "there",
    "they", "this", "to", "was", "were", "will", "with", "you",
];

impl LexicalIndex {
    pub fn build<T: AsRef<str>>(texts: &[T]) -> Self {
        let doc_count = texts.len();
        let mut document_frequency = HashMap::<String, usize>::new();
        let mut counted = Vec::<HashMap<String, usize>>::with_capacity(doc_count);

        for text in texts {
            let counts = term_counts(text.as_ref());
            for term in counts.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            counted.push(counts);
        }

        let idf = document_frequency
            .into_iter()
            .map(|(term, df)| {
                let weight = ((1.0 + doc_count as f64) / (1.0 + df as f64)).ln() + 1.0;
                (term, weight)
            })
            .collect::<HashMap<String, f64>>();

        let doc_vectors = counted
            .into_iter()
            .map(|counts| weighted_vector(&counts, &idf))
            .collect();

        Self { idf, doc_vectors }
    }

    pub fn doc_count(&self) -> usize {
        self.doc_vectors.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn query_vector(&self, text: &str) -> HashMap<String, f64> {
        weighted_vector(&term_counts(text), &self.idf)
    }

    pub fn similarity(&self, query_vector: &HashMap<String, f64>, doc_id: usize) -> f64 {
        let Some(doc_vector) = self.doc_vectors.get(doc_id) else {
            return 0.0;
        };

        // Both sides are l2-normalized, so cosine is the sparse dot product.
        let (small, large) = if query_vector.len() <= doc_vector.len() {
            (query_vector, doc_vector)
        } else {
            (doc_vector, query_vector)
        };

        small
            .iter()
            .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
            .sum()
    }
}

fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::<String, usize>::new();
    for token in text
        .to_ascii_lowercase()
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| token.len() >= 2)
        .filter(|token| STOPWORDS.iter().all(|stopword| stopword != token))
    {
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }
    counts
}

fn weighted_vector(counts: &HashMap<String, usize>, idf: &HashMap<String, f64>) -> HashMap<String, f64> {
    let mut vector = counts
        .iter()
        .filter_map(|(term, count)| {
            idf.get(term)
                .map(|weight| (term.clone(), *count as f64 * weight))
        })
        .collect::<HashMap<String, f64>>();

    let norm = vector
        .values()
        .map(|weight| weight * weight)
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> LexicalIndex {
        LexicalIndex::build(&[
            "tax reform package boosts small enterprises",
            "football season opens amid stadium upgrades",
            "reform critics question tax rollout",
        ])
    }

    #[test]
    fn identical_text_scores_highest() {
        let index = sample_index();
        let query = index.query_vector("tax reform package boosts small enterprises");
        let own = index.similarity(&query, 0);
        assert!((own - 1.0).abs() < 1e-9);
        assert!(own > index.similarity(&query, 1));
    }

    #[test]
    fn disjoint_vocabulary_scores_zero() {
        let index = sample_index();
        let query = index.query_vector("quantum computing breakthrough");
        assert_eq!(index.similarity(&query, 0), 0.0);
    }

    #[test]
    fn shared_terms_score_between_zero_and_one() {
        let index = sample_index();
        let query = index.query_vector("tax reform");
        let score = index.similarity(&query, 2);
        assert!(score > 0.0);
        assert!(score < 1.0);
    }

    #[test]
    fn unknown_doc_id_scores_zero() {
        let index = sample_index();
        let query = index.query_vector("tax reform");
        assert_eq!(index.similarity(&query, 99), 0.0);
    }

    #[test]
    fn stopwords_and_short_tokens_are_dropped() {
        let counts = term_counts("the a an it of to reform");
        assert_eq!(counts.len(), 1);
        assert!(counts.contains_key("reform"));
    }
}
