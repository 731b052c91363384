use crate::error::EngineError;

// Flat nearest-neighbor index over fixed-dimension vectors. Distances are
// squared euclidean, so lower means more similar. Rebuilt from the corpus at
// each process start and read-only afterwards.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl SimilarityIndex {
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self, EngineError> {
        let mut index = Self {
            dimensions: 0,
            vectors: Vec::with_capacity(vectors.len()),
        };
        for vector in vectors {
            index.push(vector)?;
        }
        Ok(index)
    }

    pub fn push(&mut self, vector: Vec<f32>) -> Result<(), EngineError> {
        if self.vectors.is_empty() {
            self.dimensions = vector.len();
        } else if vector.len() != self.dimensions {
            return Err(EngineError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        self.vectors.push(vector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f64)>, EngineError> {
        if self.vectors.is_empty() {
            return Err(EngineError::EmptyIndex);
        }
        if query.len() != self.dimensions {
            return Err(EngineError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut hits = self
            .vectors
            .iter()
            .enumerate()
            .map(|(doc_id, stored)| (doc_id, squared_l2(query, stored)))
            .collect::<Vec<(usize, f64)>>();

        // Stable sort: insertion order is the tie-break.
        hits.sort_by(|left, right| left.1.total_cmp(&right.1));
        hits.truncate(k.min(hits.len()));
        Ok(hits)
    }
}

fn squared_l2(left: &[f32], right: &[f32]) -> f64 {
    left.iter()
        .zip(right.iter())
        .map(|(left_value, right_value)| {
            let delta = f64::from(*left_value) - f64::from(*right_value);
            delta * delta
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_vectors() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn build_rejects_mixed_dimensions() {
        let result = SimilarityIndex::build(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]);
        assert_eq!(
            result.err(),
            Some(EngineError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn query_on_empty_index_fails() {
        let index = SimilarityIndex::default();
        assert_eq!(index.query(&[1.0], 1).err(), Some(EngineError::EmptyIndex));
    }

    #[test]
    fn query_rejects_wrong_dimension() {
        let index = SimilarityIndex::build(axis_vectors()).unwrap();
        assert_eq!(
            index.query(&[1.0, 0.0], 1).err(),
            Some(EngineError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn query_orders_by_ascending_distance() {
        let index = SimilarityIndex::build(axis_vectors()).unwrap();
        let hits = index.query(&[0.9, 0.1, 0.0], 3).unwrap();
        assert_eq!(hits[0].0, 0);
        assert!(hits[0].1 <= hits[1].1);
        assert!(hits[1].1 <= hits[2].1);
    }

    #[test]
    fn oversized_k_returns_all_vectors() {
        let index = SimilarityIndex::build(axis_vectors()).unwrap();
        let hits = index.query(&[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn equal_distances_keep_insertion_order() {
        let index = SimilarityIndex::build(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
            vec![0.0, -1.0],
        ])
        .unwrap();

        let hits = index.query(&[0.0, 0.0], 4).unwrap();
        let ids = hits.iter().map(|(doc_id, _)| *doc_id).collect::<Vec<_>>();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
