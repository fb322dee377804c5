//! Embedding BLOB encoding and similarity
//!
//! Stores embeddings as BLOBs and computes cosine similarity in Rust.

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Rank `(id, embedding)` pairs against a query and keep the best `k`.
///
/// Scores are clamped into `0.0..=1.0` so callers can treat them as
/// relevance regardless of the embedding model's sign conventions.
pub fn top_k_by_similarity(
    query: &[f32],
    candidates: Vec<(String, Vec<f32>)>,
    k: usize,
) -> Vec<(String, f32)> {
    let mut scored: Vec<(String, f32)> = candidates
        .into_iter()
        .map(|(id, embedding)| {
            let sim = cosine_similarity(query, &embedding).clamp(0.0, 1.0);
            (id, sim)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_roundtrip() {
        let original = vec![1.0f32, 2.0, 3.0, -1.5];
        let bytes = embedding_to_bytes(&original);
        let restored = bytes_to_embedding(&bytes);
        assert_eq!(original, restored);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!(sim.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_top_k_orders_and_truncates() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            ("far".to_string(), vec![0.0, 1.0]),
            ("near".to_string(), vec![1.0, 0.1]),
            ("exact".to_string(), vec![2.0, 0.0]),
            ("opposite".to_string(), vec![-1.0, 0.0]),
        ];

        let top = top_k_by_similarity(&query, candidates, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "exact");
        assert_eq!(top[1].0, "near");
    }

    #[test]
    fn test_top_k_clamps_negative_scores() {
        let top = top_k_by_similarity(&[1.0], vec![("neg".to_string(), vec![-1.0])], 5);
        assert_eq!(top[0].1, 0.0);
    }
}
