//! Document joining strategies.
//!
//! A joiner merges the per-query, per-source result lists produced by
//! retrieval into one final document sequence. Strategies are swappable
//! behind the `DocumentJoiner` trait; the orchestrator does not care which
//! one is installed.

use std::collections::{HashMap, HashSet};

use ragweave_core::{Document, DocumentJoiner, QueryResults};
use tracing::debug;

/// Baseline joining strategy: flatten in supplied order and deduplicate by
/// document id, keeping the first occurrence.
///
/// Later duplicates are dropped, not merged or re-scored, so the first
/// occurrence's score and content win. The operation is stable,
/// order-preserving, and idempotent: joining an already-deduplicated set
/// with itself yields the same set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatenationDocumentJoiner;

impl ConcatenationDocumentJoiner {
    /// Create a new concatenation joiner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentJoiner for ConcatenationDocumentJoiner {
    fn join(&self, results: QueryResults) -> Vec<Document> {
        let mut seen = HashSet::new();
        let mut joined = Vec::new();

        for (_query, result_lists) in results {
            for documents in result_lists {
                for document in documents {
                    if seen.insert(document.id.clone()) {
                        joined.push(document);
                    }
                }
            }
        }

        debug!(count = joined.len(), "Joined documents by concatenation");
        joined
    }

    fn name(&self) -> &'static str {
        "ConcatenationDocumentJoiner"
    }
}

/// Default rank constant for reciprocal rank fusion.
pub const DEFAULT_RRF_K: f32 = 60.0;

/// Reciprocal rank fusion: fuse ranked result lists by summing
/// `1 / (k + rank)` per document across lists, then sort by fused score.
///
/// Duplicates are merged (their contributions add up) and the first-seen
/// instance supplies the document content. Ties keep first-seen order.
#[derive(Debug, Clone, Copy)]
pub struct ReciprocalRankFusionJoiner {
    k: f32,
}

impl ReciprocalRankFusionJoiner {
    /// Create a new RRF joiner with the standard `k = 60` constant.
    #[must_use]
    pub fn new() -> Self {
        Self { k: DEFAULT_RRF_K }
    }

    /// Create a new RRF joiner with a custom `k` constant.
    #[must_use]
    pub fn with_k(k: f32) -> Self {
        Self { k }
    }
}

impl Default for ReciprocalRankFusionJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentJoiner for ReciprocalRankFusionJoiner {
    fn join(&self, results: QueryResults) -> Vec<Document> {
        // First-seen order as insertion order, fused score accumulated per id.
        let mut order: Vec<Document> = Vec::new();
        let mut scores: HashMap<String, f32> = HashMap::new();

        for (_query, result_lists) in results {
            for documents in result_lists {
                for (rank, document) in documents.into_iter().enumerate() {
                    let contribution = 1.0 / (self.k + (rank + 1) as f32);
                    match scores.get_mut(&document.id) {
                        Some(score) => *score += contribution,
                        None => {
                            scores.insert(document.id.clone(), contribution);
                            order.push(document);
                        }
                    }
                }
            }
        }

        let mut fused: Vec<Document> = order
            .into_iter()
            .map(|doc| {
                let score = scores[&doc.id];
                doc.with_score(score)
            })
            .collect();

        // Stable sort keeps first-seen order on ties.
        fused.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(count = fused.len(), "Joined documents by reciprocal rank fusion");
        fused
    }

    fn name(&self) -> &'static str {
        "ReciprocalRankFusionJoiner"
    }
}
