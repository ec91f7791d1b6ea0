//! The retrieval-augmentation orchestrator.
//!
//! `RetrievalPipeline` wires transformers, an optional expander, a
//! retriever, a joiner, and an augmenter into one deterministic pipeline,
//! executed once per advised request. The step order is fixed and cannot
//! be reordered by configuration.

use std::sync::Arc;

use ragweave_core::{
    Document, DocumentJoiner, DocumentRetriever, Query, QueryAugmenter, QueryExpander,
    QueryResults, QueryTransformer, RagweaveError, Result,
};
use tracing::debug;

use crate::augmenter::ContextualQueryAugmenter;
use crate::joiners::ConcatenationDocumentJoiner;

/// The result of one pipeline run: the final outgoing query plus the
/// joined document list that was folded into it.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    /// The augmented query, ready to be sent to the model.
    pub query: Query,

    /// The joined documents the augmentation was based on.
    pub documents: Vec<Document>,
}

/// A composed retrieval-augmentation pipeline.
///
/// Execution order, fixed by contract:
///
/// 1. Run the transformer chain left-to-right (zero transformers is
///    identity).
/// 2. Expand into N queries, or treat the transformed query as a
///    one-element sequence.
/// 3. Retrieve documents for every query, in order, independently.
/// 4. Join all result sets once.
/// 5. Augment the **original** (pre-transformation) query with the joined
///    documents.
///
/// Given identical inputs and deterministic components, two runs produce
/// identical outcomes.
///
/// # Examples
///
/// ```rust,no_run
/// use ragweave_query::pipeline::RetrievalPipeline;
/// use std::sync::Arc;
///
/// # async fn example(retriever: Arc<dyn ragweave_core::DocumentRetriever>)
/// # -> ragweave_core::Result<()> {
/// let pipeline = RetrievalPipeline::builder()
///     .document_retriever(retriever)
///     .build()?;
///
/// let outcome = pipeline.process(ragweave_core::Query::new("What is Rust?")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RetrievalPipeline {
    transformers: Vec<Arc<dyn QueryTransformer>>,
    expander: Option<Arc<dyn QueryExpander>>,
    retriever: Arc<dyn DocumentRetriever>,
    joiner: Arc<dyn DocumentJoiner>,
    augmenter: Arc<dyn QueryAugmenter>,
}

impl RetrievalPipeline {
    /// Create a builder for constructing pipelines.
    #[must_use]
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// Execute the pipeline for one query.
    ///
    /// # Errors
    ///
    /// Propagates transformation and retrieval errors unchanged; neither is
    /// ever downgraded to an empty result.
    pub async fn process(&self, query: Query) -> Result<RetrievalOutcome> {
        let original = query.clone();

        // 1. Transformer chain, left to right.
        let mut transformed = query;
        for transformer in &self.transformers {
            debug!(transformer = transformer.name(), "Applying query transformer");
            transformed = transformer.transform(transformed).await?;
        }

        // 2. Expansion (or a one-element sequence).
        let queries = match &self.expander {
            Some(expander) => {
                let expanded = expander.expand(transformed).await?;
                debug!(expander = expander.name(), count = expanded.len(), "Expanded query");
                expanded
            }
            None => vec![transformed],
        };

        // 3. Retrieve per query, in order.
        let mut results: QueryResults = Vec::with_capacity(queries.len());
        for query in queries {
            let documents = self.retriever.retrieve(&query).await?;
            results.push((query, vec![documents]));
        }

        // 4. Join once over the whole result map.
        let documents = self.joiner.join(results);
        debug!(count = documents.len(), "Joined retrieval results");

        // 5. Augment the original, pre-transformation query.
        let augmented = self.augmenter.augment(original, &documents);

        Ok(RetrievalOutcome {
            query: augmented,
            documents,
        })
    }
}

/// Builder for [`RetrievalPipeline`], validated eagerly at
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RetrievalPipelineBuilder {
    transformers: Vec<Arc<dyn QueryTransformer>>,
    expander: Option<Arc<dyn QueryExpander>>,
    retriever: Option<Arc<dyn DocumentRetriever>>,
    joiner: Option<Arc<dyn DocumentJoiner>>,
    augmenter: Option<Arc<dyn QueryAugmenter>>,
}

impl RetrievalPipelineBuilder {
    /// Append a query transformer to the chain.
    #[must_use]
    pub fn query_transformer(mut self, transformer: Arc<dyn QueryTransformer>) -> Self {
        self.transformers.push(transformer);
        self
    }

    /// Set the ordered transformer chain at once.
    #[must_use]
    pub fn query_transformers(mut self, transformers: Vec<Arc<dyn QueryTransformer>>) -> Self {
        self.transformers = transformers;
        self
    }

    /// Set the query expander.
    #[must_use]
    pub fn query_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Set the document retriever (required).
    #[must_use]
    pub fn document_retriever(mut self, retriever: Arc<dyn DocumentRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the document joiner. Defaults to concatenation with first-wins
    /// deduplication.
    #[must_use]
    pub fn document_joiner(mut self, joiner: Arc<dyn DocumentJoiner>) -> Self {
        self.joiner = Some(joiner);
        self
    }

    /// Set the query augmenter. Defaults to the contextual augmenter with
    /// empty context not allowed.
    #[must_use]
    pub fn query_augmenter(mut self, augmenter: Arc<dyn QueryAugmenter>) -> Self {
        self.augmenter = Some(augmenter);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no document retriever was supplied.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let retriever = self.retriever.ok_or_else(|| {
            RagweaveError::configuration("retrieval pipeline requires a document retriever")
        })?;

        Ok(RetrievalPipeline {
            transformers: self.transformers,
            expander: self.expander,
            retriever,
            joiner: self
                .joiner
                .unwrap_or_else(|| Arc::new(ConcatenationDocumentJoiner::new())),
            augmenter: self
                .augmenter
                .unwrap_or_else(|| Arc::new(ContextualQueryAugmenter::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct StaticRetriever(Vec<Document>);

    #[async_trait]
    impl DocumentRetriever for StaticRetriever {
        async fn retrieve(&self, _query: &Query) -> Result<Vec<Document>> {
            Ok(self.0.clone())
        }
    }

    /// Retriever that records the query texts it was asked for.
    #[derive(Debug, Default)]
    struct RecordingRetriever {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DocumentRetriever for RecordingRetriever {
        async fn retrieve(&self, query: &Query) -> Result<Vec<Document>> {
            self.queries.lock().unwrap().push(query.text.clone());
            Ok(vec![Document::with_id(query.text.clone(), "doc text")])
        }
    }

    #[derive(Debug)]
    struct SuffixTransformer(&'static str);

    #[async_trait]
    impl QueryTransformer for SuffixTransformer {
        async fn transform(&self, query: Query) -> Result<Query> {
            let text = format!("{}{}", query.text, self.0);
            Ok(query.with_text(text))
        }
    }

    #[derive(Debug)]
    struct FailingTransformer;

    #[async_trait]
    impl QueryTransformer for FailingTransformer {
        async fn transform(&self, _query: Query) -> Result<Query> {
            Err(RagweaveError::transformation("cannot transform"))
        }
    }

    #[derive(Debug)]
    struct DuplicatingExpander;

    #[async_trait]
    impl QueryExpander for DuplicatingExpander {
        async fn expand(&self, query: Query) -> Result<Vec<Query>> {
            let alt = query.with_text(format!("{} (alt)", query.text));
            Ok(vec![query, alt])
        }
    }

    #[test]
    fn test_build_requires_retriever() {
        let err = RetrievalPipeline::builder().build().unwrap_err();
        assert!(matches!(err, RagweaveError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_transformers_run_left_to_right() {
        let retriever = Arc::new(RecordingRetriever::default());
        let pipeline = RetrievalPipeline::builder()
            .query_transformer(Arc::new(SuffixTransformer(" a")))
            .query_transformer(Arc::new(SuffixTransformer(" b")))
            .document_retriever(retriever.clone())
            .build()
            .unwrap();

        pipeline.process(Query::new("q")).await.unwrap();

        assert_eq!(*retriever.queries.lock().unwrap(), vec!["q a b"]);
    }

    #[tokio::test]
    async fn test_augments_original_query_text() {
        let pipeline = RetrievalPipeline::builder()
            .query_transformer(Arc::new(SuffixTransformer(" transformed")))
            .document_retriever(Arc::new(StaticRetriever(vec![Document::with_id(
                "d1", "ctx",
            )])))
            .build()
            .unwrap();

        let outcome = pipeline.process(Query::new("original question")).await.unwrap();

        // The augmented text embeds the original query, not the transformed one.
        assert!(outcome.query.text.contains("original question"));
        assert!(!outcome.query.text.contains("original question transformed"));
    }

    #[tokio::test]
    async fn test_expansion_retrieves_per_query_and_joins() {
        let retriever = Arc::new(RecordingRetriever::default());
        let pipeline = RetrievalPipeline::builder()
            .query_expander(Arc::new(DuplicatingExpander))
            .document_retriever(retriever.clone())
            .build()
            .unwrap();

        let outcome = pipeline.process(Query::new("q")).await.unwrap();

        assert_eq!(*retriever.queries.lock().unwrap(), vec!["q", "q (alt)"]);
        assert_eq!(outcome.documents.len(), 2);
    }

    #[tokio::test]
    async fn test_transformation_error_aborts_before_retrieval() {
        let retriever = Arc::new(RecordingRetriever::default());
        let pipeline = RetrievalPipeline::builder()
            .query_transformer(Arc::new(FailingTransformer))
            .document_retriever(retriever.clone())
            .build()
            .unwrap();

        let err = pipeline.process(Query::new("q")).await.unwrap_err();
        assert!(matches!(err, RagweaveError::Transformation { .. }));
        assert!(retriever.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deterministic_given_deterministic_components() {
        let make = || {
            RetrievalPipeline::builder()
                .query_transformer(Arc::new(SuffixTransformer(" t")))
                .query_expander(Arc::new(DuplicatingExpander))
                .document_retriever(Arc::new(StaticRetriever(vec![
                    Document::with_id("d1", "one").with_score(0.9),
                    Document::with_id("d2", "two").with_score(0.8),
                ])))
                .build()
                .unwrap()
        };

        let first = make().process(Query::new("q")).await.unwrap();
        let second = make().process(Query::new("q")).await.unwrap();

        assert_eq!(first.query, second.query);
        assert_eq!(first.documents, second.documents);
    }
}
