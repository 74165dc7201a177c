//! Classification-to-catalog resolution.
//!
//! Image in, label out, catalog record out. One recognition attempt per
//! image; recognition failure is an outcome, not an error, while catalog
//! I/O failures propagate to the caller.

use std::sync::Arc;

use crate::catalog::{CatalogItem, CatalogStore};
use crate::error::Result;
use crate::matcher::MatchStrategy;
use crate::recognizer::Recognizer;

/// What a photo resolved to. Consumed once by the chat adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Recognizer returned a label and the catalog knows it.
    Identified(CatalogItem),
    /// Recognizer returned a label the catalog does not carry.
    UnknownLabel(String),
    /// Recognizer produced no label at all.
    RecognitionFailed,
}

pub struct Resolver {
    recognizer: Arc<dyn Recognizer>,
    catalog: CatalogStore,
    strategy: Box<dyn MatchStrategy>,
}

impl Resolver {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        catalog: CatalogStore,
        strategy: Box<dyn MatchStrategy>,
    ) -> Self {
        Self {
            recognizer,
            catalog,
            strategy,
        }
    }

    /// Classify the image and resolve the label against the catalog.
    ///
    /// No retry and no alternate-label fallback: the recognition call is
    /// expensive and reply latency matters more than recall.
    pub async fn resolve(&self, image: &[u8], mime_type: &str) -> Result<ResolutionOutcome> {
        let Some(raw_label) = self.recognizer.classify(image, mime_type).await else {
            return Ok(ResolutionOutcome::RecognitionFailed);
        };

        let label = self.strategy.normalize(&raw_label);

        match self.catalog.lookup(&label).await? {
            Some(item) => Ok(ResolutionOutcome::Identified(item)),
            None => Ok(ResolutionOutcome::UnknownLabel(label)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{init_schema, CatalogStore};
    use crate::config::UpdatePolicy;
    use crate::matcher::ExactMatch;
    use async_trait::async_trait;
    use sqlx::SqlitePool;

    /// Recognizer stub returning a fixed answer.
    struct FixedRecognizer(Option<String>);

    #[async_trait]
    impl Recognizer for FixedRecognizer {
        async fn classify(&self, _image: &[u8], _mime_type: &str) -> Option<String> {
            self.0.clone()
        }
    }

    async fn seeded_resolver(answer: Option<&str>) -> Resolver {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory pool failed");
        init_schema(&pool).await.expect("schema init failed");

        let catalog = CatalogStore::new(pool, UpdatePolicy::Permissive);
        catalog
            .insert_if_absent(
                "chuối",
                "25.000đ/kg",
                "Chuối chín vàng, vị ngọt tự nhiên.",
            )
            .await
            .expect("seed failed");

        Resolver::new(
            Arc::new(FixedRecognizer(answer.map(str::to_string))),
            catalog,
            Box::new(ExactMatch),
        )
    }

    #[tokio::test]
    async fn test_known_label_resolves_to_identified() {
        let resolver = seeded_resolver(Some("chuối")).await;

        let outcome = resolver.resolve(b"jpeg", "image/jpeg").await.unwrap();
        match outcome {
            ResolutionOutcome::Identified(item) => {
                assert_eq!(item.name, "chuối");
                assert_eq!(item.price, "25.000đ/kg");
            }
            other => panic!("expected Identified, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_label_case_is_normalized_before_lookup() {
        let resolver = seeded_resolver(Some("  CHUỐI ")).await;

        let outcome = resolver.resolve(b"jpeg", "image/jpeg").await.unwrap();
        assert!(matches!(outcome, ResolutionOutcome::Identified(_)));
    }

    #[tokio::test]
    async fn test_unknown_label_resolves_to_unknown() {
        let resolver = seeded_resolver(Some("kiwi")).await;

        let outcome = resolver.resolve(b"jpeg", "image/jpeg").await.unwrap();
        assert_eq!(outcome, ResolutionOutcome::UnknownLabel("kiwi".to_string()));
    }

    #[tokio::test]
    async fn test_recognition_absence_resolves_to_failed() {
        let resolver = seeded_resolver(None).await;

        let outcome = resolver.resolve(b"jpeg", "image/jpeg").await.unwrap();
        assert_eq!(outcome, ResolutionOutcome::RecognitionFailed);
    }

    #[tokio::test]
    async fn test_recognition_absence_skips_the_catalog() {
        // With the pool closed any catalog access would error, so an Ok
        // outcome proves the lookup was never attempted.
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory pool failed");
        init_schema(&pool).await.expect("schema init failed");
        let catalog = CatalogStore::new(pool.clone(), UpdatePolicy::Permissive);
        pool.close().await;

        let resolver = Resolver::new(
            Arc::new(FixedRecognizer(None)),
            catalog,
            Box::new(ExactMatch),
        );

        let outcome = resolver.resolve(b"jpeg", "image/jpeg").await.unwrap();
        assert_eq!(outcome, ResolutionOutcome::RecognitionFailed);
    }
}
