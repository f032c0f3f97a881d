//! Classify an article and record the interaction.
//!
//! Inference failures fail the request. Storage failures do not: the label
//! is returned regardless and the failure is reported in [`StoreOutcome`].

use std::sync::Arc;

use chrono::NaiveDateTime;
use newsdesk_ai::{ClassifierError, TextClassifier};
use newsdesk_core::{
    ArticleText, InteractionRecord, Label, NewInteraction, UserName, ValidationError,
};
use newsdesk_store::{InteractionStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

/// A request that produced no label.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(ClassifierError),
}

impl From<ClassifierError> for ClassifyError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::EmptyInput => Self::Validation(ValidationError::NoContentTokens),
            other => Self::Inference(other),
        }
    }
}

/// Whether the interaction made it into the store.
#[derive(Debug)]
pub enum StoreOutcome {
    Stored(i64),
    Failed(StoreError),
}

impl StoreOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Stored(id) => Some(*id),
            Self::Failed(_) => None,
        }
    }
}

/// Result of a successful classification.
#[derive(Debug)]
pub struct Classified {
    pub label: Label,
    pub outcome: StoreOutcome,
}

/// Classifier plus interaction log, both supplied by the caller.
pub struct Pipeline {
    classifier: Arc<dyn TextClassifier>,
    store: Arc<dyn InteractionStore>,
}

impl Pipeline {
    pub fn new(classifier: Arc<dyn TextClassifier>, store: Arc<dyn InteractionStore>) -> Self {
        Self { classifier, store }
    }

    /// Create the interaction table ahead of the first request.
    ///
    /// Failure here is not fatal; the store retries on the next append.
    pub async fn bootstrap_store(&self) -> Result<(), StoreError> {
        self.store.ensure_schema().await
    }

    /// Validate, classify, then append `(name, now, text, label)`.
    pub async fn classify(
        &self,
        name: &str,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<Classified, ClassifyError> {
        let name = UserName::parse(name)?;
        let text = ArticleText::parse(text)?;

        let classifier = Arc::clone(&self.classifier);
        let input = text.as_str().to_owned();
        let label = tokio::task::spawn_blocking(move || classifier.predict(&input))
            .await
            .map_err(|e| ClassifierError::Inference(format!("inference task failed: {e}")))??;

        let record = NewInteraction::classified(name.as_str(), now, text.into_inner(), label);
        let outcome = match self.store.append(&record).await {
            Ok(id) => {
                info!(id, %label, "recorded interaction");
                StoreOutcome::Stored(id)
            }
            Err(err) => {
                warn!(error = %err, %label, "interaction not recorded");
                StoreOutcome::Failed(err)
            }
        };

        Ok(Classified { label, outcome })
    }

    /// Most recent interactions, newest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<InteractionRecord>, StoreError> {
        self.store.recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use newsdesk_store::DuckStore;

    struct FixedClassifier {
        result: fn() -> Result<Label, ClassifierError>,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(result: fn() -> Result<Label, ClassifierError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextClassifier for FixedClassifier {
        fn predict(&self, _text: &str) -> Result<Label, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl InteractionStore for UnreachableStore {
        async fn ensure_schema(&self) -> Result<(), StoreError> {
            Err(StoreError::Other("connection refused".into()))
        }
        async fn append(&self, _record: &NewInteraction) -> Result<i64, StoreError> {
            Err(StoreError::Other("connection refused".into()))
        }
        async fn recent(&self, _limit: usize) -> Result<Vec<InteractionRecord>, StoreError> {
            Err(StoreError::Other("connection refused".into()))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 20)
            .unwrap()
            .and_hms_opt(16, 45, 30)
            .unwrap()
    }

    #[tokio::test]
    async fn classifies_and_records() {
        let clf = FixedClassifier::new(|| Ok(Label::Business));
        let store = Arc::new(DuckStore::open().unwrap());
        let pipeline = Pipeline::new(clf.clone(), store.clone());

        let text = "The stock market rallied today amid tech earnings.";
        let result = pipeline.classify("ada", text, now()).await.unwrap();
        assert_eq!(result.label, Label::Business);
        assert!(result.outcome.is_stored());

        let rows = pipeline.history(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(Some(rows[0].id), result.outcome.id());
        assert_eq!(rows[0].name.as_deref(), Some("ada"));
        assert_eq!(rows[0].input_text.as_deref(), Some(text));
        assert_eq!(rows[0].predicted_category.as_deref(), Some("Business"));
        assert_eq!(rows[0].interaction_time, Some(now()));
        assert_eq!(clf.calls(), 1);
    }

    #[tokio::test]
    async fn blank_text_skips_inference_and_storage() {
        let clf = FixedClassifier::new(|| Ok(Label::World));
        let store = Arc::new(DuckStore::open().unwrap());
        let pipeline = Pipeline::new(clf.clone(), store.clone());

        let err = pipeline.classify("ada", "   ", now()).await.unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Validation(ValidationError::BlankText)
        ));
        assert_eq!(clf.calls(), 0);
        store.ensure_schema().await.unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let clf = FixedClassifier::new(|| Ok(Label::World));
        let pipeline = Pipeline::new(clf.clone(), Arc::new(UnreachableStore));

        let err = pipeline.classify(" ", "Elections held", now()).await.unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Validation(ValidationError::BlankName)
        ));
        assert_eq!(clf.calls(), 0);
    }

    #[tokio::test]
    async fn unreachable_store_fails_open() {
        let clf = FixedClassifier::new(|| Ok(Label::Sports));
        let pipeline = Pipeline::new(clf, Arc::new(UnreachableStore));

        assert!(pipeline.bootstrap_store().await.is_err());
        let result = pipeline
            .classify("ada", "Late goal seals the title", now())
            .await
            .unwrap();
        assert_eq!(result.label, Label::Sports);
        assert!(matches!(result.outcome, StoreOutcome::Failed(_)));
        assert_eq!(result.outcome.id(), None);
    }

    #[tokio::test]
    async fn inference_failure_records_nothing() {
        let clf = FixedClassifier::new(|| Err(ClassifierError::Inference("bad unicode".into())));
        let store = Arc::new(DuckStore::open().unwrap());
        let pipeline = Pipeline::new(clf, store.clone());

        let err = pipeline.classify("ada", "text", now()).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Inference(_)));
        store.ensure_schema().await.unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn textless_encoding_is_a_validation_error() {
        let clf = FixedClassifier::new(|| Err(ClassifierError::EmptyInput));
        let pipeline = Pipeline::new(clf, Arc::new(DuckStore::open().unwrap()));

        let err = pipeline.classify("ada", "\u{200b}", now()).await.unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Validation(ValidationError::NoContentTokens)
        ));
    }

    #[tokio::test]
    async fn repeated_requests_append_in_order() {
        let clf = FixedClassifier::new(|| Ok(Label::SciTech));
        let pipeline = Pipeline::new(clf.clone(), Arc::new(DuckStore::open().unwrap()));

        for text in ["first chip", "second chip", "third chip"] {
            let result = pipeline.classify("ada", text, now()).await.unwrap();
            assert_eq!(result.label, Label::SciTech);
        }
        let rows = pipeline.history(2).await.unwrap();
        let texts: Vec<_> = rows.iter().filter_map(|r| r.input_text.as_deref()).collect();
        assert_eq!(texts, ["third chip", "second chip"]);
        assert_eq!(clf.calls(), 3);
    }
}
