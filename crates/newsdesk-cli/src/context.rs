use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use newsdesk_ai::{ModelCell, OnnxClassifier};
use newsdesk_artifact::{ArtifactLocator, ArtifactResolver};
use newsdesk_pipeline::Pipeline;
use newsdesk_store::{InteractionStore, redact};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::Settings;

/// Shared state for one process: settings plus the lazily loaded model.
pub struct AppContext {
    pub settings: Settings,
    artifacts: OnceCell<(PathBuf, PathBuf)>,
    classifier: ModelCell<OnnxClassifier>,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            artifacts: OnceCell::new(),
            classifier: ModelCell::new(),
        }
    }

    /// Make sure the model and tokenizer exist locally, downloading them if
    /// a source is configured. Concurrent callers share a single resolution;
    /// a failure is not cached.
    pub async fn resolve_artifacts(&self) -> anyhow::Result<(PathBuf, PathBuf)> {
        let paths = self
            .artifacts
            .get_or_try_init(|| self.fetch_artifacts())
            .await?;
        Ok(paths.clone())
    }

    async fn fetch_artifacts(&self) -> anyhow::Result<(PathBuf, PathBuf)> {
        let resolver = ArtifactResolver::new(self.settings.fetch_timeout());
        let model = resolve_one(
            &resolver,
            "model",
            self.settings.model_source.as_ref(),
            &self.settings.model_path,
        )
        .await?;
        let tokenizer = resolve_one(
            &resolver,
            "tokenizer",
            self.settings.tokenizer_source.as_ref(),
            &self.settings.tokenizer_path,
        )
        .await?;
        Ok((model, tokenizer))
    }

    /// The classifier, loaded on first use and shared afterwards.
    pub async fn classifier(&self) -> anyhow::Result<Arc<OnnxClassifier>> {
        if let Some(clf) = self.classifier.get() {
            return Ok(clf);
        }
        let (model, tokenizer) = self.resolve_artifacts().await?;
        let clf = self
            .classifier
            .get_or_load(move || OnnxClassifier::load(&model, &tokenizer))
            .await
            .context("load classifier")?;
        Ok(clf)
    }

    pub async fn store(&self) -> anyhow::Result<Arc<dyn InteractionStore>> {
        let url = &self.settings.database_url;
        debug!(url = %redact(url), "opening interaction store");
        newsdesk_store::connect(url, &self.settings.store_options())
            .await
            .with_context(|| format!("open store {}", redact(url)))
    }

    /// Classifier and store wired together. Schema bootstrap failures are
    /// logged and left to the first append to retry.
    pub async fn pipeline(&self) -> anyhow::Result<Pipeline> {
        let classifier = self.classifier().await?;
        let pipeline = Pipeline::new(classifier, self.store().await?);
        if let Err(err) = pipeline.bootstrap_store().await {
            warn!(error = %err, "interaction table not ready; interactions may not be recorded");
        }
        Ok(pipeline)
    }
}

async fn resolve_one(
    resolver: &ArtifactResolver,
    what: &str,
    source: Option<&ArtifactLocator>,
    local: &Path,
) -> anyhow::Result<PathBuf> {
    match source {
        Some(locator) => resolver
            .resolve(locator, local)
            .await
            .with_context(|| format!("{what} artifact unavailable")),
        None if local.exists() => Ok(local.to_path_buf()),
        None => bail!(
            "{what} artifact unavailable: {} does not exist and no source is configured",
            local.display()
        ),
    }
}
