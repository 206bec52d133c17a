//! CV generation pipeline.
//!
//! Flow: build_prompt → complete (bounded by the completion timeout) →
//!       isolate payload → validate → persist → render.
//!
//! Stages run strictly in order and the first failure ends the request. Nothing
//! is persisted unless validation succeeded, and the pipeline never retries.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cv::error::CvError;
use crate::cv::normalizer::NormalizeStrategy;
use crate::cv::prompt::{build_prompt, TemplateStore};
use crate::cv::store::CvStore;
use crate::cv::validator::{validate_payload, validate_value};
use crate::db::StoreError;
use crate::llm_client::CompletionProvider;
use crate::models::cv::CvRecord;
use crate::models::profile::Profile;
use crate::render::{render_blocking, DocumentRenderer};

pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

/// The profile as it is embedded in the prompt. A failure here is a stored
/// record that cannot be encoded, not a template problem.
fn profile_payload(profile: &Profile) -> Result<String, CvError> {
    Ok(serde_json::to_string(profile).map_err(StoreError::from)?)
}

/// A persisted CV together with its freshly rendered file.
#[derive(Debug, Clone)]
pub struct GeneratedCv {
    pub record: CvRecord,
    pub pdf: Bytes,
}

#[derive(Clone)]
pub struct CvPipeline {
    templates: Arc<dyn TemplateStore>,
    completions: Arc<dyn CompletionProvider>,
    store: Arc<dyn CvStore>,
    renderer: Arc<dyn DocumentRenderer>,
    strategy: NormalizeStrategy,
    completion_timeout: Duration,
}

impl CvPipeline {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        completions: Arc<dyn CompletionProvider>,
        store: Arc<dyn CvStore>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            templates,
            completions,
            store,
            renderer,
            strategy: NormalizeStrategy::default(),
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    pub fn with_strategy(mut self, strategy: NormalizeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    /// Generates a CV tailored to `job_description`, persists it and renders it.
    pub async fn generate(
        &self,
        profile: &Profile,
        job_description: &str,
    ) -> Result<GeneratedCv, CvError> {
        let profile_json = profile_payload(profile)?;

        let prompt = build_prompt(self.templates.as_ref(), job_description, &profile_json).await?;
        info!(
            "Built CV prompt for profile {} ({} chars)",
            profile.id,
            prompt.len()
        );

        let raw = self.complete(&prompt).await?;
        info!("Completion received ({} chars)", raw.len());

        let payload = self.strategy.isolate(&raw)?;
        let document = validate_payload(&payload)?;

        let record = self
            .store
            .create_cv(profile.id, job_description, &document)
            .await?;
        info!("Persisted CV {} for profile {}", record.id, profile.id);

        let pdf = render_blocking(self.renderer.clone(), document).await?;
        info!("Rendered CV {} ({} bytes)", record.id, pdf.len());

        Ok(GeneratedCv { record, pdf })
    }

    /// Re-renders a stored CV from its persisted document.
    pub async fn render_record(&self, id: Uuid) -> Result<GeneratedCv, CvError> {
        let record = self
            .store
            .get_cv(id)
            .await?
            .ok_or(CvError::CvNotFound(id))?;

        let document = validate_value(record.document.clone())?;
        let pdf = render_blocking(self.renderer.clone(), document).await?;
        info!("Re-rendered CV {} ({} bytes)", record.id, pdf.len());

        Ok(GeneratedCv { record, pdf })
    }

    /// Replaces a stored document with hand-edited text. The text goes through the
    /// same isolation and validation as a completion, so a pasted reply works too.
    pub async fn update_document(&self, id: Uuid, text: &str) -> Result<CvRecord, CvError> {
        let payload = self.strategy.isolate(text)?;
        let document = validate_payload(&payload)?;

        let record = self
            .store
            .update_cv_document(id, &document)
            .await?
            .ok_or(CvError::CvNotFound(id))?;
        info!("Updated document of CV {}", record.id);
        Ok(record)
    }

    async fn complete(&self, prompt: &str) -> Result<String, CvError> {
        let completion =
            tokio::time::timeout(self.completion_timeout, self.completions.complete(prompt))
                .await
                .map_err(|_| {
                    warn!(
                        "Completion timed out after {}s",
                        self.completion_timeout.as_secs()
                    );
                    CvError::CompletionFailed(format!(
                        "no completion within {}s",
                        self.completion_timeout.as_secs()
                    ))
                })?
                .map_err(|e| {
                    warn!("Completion provider failed: {e}");
                    CvError::CompletionFailed(e.to_string())
                })?;

        if completion.trim().is_empty() {
            return Err(CvError::CompletionFailed(
                "completion was empty".to_string(),
            ));
        }
        Ok(completion)
    }
}
