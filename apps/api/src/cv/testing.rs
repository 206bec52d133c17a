//! Scripted collaborators shared by pipeline and handler tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::cv::document::CvDocument;
use crate::cv::pipeline::CvPipeline;
use crate::cv::prompt::{StaticTemplateStore, TemplateError, TemplateStore};
use crate::cv::store::CvStore;
use crate::llm_client::prompts::DEFAULT_CV_TEMPLATE;
use crate::llm_client::{CompletionProvider, LlmError};
use crate::models::profile::Profile;
use crate::models::resume::ResumeContent;
use crate::render::{DocumentRenderer, RenderError};

pub const CV_JSON: &str = r#"{
  "fullName": "Ada Lovelace",
  "title": "Senior Backend Engineer",
  "email": "ada@example.com",
  "skills": ["Rust", "PostgreSQL"],
  "experiences": [{
    "jobTitle": "Staff Engineer",
    "companyName": "Analytical Engines Ltd",
    "startDate": "2021-01",
    "endDate": null,
    "currentlyWorking": true,
    "description": "- Designed the billing pipeline"
  }],
  "interests": ["chess"]
}"#;

enum Script {
    Reply(String),
    Fail(u16),
    Hang,
}

/// Completion provider that answers every prompt the same way and records prompts.
pub struct ScriptedProvider {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(script: Script) -> Self {
        Self {
            script,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self::new(Script::Reply(text.into()))
    }

    pub fn fail(status: u16) -> Self {
        Self::new(Script::Fail(status))
    }

    /// Never answers.
    pub fn hang() -> Self {
        Self::new(Script::Hang)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(status) => Err(LlmError::Api {
                status: *status,
                message: "upstream unavailable".to_string(),
            }),
            Script::Hang => std::future::pending().await,
        }
    }
}

pub struct StubRenderer;

impl DocumentRenderer for StubRenderer {
    fn render(&self, _document: &CvDocument) -> Result<Vec<u8>, RenderError> {
        Ok(b"%PDF-1.3 stub".to_vec())
    }
}

pub struct BrokenTemplates;

#[async_trait]
impl TemplateStore for BrokenTemplates {
    async fn load_template(&self) -> Result<String, TemplateError> {
        Err(TemplateError::Empty)
    }
}

pub fn sample_profile() -> Profile {
    Profile {
        id: Uuid::new_v4(),
        profile_name: "Backend roles".to_string(),
        email: "ada@example.com".to_string(),
        content: ResumeContent {
            full_name: Some("Ada Lovelace".to_string()),
            skills: Some(vec!["Rust".to_string(), "PostgreSQL".to_string()]),
            ..Default::default()
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Pipeline over the built-in template and the stub renderer.
pub fn pipeline_with(provider: Arc<ScriptedProvider>, store: Arc<dyn CvStore>) -> CvPipeline {
    CvPipeline::new(
        Arc::new(StaticTemplateStore::new(DEFAULT_CV_TEMPLATE)),
        provider,
        store,
        Arc::new(StubRenderer),
    )
}
