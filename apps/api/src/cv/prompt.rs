//! Prompt Builder — fills the CV template with a job description and a serialized profile.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::cv::error::CvError;

pub const JOB_DESCRIPTION_MARKER: &str = "{{jobDescription}}";
pub const PROFILE_MARKER: &str = "{{userProfile}}";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot read template {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template is empty")]
    Empty,
}

/// Source of the CV prompt template.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn load_template(&self) -> Result<String, TemplateError>;
}

/// Reads the template from disk on every call, so edits apply without a restart.
pub struct FileTemplateStore {
    path: PathBuf,
}

impl FileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn load_template(&self) -> Result<String, TemplateError> {
        let template = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| TemplateError::Unreadable {
                path: self.path.clone(),
                source,
            })?;
        non_empty(template)
    }
}

/// A template held in memory (the built-in default, or a test fixture).
pub struct StaticTemplateStore {
    template: String,
}

impl StaticTemplateStore {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

#[async_trait]
impl TemplateStore for StaticTemplateStore {
    async fn load_template(&self) -> Result<String, TemplateError> {
        non_empty(self.template.clone())
    }
}

fn non_empty(template: String) -> Result<String, TemplateError> {
    if template.trim().is_empty() {
        Err(TemplateError::Empty)
    } else {
        Ok(template)
    }
}

/// Substitutes the first occurrence of each marker. No escaping is applied.
pub fn fill_template(template: &str, job_description: &str, profile_json: &str) -> String {
    template
        .replacen(JOB_DESCRIPTION_MARKER, job_description, 1)
        .replacen(PROFILE_MARKER, profile_json, 1)
}

/// Loads the template and builds the prompt for one generation request.
pub async fn build_prompt(
    templates: &dyn TemplateStore,
    job_description: &str,
    profile_json: &str,
) -> Result<String, CvError> {
    let template = templates
        .load_template()
        .await
        .map_err(|e| CvError::TemplateUnavailable(e.to_string()))?;
    Ok(fill_template(&template, job_description, profile_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fill_template_substitutes_both_markers() {
        let prompt = fill_template(
            "JD: {{jobDescription}}\nProfile: {{userProfile}}",
            "Rust engineer",
            r#"{"fullName":"Ada"}"#,
        );
        assert_eq!(prompt, "JD: Rust engineer\nProfile: {\"fullName\":\"Ada\"}");
    }

    #[test]
    fn test_fill_template_replaces_first_occurrence_only() {
        let prompt = fill_template("{{jobDescription}} / {{jobDescription}}", "X", "{}");
        assert_eq!(prompt, "X / {{jobDescription}}");
    }

    #[test]
    fn test_fill_template_does_not_escape() {
        let prompt = fill_template("{{userProfile}}", "", "\"quoted\" {braces}");
        assert_eq!(prompt, "\"quoted\" {braces}");
    }

    #[tokio::test]
    async fn test_build_prompt_with_static_store() {
        let store = StaticTemplateStore::new("{{jobDescription}}|{{userProfile}}");
        let prompt = build_prompt(&store, "JD", "{}").await.unwrap();
        assert_eq!(prompt, "JD|{}");
    }

    #[tokio::test]
    async fn test_empty_template_is_unavailable() {
        let store = StaticTemplateStore::new("   \n");
        let err = build_prompt(&store, "JD", "{}").await.unwrap_err();
        assert!(matches!(err, CvError::TemplateUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_template_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTemplateStore::new(dir.path().join("prompt.md"));
        let err = build_prompt(&store, "JD", "{}").await.unwrap_err();
        match err {
            CvError::TemplateUnavailable(msg) => assert!(msg.contains("prompt.md")),
            other => panic!("expected TemplateUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_template_store_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Job: {{{{jobDescription}}}}").unwrap();
        let store = FileTemplateStore::new(file.path());
        let prompt = build_prompt(&store, "Platform engineer", "{}").await.unwrap();
        assert_eq!(prompt, "Job: Platform engineer");
    }
}
