use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::resume::ResumeContent;

/// A validated CV document.
///
/// Holds the accepted JSON object verbatim (what gets persisted and serialized)
/// alongside its typed view (what gets rendered). Only the validator builds one,
/// so the two always describe the same document.
#[derive(Debug, Clone, PartialEq)]
pub struct CvDocument {
    source: Map<String, Value>,
    content: ResumeContent,
}

impl CvDocument {
    pub(crate) fn new(source: Map<String, Value>, content: ResumeContent) -> Self {
        Self { source, content }
    }

    pub fn content(&self) -> &ResumeContent {
        &self.content
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.source.clone())
    }

    /// Display title for the rendered file.
    pub fn display_name(&self) -> &str {
        self.content
            .full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Curriculum Vitae")
    }
}

impl Serialize for CvDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.source.serialize(serializer)
    }
}
