//! Structure Validator — parses an isolated payload and checks it is a CV document.
//!
//! Deliberately permissive: the value must be an object and known fields must have
//! the right JSON type when present. Unknown fields ride along untouched.

use serde_json::Value;
use tracing::warn;

use crate::cv::document::CvDocument;
use crate::cv::error::CvError;
use crate::models::resume::ResumeContent;

/// Parses `payload` as JSON and validates the result.
pub fn validate_payload(payload: &str) -> Result<CvDocument, CvError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| {
        warn!("Rejected CV payload: {e}");
        CvError::MalformedJson {
            detail: e.to_string(),
            payload: payload.to_string(),
        }
    })?;
    validate_value(value)
}

/// Validates an already-parsed value (stored documents, direct edits).
pub fn validate_value(value: Value) -> Result<CvDocument, CvError> {
    let source = match value {
        Value::Object(map) => map,
        other => {
            return Err(CvError::UnexpectedShape(format!(
                "expected a JSON object, found {}",
                kind_of(&other)
            )))
        }
    };

    let content: ResumeContent = serde_json::from_value(Value::Object(source.clone()))
        .map_err(|e| CvError::UnexpectedShape(e.to_string()))?;

    Ok(CvDocument::new(source, content))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
