use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::resume::ResumeContent;

/// Account keys serialized by `Profile` itself. They never belong in the
/// résumé's extra fields, or the profile would emit them twice.
const RESERVED_KEYS: [&str; 5] = ["id", "profileName", "email", "createdAt", "updatedAt"];

fn without_reserved_keys(mut content: ResumeContent) -> ResumeContent {
    for key in RESERVED_KEYS {
        content.extra.remove(key);
    }
    content
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub profile_name: String,
    pub email: String,
    pub content: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored profile. The résumé fields sit next to the account fields on the wire,
/// the same shape that is handed to the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub profile_name: String,
    pub email: String,
    #[serde(flatten)]
    pub content: ResumeContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = serde_json::Error;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            profile_name: row.profile_name,
            email: row.email,
            content: without_reserved_keys(serde_json::from_value(row.content)?),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub profile_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub content: ResumeContent,
}

impl UpdateProfileRequest {
    /// The résumé part of the update as JSON, holding only the fields present in
    /// the body. Merging it over the stored content with top-level key overwrite
    /// gives the same result as `ResumeContent::merge`.
    pub fn content_patch(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(without_reserved_keys(self.content.clone()))
    }
}

#[cfg(test)]
impl Profile {
    /// In-memory counterpart of the store's atomic update; bumps `updated_at`.
    pub fn apply(&mut self, update: UpdateProfileRequest) {
        if let Some(name) = update.profile_name {
            self.profile_name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        self.content.merge(without_reserved_keys(update.content));
        self.updated_at = Utc::now();
    }
}
