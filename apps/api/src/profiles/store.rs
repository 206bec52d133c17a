//! Persistence for profiles. The résumé fields live in one JSONB column.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::profile::{CreateProfileRequest, Profile, ProfileRow, UpdateProfileRequest};
use crate::models::resume::ResumeContent;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// All profiles, newest first.
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn create_profile(&self, request: &CreateProfileRequest) -> Result<Profile, StoreError>;

    /// Applies a partial update in one step, so concurrent updates to the same
    /// profile each keep their fields. `None` if it does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<Profile>, StoreError>;

    async fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode(row: ProfileRow) -> Result<Profile, StoreError> {
    Ok(Profile::try_from(row)?)
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(decode)
            .transpose()
    }

    async fn create_profile(&self, request: &CreateProfileRequest) -> Result<Profile, StoreError> {
        let content = serde_json::to_value(ResumeContent::default())?;
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, profile_name, email, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.profile_name)
        .bind(&request.email)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        decode(row)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<Profile>, StoreError> {
        let patch = update.content_patch()?;
        sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET profile_name = COALESCE($2, profile_name),
                email = COALESCE($3, email),
                content = content || $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.profile_name.as_deref())
        .bind(update.email.as_deref())
        .bind(patch)
        .fetch_optional(&self.pool)
        .await?
        .map(decode)
        .transpose()
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub use memory::MemoryProfileStore;
