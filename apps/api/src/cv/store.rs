//! Persistence for generated CVs. Records are opaque: the store keeps the last
//! validated document as JSONB and enforces nothing beyond that.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cv::document::CvDocument;
use crate::db::StoreError;
use crate::models::cv::CvRecord;

#[async_trait]
pub trait CvStore: Send + Sync {
    async fn create_cv(
        &self,
        profile_id: Uuid,
        job_description: &str,
        document: &CvDocument,
    ) -> Result<CvRecord, StoreError>;

    async fn get_cv(&self, id: Uuid) -> Result<Option<CvRecord>, StoreError>;

    /// Replaces the stored document. `None` if no record has this id.
    async fn update_cv_document(
        &self,
        id: Uuid,
        document: &CvDocument,
    ) -> Result<Option<CvRecord>, StoreError>;

    /// Returns `false` if no record had this id.
    async fn delete_cv(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All records, newest first.
    async fn list_cvs(&self) -> Result<Vec<CvRecord>, StoreError>;

    /// Records generated from one profile, newest first.
    async fn list_cvs_for_profile(&self, profile_id: Uuid) -> Result<Vec<CvRecord>, StoreError>;
}

pub struct PgCvStore {
    pool: PgPool,
}

impl PgCvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CvStore for PgCvStore {
    async fn create_cv(
        &self,
        profile_id: Uuid,
        job_description: &str,
        document: &CvDocument,
    ) -> Result<CvRecord, StoreError> {
        Ok(sqlx::query_as::<_, CvRecord>(
            r#"
            INSERT INTO cvs (id, profile_id, job_description, document)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(profile_id)
        .bind(job_description)
        .bind(document.to_value())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_cv(&self, id: Uuid) -> Result<Option<CvRecord>, StoreError> {
        Ok(
            sqlx::query_as::<_, CvRecord>("SELECT * FROM cvs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update_cv_document(
        &self,
        id: Uuid,
        document: &CvDocument,
    ) -> Result<Option<CvRecord>, StoreError> {
        Ok(sqlx::query_as::<_, CvRecord>(
            r#"
            UPDATE cvs
            SET document = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(document.to_value())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_cv(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cvs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_cvs(&self) -> Result<Vec<CvRecord>, StoreError> {
        Ok(
            sqlx::query_as::<_, CvRecord>("SELECT * FROM cvs ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn list_cvs_for_profile(&self, profile_id: Uuid) -> Result<Vec<CvRecord>, StoreError> {
        Ok(sqlx::query_as::<_, CvRecord>(
            "SELECT * FROM cvs WHERE profile_id = $1 ORDER BY created_at DESC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[cfg(test)]
pub use memory::MemoryCvStore;
