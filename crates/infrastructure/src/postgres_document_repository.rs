//! PostgreSQL-backed document repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use rolegate_application::{DocumentDraft, DocumentRepository};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Document, DocumentId, UserId};

/// PostgreSQL implementation of the document repository port.
#[derive(Clone)]
pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    title: String,
    description: Option<String>,
    content: String,
    uploaded_by: Option<i64>,
    sensitive_data: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Document::new(
            DocumentId::new(row.id),
            row.title,
            row.description,
            row.content,
            row.uploaded_by.map(UserId::new),
            row.sensitive_data,
            row.created_at,
            row.updated_at,
        )
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn insert(&self, draft: &DocumentDraft) -> AppResult<Document> {
        sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (title, description, content, uploaded_by, sensitive_data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, content, uploaded_by, sensitive_data,
                      created_at, updated_at
            "#,
        )
        .bind(draft.title.as_str())
        .bind(draft.description.as_deref())
        .bind(draft.content.as_str())
        .bind(draft.uploaded_by.map(|user_id| user_id.as_i64()))
        .bind(draft.sensitive_data.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to insert document: {error}")))?
        .try_into()
    }

    async fn list(&self) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, title, description, content, uploaded_by, sensitive_data,
                   created_at, updated_at
            FROM documents
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to list documents: {error}")))?
        .into_iter()
        .map(Document::try_from)
        .collect()
    }

    async fn find(&self, document_id: DocumentId) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, title, description, content, uploaded_by, sensitive_data,
                   created_at, updated_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(document_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to find document: {error}")))?
        .map(Document::try_from)
        .transpose()
    }

    async fn update(
        &self,
        document_id: DocumentId,
        draft: &DocumentDraft,
    ) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET title = $2,
                description = $3,
                content = $4,
                sensitive_data = $5,
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, description, content, uploaded_by, sensitive_data,
                      created_at, updated_at
            "#,
        )
        .bind(document_id.as_i64())
        .bind(draft.title.as_str())
        .bind(draft.description.as_deref())
        .bind(draft.content.as_str())
        .bind(draft.sensitive_data.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to update document: {error}")))?
        .map(Document::try_from)
        .transpose()
    }

    async fn delete(&self, document_id: DocumentId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Persistence(format!("failed to delete document: {error}"))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
