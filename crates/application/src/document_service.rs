use std::sync::Arc;

use async_trait::async_trait;
use rolegate_core::{AppError, AppResult, NonEmptyString};
use rolegate_domain::{Document, DocumentId, UserId};
use tracing::info;

/// Validated document fields written by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    /// Title.
    pub title: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Body.
    pub content: NonEmptyString,
    /// Uploading user.
    pub uploaded_by: Option<UserId>,
    /// Optional sensitive payload.
    pub sensitive_data: Option<String>,
}

/// Repository port for documents. Adapters own the timestamps.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts a document.
    async fn insert(&self, draft: &DocumentDraft) -> AppResult<Document>;

    /// Lists documents, newest first.
    async fn list(&self) -> AppResult<Vec<Document>>;

    /// Finds a document by id.
    async fn find(&self, document_id: DocumentId) -> AppResult<Option<Document>>;

    /// Overwrites a document, bumping its update timestamp.
    async fn update(
        &self,
        document_id: DocumentId,
        draft: &DocumentDraft,
    ) -> AppResult<Option<Document>>;

    /// Deletes a document. Returns whether a row was removed.
    async fn delete(&self, document_id: DocumentId) -> AppResult<bool>;
}

/// Input for creating a document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Body.
    pub content: String,
    /// Uploading user.
    pub uploaded_by: Option<UserId>,
    /// Optional sensitive payload.
    pub sensitive_data: Option<String>,
}

/// Partial document update. Absent fields stay unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentInput {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New body.
    pub content: Option<String>,
    /// New sensitive payload.
    pub sensitive_data: Option<String>,
}

/// Application service for document CRUD.
#[derive(Clone)]
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
}

impl DocumentService {
    /// Creates a new document service.
    #[must_use]
    pub fn new(repository: Arc<dyn DocumentRepository>) -> Self {
        Self { repository }
    }

    /// Stores a new document.
    pub async fn create(&self, input: CreateDocumentInput) -> AppResult<Document> {
        let draft = DocumentDraft {
            title: NonEmptyString::for_field("title", input.title)?,
            description: input.description,
            content: NonEmptyString::for_field("content", input.content)?,
            uploaded_by: input.uploaded_by,
            sensitive_data: input.sensitive_data,
        };
        let document = self.repository.insert(&draft).await?;

        info!(document_id = %document.id(), "document created");
        Ok(document)
    }

    /// Lists all documents.
    pub async fn list(&self) -> AppResult<Vec<Document>> {
        self.repository.list().await
    }

    /// Returns one document.
    pub async fn get(&self, document_id: DocumentId) -> AppResult<Document> {
        self.repository
            .find(document_id)
            .await?
            .ok_or_else(|| not_found(document_id))
    }

    /// Applies a partial update.
    pub async fn update(
        &self,
        document_id: DocumentId,
        input: UpdateDocumentInput,
    ) -> AppResult<Document> {
        let current = self.get(document_id).await?;
        let draft = DocumentDraft {
            title: match input.title {
                Some(title) => NonEmptyString::for_field("title", title)?,
                None => current.title().clone(),
            },
            description: input
                .description
                .or_else(|| current.description().map(str::to_owned)),
            content: match input.content {
                Some(content) => NonEmptyString::for_field("content", content)?,
                None => current.content().clone(),
            },
            uploaded_by: current.uploaded_by(),
            sensitive_data: input
                .sensitive_data
                .or_else(|| current.sensitive_data().map(str::to_owned)),
        };

        let document = self
            .repository
            .update(document_id, &draft)
            .await?
            .ok_or_else(|| not_found(document_id))?;

        info!(%document_id, "document updated");
        Ok(document)
    }

    /// Deletes a document.
    pub async fn delete(&self, document_id: DocumentId) -> AppResult<()> {
        if !self.repository.delete(document_id).await? {
            return Err(not_found(document_id));
        }

        info!(%document_id, "document deleted");
        Ok(())
    }
}

fn not_found(document_id: DocumentId) -> AppError {
    AppError::NotFound(format!("document '{document_id}' does not exist"))
}

#[cfg(test)]
mod tests;
