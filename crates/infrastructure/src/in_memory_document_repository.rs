use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rolegate_application::{DocumentDraft, DocumentRepository};
use rolegate_core::AppResult;
use rolegate_domain::{Document, DocumentId};
use tokio::sync::RwLock;

/// In-memory document repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<BTreeMap<DocumentId, Document>>,
}

impl InMemoryDocumentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, draft: &DocumentDraft) -> AppResult<Document> {
        let mut documents = self.documents.write().await;
        let next_id = documents
            .keys()
            .next_back()
            .map_or(1, |last| last.as_i64() + 1);
        let now = Utc::now();
        let document = Document::new(
            DocumentId::new(next_id),
            draft.title.as_str(),
            draft.description.clone(),
            draft.content.as_str(),
            draft.uploaded_by,
            draft.sensitive_data.clone(),
            now,
            now,
        )?;

        documents.insert(document.id(), document.clone());
        Ok(document)
    }

    async fn list(&self) -> AppResult<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut values: Vec<Document> = documents.values().cloned().collect();
        values.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| right.id().cmp(&left.id()))
        });
        Ok(values)
    }

    async fn find(&self, document_id: DocumentId) -> AppResult<Option<Document>> {
        Ok(self.documents.read().await.get(&document_id).cloned())
    }

    async fn update(
        &self,
        document_id: DocumentId,
        draft: &DocumentDraft,
    ) -> AppResult<Option<Document>> {
        let mut documents = self.documents.write().await;
        let Some(current) = documents.get(&document_id) else {
            return Ok(None);
        };

        let document = Document::new(
            document_id,
            draft.title.as_str(),
            draft.description.clone(),
            draft.content.as_str(),
            current.uploaded_by(),
            draft.sensitive_data.clone(),
            current.created_at(),
            Utc::now(),
        )?;
        documents.insert(document_id, document.clone());
        Ok(Some(document))
    }

    async fn delete(&self, document_id: DocumentId) -> AppResult<bool> {
        Ok(self.documents.write().await.remove(&document_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use rolegate_application::{DocumentDraft, DocumentRepository};
    use rolegate_core::{AppResult, NonEmptyString};
    use rolegate_domain::DocumentId;

    use super::InMemoryDocumentRepository;

    fn draft(title: &str) -> AppResult<DocumentDraft> {
        Ok(DocumentDraft {
            title: NonEmptyString::new(title)?,
            description: None,
            content: NonEmptyString::new("body")?,
            uploaded_by: None,
            sensitive_data: None,
        })
    }

    #[tokio::test]
    async fn list_returns_newest_first() -> AppResult<()> {
        let repository = InMemoryDocumentRepository::new();
        repository.insert(&draft("first")?).await?;
        repository.insert(&draft("second")?).await?;

        let titles: Vec<String> = repository
            .list()
            .await?
            .into_iter()
            .map(|document| document.title().as_str().to_owned())
            .collect();
        assert_eq!(titles, vec!["second".to_owned(), "first".to_owned()]);
        Ok(())
    }

    #[tokio::test]
    async fn update_preserves_creation_time() -> AppResult<()> {
        let repository = InMemoryDocumentRepository::new();
        let created = repository.insert(&draft("first")?).await?;

        let updated = repository.update(created.id(), &draft("renamed")?).await?;
        assert!(updated.is_some_and(|document| {
            document.created_at() == created.created_at()
                && document.title().as_str() == "renamed"
        }));
        assert!(repository
            .update(DocumentId::new(42), &draft("ghost")?)
            .await?
            .is_none());
        Ok(())
    }
}
