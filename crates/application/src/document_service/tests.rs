use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Document, DocumentId, UserId};
use tokio::sync::Mutex;

use super::{
    CreateDocumentInput, DocumentDraft, DocumentRepository, DocumentService, UpdateDocumentInput,
};

#[derive(Default)]
struct FakeDocumentRepository {
    documents: Mutex<BTreeMap<DocumentId, Document>>,
}

fn build(document_id: DocumentId, draft: &DocumentDraft) -> AppResult<Document> {
    let now = Utc::now();
    Document::new(
        document_id,
        draft.title.as_str(),
        draft.description.clone(),
        draft.content.as_str(),
        draft.uploaded_by,
        draft.sensitive_data.clone(),
        now,
        now,
    )
}

#[async_trait]
impl DocumentRepository for FakeDocumentRepository {
    async fn insert(&self, draft: &DocumentDraft) -> AppResult<Document> {
        let mut documents = self.documents.lock().await;
        let document_id = DocumentId::new(documents.len() as i64 + 1);
        let document = build(document_id, draft)?;
        documents.insert(document_id, document.clone());
        Ok(document)
    }

    async fn list(&self) -> AppResult<Vec<Document>> {
        Ok(self.documents.lock().await.values().cloned().collect())
    }

    async fn find(&self, document_id: DocumentId) -> AppResult<Option<Document>> {
        Ok(self.documents.lock().await.get(&document_id).cloned())
    }

    async fn update(
        &self,
        document_id: DocumentId,
        draft: &DocumentDraft,
    ) -> AppResult<Option<Document>> {
        let mut documents = self.documents.lock().await;
        if !documents.contains_key(&document_id) {
            return Ok(None);
        }
        let document = build(document_id, draft)?;
        documents.insert(document_id, document.clone());
        Ok(Some(document))
    }

    async fn delete(&self, document_id: DocumentId) -> AppResult<bool> {
        Ok(self.documents.lock().await.remove(&document_id).is_some())
    }
}

fn service() -> DocumentService {
    DocumentService::new(Arc::new(FakeDocumentRepository::default()))
}

fn quarterly_report() -> CreateDocumentInput {
    CreateDocumentInput {
        title: "Quarterly report".to_owned(),
        description: Some("Q3 numbers".to_owned()),
        content: "Revenue grew.".to_owned(),
        uploaded_by: Some(UserId::new(7)),
        sensitive_data: None,
    }
}

#[tokio::test]
async fn create_rejects_blank_title() -> AppResult<()> {
    let mut input = quarterly_report();
    input.title = "  ".to_owned();

    let result = service().create(input).await;
    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("title")));
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_unspecified_fields() -> AppResult<()> {
    let service = service();
    let created = service.create(quarterly_report()).await?;

    let updated = service
        .update(
            created.id(),
            UpdateDocumentInput {
                content: Some("Revenue grew by 4%.".to_owned()),
                ..UpdateDocumentInput::default()
            },
        )
        .await?;

    assert_eq!(updated.title().as_str(), "Quarterly report");
    assert_eq!(updated.description(), Some("Q3 numbers"));
    assert_eq!(updated.content().as_str(), "Revenue grew by 4%.");
    assert_eq!(updated.uploaded_by(), Some(UserId::new(7)));
    Ok(())
}

#[tokio::test]
async fn missing_document_is_not_found() -> AppResult<()> {
    let service = service();

    assert!(matches!(
        service.get(DocumentId::new(99)).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete(DocumentId::new(99)).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn deleted_document_disappears_from_listing() -> AppResult<()> {
    let service = service();
    let created = service.create(quarterly_report()).await?;

    service.delete(created.id()).await?;

    assert!(service.list().await?.is_empty());
    Ok(())
}
