use rolegate_domain::Document;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for document creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-document-request.ts"
)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub sensitive_data: Option<String>,
}

/// Incoming payload for partial document updates.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-document-request.ts"
)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub sensitive_data: Option<String>,
}

/// API representation of a document.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/document-response.ts"
)]
pub struct DocumentResponse {
    #[ts(type = "number")]
    pub document_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    #[ts(type = "number | null")]
    pub uploaded_by: Option<i64>,
    pub sensitive_data: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(value: Document) -> Self {
        Self {
            document_id: value.id().as_i64(),
            title: value.title().as_str().to_owned(),
            description: value.description().map(ToOwned::to_owned),
            content: value.content().as_str().to_owned(),
            uploaded_by: value.uploaded_by().map(|user_id| user_id.as_i64()),
            sensitive_data: value.sensitive_data().map(ToOwned::to_owned),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}
