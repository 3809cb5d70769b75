use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use rolegate_application::{CreateDocumentInput, UpdateDocumentInput};
use rolegate_core::Principal;
use rolegate_domain::{DocumentId, UserId};

use crate::access_policy::{Operation, authorize};
use crate::dto::{CreateDocumentRequest, DocumentResponse, UpdateDocumentRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_document_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<DocumentResponse>)> {
    authorize(&state, &principal, Operation::CreateDocument).await?;

    let document = state
        .document_service
        .create(CreateDocumentInput {
            title: payload.title,
            description: payload.description,
            content: payload.content,
            uploaded_by: Some(UserId::new(principal.user_id())),
            sensitive_data: payload.sensitive_data,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

pub async fn list_documents_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<DocumentResponse>>> {
    authorize(&state, &principal, Operation::ListDocuments).await?;

    let documents = state
        .document_service
        .list()
        .await?
        .into_iter()
        .map(DocumentResponse::from)
        .collect();

    Ok(Json(documents))
}

pub async fn get_document_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(document_id): Path<i64>,
) -> ApiResult<Json<DocumentResponse>> {
    authorize(&state, &principal, Operation::ReadDocument).await?;

    let document = state
        .document_service
        .get(DocumentId::new(document_id))
        .await?;
    Ok(Json(DocumentResponse::from(document)))
}

pub async fn update_document_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(document_id): Path<i64>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> ApiResult<Json<DocumentResponse>> {
    authorize(&state, &principal, Operation::UpdateDocument).await?;

    let document = state
        .document_service
        .update(
            DocumentId::new(document_id),
            UpdateDocumentInput {
                title: payload.title,
                description: payload.description,
                content: payload.content,
                sensitive_data: payload.sensitive_data,
            },
        )
        .await?;

    Ok(Json(DocumentResponse::from(document)))
}

pub async fn delete_document_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(document_id): Path<i64>,
) -> ApiResult<StatusCode> {
    authorize(&state, &principal, Operation::DeleteDocument).await?;

    state
        .document_service
        .delete(DocumentId::new(document_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
