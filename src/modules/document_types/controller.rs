use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sysacad_core::AppError;
use sysacad_models::{CreateDocumentTypeDto, DocumentType, DocumentTypeName, UpdateDocumentTypeDto};
use tracing::instrument;

use crate::state::AppState;
use crate::validator::ValidatedJson;

fn not_found(id: i64) -> AppError {
    AppError::not_found(anyhow::anyhow!("Document type with id {} does not exist.", id))
}

#[utoipa::path(
    post,
    path = "/api/document-types",
    request_body = CreateDocumentTypeDto,
    responses(
        (status = 201, description = "Document type created", body = DocumentType),
        (status = 400, description = "Malformed body or unknown name"),
        (status = 409, description = "A document type with this name already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Document Types"
)]
#[instrument(skip(state))]
pub async fn create_document_type(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateDocumentTypeDto>,
) -> Result<(StatusCode, Json<DocumentType>), AppError> {
    let created = state.document_types.create(dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/document-types",
    responses(
        (status = 200, description = "All document types ordered by name", body = Vec<DocumentType>)
    ),
    tag = "Document Types"
)]
#[instrument(skip(state))]
pub async fn get_document_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentType>>, AppError> {
    Ok(Json(state.document_types.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/document-types/{id}",
    params(("id" = i64, Path, description = "Document type ID")),
    responses(
        (status = 200, description = "Document type", body = DocumentType),
        (status = 404, description = "Document type not found")
    ),
    tag = "Document Types"
)]
#[instrument(skip(state))]
pub async fn get_document_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentType>, AppError> {
    state
        .document_types
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

#[utoipa::path(
    get,
    path = "/api/document-types/name/{name}",
    params(("name" = DocumentTypeName, Path, description = "Document type code (DNI, LC, LE, PASAPORTE)")),
    responses(
        (status = 200, description = "Document type", body = DocumentType),
        (status = 400, description = "Unknown document type code"),
        (status = 404, description = "Document type not found")
    ),
    tag = "Document Types"
)]
#[instrument(skip(state))]
pub async fn get_document_type_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DocumentType>, AppError> {
    let name: DocumentTypeName = name
        .to_uppercase()
        .parse()
        .map_err(AppError::bad_request)?;

    state
        .document_types
        .find_by_name(name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Document type {} does not exist.", name)))
}

#[utoipa::path(
    put,
    path = "/api/document-types/{id}",
    params(("id" = i64, Path, description = "Document type ID")),
    request_body = CreateDocumentTypeDto,
    responses(
        (status = 200, description = "Document type replaced", body = DocumentType),
        (status = 404, description = "Document type not found"),
        (status = 409, description = "Name already used by another document type"),
        (status = 422, description = "Validation error")
    ),
    tag = "Document Types"
)]
#[instrument(skip(state))]
pub async fn replace_document_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<CreateDocumentTypeDto>,
) -> Result<Json<DocumentType>, AppError> {
    let changes = UpdateDocumentTypeDto {
        name: Some(dto.name),
        description: Some(dto.description.unwrap_or_default()),
    };
    Ok(Json(state.document_types.update(id, changes).await?))
}

#[utoipa::path(
    patch,
    path = "/api/document-types/{id}",
    params(("id" = i64, Path, description = "Document type ID")),
    request_body = UpdateDocumentTypeDto,
    responses(
        (status = 200, description = "Document type updated", body = DocumentType),
        (status = 404, description = "Document type not found"),
        (status = 409, description = "Name already used by another document type"),
        (status = 422, description = "Validation error")
    ),
    tag = "Document Types"
)]
#[instrument(skip(state))]
pub async fn update_document_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateDocumentTypeDto>,
) -> Result<Json<DocumentType>, AppError> {
    Ok(Json(state.document_types.update(id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/document-types/{id}",
    params(("id" = i64, Path, description = "Document type ID")),
    responses(
        (status = 204, description = "Document type deleted"),
        (status = 404, description = "Document type not found"),
        (status = 409, description = "Document type is referenced by students")
    ),
    tag = "Document Types"
)]
#[instrument(skip(state))]
pub async fn delete_document_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.document_types.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
