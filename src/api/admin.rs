use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::api::extract::{ApiPath, ApiQuery, RawBody};
use crate::api::paging::{PageQuery, MAX_PAGE_SIZE};
use crate::app::AppState;
use crate::db::models::{Document, ID_FIELD};
use crate::db::repository::CollectionRepository;
use crate::error::AppError;

const MAX_COLLECTION_NAME_LEN: usize = 64;

/// Response from a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
}

/// Reject names the store would misinterpret (`$`, `.`, `system.` prefixes).
pub fn validate_collection_name(name: &str) -> Result<(), AppError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_COLLECTION_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidCollectionName(format!(
            "'{name}' must be 1-{MAX_COLLECTION_NAME_LEN} characters of letters, digits, '_' or '-'"
        )))
    }
}

/// Refuse writes to the contact collection, which is owned by contact intake.
pub fn ensure_writable(collection: &str, contact_collection: &str) -> Result<(), AppError> {
    if collection == contact_collection {
        return Err(AppError::ReadOnlyCollection(format!(
            "'{collection}' holds contact messages and cannot be modified"
        )));
    }
    Ok(())
}

/// Parse a caller-supplied document body.
///
/// The body must be a JSON object and must not carry its own identifier.
pub fn parse_document_body(body: &str) -> Result<Document, AppError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::MalformedInput(format!("Body is not valid JSON: {e}")))?;

    let serde_json::Value::Object(document) = value else {
        return Err(AppError::MalformedInput(
            "Document body must be a JSON object".into(),
        ));
    };

    if document.contains_key(ID_FIELD) || document.contains_key("_id") {
        return Err(AppError::MalformedInput(
            "Document body must not contain 'id' or '_id'; the store assigns it".into(),
        ));
    }

    Ok(document)
}

/// Core logic to list collection names.
pub async fn process_list_collections(
    repo: &dyn CollectionRepository,
) -> Result<Vec<String>, AppError> {
    repo.list_collections().await
}

/// Core logic to list the documents of one collection.
pub async fn process_list_documents(
    repo: &dyn CollectionRepository,
    collection: &str,
    page: PageQuery,
) -> Result<Vec<Document>, AppError> {
    validate_collection_name(collection)?;
    let (skip, limit) = page.resolve(MAX_PAGE_SIZE);
    repo.list_documents(collection, skip, limit).await
}

/// Core document creation logic, separated from the HTTP layer for testability.
///
/// The body is validated before any store interaction. Returns the stored
/// content with the assigned `id`.
pub async fn process_create_document(
    repo: &dyn CollectionRepository,
    contact_collection: &str,
    collection: &str,
    body: &str,
) -> Result<Document, AppError> {
    validate_collection_name(collection)?;
    ensure_writable(collection, contact_collection)?;
    let mut document = parse_document_body(body)?;

    let id = repo.insert_document(collection, document.clone()).await?;
    tracing::info!(collection, id = %id, "Document created");

    document.insert(ID_FIELD.to_string(), serde_json::Value::String(id));
    Ok(document)
}

/// Core logic to delete a document. Missing documents are reported as `NotFound`.
pub async fn process_delete_document(
    repo: &dyn CollectionRepository,
    contact_collection: &str,
    collection: &str,
    id: &str,
) -> Result<DeleteResponse, AppError> {
    validate_collection_name(collection)?;
    ensure_writable(collection, contact_collection)?;

    if !repo.delete_document(collection, id).await? {
        return Err(AppError::NotFound(format!(
            "Document '{id}' not found in '{collection}'"
        )));
    }

    tracing::info!(collection, id, "Document deleted");
    Ok(DeleteResponse {
        status: "success".to_string(),
    })
}

/// Axum handler for `GET /api/admin/collections`.
pub async fn list_collections_handler(
    State(state): State<AppState>,
) -> Result<axum::Json<Vec<String>>, AppError> {
    let names = process_list_collections(state.collection_repo.as_ref()).await?;
    Ok(axum::Json(names))
}

/// Axum handler for `GET /api/admin/collections/{collection}`.
pub async fn list_documents_handler(
    State(state): State<AppState>,
    ApiPath(collection): ApiPath<String>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<axum::Json<Vec<Document>>, AppError> {
    let documents =
        process_list_documents(state.collection_repo.as_ref(), &collection, page).await?;
    Ok(axum::Json(documents))
}

/// Axum handler for `POST /api/admin/collections/{collection}`.
///
/// Takes the raw body so that parse failures surface as `MalformedInput`.
pub async fn create_document_handler(
    State(state): State<AppState>,
    ApiPath(collection): ApiPath<String>,
    RawBody(body): RawBody,
) -> Result<(StatusCode, axum::Json<Document>), AppError> {
    let document = process_create_document(
        state.collection_repo.as_ref(),
        &state.contact_collection,
        &collection,
        &body,
    )
    .await?;
    Ok((StatusCode::CREATED, axum::Json(document)))
}

/// Axum handler for `DELETE /api/admin/collections/{collection}/{id}`.
pub async fn delete_document_handler(
    State(state): State<AppState>,
    ApiPath((collection, id)): ApiPath<(String, String)>,
) -> Result<axum::Json<DeleteResponse>, AppError> {
    let response = process_delete_document(
        state.collection_repo.as_ref(),
        &state.contact_collection,
        &collection,
        &id,
    )
    .await?;
    Ok(axum::Json(response))
}
