use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::api::{admin, contact, health};
use crate::db::contact_repository::ContactRepository;
use crate::db::repository::CollectionRepository;
use crate::error::AppError;

/// Shared state handed to every handler.
///
/// Only immutable handles live here; the store is the single point of shared
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    pub collection_repo: Arc<dyn CollectionRepository>,
    pub contact_repo: Arc<dyn ContactRepository>,
    /// Collection written by contact intake; read-only through the admin API.
    pub contact_collection: String,
    /// Take the client address from `x-forwarded-for` / `x-real-ip`.
    pub trust_proxy_headers: bool,
}

/// Build the API router. Middleware (tracing, CORS) is layered on by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route(
            "/api/admin/collections",
            get(admin::list_collections_handler),
        )
        .route(
            "/api/admin/collections/{collection}",
            get(admin::list_documents_handler).post(admin::create_document_handler),
        )
        .route(
            "/api/admin/collections/{collection}/{id}",
            axum::routing::delete(admin::delete_document_handler),
        )
        .route(
            "/api/contact/message",
            axum::routing::post(contact::submit_message_handler),
        )
        .route(
            "/api/contact/messages",
            get(contact::list_messages_handler),
        )
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
