use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{Extensions, HeaderMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::extract::{ApiQuery, RawBody};
use crate::api::paging::PageQuery;
use crate::app::AppState;
use crate::db::contact_repository::ContactRepository;
use crate::db::models::{ContactMessage, ContactSubmission};
use crate::error::AppError;
use crate::models::contact_validator::validate_submission;

pub const CONFIRMATION_MESSAGE: &str =
    "Message sent successfully! Thank you for reaching out. I'll get back to you soon.";

const UNKNOWN: &str = "unknown";
const DEFAULT_INBOX_LIMIT: i64 = 100;

/// Response from a successful contact submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub success: bool,
    pub message: String,
    pub data: ReceiptData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptData {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

/// One page of the contact inbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxPage {
    pub success: bool,
    pub data: Vec<ContactMessage>,
    pub total: u64,
    pub skip: u64,
    pub limit: i64,
}

/// Where a submission came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            ip_address: UNKNOWN.to_string(),
            user_agent: UNKNOWN.to_string(),
        }
    }
}

impl ClientInfo {
    /// Resolve the client address from the socket peer.
    ///
    /// `x-forwarded-for` and `x-real-ip` take precedence only when
    /// `trust_proxy_headers` is set.
    pub fn from_request(
        headers: &HeaderMap,
        extensions: &Extensions,
        trust_proxy_headers: bool,
    ) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let forwarded = || {
            header("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_string())
                .or_else(|| header("x-real-ip").map(str::to_string))
        };

        let ip_address = trust_proxy_headers
            .then(forwarded)
            .flatten()
            .or_else(|| {
                extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| UNKNOWN.to_string());

        let user_agent = header("user-agent")
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            ip_address,
            user_agent,
        }
    }
}

/// Parse the raw contact body. Only syntactically broken JSON is rejected
/// here; missing fields are left to validation.
pub fn parse_submission(body: &str) -> Result<ContactSubmission, AppError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::MalformedInput(format!("Body is not valid JSON: {e}")))?;

    if !value.is_object() {
        return Err(AppError::MalformedInput(
            "Contact body must be a JSON object".into(),
        ));
    }

    serde_json::from_value(value).map_err(|e| AppError::MalformedInput(e.to_string()))
}

/// Core contact intake logic.
///
/// Received → Validating → Rejected(errors) | Persisting → Confirmed(id) | PersistFailed.
/// Nothing is written when validation fails, and nothing is retried.
pub async fn process_submit(
    repo: &dyn ContactRepository,
    body: &str,
    client: ClientInfo,
) -> Result<ContactReceipt, AppError> {
    let submission = parse_submission(body)?;

    let valid = validate_submission(&submission).map_err(AppError::Validation)?;

    let message = ContactMessage {
        id: Uuid::new_v4().to_string(),
        name: valid.name,
        email: valid.email,
        subject: valid.subject,
        message: valid.message,
        timestamp: Utc::now(),
        is_read: false,
        ip_address: Some(client.ip_address),
        user_agent: Some(client.user_agent),
    };

    let id = message.id.clone();
    let timestamp = message.timestamp;

    repo.insert(message)
        .await
        .map_err(|e| AppError::PersistFailed(e.to_string()))?;

    tracing::info!(id = %id, "Contact message created");

    Ok(ContactReceipt {
        success: true,
        message: CONFIRMATION_MESSAGE.to_string(),
        data: ReceiptData { id, timestamp },
    })
}

/// Core logic for the read-only inbox.
pub async fn process_list_messages(
    repo: &dyn ContactRepository,
    page: PageQuery,
) -> Result<InboxPage, AppError> {
    let (skip, limit) = page.resolve(DEFAULT_INBOX_LIMIT);

    let data = repo.list_recent(skip, limit).await?;
    let total = repo.count().await?;

    Ok(InboxPage {
        success: true,
        data,
        total,
        skip,
        limit,
    })
}

/// Axum handler for `POST /api/contact/message`.
pub async fn submit_message_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    RawBody(body): RawBody,
) -> Result<axum::Json<ContactReceipt>, AppError> {
    let client = ClientInfo::from_request(&headers, &extensions, state.trust_proxy_headers);
    let receipt = process_submit(state.contact_repo.as_ref(), &body, client).await?;
    Ok(axum::Json(receipt))
}

/// Axum handler for `GET /api/contact/messages`.
pub async fn list_messages_handler(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<axum::Json<InboxPage>, AppError> {
    let inbox = process_list_messages(state.contact_repo.as_ref(), page).await?;
    Ok(axum::Json(inbox))
}
