use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure modes the operator needs to tell apart.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server refused the input; fixing it and retrying may succeed.
    #[error("{status}: {message}{}", format_errors(.errors))]
    Rejected {
        status: StatusCode,
        message: String,
        errors: Vec<String>,
    },

    /// The server or its store failed; retrying later may succeed.
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid base URL '{0}'")]
    BaseUrl(String),
}

impl ApiError {
    pub fn is_input_problem(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}

fn format_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!("\n  - {}", errors.join("\n  - "))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<String>,
}

/// Turn a non-success response into an [`ApiError`].
pub fn classify(status: StatusCode, body: &str) -> ApiError {
    let (message, errors) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.message.is_empty() => (envelope.message, envelope.errors),
        _ => (body.trim().to_string(), Vec::new()),
    };

    if status.is_client_error() {
        ApiError::Rejected {
            status,
            message,
            errors,
        }
    } else {
        ApiError::Server { status, message }
    }
}

/// Contact form fields.
#[derive(Debug, Clone, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Thin client over the folio HTTP API.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|_| ApiError::BaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["api", "admin", "collections"]);
        decode(self.http.get(url).send().await?).await
    }

    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Value>, ApiError> {
        let url = self.endpoint(&["api", "admin", "collections", collection]);
        decode(self.http.get(url).send().await?).await
    }

    /// Send the body verbatim; the server validates it.
    pub async fn create_document(&self, collection: &str, body: String) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "admin", "collections", collection]);
        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "admin", "collections", collection, id]);
        let _: Value = decode(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    pub async fn submit_contact(&self, form: &ContactForm) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "contact", "message"]);
        decode(self.http.post(url).json(form).send().await?).await
    }

    pub async fn inbox(&self, skip: u64, limit: i64) -> Result<Value, ApiError> {
        let mut url = self.endpoint(&["api", "contact", "messages"]);
        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());
        decode(self.http.get(url).send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify(status, &body))
}
