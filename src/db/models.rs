use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A schema-less document as exchanged over the admin API.
///
/// The admin layer never inspects the content beyond requiring a JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Name of the identifier field exposed to API callers.
///
/// MongoDB stores it as `_id`; the admin layer renames it on the way out.
pub const ID_FIELD: &str = "id";

/// A contact message as returned by the inbox API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    /// Server-generated UUID.
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Creation time, assigned on submission.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    /// Address of the submitting client, when it could be determined.
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Storage representation of a [`ContactMessage`].
///
/// The id doubles as MongoDB's `_id` and the timestamp is kept as a native
/// BSON date so the inbox can sort on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl From<ContactMessage> for ContactRecord {
    fn from(m: ContactMessage) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            subject: m.subject,
            message: m.message,
            timestamp: m.timestamp,
            is_read: m.is_read,
            ip_address: m.ip_address,
            user_agent: m.user_agent,
        }
    }
}

impl From<ContactRecord> for ContactMessage {
    fn from(r: ContactRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            subject: r.subject,
            message: r.message,
            timestamp: r.timestamp,
            is_read: r.is_read,
            ip_address: r.ip_address,
            user_agent: r.user_agent,
        }
    }
}

/// The request payload for the contact form.
///
/// Every field defaults to an empty string: missing or non-string values are
/// reported by validation alongside the other problems instead of failing
/// deserialization on the first one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        _ => String::new(),
    })
}
