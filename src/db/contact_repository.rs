use async_trait::async_trait;

use crate::db::models::{ContactMessage, ContactRecord};
use crate::error::AppError;

/// Default collection holding contact-form submissions.
pub const DEFAULT_CONTACT_COLLECTION: &str = "contact_messages";

/// Repository trait for contact messages.
///
/// Messages are append-only: there is no update or delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Persist a new message.
    async fn insert(&self, message: ContactMessage) -> Result<(), AppError>;

    /// Messages ordered newest first.
    async fn list_recent(&self, skip: u64, limit: i64) -> Result<Vec<ContactMessage>, AppError>;

    /// Total number of stored messages.
    async fn count(&self) -> Result<u64, AppError>;
}

/// MongoDB implementation of the ContactRepository.
pub struct MongoContactRepository {
    collection: mongodb::Collection<bson::Document>,
}

impl MongoContactRepository {
    pub fn new(db: &mongodb::Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }
}

#[async_trait]
impl ContactRepository for MongoContactRepository {
    async fn insert(&self, message: ContactMessage) -> Result<(), AppError> {
        let record = bson::to_document(&ContactRecord::from(message))
            .map_err(|e| AppError::Internal(format!("Failed to encode contact message: {e}")))?;

        self.collection
            .insert_one(record)
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        Ok(())
    }

    async fn list_recent(&self, skip: u64, limit: i64) -> Result<Vec<ContactMessage>, AppError> {
        use bson::doc;
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        let mut messages = Vec::new();
        while let Some(raw) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?
        {
            // The admin panel can write arbitrary documents into this
            // collection; skip the ones that are not contact messages.
            match bson::from_document::<ContactRecord>(raw) {
                Ok(record) => messages.push(record.into()),
                Err(e) => tracing::warn!("Skipping malformed contact message: {e}"),
            }
        }

        Ok(messages)
    }

    async fn count(&self) -> Result<u64, AppError> {
        use bson::doc;

        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}
