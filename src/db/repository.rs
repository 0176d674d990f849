use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson};

use crate::db::models::{Document, ID_FIELD};
use crate::error::AppError;

/// Repository trait for generic, schema-less collection operations.
///
/// This trait allows mocking the database layer in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Names of the user-visible collections, in store order.
    async fn list_collections(&self) -> Result<Vec<String>, AppError>;

    /// Documents of a collection in store order. Unknown collections are empty.
    async fn list_documents(
        &self,
        collection: &str,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Document>, AppError>;

    /// Insert a document and return the identifier assigned by the store.
    async fn insert_document(&self, collection: &str, document: Document)
        -> Result<String, AppError>;

    /// Delete a document by identifier. Returns `false` when nothing matched.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, AppError>;

    /// Round-trip to the store, used by the health probe.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Render a store identifier as the string exposed to callers.
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

/// Convert a stored BSON document into the API representation.
///
/// `_id` is exposed as `id`; every other value is rendered as relaxed
/// extended JSON.
pub fn document_to_json(mut stored: bson::Document) -> Document {
    let id = stored.remove("_id");

    let mut out: Document = stored
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();

    if let Some(id) = id {
        out.insert(ID_FIELD.to_string(), serde_json::Value::String(id_to_string(&id)));
    }

    out
}

/// Convert an API document into BSON for insertion.
pub fn json_to_document(document: &Document) -> Result<bson::Document, AppError> {
    bson::to_document(document)
        .map_err(|e| AppError::MalformedInput(format!("Document cannot be stored: {e}")))
}

/// Filter matching a caller-supplied identifier.
///
/// Ids that look like ObjectIds also match a string `_id` with the same text,
/// since collections filled out-of-band may use either.
pub fn id_filter(id: &str) -> bson::Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [oid, id] } },
        Err(_) => doc! { "_id": id },
    }
}

/// MongoDB implementation of the CollectionRepository.
pub struct MongoCollectionRepository {
    db: mongodb::Database,
}

impl MongoCollectionRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self { db: db.clone() }
    }

    fn collection(&self, name: &str) -> mongodb::Collection<bson::Document> {
        self.db.collection(name)
    }
}

fn store_error(e: mongodb::error::Error) -> AppError {
    AppError::StoreUnavailable(e.to_string())
}

/// A per-document write error means the server refused this document's shape
/// (e.g. `$`-prefixed keys). Write concern failures are store-side.
fn insert_error(e: mongodb::error::Error) -> AppError {
    use mongodb::error::{ErrorKind, WriteFailure};

    if matches!(*e.kind, ErrorKind::Write(WriteFailure::WriteError(_))) {
        AppError::MalformedInput(format!("Document rejected by store: {e}"))
    } else {
        store_error(e)
    }
}

#[async_trait]
impl CollectionRepository for MongoCollectionRepository {
    async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        let names = self.db.list_collection_names().await.map_err(store_error)?;

        Ok(names
            .into_iter()
            .filter(|name| !name.starts_with("system."))
            .collect())
    }

    async fn list_documents(
        &self,
        collection: &str,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().skip(skip).limit(limit).build();

        let mut cursor = self
            .collection(collection)
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(store_error)?;

        let mut documents = Vec::new();
        while let Some(stored) = cursor.try_next().await.map_err(store_error)? {
            documents.push(document_to_json(stored));
        }

        Ok(documents)
    }

    async fn insert_document(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<String, AppError> {
        let stored = json_to_document(&document)?;

        let result = self
            .collection(collection)
            .insert_one(stored)
            .await
            .map_err(insert_error)?;

        Ok(id_to_string(&result.inserted_id))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let result = self
            .collection(collection)
            .delete_one(id_filter(id))
            .await
            .map_err(store_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
