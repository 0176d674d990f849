#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use folio::app::AppState;
use folio::db::contact_repository::{
    ContactRepository, MongoContactRepository, DEFAULT_CONTACT_COLLECTION,
};
use folio::db::models::{ContactMessage, Document};
use folio::db::repository::{CollectionRepository, MongoCollectionRepository};
use folio::error::AppError;

/// In-memory document store shared by both repository traits.
///
/// Contact messages land in the `contact_messages` collection so that the
/// admin listing sees them, as it does with MongoDB.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
    contacts: Mutex<Vec<ContactMessage>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn with_collections(names: &[&str]) -> Arc<Self> {
        let store = Self::default();
        {
            let mut collections = store.collections.lock().unwrap();
            for name in names {
                collections.insert(name.to_string(), Vec::new());
            }
        }
        Arc::new(store)
    }

    /// Simulate the store becoming unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AppError::StoreUnavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.lock().unwrap().len()
    }
}

#[async_trait]
impl CollectionRepository for MemoryStore {
    async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        self.check_online()?;
        Ok(self.collections.lock().unwrap().keys().cloned().collect())
    }

    async fn list_documents(
        &self,
        collection: &str,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        self.check_online()?;
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .skip(skip as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_document(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<String, AppError> {
        self.check_online()?;
        let id = format!("{:024x}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        document.insert("id".into(), serde_json::Value::String(id.clone()));
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        self.check_online()?;
        let mut collections = self.collections.lock().unwrap();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.get("id").and_then(|v| v.as_str()) != Some(id));
        Ok(docs.len() < before)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_online()
    }
}

#[async_trait]
impl ContactRepository for MemoryStore {
    async fn insert(&self, message: ContactMessage) -> Result<(), AppError> {
        self.check_online()?;
        let serde_json::Value::Object(document) = serde_json::to_value(&message)
            .map_err(|e| AppError::Internal(e.to_string()))?
        else {
            return Err(AppError::Internal("contact message is not an object".into()));
        };
        self.collections
            .lock()
            .unwrap()
            .entry(DEFAULT_CONTACT_COLLECTION.to_string())
            .or_default()
            .push(document);
        self.contacts.lock().unwrap().push(message);
        Ok(())
    }

    async fn list_recent(&self, skip: u64, limit: i64) -> Result<Vec<ContactMessage>, AppError> {
        self.check_online()?;
        let mut messages = self.contacts.lock().unwrap().clone();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(messages
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        self.check_online()?;
        Ok(self.contacts.lock().unwrap().len() as u64)
    }
}

/// Router wired to a fresh in-memory store.
pub struct TestEnv {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestEnv {
    pub fn in_memory(collections: &[&str]) -> Self {
        let store = MemoryStore::with_collections(collections);
        let app_state = AppState {
            collection_repo: store.clone(),
            contact_repo: store.clone(),
            contact_collection: DEFAULT_CONTACT_COLLECTION.to_string(),
            trust_proxy_headers: false,
        };

        Self {
            router: folio::app::router(app_state),
            store,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }
}

/// Holds a running MongoDB container and the router wired to it.
///
/// The container is kept alive for as long as this struct lives.
pub struct MongoTestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub router: Router,
    pub db: mongodb::Database,
    pub collection_repo: Arc<dyn CollectionRepository>,
    pub contact_repo: Arc<dyn ContactRepository>,
}

impl MongoTestEnv {
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");
        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let db = mongo_client.database("folio_test");

        let collection_repo: Arc<dyn CollectionRepository> =
            Arc::new(MongoCollectionRepository::new(&db));
        let contact_repo: Arc<dyn ContactRepository> =
            Arc::new(MongoContactRepository::new(&db, DEFAULT_CONTACT_COLLECTION));

        let router = folio::app::router(AppState {
            collection_repo: collection_repo.clone(),
            contact_repo: contact_repo.clone(),
            contact_collection: DEFAULT_CONTACT_COLLECTION.to_string(),
            trust_proxy_headers: false,
        });

        Self {
            _mongo: mongo_container,
            router,
            db,
            collection_repo,
            contact_repo,
        }
    }

    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }
}

/// A valid contact form body.
pub fn contact_body(name: &str, email: &str, subject: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "email": email,
        "subject": subject,
        "message": message,
    })
}
