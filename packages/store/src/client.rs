use crate::document::{Document, Fields};
use crate::error::{Operation, StoreResult};
use crate::query::Query;
use crate::rules::Principal;
use crate::store::{Change, ContentStore};
use crate::subscription::{CollectionSubscription, DocumentSubscription, Subscription};
use async_trait::async_trait;
use pharmasite_common::DocPath;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Deep-merge into the existing document instead of replacing it
    pub merge: bool,
}

impl WriteOptions {
    pub fn merge() -> Self {
        Self { merge: true }
    }

    pub fn replace() -> Self {
        Self { merge: false }
    }
}

/// Everything a caller can do against the document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, path: &DocPath) -> StoreResult<Option<Document>>;

    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>>;

    async fn subscribe_document(&self, path: &DocPath) -> StoreResult<DocumentSubscription>;

    async fn subscribe_collection(&self, query: &Query) -> StoreResult<CollectionSubscription>;

    async fn write_document(&self, path: &DocPath, data: Fields, options: WriteOptions) -> StoreResult<()>;

    /// Create with a generated id, returning it
    async fn create_document(&self, collection: &str, data: Fields) -> StoreResult<String>;

    async fn update_document(&self, path: &DocPath, data: Fields) -> StoreResult<()>;

    async fn delete_document(&self, path: &DocPath) -> StoreResult<()>;
}

/// A store handle bound to one principal
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<ContentStore>,
    principal: Principal,
}

impl StoreClient {
    pub fn new(store: Arc<ContentStore>, principal: Principal) -> Self {
        Self { store, principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    fn check(&self, operation: Operation, target: &str) -> StoreResult<()> {
        self.store.rules().check(&self.principal, operation, target)
    }
}

#[async_trait]
impl DocumentStore for StoreClient {
    async fn get_document(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        self.check(Operation::Get, &path.to_string())?;
        Ok(self.store.read(path))
    }

    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        self.check(Operation::List, &query.collection)?;
        let docs = self.store.list(&query.collection)?;
        Ok(query.apply(self.store.rules().readable(&self.principal, docs)))
    }

    async fn subscribe_document(&self, path: &DocPath) -> StoreResult<DocumentSubscription> {
        self.check(Operation::Get, &path.to_string())?;

        let watched = path.clone();
        let target = path.clone();
        Ok(Subscription::spawn(
            Arc::clone(&self.store),
            None,
            move |event| event.path == watched,
            move |store| Ok(store.read(&target)),
        ))
    }

    async fn subscribe_collection(&self, query: &Query) -> StoreResult<CollectionSubscription> {
        self.check(Operation::List, &query.collection)?;

        let collection = query.collection.clone();
        let query = query.clone();
        let principal = self.principal.clone();
        Ok(Subscription::spawn(
            Arc::clone(&self.store),
            Vec::new(),
            move |event| event.path.collection() == collection,
            move |store| {
                let docs = store.rules().readable(&principal, store.list(&query.collection)?);
                Ok(query.apply(docs))
            },
        ))
    }

    async fn write_document(&self, path: &DocPath, data: Fields, options: WriteOptions) -> StoreResult<()> {
        self.check(Operation::Write, &path.to_string())?;
        let change = if options.merge {
            Change::Merge(data)
        } else {
            Change::Set(data)
        };
        self.store.apply(path, change)
    }

    async fn create_document(&self, collection: &str, data: Fields) -> StoreResult<String> {
        self.check(Operation::Create, collection)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let path = DocPath::new(collection, id.as_str())?;
        self.store.apply(&path, Change::Set(data))?;
        debug!(path = %path, "Created document");
        Ok(id)
    }

    async fn update_document(&self, path: &DocPath, data: Fields) -> StoreResult<()> {
        self.check(Operation::Update, &path.to_string())?;
        self.store.apply(path, Change::Update(data))
    }

    async fn delete_document(&self, path: &DocPath) -> StoreResult<()> {
        self.check(Operation::Delete, &path.to_string())?;
        self.store.apply(path, Change::Delete)
    }
}
