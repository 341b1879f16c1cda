//! Integration tests for editor crate

use async_trait::async_trait;
use pharmasite_common::{DocPath, PageName, ProductCategory};
use pharmasite_editor::{
    delete_plan, CategoryForm, EditSession, ErrorBus, FailureKind, NextStep, OptimisticList, PageContent,
    ProductForm, SaveError, SavingSet, Variant, BlogPostForm,
};
use pharmasite_store::{
    AccessRules, CollectionSubscription, ContentStore, Document, DocumentSubscription, DocumentStore, Fields,
    Operation, Principal, Query, StoreClient, StoreResult, WriteOptions,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Delegates to a real client and counts every write-side call
struct CountingStore {
    inner: StoreClient,
    writes: Arc<AtomicUsize>,
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn get_document(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        self.inner.get_document(path).await
    }

    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        self.inner.query(query).await
    }

    async fn subscribe_document(&self, path: &DocPath) -> StoreResult<DocumentSubscription> {
        self.inner.subscribe_document(path).await
    }

    async fn subscribe_collection(&self, query: &Query) -> StoreResult<CollectionSubscription> {
        self.inner.subscribe_collection(query).await
    }

    async fn write_document(&self, path: &DocPath, data: Fields, options: WriteOptions) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_document(path, data, options).await
    }

    async fn create_document(&self, collection: &str, data: Fields) -> StoreResult<String> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.create_document(collection, data).await
    }

    async fn update_document(&self, path: &DocPath, data: Fields) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_document(path, data).await
    }

    async fn delete_document(&self, path: &DocPath) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_document(path).await
    }
}

/// Never answers a write
struct HangingStore(StoreClient);

#[async_trait]
impl DocumentStore for HangingStore {
    async fn get_document(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        self.0.get_document(path).await
    }

    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        self.0.query(query).await
    }

    async fn subscribe_document(&self, path: &DocPath) -> StoreResult<DocumentSubscription> {
        self.0.subscribe_document(path).await
    }

    async fn subscribe_collection(&self, query: &Query) -> StoreResult<CollectionSubscription> {
        self.0.subscribe_collection(query).await
    }

    async fn write_document(&self, _: &DocPath, _: Fields, _: WriteOptions) -> StoreResult<()> {
        std::future::pending().await
    }

    async fn create_document(&self, _: &str, _: Fields) -> StoreResult<String> {
        std::future::pending().await
    }

    async fn update_document(&self, _: &DocPath, _: Fields) -> StoreResult<()> {
        std::future::pending().await
    }

    async fn delete_document(&self, _: &DocPath) -> StoreResult<()> {
        std::future::pending().await
    }
}

struct Harness {
    store: Arc<ContentStore>,
    bus: ErrorBus,
    writes: Arc<AtomicUsize>,
    session: EditSession,
}

fn harness(principal: Principal) -> Harness {
    let store = ContentStore::in_memory(AccessRules::default());
    let bus = ErrorBus::new();
    let writes = Arc::new(AtomicUsize::new(0));
    let counting = CountingStore {
        inner: store.client(principal),
        writes: Arc::clone(&writes),
    };
    let session = EditSession::new(Arc::new(counting), bus.clone());

    Harness {
        store,
        bus,
        writes,
        session,
    }
}

fn paracetamol() -> ProductForm {
    ProductForm {
        name: "Paracetamol 650mg".to_string(),
        category: "Tablets".to_string(),
        description: "Analgesic and antipyretic tablet.".to_string(),
        specifications: "650mg per tablet, IP grade".to_string(),
        applications: "Pain relief and fever management".to_string(),
        image_url: "/uploads/paracetamol.png".to_string(),
        image_effect: None,
    }
}

#[tokio::test]
async fn test_create_product_end_to_end() {
    let h = harness(Principal::editor("admin@pharmasite.test"));

    let saved = h.session.save_product(&paracetamol(), None).await.unwrap();
    assert_eq!(saved.next, NextStep::Navigate("/admin/products".to_string()));
    assert_eq!(saved.notification.variant, Variant::Default);

    let id = saved.id.unwrap();
    let doc = h
        .store
        .client(Principal::Anonymous)
        .get_document(&DocPath::new("products", id.as_str()).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.data["slug"], "paracetamol-650mg");
    assert_eq!(doc.data["imageEffect"], "center-fill");
    assert!(!h.session.is_saving("products/new"));
}

#[tokio::test]
async fn test_update_product_recomputes_slug() {
    let h = harness(Principal::editor("admin@pharmasite.test"));
    let id = h.session.save_product(&paracetamol(), None).await.unwrap().id.unwrap();

    let renamed = ProductForm {
        name: "Paracetamol 500 mg".to_string(),
        ..paracetamol()
    };
    let saved = h.session.save_product(&renamed, Some(&id)).await.unwrap();
    assert!(saved.id.is_none());

    let doc = h
        .store
        .client(Principal::Service)
        .get_document(&DocPath::new("products", id.as_str()).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.data["slug"], "paracetamol-500-mg");
}

#[tokio::test]
async fn test_invalid_form_never_reaches_store() {
    let h = harness(Principal::editor("admin@pharmasite.test"));
    let form = ProductForm {
        name: "Pa".to_string(),
        ..paracetamol()
    };

    let failure = h.session.save_product(&form, None).await.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::Validation);
    assert_eq!(failure.notification.title, "Validation Failed");
    assert_eq!(
        failure.error.field_errors().unwrap().get("name"),
        Some("Name must be at least 3 characters.")
    );
    assert_eq!(h.writes.load(Ordering::SeqCst), 0);
    assert!(!h.session.is_saving("products/new"));
}

#[tokio::test]
async fn test_denied_page_save_publishes_one_event() {
    let h = harness(Principal::viewer("viewer@pharmasite.test"));
    let mut listener = h.bus.subscribe();

    let failure = h
        .session
        .save_page(PageName::About, &PageContent(json!({ "title": "About us" })))
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::PermissionDenied);
    assert_eq!(failure.notification.title, "Save Failed");
    assert_eq!(failure.notification.variant, Variant::Destructive);
    assert_eq!(
        failure.notification.description,
        "You do not have permission to save these changes."
    );

    let event = listener.try_recv().unwrap();
    assert_eq!(event.path, "pages/about");
    assert_eq!(event.operation, Operation::Write);
    assert_eq!(event.payload.unwrap()["title"], "About us");
    assert!(listener.try_recv().is_err());

    assert_eq!(h.writes.load(Ordering::SeqCst), 1);
    assert!(!h.session.is_saving("pages/about"));
}

#[tokio::test]
async fn test_missing_document_is_reported_locally() {
    let h = harness(Principal::editor("admin@pharmasite.test"));
    let mut listener = h.bus.subscribe();

    let failure = h
        .session
        .rename_category("gone", &CategoryForm { name: "Syrups".to_string() })
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::NotFound);
    assert_eq!(failure.notification.title, "Update Failed");
    assert!(listener.try_recv().is_err());
}

#[tokio::test]
async fn test_second_submit_while_saving_is_refused() {
    let h = harness(Principal::editor("admin@pharmasite.test"));
    let saving = SavingSet::new();
    let session = EditSession::new(Arc::new(h.store.client(Principal::editor("a@x.com"))), h.bus.clone())
        .with_saving(saving.clone());

    let held = saving.begin("products/new").unwrap();
    let failure = session.save_product(&paracetamol(), None).await.unwrap_err();
    assert!(matches!(failure.error, SaveError::AlreadySaving(_)));
    assert_eq!(h.store.count("products"), 0);

    drop(held);
    assert!(session.save_product(&paracetamol(), None).await.is_ok());
}

#[tokio::test]
async fn test_hung_write_times_out_and_clears_saving() {
    let store = ContentStore::in_memory(AccessRules::default());
    let session = EditSession::new(
        Arc::new(HangingStore(store.client(Principal::editor("a@x.com")))),
        ErrorBus::new(),
    )
    .with_write_timeout(Duration::from_millis(50));

    let failure = session.add_category(&CategoryForm { name: "Tablets".into() }).await.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::Unknown);
    assert_eq!(failure.notification.title, "Add Failed");
    assert!(!session.is_saving("productCategories/new"));
}

#[tokio::test]
async fn test_optimistic_delete_restores_on_rejection() {
    let store = ContentStore::in_memory(AccessRules::default());
    let editor = store.client(Principal::editor("a@x.com"));
    let mut category = Fields::new();
    category.insert("name".into(), json!("Tablets"));
    let id = editor.create_document("productCategories", category).await.unwrap();

    let mut list = OptimisticList::new(vec![ProductCategory {
        id: id.clone(),
        name: "Tablets".to_string(),
    }]);
    let path = DocPath::new("productCategories", id.as_str()).unwrap();

    // A viewer's delete is refused and the item comes back
    let viewer = EditSession::new(Arc::new(store.client(Principal::viewer("v@x.com"))), ErrorBus::new());
    let pending = list.begin_delete(delete_plan(path.clone(), "Category"));
    assert!(list.is_empty());
    let settled = viewer.delete_optimistically(pending).await;
    list.settle(&settled);
    let failure = settled.into_result().unwrap_err();
    assert_eq!(failure.notification.title, "Delete Failed");
    assert_eq!(list.len(), 1);

    // An editor's delete sticks
    let admin = EditSession::new(Arc::new(editor), ErrorBus::new());
    let pending = list.begin_delete(delete_plan(path, "Category"));
    let settled = admin.delete_optimistically(pending).await;
    list.settle(&settled);
    assert!(settled.into_result().is_ok());
    assert!(list.is_empty());
    assert_eq!(store.count("productCategories"), 0);
}

#[tokio::test]
async fn test_item_stays_hidden_while_delete_is_in_flight() {
    let store = ContentStore::in_memory(AccessRules::default());
    let session = EditSession::new(
        Arc::new(HangingStore(store.client(Principal::editor("a@x.com")))),
        ErrorBus::new(),
    )
    .with_write_timeout(Duration::from_millis(100));

    let mut list = OptimisticList::new(vec![
        ProductCategory {
            id: "c1".to_string(),
            name: "Tablets".to_string(),
        },
        ProductCategory {
            id: "c2".to_string(),
            name: "Syrups".to_string(),
        },
    ]);
    let path = DocPath::new("productCategories", "c1").unwrap();
    let pending = list.begin_delete(delete_plan(path, "Category"));

    let delete = session.delete_optimistically(pending);
    tokio::pin!(delete);

    // The store has not answered yet, and the list is readable meanwhile
    assert!(tokio::time::timeout(Duration::from_millis(10), &mut delete).await.is_err());
    let visible: Vec<_> = list.visible().into_iter().map(|c| c.id).collect();
    assert_eq!(visible, vec!["c2"]);
    assert!(list.is_pending("c1"));

    let settled = delete.await;
    list.settle(&settled);
    assert_eq!(settled.result().as_ref().unwrap_err().kind(), FailureKind::Unknown);
    assert_eq!(list.len(), 2);
    assert!(!list.is_pending("c1"));
}

#[tokio::test]
async fn test_blog_update_keeps_original_date() {
    let h = harness(Principal::editor("admin@pharmasite.test"));
    let form = BlogPostForm {
        title: "New Plant Opens".to_string(),
        author: "Editorial".to_string(),
        category: "News".to_string(),
        summary: "A new facility in Nagpur.".to_string(),
        content: "We have opened a new manufacturing facility.".to_string(),
        image_url: String::new(),
    };

    let id = h.session.save_blog_post(&form, None).await.unwrap().id.unwrap();
    let path = DocPath::new("blogs", id.as_str()).unwrap();
    let service = h.store.client(Principal::Service);
    let created = service.get_document(&path).await.unwrap().unwrap();

    let edited = BlogPostForm {
        title: "New Plant Now Open".to_string(),
        ..form
    };
    h.session.save_blog_post(&edited, Some(&id)).await.unwrap();

    let updated = service.get_document(&path).await.unwrap().unwrap();
    assert_eq!(updated.data["date"], created.data["date"]);
    assert_eq!(updated.data["slug"], "new-plant-now-open");
}

#[tokio::test]
async fn test_settings_save_reloads() {
    let h = harness(Principal::editor("admin@pharmasite.test"));
    let settings = pharmasite_common::defaults::footer_settings();

    let saved = h.session.save_footer_settings(&settings).await.unwrap();
    assert_eq!(saved.next, NextStep::Reload);
    assert_eq!(saved.notification.description, "Footer settings have been updated.");
}
