//! # Pharmasite Store
//!
//! Document store addressed by `collection/id`. Callers go through a
//! [`StoreClient`] bound to a [`Principal`]; the store checks its access rules
//! on every call, announces committed changes, and feeds live subscriptions.

pub mod client;
pub mod document;
pub mod error;
pub mod query;
pub mod rules;
pub mod store;
pub mod subscription;
pub mod watcher;

pub use client::{DocumentStore, StoreClient, WriteOptions};
pub use document::{deep_merge, to_fields, Document, Fields};
pub use error::{ErrorKind, Operation, StoreError, StoreResult};
pub use query::{Direction, Filter, Query};
pub use rules::{AccessRules, Principal, Role};
pub use store::{ChangeEvent, ChangeKind, ContentStore, StoreBackend};
pub use subscription::{CollectionSubscription, DocumentSubscription, Snapshot, Subscription};
pub use watcher::{StoreWatcher, WatcherError};
