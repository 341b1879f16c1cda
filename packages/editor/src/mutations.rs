//! # Store Mutations
//!
//! The four writes an admin flow can issue. Each one knows the resource it
//! targets and the operation kind reported when the store rejects it.
//!
//! ## Mutation Semantics
//!
//! ### Create
//! - New document with a generated id in `collection`
//!
//! ### Update
//! - Shallow field update; fails with not-found when the document is gone
//!
//! ### Merge
//! - Deep merge into a singleton, creating it when absent
//!
//! ### Delete
//! - Removes exactly one document; absent documents are not an error

use pharmasite_common::DocPath;
use pharmasite_store::{DocumentStore, Fields, Operation, StoreResult, WriteOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    Create { collection: String, data: Fields },
    Update { path: DocPath, data: Fields },
    Merge { path: DocPath, data: Fields },
    Delete { path: DocPath },
}

/// What a successful mutation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Created(String),
    Applied,
}

impl MutationOutcome {
    pub fn created_id(&self) -> Option<&str> {
        match self {
            MutationOutcome::Created(id) => Some(id),
            MutationOutcome::Applied => None,
        }
    }
}

impl Mutation {
    /// Operation kind carried by permission-error events
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Create { .. } => Operation::Create,
            Mutation::Update { .. } => Operation::Update,
            Mutation::Merge { .. } => Operation::Write,
            Mutation::Delete { .. } => Operation::Delete,
        }
    }

    /// Collection for creates, document path otherwise
    pub fn resource_path(&self) -> String {
        match self {
            Mutation::Create { collection, .. } => collection.clone(),
            Mutation::Update { path, .. } | Mutation::Merge { path, .. } | Mutation::Delete { path } => {
                path.to_string()
            }
        }
    }

    /// The data the caller tried to write, if any
    pub fn payload(&self) -> Option<Value> {
        match self {
            Mutation::Create { data, .. } | Mutation::Update { data, .. } | Mutation::Merge { data, .. } => {
                Some(Value::Object(data.clone()))
            }
            Mutation::Delete { .. } => None,
        }
    }

    pub async fn execute(&self, store: &dyn DocumentStore) -> StoreResult<MutationOutcome> {
        match self {
            Mutation::Create { collection, data } => store
                .create_document(collection, data.clone())
                .await
                .map(MutationOutcome::Created),
            Mutation::Update { path, data } => {
                store.update_document(path, data.clone()).await?;
                Ok(MutationOutcome::Applied)
            }
            Mutation::Merge { path, data } => {
                store.write_document(path, data.clone(), WriteOptions::merge()).await?;
                Ok(MutationOutcome::Applied)
            }
            Mutation::Delete { path } => {
                store.delete_document(path).await?;
                Ok(MutationOutcome::Applied)
            }
        }
    }
}
