//! # Edit Session
//!
//! One editor's handle for saving: their store client, the shared error bus,
//! the set of forms currently saving, and a write timeout.
//!
//! Every save runs the same steps in order:
//!
//! 1. validate the form; stop with field errors before touching the store
//! 2. mark the form as saving; a second submit is refused
//! 3. issue the mutation, bounded by the write timeout
//! 4. on success, report and say where to go next
//! 5. on failure, report; a permission rejection is also published on the bus
//! 6. clear the saving mark, whatever happened above

use crate::errors::{FailureKind, SaveError};
use crate::events::{ErrorBus, PermissionErrorEvent};
use crate::mutations::{Mutation, MutationOutcome};
use crate::optimistic::{PendingDelete, SettledDelete};
use crate::validation::Validate;
use pharmasite_common::CommonError;
use pharmasite_store::{DocumentStore, StoreError};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

pub const PERMISSION_TEXT: &str = "You do not have permission to save these changes.";
pub const DELETE_PERMISSION_TEXT: &str = "You do not have permission to delete this item.";
pub const NOT_FOUND_TEXT: &str = "This item no longer exists. Refresh the page and try again.";
pub const UNKNOWN_TEXT: &str = "An unexpected error occurred. Please try again.";
pub const BUSY_TEXT: &str = "A save is already in progress.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

/// User-facing toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }
}

/// What the admin UI does after a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "to", rename_all = "lowercase")]
pub enum NextStep {
    Navigate(String),
    /// Re-derive every dependent view from the store
    Reload,
    Stay,
}

/// A mutation plus how to report it
#[derive(Debug, Clone)]
pub struct SavePlan {
    /// Key of the saving indicator this save holds
    pub form: String,
    pub mutation: Mutation,
    pub success: Notification,
    pub failure_title: String,
    pub next: NextStep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub notification: Notification,
    pub next: NextStep,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveFailure {
    pub error: SaveError,
    pub notification: Notification,
}

impl SaveFailure {
    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

pub type SaveResult = Result<Saved, SaveFailure>;

/// Forms with a save in flight
#[derive(Debug, Clone, Default)]
pub struct SavingSet(Arc<Mutex<HashSet<String>>>);

impl SavingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `form` as saving; `None` if it already is
    pub fn begin(&self, form: &str) -> Option<SavingGuard> {
        let mut forms = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if !forms.insert(form.to_string()) {
            return None;
        }
        Some(SavingGuard {
            set: self.clone(),
            form: form.to_string(),
        })
    }

    pub fn is_saving(&self, form: &str) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(form)
    }
}

/// Clears the saving mark when dropped
#[derive(Debug)]
pub struct SavingGuard {
    set: SavingSet,
    form: String,
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        self.set
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.form);
    }
}

pub struct EditSession {
    store: Arc<dyn DocumentStore>,
    bus: ErrorBus,
    saving: SavingSet,
    write_timeout: Duration,
}

impl EditSession {
    pub fn new(store: Arc<dyn DocumentStore>, bus: ErrorBus) -> Self {
        Self {
            store,
            bus,
            saving: SavingSet::new(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Share a saving set across sessions (one per user, say)
    pub fn with_saving(mut self, saving: SavingSet) -> Self {
        self.saving = saving;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn store(&self) -> &dyn DocumentStore {
        &*self.store
    }

    pub fn bus(&self) -> &ErrorBus {
        &self.bus
    }

    pub fn is_saving(&self, form: &str) -> bool {
        self.saving.is_saving(form)
    }

    /// Validate `form`, then build and run its plan
    pub async fn save<F, B>(&self, form: &F, build: B) -> SaveResult
    where
        F: Validate,
        B: FnOnce(&F) -> Result<SavePlan, CommonError>,
    {
        if let Err(errors) = form.validate() {
            return Err(SaveFailure {
                error: SaveError::Validation(errors),
                notification: Notification::destructive(
                    "Validation Failed",
                    "Please check the highlighted fields.",
                ),
            });
        }

        let plan = build(form).map_err(|e| {
            error!(error = %e, "Could not build document from a valid form");
            SaveFailure {
                error: SaveError::Build(e),
                notification: Notification::destructive("Save Failed", UNKNOWN_TEXT),
            }
        })?;

        self.run(plan).await
    }

    /// Run a plan that needs no validation (deletes, settings already checked)
    pub async fn run(&self, plan: SavePlan) -> SaveResult {
        let Some(_saving) = self.saving.begin(&plan.form) else {
            return Err(SaveFailure {
                error: SaveError::AlreadySaving(plan.form.clone()),
                notification: Notification::destructive(plan.failure_title, BUSY_TEXT),
            });
        };

        match self.execute(&plan.mutation).await {
            Ok(outcome) => {
                info!(
                    path = %plan.mutation.resource_path(),
                    operation = %plan.mutation.operation(),
                    "Saved"
                );
                Ok(Saved {
                    notification: plan.success,
                    next: plan.next,
                    id: outcome.created_id().map(str::to_string),
                })
            }
            Err(e) => Err(self.fail(&plan.mutation, plan.failure_title, e)),
        }
    }

    /// Send a delete whose item `OptimisticList::begin_delete` already hid.
    /// The list is not borrowed while the store call runs; hand the answer
    /// to `OptimisticList::settle`.
    pub async fn delete_optimistically(&self, pending: PendingDelete) -> SettledDelete {
        let PendingDelete { id, plan } = pending;
        let result = self.run(plan).await;
        SettledDelete { id, result }
    }

    async fn execute(&self, mutation: &Mutation) -> Result<MutationOutcome, StoreError> {
        match tokio::time::timeout(self.write_timeout, mutation.execute(&*self.store)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unknown(format!(
                "write to {} timed out after {:?}",
                mutation.resource_path(),
                self.write_timeout
            ))),
        }
    }

    fn fail(&self, mutation: &Mutation, title: String, e: StoreError) -> SaveFailure {
        let error = SaveError::Store(e);

        let description = match error.kind() {
            FailureKind::PermissionDenied => {
                self.bus.publish(PermissionErrorEvent::new(
                    mutation.resource_path(),
                    mutation.operation(),
                    mutation.payload(),
                ));
                if matches!(mutation, Mutation::Delete { .. }) {
                    DELETE_PERMISSION_TEXT
                } else {
                    PERMISSION_TEXT
                }
            }
            FailureKind::NotFound => {
                warn!(path = %mutation.resource_path(), "Save target vanished");
                NOT_FOUND_TEXT
            }
            _ => {
                error!(
                    path = %mutation.resource_path(),
                    operation = %mutation.operation(),
                    error = %error,
                    "Save failed"
                );
                UNKNOWN_TEXT
            }
        };

        SaveFailure {
            error,
            notification: Notification::destructive(title, description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saving_guard_clears_on_drop() {
        let set = SavingSet::new();
        let guard = set.begin("pages/about").unwrap();
        assert!(set.is_saving("pages/about"));
        assert!(set.begin("pages/about").is_none());
        assert!(set.begin("pages/home").is_some());

        drop(guard);
        assert!(!set.is_saving("pages/about"));
    }

    #[test]
    fn test_next_step_wire_shape() {
        let json = serde_json::to_value(NextStep::Navigate("/admin/products".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "navigate", "to": "/admin/products" }));
        let json = serde_json::to_value(NextStep::Reload).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "reload" }));
    }
}
