//! # Pharmasite Editor
//!
//! Everything between an admin form and the content store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ form: validated locally (FieldErrors)       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ EditSession: saving guard + Mutation        │
//! │  - bounded by a write timeout               │
//! │  - Notification + NextStep on success       │
//! │  - rejections published on the ErrorBus     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: access rules, change broadcast       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmasite_editor::{EditSession, ErrorBus, ProductForm};
//!
//! let session = EditSession::new(Arc::new(store.client(principal)), bus.clone());
//! match session.save_product(&form, None).await {
//!     Ok(saved) => redirect(saved.next),
//!     Err(failure) => toast(failure.notification),
//! }
//! ```

mod content;
mod errors;
mod events;
mod forms;
mod live_edit;
mod mutations;
mod optimistic;
mod seed;
mod session;
mod validation;

pub use content::{blog_document, delete_plan, page_document, product_document, BLOG_LIST, PRODUCT_LIST};
pub use errors::{FailureKind, SaveError};
pub use events::{ErrorBus, PermissionErrorEvent};
pub use forms::{
    BlogPostForm, CategoryForm, ContactForm, ContentSuggestionRequest, PageContent, ProductForm,
    SourcingRequest,
};
pub use live_edit::{edit_affordance, resolve_editor_path, EditAffordance, FALLBACK_EDITOR};
pub use mutations::{Mutation, MutationOutcome};
pub use optimistic::{OptimisticList, PendingDelete, SettledDelete};
pub use seed::seed_defaults;
pub use session::{
    EditSession, NextStep, Notification, SaveFailure, SavePlan, SaveResult, Saved, SavingGuard,
    SavingSet, Variant, DEFAULT_WRITE_TIMEOUT,
};
pub use validation::{is_email, FieldErrors, Validate};
