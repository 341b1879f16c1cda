//! Access rules evaluated by the store for every call.

use crate::document::Document;
use crate::error::{Operation, StoreError, StoreResult};
use pharmasite_common::path::{CONTACT_MESSAGES, SETTINGS};
use pharmasite_common::DocPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
}

/// Who a store call is made on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Principal {
    Anonymous,
    User { email: String, role: Role },
    /// Trusted in-process callers (seeding, CLI)
    Service,
}

impl Principal {
    pub fn editor(email: impl Into<String>) -> Self {
        Principal::User {
            email: email.into(),
            role: Role::Editor,
        }
    }

    pub fn viewer(email: impl Into<String>) -> Self {
        Principal::User {
            email: email.into(),
            role: Role::Viewer,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Principal::Anonymous)
    }

    pub fn can_edit(&self) -> bool {
        matches!(
            self,
            Principal::Service
                | Principal::User {
                    role: Role::Editor,
                    ..
                }
        )
    }
}

#[derive(Debug, Clone)]
pub struct AccessRules {
    enforced: bool,
    /// Collections readable only by authenticated principals
    private_collections: BTreeSet<String>,
    /// Single documents readable only by authenticated principals
    private_documents: BTreeSet<String>,
    /// Collections that accept `create` from anyone
    open_create: BTreeSet<String>,
}

impl Default for AccessRules {
    fn default() -> Self {
        Self {
            enforced: true,
            private_collections: [CONTACT_MESSAGES.to_string()].into(),
            private_documents: [format!("{}/admin", SETTINGS)].into(),
            open_create: [CONTACT_MESSAGES.to_string()].into(),
        }
    }
}

impl AccessRules {
    /// Rules that let every principal do everything
    pub fn open() -> Self {
        Self {
            enforced: false,
            private_collections: BTreeSet::new(),
            private_documents: BTreeSet::new(),
            open_create: BTreeSet::new(),
        }
    }

    /// `target` is either `collection` or `collection/id`
    pub fn check(&self, principal: &Principal, operation: Operation, target: &str) -> StoreResult<()> {
        if self.allows(principal, operation, target) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                path: target.to_string(),
                operation,
            })
        }
    }

    pub fn allows(&self, principal: &Principal, operation: Operation, target: &str) -> bool {
        if !self.enforced || matches!(principal, Principal::Service) {
            return true;
        }

        let collection = target.split('/').next().unwrap_or(target);

        if operation.is_read() {
            let private = self.private_collections.contains(collection)
                || self.private_documents.contains(target);
            return !private || principal.is_authenticated();
        }

        if operation == Operation::Create && self.open_create.contains(collection) {
            return true;
        }

        principal.can_edit()
    }

    /// Whether `principal` may see the document at `path` in a listing.
    /// A collection-level `List` grant does not cover private documents.
    pub fn can_read_doc(&self, principal: &Principal, path: &DocPath) -> bool {
        self.allows(principal, Operation::Get, &path.to_string())
    }

    /// Drop the documents `principal` may not read
    pub fn readable(&self, principal: &Principal, docs: Vec<Document>) -> Vec<Document> {
        docs.into_iter()
            .filter(|doc| self.can_read_doc(principal, &doc.path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_reads() {
        let rules = AccessRules::default();
        assert!(rules.allows(&Principal::Anonymous, Operation::Get, "pages/about"));
        assert!(rules.allows(&Principal::Anonymous, Operation::List, "products"));
        assert!(!rules.allows(&Principal::Anonymous, Operation::Get, "settings/admin"));
        assert!(!rules.allows(&Principal::Anonymous, Operation::List, "contactMessages"));
        assert!(rules.allows(&Principal::viewer("v@x.com"), Operation::Get, "settings/admin"));
    }

    #[test]
    fn test_writes_need_editor() {
        let rules = AccessRules::default();
        assert!(!rules.allows(&Principal::Anonymous, Operation::Write, "pages/about"));
        assert!(!rules.allows(&Principal::viewer("v@x.com"), Operation::Delete, "products/p1"));
        assert!(rules.allows(&Principal::editor("e@x.com"), Operation::Update, "products/p1"));
        assert!(rules.allows(&Principal::Service, Operation::Write, "settings/admin"));
    }

    #[test]
    fn test_anonymous_contact_create_only() {
        let rules = AccessRules::default();
        assert!(rules.allows(&Principal::Anonymous, Operation::Create, "contactMessages"));
        assert!(!rules.allows(&Principal::Anonymous, Operation::Delete, "contactMessages/m1"));
    }

    #[test]
    fn test_check_reports_path_and_operation() {
        let err = AccessRules::default()
            .check(&Principal::Anonymous, Operation::Write, "pages/home")
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::PermissionDenied {
                path: "pages/home".to_string(),
                operation: Operation::Write
            }
        );
    }

    #[test]
    fn test_private_documents_hidden_from_anonymous_listing() {
        let rules = AccessRules::default();
        let docs = vec![
            Document::new(DocPath::new("settings", "website").unwrap(), Default::default()),
            Document::new(DocPath::new("settings", "admin").unwrap(), Default::default()),
        ];

        let visible = rules.readable(&Principal::Anonymous, docs.clone());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].path.id(), "website");
        assert_eq!(rules.readable(&Principal::viewer("v@x.com"), docs).len(), 2);
    }

    #[test]
    fn test_open_rules() {
        let rules = AccessRules::open();
        assert!(rules.allows(&Principal::Anonymous, Operation::Delete, "settings/admin"));
    }
}
