//! Optimistic list state for admin list views.
//!
//! The visible list is the last synced snapshot minus removals still waiting
//! on the store. The snapshot stays the source of truth: a resync replaces it
//! wholesale, so a failed delete can never leave the view permanently wrong.

use crate::mutations::Mutation;
use crate::session::{SavePlan, SaveResult};
use pharmasite_common::Keyed;
use std::collections::BTreeSet;

/// A delete whose item is already hidden, not yet sent to the store
#[derive(Debug)]
pub struct PendingDelete {
    pub(crate) id: String,
    pub(crate) plan: SavePlan,
}

impl PendingDelete {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A delete the store has answered
#[derive(Debug)]
pub struct SettledDelete {
    pub(crate) id: String,
    pub(crate) result: SaveResult,
}

impl SettledDelete {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn result(&self) -> &SaveResult {
        &self.result
    }

    pub fn into_result(self) -> SaveResult {
        self.result
    }
}

#[derive(Debug, Clone)]
pub struct OptimisticList<T> {
    synced: Vec<T>,
    pending_removals: BTreeSet<String>,
}

impl<T> Default for OptimisticList<T> {
    fn default() -> Self {
        Self {
            synced: Vec::new(),
            pending_removals: BTreeSet::new(),
        }
    }
}

impl<T: Keyed + Clone> OptimisticList<T> {
    pub fn new(snapshot: Vec<T>) -> Self {
        Self {
            synced: snapshot,
            pending_removals: BTreeSet::new(),
        }
    }

    /// Items as the user should see them right now
    pub fn visible(&self) -> Vec<T> {
        self.synced
            .iter()
            .filter(|item| !self.pending_removals.contains(item.key()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.synced
            .iter()
            .filter(|item| !self.pending_removals.contains(item.key()))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending_removals.contains(id)
    }

    /// Hide `id` until the store answers
    pub fn remove(&mut self, id: &str) {
        self.pending_removals.insert(id.to_string());
    }

    /// The store deleted `id`
    pub fn confirm(&mut self, id: &str) {
        if self.pending_removals.remove(id) {
            self.synced.retain(|item| item.key() != id);
        }
    }

    /// The store refused; `id` shows again
    pub fn reject(&mut self, id: &str) {
        self.pending_removals.remove(id);
    }

    /// Hide the item `plan` deletes and hold the plan until it is sent
    pub fn begin_delete(&mut self, plan: SavePlan) -> PendingDelete {
        let id = match &plan.mutation {
            Mutation::Delete { path } => path.id().to_string(),
            other => other.resource_path(),
        };
        self.remove(&id);
        PendingDelete { id, plan }
    }

    /// Apply the store's answer: a success drops the item, a failure shows it again
    pub fn settle(&mut self, settled: &SettledDelete) {
        match settled.result {
            Ok(_) => self.confirm(&settled.id),
            Err(_) => self.reject(&settled.id),
        }
    }

    /// Replace the snapshot with what the store now holds. Removals still in
    /// flight stay hidden; ones for items already gone are dropped.
    pub fn resync(&mut self, snapshot: Vec<T>) {
        self.pending_removals
            .retain(|id| snapshot.iter().any(|item| item.key() == id));
        self.synced = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::delete_plan;
    use crate::errors::SaveError;
    use crate::session::{Notification, SaveFailure};
    use pharmasite_common::{DocPath, ProductCategory};

    fn category(id: &str, name: &str) -> ProductCategory {
        ProductCategory {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn names(list: &OptimisticList<ProductCategory>) -> Vec<String> {
        list.visible().into_iter().map(|c| c.name).collect()
    }

    #[test]
    fn test_remove_hides_immediately() {
        let mut list = OptimisticList::new(vec![category("a", "Tablets"), category("b", "Coatings")]);
        list.remove("a");

        assert_eq!(names(&list), vec!["Coatings"]);
        assert!(list.is_pending("a"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_confirm_drops_from_snapshot() {
        let mut list = OptimisticList::new(vec![category("a", "Tablets")]);
        list.remove("a");
        list.confirm("a");

        assert!(list.is_empty());
        assert!(!list.is_pending("a"));
    }

    #[test]
    fn test_reject_restores() {
        let mut list = OptimisticList::new(vec![category("a", "Tablets"), category("b", "Coatings")]);
        list.remove("a");
        list.reject("a");

        assert_eq!(names(&list), vec!["Tablets", "Coatings"]);
    }

    #[test]
    fn test_resync_heals_and_keeps_in_flight_removals() {
        let mut list = OptimisticList::new(vec![category("a", "Tablets"), category("b", "Coatings")]);
        list.remove("a");
        list.remove("b");

        // The store dropped "b" but still has "a" and a new "c"
        list.resync(vec![category("a", "Tablets"), category("c", "Syrups")]);

        assert_eq!(names(&list), vec!["Syrups"]);
        assert!(list.is_pending("a"));
        assert!(!list.is_pending("b"));

        list.reject("a");
        assert_eq!(names(&list), vec!["Tablets", "Syrups"]);
    }

    #[test]
    fn test_begin_delete_hides_until_settled() {
        let mut list = OptimisticList::new(vec![category("a", "Tablets"), category("b", "Coatings")]);
        let path = DocPath::new("productCategories", "a").unwrap();
        let pending = list.begin_delete(delete_plan(path, "Category"));

        assert_eq!(pending.id(), "a");
        assert_eq!(names(&list), vec!["Coatings"]);

        list.settle(&SettledDelete {
            id: "a".to_string(),
            result: Err(SaveFailure {
                error: SaveError::AlreadySaving("productCategories/a".to_string()),
                notification: Notification::destructive("Delete Failed", "busy"),
            }),
        });
        assert_eq!(names(&list), vec!["Tablets", "Coatings"]);
    }
}
