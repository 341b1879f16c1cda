//! The shared document store every client talks to.
//!
//! ## State
//!
//! Documents live in memory as `collection -> id -> fields` behind one lock.
//! With a file backend the whole map is snapshotted to a JSON file after every
//! mutation, while the write lock is still held, so the file and memory never
//! disagree about a committed write. A failed snapshot rolls the mutation back.
//!
//! ## Changes
//!
//! Every committed mutation is announced on a broadcast channel after the lock
//! is released. Publishers never wait: receivers that fall behind are told
//! they lagged and refetch.

use crate::client::StoreClient;
use crate::document::{deep_merge, Document, Fields};
use crate::error::{StoreError, StoreResult};
use crate::rules::{AccessRules, Principal};
use pharmasite_common::DocPath;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const CHANGE_CAPACITY: usize = 256;

pub(crate) type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Written,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub path: DocPath,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
}

/// A single mutation of one document
#[derive(Debug, Clone)]
pub(crate) enum Change {
    /// Replace the whole document
    Set(Fields),
    /// Deep-merge into the document, creating it if absent
    Merge(Fields),
    /// Shallow field update of an existing document
    Update(Fields),
    Delete,
}

pub struct ContentStore {
    state: RwLock<Collections>,
    rules: AccessRules,
    backend: StoreBackend,
    changes: broadcast::Sender<ChangeEvent>,
    active: Arc<AtomicUsize>,
}

impl ContentStore {
    pub fn in_memory(rules: AccessRules) -> Arc<Self> {
        Arc::new(Self::with_state(Collections::new(), rules, StoreBackend::Memory))
    }

    /// Open a file-backed store, loading the file when it exists
    pub fn open(path: impl Into<PathBuf>, rules: AccessRules) -> StoreResult<Arc<Self>> {
        let path = path.into();
        let state = if path.exists() {
            read_snapshot(&path)?
        } else {
            Collections::new()
        };

        info!(path = %path.display(), collections = state.len(), "Opened content store");
        Ok(Arc::new(Self::with_state(state, rules, StoreBackend::File(path))))
    }

    fn with_state(state: Collections, rules: AccessRules, backend: StoreBackend) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            state: RwLock::new(state),
            rules,
            backend,
            changes,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle acting on behalf of `principal`
    pub fn client(self: &Arc<Self>, principal: Principal) -> StoreClient {
        StoreClient::new(Arc::clone(self), principal)
    }

    pub fn rules(&self) -> &AccessRules {
        &self.rules
    }

    pub fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    /// Number of subscriptions that have not been released yet
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn active_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.active)
    }

    pub(crate) fn read(&self, path: &DocPath) -> Option<Document> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .map(|data| Document::new(path.clone(), data.clone()))
    }

    pub(crate) fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let Some(docs) = state.get(collection) else {
            return Ok(Vec::new());
        };

        docs.iter()
            .map(|(id, data)| Ok(Document::new(DocPath::new(collection, id.as_str())?, data.clone())))
            .collect()
    }

    /// Document count of one collection
    pub fn count(&self, collection: &str) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.get(collection).map(BTreeMap::len).unwrap_or(0)
    }

    pub fn contains(&self, path: &DocPath) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .get(path.collection())
            .is_some_and(|docs| docs.contains_key(path.id()))
    }

    /// Apply one change and announce it. Access rules are checked by the caller.
    pub(crate) fn apply(&self, path: &DocPath, change: Change) -> StoreResult<()> {
        let kind = {
            let mut state = self.write_state();
            let docs = state.entry(path.collection().to_string()).or_default();
            let previous = docs.get(path.id()).cloned();

            let next = match (change, previous.clone()) {
                (Change::Delete, None) => {
                    debug!(path = %path, "Delete of absent document");
                    return Ok(());
                }
                (Change::Delete, Some(_)) => None,
                (Change::Set(data), _) => Some(data),
                (Change::Merge(patch), existing) => {
                    let mut merged = existing.unwrap_or_default();
                    deep_merge(&mut merged, patch);
                    Some(merged)
                }
                (Change::Update(_), None) => return Err(StoreError::NotFound(path.to_string())),
                (Change::Update(fields), Some(mut existing)) => {
                    existing.extend(fields);
                    Some(existing)
                }
            };

            let kind = match next {
                Some(data) => {
                    docs.insert(path.id().to_string(), data);
                    ChangeKind::Written
                }
                None => {
                    docs.remove(path.id());
                    ChangeKind::Deleted
                }
            };

            if let Err(e) = self.persist(&state) {
                warn!(path = %path, error = %e, "Persisting store failed, rolling back");
                let docs = state.entry(path.collection().to_string()).or_default();
                match previous {
                    Some(data) => docs.insert(path.id().to_string(), data),
                    None => docs.remove(path.id()),
                };
                return Err(e);
            }

            kind
        };

        self.announce(ChangeEvent {
            path: path.clone(),
            kind,
        });
        Ok(())
    }

    /// Reload a file-backed store from disk and announce every document that
    /// differs from what was in memory. Returns the number of changed documents.
    pub fn reload_from_disk(&self) -> StoreResult<usize> {
        let StoreBackend::File(file) = &self.backend else {
            return Ok(0);
        };

        let events = {
            let mut state = self.write_state();
            if !file.exists() {
                return Ok(0);
            }
            let fresh = read_snapshot(file)?;
            let events = diff(&state, &fresh)?;
            *state = fresh;
            events
        };

        if !events.is_empty() {
            info!(changed = events.len(), "Reloaded content store from disk");
        }

        let changed = events.len();
        for event in events {
            self.announce(event);
        }
        Ok(changed)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Collections> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn announce(&self, event: ChangeEvent) {
        debug!(path = %event.path, kind = ?event.kind, "Document changed");
        // No receivers is fine
        let _ = self.changes.send(event);
    }

    /// Snapshot every collection to the data file. Runs synchronously on the
    /// caller's thread under the write lock, so a write returns only once it
    /// is on disk. Each write rewrites the whole file; move this onto
    /// `spawn_blocking` with a single writer task if write volume grows.
    fn persist(&self, state: &Collections) -> StoreResult<()> {
        let StoreBackend::File(path) = &self.backend else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = temp_path(path);
        std::fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_snapshot(path: &Path) -> StoreResult<Collections> {
    let bytes = std::fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Collections::new());
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn diff(old: &Collections, new: &Collections) -> StoreResult<Vec<ChangeEvent>> {
    let names: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    let mut events = Vec::new();

    for collection in names {
        let before = old.get(collection);
        let after = new.get(collection);
        let ids: BTreeSet<&String> = before
            .into_iter()
            .flat_map(BTreeMap::keys)
            .chain(after.into_iter().flat_map(BTreeMap::keys))
            .collect();

        for id in ids {
            let was = before.and_then(|d| d.get(id));
            let now = after.and_then(|d| d.get(id));
            if was == now {
                continue;
            }
            let kind = if now.is_some() {
                ChangeKind::Written
            } else {
                ChangeKind::Deleted
            };
            events.push(ChangeEvent {
                path: DocPath::new(collection.as_str(), id.as_str())?,
                kind,
            });
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn path(raw: &str) -> DocPath {
        DocPath::parse(raw).unwrap()
    }

    #[test]
    fn test_apply_and_read() {
        let store = ContentStore::in_memory(AccessRules::open());
        store
            .apply(&path("pages/home"), Change::Set(fields(json!({ "title": "Home" }))))
            .unwrap();

        let doc = store.read(&path("pages/home")).unwrap();
        assert_eq!(doc.data["title"], "Home");
        assert_eq!(store.count("pages"), 1);
        assert!(store.contains(&path("pages/home")));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = ContentStore::in_memory(AccessRules::open());
        let err = store
            .apply(&path("products/nope"), Change::Update(fields(json!({ "name": "x" }))))
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("products/nope".to_string()));
    }

    #[test]
    fn test_change_is_announced() {
        let store = ContentStore::in_memory(AccessRules::open());
        let mut rx = store.subscribe_changes();

        store
            .apply(&path("pages/about"), Change::Merge(fields(json!({ "title": "About" }))))
            .unwrap();
        store.apply(&path("pages/about"), Change::Delete).unwrap();
        // Absent delete announces nothing
        store.apply(&path("pages/about"), Change::Delete).unwrap();

        assert_eq!(rx.try_recv().unwrap().kind, ChangeKind::Written);
        assert_eq!(rx.try_recv().unwrap().kind, ChangeKind::Deleted);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_diff_reports_only_changed_documents() {
        let mut old = Collections::new();
        let pages = old.entry("pages".into()).or_default();
        pages.insert("home".into(), fields(json!({ "title": "Home" })));
        pages.insert("about".into(), fields(json!({ "title": "About" })));
        pages.insert("quality".into(), fields(json!({ "title": "Quality" })));

        let mut new = old.clone();
        let pages = new.get_mut("pages").unwrap();
        pages.insert("about".into(), fields(json!({ "title": "About us" })));
        pages.remove("home");

        let events = diff(&old, &new).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .any(|e| e.path.id() == "about" && e.kind == ChangeKind::Written));
        assert!(events
            .iter()
            .any(|e| e.path.id() == "home" && e.kind == ChangeKind::Deleted));
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/data/content.json")),
            PathBuf::from("/data/content.json.tmp")
        );
    }
}
