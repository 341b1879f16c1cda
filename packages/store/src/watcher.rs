//! Reloads a file-backed store when its data file is edited from outside.

use crate::store::{ContentStore, StoreBackend};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to create watcher: {0}")]
    CreateError(#[from] notify::Error),

    #[error("Store is not file-backed")]
    NotFileBacked,
}

pub type WatcherResult<T> = Result<T, WatcherError>;

/// Keeps the store in sync with its data file until dropped
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    _thread: JoinHandle<()>,
}

impl StoreWatcher {
    pub fn start(store: Arc<ContentStore>) -> WatcherResult<Self> {
        let StoreBackend::File(file) = store.backend().clone() else {
            return Err(WatcherError::NotFileBacked);
        };

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        // The file is replaced by rename, so watch its directory
        let dir = watched_dir(&file);
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let name = file.file_name().map(OsString::from).unwrap_or_default();
        let thread = thread::spawn(move || reload_loop(store, rx, name));

        Ok(Self {
            _watcher: watcher,
            _thread: thread,
        })
    }
}

fn watched_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn touches(event: &Event, name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some_and(|n| n == name.as_os_str()))
}

/// Ends once the notify watcher (and with it the sender) is dropped
fn reload_loop(store: Arc<ContentStore>, rx: Receiver<notify::Result<Event>>, name: OsString) {
    while let Ok(res) = rx.recv() {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "File watch error");
                continue;
            }
        };

        if !touches(&event, &name) || event.kind.is_access() {
            continue;
        }

        match store.reload_from_disk() {
            Ok(0) => {}
            Ok(changed) => debug!(changed, "Applied external edits"),
            Err(e) => warn!(error = %e, "Ignoring unreadable data file"),
        }
    }
}
