//! Live subscriptions to a document or a collection query.
//!
//! Each subscription is a task that listens to the store's change broadcast
//! and republishes fresh snapshots into a `watch` channel. The handle owns the
//! task: dropping it (or calling [`Subscription::unsubscribe`]) aborts the task
//! and releases the slot counted by `ContentStore::active_subscriptions`.

use crate::error::StoreResult;
use crate::store::{ChangeEvent, ContentStore};
use futures::stream::{self, Stream};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// One observed state of a subscription
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<T> {
    pub data: T,
    pub is_loading: bool,
    /// Set when the latest refetch failed; `data` keeps the last good value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Snapshot<T> {
    pub fn loading(data: T) -> Self {
        Self {
            data,
            is_loading: true,
            error: None,
        }
    }

    pub fn ready(data: T) -> Self {
        Self {
            data,
            is_loading: false,
            error: None,
        }
    }
}

/// Counts a live subscription until dropped
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Subscription<T> {
    receiver: watch::Receiver<Snapshot<T>>,
    task: JoinHandle<()>,
    _guard: ActiveGuard,
}

pub type DocumentSubscription = Subscription<Option<crate::Document>>;
pub type CollectionSubscription = Subscription<Vec<crate::Document>>;

impl<T> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a subscription task. The change receiver is taken before the
    /// initial fetch so no change between fetch and listen can be missed.
    pub(crate) fn spawn<R, F>(store: Arc<ContentStore>, initial: T, relevant: R, fetch: F) -> Self
    where
        R: Fn(&ChangeEvent) -> bool + Send + 'static,
        F: Fn(&ContentStore) -> StoreResult<T> + Send + 'static,
    {
        let mut changes = store.subscribe_changes();
        let (sender, receiver) = watch::channel(Snapshot::loading(initial));
        let guard = ActiveGuard::new(store.active_counter());

        let task = tokio::spawn(async move {
            publish(&sender, fetch(&store));

            loop {
                match changes.recv().await {
                    Ok(event) if relevant(&event) => publish(&sender, fetch(&store)),
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Subscription lagged, refetching");
                        publish(&sender, fetch(&store));
                    }
                    Err(RecvError::Closed) => break,
                }

                if sender.is_closed() {
                    break;
                }
            }
        });

        Self {
            receiver,
            task,
            _guard: guard,
        }
    }

    /// Latest snapshot without waiting
    pub fn current(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next snapshot
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the initial fetch has completed
    pub async fn loaded(&mut self) -> Option<Snapshot<T>> {
        let snapshot = self.receiver.wait_for(|s| !s.is_loading).await.ok()?;
        Some(snapshot.clone())
    }

    pub fn unsubscribe(self) {}

    /// Current snapshot followed by every later one
    pub fn into_stream(mut self) -> impl Stream<Item = Snapshot<T>> {
        let first = self.receiver.borrow_and_update().clone();

        stream::unfold((self, Some(first)), |(mut sub, pending)| async move {
            match pending {
                Some(snapshot) => Some((snapshot, (sub, None))),
                None => {
                    let snapshot = sub.next().await?;
                    Some((snapshot, (sub, None)))
                }
            }
        })
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn publish<T>(sender: &watch::Sender<Snapshot<T>>, result: StoreResult<T>) {
    match result {
        Ok(data) => {
            sender.send_replace(Snapshot::ready(data));
        }
        Err(e) => sender.send_modify(|snapshot| {
            snapshot.is_loading = false;
            snapshot.error = Some(e.to_string());
        }),
    }
}
