//! Server-sent event streams: live document and collection snapshots, and
//! the permission-error bus for the admin debug overlay.
//!
//! Each connection owns one store subscription. When the client goes away
//! the response body is dropped, which drops the stream and releases the
//! subscription.

use crate::auth::CurrentUser;
use crate::error::{api_bad_request, ApiResult};
use crate::state::AppState;
use axum::extract::{Query as QueryParams, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use pharmasite_common::DocPath;
use pharmasite_store::{Direction, Document, DocumentStore, Query, Snapshot};
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

const KEEP_ALIVE: Duration = Duration::from_secs(15);

fn keep_alive() -> KeepAlive {
    KeepAlive::new().interval(KEEP_ALIVE).text("ping")
}

fn snapshot_event<T>(snapshot: Snapshot<T>, data: impl FnOnce(T) -> Value) -> Result<Event, Infallible> {
    let snapshot = Snapshot {
        data: data(snapshot.data),
        is_loading: snapshot.is_loading,
        error: snapshot.error,
    };
    let json = serde_json::to_string(&snapshot).unwrap_or_default();
    Ok(Event::default().event("snapshot").data(json))
}

#[derive(Debug, Deserialize)]
pub struct DocumentParams {
    pub path: String,
}

pub async fn subscribe_document(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(params): QueryParams<DocumentParams>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let path = DocPath::parse(&params.path).map_err(|e| api_bad_request(&e.to_string()))?;
    let subscription = state.store.client(user.0).subscribe_document(&path).await?;
    info!(path = %path, "Document stream opened");

    let stream = subscription
        .into_stream()
        .map(|snapshot| snapshot_event(snapshot, |doc| doc.map_or(Value::Null, |d| d.to_json())));
    Ok(Sse::new(stream).keep_alive(keep_alive()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionParams {
    pub collection: String,
    pub order_by: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    pub limit: Option<usize>,
}

impl CollectionParams {
    fn query(&self) -> ApiResult<Query> {
        let mut query = Query::collection(&self.collection);
        if let Some(field) = self.order_by.as_deref().filter(|f| !f.is_empty()) {
            let direction = match self.direction.as_deref() {
                None | Some("asc") => Direction::Asc,
                Some("desc") => Direction::Desc,
                Some(other) => return Err(api_bad_request(&format!("unknown direction: {}", other))),
            };
            query = query.order_by(field, direction);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        Ok(query)
    }
}

pub async fn subscribe_collection(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(params): QueryParams<CollectionParams>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let query = params.query()?;
    let subscription = state.store.client(user.0).subscribe_collection(&query).await?;
    info!(collection = %query.collection, "Collection stream opened");

    let stream = subscription.into_stream().map(|snapshot| {
        snapshot_event(snapshot, |docs| {
            Value::Array(docs.iter().map(Document::to_json).collect())
        })
    });
    Ok(Sse::new(stream).keep_alive(keep_alive()))
}

/// Every permission rejection published on the bus, as it happens
pub async fn error_events(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.bus.subscribe()).filter_map(|received| async move {
        match received {
            Ok(event) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some(Ok(Event::default().event("permission-error").data(json)))
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "Error event listener lagged");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(keep_alive())
}
