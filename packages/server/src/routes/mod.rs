//! HTTP handlers, grouped by surface.

pub mod admin;
pub mod assist;
pub mod public;
pub mod subscribe;
pub mod upload;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pharmasite_editor::{FailureKind, FieldErrors, NextStep, Notification, SaveResult};
use pharmasite_store::Document;
use serde::Serialize;
use serde_json::Value;

/// Body of every admin write response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NextStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::Busy => StatusCode::CONFLICT,
        FailureKind::PermissionDenied => StatusCode::FORBIDDEN,
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turn a save outcome into a response
pub fn save_response(result: SaveResult) -> Response {
    match result {
        Ok(saved) => Json(SaveResponse {
            success: true,
            notification: saved.notification,
            next: Some(saved.next),
            id: saved.id,
            errors: None,
        })
        .into_response(),
        Err(failure) => {
            let status = failure_status(failure.kind());
            let body = SaveResponse {
                success: false,
                errors: failure.error.field_errors().cloned(),
                notification: failure.notification,
                next: None,
                id: None,
            };
            (status, Json(body)).into_response()
        }
    }
}

pub(crate) fn documents_json(docs: Vec<Document>) -> Json<Vec<Value>> {
    Json(docs.iter().map(Document::to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmasite_editor::{SaveError, SaveFailure, Saved};

    #[test]
    fn test_failure_statuses() {
        assert_eq!(failure_status(FailureKind::Busy), StatusCode::CONFLICT);
        assert_eq!(failure_status(FailureKind::PermissionDenied), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_save_response_status() {
        let ok = save_response(Ok(Saved {
            notification: Notification::success("Success", "Saved."),
            next: NextStep::Stay,
            id: None,
        }));
        assert_eq!(ok.status(), StatusCode::OK);

        let busy = save_response(Err(SaveFailure {
            error: SaveError::AlreadySaving("products/new".into()),
            notification: Notification::destructive("Save Failed", "busy"),
        }));
        assert_eq!(busy.status(), StatusCode::CONFLICT);
    }
}
