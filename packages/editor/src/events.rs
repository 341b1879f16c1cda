//! # Permission Error Bus
//!
//! Process-scoped publish/subscribe channel for store rejections. Writers
//! publish and move on; any number of listeners (a toast handler, the debug
//! overlay stream, the log) receive events independently. Delivery is best
//! effort: a listener that falls behind loses the oldest events.

use chrono::{DateTime, Utc};
use pharmasite_store::Operation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, warn};

const BUS_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionErrorEvent {
    pub path: String,
    pub operation: Operation,
    /// Data the rejected write carried
    #[serde(rename = "requestResourceData", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub at: DateTime<Utc>,
}

impl PermissionErrorEvent {
    pub fn new(path: impl Into<String>, operation: Operation, payload: Option<Value>) -> Self {
        Self {
            path: path.into(),
            operation,
            payload,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorBus {
    sender: broadcast::Sender<PermissionErrorEvent>,
}

impl Default for ErrorBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Returns how many listeners the event reached
    pub fn publish(&self, event: PermissionErrorEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PermissionErrorEvent> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Log every event until the bus is gone
    pub fn spawn_logger(&self) -> JoinHandle<()> {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => error!(
                        path = %event.path,
                        operation = %event.operation,
                        "Store rejected write: permission denied"
                    ),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Error log listener fell behind")
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_listeners() {
        let bus = ErrorBus::new();
        assert_eq!(bus.publish(PermissionErrorEvent::new("pages/about", Operation::Write, None)), 0);
    }

    #[test]
    fn test_every_listener_gets_the_event() {
        let bus = ErrorBus::new();
        let mut toast = bus.subscribe();
        let mut overlay = bus.subscribe();

        let reached = bus.publish(PermissionErrorEvent::new("pages/about", Operation::Write, None));
        assert_eq!(reached, 2);
        assert_eq!(toast.try_recv().unwrap().path, "pages/about");
        assert_eq!(overlay.try_recv().unwrap().operation, Operation::Write);
    }

    #[test]
    fn test_slow_listener_lags_instead_of_blocking() {
        let bus = ErrorBus::new();
        let mut slow = bus.subscribe();

        for i in 0..BUS_CAPACITY + 5 {
            bus.publish(PermissionErrorEvent::new(format!("products/{}", i), Operation::Delete, None));
        }

        assert!(matches!(
            slow.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(5))
        ));
    }

    #[test]
    fn test_wire_shape() {
        let event = PermissionErrorEvent::new(
            "settings/footer",
            Operation::Write,
            Some(serde_json::json!({ "phone": "1" })),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["operation"], "write");
        assert_eq!(json["requestResourceData"]["phone"], "1");
    }
}
