//! Tracks in-flight requests cancelled via `$/cancelRequest` (§5
//! "Cancellation"). Handlers poll [`CancellationRegistry::is_cancelled`]
//! before an expensive wait and bail out with `LspError::RequestCancelled`
//! rather than the dispatcher reaching in and killing a handler mid-flight.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use serde_json::Value;

/// A JSON-RPC request id, normalized so that the number `1` and the string
/// `"1"` are never treated as distinct requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl RequestId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RequestId::Number),
            Value::String(s) => Some(RequestId::String(s.clone())),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct CancellationRegistry {
    in_flight: Mutex<FxHashSet<RequestId>>,
    cancelled: Mutex<FxHashSet<RequestId>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as in flight so a later `$/cancelRequest` for it has
    /// somewhere to record the cancellation. Call once per dispatched
    /// request; pair with [`Self::finish`] when the handler returns.
    pub fn begin(&self, id: RequestId) {
        self.in_flight.lock().insert(id);
    }

    /// Clears bookkeeping for a completed request, whether it finished
    /// normally or was cancelled.
    pub fn finish(&self, id: &RequestId) {
        self.in_flight.lock().remove(id);
        self.cancelled.lock().remove(id);
    }

    /// Records a cancellation for `id`. A no-op if `id` isn't (or is no
    /// longer) in flight — matches a client racing `$/cancelRequest`
    /// against a response that already went out.
    pub fn cancel(&self, id: &RequestId) {
        if self.in_flight.lock().contains(id) {
            self.cancelled.lock().insert(id.clone());
        }
    }

    pub fn is_cancelled(&self, id: &RequestId) -> bool {
        self.cancelled.lock().contains(id)
    }
}
