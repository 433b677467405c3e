use crate::dispatcher::MESSAGE_ATTRIBUTE;
use crate::server::{ActionRequest, ActionResponse};
use parking_lot::Mutex;

/// Hands control to a target resource (a view or another component).
///
/// The dispatcher calls it exactly once per request, except when the action
/// reports it already wrote the response.
pub trait Forwarder: Send + Sync {
    fn forward(
        &self,
        target: &str,
        request: &ActionRequest,
        response: &mut ActionResponse,
    ) -> anyhow::Result<()>;
}

/// One observed forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRecord {
    pub target: String,
    /// The request-scoped message at forward time, if any
    pub message: Option<String>,
}

/// Forwarder that records each call instead of rendering.
///
/// Useful for embedding without a view layer and in tests.
#[derive(Debug, Default)]
pub struct RecordingForwarder {
    records: Mutex<Vec<ForwardRecord>>,
}

impl RecordingForwarder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<ForwardRecord> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<ForwardRecord> {
        self.records.lock().last().cloned()
    }
}

impl Forwarder for RecordingForwarder {
    fn forward(
        &self,
        target: &str,
        request: &ActionRequest,
        _response: &mut ActionResponse,
    ) -> anyhow::Result<()> {
        self.records.lock().push(ForwardRecord {
            target: target.to_string(),
            message: request.text_attribute(MESSAGE_ATTRIBUTE).map(str::to_string),
        });
        Ok(())
    }
}
