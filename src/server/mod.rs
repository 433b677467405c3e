//! Transport boundary.
//!
//! The framework does not speak HTTP itself. The hosting transport adapts
//! its request, response and session objects to the types here and supplies
//! a [`Forwarder`] that renders forward targets.

pub mod forward;
pub mod request;
pub mod response;
pub mod session;

pub use forward::{ForwardRecord, Forwarder, RecordingForwarder};
pub use request::{ActionRequest, HeaderVec, Parameters, RequestAttribute, MAX_INLINE_HEADERS};
pub use response::ActionResponse;
pub use session::{InMemorySession, Session, SessionValue};
