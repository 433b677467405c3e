use crate::server::request::HeaderVec;
use std::sync::Arc;

/// Response side of the transport contract.
///
/// Actions may write to it directly and return [`Forward::Handled`](crate::action::Forward::Handled);
/// otherwise the forward target renders into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// HTTP status code
    pub status: u16,
    /// HTTP response headers
    pub headers: HeaderVec,
    /// Response body
    pub body: String,
}

impl Default for ActionResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionResponse {
    /// Empty `200` response
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: String::new(),
        }
    }

    /// Replace status and body with a plain-text message.
    pub fn text(&mut self, status: u16, message: &str) {
        self.status = status;
        self.set_header("content-type", "text/plain; charset=utf-8".to_string());
        self.body.clear();
        self.body.push_str(message);
    }

    /// Append to the body.
    pub fn write(&mut self, chunk: &str) {
        self.body.push_str(chunk);
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}
