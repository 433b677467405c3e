use crate::binder::Bindable;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::registry::SharedForm;
use crate::server::session::Session;
use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for requests and responses.
///
/// Header names use `Arc<str>` since the same few names repeat on every
/// request; values are per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Ordered multi-valued request parameter map.
///
/// Names keep the position of their first occurrence; repeated names
/// accumulate values in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, Vec<String>)>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` payload (or query string).
    ///
    /// ```
    /// use actionroute::server::Parameters;
    ///
    /// let params = Parameters::from_urlencoded("user=alice&tag=a&tag=b");
    /// assert_eq!(params.first("user"), Some("alice"));
    /// assert_eq!(params.values("tag"), ["a", "b"]);
    /// ```
    #[must_use]
    pub fn from_urlencoded(input: &str) -> Self {
        let input = input.strip_prefix('?').unwrap_or(input);
        let mut params = Self::new();
        for (name, value) in url::form_urlencoded::parse(input.as_bytes()) {
            params.append(name.into_owned(), value.into_owned());
        }
        params
    }

    /// Add one value under `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// First value submitted under `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.append(name, value);
        }
        params
    }
}

/// Value stored in the request scope for downstream rendering.
#[derive(Clone)]
pub enum RequestAttribute {
    Text(String),
    Form(SharedForm),
}

impl fmt::Debug for RequestAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestAttribute::Text(text) => f.debug_tuple("Text").field(text).finish(),
            RequestAttribute::Form(form) => {
                let name = form.try_lock().map_or("<locked>", |form| form.type_name());
                f.debug_tuple("Form").field(&name).finish()
            }
        }
    }
}

/// The slice of an HTTP request the dispatcher consumes.
///
/// The hosting transport builds one per request; actions and forms read it,
/// the dispatcher writes request-scoped attributes into it.
pub struct ActionRequest {
    /// Correlation id for tracing
    pub request_id: RequestId,
    /// HTTP method, informational only: every method is dispatched the same way
    pub method: Method,
    /// Request path without query string (e.g. `/login.do`)
    pub path: String,
    /// Query and form parameters
    pub parameters: Parameters,
    /// HTTP headers
    pub headers: HeaderVec,
    attributes: HashMap<String, RequestAttribute>,
    session: Arc<dyn Session>,
}

impl ActionRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, session: Arc<dyn Session>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            parameters: Parameters::new(),
            headers: HeaderVec::new(),
            attributes: HashMap::new(),
            session,
        }
    }

    /// Build a request from a raw target such as `/login.do?user=alice`.
    ///
    /// The query string becomes the parameter map.
    #[must_use]
    pub fn from_uri(method: Method, uri: &str, session: Arc<dyn Session>) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, query),
            None => (uri, ""),
        };
        Self::new(method, path, session).with_parameters(Parameters::from_urlencoded(query))
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
            self.request_id = RequestId::from_header_or_new(Some(&value));
        }
        self.headers.push((Arc::from(name.to_ascii_lowercase()), value));
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Referer` header, accepting the correctly spelled variant too.
    #[must_use]
    pub fn referrer(&self) -> Option<&str> {
        self.header("referer").or_else(|| self.header("referrer"))
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: RequestAttribute) {
        self.attributes.insert(key.into(), value);
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&RequestAttribute> {
        self.attributes.get(key)
    }

    /// Text attribute under `key`, if one was set.
    #[must_use]
    pub fn text_attribute(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(RequestAttribute::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Form attribute under `key`, if one was set.
    #[must_use]
    pub fn form_attribute(&self, key: &str) -> Option<&SharedForm> {
        match self.attributes.get(key) {
            Some(RequestAttribute::Form(form)) => Some(form),
            _ => None,
        }
    }
}

impl fmt::Debug for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRequest")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("parameters", &self.parameters)
            .field("headers", &self.headers)
            .field("attributes", &self.attributes)
            .field("session", &self.session.id())
            .finish()
    }
}
