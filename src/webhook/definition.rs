//! Webhook definition model.

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// HTTP methods a webhook may use.
///
/// Only `POST`, `PUT` and `PATCH` carry an entity body; see
/// [`has_entity`](Self::has_entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `TRACE`
    Trace,
}

impl RequestMethod {
    /// All supported methods.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
    ];

    /// Returns true if requests with this method carry an entity body.
    #[must_use]
    pub const fn has_entity(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = String;

    /// Parses a method name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

impl From<RequestMethod> for http::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => Self::GET,
            RequestMethod::Post => Self::POST,
            RequestMethod::Put => Self::PUT,
            RequestMethod::Patch => Self::PATCH,
            RequestMethod::Delete => Self::DELETE,
            RequestMethod::Head => Self::HEAD,
            RequestMethod::Options => Self::OPTIONS,
            RequestMethod::Trace => Self::TRACE,
        }
    }
}

/// One header name with all its values, in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    key: String,
    values: Vec<String>,
}

impl HttpHeader {
    /// Returns the header name as provided.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns all values for this header.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the first value.
    #[must_use]
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Ordered multi-valued header collection.
///
/// Names keep the case they were given with but are matched
/// case-insensitively: adding `content-type` after `Content-Type` appends a
/// second value to the existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: Vec<HttpHeader>,
}

impl HttpHeaders {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a value for `key`, creating the entry if needed.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|h| h.key.eq_ignore_ascii_case(&key))
        {
            Some(header) => header.values.push(value),
            None => self.entries.push(HttpHeader {
                key,
                values: vec![value],
            }),
        }
    }

    /// Returns the entry for `key`, matched case-insensitively.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&HttpHeader> {
        self.entries.iter().find(|h| h.key.eq_ignore_ascii_case(key))
    }

    /// Iterates over all entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, HttpHeader> {
        self.entries.iter()
    }

    /// Returns the number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no headers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a HttpHeaders {
    type Item = &'a HttpHeader;
    type IntoIter = std::slice::Iter<'a, HttpHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A header value as written in configuration: one string or several.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Serialize for HttpHeaders {
    /// Single values serialize as strings, multiple values as arrays.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for header in &self.entries {
            match header.values.as_slice() {
                [single] => map.serialize_entry(&header.key, single)?,
                values => map.serialize_entry(&header.key, values)?,
            }
        }
        map.end()
    }
}

struct HeadersVisitor;

impl<'de> Visitor<'de> for HeadersVisitor {
    type Value = HttpHeaders;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of header names to a string or list of strings")
    }

    // Entries are visited in document order, which becomes insertion order
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut headers = HttpHeaders::new();
        while let Some((key, value)) = access.next_entry::<String, OneOrMany>()? {
            match value {
                OneOrMany::One(v) => headers.append(key, v),
                OneOrMany::Many(vs) => {
                    for v in vs {
                        headers.append(key.clone(), v);
                    }
                }
            }
        }
        Ok(headers)
    }
}

impl<'de> Deserialize<'de> for HttpHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// Description of one outbound webhook call.
///
/// Built once per stub at configuration time and shared read-only by every
/// dispatch it triggers. `method` and `url` are required, but their absence
/// only surfaces when a request is built from the definition.
///
/// # Example
///
/// ```
/// use serve_webhooks::webhook::{RequestMethod, webhook};
///
/// let definition = webhook()
///     .with_method(RequestMethod::Post)
///     .with_url("http://localhost:8080/callback")
///     .with_header("Content-Type", "application/json")
///     .with_body(r#"{"result": "SUCCESS"}"#);
///
/// assert_eq!(definition.method(), Some(RequestMethod::Post));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<RequestMethod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,

    #[serde(default, skip_serializing_if = "HttpHeaders::is_empty")]
    headers: HttpHeaders,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

/// Starts a new, empty webhook definition.
#[must_use]
pub const fn webhook() -> WebhookDefinition {
    WebhookDefinition::new()
}

impl WebhookDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            method: None,
            url: None,
            headers: HttpHeaders::new(),
            body: None,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the target URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Adds a header value.
    ///
    /// Repeated calls with the same name append further values.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(key, value);
        self
    }

    /// Sets the body template.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the configured method.
    #[must_use]
    pub const fn method(&self) -> Option<RequestMethod> {
        self.method
    }

    /// Returns the configured URL.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns the configured headers.
    #[must_use]
    pub const fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Returns the configured body template.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns true if requests built from this definition carry a body.
    #[must_use]
    pub fn sends_body(&self) -> bool {
        self.method.is_some_and(RequestMethod::has_entity)
    }
}
