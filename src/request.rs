//! Parsed upgrade request model.
//!
//! The host dispatcher owns request parsing; negotiation consumes this
//! already-parsed form. The socket and body stream are moved into the
//! request: ownership flows host → negotiation → frame codec, or → closed
//! on rejection, and never forks.

use std::collections::HashMap;

/// Case-insensitive request header map.
///
/// Lookups return `Option`: a header that is absent is distinct from a
/// header that is present with an empty value. The legacy key headers
/// depend on that distinction.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    /// Create an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header. Later inserts under the same name win.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.map
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Look up a header by name, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether a header is present at all, even with an empty value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_ascii_lowercase())
    }
}

/// Where the request was addressed, for legacy location reconstruction.
#[derive(Debug, Clone)]
pub struct RequestTarget {
    /// True when the transport is TLS; selects the `wss` scheme.
    pub secure: bool,
    /// Configured server name, used when no `Host` header was sent.
    pub server_name: String,
    /// Listening port.
    pub server_port: u16,
    /// Mount prefix of the handling application, possibly empty.
    pub script_name: String,
    /// Path below the mount prefix.
    pub path_info: String,
    /// Raw query string without the leading `?`, possibly empty.
    pub query: String,
}

impl Default for RequestTarget {
    fn default() -> Self {
        Self {
            secure: false,
            server_name: String::from("localhost"),
            server_port: 80,
            script_name: String::new(),
            path_info: String::new(),
            query: String::new(),
        }
    }
}

/// Everything negotiation reads from a request, minus the I/O handles.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// Request method; the modern dialect requires exactly `GET`.
    pub method: String,
    /// Request-line protocol token, e.g. `HTTP`.
    pub protocol: String,
    /// Request-line protocol version, e.g. `1.1`.
    pub http_version: String,
    /// Addressing information for URL reconstruction.
    pub target: RequestTarget,
    headers: Headers,
}

impl RequestHead {
    /// Look up a header by name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The full header map.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

/// A parsed upgrade request plus the connection it arrived on.
///
/// `S` is the raw bidirectional socket, `B` the unread request body stream.
/// Both are owned; [`Request::into_parts`] is the only way to get them back.
#[derive(Debug)]
pub struct Request<S, B> {
    head: RequestHead,
    socket: S,
    body: B,
}

impl Request<(), ()> {
    /// Start building a request.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }
}

impl<S, B> Request<S, B> {
    /// The request head.
    #[must_use]
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    /// Look up a header by name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    /// Split into the head and the owned I/O handles.
    #[must_use]
    pub fn into_parts(self) -> (RequestHead, S, B) {
        (self.head, self.socket, self.body)
    }
}

/// Builder for [`Request`].
///
/// Defaults to `GET HTTP/1.1` addressed to `localhost:80` over a plain
/// transport, which is what most upgrade requests look like before the
/// host fills in specifics.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: String,
    protocol: String,
    http_version: String,
    headers: Headers,
    target: RequestTarget,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Create a builder with the defaults described above.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: String::from("GET"),
            protocol: String::from("HTTP"),
            http_version: String::from("1.1"),
            headers: Headers::new(),
            target: RequestTarget::default(),
        }
    }

    /// Set the request method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the request-line protocol token and version.
    #[must_use]
    pub fn protocol(mut self, token: impl Into<String>, version: impl Into<String>) -> Self {
        self.protocol = token.into();
        self.http_version = version.into();
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Mark the transport as TLS (`wss`) or plain (`ws`).
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.target.secure = secure;
        self
    }

    /// Set the configured server name and port.
    #[must_use]
    pub fn server(mut self, name: impl Into<String>, port: u16) -> Self {
        self.target.server_name = name.into();
        self.target.server_port = port;
        self
    }

    /// Set the application mount prefix.
    #[must_use]
    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        self.target.script_name = script_name.into();
        self
    }

    /// Set the path below the mount prefix.
    #[must_use]
    pub fn path_info(mut self, path_info: impl Into<String>) -> Self {
        self.target.path_info = path_info.into();
        self
    }

    /// Set the raw query string.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.target.query = query.into();
        self
    }

    /// Attach the socket and body stream, producing the request.
    #[must_use]
    pub fn build<S, B>(self, socket: S, body: B) -> Request<S, B> {
        Request {
            head: RequestHead {
                method: self.method,
                protocol: self.protocol,
                http_version: self.http_version,
                target: self.target,
                headers: self.headers,
            },
            socket,
            body,
        }
    }
}
