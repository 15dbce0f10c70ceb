use bytes::Bytes;

use crate::http::message::{HTTP_VERSION_10, HttpMessage, Message};
use crate::http::parser::ParseError;

/// Methods longer than this are never looked up.
const MAX_METHOD_LEN: usize = 10;

/// HTTP request methods.
///
/// `INVALID` stands for anything the server does not recognise; it is never
/// rendered back onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// HEAD - Like GET but without the response body
    HEAD,
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// TRACE - Echo the received request
    TRACE,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// PATCH - Partial modification of a resource
    PATCH,
    INVALID,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the string matches a known method, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// # use harbor::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() >= MAX_METHOD_LEN {
            return None;
        }
        match s {
            "HEAD" => Some(Method::HEAD),
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "TRACE" => Some(Method::TRACE),
            "OPTIONS" => Some(Method::OPTIONS),
            "CONNECT" => Some(Method::CONNECT),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    /// The wire form of the method, `None` for [`Method::INVALID`].
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Method::HEAD => Some("HEAD"),
            Method::GET => Some("GET"),
            Method::POST => Some("POST"),
            Method::PUT => Some("PUT"),
            Method::DELETE => Some("DELETE"),
            Method::TRACE => Some("TRACE"),
            Method::OPTIONS => Some("OPTIONS"),
            Method::CONNECT => Some("CONNECT"),
            Method::PATCH => Some("PATCH"),
            Method::INVALID => None,
        }
    }

    /// Only these methods carry a body the server reads.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::POST | Method::PUT)
    }
}

/// An HTTP request, either parsed from raw bytes or built to be serialized.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    message: HttpMessage,
    method: Method,
    request_uri: String,
}

impl HttpRequest {
    pub fn new(method: Method, request_uri: impl Into<String>) -> Self {
        Self {
            message: HttpMessage::new(),
            method,
            request_uri: request_uri.into(),
        }
    }

    /// Wraps bytes read from a socket. Call [`Message::parse`] next.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            message: HttpMessage::from_bytes(data),
            method: Method::INVALID,
            request_uri: String::new(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn set_request_uri(&mut self, uri: impl Into<String>) {
        self.request_uri = uri.into();
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.message.header(key)
    }

    pub fn version(&self) -> &str {
        self.message.version()
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.message.body()
    }

    pub fn parse_error(&self) -> Option<&str> {
        self.message.parse_error()
    }

    /// The bytes the request was built from, exactly as received.
    pub fn raw(&self) -> &[u8] {
        self.message.buffer().as_slice()
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// HTTP/1.0 requests and requests carrying `Connection: close` end the
    /// connection; anything else keeps it.
    pub fn keep_alive(&self) -> bool {
        if self.version() == HTTP_VERSION_10 {
            return false;
        }
        self.header("Connection")
            .map(|v| !v.trim().eq_ignore_ascii_case("close"))
            .unwrap_or(true)
    }

    fn parse_start_line(&mut self) -> Result<(), ParseError> {
        let method_name = self.message.get_str_element(b' ');
        if method_name.is_empty() {
            return Err(ParseError::EmptyMethod);
        }
        self.method = Method::from_str(&method_name)
            .ok_or_else(|| ParseError::InvalidMethod(method_name.clone()))?;

        self.request_uri = self.message.get_str_element(b' ');
        if self.request_uri.is_empty() {
            return Err(ParseError::MissingUri);
        }

        let version = self.message.get_line();
        if version.is_empty() {
            return Err(ParseError::EmptyVersion);
        }
        if !version.starts_with("HTTP/1") {
            return Err(ParseError::InvalidVersion(version));
        }
        self.message.set_version(version);
        Ok(())
    }
}

impl Message for HttpRequest {
    fn message(&self) -> &HttpMessage {
        &self.message
    }

    fn message_mut(&mut self) -> &mut HttpMessage {
        &mut self.message
    }

    fn parse(&mut self) -> Result<(), ParseError> {
        let result = self.parse_start_line().and_then(|()| {
            self.message.parse_headers();
            if self.method.has_body() {
                self.message.parse_body()
            } else {
                Ok(())
            }
        });
        self.message.record(result)
    }

    fn serialize(&mut self) -> Option<Bytes> {
        let Some(method) = self.method.as_str() else {
            tracing::warn!(method = ?self.method, "cannot serialize request with unknown method");
            return None;
        };

        let start_line = format!("{} {} {}", method, self.request_uri, self.message.version());
        let msg = &mut self.message;
        msg.buffer_mut().clear();
        msg.put_line(&start_line, true);
        msg.put_headers();
        msg.put_body();
        Some(msg.take_output())
    }
}

/// Builder for constructing requests to serialize.
pub struct RequestBuilder {
    method: Option<Method>,
    uri: Option<String>,
    version: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            uri: None,
            version: None,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the request, adding `Content-Length` when a body is set.
    pub fn build(self) -> Result<HttpRequest, &'static str> {
        let mut request = HttpRequest::new(
            self.method.ok_or("method missing")?,
            self.uri.ok_or("uri missing")?,
        );
        let msg = request.message_mut();
        if let Some(version) = self.version {
            msg.set_version(version);
        }
        for (key, value) in self.headers {
            msg.add_header(key, value);
        }
        if !self.body.is_empty() && msg.header("Content-Length").is_none() {
            msg.add_header("Content-Length", self.body.len().to_string());
        }
        msg.set_body(self.body);
        Ok(request)
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
