use bytes::Bytes;

use crate::http::message::{HttpMessage, Message};
use crate::http::parser::ParseError;

/// HTTP status codes the server produces.
///
/// - `Continue` (100): Interim response
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): Resource not found
/// - `InternalServerError` (500): Server error
/// - `NotImplemented` (501): Method not supported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 100 Continue
    Continue,
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use harbor::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Continue => 100,
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use harbor::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Continue => "Continue",
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }

    /// Guesses the status from a reason phrase.
    ///
    /// Upstream servers send non-standard reason strings, so this matches
    /// substrings in a fixed order and falls back to `NotImplemented`.
    pub fn from_reason(reason: &str) -> Self {
        const CANDIDATES: [(&str, StatusCode); 5] = [
            ("Continue", StatusCode::Continue),
            ("OK", StatusCode::Ok),
            ("Bad Request", StatusCode::BadRequest),
            ("Not Found", StatusCode::NotFound),
            ("Server Error", StatusCode::InternalServerError),
        ];

        CANDIDATES
            .iter()
            .find(|(needle, _)| reason.contains(needle))
            .map(|(_, status)| *status)
            .unwrap_or(StatusCode::NotImplemented)
    }
}

/// An HTTP response, either built for sending or parsed from raw bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    message: HttpMessage,
    status: StatusCode,
    reason: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            message: HttpMessage::new(),
            status,
            reason: status.reason_phrase().to_string(),
        }
    }

    /// Wraps bytes received from a peer. Call [`Message::parse`] next.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            message: HttpMessage::from_bytes(data),
            status: StatusCode::NotImplemented,
            reason: String::new(),
        }
    }

    /// A `text/plain` response whose body is the reason phrase, followed by
    /// `": message"` when `message` is not empty.
    pub fn status_page(status: StatusCode, message: &str) -> Self {
        let mut text = status.reason_phrase().to_string();
        if !message.is_empty() {
            text.push_str(": ");
            text.push_str(message);
        }
        ResponseBuilder::new(status)
            .header("Content-Type", "text/plain")
            .body(text.into_bytes())
            .build()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status and derives the matching reason phrase.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.reason = status.reason_phrase().to_string();
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.message.header(key)
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.message.set_header(key, value);
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

    fn parse_status_line(&mut self) -> Result<(), ParseError> {
        let version = self.message.get_str_element(b' ');
        if version.is_empty() {
            return Err(ParseError::EmptyVersion);
        }
        self.message.set_version(version);

        // The numeric code is read past but not trusted.
        let _code = self.message.get_str_element(b' ');
        self.reason = self.message.get_line();
        self.status = StatusCode::from_reason(&self.reason);
        Ok(())
    }
}

impl Message for HttpResponse {
    fn message(&self) -> &HttpMessage {
        &self.message
    }

    fn message_mut(&mut self) -> &mut HttpMessage {
        &mut self.message
    }

    fn parse(&mut self) -> Result<(), ParseError> {
        let result = self.parse_status_line().and_then(|()| {
            self.message.parse_headers();
            self.message.parse_body()
        });
        self.message.record(result)
    }

    fn serialize(&mut self) -> Option<Bytes> {
        let status_line = format!(
            "{} {} {}",
            self.message.version(),
            self.status.as_u16(),
            self.reason
        );
        let msg = &mut self.message;
        msg.buffer_mut().clear();
        msg.put_line(&status_line, true);
        msg.put_headers();
        msg.put_body();
        Some(msg.take_output())
    }
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use harbor::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    version: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: None,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Adds a header. The first value given for a key is kept.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final response.
    ///
    /// Adds a `Content-Length` header from the body size if not already present.
    pub fn build(self) -> HttpResponse {
        let mut response = HttpResponse::new(self.status);
        let msg = response.message_mut();
        if let Some(version) = self.version {
            msg.set_version(version);
        }
        for (key, value) in self.headers {
            msg.add_header(key, value);
        }
        if msg.header("Content-Length").is_none() {
            msg.add_header("Content-Length", self.body.len().to_string());
        }
        msg.set_body(self.body);
        response
    }
}
