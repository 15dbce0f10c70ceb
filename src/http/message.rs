use std::collections::BTreeMap;

use bytes::Bytes;

use crate::buffer::BinaryBuffer;
use crate::http::parser::ParseError;

pub const HTTP_VERSION_10: &str = "HTTP/1.0";
pub const HTTP_VERSION_11: &str = "HTTP/1.1";
pub const DEFAULT_HTTP_VERSION: &str = HTTP_VERSION_11;

/// Header keys longer than this are dropped.
pub const MAX_HEADER_KEY_LEN: usize = 32;
/// Header values longer than this are dropped.
pub const MAX_HEADER_VALUE_LEN: usize = 4096;

/// State shared by requests and responses: the raw byte buffer the message is
/// parsed from or serialized into, plus the protocol fields common to both.
///
/// Headers are kept in key order. Keys are stored as given and looked up
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct HttpMessage {
    buffer: BinaryBuffer,
    headers: BTreeMap<String, String>,
    version: String,
    body: Option<Bytes>,
    parse_error: Option<String>,
}

/// The parse/serialize contract implemented by
/// [`HttpRequest`](crate::http::request::HttpRequest) and
/// [`HttpResponse`](crate::http::response::HttpResponse).
pub trait Message {
    fn message(&self) -> &HttpMessage;

    fn message_mut(&mut self) -> &mut HttpMessage;

    /// Populates the structured fields from the bytes in the buffer.
    ///
    /// On failure the error is also recorded on the message, see
    /// [`HttpMessage::parse_error`].
    fn parse(&mut self) -> Result<(), ParseError>;

    /// Renders the structured fields into wire bytes.
    ///
    /// Returns `None` when the message cannot be rendered.
    fn serialize(&mut self) -> Option<Bytes>;
}

impl HttpMessage {
    pub fn new() -> Self {
        Self {
            buffer: BinaryBuffer::default(),
            headers: BTreeMap::new(),
            version: DEFAULT_HTTP_VERSION.to_string(),
            body: None,
            parse_error: None,
        }
    }

    /// Wraps raw wire bytes, ready for parsing.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            buffer: BinaryBuffer::from_bytes(data),
            ..Self::new()
        }
    }

    pub fn buffer(&self) -> &BinaryBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut BinaryBuffer {
        &mut self.buffer
    }

    /// Inserts a header unless the key is already present.
    ///
    /// Keys over [`MAX_HEADER_KEY_LEN`] bytes and values over
    /// [`MAX_HEADER_VALUE_LEN`] bytes are silently dropped.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        if !header_fits(&key, &value) {
            return;
        }
        self.headers.entry(key).or_insert(value);
    }

    /// Inserts a header, replacing any previous value under the same key.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        if !header_fits(&key, &value) {
            return;
        }
        if let Some(existing) = self.stored_key(&key).map(str::to_string) {
            self.headers.remove(&existing);
        }
        self.headers.insert(key, value);
    }

    /// Adds a header from a raw `Key: Value` line.
    ///
    /// The line is split on the first `:`; the key is trimmed and the value
    /// left-trimmed of spaces. Lines without a `:` are ignored.
    pub fn add_header_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            tracing::debug!(line, "ignoring header line without a colon");
            return;
        };
        self.add_header(key.trim(), value.trim_start_matches(' '));
    }

    /// Looks up a header: verbatim first, then lower-cased, then ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.headers.get(key) {
            return Some(value);
        }
        if let Some(value) = self.headers.get(&key.to_ascii_lowercase()) {
            return Some(value);
        }
        self.headers
            .iter()
            .find(|(stored, _)| stored.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the header at `index` in key order, rendered as `Key: Value`.
    pub fn header_line(&self, index: usize) -> Option<String> {
        self.headers
            .iter()
            .nth(index)
            .map(|(key, value)| format!("{key}: {value}"))
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Parses the `Content-Length` header.
    ///
    /// `None` when absent, `Some(Err(..))` when present but not a number.
    pub fn content_length(&self) -> Option<Result<usize, ParseError>> {
        self.header("Content-Length").map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
    }

    /// Description of the last parse failure, if any.
    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    /// Records the outcome of a parse and hands it back.
    pub(crate) fn record(&mut self, result: Result<(), ParseError>) -> Result<(), ParseError> {
        self.parse_error = result.as_ref().err().map(ToString::to_string);
        result
    }

    fn stored_key(&self, key: &str) -> Option<&str> {
        self.headers
            .keys()
            .find(|stored| stored.eq_ignore_ascii_case(key))
            .map(String::as_str)
    }
}

impl Default for HttpMessage {
    fn default() -> Self {
        Self::new()
    }
}

fn header_fits(key: &str, value: &str) -> bool {
    key.len() <= MAX_HEADER_KEY_LEN && value.len() <= MAX_HEADER_VALUE_LEN
}
