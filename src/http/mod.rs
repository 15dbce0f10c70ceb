//! HTTP/1.x message model.
//!
//! Messages are built on top of [`BinaryBuffer`](crate::buffer::BinaryBuffer):
//! a request or response owns the raw bytes it was read from (or is written
//! into) and parses or renders its structured fields directly on that buffer.
//!
//! # Architecture
//!
//! - **`message`**: fields shared by requests and responses, the `Message` trait
//! - **`parser`**: line and token primitives, header and body parsing
//! - **`writer`**: serialization primitives and the outbound queue item
//! - **`request`**: HTTP request representation and parsing
//! - **`response`**: HTTP response representation with builder pattern
//! - **`connection`**: per-client state, partial reads and writes
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Request and response are strictly half-duplex per cycle:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← read interest only
//!        └──────┬──────┘
//!               │ request read and dispatched
//!               ▼
//!        ┌──────────────────┐
//!        │     Writing      │ ← write interest only, partial writes
//!        └──────┬───────────┘
//!               │ queue drained
//!               ├─ keep-alive → Reading
//!               └─ disconnect → Closing
//! ```
//!
//! # Example
//!
//! ```
//! use harbor::http::message::Message;
//! use harbor::http::request::{HttpRequest, Method};
//!
//! let mut req = HttpRequest::from_bytes(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! req.parse().unwrap();
//! assert_eq!(req.method(), Method::GET);
//! assert_eq!(req.header("Host"), Some("example.com"));
//! ```

pub mod connection;
pub mod message;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
