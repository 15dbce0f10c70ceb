//! Harbor - single-threaded static HTTP/1.x server
//!
//! Core library: byte buffer, HTTP message model, readiness reactor and the
//! resource hosts it serves from.

pub mod buffer;
pub mod config;
pub mod http;
pub mod resource;
pub mod server;
