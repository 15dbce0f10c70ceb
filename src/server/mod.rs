//! Connection management.
//!
//! A single thread owns the listening socket, the readiness poller and every
//! client connection. Parsed requests are handed to a [`RequestHandler`]
//! and the responses are queued back on the connection they came from.
//!
//! [`RequestHandler`]: dispatch::RequestHandler

pub mod dispatch;
pub mod listener;
pub mod poller;
pub mod reactor;
