use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::net::SocketAddr;

use crate::http::writer::OutboundQueueItem;

const READ_CHUNK: usize = 4096;

/// Where a connection is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for a request; registered for read readiness.
    Reading,
    /// Draining queued responses; registered for write readiness.
    Writing,
    /// Being torn down.
    Closing,
}

/// Result of draining the socket on a read-ready event.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes arrived. `peer_closed` is set when the peer also shut down its
    /// side after sending them.
    Data { bytes: Vec<u8>, peer_closed: bool },
    /// The peer closed the connection without sending anything.
    Closed,
    /// Nothing to read yet.
    Pending,
}

/// Result of a write-ready event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The outbound queue was already empty.
    Idle,
    /// Bytes remain queued; wait for the next write-ready event.
    Pending,
    /// Everything queued has been sent.
    Drained,
    /// An item flagged `disconnect_after` finished sending.
    Disconnect,
}

/// A client connection: the stream, who is on the other end, and the
/// responses waiting to go out.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    outbound: VecDeque<OutboundQueueItem>,
    state: ConnectionState,
    read_closed: bool,
}

impl<S> Connection<S> {
    pub fn new(stream: S, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            outbound: VecDeque::new(),
            state: ConnectionState::Reading,
            read_closed: false,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Whether the peer has shut down its sending side.
    pub fn is_read_closed(&self) -> bool {
        self.read_closed
    }

    pub fn enqueue(&mut self, item: OutboundQueueItem) {
        self.outbound.push_back(item);
    }

    /// The item currently being sent.
    pub fn next_outbound(&self) -> Option<&OutboundQueueItem> {
        self.outbound.front()
    }

    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    pub fn clear_outbound(&mut self) {
        self.outbound.clear();
    }
}

impl<S: Read + Write> Connection<S> {
    /// Reads until the stream would block or reaches end of file.
    pub fn read_available(&mut self) -> io::Result<ReadOutcome> {
        let mut bytes = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let mut eof = false;

        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    eof = true;
                    break;
                }
                Ok(n) => bytes.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if eof {
            self.read_closed = true;
        }

        Ok(match (bytes.is_empty(), eof) {
            (true, true) => ReadOutcome::Closed,
            (true, false) => ReadOutcome::Pending,
            (false, peer_closed) => ReadOutcome::Data { bytes, peer_closed },
        })
    }

    /// Sends queued bytes on a write-ready event.
    ///
    /// With `budget` set (the readiness backend reported how many bytes the
    /// socket accepts), exactly one send of `min(budget, remaining)` bytes of
    /// the head item is made. Without it the queue is written until the
    /// stream would block, which is what edge-triggered readiness requires.
    pub fn flush(&mut self, budget: Option<usize>) -> io::Result<FlushOutcome> {
        if self.outbound.is_empty() {
            return Ok(FlushOutcome::Idle);
        }

        loop {
            let Some(item) = self.outbound.front_mut() else {
                return Ok(FlushOutcome::Drained);
            };

            let remaining = item.remaining();
            let attempt = budget.map_or(remaining.len(), |b| b.min(remaining.len()));
            let sent = match self.stream.write(&remaining[..attempt]) {
                Ok(0) if attempt > 0 => {
                    return Err(io::Error::new(ErrorKind::WriteZero, "peer stopped accepting data"));
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(FlushOutcome::Pending),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            item.advance(sent);

            if item.is_complete() {
                let disconnect = item.disconnect_after();
                self.outbound.pop_front();
                if disconnect {
                    return Ok(FlushOutcome::Disconnect);
                }
            }

            if budget.is_some() {
                return Ok(if self.outbound.is_empty() {
                    FlushOutcome::Drained
                } else {
                    FlushOutcome::Pending
                });
            }
        }
    }
}
