use std::collections::{HashMap, HashSet};
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use mio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::http::connection::{Connection, ConnectionState, FlushOutcome, ReadOutcome};
use crate::http::request::HttpRequest;
use crate::server::dispatch::{RequestHandler, dispatch};
use crate::server::poller::{Interest, MioPoller, Poller, ReadyEvent};

/// How long one readiness wait may block before the running flag is checked.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(2);

/// Single-threaded event loop owning the listener and every client connection.
///
/// Each connection alternates between waiting for a request (read interest)
/// and draining its response (write interest). Only this type inserts into or
/// removes from the connection registry.
pub struct Server<H, P = MioPoller> {
    listener: TcpListener,
    poller: P,
    connections: HashMap<RawFd, Connection<TcpStream>>,
    /// Descriptors closed while handling the current batch of events.
    closed_this_turn: HashSet<RawFd>,
    handler: H,
    running: Arc<AtomicBool>,
    poll_timeout: Duration,
}

impl<H: RequestHandler> Server<H, MioPoller> {
    pub fn new(
        listener: std::net::TcpListener,
        handler: H,
        running: Arc<AtomicBool>,
    ) -> anyhow::Result<Self> {
        let poller = MioPoller::new().context("could not create readiness poller")?;
        Self::with_poller(listener, handler, running, poller)
    }
}

impl<H: RequestHandler, P: Poller> Server<H, P> {
    pub fn with_poller(
        listener: std::net::TcpListener,
        handler: H,
        running: Arc<AtomicBool>,
        mut poller: P,
    ) -> anyhow::Result<Self> {
        listener
            .set_nonblocking(true)
            .context("could not make listener non-blocking")?;
        let listener = TcpListener::from_std(listener);
        poller
            .register(listener.as_raw_fd(), Interest::READ)
            .context("could not watch the listening socket")?;

        Ok(Self {
            listener,
            poller,
            connections: HashMap::new(),
            closed_this_turn: HashSet::new(),
            handler,
            running,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn set_poll_timeout(&mut self, timeout: Duration) {
        self.poll_timeout = timeout;
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Runs the event loop until the running flag is cleared.
    ///
    /// A failed wait is logged and the loop polls again.
    pub fn run(&mut self) {
        info!(addr = ?self.local_addr().ok(), "server running");
        while self.running.load(Ordering::SeqCst) {
            if let Err(e) = self.turn() {
                error!(error = %e, "readiness wait failed");
            }
        }
        info!("event loop finished");
    }

    /// Waits for readiness once and handles every reported event.
    ///
    /// Events for a descriptor closed earlier in the same batch are dropped,
    /// since the number may already belong to a newly accepted connection.
    /// Returns the number of events in the batch.
    pub fn turn(&mut self) -> io::Result<usize> {
        let events = self.poller.poll(self.poll_timeout)?;
        self.closed_this_turn.clear();
        for event in &events {
            if self.closed_this_turn.contains(&event.fd) {
                debug!(fd = event.fd, "dropping stale event");
                continue;
            }
            self.handle_event(*event);
        }
        Ok(events.len())
    }

    /// Disconnects every client and closes the listener.
    pub fn stop(mut self) {
        let fds: Vec<RawFd> = self.connections.keys().copied().collect();
        for fd in fds {
            self.disconnect(fd);
        }
        if let Err(e) = self.poller.unregister(self.listener.as_raw_fd()) {
            debug!(error = %e, "could not unregister listener");
        }
        info!("server stopped");
    }

    fn handle_event(&mut self, event: ReadyEvent) {
        if event.fd == self.listener.as_raw_fd() {
            self.accept_connections();
            return;
        }

        if !self.connections.contains_key(&event.fd) {
            warn!(fd = event.fd, "event for unknown descriptor");
            if let Err(e) = self.poller.unregister(event.fd) {
                debug!(fd = event.fd, error = %e, "could not unregister unknown descriptor");
            }
            return;
        }

        if event.readable {
            self.read_client(event.fd);
        } else if event.writable {
            self.write_client(event.fd, event.write_capacity);
        } else if event.eof {
            self.disconnect(event.fd);
        }
    }

    fn accept_connections(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    let fd = stream.as_raw_fd();
                    if let Err(e) = self.poller.register(fd, Interest::READ) {
                        warn!(%peer, error = %e, "could not watch new connection");
                        continue;
                    }
                    debug!(fd, %peer, "accepted connection");
                    self.connections.insert(fd, Connection::new(stream, peer));
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    break;
                }
            }
        }
    }

    fn read_client(&mut self, fd: RawFd) {
        let Some(conn) = self.connections.get_mut(&fd) else {
            return;
        };

        match conn.read_available() {
            Ok(ReadOutcome::Data { bytes, peer_closed }) => {
                debug!(fd, len = bytes.len(), peer_closed, "read request");
                dispatch(&mut self.handler, conn, HttpRequest::from_bytes(&bytes));
                conn.set_state(ConnectionState::Writing);
                if let Err(e) = self.poller.reregister(fd, Interest::WRITE) {
                    warn!(fd, error = %e, "could not switch to write interest");
                    self.disconnect(fd);
                }
            }
            Ok(ReadOutcome::Pending) => {}
            Ok(ReadOutcome::Closed) => self.disconnect(fd),
            Err(e) => {
                warn!(fd, error = %e, "read failed");
                self.disconnect(fd);
            }
        }
    }

    fn write_client(&mut self, fd: RawFd, budget: Option<usize>) {
        let Some(conn) = self.connections.get_mut(&fd) else {
            return;
        };

        match conn.flush(budget) {
            Ok(FlushOutcome::Drained) => {
                conn.set_state(ConnectionState::Reading);
                if let Err(e) = self.poller.reregister(fd, Interest::READ) {
                    warn!(fd, error = %e, "could not switch to read interest");
                    self.disconnect(fd);
                }
            }
            Ok(FlushOutcome::Idle | FlushOutcome::Pending) => {}
            Ok(FlushOutcome::Disconnect) => self.disconnect(fd),
            Err(e) => {
                warn!(fd, error = %e, "write failed");
                self.disconnect(fd);
            }
        }
    }

    fn disconnect(&mut self, fd: RawFd) {
        let Some(mut conn) = self.connections.remove(&fd) else {
            return;
        };
        self.closed_this_turn.insert(fd);
        conn.set_state(ConnectionState::Closing);
        conn.clear_outbound();
        if let Err(e) = self.poller.unregister(fd) {
            debug!(fd, error = %e, "could not unregister connection");
        }
        debug!(fd, peer = %conn.peer(), "disconnected");
    }
}
