//! Readiness notification behind a small interface so the event loop does not
//! depend on a particular OS facility.

use std::io::{self, ErrorKind};
use std::os::unix::io::RawFd;
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Poll, Token};

/// Number of readiness events collected per wait.
pub const EVENT_CAPACITY: usize = 1024;

/// Which kinds of readiness a descriptor is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interest {
    pub readable: bool,
    pub writable: bool,
}

impl Interest {
    pub const READ: Interest = Interest {
        readable: true,
        writable: false,
    };
    pub const WRITE: Interest = Interest {
        readable: false,
        writable: true,
    };
    pub const BOTH: Interest = Interest {
        readable: true,
        writable: true,
    };

    fn to_mio(self) -> io::Result<mio::Interest> {
        match (self.readable, self.writable) {
            (true, true) => Ok(mio::Interest::READABLE | mio::Interest::WRITABLE),
            (true, false) => Ok(mio::Interest::READABLE),
            (false, true) => Ok(mio::Interest::WRITABLE),
            (false, false) => Err(io::Error::new(
                ErrorKind::InvalidInput,
                "interest must include read or write",
            )),
        }
    }
}

/// One ready descriptor reported by [`Poller::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    pub fd: RawFd,
    pub readable: bool,
    pub writable: bool,
    /// The peer hung up or the descriptor is in an error state.
    pub eof: bool,
    /// Bytes the socket will accept right now, when the backend knows it.
    pub write_capacity: Option<usize>,
}

/// A readiness multiplexer.
pub trait Poller {
    fn register(&mut self, fd: RawFd, interest: Interest) -> io::Result<()>;

    /// Replaces the interest set of an already registered descriptor.
    fn reregister(&mut self, fd: RawFd, interest: Interest) -> io::Result<()>;

    fn unregister(&mut self, fd: RawFd) -> io::Result<()>;

    /// Blocks for at most `timeout` and returns the descriptors that became ready.
    ///
    /// An interrupted wait returns no events.
    fn poll(&mut self, timeout: Duration) -> io::Result<Vec<ReadyEvent>>;
}

/// [`Poller`] backed by `mio`, which is edge-triggered on every platform.
pub struct MioPoller {
    poll: Poll,
    events: Events,
}

impl MioPoller {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(EVENT_CAPACITY),
        })
    }
}

impl Poller for MioPoller {
    fn register(&mut self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), Token(fd as usize), interest.to_mio()?)
    }

    fn reregister(&mut self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.poll
            .registry()
            .reregister(&mut SourceFd(&fd), Token(fd as usize), interest.to_mio()?)
    }

    fn unregister(&mut self, fd: RawFd) -> io::Result<()> {
        self.poll.registry().deregister(&mut SourceFd(&fd))
    }

    fn poll(&mut self, timeout: Duration) -> io::Result<Vec<ReadyEvent>> {
        match self.poll.poll(&mut self.events, Some(timeout)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(Vec::new()),
            Err(e) => return Err(e),
        }

        Ok(self
            .events
            .iter()
            .map(|event| ReadyEvent {
                fd: event.token().0 as RawFd,
                readable: event.is_readable(),
                writable: event.is_writable(),
                eof: event.is_read_closed() || event.is_write_closed() || event.is_error(),
                write_capacity: None,
            })
            .collect())
    }
}
