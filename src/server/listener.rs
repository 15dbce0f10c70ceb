use std::io;
use std::net::{SocketAddr, TcpListener};

use anyhow::Context;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::info;

/// Pending connections the kernel queues before `accept`.
pub const LISTEN_BACKLOG: i32 = 1024;

/// Identity the process switches to once the port is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privileges {
    pub uid: u32,
    pub gid: u32,
}

/// Creates the non-blocking listening socket.
///
/// Privileges are dropped after `bind` so a low port can be taken as root,
/// and before `listen` so no client is ever served with elevated rights.
pub fn bind(addr: SocketAddr, privileges: Option<Privileges>) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .context("could not create listening socket")?;
    socket
        .set_reuse_address(true)
        .context("could not set SO_REUSEADDR")?;
    socket
        .set_nonblocking(true)
        .context("could not make listening socket non-blocking")?;
    socket
        .bind(&addr.into())
        .with_context(|| format!("failed to bind {addr}"))?;

    if let Some(privileges) = privileges {
        drop_privileges(privileges).context("failed to drop privileges")?;
        info!(uid = privileges.uid, gid = privileges.gid, "dropped privileges");
    }

    socket
        .listen(LISTEN_BACKLOG)
        .with_context(|| format!("failed to listen on {addr}"))?;
    info!(%addr, "listening");

    Ok(socket.into())
}

/// Switches group first, since changing the user gives up the right to do so.
fn drop_privileges(privileges: Privileges) -> io::Result<()> {
    // SAFETY: setgid only reads its integer argument.
    if unsafe { libc::setgid(privileges.gid) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: setuid only reads its integer argument.
    if unsafe { libc::setuid(privileges.uid) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
