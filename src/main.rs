use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;

use harbor::config::Config;
use harbor::resource::VirtualHosts;
use harbor::resource::disk::DiskHost;
use harbor::server::dispatch::StaticSite;
use harbor::server::listener;
use harbor::server::reactor::Server;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load().context("failed to load configuration")?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        flag.store(false, Ordering::SeqCst);
    })
    .context("failed to install signal handler")?;

    let mut hosts = VirtualHosts::new(cfg.port);
    hosts.add_host(Box::new(DiskHost::new(&cfg.disk_path)), &cfg.vhosts);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, cfg.port));
    let socket = listener::bind(addr, cfg.privileges())?;

    let mut server = Server::new(socket, StaticSite::new(hosts), running)?;
    server.set_poll_timeout(cfg.poll_timeout);

    tracing::info!(
        port = cfg.port,
        disk_path = %cfg.disk_path.display(),
        vhosts = ?cfg.vhosts,
        "server ready"
    );

    server.run();
    server.stop();
    Ok(())
}
