//! UDP socket setup and the blocking receive loop.

use crate::error::GatewayError;
use gateway_config::{GatewayConfig, IngestMode};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read timeout bounding how long shutdown can lag behind the flag flip.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest UDP datagram we will ever see (whole-datagram framing).
const MAX_DATAGRAM: usize = 65_536;

/// Floor for the socket receive buffer. Bursts at market open overflow
/// anything smaller long before the consumer side is the bottleneck.
const MIN_RECV_BUFFER: usize = 4 * 1024 * 1024;

/// Binds the ingest socket per the configured mode.
///
/// A multicast bind address in NORMAL mode binds the wildcard address on the
/// group's port and joins the group on the configured interface. Unicast
/// addresses (and everything in TESTING mode) bind directly with no join.
/// Bind failures are fatal and propagate.
pub fn bind_socket(cfg: &GatewayConfig) -> Result<UdpSocket, GatewayError> {
    let addr: SocketAddr = cfg.bind.parse().map_err(|source| GatewayError::BadBind {
        addr: cfg.bind.clone(),
        source,
    })?;

    let multicast_group = match addr.ip() {
        IpAddr::V4(ip) if ip.is_multicast() => Some(ip),
        IpAddr::V4(_) => None,
        IpAddr::V6(_) if cfg.mode == IngestMode::Normal => {
            return Err(GatewayError::NotIpv4 {
                addr: cfg.bind.clone(),
            });
        }
        IpAddr::V6(_) => None,
    };

    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;

    let recv_buffer = cfg.recv_buffer_bytes.max(MIN_RECV_BUFFER);
    if let Err(e) = socket.set_recv_buffer_size(recv_buffer) {
        // The kernel may cap below the request (rmem_max); not fatal.
        warn!("recv buffer request of {recv_buffer} bytes failed: {e}");
    }

    let join = multicast_group.filter(|_| cfg.mode == IngestMode::Normal);
    let bind_addr = match join {
        // Multicast traffic arrives regardless of the bound unicast address;
        // bind the port on the wildcard and let the join select the group.
        Some(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), addr.port()),
        None => addr,
    };
    socket.bind(&bind_addr.into())?;

    let socket: UdpSocket = socket.into();

    if let Some(group) = join {
        let iface = match &cfg.interface {
            Some(s) => s.parse::<Ipv4Addr>().map_err(|_| GatewayError::BadInterface {
                value: s.clone(),
            })?,
            None => Ipv4Addr::UNSPECIFIED,
        };
        socket.join_multicast_v4(&group, &iface)?;
        info!("joined multicast group {group} on {iface}");
    } else {
        debug!("unicast bind on {bind_addr}, no multicast join");
    }

    socket.set_read_timeout(Some(READ_TIMEOUT))?;
    Ok(socket)
}

/// Blocking receive loop for the gateway thread.
///
/// Delivers each datagram to `on_datagram`. The shutdown flag is polled
/// between reads; the read timeout bounds how stale that poll can get.
/// Socket errors other than timeouts are logged and retried with a capped
/// backoff — the loop exits only on shutdown.
pub fn run_receive_loop(
    socket: &UdpSocket,
    shutdown: &Arc<AtomicBool>,
    mut on_datagram: impl FnMut(&[u8]),
) {
    let mut buf = [0u8; MAX_DATAGRAM];
    let mut backoff = Duration::from_millis(1);
    const BACKOFF_CAP: Duration = Duration::from_millis(100);

    while !shutdown.load(Ordering::Relaxed) {
        match socket.recv(&mut buf) {
            Ok(n) => {
                backoff = Duration::from_millis(1);
                on_datagram(&buf[..n]);
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                // Read timeout: just re-check the shutdown flag.
            }
            Err(e) => {
                warn!("socket read failed, retrying in {backoff:?}: {e}");
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(BACKOFF_CAP);
            }
        }
    }
    info!("receive loop stopped");
}
