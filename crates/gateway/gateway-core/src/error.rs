use shijim_ring::RingError;
use std::io;

/// Gateway initialization failures. All of these are fatal: the process
/// reports them and exits (bind/init -> exit code 2 at the CLI).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid bind address '{addr}'")]
    BadBind {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("multicast reception requires an IPv4 group, got '{addr}'")]
    NotIpv4 { addr: String },

    #[error("invalid interface address '{value}'")]
    BadInterface { value: String },

    #[error("socket setup failed")]
    Socket(#[from] io::Error),

    #[error(transparent)]
    Ring(#[from] RingError),
}
