//! `gateway-core`: the ingestion gateway's receive path.
//!
//! A dedicated thread blocks on a UDP socket (multicast group or unicast
//! loopback), runs each datagram through the template filter, and publishes
//! survivors into the shared-memory ring. The publish path performs no
//! allocation and no syscalls beyond the socket read itself.
//!
//! ```text
//! [UDP socket] -> [FrameFilter] -> [RingWriter] -> shm region
//! ```

mod engine;
mod error;
mod filter;
mod receiver;

pub use engine::{GatewayEngine, GatewayStats};
pub use error::GatewayError;
pub use filter::{FrameFilter, Verdict};
pub use receiver::{bind_socket, run_receive_loop};
