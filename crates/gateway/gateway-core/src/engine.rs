//! Filter-then-publish wiring for the gateway thread.

use crate::error::GatewayError;
use crate::filter::{FrameFilter, Verdict};
use gateway_config::{GatewayConfig, JumboMode};
use shijim_ring::{JumboPolicy, RingConfig, RingWriter};
use tracing::trace;

/// Read-only snapshot of the gateway's counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayStats {
    pub received: u64,
    pub published: u64,
    pub heartbeats: u64,
    pub filtered: u64,
    pub malformed: u64,
    pub truncated: u64,
    pub dropped: u64,
}

/// Owns the ring writer and the filter; consumes datagrams from the
/// receive loop.
pub struct GatewayEngine {
    writer: RingWriter,
    filter: FrameFilter,
    received: u64,
    published: u64,
}

impl GatewayEngine {
    /// Creates the shared-memory region and the filter from configuration.
    pub fn new(cfg: &GatewayConfig, force: bool) -> Result<Self, GatewayError> {
        let ring_cfg = RingConfig::new(cfg.slot_size, cfg.slot_count);
        let policy = match cfg.jumbo {
            JumboMode::Truncate => JumboPolicy::Truncate,
            JumboMode::Drop => JumboPolicy::Drop,
        };
        let writer = RingWriter::with_policy(&cfg.shm_name, ring_cfg, force, policy)?;
        Ok(Self {
            writer,
            filter: FrameFilter::new(&cfg.admitted_templates),
            received: 0,
            published: 0,
        })
    }

    /// Filters one datagram and publishes it if admitted.
    #[inline(always)]
    pub fn on_datagram(&mut self, frame: &[u8]) {
        self.received += 1;
        match self.filter.check(frame) {
            Verdict::Admit => {
                if self.writer.publish(frame).is_some() {
                    self.published += 1;
                }
            }
            verdict => trace!(?verdict, len = frame.len(), "datagram dropped"),
        }
    }

    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            received: self.received,
            published: self.published,
            heartbeats: self.filter.heartbeats(),
            filtered: self.filter.filtered(),
            malformed: self.filter.malformed(),
            truncated: self.writer.truncated(),
            dropped: self.writer.dropped(),
        }
    }

    /// Sequence count published so far (the ring's write cursor).
    pub fn cursor(&self) -> u64 {
        self.writer.cursor()
    }
}
