//! Producer side of the ring: slot reservation, payload copy, publish fence.

use crate::clock::monotonic_ns;
use crate::error::RingError;
use crate::layout::{
    FLAG_TRUNCATED, RegionHeader, RingConfig, SLOT_FLAGS_OFFSET, SLOT_LEN_OFFSET,
    SLOT_PAYLOAD_OFFSET, SLOT_SEQ_OFFSET, SLOT_TS_OFFSET, seq_to_index,
};
use crate::region::WritableRegion;
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Policy for payloads larger than the slot capacity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum JumboPolicy {
    /// Publish the first `slot_size - SLOT_HEADER_SIZE` bytes and set
    /// [`FLAG_TRUNCATED`] on the slot.
    #[default]
    Truncate,
    /// Skip the frame entirely; `write_cursor` does not advance.
    Drop,
}

/// The single producer of a ring region.
///
/// `publish` is wait-free: no allocation, no syscalls (one `clock_gettime`
/// vDSO read for the timestamp), no blocking. Behavior with more than one
/// concurrent publisher on the same region is undefined; nothing enforces
/// single-producer at runtime.
pub struct RingWriter {
    /// Owns the mmap lifetime; kept alive but not directly accessed after init.
    _region: WritableRegion,
    /// Raw pointer to the region header.
    base: *mut u8,
    /// Cached pointer to the first slot.
    slots_base: *mut u8,
    mask: u64,
    slot_size: usize,
    payload_capacity: usize,
    policy: JumboPolicy,
    truncated: u64,
    dropped: u64,
}

// The writer owns its mapping and is handed to exactly one producer thread.
// It is Send (move into the receiver thread) but deliberately not Sync.
unsafe impl Send for RingWriter {}

impl RingWriter {
    /// Creates the region and the producer handle with the default
    /// truncation policy.
    pub fn create(name: &str, cfg: RingConfig, force: bool) -> Result<Self, RingError> {
        Self::with_policy(name, cfg, force, JumboPolicy::default())
    }

    /// Creates the region with an explicit jumbo-frame policy.
    pub fn with_policy(
        name: &str,
        cfg: RingConfig,
        force: bool,
        policy: JumboPolicy,
    ) -> Result<Self, RingError> {
        let mut region = WritableRegion::create(name, cfg, force)?;
        let base = region.base();
        let slots_base = region.slots_base();
        Ok(Self {
            _region: region,
            base,
            slots_base,
            mask: cfg.mask(),
            slot_size: cfg.slot_size,
            payload_capacity: cfg.payload_capacity(),
            policy,
            truncated: 0,
            dropped: 0,
        })
    }

    #[inline(always)]
    fn header(&self) -> &RegionHeader {
        // SAFETY: base points at the header the region initialized.
        unsafe { &*(self.base as *const RegionHeader) }
    }

    /// Publishes one payload, returning its sequence number.
    ///
    /// Returns `None` only under [`JumboPolicy::Drop`] when the payload
    /// exceeds the slot capacity; the cursor does not move in that case.
    ///
    /// # Ordering
    /// Payload bytes and slot metadata are written first; the slot `seq_num`
    /// is then stored with release ordering, and finally `write_cursor` with
    /// release ordering. A consumer observing `write_cursor >= k + 1` is
    /// guaranteed to see the complete slot contents for sequence `k`.
    #[inline(always)]
    pub fn publish(&mut self, payload: &[u8]) -> Option<u64> {
        // Only this thread stores the cursor, so a relaxed read is exact.
        let k = self.header().write_cursor.load(Ordering::Relaxed);
        let idx = seq_to_index(k, self.mask);

        let mut len = payload.len();
        let mut flags = 0u16;
        if len > self.payload_capacity {
            match self.policy {
                JumboPolicy::Drop => {
                    self.dropped += 1;
                    return None;
                }
                JumboPolicy::Truncate => {
                    len = self.payload_capacity;
                    flags |= FLAG_TRUNCATED;
                    self.truncated += 1;
                }
            }
        }

        // SAFETY: idx is masked into bounds; the slot region is sized for
        // slot_size bytes and len <= payload_capacity.
        unsafe {
            let slot = self.slots_base.add(idx as usize * self.slot_size);
            ptr::copy_nonoverlapping(payload.as_ptr(), slot.add(SLOT_PAYLOAD_OFFSET), len);
            ptr::write_unaligned(slot.add(SLOT_LEN_OFFSET) as *mut u16, len as u16);
            ptr::write_unaligned(slot.add(SLOT_FLAGS_OFFSET) as *mut u16, flags);
            ptr::write_unaligned(slot.add(SLOT_TS_OFFSET) as *mut u64, monotonic_ns());

            // Slot becomes observable for sequence k only after the payload
            // bytes above.
            let seq = &*(slot.add(SLOT_SEQ_OFFSET) as *const AtomicU64);
            seq.store(k, Ordering::Release);

            self.header().write_cursor.store(k + 1, Ordering::Release);
        }

        Some(k)
    }

    /// Current publish cursor (count of published slots).
    #[inline(always)]
    pub fn cursor(&self) -> u64 {
        self.header().write_cursor.load(Ordering::Relaxed)
    }

    /// Frames cut to capacity under [`JumboPolicy::Truncate`].
    pub fn truncated(&self) -> u64 {
        self.truncated
    }

    /// Frames skipped under [`JumboPolicy::Drop`].
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
