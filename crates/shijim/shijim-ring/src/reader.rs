//! Consumer side of the ring: cursor tracking, overrun detection, zero-copy
//! frame views.

use crate::error::RingError;
use crate::layout::{
    RegionHeader, SLOT_FLAGS_OFFSET, SLOT_LEN_OFFSET, SLOT_PAYLOAD_OFFSET, SLOT_SEQ_OFFSET,
    SLOT_TS_OFFSET, seq_to_index,
};
use crate::region::SharedRegion;
use std::ptr;
use std::slice;
use std::sync::atomic::{AtomicU64, Ordering};

/// Where a freshly attached reader starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StartMode {
    /// Follow the tail: first `next()` returns frames published after attach.
    #[default]
    Latest,
    /// Start at sequence 0 and replay whatever is still resident in the ring.
    Beginning,
}

/// A zero-copy view of one published frame.
///
/// The payload slice points straight into the shared mapping. It is valid
/// only until the producer laps this slot; consumers must finish (or copy
/// out) before issuing long pauses. The mid-read re-check in `next()` is a
/// best-effort torn-read detector, not a guarantee.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Ring-wide sequence number of this frame.
    pub seq: u64,
    /// Slot flags ([`crate::FLAG_TRUNCATED`] is the only defined bit).
    pub flags: u16,
    /// Producer monotonic clock at publish.
    pub publish_ts_ns: u64,
    /// Published payload bytes, borrowed from the mapped slot.
    pub payload: &'a [u8],
}

/// Outcome of one `next()` poll.
#[derive(Debug)]
pub enum ReadOutcome<'a> {
    /// The next frame in sequence.
    Frame(FrameView<'a>),
    /// Nothing new published.
    Empty,
    /// The producer lapped this reader; `gap` frames were lost and the
    /// cursor has been advanced to the current write position.
    Overrun { gap: u64 },
}

/// An independent consumer of a ring region.
///
/// Each reader owns its cursor; readers never coordinate with each other or
/// with the producer. Attach is read-only (the mapping itself is mapped
/// without write permission).
pub struct RingReader {
    /// Owns the mmap lifetime; kept alive but not directly accessed after init.
    region: SharedRegion,
    /// Cached pointer to the first slot.
    slots_base: *const u8,
    mask: u64,
    slot_size: usize,
    payload_capacity: usize,
    /// Sequence number of the next frame this reader wants.
    expected_seq: u64,
    /// Cumulative count of frames lost to overruns.
    overruns: u64,
    /// `latest()` calls that lost the race between cursor load and slot
    /// validation.
    transient_miss: u64,
}

// One reader per consumer thread; Send to allow handing it to that thread.
unsafe impl Send for RingReader {}

impl RingReader {
    /// Attaches read-only to an existing region.
    ///
    /// Fails if the region does not exist or its magic/version/geometry is
    /// not ours.
    pub fn attach(name: &str, start: StartMode) -> Result<Self, RingError> {
        let region = SharedRegion::attach(name)?;
        let cfg = region.config();
        let slots_base = region.slots_base();

        let expected_seq = match start {
            // Acquire pairs with the producer's release store, so everything
            // published before attach is visible if we later step backwards.
            StartMode::Latest => region.header().write_cursor.load(Ordering::Acquire),
            StartMode::Beginning => 0,
        };

        Ok(Self {
            region,
            slots_base,
            mask: cfg.mask(),
            slot_size: cfg.slot_size,
            payload_capacity: cfg.payload_capacity(),
            expected_seq,
            overruns: 0,
            transient_miss: 0,
        })
    }

    #[inline(always)]
    fn header(&self) -> &RegionHeader {
        self.region.header()
    }

    #[inline(always)]
    fn slot(&self, idx: u64) -> *const u8 {
        // SAFETY: idx is always masked into [0, slot_count).
        unsafe { self.slots_base.add(idx as usize * self.slot_size) }
    }

    #[inline(always)]
    fn slot_seq(&self, slot: *const u8) -> &AtomicU64 {
        // SAFETY: slots are cache-line aligned, so the seq word at offset 0
        // is 8-byte aligned and valid for atomic loads.
        unsafe { &*(slot.add(SLOT_SEQ_OFFSET) as *const AtomicU64) }
    }

    /// Reads a slot's metadata without forming a borrow of the payload.
    ///
    /// The stored length is clamped to the slot capacity so a torn slot can
    /// never produce an out-of-bounds slice; the caller re-checks `seq_num`
    /// before trusting what it read.
    #[inline(always)]
    fn slot_meta(&self, slot: *const u8) -> (usize, u16, u64) {
        // SAFETY: len/flags/ts lie within the slot header.
        unsafe {
            let len = (ptr::read_unaligned(slot.add(SLOT_LEN_OFFSET) as *const u16) as usize)
                .min(self.payload_capacity);
            let flags = ptr::read_unaligned(slot.add(SLOT_FLAGS_OFFSET) as *const u16);
            let ts = ptr::read_unaligned(slot.add(SLOT_TS_OFFSET) as *const u64);
            (len, flags, ts)
        }
    }

    /// Polls for the next frame in sequence.
    ///
    /// Non-blocking. Returns:
    /// - `Frame` with a zero-copy view when the expected sequence is resident
    /// - `Empty` when the reader is caught up (or the slot is stale)
    /// - `Overrun { gap }` when the producer lapped the reader; the cursor is
    ///   then advanced to the current write position (skip-to-latest)
    #[inline(always)]
    pub fn next(&mut self) -> ReadOutcome<'_> {
        let w = self.header().write_cursor.load(Ordering::Acquire);
        if self.expected_seq >= w {
            return ReadOutcome::Empty;
        }

        let slot = self.slot(seq_to_index(self.expected_seq, self.mask));
        let seq = self.slot_seq(slot).load(Ordering::Acquire);

        if seq == self.expected_seq {
            let (len, flags, publish_ts_ns) = self.slot_meta(slot);

            // Re-check: if the producer wrapped all the way around while the
            // metadata was read, the slot is torn and the frame is lost.
            let seq2 = self.slot_seq(slot).load(Ordering::Acquire);
            if seq2 != seq {
                return self.skip_to_latest(seq2);
            }

            self.expected_seq += 1;
            // SAFETY: len is clamped to the payload region of a slot the
            // mapping covers.
            let payload = unsafe { slice::from_raw_parts(slot.add(SLOT_PAYLOAD_OFFSET), len) };
            return ReadOutcome::Frame(FrameView {
                seq,
                flags,
                publish_ts_ns,
                payload,
            });
        }

        if seq > self.expected_seq {
            // Slot already carries a newer generation: lapped.
            return self.skip_to_latest(seq);
        }

        // seq < expected: slot not yet rewritten for this generation.
        ReadOutcome::Empty
    }

    /// Skip-to-latest recovery. The reported gap is the lap distance the
    /// slot revealed (`observed_seq - expected_seq`); the overrun counter
    /// instead accounts every frame bypassed by the jump, so
    /// `frames read + overruns() == write_cursor` stays balanced.
    #[inline(always)]
    fn skip_to_latest(&mut self, observed_seq: u64) -> ReadOutcome<'static> {
        let gap = observed_seq - self.expected_seq;
        let resume_at = self.header().write_cursor.load(Ordering::Acquire);
        self.overruns += resume_at - self.expected_seq;
        self.expected_seq = resume_at;
        ReadOutcome::Overrun { gap }
    }

    /// Snapshots the most recently published frame, if any.
    ///
    /// Returns `None` on an empty ring, and also when the slot is republished
    /// between the cursor load and validation (counted in
    /// [`transient_miss`](Self::transient_miss); no internal retry, callers
    /// re-poll if they want the fresher frame).
    pub fn latest(&mut self) -> Option<FrameView<'_>> {
        let c = self.header().write_cursor.load(Ordering::Acquire);
        if c == 0 {
            return None;
        }

        let want = c - 1;
        let slot = self.slot(seq_to_index(want, self.mask));
        if self.slot_seq(slot).load(Ordering::Acquire) != want {
            self.transient_miss += 1;
            return None;
        }

        let (len, flags, publish_ts_ns) = self.slot_meta(slot);
        if self.slot_seq(slot).load(Ordering::Acquire) != want {
            self.transient_miss += 1;
            return None;
        }

        // SAFETY: len is clamped to the payload region of a slot the mapping
        // covers.
        let payload = unsafe { slice::from_raw_parts(slot.add(SLOT_PAYLOAD_OFFSET), len) };
        Some(FrameView {
            seq: want,
            flags,
            publish_ts_ns,
            payload,
        })
    }

    /// The sequence number this reader expects next.
    pub fn cursor(&self) -> u64 {
        self.expected_seq
    }

    /// Moves the cursor forward to `seq` (never backwards).
    pub fn advance(&mut self, seq: u64) {
        self.expected_seq = self.expected_seq.max(seq);
    }

    /// Current region-level publish cursor.
    pub fn write_cursor(&self) -> u64 {
        self.header().write_cursor.load(Ordering::Acquire)
    }

    /// Total frames skipped by overrun recovery since attach.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// `latest()` races lost since attach.
    pub fn transient_miss(&self) -> u64 {
        self.transient_miss
    }
}
