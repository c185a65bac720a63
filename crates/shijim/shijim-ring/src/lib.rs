//! `shijim-ring`: single-producer, multi-consumer shared-memory ring buffer.
//!
//! This crate provides the latency-critical transport between the ingestion
//! gateway (producer) and strategy consumers:
//! - A named shared-memory region with a fixed binary layout
//! - A wait-free single-producer writer with monotonic sequence numbering
//! - Independent read-only consumers with overrun detection and zero-copy
//!   frame views
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐      shared memory region      ┌────────────┐
//! │ RingWriter │ ────────────────────────────── │ RingReader │
//! │ (gateway)  │        (mmap, rw)              │ (strategy) │
//! └────────────┘                                └────────────┘
//!                                               ┌────────────┐
//!                                               │ RingReader │
//!                                               │ (strategy) │
//!                                               └────────────┘
//! ```
//!
//! The ring holds `N` fixed-size slots (N a power of two). Each slot carries
//! its own sequence number; a slot at physical index `i` is valid for
//! sequence `s` iff `s % N == i` and the slot's stored `seq_num` equals `s`.
//! That per-slot validation is what lets readers detect being lapped without
//! any shared locks.
//!
//! # Ordering protocol
//!
//! The producer writes payload bytes first, then stores the slot `seq_num`
//! with release ordering, then advances the region-level `write_cursor` with
//! release ordering. A consumer that observes `write_cursor >= k + 1`
//! (acquire) and `seq_num == k` (acquire) therefore observes the complete
//! payload published for sequence `k`. After copying out of the view, the
//! consumer re-reads `seq_num`; a change means the producer lapped it
//! mid-read and the frame is reported as an overrun instead.
//!
//! # Slow consumers
//!
//! Overruns are detected, never prevented: the producer does not block or
//! allocate on the publish path. A lapped reader is skipped forward to the
//! current write position and told how many frames it lost.
//!
//! # Internal modules
//!
//! - `layout`: region/slot binary layout constants and the mapped header
//! - `region`: named region creation/attach and lifecycle
//! - `writer`: producer-side slot publication
//! - `reader`: consumer-side cursor tracking and frame views
//! - `clock`: monotonic/realtime nanosecond clocks

mod clock;
mod error;
mod layout;
mod reader;
mod region;
mod writer;

pub use clock::{epoch_ns, monotonic_ns};
pub use error::RingError;
pub use layout::{
    FLAG_TRUNCATED, REGION_HEADER_SIZE, REGION_MAGIC, REGION_VERSION, RingConfig,
    SLOT_HEADER_SIZE,
};
pub use reader::{FrameView, ReadOutcome, RingReader, StartMode};
pub use region::region_path;
pub use writer::{JumboPolicy, RingWriter};
