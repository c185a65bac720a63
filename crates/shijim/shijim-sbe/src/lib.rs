//! `shijim-sbe`: streaming decoder for the market-data wire format.
//!
//! Messages are Simple Binary Encoding frames: an 8-byte header selecting a
//! template, a fixed-offset root block, and optionally repeating groups of
//! fixed-size entries. Decoding is zero-copy — decoded messages borrow from
//! the input slice (typically a ring slot payload) and allocate nothing.
//!
//! Every read is bounds-checked up front; a frame that declares more bytes
//! than it carries fails with [`SbeError::BufferUnderflow`] before any
//! partial state is exposed.
//!
//! # Internal modules
//!
//! - `cursor`: bounds-checked little-endian reads
//! - `header`: the 8-byte message header
//! - `decimal`: composite fixed-point decimal with null sentinel
//! - `group`: repeating-group header and entry iteration
//! - `messages`: concrete templates (trade / quote / book) and field offsets
//! - `registry`: schema dispatch into the tagged [`SbeMessage`] sum
//! - `encode`: encoders for the same templates (round-trip tests, loopback
//!   drivers)

mod cursor;
mod decimal;
mod encode;
mod error;
mod group;
mod header;
mod messages;
mod registry;

pub use cursor::Cursor;
pub use decimal::{DECIMAL_NULL_MANTISSA, DECIMAL_SIZE, Decimal};
pub use encode::{encode_book, encode_heartbeat, encode_quote, encode_trade};
pub use error::SbeError;
pub use group::{GROUP_HEADER_SIZE, GroupHeader, GroupIter};
pub use header::{HEADER_SIZE, MessageHeader};
pub use messages::{
    BookMsg, MdEntries, MdEntry, MdEntryType, QuoteMsg, SCHEMA_ID, SCHEMA_VERSION, Side,
    TEMPLATE_BOOK, TEMPLATE_HEARTBEAT, TEMPLATE_QUOTE, TEMPLATE_TRADE, TradeMsg,
};
pub use registry::{DecodeCounters, SbeMessage, SchemaRegistry};
