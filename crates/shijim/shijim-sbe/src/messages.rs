//! Concrete message templates for the market-data schema (schema 1 v1).
//!
//! Field layouts are fixed at schema time; decoding walks each root block at
//! its declared offsets, never scanning. All price/size fields are optional
//! composite decimals (the schema declares the null mantissa sentinel).

use crate::cursor::Cursor;
use crate::decimal::Decimal;
use crate::error::SbeError;
use crate::group::GroupIter;

pub const SCHEMA_ID: u16 = 1;
pub const SCHEMA_VERSION: u16 = 1;

/// Session heartbeat; carries no body and is filtered before the ring.
pub const TEMPLATE_HEARTBEAT: u16 = 0;
/// A single executed trade.
pub const TEMPLATE_TRADE: u16 = 1;
/// Top-of-book quote (BBO) update.
pub const TEMPLATE_QUOTE: u16 = 2;
/// Incremental book update: root block plus a repeating group of entries.
pub const TEMPLATE_BOOK: u16 = 3;

/// Root block length of the trade template.
pub const TRADE_BLOCK_LENGTH: u16 = 29;
/// Root block length of the quote template.
pub const QUOTE_BLOCK_LENGTH: u16 = 46;
/// Root block length of the book template.
pub const BOOK_BLOCK_LENGTH: u16 = 10;
/// Entry block length of the book template's repeating group.
pub const BOOK_ENTRY_BLOCK_LENGTH: u16 = 32;

/// Aggressor side of a trade. Wire value 255 means "not disclosed" and
/// decodes as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    const NULL: u8 = 0xFF;

    fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    pub(crate) fn to_wire(side: Option<Side>) -> u8 {
        match side {
            Some(Side::Buy) => 0,
            Some(Side::Sell) => 1,
            None => Self::NULL,
        }
    }
}

/// Book-entry classification (`MDEntryType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdEntryType {
    Bid,
    Ask,
    /// A type this consumer does not act on; preserved so callers can count
    /// or skip without failing the whole frame.
    Unknown(u8),
}

impl MdEntryType {
    fn from_wire(raw: u8) -> Self {
        match raw {
            0 => MdEntryType::Bid,
            1 => MdEntryType::Ask,
            other => MdEntryType::Unknown(other),
        }
    }

    pub(crate) fn to_wire(self) -> u8 {
        match self {
            MdEntryType::Bid => 0,
            MdEntryType::Ask => 1,
            MdEntryType::Unknown(raw) => raw,
        }
    }
}

/// Decoded trade (template 1).
///
/// Root block: `transact_time u64 @0, symbol_id u16 @8, side u8 @10,
/// price decimal @11, qty decimal @20`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeMsg {
    pub transact_time: u64,
    pub symbol_id: u16,
    pub side: Option<Side>,
    pub price: Option<Decimal>,
    pub qty: Option<Decimal>,
}

impl TradeMsg {
    pub(crate) fn decode(block: &[u8]) -> Result<Self, SbeError> {
        let mut cur = Cursor::new(block);
        Ok(Self {
            transact_time: cur.u64()?,
            symbol_id: cur.u16()?,
            side: Side::from_wire(cur.u8()?),
            price: Decimal::decode(&mut cur)?,
            qty: Decimal::decode(&mut cur)?,
        })
    }
}

/// Decoded top-of-book quote (template 2).
///
/// Root block: `transact_time u64 @0, symbol_id u16 @8, bid_price @10,
/// bid_qty @19, ask_price @28, ask_qty @37` (decimals are 9 bytes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteMsg {
    pub transact_time: u64,
    pub symbol_id: u16,
    pub bid_price: Option<Decimal>,
    pub bid_qty: Option<Decimal>,
    pub ask_price: Option<Decimal>,
    pub ask_qty: Option<Decimal>,
}

impl QuoteMsg {
    pub(crate) fn decode(block: &[u8]) -> Result<Self, SbeError> {
        let mut cur = Cursor::new(block);
        Ok(Self {
            transact_time: cur.u64()?,
            symbol_id: cur.u16()?,
            bid_price: Decimal::decode(&mut cur)?,
            bid_qty: Decimal::decode(&mut cur)?,
            ask_price: Decimal::decode(&mut cur)?,
            ask_qty: Decimal::decode(&mut cur)?,
        })
    }
}

/// One entry of a book update's repeating group.
///
/// Entry block: `entry_type u8 @0, price decimal @1, qty decimal @10`,
/// padded to the declared entry block length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdEntry {
    pub entry_type: MdEntryType,
    pub price: Option<Decimal>,
    pub qty: Option<Decimal>,
}

impl MdEntry {
    fn decode(block: &[u8]) -> Result<Self, SbeError> {
        let mut cur = Cursor::new(block);
        Ok(Self {
            entry_type: MdEntryType::from_wire(cur.u8()?),
            price: Decimal::decode(&mut cur)?,
            qty: Decimal::decode(&mut cur)?,
        })
    }
}

/// Lazy, zero-copy iterator over a book update's entries.
///
/// The group extent was bounds-checked when the message was decoded; each
/// entry still decodes through its own cursor, so an entry block shorter
/// than the schema's fields reports `BufferUnderflow` for that entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdEntries<'a> {
    raw: GroupIter<'a>,
}

impl<'a> MdEntries<'a> {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl<'a> Iterator for MdEntries<'a> {
    type Item = Result<MdEntry, SbeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.raw.next().map(MdEntry::decode)
    }
}

/// Decoded book update (template 3).
///
/// Root block: `transact_time u64 @0, symbol_id u16 @8`; the entry group
/// follows the root block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookMsg<'a> {
    pub transact_time: u64,
    pub symbol_id: u16,
    pub entries: MdEntries<'a>,
}

impl<'a> BookMsg<'a> {
    pub(crate) fn decode(block: &[u8], cur: &mut Cursor<'a>) -> Result<Self, SbeError> {
        let mut root = Cursor::new(block);
        let transact_time = root.u64()?;
        let symbol_id = root.u16()?;
        let entries = MdEntries {
            raw: GroupIter::open(cur)?,
        };
        Ok(Self {
            transact_time,
            symbol_id,
            entries,
        })
    }
}
