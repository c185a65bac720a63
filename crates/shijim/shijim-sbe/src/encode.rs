//! Encoders for the market-data templates.
//!
//! The production wire source is the exchange, but the encoders earn their
//! keep in round-trip property tests, loopback integration drivers and
//! benchmarks — one authority for the byte layout shared with the decoders.

use crate::decimal::{DECIMAL_NULL_MANTISSA, Decimal};
use crate::header::MessageHeader;
use crate::messages::{
    BOOK_BLOCK_LENGTH, BOOK_ENTRY_BLOCK_LENGTH, MdEntryType, QUOTE_BLOCK_LENGTH, SCHEMA_ID,
    SCHEMA_VERSION, Side, TEMPLATE_BOOK, TEMPLATE_HEARTBEAT, TEMPLATE_QUOTE, TEMPLATE_TRADE,
    TRADE_BLOCK_LENGTH,
};

fn put_header(buf: &mut Vec<u8>, block_length: u16, template_id: u16) {
    let h = MessageHeader {
        block_length,
        template_id,
        schema_id: SCHEMA_ID,
        version: SCHEMA_VERSION,
    };
    buf.extend_from_slice(&h.block_length.to_le_bytes());
    buf.extend_from_slice(&h.template_id.to_le_bytes());
    buf.extend_from_slice(&h.schema_id.to_le_bytes());
    buf.extend_from_slice(&h.version.to_le_bytes());
}

fn put_decimal(buf: &mut Vec<u8>, d: Option<Decimal>) {
    match d {
        Some(d) => {
            buf.extend_from_slice(&d.mantissa.to_le_bytes());
            buf.push(d.exponent as u8);
        }
        None => {
            buf.extend_from_slice(&DECIMAL_NULL_MANTISSA.to_le_bytes());
            buf.push(0);
        }
    }
}

/// Encodes a heartbeat frame (header only, empty root block).
pub fn encode_heartbeat() -> Vec<u8> {
    let mut buf = Vec::with_capacity(8);
    put_header(&mut buf, 0, TEMPLATE_HEARTBEAT);
    buf
}

/// Encodes a trade frame.
pub fn encode_trade(
    transact_time: u64,
    symbol_id: u16,
    side: Option<Side>,
    price: Option<Decimal>,
    qty: Option<Decimal>,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + TRADE_BLOCK_LENGTH as usize);
    put_header(&mut buf, TRADE_BLOCK_LENGTH, TEMPLATE_TRADE);
    buf.extend_from_slice(&transact_time.to_le_bytes());
    buf.extend_from_slice(&symbol_id.to_le_bytes());
    buf.push(Side::to_wire(side));
    put_decimal(&mut buf, price);
    put_decimal(&mut buf, qty);
    buf
}

/// Encodes a top-of-book quote frame.
pub fn encode_quote(
    transact_time: u64,
    symbol_id: u16,
    bid_price: Option<Decimal>,
    bid_qty: Option<Decimal>,
    ask_price: Option<Decimal>,
    ask_qty: Option<Decimal>,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + QUOTE_BLOCK_LENGTH as usize);
    put_header(&mut buf, QUOTE_BLOCK_LENGTH, TEMPLATE_QUOTE);
    buf.extend_from_slice(&transact_time.to_le_bytes());
    buf.extend_from_slice(&symbol_id.to_le_bytes());
    put_decimal(&mut buf, bid_price);
    put_decimal(&mut buf, bid_qty);
    put_decimal(&mut buf, ask_price);
    put_decimal(&mut buf, ask_qty);
    buf
}

/// Encodes a book update with one group entry per `(type, price, qty)`.
pub fn encode_book(
    transact_time: u64,
    symbol_id: u16,
    entries: &[(MdEntryType, Option<Decimal>, Option<Decimal>)],
) -> Vec<u8> {
    let entry_len = BOOK_ENTRY_BLOCK_LENGTH as usize;
    let mut buf =
        Vec::with_capacity(8 + BOOK_BLOCK_LENGTH as usize + 4 + entries.len() * entry_len);
    put_header(&mut buf, BOOK_BLOCK_LENGTH, TEMPLATE_BOOK);
    buf.extend_from_slice(&transact_time.to_le_bytes());
    buf.extend_from_slice(&symbol_id.to_le_bytes());

    // Group header, then fixed-size entries padded to the block length.
    buf.extend_from_slice(&BOOK_ENTRY_BLOCK_LENGTH.to_le_bytes());
    buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for &(entry_type, price, qty) in entries {
        let start = buf.len();
        buf.push(entry_type.to_wire());
        put_decimal(&mut buf, price);
        put_decimal(&mut buf, qty);
        buf.resize(start + entry_len, 0);
    }
    buf
}
