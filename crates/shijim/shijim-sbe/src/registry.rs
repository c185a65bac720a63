//! Schema registry and template dispatch.

use crate::cursor::Cursor;
use crate::error::SbeError;
use crate::header::MessageHeader;
use crate::messages::{
    BookMsg, QuoteMsg, SCHEMA_ID, SCHEMA_VERSION, TEMPLATE_BOOK, TEMPLATE_HEARTBEAT,
    TEMPLATE_QUOTE, TEMPLATE_TRADE, TradeMsg,
};

/// One decoded message. Borrowed variants reference the input frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SbeMessage<'a> {
    Heartbeat,
    Trade(TradeMsg),
    Quote(QuoteMsg),
    Book(BookMsg<'a>),
}

/// Running totals of non-fatal decode failures. Read-only to callers; the
/// registry updates them as it decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeCounters {
    pub underflow: u64,
    pub unknown_template: u64,
    pub schema_mismatch: u64,
    pub malformed: u64,
}

/// Decodes frames belonging to one `(schema_id, version)` pair.
///
/// Dispatch is a match on template id into the [`SbeMessage`] sum; there is
/// no per-template registration at runtime, the templates of a schema are
/// known at compile time.
pub struct SchemaRegistry {
    schema_id: u16,
    version: u16,
    counters: DecodeCounters,
}

impl SchemaRegistry {
    pub fn new(schema_id: u16, version: u16) -> Self {
        Self {
            schema_id,
            version,
            counters: DecodeCounters::default(),
        }
    }

    /// Registry for the market-data schema this crate defines.
    pub fn market_data_v1() -> Self {
        Self::new(SCHEMA_ID, SCHEMA_VERSION)
    }

    pub fn counters(&self) -> DecodeCounters {
        self.counters
    }

    /// Decodes one frame into its typed message.
    ///
    /// The root block is claimed at its declared `block_length` before field
    /// extraction, so trailing bytes of an evolved (longer) block are skipped
    /// and repeating groups are found at the right offset either way.
    pub fn decode<'a>(&mut self, frame: &'a [u8]) -> Result<SbeMessage<'a>, SbeError> {
        let out = self.decode_inner(frame);
        if let Err(e) = &out {
            match e {
                SbeError::BufferUnderflow { .. } => self.counters.underflow += 1,
                SbeError::UnknownTemplate { .. } => self.counters.unknown_template += 1,
                SbeError::SchemaMismatch { .. } => self.counters.schema_mismatch += 1,
                SbeError::MalformedComposite { .. } => self.counters.malformed += 1,
            }
        }
        out
    }

    fn decode_inner<'a>(&self, frame: &'a [u8]) -> Result<SbeMessage<'a>, SbeError> {
        let mut cur = Cursor::new(frame);
        let header = MessageHeader::decode(&mut cur)?;

        if header.schema_id != self.schema_id || header.version != self.version {
            return Err(SbeError::SchemaMismatch {
                schema_id: header.schema_id,
                version: header.version,
            });
        }

        let block = cur.take(header.block_length as usize)?;
        match header.template_id {
            TEMPLATE_HEARTBEAT => Ok(SbeMessage::Heartbeat),
            TEMPLATE_TRADE => Ok(SbeMessage::Trade(TradeMsg::decode(block)?)),
            TEMPLATE_QUOTE => Ok(SbeMessage::Quote(QuoteMsg::decode(block)?)),
            TEMPLATE_BOOK => Ok(SbeMessage::Book(BookMsg::decode(block, &mut cur)?)),
            template_id => Err(SbeError::UnknownTemplate { template_id }),
        }
    }
}
