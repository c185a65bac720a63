use crate::cursor::Cursor;
use crate::error::SbeError;

/// Encoded size of the message header.
pub const HEADER_SIZE: usize = 8;

/// The 8-byte SBE message header, little-endian:
/// `{block_length, template_id, schema_id, version}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Bytes of the fixed root block that follows this header.
    pub block_length: u16,
    /// Selects the message layout.
    pub template_id: u16,
    /// Identifies the schema this frame was encoded against.
    pub schema_id: u16,
    /// Schema version.
    pub version: u16,
}

impl MessageHeader {
    /// Decodes the header and advances the cursor past it.
    pub fn decode(cur: &mut Cursor<'_>) -> Result<Self, SbeError> {
        Ok(Self {
            block_length: cur.u16()?,
            template_id: cur.u16()?,
            schema_id: cur.u16()?,
            version: cur.u16()?,
        })
    }

    /// Reads the header off the front of a raw frame without consuming it.
    ///
    /// This is what the ingest-side filter uses: one fixed-cost parse to
    /// decide admit/drop before anything is published.
    pub fn peek(frame: &[u8]) -> Result<Self, SbeError> {
        let mut cur = Cursor::new(frame);
        Self::decode(&mut cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_all_four_fields_le() {
        let buf = [0x2E, 0x00, 0x02, 0x00, 0x01, 0x00, 0x01, 0x00];
        let mut cur = Cursor::new(&buf);
        let h = MessageHeader::decode(&mut cur).unwrap();
        assert_eq!(h.block_length, 46);
        assert_eq!(h.template_id, 2);
        assert_eq!(h.schema_id, 1);
        assert_eq!(h.version, 1);
        assert_eq!(cur.consumed(), HEADER_SIZE);
    }

    #[test]
    fn short_frame_is_underflow() {
        assert!(matches!(
            MessageHeader::peek(&[0x01, 0x02, 0x03]),
            Err(SbeError::BufferUnderflow { .. })
        ));
    }
}
