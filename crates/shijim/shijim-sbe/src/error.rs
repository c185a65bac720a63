/// Decode failures. All abort the current message only; the decoder holds no
/// state across messages, so the caller simply moves to the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SbeError {
    /// A declared size exceeds the bytes actually available.
    #[error("buffer underflow: need {needed} more bytes, {remaining} remain")]
    BufferUnderflow { needed: usize, remaining: usize },

    /// No decoder is registered for this template id.
    #[error("unknown template id {template_id}")]
    UnknownTemplate { template_id: u16 },

    /// The frame's schema id/version is not the one this registry decodes.
    #[error("schema {schema_id} version {version} is incompatible")]
    SchemaMismatch { schema_id: u16, version: u16 },

    /// A composite field carries a value outside its supported range.
    #[error("malformed composite: exponent {exponent} out of range")]
    MalformedComposite { exponent: i8 },
}
