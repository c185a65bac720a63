use std::io;

/// Failures surfaced at region creation/attach time.
///
/// The publish and consume hot paths never return these; they report
/// truncation, drops and overruns through counters and typed outcomes
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    #[error("failed to map region '{name}'")]
    Map {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("region '{name}' already exists (pass force to overwrite)")]
    AlreadyExists { name: String },

    #[error("bad region magic {found:#010x}")]
    BadMagic { found: u32 },

    #[error("region format version {found} unsupported (expected {expected})")]
    VersionMismatch { found: u16, expected: u16 },

    #[error("invalid ring geometry: {reason}")]
    BadGeometry { reason: &'static str },

    #[error("region is {actual} bytes but the header implies {required}")]
    Undersized { actual: usize, required: usize },
}
