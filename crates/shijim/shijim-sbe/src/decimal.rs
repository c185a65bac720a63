//! Composite fixed-point decimal: `{mantissa: i64, exponent: i8}`.
//!
//! Prices and quantities travel as scaled integers to keep the wire format
//! exact; conversion to `f64` happens once, at the consumer's edge.

use crate::cursor::Cursor;
use crate::error::SbeError;

/// Encoded size: 8-byte mantissa + 1-byte exponent.
pub const DECIMAL_SIZE: usize = 9;

/// Mantissa value declared null by the schema. A decimal whose raw mantissa
/// equals this decodes as `None`, never as a number.
pub const DECIMAL_NULL_MANTISSA: i64 = i64::MAX;

/// Exponents beyond ±18 exceed what an i64 mantissa can meaningfully scale
/// and are rejected as malformed.
const MAX_EXPONENT_MAGNITUDE: i8 = 18;

/// A decoded decimal value, `mantissa × 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    pub mantissa: i64,
    pub exponent: i8,
}

impl Decimal {
    pub fn new(mantissa: i64, exponent: i8) -> Self {
        Self { mantissa, exponent }
    }

    /// Decodes one composite, mapping the null sentinel to `None`.
    pub fn decode(cur: &mut Cursor<'_>) -> Result<Option<Self>, SbeError> {
        let mantissa = cur.i64()?;
        let exponent = cur.i8()?;
        if mantissa == DECIMAL_NULL_MANTISSA {
            return Ok(None);
        }
        if exponent > MAX_EXPONENT_MAGNITUDE || exponent < -MAX_EXPONENT_MAGNITUDE {
            return Err(SbeError::MalformedComposite { exponent });
        }
        Ok(Some(Self { mantissa, exponent }))
    }

    /// Converts to floating point.
    ///
    /// Negative exponents divide rather than multiply by a reciprocal: the
    /// division is correctly rounded, so representable values like
    /// `(23305, -1)` come out exactly (`2330.5`), where `23305.0 * 0.1`
    /// would double-round.
    #[inline(always)]
    pub fn to_f64(self) -> f64 {
        if self.exponent >= 0 {
            self.mantissa as f64 * 10f64.powi(self.exponent as i32)
        } else {
            self.mantissa as f64 / 10f64.powi(-(self.exponent as i32))
        }
    }
}
