// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Exact decimal values.
//!
//! A decimal is an unscaled integer plus a scale: `unscaled * 10^-scale`.
//! Precision is the number of significant digits carried, never less than
//! the digit count of the unscaled value.

use num_bigint::{BigInt, Sign};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Plain notation is used while the adjusted exponent stays at or above this.
const PLAIN_EXPONENT_FLOOR: i64 = -6;

/// Errors building or parsing a [`Decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("empty decimal literal")]
    Empty,

    #[error("invalid decimal literal `{0}`")]
    InvalidLiteral(String),

    #[error("decimal scale {0} is outside 0..=4294967295")]
    ScaleOutOfRange(i64),

    #[error("precision {precision} is smaller than the {digits} digits of the unscaled value")]
    PrecisionTooSmall { precision: u32, digits: u32 },
}

/// Exact decimal number of arbitrary precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    unscaled: BigInt,
    scale: u32,
    precision: u32,
}

impl Decimal {
    /// Create a decimal whose precision is the digit count of `unscaled`.
    pub fn new(unscaled: impl Into<BigInt>, scale: u32) -> Self {
        let unscaled = unscaled.into();
        let precision = digit_count(&unscaled);
        Self {
            unscaled,
            scale,
            precision,
        }
    }

    /// Create a decimal with an explicit precision.
    pub fn from_parts(
        unscaled: impl Into<BigInt>,
        scale: u32,
        precision: u32,
    ) -> Result<Self, DecimalError> {
        let unscaled = unscaled.into();
        let digits = digit_count(&unscaled);
        if precision < digits {
            return Err(DecimalError::PrecisionTooSmall { precision, digits });
        }
        Ok(Self {
            unscaled,
            scale,
            precision,
        })
    }

    /// Rebuild a decimal from its big-endian two's-complement unscaled bytes.
    pub fn from_unscaled_bytes(
        bytes: &[u8],
        scale: u32,
        precision: u32,
    ) -> Result<Self, DecimalError> {
        if bytes.is_empty() {
            return Err(DecimalError::Empty);
        }
        Self::from_parts(BigInt::from_signed_bytes_be(bytes), scale, precision)
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Minimal big-endian two's-complement encoding of the unscaled value.
    ///
    /// Zero encodes as a single `0x00` byte.
    pub fn unscaled_bytes(&self) -> Vec<u8> {
        self.unscaled.to_signed_bytes_be()
    }
}

fn digit_count(unscaled: &BigInt) -> u32 {
    let digits = unscaled.magnitude().to_str_radix(10).len();
    u32::try_from(digits).unwrap_or(u32::MAX)
}

impl fmt::Display for Decimal {
    /// Plain notation for moderate scales, `d.dddE-n` once the adjusted
    /// exponent drops below -6 so huge scales never expand into zeros.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.unscaled.sign() == Sign::Minus {
            "-"
        } else {
            ""
        };
        let digits = self.unscaled.magnitude().to_str_radix(10);
        if self.scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }

        let len = digits.len();
        let scale = self.scale as usize;
        let adjusted = len as i64 - 1 - i64::from(self.scale);
        if adjusted < PLAIN_EXPONENT_FLOOR {
            let (lead, rest) = digits.split_at(1);
            write!(f, "{}{}", sign, lead)?;
            if !rest.is_empty() {
                write!(f, ".{}", rest)?;
            }
            return write!(f, "E{}", adjusted);
        }

        if len > scale {
            let (int_part, frac_part) = digits.split_at(len - scale);
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        } else {
            write!(f, "{}0.{:0>width$}", sign, digits, width = scale)
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    /// Parse `[-+]digits[.digits][E[-+]exponent]`.
    ///
    /// The scale is the number of fraction digits minus the exponent and
    /// must land in the `u32` range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DecimalError::Empty);
        }
        let invalid = || DecimalError::InvalidLiteral(s.to_string());

        let (negative, body) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(at) => {
                let exponent: i64 = body[at + 1..].parse().map_err(|_| invalid())?;
                (&body[..at], exponent)
            }
            None => (body, 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(invalid());
        }

        let digits = format!("{}{}", int_part, frac_part);
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        let unscaled = if negative { -magnitude } else { magnitude };

        let frac_len = i64::try_from(frac_part.len()).map_err(|_| invalid())?;
        let scale = frac_len
            .checked_sub(exponent)
            .ok_or(DecimalError::ScaleOutOfRange(i64::MIN))?;
        let scale = u32::try_from(scale).map_err(|_| DecimalError::ScaleOutOfRange(scale))?;
        Ok(Self::new(unscaled, scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let d: Decimal = "-12.345".parse().expect("parse");
        assert_eq!(d.unscaled(), &BigInt::from(-12345));
        assert_eq!(d.scale(), 3);
        assert_eq!(d.precision(), 5);
        assert_eq!(d.to_string(), "-12.345");

        let small: Decimal = "0.05".parse().expect("parse");
        assert_eq!(small.unscaled(), &BigInt::from(5));
        assert_eq!(small.scale(), 2);
        assert_eq!(small.to_string(), "0.05");

        let whole: Decimal = "42".parse().expect("parse");
        assert_eq!(whole.scale(), 0);
        assert_eq!(whole.to_string(), "42");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Decimal>(), Err(DecimalError::Empty));
        assert!(matches!(
            "1.2.3".parse::<Decimal>(),
            Err(DecimalError::InvalidLiteral(_))
        ));
        assert!(matches!(
            "abc".parse::<Decimal>(),
            Err(DecimalError::InvalidLiteral(_))
        ));
        assert!(matches!(
            ".".parse::<Decimal>(),
            Err(DecimalError::InvalidLiteral(_))
        ));
    }

    #[test]
    fn test_unscaled_bytes_are_minimal() {
        assert_eq!(Decimal::new(0, 0).unscaled_bytes(), vec![0x00]);
        assert_eq!(Decimal::new(127, 0).unscaled_bytes(), vec![0x7F]);
        assert_eq!(Decimal::new(128, 0).unscaled_bytes(), vec![0x00, 0x80]);
        assert_eq!(Decimal::new(-1, 0).unscaled_bytes(), vec![0xFF]);
        assert_eq!(Decimal::new(-128, 0).unscaled_bytes(), vec![0x80]);
        assert_eq!(Decimal::new(-129, 0).unscaled_bytes(), vec![0xFF, 0x7F]);
    }

    #[test]
    fn test_unscaled_bytes_sign_extend_on_rebuild() {
        for unscaled in [0, 1, -1, 255, -256, 123_456_789, i128::MAX, i128::MIN] {
            let d = Decimal::new(unscaled, 4);
            let rebuilt = Decimal::from_unscaled_bytes(&d.unscaled_bytes(), 4, d.precision())
                .expect("rebuild");
            assert_eq!(rebuilt, d);
        }
    }

    #[test]
    fn test_precision_validation() {
        assert!(Decimal::from_parts(12345, 2, 10).is_ok());
        assert_eq!(
            Decimal::from_parts(12345, 2, 3),
            Err(DecimalError::PrecisionTooSmall {
                precision: 3,
                digits: 5
            })
        );
        assert_eq!(
            Decimal::from_unscaled_bytes(&[], 0, 1),
            Err(DecimalError::Empty)
        );
    }

    #[test]
    fn test_beyond_128_bits() {
        let literal = "1234567890123456789012345678901234567890.5";
        let d: Decimal = literal.parse().expect("parse");
        assert_eq!(d.scale(), 1);
        assert_eq!(d.precision(), 41);
        assert_eq!(d.to_string(), literal);

        let rebuilt = Decimal::from_unscaled_bytes(&d.unscaled_bytes(), 1, 41).expect("rebuild");
        assert_eq!(rebuilt, d);

        // 2^128 needs 17 bytes
        let mut bytes = vec![0x01];
        bytes.extend_from_slice(&[0u8; 16]);
        let big = Decimal::from_unscaled_bytes(&bytes, 0, 39).expect("17 bytes");
        assert_eq!(big.to_string(), "340282366920938463463374607431768211456");
        assert_eq!(big.unscaled_bytes(), bytes);

        let negative = Decimal::new(-BigInt::from(u128::MAX), 3);
        assert_eq!(negative.unscaled_bytes().len(), 17);
        assert_eq!(
            Decimal::from_unscaled_bytes(&negative.unscaled_bytes(), 3, negative.precision()),
            Ok(negative)
        );
    }

    #[test]
    fn test_large_scale_uses_exponent() {
        let tiny = Decimal::new(5, u32::MAX);
        assert_eq!(tiny.to_string(), "5E-4294967295");
        assert_eq!(tiny.to_string().parse::<Decimal>(), Ok(tiny));

        let spread = Decimal::new(-123, 102);
        assert_eq!(spread.to_string(), "-1.23E-100");
        assert_eq!("-1.23E-100".parse::<Decimal>(), Ok(spread));

        // adjusted exponent -6 still prints plain
        assert_eq!(Decimal::new(1, 6).to_string(), "0.000001");
        assert_eq!(Decimal::new(1, 7).to_string(), "1E-7");
        assert_eq!(Decimal::new(0, 9).to_string(), "0E-9");
    }

    #[test]
    fn test_exponent_scale_bounds() {
        assert_eq!(
            "1.5E+3".parse::<Decimal>(),
            Err(DecimalError::ScaleOutOfRange(-2))
        );
        assert_eq!(
            "1E-4294967296".parse::<Decimal>(),
            Err(DecimalError::ScaleOutOfRange(4_294_967_296))
        );
        assert_eq!("12E1".parse::<Decimal>().map(|d| d.to_string()), Err(DecimalError::ScaleOutOfRange(-1)));
        assert_eq!("1.25e1".parse::<Decimal>().map(|d| d.to_string()), Ok("12.5".to_string()));
        assert!(matches!(
            "1E".parse::<Decimal>(),
            Err(DecimalError::InvalidLiteral(_))
        ));
    }
}
