//! Fixed-point numbers
//!
//! All numeric CSS values are kept as signed 22.10 fixed-point numbers. This keeps compiled
//! declarations and computed styles bit-for-bit deterministic, no matter on which platform they
//! were produced.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Number of fractional bits
pub const RADIX_POINT: u32 = 10;

/// Largest integer part that can be represented
const MAX_INT_PART: i64 = (1 << (31 - RADIX_POINT)) - 1;

/// A signed 22.10 fixed-point number
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << RADIX_POINT);
    pub const MAX: Fixed = Fixed(i32::MAX);
    pub const MIN: Fixed = Fixed(i32::MIN);

    /// Wraps a raw 22.10 value
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    /// Returns the raw 22.10 value
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts an integer, saturating when it does not fit the integer part
    #[must_use]
    pub const fn from_int(value: i32) -> Self {
        let v = value as i64;
        let v = if v > MAX_INT_PART {
            MAX_INT_PART
        } else if v < -MAX_INT_PART {
            -MAX_INT_PART
        } else {
            v
        };
        Fixed((v << RADIX_POINT) as i32)
    }

    /// Returns the integer part, rounding towards negative infinity
    #[must_use]
    pub const fn to_int(self) -> i32 {
        self.0 >> RADIX_POINT
    }

    #[must_use]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1 << RADIX_POINT) as f32
    }

    /// Returns true when there is no fractional part
    #[must_use]
    pub const fn is_integer(self) -> bool {
        self.0 & ((1 << RADIX_POINT) - 1) == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parses a number at the start of `text`.
    ///
    /// Accepts an optional sign, digits and (unless `int_only` is set) a fractional part. Returns
    /// the value together with the number of bytes consumed. When no digits were found, zero
    /// bytes are consumed. Values that are out of range saturate.
    #[must_use]
    pub fn parse(text: &str, int_only: bool) -> (Fixed, usize) {
        let bytes = text.as_bytes();
        let mut pos = 0;
        let mut negative = false;

        if let Some(&c) = bytes.first() {
            if c == b'-' || c == b'+' {
                negative = c == b'-';
                pos += 1;
            }
        }

        let mut int_part: i64 = 0;
        let mut digits = 0;
        while let Some(&c) = bytes.get(pos) {
            if !c.is_ascii_digit() {
                break;
            }
            if int_part <= MAX_INT_PART {
                int_part = int_part * 10 + i64::from(c - b'0');
            }
            pos += 1;
            digits += 1;
        }

        let mut frac_part: i64 = 0;
        let mut denominator: i64 = 1;
        if !int_only && bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
            pos += 1;
            while let Some(&c) = bytes.get(pos) {
                if !c.is_ascii_digit() {
                    break;
                }
                // Digits beyond this precision no longer influence the 10 fractional bits
                if denominator < 10_000_000 {
                    frac_part = frac_part * 10 + i64::from(c - b'0');
                    denominator *= 10;
                }
                pos += 1;
                digits += 1;
            }
        }

        if digits == 0 {
            return (Fixed::ZERO, 0);
        }

        let mut raw = if int_part > MAX_INT_PART {
            (MAX_INT_PART << RADIX_POINT) | ((1 << RADIX_POINT) - 1)
        } else {
            (int_part << RADIX_POINT) + (frac_part << RADIX_POINT) / denominator
        };
        if negative {
            raw = -raw;
        }

        (Fixed(raw as i32), pos)
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Fixed::from_int(value)
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(rhs.0))
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Fixed) -> Fixed {
        let v = (i64::from(self.0) * i64::from(rhs.0)) >> RADIX_POINT;
        Fixed(v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }
}

impl Div for Fixed {
    type Output = Fixed;

    /// Division by zero saturates towards the sign of the dividend
    fn div(self, rhs: Fixed) -> Fixed {
        if rhs.0 == 0 {
            return if self.0 < 0 { Fixed::MIN } else { Fixed::MAX };
        }
        let v = (i64::from(self.0) << RADIX_POINT) / i64::from(rhs.0);
        Fixed(v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = i64::from(self.0).abs();
        let int_part = abs >> RADIX_POINT;
        // Three decimals are enough to tell 10 fractional bits apart
        let frac = ((abs & ((1 << RADIX_POINT) - 1)) * 1000 + (1 << (RADIX_POINT - 1))) >> RADIX_POINT;
        if frac == 0 {
            write!(f, "{sign}{int_part}")
        } else {
            let frac = format!("{frac:03}");
            write!(f, "{sign}{int_part}.{}", frac.trim_end_matches('0'))
        }
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("12", false, 12 << 10, 2; "integer")]
    #[test_case("-3px", false, -(3 << 10), 2; "negative with trailing unit")]
    #[test_case("+1.5", false, 1536, 4; "explicit plus sign")]
    #[test_case(".5em", false, 512, 2; "leading dot")]
    #[test_case("1.5", true, 1 << 10, 1; "integer only stops at the dot")]
    #[test_case("1.", false, 1 << 10, 1; "dot without digits is not consumed")]
    #[test_case("px", false, 0, 0; "no digits")]
    #[test_case("-", false, 0, 0; "sign only")]
    fn parse_numbers(input: &str, int_only: bool, raw: i32, consumed: usize) {
        assert_eq!(Fixed::parse(input, int_only), (Fixed::from_raw(raw), consumed));
    }

    #[test]
    fn parse_saturates() {
        let (value, consumed) = Fixed::parse("99999999999", false);
        assert_eq!(consumed, 11);
        assert_eq!(value.to_int(), (1 << 21) - 1);
    }

    #[test]
    fn arithmetic() {
        let a = Fixed::from_int(3);
        let b = Fixed::parse("1.5", false).0;
        assert_eq!(a * b, Fixed::parse("4.5", false).0);
        assert_eq!(a / Fixed::from_int(2), b);
        assert_eq!(-a, Fixed::from_int(-3));
        assert!(Fixed::from_int(2).is_integer());
        assert!(!b.is_integer());
        assert_eq!(Fixed::ONE / Fixed::ZERO, Fixed::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(Fixed::from_int(12).to_string(), "12");
        assert_eq!(Fixed::parse("-1.5", false).0.to_string(), "-1.5");
        assert_eq!(Fixed::parse("0.25", false).0.to_string(), "0.25");
    }
}
