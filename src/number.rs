//! Numeric payloads: arbitrary-precision decimals and integers with a radix hint.

use crate::grammar::{BINARY_PREFIX, HEX_PREFIX};
use crate::{Error, Result};
use num_bigint::{BigInt, Sign};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A base-10 number with arbitrary precision.
///
/// The value is `mantissa / 10^scale`. The scale written in the source is
/// kept for display, so `*99.90` prints back as `99.90`, while comparison is
/// numeric.
///
/// # Examples
///
/// ```rust
/// use xferlang::Decimal;
///
/// let price: Decimal = "99.90".parse().unwrap();
/// assert_eq!(price.to_string(), "99.90");
/// assert_eq!(price, "99.9".parse().unwrap());
/// assert!(price > Decimal::from(99));
/// ```
#[derive(Clone, Debug)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Decimal {
            mantissa: mantissa.into(),
            scale,
        }
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.sign() == Sign::Minus
    }

    /// Nearest `f64`; precision beyond 17 significant digits is lost.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Exact conversion of a whole value that fits in `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        let normal = self.normalize();
        if normal.scale != 0 {
            return None;
        }
        i64::try_from(&normal.mantissa).ok()
    }

    /// Removes trailing fractional zeros.
    #[must_use]
    pub fn normalize(&self) -> Decimal {
        let ten = BigInt::from(10u32);
        let mut mantissa = self.mantissa.clone();
        let mut scale = self.scale;
        while scale > 0 && (&mantissa % &ten).sign() == Sign::NoSign {
            mantissa /= &ten;
            scale -= 1;
        }
        Decimal { mantissa, scale }
    }

    fn rescaled(&self, scale: u32) -> BigInt {
        if scale <= self.scale {
            return self.mantissa.clone();
        }
        &self.mantissa * BigInt::from(10u32).pow(scale - self.scale)
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let invalid = || Error::invalid_value("decimal", text);
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let digits = format!("{}{}", whole, fraction);
        let mut mantissa = BigInt::from_str(&digits).map_err(|_| invalid())?;
        if negative {
            mantissa = -mantissa;
        }
        let scale = u32::try_from(fraction.len()).map_err(|_| invalid())?;
        Ok(Decimal { mantissa, scale })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.magnitude().to_string();
        let scale = self.scale as usize;
        if self.is_negative() {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let split = padded.len() - scale;
        write!(f, "{}.{}", &padded[..split], &padded[split..])
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.rescaled(scale).cmp(&other.rescaled(scale))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal::new(value, 0)
    }
}

impl TryFrom<f64> for Decimal {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::invalid_value("decimal", &value.to_string()));
        }
        // f64 Display never uses exponent notation
        format!("{}", value).parse()
    }
}

/// Radix a literal integer was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NumericBase {
    #[default]
    Decimal,
    /// `$` prefix
    Hexadecimal,
    /// `%` prefix
    Binary,
}

/// A 32-bit integer payload with its display radix.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegerValue {
    pub value: i32,
    pub base: NumericBase,
    /// Minimum digit count for hexadecimal and binary output.
    pub min_digits: usize,
}

/// A 64-bit integer payload with its display radix.
#[derive(Clone, Copy, Debug, Default)]
pub struct LongValue {
    pub value: i64,
    pub base: NumericBase,
    pub min_digits: usize,
}

impl IntegerValue {
    pub fn with_base(value: i32, base: NumericBase, min_digits: usize) -> Self {
        IntegerValue {
            value,
            base,
            min_digits,
        }
    }
}

impl LongValue {
    pub fn with_base(value: i64, base: NumericBase, min_digits: usize) -> Self {
        LongValue {
            value,
            base,
            min_digits,
        }
    }
}

impl From<i32> for IntegerValue {
    fn from(value: i32) -> Self {
        IntegerValue::with_base(value, NumericBase::Decimal, 0)
    }
}

impl From<i64> for LongValue {
    fn from(value: i64) -> Self {
        LongValue::with_base(value, NumericBase::Decimal, 0)
    }
}

// The radix is presentation only.
impl PartialEq for IntegerValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq for LongValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for IntegerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_integer(i128::from(self.value), self.base, self.min_digits))
    }
}

impl fmt::Display for LongValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_integer(i128::from(self.value), self.base, self.min_digits))
    }
}

/// Parses `[+-][$|%]digits` into a value, its radix and its digit count.
pub(crate) fn parse_integer(text: &str) -> Option<(i128, NumericBase, usize)> {
    let (negative, rest) = match text.chars().next()? {
        '-' => (true, &text[1..]),
        '+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (base, digits) = match rest.chars().next()? {
        HEX_PREFIX => (NumericBase::Hexadecimal, &rest[1..]),
        BINARY_PREFIX => (NumericBase::Binary, &rest[1..]),
        _ => (NumericBase::Decimal, rest),
    };
    if digits.is_empty()
        || digits.len() > 128
        || !digits.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    let radix = match base {
        NumericBase::Decimal => 10,
        NumericBase::Hexadecimal => 16,
        NumericBase::Binary => 2,
    };
    let magnitude = u128::from_str_radix(digits, radix).ok()?;
    let magnitude = i128::try_from(magnitude).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    let min_digits = match base {
        NumericBase::Decimal => 0,
        _ => digits.len(),
    };
    Some((value, base, min_digits))
}

pub(crate) fn format_integer(value: i128, base: NumericBase, min_digits: usize) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    match base {
        NumericBase::Decimal => value.to_string(),
        NumericBase::Hexadecimal => {
            format!("{}{}{:0width$X}", sign, HEX_PREFIX, magnitude, width = min_digits)
        }
        NumericBase::Binary => {
            format!("{}{}{:0width$b}", sign, BINARY_PREFIX, magnitude, width = min_digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_to_i64_is_exact() {
        let big: Decimal = "9007199254740993".parse().unwrap();
        assert_eq!(big.to_i64(), Some(9_007_199_254_740_993));
        let whole: Decimal = "-42.000".parse().unwrap();
        assert_eq!(whole.to_i64(), Some(-42));
        assert_eq!("1.5".parse::<Decimal>().unwrap().to_i64(), None);
        assert_eq!("9223372036854775808".parse::<Decimal>().unwrap().to_i64(), None);
    }

    #[test]
    fn test_decimal_parse_and_display() {
        let d: Decimal = "-0.05".parse().unwrap();
        assert_eq!(d.scale(), 2);
        assert_eq!(d.to_string(), "-0.05");
        assert_eq!("12".parse::<Decimal>().unwrap().to_string(), "12");
        assert_eq!(".5".parse::<Decimal>().unwrap().to_string(), "0.5");
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        assert!("".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("1e5".parse::<Decimal>().is_err());
        assert!("-".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_decimal_numeric_equality() {
        let a: Decimal = "1.50".parse().unwrap();
        let b: Decimal = "1.5".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.normalize().to_string(), "1.5");
        assert!(Decimal::from(2) > a);
        assert!(Decimal::new(-1, 0) < Decimal::new(0, 3));
    }

    #[test]
    fn test_decimal_from_f64() {
        let d = Decimal::try_from(0.1).unwrap();
        assert_eq!(d.to_string(), "0.1");
        assert!(Decimal::try_from(f64::NAN).is_err());
        assert_eq!(d.to_f64(), 0.1);
    }

    #[test]
    fn test_parse_integer_radix() {
        assert_eq!(parse_integer("42"), Some((42, NumericBase::Decimal, 0)));
        assert_eq!(parse_integer("-$ff"), Some((-255, NumericBase::Hexadecimal, 2)));
        assert_eq!(parse_integer("%0101"), Some((5, NumericBase::Binary, 4)));
        assert_eq!(parse_integer("+7"), Some((7, NumericBase::Decimal, 0)));
        assert_eq!(parse_integer("$"), None);
        assert_eq!(parse_integer("12a"), None);
    }

    #[test]
    fn test_format_integer_keeps_padding() {
        assert_eq!(format_integer(255, NumericBase::Hexadecimal, 4), "$00FF");
        assert_eq!(format_integer(-5, NumericBase::Binary, 0), "-%101");
        assert_eq!(IntegerValue::from(-12).to_string(), "-12");
        let long = LongValue::with_base(i64::MIN, NumericBase::Hexadecimal, 0);
        assert_eq!(long.to_string(), "-$8000000000000000");
    }
}
