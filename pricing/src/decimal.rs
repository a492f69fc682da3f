//! Exact decimal arithmetic
//!
//! Every quantity that takes part in fee or ratio math is a [`Decimal`]: an
//! arbitrary-precision rational backed by `BigRational`. Nothing in the engine
//! ever touches binary floating point.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PricingError, Result};

/// Fractional digits shown by `Display` for values that do not terminate in base 10
pub const DISPLAY_PRECISION: usize = 24;

/// Largest decimal exponent accepted by the parser (`1e1024`)
pub const MAX_EXPONENT: i64 = 1024;

/// Exact rational number used for amounts, reserves, rates and ratios
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(BigRational);

impl Decimal {
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    /// Build `numer / denom`; `None` when the denominator is zero
    pub fn from_ratio<N: Into<BigInt>, D: Into<BigInt>>(numer: N, denom: D) -> Option<Self> {
        let denom = denom.into();
        if denom.is_zero() {
            return None;
        }
        Some(Self(BigRational::new(numer.into(), denom)))
    }

    /// `10^exponent`
    pub fn pow10(exponent: u32) -> Self {
        Self(BigRational::from_integer(BigInt::from(10u32).pow(exponent)))
    }

    /// `self * 10^exponent`, exact for negative exponents as well
    pub fn shift(&self, exponent: i32) -> Self {
        let magnitude = BigRational::from_integer(BigInt::from(10u32).pow(exponent.unsigned_abs()));
        if exponent >= 0 {
            Self(&self.0 * magnitude)
        } else {
            Self(&self.0 / magnitude)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// Largest integer not greater than `self`
    pub fn floor(&self) -> Self {
        Self(self.0.floor())
    }

    /// Smallest integer not less than `self`
    pub fn ceil(&self) -> Self {
        Self(self.0.ceil())
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Exact division; `None` instead of a panic when `rhs` is zero
    pub fn checked_div(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        Some(Self(&self.0 / &rhs.0))
    }

    /// Numerator of the reduced fraction
    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    /// Denominator of the reduced fraction (always positive)
    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn as_rational(&self) -> &BigRational {
        &self.0
    }

    /// Number of fractional digits needed to print the value exactly, or
    /// `None` if its decimal expansion does not terminate
    pub fn terminating_scale(&self) -> Option<u32> {
        let two = BigInt::from(2u32);
        let five = BigInt::from(5u32);
        let mut denom = self.0.denom().clone();
        let (mut twos, mut fives) = (0u32, 0u32);

        while (&denom % &two).is_zero() {
            denom = denom / &two;
            twos += 1;
        }
        while (&denom % &five).is_zero() {
            denom = denom / &five;
            fives += 1;
        }

        if denom.is_one() {
            Some(twos.max(fives))
        } else {
            None
        }
    }

    /// Render with at most `max_fraction_digits` digits after the point,
    /// truncating toward zero and trimming trailing zeros
    pub fn to_decimal_string(&self, max_fraction_digits: usize) -> String {
        let scale = BigInt::from(10u32).pow(max_fraction_digits as u32);
        let scaled = (self.0.abs() * BigRational::from_integer(scale.clone()))
            .trunc()
            .to_integer();
        let int_part = &scaled / &scale;
        let frac_part = &scaled % &scale;

        let mut out = String::new();
        if self.0.is_negative() && !scaled.is_zero() {
            out.push('-');
        }
        out.push_str(&int_part.to_string());
        if !frac_part.is_zero() {
            let digits = format!(
                "{:0>width$}",
                frac_part.to_string(),
                width = max_fraction_digits
            );
            out.push('.');
            out.push_str(digits.trim_end_matches('0'));
        }
        out
    }

    /// Lossless text form: a plain decimal when the expansion terminates,
    /// otherwise the reduced fraction `n/d`
    pub fn to_exact_string(&self) -> String {
        match self.terminating_scale() {
            Some(scale) => self.to_decimal_string(scale as usize),
            None => format!("{}/{}", self.0.numer(), self.0.denom()),
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = match f.precision() {
            Some(precision) => precision,
            None => self
                .terminating_scale()
                .map(|scale| scale as usize)
                .unwrap_or(DISPLAY_PRECISION),
        };
        f.write_str(&self.to_decimal_string(digits))
    }
}

impl FromStr for Decimal {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || PricingError::Parse(s.to_string());

        if let Some((numer, denom)) = trimmed.split_once('/') {
            let numer: BigInt = parse_signed_digits(numer.trim()).ok_or_else(invalid)?;
            let denom = denom.trim();
            if denom.is_empty() || !denom.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let denom: BigInt = denom.parse().map_err(|_| invalid())?;
            return Decimal::from_ratio(numer, denom).ok_or_else(invalid);
        }

        let (mantissa, exponent) = match trimmed.find(|c: char| c == 'e' || c == 'E') {
            Some(idx) => {
                let exponent: i64 = trimmed[idx + 1..].parse().map_err(|_| invalid())?;
                (&trimmed[..idx], exponent)
            }
            None => (trimmed, 0),
        };
        if exponent.abs() > MAX_EXPONENT {
            return Err(invalid());
        }

        let (negative, unsigned) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut numer: BigInt = format!("{int_part}{frac_part}")
            .parse()
            .map_err(|_| invalid())?;
        if negative {
            numer = -numer;
        }

        let shift = exponent - frac_part.len() as i64;
        let magnitude = BigInt::from(10u32).pow(shift.unsigned_abs() as u32);
        let value = if shift >= 0 {
            BigRational::from_integer(numer * magnitude)
        } else {
            BigRational::new(numer, magnitude)
        };
        Ok(Self(value))
    }
}

fn parse_signed_digits(text: &str) -> Option<BigInt> {
    let digits = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.strip_prefix('+').unwrap_or(text).parse().ok()
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Decimal {
                fn from(value: $t) -> Self {
                    Self(BigRational::from_integer(BigInt::from(value)))
                }
            }
        )*
    };
}

impl_from_integer!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Self(BigRational::from_integer(value))
    }
}

impl From<BigRational> for Decimal {
    fn from(value: BigRational) -> Self {
        Self(value)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident) => {
        impl std::ops::$trait for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                Decimal(std::ops::$trait::$method(self.0, rhs.0))
            }
        }

        impl<'a> std::ops::$trait<&'a Decimal> for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: &'a Decimal) -> Decimal {
                Decimal(std::ops::$trait::$method(self.0, &rhs.0))
            }
        }

        impl<'a> std::ops::$trait<Decimal> for &'a Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                Decimal(std::ops::$trait::$method(&self.0, rhs.0))
            }
        }

        impl<'a, 'b> std::ops::$trait<&'b Decimal> for &'a Decimal {
            type Output = Decimal;

            fn $method(self, rhs: &'b Decimal) -> Decimal {
                Decimal(std::ops::$trait::$method(&self.0, &rhs.0))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_exact_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string, a fraction string or an integer")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Decimal, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Decimal, E> {
        Ok(Decimal::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Decimal, E> {
        Ok(Decimal::from(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> std::result::Result<Decimal, E> {
        Ok(Decimal::from(value))
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> std::result::Result<Decimal, E> {
        Ok(Decimal::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Decimal, E> {
        Err(E::custom(format!(
            "binary float {value} is not accepted, quote the value as a string"
        )))
    }
}

/// Coercion of caller-supplied values into a [`Decimal`]
///
/// Reserve sources hand over strings, integers or already-parsed decimals.
/// Anything that does not coerce becomes `None`, which the engine reports as
/// "cannot compute" rather than failing.
pub trait Numeric {
    fn to_decimal(&self) -> Option<Decimal>;
}

impl Numeric for Decimal {
    fn to_decimal(&self) -> Option<Decimal> {
        Some(self.clone())
    }
}

impl Numeric for BigInt {
    fn to_decimal(&self) -> Option<Decimal> {
        Some(Decimal::from(self.clone()))
    }
}

impl Numeric for str {
    fn to_decimal(&self) -> Option<Decimal> {
        self.parse().ok()
    }
}

impl Numeric for String {
    fn to_decimal(&self) -> Option<Decimal> {
        self.as_str().to_decimal()
    }
}

impl<T: Numeric + ?Sized> Numeric for &T {
    fn to_decimal(&self) -> Option<Decimal> {
        (**self).to_decimal()
    }
}

impl<T: Numeric> Numeric for Option<T> {
    fn to_decimal(&self) -> Option<Decimal> {
        self.as_ref().and_then(Numeric::to_decimal)
    }
}

macro_rules! impl_numeric_integer {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                fn to_decimal(&self) -> Option<Decimal> {
                    Some(Decimal::from(*self))
                }
            }
        )*
    };
}

impl_numeric_integer!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_plain_and_fractional() {
        assert_eq!(dec("100"), Decimal::from(100u32));
        assert_eq!(dec("-42"), Decimal::from(-42i32));
        assert_eq!(dec("+7"), Decimal::from(7u32));
        assert_eq!(dec("0.5"), Decimal::from_ratio(1, 2).unwrap());
        assert_eq!(dec(".25"), Decimal::from_ratio(1, 4).unwrap());
        assert_eq!(dec("3."), Decimal::from(3u32));
        assert_eq!(dec("  12.500  "), Decimal::from_ratio(25, 2).unwrap());
    }

    #[test]
    fn test_parse_exponent_and_fraction_forms() {
        assert_eq!(dec("1e6"), Decimal::from(1_000_000u32));
        assert_eq!(dec("2.5E-3"), Decimal::from_ratio(1, 400).unwrap());
        assert_eq!(dec("1/3"), Decimal::from_ratio(1, 3).unwrap());
        assert_eq!(dec("-4/6"), Decimal::from_ratio(-2, 3).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "   ", "abc", "NaN", "1.2.3", "--1", "1e", "e5", "1/0", "1/-2", "0x10", "1e99999", "."] {
            assert!(bad.parse::<Decimal>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_display_terminating_and_repeating() {
        assert_eq!(Decimal::from(2_500_000u32).to_string(), "2500000");
        assert_eq!(dec("0.125").to_string(), "0.125");
        assert_eq!(dec("-0.5").to_string(), "-0.5");
        assert_eq!(
            Decimal::from_ratio(1, 3).unwrap().to_string(),
            "0.333333333333333333333333"
        );
        assert_eq!(format!("{:.2}", Decimal::from_ratio(2, 3).unwrap()), "0.66");
        assert_eq!(format!("{:.2}", Decimal::from_ratio(-1, 1000).unwrap()), "0");
    }

    #[test]
    fn test_exact_string_round_trips() {
        for value in [dec("0.0001"), Decimal::from_ratio(22, 7).unwrap(), dec("-123456789.5")] {
            let text = value.to_exact_string();
            assert_eq!(text.parse::<Decimal>().unwrap(), value);
        }
        assert_eq!(Decimal::from_ratio(22, 7).unwrap().to_exact_string(), "22/7");
    }

    #[test]
    fn test_rounding_helpers() {
        let x = Decimal::from_ratio(7, 2).unwrap();
        assert_eq!(x.floor(), Decimal::from(3u32));
        assert_eq!(x.ceil(), Decimal::from(4u32));
        assert_eq!((-x.clone()).floor(), Decimal::from(-4i32));
        assert!(x.checked_div(&Decimal::zero()).is_none());
        assert_eq!(x.checked_div(&x).unwrap(), Decimal::one());
        assert_eq!(Decimal::pow10(3), Decimal::from(1000u32));
        assert_eq!(x.shift(2), Decimal::from(350u32));
        assert_eq!(x.shift(-3), dec("0.0035"));
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let a = dec("0.1");
        let b = dec("0.2");
        assert_eq!(&a + &b, dec("0.3"));
        assert_eq!(&b - &a, a);
        assert_eq!(a.clone() * b.clone(), dec("0.02"));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!("42".to_decimal(), Some(Decimal::from(42u32)));
        assert_eq!(String::from("1.5").to_decimal(), Some(dec("1.5")));
        assert_eq!(7u64.to_decimal(), Some(Decimal::from(7u64)));
        assert_eq!((&-3i64).to_decimal(), Some(Decimal::from(-3i64)));
        assert_eq!("not a number".to_decimal(), None);
        assert_eq!(None::<u64>.to_decimal(), None);
        assert_eq!(Some("9").to_decimal(), Some(Decimal::from(9u32)));
    }

    #[test]
    fn test_serde_uses_exact_strings() {
        let third = Decimal::from_ratio(1, 3).unwrap();
        let json = serde_json::to_string(&third).unwrap();
        assert_eq!(json, "\"1/3\"");
        let back: Decimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, third);

        let from_int: Decimal = serde_json::from_str("2500000").unwrap();
        assert_eq!(from_int, Decimal::from(2_500_000u32));
        assert!(serde_json::from_str::<Decimal>("0.5").is_err());
    }
}
