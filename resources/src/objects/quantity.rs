use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// One gibibyte in bytes.
pub const GI: i64 = 1 << 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,
    #[error("invalid number in quantity {0:?}")]
    InvalidNumber(String),
    #[error("unknown suffix {suffix:?} in quantity {quantity:?}")]
    UnknownSuffix { quantity: String, suffix: String },
    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// How a quantity prefers to be printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Powers of 1024: Ki, Mi, Gi, Ti, Pi, Ei.
    BinarySI,
    /// Powers of 1000: k, M, G, T, P, E, and the milli suffix m.
    DecimalSI,
}

/// A fixed-point resource amount such as `500m`, `1.5G` or `2Gi`.
///
/// The value is kept as an exact count of thousandths,
/// anything finer is rounded up.
/// Equality and ordering only look at the value, never at the format.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    millis: i128,
    format: Format,
}

impl Quantity {
    /// An amount of bytes printed with binary suffixes.
    pub const fn binary(bytes: i64) -> Self {
        Self {
            millis: bytes as i128 * 1000,
            format: Format::BinarySI,
        }
    }

    /// A plain amount (e.g. cores) printed with decimal suffixes.
    pub const fn decimal(value: i64) -> Self {
        Self {
            millis: value as i128 * 1000,
            format: Format::DecimalSI,
        }
    }

    pub fn milli_value(&self) -> i128 {
        self.millis
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.millis == 0
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.cmp(&other.millis)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(QuantityError::Empty);
        }
        // Resource amounts are never negative
        let unsigned = s.strip_prefix('+').unwrap_or(s);
        if unsigned.starts_with(|c: char| c == '+' || c == '-') {
            return Err(QuantityError::InvalidNumber(s.to_owned()));
        }
        let split = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(split);
        let out_of_range = || QuantityError::OutOfRange(s.to_owned());

        // (multiplier, divisor, format)
        let (multiplier, divisor, format): (i128, i128, Format) = match suffix {
            "" => (1, 1, Format::DecimalSI),
            "m" => (1, 1000, Format::DecimalSI),
            "k" => (10_i128.pow(3), 1, Format::DecimalSI),
            "M" => (10_i128.pow(6), 1, Format::DecimalSI),
            "G" => (10_i128.pow(9), 1, Format::DecimalSI),
            "T" => (10_i128.pow(12), 1, Format::DecimalSI),
            "P" => (10_i128.pow(15), 1, Format::DecimalSI),
            "E" => (10_i128.pow(18), 1, Format::DecimalSI),
            "Ki" => (1 << 10, 1, Format::BinarySI),
            "Mi" => (1 << 20, 1, Format::BinarySI),
            "Gi" => (1 << 30, 1, Format::BinarySI),
            "Ti" => (1 << 40, 1, Format::BinarySI),
            "Pi" => (1 << 50, 1, Format::BinarySI),
            "Ei" => (1 << 60, 1, Format::BinarySI),
            _ => match exponent(suffix) {
                Some(exp) if exp >= 0 => (
                    10_i128.checked_pow(exp as u32).ok_or_else(out_of_range)?,
                    1,
                    Format::DecimalSI,
                ),
                Some(exp) => (
                    1,
                    10_i128
                        .checked_pow(exp.unsigned_abs())
                        .ok_or_else(out_of_range)?,
                    Format::DecimalSI,
                ),
                None => {
                    return Err(QuantityError::UnknownSuffix {
                        quantity: s.to_owned(),
                        suffix: suffix.to_owned(),
                    })
                },
            },
        };

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if (int_part.is_empty() && frac_part.is_empty()) || frac_part.contains('.') {
            return Err(QuantityError::InvalidNumber(s.to_owned()));
        }
        let digits = format!("{}{}", int_part, frac_part);
        if digits.len() > 30 {
            return Err(QuantityError::OutOfRange(s.to_owned()));
        }
        let mantissa = digits
            .parse::<i128>()
            .map_err(|_| QuantityError::InvalidNumber(s.to_owned()))?;

        let numerator = mantissa
            .checked_mul(multiplier)
            .and_then(|n| n.checked_mul(1000))
            .ok_or_else(out_of_range)?;
        let denominator = 10_i128
            .checked_pow(frac_part.len() as u32)
            .and_then(|d| d.checked_mul(divisor))
            .ok_or_else(out_of_range)?;
        // Round up, a request never shrinks
        let millis = numerator
            .checked_add(denominator - 1)
            .ok_or_else(out_of_range)?
            / denominator;

        Ok(Quantity {
            millis,
            format,
        })
    }
}

/// Decimal exponent of a suffix such as `e3` or `E-2`. A bare `E` is exa, not an exponent.
fn exponent(suffix: &str) -> Option<i32> {
    let digits = suffix
        .strip_prefix('e')
        .or_else(|| suffix.strip_prefix('E'))?;
    digits.parse().ok()
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis % 1000 != 0 {
            return write!(f, "{}m", self.millis);
        }
        let value = self.millis / 1000;
        if value == 0 {
            return write!(f, "0");
        }
        let (base, suffixes): (i128, [&str; 6]) = match self.format {
            Format::BinarySI => (1024, ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"]),
            Format::DecimalSI => (1000, ["k", "M", "G", "T", "P", "E"]),
        };
        let mut scaled = value;
        let mut unit = "";
        for suffix in suffixes {
            if scaled % base != 0 {
                break;
            }
            scaled /= base;
            unit = suffix;
        }
        write!(f, "{}{}", scaled, unit)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuantityVisitor;

        impl<'de> de::Visitor<'de> for QuantityVisitor {
            type Value = Quantity;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a quantity such as \"500m\", \"2Gi\" or 4")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Quantity, E> {
                self.visit_str(&v.to_string())
            }
        }

        deserializer.deserialize_any(QuantityVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    #[test]
    fn parse_cpu() {
        assert_eq!(q("1").milli_value(), 1000);
        assert_eq!(q("0.99").milli_value(), 990);
        assert_eq!(q("3999m").milli_value(), 3999);
        assert_eq!(q(".5").milli_value(), 500);
        assert_eq!(q("0.0001").milli_value(), 1);
    }

    #[test]
    fn parse_memory() {
        assert_eq!(q("2Gi"), Quantity::binary(2 * GI));
        assert_eq!(q("1.5G").milli_value(), 1_500_000_000_000);
        assert_eq!(q("8010M").milli_value(), 8_010_000_000_000);
        assert_eq!(q("1Ki").milli_value(), 1_024_000);
        assert_eq!(q("2048Mi"), q("2Gi"));
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Quantity>(), Err(QuantityError::Empty));
        assert!(matches!(
            "12Gb".parse::<Quantity>(),
            Err(QuantityError::UnknownSuffix { .. })
        ));
        assert!(matches!(
            "1.2.3".parse::<Quantity>(),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            "-1".parse::<Quantity>(),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            "+-1".parse::<Quantity>(),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            "1e".parse::<Quantity>(),
            Err(QuantityError::UnknownSuffix { .. })
        ));
        assert!(matches!(
            "99999999999999999999Ei".parse::<Quantity>(),
            Err(QuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn explicit_plus_sign() {
        assert_eq!(q("+2"), q("2"));
        assert_eq!(q("+1.5Gi"), q("1536Mi"));
    }

    #[test]
    fn rounding_up_cannot_overflow() {
        assert_eq!(
            "170141183460469231731.687303715M".parse::<Quantity>(),
            Err(QuantityError::OutOfRange(
                "170141183460469231731.687303715M".to_string()
            ))
        );
        assert_eq!(q("1.0000001").milli_value(), 1001);
    }

    #[test]
    fn decimal_exponents() {
        assert_eq!(q("129e6"), q("129M"));
        assert_eq!(q("1E3"), q("1k"));
        assert_eq!(q("1e12").to_string(), "1T");
        assert_eq!(q("5e-1"), q("500m"));
        assert_eq!(q("1.5e+3"), q("1500"));
        assert_eq!(q("1E"), q("1000P"));
        assert!(matches!(
            "1e100".parse::<Quantity>(),
            Err(QuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn ordering_ignores_format() {
        assert!(q("8010M") < q("8Gi"));
        assert!(q("8589934593") > q("8Gi"));
        assert!(q("4001m") > q("4"));
        assert_eq!(q("1000m"), q("1"));
    }

    #[test]
    fn canonical_display() {
        assert_eq!(q("2000Gi").to_string(), "2000Gi");
        assert_eq!(Quantity::binary(1000 * GI).to_string(), "1000Gi");
        assert_eq!(q("1024Mi").to_string(), "1Gi");
        assert_eq!(q("1.5Gi").to_string(), "1536Mi");
        assert_eq!(q("500M").to_string(), "500M");
        assert_eq!(q("1500m").to_string(), "1500m");
        assert_eq!(q("512").to_string(), "512");
        assert_eq!(q("0").to_string(), "0");
    }

    #[test]
    fn serde_accepts_numbers_and_strings() {
        let values: Vec<Quantity> = serde_json::from_str(r#"["250m", 2, 0.5]"#).unwrap();
        assert_eq!(values, vec![q("250m"), q("2"), q("500m")]);
        assert_eq!(serde_json::to_string(&q("2048Mi")).unwrap(), r#""2Gi""#);
    }
}
