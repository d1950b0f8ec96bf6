use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Numeric spec value as it appeared in the source text
///
/// `"8"` stays an integer and `"6.5"` stays a float, so values written back
/// to CSV keep the shape they were scraped in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecNumber {
    Int(i64),
    Float(f64),
}

impl SpecNumber {
    /// Parses a captured token: float if it contains a decimal point, integer otherwise
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.contains('.') {
            token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Float)
        } else {
            token.parse::<i64>().ok().map(Self::Int)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
        }
    }

    /// Returns the value as an integer when it is integral and non-negative
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Int(v) => u32::try_from(*v).ok(),
            Self::Float(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64 => {
                Some(*v as u32)
            }
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for SpecNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for SpecNumber {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SpecNumber {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl Serialize for SpecNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

struct SpecNumberVisitor;

impl<'de> Visitor<'de> for SpecNumberVisitor {
    type Value = SpecNumber;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or decimal number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(SpecNumber::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(SpecNumber::Int)
            .map_err(|_| E::custom(format!("spec value {} out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(SpecNumber::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        SpecNumber::parse(v).ok_or_else(|| E::custom(format!("invalid spec value '{}'", v)))
    }
}

impl<'de> Deserialize<'de> for SpecNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SpecNumberVisitor)
    }
}
