//! Metric values.
//!
//! Integer counts and fractional timings/percentages are kept apart so that a
//! snapshot written and read back carries `5` as `5` and `5.0` as `5.0`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A numeric measurement, integer or floating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Number::Int(_))
    }

    /// JSON has no NaN or infinity; serde_json writes those as `null`.
    pub fn is_finite(self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(v) => v.is_finite(),
        }
    }

    /// Convert a parsed JSON number, preferring the integer form when exact.
    pub fn from_json(n: &serde_json::Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            return Some(Number::Int(i));
        }
        n.as_f64().map(Number::Float)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            // Debug keeps the trailing ".0" on whole floats.
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Number {
            fn from(v: $t) -> Self {
                Number::Int(i64::from(v))
            }
        })*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Number::Int(i),
            Err(_) => Number::Float(v as f64),
        }
    }
}

impl From<usize> for Number {
    fn from(v: usize) -> Self {
        Number::from(v as u64)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::Float(f64::from(v))
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

/// A value stored under a metric name.
///
/// `Text` exists for sentinel entries such as `<name>__error` and network
/// error descriptions; everything else is numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(Number),
    Text(String),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<Number> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    /// False only for a NaN or infinite float.
    pub fn is_finite(&self) -> bool {
        self.as_number().map_or(true, Number::is_finite)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetricValue::Text(s) => Some(s),
            MetricValue::Number(_) => None,
        }
    }

    /// Convert a JSON scalar. Booleans, nulls and containers are not metrics.
    pub fn from_json(v: &serde_json::Value) -> Option<Self> {
        match v {
            serde_json::Value::Number(n) => Number::from_json(n).map(MetricValue::Number),
            serde_json::Value::String(s) => Some(MetricValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => n.fmt(f),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<Number> for MetricValue {
    fn from(v: Number) -> Self {
        MetricValue::Number(v)
    }
}

macro_rules! value_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for MetricValue {
            fn from(v: $t) -> Self {
                MetricValue::Number(Number::from(v))
            }
        })*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}
