use core::fmt;

use serde::{Deserialize, Serialize};

/// A value carried by oral messages. `Zero` and `One` are the only values a
/// correct run can decide on. `Unknown` marks "no majority, and the default
/// does not apply"; it is also a legal Byzantine payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    Zero,
    One,
    Unknown,
}

impl Value {
    /// Whether this value can stand as a final decision.
    pub fn is_decided(&self) -> bool {
        matches!(self, Value::Zero | Value::One)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Zero => write!(f, "0"),
            Value::One => write!(f, "1"),
            Value::Unknown => write!(f, "?"),
        }
    }
}
