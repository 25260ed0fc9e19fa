use std::fmt::{self, Display};

use crate::consts::NULL_FIELD;

///
/// Value of an auxiliary BED column.
///
/// Raw text is converted to an integer if it parses as one, otherwise to a float,
/// otherwise it is kept as text. The `.` placeholder becomes `Null`.
///
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl ColumnValue {
    pub fn parse(raw: &str) -> Self {
        if raw == NULL_FIELD {
            return ColumnValue::Null;
        }
        if let Ok(val) = raw.parse::<i64>() {
            return ColumnValue::Int(val);
        }
        if let Ok(val) = raw.parse::<f64>() {
            return ColumnValue::Float(val);
        }
        ColumnValue::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int(val) => Some(*val),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int(val) => Some(*val as f64),
            ColumnValue::Float(val) => Some(*val),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(val) => Some(val),
            _ => None,
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Int(value)
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        ColumnValue::Float(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ColumnValue::Null, Into::into)
    }
}

impl Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Null => write!(f, "{}", NULL_FIELD),
            ColumnValue::Int(val) => write!(f, "{}", val),
            ColumnValue::Float(val) => write!(f, "{}", val),
            ColumnValue::Text(val) => write!(f, "{}", val),
        }
    }
}
