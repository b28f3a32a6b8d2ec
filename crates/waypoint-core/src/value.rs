// Request parameter values
// Scalar-or-array values bound to components and carried in URLs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use waypoint_error::StateError;

/// A request parameter value.
///
/// `Object` is the composite kind: it may travel inside a request but can
/// never be persisted into a URL.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
    Object(BTreeMap<String, ParamValue>),
}

/// Coercion target of a persistent parameter or signal argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Bool,
    Int,
    Float,
    String,
    Array,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => write!(f, "bool"),
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::String => write!(f, "string"),
            ParamType::Array => write!(f, "array"),
        }
    }
}

impl FromStr for ParamType {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(ParamType::Bool),
            "int" | "integer" => Ok(ParamType::Int),
            "float" | "double" => Ok(ParamType::Float),
            "string" => Ok(ParamType::String),
            "array" => Ok(ParamType::Array),
            other => Err(StateError::Coercion {
                kind: other.to_string(),
                target: "type".to_string(),
            }),
        }
    }
}

impl ParamValue {
    /// Whether the value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Whether the value is a composite that may not be persisted
    pub fn is_object(&self) -> bool {
        matches!(self, ParamValue::Object(_))
    }

    /// Name of the value kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Null => "NULL",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "double",
            ParamValue::Str(_) => "string",
            ParamValue::List(_) => "array",
            ParamValue::Object(_) => "object",
        }
    }

    /// The coercion target implied by this value when used as a default.
    /// `Null` and composites imply no type.
    pub fn implied_type(&self) -> Option<ParamType> {
        match self {
            ParamValue::Bool(_) => Some(ParamType::Bool),
            ParamValue::Int(_) => Some(ParamType::Int),
            ParamValue::Float(_) => Some(ParamType::Float),
            ParamValue::Str(_) => Some(ParamType::String),
            ParamValue::List(_) => Some(ParamType::Array),
            ParamValue::Null | ParamValue::Object(_) => None,
        }
    }

    /// Text form of a scalar; `None` for lists and composites.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ParamValue::Null => Some(String::new()),
            ParamValue::Bool(true) => Some("1".to_string()),
            ParamValue::Bool(false) => Some(String::new()),
            ParamValue::Int(i) => Some(i.to_string()),
            ParamValue::Float(f) => Some(f.to_string()),
            ParamValue::Str(s) => Some(s.clone()),
            ParamValue::List(_) | ParamValue::Object(_) => None,
        }
    }

    /// Whether the value reads as an empty string (`Null`, `false`, `""`)
    pub fn is_empty_text(&self) -> bool {
        matches!(self.as_text(), Some(text) if text.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Loosely converts the value to `target`.
    ///
    /// Strings convert to numbers through their leading numeric prefix,
    /// `""` and `"0"` are false, scalars wrap into one-element lists.
    /// Composites never convert.
    pub fn coerce(&self, target: ParamType) -> Result<ParamValue, StateError> {
        if let ParamValue::Object(_) = self {
            return Err(StateError::Coercion {
                kind: self.kind().to_string(),
                target: target.to_string(),
            });
        }

        let value = match target {
            ParamType::Bool => ParamValue::Bool(self.truthy()),
            ParamType::Int => ParamValue::Int(self.to_int()),
            ParamType::Float => ParamValue::Float(self.to_float()),
            ParamType::String => match self.as_text() {
                Some(text) => ParamValue::Str(text),
                None => ParamValue::Str("Array".to_string()),
            },
            ParamType::Array => match self {
                ParamValue::Null => ParamValue::List(Vec::new()),
                ParamValue::List(_) => self.clone(),
                scalar => ParamValue::List(vec![scalar.clone()]),
            },
        };
        Ok(value)
    }

    fn truthy(&self) -> bool {
        match self {
            ParamValue::Null => false,
            ParamValue::Bool(b) => *b,
            ParamValue::Int(i) => *i != 0,
            ParamValue::Float(f) => *f != 0.0,
            ParamValue::Str(s) => !(s.is_empty() || s == "0"),
            ParamValue::List(items) => !items.is_empty(),
            ParamValue::Object(_) => true,
        }
    }

    fn to_int(&self) -> i64 {
        match self {
            ParamValue::Null => 0,
            ParamValue::Bool(b) => i64::from(*b),
            ParamValue::Int(i) => *i,
            ParamValue::Float(f) if f.is_finite() => *f as i64,
            ParamValue::Float(_) => 0,
            ParamValue::Str(s) => int_prefix(s),
            ParamValue::List(items) => i64::from(!items.is_empty()),
            ParamValue::Object(_) => 1,
        }
    }

    fn to_float(&self) -> f64 {
        match self {
            ParamValue::Float(f) => *f,
            ParamValue::Str(s) => float_prefix(s),
            other => other.to_int() as f64,
        }
    }
}

/// Parses the leading integer of `s`, ignoring leading whitespace
fn int_prefix(s: &str) -> i64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }
    match s[..end].parse::<i64>() {
        Ok(i) => i,
        Err(_) if bytes[0] == b'-' => i64::MIN,
        Err(_) => i64::MAX,
    }
}

/// Parses the leading decimal number of `s`, ignoring leading whitespace
fn float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mantissa_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == mantissa_start || &s[mantissa_start..end] == "." {
        return 0.0;
    }
    // exponent only counts when followed by digits
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ParamValue::Object(_) => write!(f, "{{object}}"),
            scalar => write!(f, "{}", scalar.as_text().unwrap_or_default()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Null)
    }
}
