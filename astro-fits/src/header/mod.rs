pub(crate) mod parser;

pub use parser::{Header, HeaderCard, HeaderParser};

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

impl KeywordValue {
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            KeywordValue::Logical(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            KeywordValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to reals, so `TSCALn = 1` and `TSCALn = 1.0` read alike.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            KeywordValue::Real(v) => Some(*v),
            KeywordValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            KeywordValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for KeywordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordValue::Logical(true) => write!(f, "T"),
            KeywordValue::Logical(false) => write!(f, "F"),
            KeywordValue::Integer(v) => write!(f, "{}", v),
            KeywordValue::Real(v) => write!(f, "{}", v),
            KeywordValue::String(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Option<KeywordValue>,
    pub comment: Option<String>,
}

impl Keyword {
    pub fn new(name: String) -> Self {
        Self {
            name,
            value: None,
            comment: None,
        }
    }

    pub fn with_value(mut self, value: KeywordValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_comment(mut self, comment: String) -> Self {
        self.comment = Some(comment);
        self
    }
}
