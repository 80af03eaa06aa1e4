//! `TFORMn` parsing for binary table columns.
//!
//! A binary table format is `rTa`: an optional repeat count `r`, a single
//! type code `T`, and optional trailing characters `a` that only matter for
//! variable-length array descriptors (`P`/`Q`), which are not supported.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Logical,
    Bit,
    Byte,
    Short,
    Int,
    Long,
    Text,
    Float,
    Double,
}

impl ColumnType {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'L' => Some(ColumnType::Logical),
            'X' => Some(ColumnType::Bit),
            'B' => Some(ColumnType::Byte),
            'I' => Some(ColumnType::Short),
            'J' => Some(ColumnType::Int),
            'K' => Some(ColumnType::Long),
            'A' => Some(ColumnType::Text),
            'E' => Some(ColumnType::Float),
            'D' => Some(ColumnType::Double),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            ColumnType::Logical => 'L',
            ColumnType::Bit => 'X',
            ColumnType::Byte => 'B',
            ColumnType::Short => 'I',
            ColumnType::Int => 'J',
            ColumnType::Long => 'K',
            ColumnType::Text => 'A',
            ColumnType::Float => 'E',
            ColumnType::Double => 'D',
        }
    }

    fn element_size(&self) -> usize {
        match self {
            ColumnType::Logical | ColumnType::Byte | ColumnType::Text => 1,
            ColumnType::Short => 2,
            ColumnType::Int | ColumnType::Float => 4,
            ColumnType::Long | ColumnType::Double => 8,
            ColumnType::Bit => 1,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::Byte | ColumnType::Short | ColumnType::Int | ColumnType::Long
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFormat {
    pub kind: ColumnType,
    pub repeat: usize,
}

impl ColumnFormat {
    pub fn new(kind: ColumnType, repeat: usize) -> Self {
        Self { kind, repeat }
    }

    pub fn parse(tform: &str) -> Option<Self> {
        let tform = tform.trim();
        let digits_end = tform
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tform.len());
        let repeat = if digits_end == 0 {
            1
        } else {
            tform[..digits_end].parse().ok()?
        };
        let code = tform[digits_end..].chars().next()?;
        let kind = ColumnType::from_code(code)?;
        Some(Self { kind, repeat })
    }

    /// Bytes occupied in one table row, `None` if that overflows `usize`.
    pub fn byte_width(&self) -> Option<usize> {
        match self.kind {
            ColumnType::Bit => Some(self.repeat.div_ceil(8)),
            _ => self.repeat.checked_mul(self.kind.element_size()),
        }
    }

    /// Decoded values per row: a text field is a single string, a bit field
    /// is kept as its packed bytes.
    pub fn values_per_row(&self) -> usize {
        match self.kind {
            ColumnType::Text => 1,
            ColumnType::Bit => self.repeat.div_ceil(8),
            _ => self.repeat,
        }
    }
}

impl fmt::Display for ColumnFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.repeat, self.kind.code())
    }
}
