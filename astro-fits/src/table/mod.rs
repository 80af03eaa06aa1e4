//! Column-addressable tables decoded from `BINTABLE` extensions.
//!
//! A [`Table`] owns its columns outright; nothing refers back to the file it
//! was read from. Row subsetting with [`Table::filter_rows`] produces a new
//! table and leaves the original untouched.

mod format;
mod hdu;

pub use format::{ColumnFormat, ColumnType};
pub use hdu::BinaryTableHdu;

use crate::{FitsError, Result};
use std::collections::HashMap;

/// 2^63, the first `f64` past `i64::MAX`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Logical(Vec<bool>),
    Byte(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Logical(v) => v.len(),
            ColumnData::Byte(v) => v.len(),
            ColumnData::Short(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Long(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Double(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, width: usize, keep: &[bool]) -> ColumnData {
        match self {
            ColumnData::Logical(v) => ColumnData::Logical(select_rows(v, width, keep)),
            ColumnData::Byte(v) => ColumnData::Byte(select_rows(v, width, keep)),
            ColumnData::Short(v) => ColumnData::Short(select_rows(v, width, keep)),
            ColumnData::Int(v) => ColumnData::Int(select_rows(v, width, keep)),
            ColumnData::Long(v) => ColumnData::Long(select_rows(v, width, keep)),
            ColumnData::Float(v) => ColumnData::Float(select_rows(v, width, keep)),
            ColumnData::Double(v) => ColumnData::Double(select_rows(v, width, keep)),
            ColumnData::Text(v) => ColumnData::Text(select_rows(v, width, keep)),
        }
    }
}

fn select_rows<T: Clone>(values: &[T], width: usize, keep: &[bool]) -> Vec<T> {
    let selected = keep.iter().filter(|&&k| k).count();
    let mut out = Vec::with_capacity(selected * width);
    for (row, &k) in keep.iter().enumerate() {
        if k {
            out.extend_from_slice(&values[row * width..(row + 1) * width]);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    format: ColumnFormat,
    unit: Option<String>,
    scale: f64,
    zero: f64,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, format: ColumnFormat, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            format,
            unit: None,
            scale: 1.0,
            zero: 0.0,
            data,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_scaling(mut self, scale: f64, zero: f64) -> Self {
        self.scale = scale;
        self.zero = zero;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> ColumnFormat {
        self.format
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.format.values_per_row()
    }

    fn is_scaled(&self) -> bool {
        self.scale != 1.0 || self.zero != 0.0
    }

    /// Physical values (`TSCALn * stored + TZEROn`) of a single-valued
    /// numeric column. `None` for text, logical or vector columns.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        if self.width() != 1 {
            return None;
        }
        let raw: Vec<f64> = match &self.data {
            ColumnData::Byte(v) => v.iter().map(|&x| x as f64).collect(),
            ColumnData::Short(v) => v.iter().map(|&x| x as f64).collect(),
            ColumnData::Int(v) => v.iter().map(|&x| x as f64).collect(),
            ColumnData::Long(v) => v.iter().map(|&x| x as f64).collect(),
            ColumnData::Float(v) => v.iter().map(|&x| x as f64).collect(),
            ColumnData::Double(v) => v.clone(),
            ColumnData::Logical(_) | ColumnData::Text(_) => return None,
        };
        if !self.is_scaled() {
            return Some(raw);
        }
        Some(raw.into_iter().map(|x| x * self.scale + self.zero).collect())
    }

    /// Single-valued integer column widened to `i64`. Only an integral
    /// `TZEROn` with unit `TSCALn` is honoured; other scaling yields `None`,
    /// as does any physical value outside the `i64` range (the unsigned
    /// 64-bit `TZEROn = 2^63` convention, for one).
    pub fn as_i64(&self) -> Option<Vec<i64>> {
        if self.width() != 1 || self.scale != 1.0 || self.zero.fract() != 0.0 {
            return None;
        }
        if !(-I64_LIMIT..I64_LIMIT).contains(&self.zero) {
            return None;
        }
        let zero = self.zero as i64;
        let values: Vec<i64> = match &self.data {
            ColumnData::Byte(v) => v.iter().map(|&x| x as i64).collect(),
            ColumnData::Short(v) => v.iter().map(|&x| x as i64).collect(),
            ColumnData::Int(v) => v.iter().map(|&x| x as i64).collect(),
            ColumnData::Long(v) => v.clone(),
            _ => return None,
        };
        values.into_iter().map(|x| x.checked_add(zero)).collect()
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: Option<String>,
    rows: usize,
    columns: Vec<Column>,
    column_index: HashMap<String, usize>,
}

impl Table {
    pub fn new(name: Option<String>, rows: usize) -> Self {
        Self {
            name,
            rows,
            columns: Vec::new(),
            column_index: HashMap::new(),
        }
    }

    pub fn push_column(&mut self, column: Column) -> Result<()> {
        let expected = self.rows * column.width();
        if column.data.len() != expected {
            return Err(FitsError::InvalidFormat(format!(
                "Column '{}' holds {} values, expected {} for {} rows",
                column.name,
                column.data.len(),
                expected,
                self.rows
            )));
        }
        self.column_index
            .insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
        Ok(())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Exact `TTYPEn` match first, then a case-insensitive one.
    pub fn column(&self, name: &str) -> Option<&Column> {
        if let Some(&index) = self.column_index.get(name) {
            return self.columns.get(index);
        }
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| FitsError::ColumnNotFound(name.to_string()))
    }

    /// New table holding the rows where `keep` is true, in original order.
    pub fn filter_rows(&self, keep: &[bool]) -> Result<Table> {
        if keep.len() != self.rows {
            return Err(FitsError::RowMaskLength {
                expected: self.rows,
                actual: keep.len(),
            });
        }
        let rows = keep.iter().filter(|&&k| k).count();
        let mut filtered = Table::new(self.name.clone(), rows);
        for column in &self.columns {
            filtered.push_column(Column {
                name: column.name.clone(),
                format: column.format,
                unit: column.unit.clone(),
                scale: column.scale,
                zero: column.zero,
                data: column.data.select(column.width(), keep),
            })?;
        }
        Ok(filtered)
    }
}
