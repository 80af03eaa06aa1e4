//! Fixed-width field extraction for column-aligned text catalogs.
//!
//! Field offsets are half-open, 0-indexed byte ranges exactly as published in
//! the catalog's ReadMe. An offset past the end of a line is clamped, so a
//! right-trimmed line yields a short (possibly empty) field rather than an
//! error.

use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

impl FieldSpec {
    pub const fn new(name: &'static str, start: usize, end: usize) -> Self {
        Self { name, start, end }
    }

    pub const fn width(&self) -> usize {
        self.end - self.start
    }
}

/// What a loader does with a record whose numeric field will not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Fail the whole load on the first malformed record.
    #[default]
    Abort,
    /// Drop the record, log it, and keep going.
    SkipRecord,
}

#[derive(Debug, Clone, Copy)]
pub struct FixedWidthLine<'a> {
    text: &'a str,
    line_number: usize,
}

impl<'a> FixedWidthLine<'a> {
    /// `line_number` is 1-based and only used for error reporting.
    pub fn new(text: &'a str, line_number: usize) -> Self {
        Self { text, line_number }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Untrimmed field text.
    pub fn raw(&self, field: &FieldSpec) -> CatalogResult<&'a str> {
        let bytes = self.text.as_bytes();
        let start = field.start.min(bytes.len());
        let end = field.end.min(bytes.len());
        std::str::from_utf8(&bytes[start..end]).map_err(|_| {
            CatalogError::malformed(
                self.line_number,
                field.name,
                String::from_utf8_lossy(&bytes[start..end]),
                "field boundary splits a multi-byte character",
            )
        })
    }

    pub fn is_blank(&self, field: &FieldSpec) -> CatalogResult<bool> {
        Ok(self.raw(field)?.trim().is_empty())
    }

    pub fn string(&self, field: &FieldSpec) -> CatalogResult<String> {
        Ok(self.raw(field)?.trim().to_string())
    }

    pub fn parse<T>(&self, field: &FieldSpec) -> CatalogResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.raw(field)?;
        raw.trim()
            .parse::<T>()
            .map_err(|e| CatalogError::malformed(self.line_number, field.name, raw, e.to_string()))
    }

    /// A blank field means "not measured" and yields `sentinel`; anything
    /// else must parse.
    pub fn parse_f64_or(&self, field: &FieldSpec, sentinel: f64) -> CatalogResult<f64> {
        if self.is_blank(field)? {
            return Ok(sentinel);
        }
        self.parse(field)
    }
}
