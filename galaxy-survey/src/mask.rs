//! Row masks and co-indexed subsetting.
//!
//! Tables that describe the same objects row for row are narrowed together:
//! one [`RowMask`] is built, then handed to [`CoIndexed::subset`] on every
//! table in the set. A mask of the wrong length is an error, never a panic.

use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMask {
    keep: Vec<bool>,
}

impl RowMask {
    pub fn all(rows: usize) -> Self {
        Self {
            keep: vec![true; rows],
        }
    }

    pub fn from_fn(rows: usize, f: impl FnMut(usize) -> bool) -> Self {
        Self {
            keep: (0..rows).map(f).collect(),
        }
    }

    pub fn from_vec(keep: Vec<bool>) -> Self {
        Self { keep }
    }

    pub fn len(&self) -> usize {
        self.keep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keep.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.keep
    }

    pub fn and(&self, other: &RowMask) -> CatalogResult<RowMask> {
        if self.len() != other.len() {
            return Err(CatalogError::RowCountMismatch {
                table: "row mask".to_string(),
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(RowMask::from_vec(
            self.keep
                .iter()
                .zip(&other.keep)
                .map(|(&a, &b)| a && b)
                .collect(),
        ))
    }

    /// Copies the kept elements of `items`, preserving order.
    pub fn select<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .zip(&self.keep)
            .filter(|&(_, &k)| k)
            .map(|(item, _)| item.clone())
            .collect()
    }

    pub(crate) fn check_len(&self, table: &str, rows: usize) -> CatalogResult<()> {
        if self.len() != rows {
            return Err(CatalogError::RowCountMismatch {
                table: table.to_string(),
                expected: rows,
                actual: self.len(),
            });
        }
        Ok(())
    }
}

/// A table whose rows can be narrowed in lockstep with its siblings.
pub trait CoIndexed: Sized {
    fn row_count(&self) -> usize;

    fn subset(&self, mask: &RowMask) -> CatalogResult<Self>;
}

impl CoIndexed for astro_fits::Table {
    fn row_count(&self) -> usize {
        self.num_rows()
    }

    fn subset(&self, mask: &RowMask) -> CatalogResult<Self> {
        let name = self.name().unwrap_or("table");
        mask.check_len(name, self.num_rows())?;
        self.filter_rows(mask.as_slice())
            .map_err(|e| CatalogError::MissingColumn {
                table: name.to_string(),
                column: e.to_string(),
            })
    }
}

/// Records carrying the survey identifier shared across catalogs.
pub trait Identified {
    fn identifier(&self) -> i64;
}

/// An ordered, immutable sequence of parsed records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable<R> {
    records: Vec<R>,
}

impl<R> Default for RecordTable<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R> RecordTable<R> {
    pub fn from_records(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&R> {
        self.records.get(row)
    }

    pub fn mask_where(&self, predicate: impl Fn(&R) -> bool) -> RowMask {
        RowMask::from_vec(self.records.iter().map(predicate).collect())
    }
}

impl<R: Clone> RecordTable<R> {
    /// Rows in the given order; indices may repeat.
    pub fn take(&self, rows: &[usize]) -> Self {
        Self::from_records(rows.iter().map(|&row| self.records[row].clone()).collect())
    }
}

impl<R: Clone> CoIndexed for RecordTable<R> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn subset(&self, mask: &RowMask) -> CatalogResult<Self> {
        mask.check_len(std::any::type_name::<R>(), self.len())?;
        Ok(Self::from_records(mask.select(&self.records)))
    }
}

impl<'a, R> IntoIterator for &'a RecordTable<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
