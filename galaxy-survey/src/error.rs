//! Error type shared by every catalog loader.
//!
//! Nothing in this crate recovers from an error silently. Loaders fail fast
//! on the first malformed record unless the caller opts into
//! [`ParsePolicy::SkipRecord`](crate::ParsePolicy::SkipRecord).

use astro_fits::FitsError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A caller-supplied selector is outside its defined range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A non-blank numeric field could not be converted.
    #[error("Malformed record at line {line}, field {field}: {reason} (raw text '{raw}')")]
    MalformedRecord {
        line: usize,
        field: &'static str,
        raw: String,
        reason: String,
    },

    #[error("Cannot read {}: {source}", .path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid table in {}: {source}", .path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: FitsError,
    },

    #[error("Table {table} has no usable column '{column}'")]
    MissingColumn { table: String, column: String },

    /// Co-indexed tables (or a table and its row mask) disagree on length.
    #[error("Table {table} has {actual} rows, expected {expected}")]
    RowCountMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn malformed(
        line: usize,
        field: &'static str,
        raw: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CatalogError::MalformedRecord {
            line,
            field,
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn resource(path: &Path, source: std::io::Error) -> Self {
        CatalogError::ResourceUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }

    /// I/O failures opening a table file surface as `ResourceUnavailable`;
    /// everything else is a structural problem with the file.
    pub fn table(path: &Path, source: FitsError) -> Self {
        match source {
            FitsError::Io(io) => CatalogError::resource(path, io),
            other => CatalogError::Table {
                path: path.to_path_buf(),
                source: other,
            },
        }
    }

    pub fn is_malformed_record(&self) -> bool {
        matches!(self, CatalogError::MalformedRecord { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn fits_io_errors_become_resource_unavailable() {
        let err = CatalogError::table(
            Path::new("missing.fits"),
            FitsError::Io(io::Error::new(io::ErrorKind::NotFound, "gone")),
        );
        assert!(matches!(err, CatalogError::ResourceUnavailable { .. }));
        assert!(err.to_string().contains("missing.fits"));
    }

    #[test]
    fn fits_format_errors_keep_their_source() {
        let err = CatalogError::table(Path::new("models.fits"), FitsError::HduNotFound(6));
        assert!(matches!(
            err,
            CatalogError::Table {
                source: FitsError::HduNotFound(6),
                ..
            }
        ));
    }

    #[test]
    fn malformed_message_names_line_and_field() {
        let err = CatalogError::malformed(91, "Dist", " 1x.5", "invalid float literal");
        let message = err.to_string();
        assert!(message.contains("line 91"));
        assert!(message.contains("Dist"));
        assert!(err.is_malformed_record());
    }
}
