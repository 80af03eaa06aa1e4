//! Read-only access to FITS binary tables.
//!
//! Scans a FITS file's header/data units on open and decodes any `BINTABLE`
//! extension into an owned, column-addressable [`Table`]. Images, writing,
//! tile compression, checksums and variable-length arrays are out of scope.
//!
//! ```ignore
//! use astro_fits::FitsFile;
//!
//! let mut fits = FitsFile::open("UPenn_PhotDec_Models_rband.fits")?;
//! let models = fits.read_table(3)?;
//! let m_tot = models.require_column("m_tot")?.as_f64();
//! ```

pub mod errors;
pub mod header;
pub mod io;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use errors::{FitsError, Result};
pub use header::{Header, Keyword, KeywordValue};
pub use io::{FitsFile, HduInfo};
pub use table::{BinaryTableHdu, Column, ColumnData, ColumnFormat, ColumnType, Table};
