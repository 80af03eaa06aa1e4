//! Galaxy survey catalog loading, quality cuts and identifier cross-matching.
//!
//! Reads the UPenn photometric decomposition of SDSS DR7 (seven co-indexed
//! FITS tables), the ALFALFA α.40 HI source catalog and its SDSS
//! cross-reference (fixed-width ASCII), and returns in-memory tables. The
//! photometric tables are narrowed by a single quality mask; the two ALFALFA
//! tables are joined on the AGC number and narrowed by distance and redshift.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`fixed_width`] | [`FieldSpec`], [`FixedWidthLine`], blank detection and sentinel substitution |
//! | [`source`] | Plain or gzip text input, header skipping, [`ParsePolicy`] handling |
//! | [`mask`] | [`RowMask`], the [`CoIndexed`] trait and [`RecordTable`] |
//! | [`photometry`] | [`load_photometric_catalog`], [`PhotometryModel`], [`PhotometricCatalog`] |
//! | [`quality`] | [`has_any_bit`] and the per-galaxy quality predicate |
//! | [`radio`] | [`load_radio_catalog`], [`RadioRecord`] |
//! | [`cross_reference`] | [`load_cross_reference_catalog`], [`CrossRefRecord`] |
//! | [`crossmatch`] | [`cross_match`], the identifier hash join and [`CrossMatchCuts`] |
//! | [`config`] | [`PhotometricSources`], [`AlfalfaSources`], [`CatalogConfig`] |
//!
//! # Quick Start
//!
//! ```ignore
//! use galaxy_survey::{cross_match, load_cross_reference_catalog, load_radio_catalog};
//! use std::path::Path;
//!
//! let radio = load_radio_catalog(Path::new("a40.datafile1.txt"))?;
//! let xref = load_cross_reference_catalog(Path::new("a40.datafile3.txt"))?;
//! let (radio, xref) = cross_match(&radio, &xref)?;
//! assert_eq!(radio.len(), xref.len());
//! ```
//!
//! # Features
//!
//! - **`cli`**: enables the `survey` binary for loading and cross-matching
//!   catalogs from the command line.

pub mod config;
pub mod cross_reference;
pub mod crossmatch;
pub mod error;
pub mod fixed_width;
pub mod mask;
pub mod photometry;
pub mod quality;
pub mod radio;
pub mod source;

pub use config::{AlfalfaSources, CatalogConfig, PhotometricSources, PhotometryLocation};
pub use cross_reference::{
    load_cross_reference_catalog, load_cross_reference_catalog_with, CrossRefRecord,
    CrossRefTable,
};
pub use crossmatch::{
    cross_match, cross_match_with, join_on_identifier, repeated_identifiers, CrossMatchCuts,
};
pub use error::{CatalogError, CatalogResult};
pub use fixed_width::{FieldSpec, FixedWidthLine, ParsePolicy};
pub use mask::{CoIndexed, Identified, RecordTable, RowMask};
pub use photometry::{
    load_photometric_catalog, load_photometric_catalog_with, FitsTableReader,
    PhotometricCatalog, PhotometricTables, PhotometryModel, TableReader,
};
pub use quality::{has_any_bit, PhotometricRecord, QUALITY_FLAG_BITS};
pub use radio::{load_radio_catalog, load_radio_catalog_with, RadioRecord, RadioTable};
