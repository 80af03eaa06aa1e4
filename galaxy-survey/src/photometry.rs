//! Photometric decomposition catalog.
//!
//! The catalog is spread across seven FITS files whose rows describe the same
//! galaxies in the same order. They are loaded together, checked for equal
//! length, and narrowed with a single quality mask so that row *i* keeps
//! meaning the same galaxy in every table.

use crate::config::PhotometricSources;
use crate::error::{CatalogError, CatalogResult};
use crate::mask::{CoIndexed, RowMask};
use crate::quality::PhotometricRecord;
use astro_fits::{FitsFile, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const PETRO_MAG_COLUMN: &str = "petroMag";
pub const KCORR_COLUMN: &str = "kcorr";
pub const TOTAL_MAG_COLUMN: &str = "m_tot";
pub const FINAL_FLAG_COLUMN: &str = "finalflag";

/// Surface-brightness profile fitted in the model tables. The discriminant is
/// the HDU holding that fit in the r- and g-band model files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotometryModel {
    #[serde(alias = "best")]
    BestFit = 1,
    #[serde(alias = "dev")]
    DeVaucouleurs = 2,
    #[default]
    #[serde(alias = "ser")]
    Sersic = 3,
    DeVExp = 4,
    SerExp = 5,
}

impl PhotometryModel {
    pub const ALL: [PhotometryModel; 5] = [
        PhotometryModel::BestFit,
        PhotometryModel::DeVaucouleurs,
        PhotometryModel::Sersic,
        PhotometryModel::DeVExp,
        PhotometryModel::SerExp,
    ];

    pub fn hdu_index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PhotometryModel::BestFit => "bestfit",
            PhotometryModel::DeVaucouleurs => "devaucouleurs",
            PhotometryModel::Sersic => "sersic",
            PhotometryModel::DeVExp => "devexp",
            PhotometryModel::SerExp => "serexp",
        }
    }
}

impl TryFrom<i64> for PhotometryModel {
    type Error = CatalogError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        PhotometryModel::ALL
            .into_iter()
            .find(|m| *m as i64 == value)
            .ok_or_else(|| {
                CatalogError::InvalidParameter(format!(
                    "photometry model must be 1-5, got {}",
                    value
                ))
            })
    }
}

impl FromStr for PhotometryModel {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return PhotometryModel::try_from(n);
        }
        match s.to_ascii_lowercase().as_str() {
            "best" | "bestfit" => Ok(PhotometryModel::BestFit),
            "dev" | "devaucouleurs" => Ok(PhotometryModel::DeVaucouleurs),
            "ser" | "sersic" => Ok(PhotometryModel::Sersic),
            "devexp" => Ok(PhotometryModel::DeVExp),
            "serexp" => Ok(PhotometryModel::SerExp),
            _ => Err(CatalogError::InvalidParameter(format!(
                "unknown photometry model '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for PhotometryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Source of decoded tables. [`FitsTableReader`] reads them from disk; other
/// implementations can serve tables already held in memory.
pub trait TableReader {
    fn read_table(&self, path: &Path, hdu: usize) -> CatalogResult<Table>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FitsTableReader;

impl TableReader for FitsTableReader {
    fn read_table(&self, path: &Path, hdu: usize) -> CatalogResult<Table> {
        let mut fits = FitsFile::open(path).map_err(|e| CatalogError::table(path, e))?;
        fits.read_table(hdu).map_err(|e| CatalogError::table(path, e))
    }
}

/// Seven row-aligned tables. They are only reachable through [`tables`] and
/// [`into_tables`], so every narrowing goes through one shared mask.
///
/// [`tables`]: PhotometricCatalog::tables
/// [`into_tables`]: PhotometricCatalog::into_tables
#[derive(Debug, Clone, PartialEq)]
pub struct PhotometricCatalog {
    cast: Table,
    models_r: Table,
    nonparam_r: Table,
    cast_models: Table,
    models_g: Table,
    nonparam_g: Table,
    morphology: Table,
    model: PhotometryModel,
    initial_rows: usize,
}

/// The seven tables in catalog order: cast, r-band models, r-band
/// non-parametric, cast models, g-band models, g-band non-parametric,
/// morphology.
pub type PhotometricTables = (Table, Table, Table, Table, Table, Table, Table);

impl PhotometricCatalog {
    /// Assembles a catalog from already-decoded tables, rejecting any set
    /// whose row counts differ.
    #[allow(clippy::too_many_arguments)]
    pub fn from_tables(
        model: PhotometryModel,
        cast: Table,
        models_r: Table,
        nonparam_r: Table,
        cast_models: Table,
        models_g: Table,
        nonparam_g: Table,
        morphology: Table,
    ) -> CatalogResult<Self> {
        let catalog = Self {
            initial_rows: cast.num_rows(),
            cast,
            models_r,
            nonparam_r,
            cast_models,
            models_g,
            nonparam_g,
            morphology,
            model,
        };
        catalog.check_alignment()?;
        Ok(catalog)
    }

    pub fn model(&self) -> PhotometryModel {
        self.model
    }

    /// Row count at load time, before any quality cut.
    pub fn initial_rows(&self) -> usize {
        self.initial_rows
    }

    pub fn len(&self) -> usize {
        self.cast.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tables(&self) -> [(&'static str, &Table); 7] {
        [
            ("cast", &self.cast),
            ("models_r", &self.models_r),
            ("nonparam_r", &self.nonparam_r),
            ("cast_models", &self.cast_models),
            ("models_g", &self.models_g),
            ("nonparam_g", &self.nonparam_g),
            ("morphology", &self.morphology),
        ]
    }

    pub fn check_alignment(&self) -> CatalogResult<()> {
        let expected = self.len();
        for (name, table) in self.tables() {
            if table.num_rows() != expected {
                return Err(CatalogError::RowCountMismatch {
                    table: name.to_string(),
                    expected,
                    actual: table.num_rows(),
                });
            }
        }
        Ok(())
    }

    /// Per-galaxy view of the columns the quality cut reads.
    pub fn records(&self) -> CatalogResult<Vec<PhotometricRecord>> {
        self.check_alignment()?;
        let petro_mag = real_column(&self.cast_models, "cast_models", PETRO_MAG_COLUMN)?;
        let kcorr = real_column(&self.nonparam_r, "nonparam_r", KCORR_COLUMN)?;
        let m_tot = real_column(&self.models_r, "models_r", TOTAL_MAG_COLUMN)?;
        let final_flag = integer_column(&self.models_r, "models_r", FINAL_FLAG_COLUMN)?;

        Ok((0..self.len())
            .map(|row| PhotometricRecord {
                petro_mag: petro_mag[row],
                kcorr: kcorr[row],
                m_tot: m_tot[row],
                final_flag: final_flag[row],
            })
            .collect())
    }

    pub fn quality_mask(&self) -> CatalogResult<RowMask> {
        let records = self.records()?;
        Ok(RowMask::from_vec(
            records.iter().map(PhotometricRecord::passes_quality_cut).collect(),
        ))
    }

    /// Narrows all seven tables with one mask. Re-applying to an already
    /// cut catalog returns an identical catalog.
    pub fn apply_quality_cut(&self) -> CatalogResult<Self> {
        let mask = self.quality_mask()?;
        self.subset(&mask)
    }

    pub fn into_tables(self) -> PhotometricTables {
        (
            self.cast,
            self.models_r,
            self.nonparam_r,
            self.cast_models,
            self.models_g,
            self.nonparam_g,
            self.morphology,
        )
    }
}

impl CoIndexed for PhotometricCatalog {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn subset(&self, mask: &RowMask) -> CatalogResult<Self> {
        Ok(Self {
            cast: self.cast.subset(mask)?,
            models_r: self.models_r.subset(mask)?,
            nonparam_r: self.nonparam_r.subset(mask)?,
            cast_models: self.cast_models.subset(mask)?,
            models_g: self.models_g.subset(mask)?,
            nonparam_g: self.nonparam_g.subset(mask)?,
            morphology: self.morphology.subset(mask)?,
            model: self.model,
            initial_rows: self.initial_rows,
        })
    }
}

fn real_column(table: &Table, label: &str, name: &str) -> CatalogResult<Vec<f64>> {
    table
        .column(name)
        .and_then(|c| c.as_f64())
        .ok_or_else(|| CatalogError::MissingColumn {
            table: label.to_string(),
            column: name.to_string(),
        })
}

fn integer_column(table: &Table, label: &str, name: &str) -> CatalogResult<Vec<i64>> {
    table
        .column(name)
        .and_then(|c| c.as_i64())
        .ok_or_else(|| CatalogError::MissingColumn {
            table: label.to_string(),
            column: name.to_string(),
        })
}

/// Loads the seven photometric tables from disk and applies the quality cut.
pub fn load_photometric_catalog(
    sources: &PhotometricSources,
    model: PhotometryModel,
) -> CatalogResult<PhotometricCatalog> {
    load_photometric_catalog_with(&FitsTableReader, sources, model)
}

pub fn load_photometric_catalog_with<T: TableReader + ?Sized>(
    reader: &T,
    sources: &PhotometricSources,
    model: PhotometryModel,
) -> CatalogResult<PhotometricCatalog> {
    let hdu = model.hdu_index();
    log::debug!("Loading photometric catalog, {} fit (HDU {})", model, hdu);

    let catalog = PhotometricCatalog::from_tables(
        model,
        reader.read_table(&sources.cast, 1)?,
        reader.read_table(&sources.models_r, hdu)?,
        reader.read_table(&sources.nonparam_r, 1)?,
        reader.read_table(&sources.cast_models, 1)?,
        reader.read_table(&sources.models_g, hdu)?,
        reader.read_table(&sources.nonparam_g, 1)?,
        reader.read_table(&sources.morphology, 1)?,
    )?;
    log::info!(
        "Photometric catalog: {} galaxies before quality cut",
        catalog.initial_rows()
    );

    let filtered = catalog.apply_quality_cut()?;
    log::info!(
        "Photometric catalog: {} of {} galaxies pass quality cut",
        filtered.len(),
        filtered.initial_rows()
    );
    Ok(filtered)
}
