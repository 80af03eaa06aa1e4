//! Where the catalogs live and how they are cut.
//!
//! Every loader takes its paths explicitly. [`CatalogConfig`] bundles them
//! for the command-line tool and can be read from a JSON file:
//!
//! ```json
//! {
//!   "photometry": { "data_dir": "/data/meert2015" },
//!   "alfalfa": {
//!     "radio": "/data/alfalfa/a40.datafile1.txt",
//!     "cross_reference": "/data/alfalfa/a40.datafile3.txt"
//!   },
//!   "model": "sersic",
//!   "parse_policy": "skip_record",
//!   "cuts": { "max_distance": 250.0 }
//! }
//! ```

use crate::crossmatch::CrossMatchCuts;
use crate::error::{CatalogError, CatalogResult};
use crate::fixed_width::ParsePolicy;
use crate::photometry::PhotometryModel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CAST_FILE: &str = "UPenn_PhotDec_CAST.fits";
pub const MODELS_R_FILE: &str = "UPenn_PhotDec_Models_rband.fits";
pub const NONPARAM_R_FILE: &str = "UPenn_PhotDec_nonParam_rband.fits";
pub const CAST_MODELS_FILE: &str = "UPenn_PhotDec_CASTmodels.fits";
pub const MODELS_G_FILE: &str = "UPenn_PhotDec_Models_gband.fits";
pub const NONPARAM_G_FILE: &str = "UPenn_PhotDec_nonParam_gband.fits";
pub const MORPHOLOGY_FILE: &str = "UPenn_PhotDec_H2011.fits";

pub const RADIO_FILE: &str = "a40.datafile1.txt";
pub const CROSS_REFERENCE_FILE: &str = "a40.datafile3.txt";

/// The seven co-indexed photometric decomposition files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotometricSources {
    pub cast: PathBuf,
    pub models_r: PathBuf,
    pub nonparam_r: PathBuf,
    pub cast_models: PathBuf,
    pub models_g: PathBuf,
    pub nonparam_g: PathBuf,
    pub morphology: PathBuf,
}

impl PhotometricSources {
    /// The published file names inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            cast: dir.join(CAST_FILE),
            models_r: dir.join(MODELS_R_FILE),
            nonparam_r: dir.join(NONPARAM_R_FILE),
            cast_models: dir.join(CAST_MODELS_FILE),
            models_g: dir.join(MODELS_G_FILE),
            nonparam_g: dir.join(NONPARAM_G_FILE),
            morphology: dir.join(MORPHOLOGY_FILE),
        }
    }

    pub fn paths(&self) -> [&Path; 7] {
        [
            &self.cast,
            &self.models_r,
            &self.nonparam_r,
            &self.cast_models,
            &self.models_g,
            &self.nonparam_g,
            &self.morphology,
        ]
    }
}

/// Either a directory holding the published file names, or each file spelled
/// out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotometryLocation {
    Directory { data_dir: PathBuf },
    Files(PhotometricSources),
}

impl PhotometryLocation {
    pub fn sources(&self) -> PhotometricSources {
        match self {
            PhotometryLocation::Directory { data_dir } => PhotometricSources::from_dir(data_dir),
            PhotometryLocation::Files(sources) => sources.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlfalfaSources {
    pub radio: PathBuf,
    pub cross_reference: PathBuf,
}

impl AlfalfaSources {
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            radio: dir.join(RADIO_FILE),
            cross_reference: dir.join(CROSS_REFERENCE_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub photometry: Option<PhotometryLocation>,
    pub alfalfa: Option<AlfalfaSources>,
    pub model: PhotometryModel,
    pub parse_policy: ParsePolicy,
    pub cuts: CrossMatchCuts,
}

impl CatalogConfig {
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        serde_json::from_str(json).map_err(|e| CatalogError::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> CatalogResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn photometric_sources(&self) -> Option<PhotometricSources> {
        self.photometry.as_ref().map(PhotometryLocation::sources)
    }
}
