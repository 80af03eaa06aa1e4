//! ALFALFA α.40 HI source catalog (Haynes et al. 2011, table 1).
//!
//! Fixed-width ASCII with an 84-line preamble. Sources without an assigned
//! distance leave the distance and HI mass columns blank; both are then set
//! to [`MISSING_DISTANCE`].
//!
//! A distance field counts as blank when it is all spaces or when the line
//! ends before it, so a right-trimmed line also reads as [`MISSING_DISTANCE`]
//! rather than failing with `MalformedRecord`.

use crate::error::CatalogResult;
use crate::fixed_width::{FieldSpec, FixedWidthLine, ParsePolicy};
use crate::mask::{Identified, RecordTable};
use crate::source::read_records;
use serde::Serialize;
use std::path::Path;

pub const RADIO_HEADER_LINES: usize = 84;

/// Sentinel for distance and log HI mass when the catalog has no distance.
pub const MISSING_DISTANCE: f64 = -1000.0;

pub const AGC_NUMBER: FieldSpec = FieldSpec::new("AGCnr", 0, 6);
pub const NAME: FieldSpec = FieldSpec::new("Name", 7, 16);
pub const VELOCITY: FieldSpec = FieldSpec::new("Vhelio", 48, 53);
pub const W50: FieldSpec = FieldSpec::new("W50", 54, 57);
pub const W50_ERROR: FieldSpec = FieldSpec::new("errW50", 58, 61);
pub const HI_FLUX: FieldSpec = FieldSpec::new("HIflux", 63, 70);
pub const HI_FLUX_ERROR: FieldSpec = FieldSpec::new("errHIflux", 71, 75);
pub const DISTANCE: FieldSpec = FieldSpec::new("Dist", 90, 95);
pub const LOG_HI_MASS: FieldSpec = FieldSpec::new("logMsun", 96, 101);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioRecord {
    pub agc_number: i64,
    pub name: String,
    /// Heliocentric velocity, km/s.
    pub velocity: i32,
    /// Line width at 50% of peak, km/s.
    pub w50: i32,
    pub w50_error: i32,
    /// Integrated HI flux, Jy km/s.
    pub hi_flux: f64,
    pub hi_flux_error: f64,
    /// Mpc.
    pub distance: f64,
    /// log10 of HI mass in solar masses.
    pub log_hi_mass: f64,
}

impl RadioRecord {
    pub fn parse(line: &FixedWidthLine<'_>) -> CatalogResult<Self> {
        let (distance, log_hi_mass) = if line.is_blank(&DISTANCE)? {
            (MISSING_DISTANCE, MISSING_DISTANCE)
        } else {
            (line.parse(&DISTANCE)?, line.parse(&LOG_HI_MASS)?)
        };

        Ok(Self {
            agc_number: line.parse(&AGC_NUMBER)?,
            name: line.string(&NAME)?,
            velocity: line.parse(&VELOCITY)?,
            w50: line.parse(&W50)?,
            w50_error: line.parse(&W50_ERROR)?,
            hi_flux: line.parse(&HI_FLUX)?,
            hi_flux_error: line.parse(&HI_FLUX_ERROR)?,
            distance,
            log_hi_mass,
        })
    }

    pub fn has_distance(&self) -> bool {
        self.distance != MISSING_DISTANCE
    }
}

impl Identified for RadioRecord {
    fn identifier(&self) -> i64 {
        self.agc_number
    }
}

pub type RadioTable = RecordTable<RadioRecord>;

pub fn load_radio_catalog(path: &Path) -> CatalogResult<RadioTable> {
    load_radio_catalog_with(path, ParsePolicy::default())
}

pub fn load_radio_catalog_with(path: &Path, policy: ParsePolicy) -> CatalogResult<RadioTable> {
    let records = read_records(path, RADIO_HEADER_LINES, policy, RadioRecord::parse)?;
    let with_distance = records.iter().filter(|r| r.has_distance()).count();
    log::info!(
        "Radio catalog {:?}: {} sources, {} with distances",
        path,
        records.len(),
        with_distance
    );
    Ok(RadioTable::from_records(records))
}
