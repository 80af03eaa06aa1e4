//! Photometric quality cuts.
//!
//! A galaxy survives when its Petrosian and total magnitudes are physical,
//! its K-correction is positive, and its fit flag carries at least one of the
//! "good fit" bits.

use serde::Serialize;

/// `finalflag` bits marking an acceptable model fit.
pub const QUALITY_FLAG_BITS: [u32; 4] = [1, 4, 10, 14];

pub const MAGNITUDE_MIN: f64 = 0.0;
pub const MAGNITUDE_MAX: f64 = 100.0;

/// True when any of `bits` is set in `mask`. Bit positions outside the
/// 64-bit word are never set.
pub fn has_any_bit(mask: i64, bits: &[u32]) -> bool {
    bits.iter()
        .any(|&bit| bit < i64::BITS && (mask >> bit) & 1 != 0)
}

/// Exclusive on both ends; NaN is never inside.
pub fn within_open(value: f64, low: f64, high: f64) -> bool {
    value > low && value < high
}

/// The quantities the photometric cut looks at for one galaxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhotometricRecord {
    pub petro_mag: f64,
    pub kcorr: f64,
    pub m_tot: f64,
    pub final_flag: i64,
}

impl PhotometricRecord {
    pub fn passes_quality_cut(&self) -> bool {
        within_open(self.petro_mag, MAGNITUDE_MIN, MAGNITUDE_MAX)
            && self.kcorr > 0.0
            && within_open(self.m_tot, MAGNITUDE_MIN, MAGNITUDE_MAX)
            && has_any_bit(self.final_flag, &QUALITY_FLAG_BITS)
    }
}
