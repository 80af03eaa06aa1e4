//! ALFALFA α.40 to SDSS DR7 cross-reference (Haynes et al. 2011, table 3).
//!
//! 74 preamble lines, then one line per HI source with its optical
//! counterpart. A source without an SDSS spectrum leaves the redshift blank,
//! which reads as [`MISSING_REDSHIFT`].
//!
//! The redshift and its error are blank when all spaces or when the line
//! ends before them; a right-trimmed line therefore gets the sentinel rather
//! than a `MalformedRecord`.

use crate::error::CatalogResult;
use crate::fixed_width::{FieldSpec, FixedWidthLine, ParsePolicy};
use crate::mask::{Identified, RecordTable};
use crate::source::read_records;
use serde::Serialize;
use std::path::Path;

pub const CROSS_REFERENCE_HEADER_LINES: usize = 74;

pub const MISSING_REDSHIFT: f64 = 1000.0;

pub const AGC_NUMBER: FieldSpec = FieldSpec::new("AGCnr", 0, 6);
pub const PHOTO_OBJ_ID: FieldSpec = FieldSpec::new("PhotoObjID", 11, 29);
pub const SPEC_OBJ_ID: FieldSpec = FieldSpec::new("SpecObjID", 30, 48);
pub const R_MODEL_MAG: FieldSpec = FieldSpec::new("rmodelmag", 49, 54);
pub const U_MINUS_R: FieldSpec = FieldSpec::new("u-r", 55, 60);
pub const REDSHIFT: FieldSpec = FieldSpec::new("z", 61, 68);
pub const REDSHIFT_ERROR: FieldSpec = FieldSpec::new("e_z", 69, 76);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossRefRecord {
    pub agc_number: i64,
    /// SDSS photometric object id, kept as text.
    pub photo_obj_id: String,
    pub spec_obj_id: String,
    pub r_model_mag: f64,
    pub u_minus_r: f64,
    pub redshift: f64,
    pub redshift_error: f64,
}

impl CrossRefRecord {
    pub fn parse(line: &FixedWidthLine<'_>) -> CatalogResult<Self> {
        Ok(Self {
            agc_number: line.parse(&AGC_NUMBER)?,
            photo_obj_id: line.string(&PHOTO_OBJ_ID)?,
            spec_obj_id: line.string(&SPEC_OBJ_ID)?,
            r_model_mag: line.parse(&R_MODEL_MAG)?,
            u_minus_r: line.parse(&U_MINUS_R)?,
            redshift: line.parse_f64_or(&REDSHIFT, MISSING_REDSHIFT)?,
            redshift_error: line.parse_f64_or(&REDSHIFT_ERROR, MISSING_REDSHIFT)?,
        })
    }

    pub fn has_redshift(&self) -> bool {
        self.redshift != MISSING_REDSHIFT
    }
}

impl Identified for CrossRefRecord {
    fn identifier(&self) -> i64 {
        self.agc_number
    }
}

pub type CrossRefTable = RecordTable<CrossRefRecord>;

pub fn load_cross_reference_catalog(path: &Path) -> CatalogResult<CrossRefTable> {
    load_cross_reference_catalog_with(path, ParsePolicy::default())
}

pub fn load_cross_reference_catalog_with(
    path: &Path,
    policy: ParsePolicy,
) -> CatalogResult<CrossRefTable> {
    let records = read_records(
        path,
        CROSS_REFERENCE_HEADER_LINES,
        policy,
        CrossRefRecord::parse,
    )?;
    log::info!(
        "Cross-reference catalog {:?}: {} entries, {} with redshifts",
        path,
        records.len(),
        records.iter().filter(|r| r.has_redshift()).count()
    );
    Ok(CrossRefTable::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(redshift: &str, error: &str) -> String {
        let mut text = format!(
            "{:>6}     {:>18} {:>18} {:>5} {:>5} {:>7} {:>7}",
            "4321", "587722981742084144", "75094093067337728", "15.42", "1.87", redshift, error
        );
        text.truncate(76);
        text
    }

    #[test]
    fn layout_matches_field_offsets() {
        let text = line("0.02451", "0.00002");
        assert_eq!(&text[REDSHIFT.start..REDSHIFT.end], "0.02451");
        assert_eq!(&text[PHOTO_OBJ_ID.start..PHOTO_OBJ_ID.end], "587722981742084144");
    }

    #[test]
    fn parses_every_field() {
        let text = line("0.02451", "0.00002");
        let record = CrossRefRecord::parse(&FixedWidthLine::new(&text, 75)).unwrap();
        assert_eq!(record.agc_number, 4321);
        assert_eq!(record.photo_obj_id, "587722981742084144");
        assert_eq!(record.spec_obj_id, "75094093067337728");
        assert_eq!(record.r_model_mag, 15.42);
        assert_eq!(record.u_minus_r, 1.87);
        assert_eq!(record.redshift, 0.02451);
        assert_eq!(record.redshift_error, 0.00002);
        assert!(record.has_redshift());
        assert_eq!(record.identifier(), 4321);
    }

    #[test]
    fn blank_redshift_is_sentinel() {
        let text = line("", "");
        assert_eq!(&text[REDSHIFT.start..REDSHIFT.end], "       ");
        let record = CrossRefRecord::parse(&FixedWidthLine::new(&text, 75)).unwrap();
        assert_eq!(record.redshift, MISSING_REDSHIFT);
        assert_eq!(record.redshift_error, MISSING_REDSHIFT);
        assert!(!record.has_redshift());

        let trimmed = CrossRefRecord::parse(&FixedWidthLine::new(text.trim_end(), 75)).unwrap();
        assert_eq!(trimmed, record);
    }

    #[test]
    fn zero_redshift_is_a_measurement() {
        let text = line("0.00000", "0.00001");
        let record = CrossRefRecord::parse(&FixedWidthLine::new(&text, 75)).unwrap();
        assert_eq!(record.redshift, 0.0);
        assert!(record.has_redshift());
    }

    #[test]
    fn garbled_magnitude_is_malformed() {
        let text = line("0.02451", "0.00002").replace("15.42", "15,42");
        let err = CrossRefRecord::parse(&FixedWidthLine::new(&text, 80)).unwrap_err();
        assert!(err.is_malformed_record());
        assert!(err.to_string().contains("rmodelmag"));
    }
}
