#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use galaxy_survey::{cross_reference, radio, FieldSpec};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn place(buffer: &mut [u8], field: &FieldSpec, text: &str) {
    let padded = format!("{:>width$}", text, width = field.width());
    assert_eq!(padded.len(), field.width(), "{} overflows {}", text, field.name);
    buffer[field.start..field.end].copy_from_slice(padded.as_bytes());
}

pub struct RadioLine<'a> {
    pub agc: &'a str,
    pub name: &'a str,
    pub distance: &'a str,
    pub log_mass: &'a str,
}

impl RadioLine<'_> {
    pub fn render(&self) -> String {
        let mut line = vec![b' '; radio::LOG_HI_MASS.end];
        place(&mut line, &radio::AGC_NUMBER, self.agc);
        line[radio::NAME.start..radio::NAME.start + self.name.len()]
            .copy_from_slice(self.name.as_bytes());
        // RA/Dec block between the name and the velocity
        line[17..47].copy_from_slice(b"000011.8+220608 000010.4+22055");
        place(&mut line, &radio::VELOCITY, "5934");
        place(&mut line, &radio::W50, "167");
        place(&mut line, &radio::W50_ERROR, "12");
        place(&mut line, &radio::HI_FLUX, "3.21");
        place(&mut line, &radio::HI_FLUX_ERROR, "0.07");
        place(&mut line, &radio::DISTANCE, self.distance);
        place(&mut line, &radio::LOG_HI_MASS, self.log_mass);
        String::from_utf8(line).expect("ASCII line")
    }
}

pub fn radio_line(agc: &str, distance: &str, log_mass: &str) -> String {
    RadioLine {
        agc,
        name: "HI000.7",
        distance,
        log_mass,
    }
    .render()
}

pub fn cross_ref_line(agc: &str, redshift: &str) -> String {
    let mut line = vec![b' '; cross_reference::REDSHIFT_ERROR.end];
    place(&mut line, &cross_reference::AGC_NUMBER, agc);
    place(&mut line, &cross_reference::PHOTO_OBJ_ID, "587727178986356823");
    place(&mut line, &cross_reference::SPEC_OBJ_ID, "211174701109329920");
    place(&mut line, &cross_reference::R_MODEL_MAG, "16.31");
    place(&mut line, &cross_reference::U_MINUS_R, "1.62");
    place(&mut line, &cross_reference::REDSHIFT, redshift);
    let error = if redshift.trim().is_empty() { "" } else { "0.00002" };
    place(&mut line, &cross_reference::REDSHIFT_ERROR, error);
    String::from_utf8(line).expect("ASCII line")
}

pub fn header(lines: usize) -> Vec<String> {
    (1..=lines)
        .map(|n| format!("# header line {}: column descriptions", n))
        .collect()
}

/// Writes `header_lines` preamble lines followed by `records`.
pub fn write_catalog(dir: &Path, name: &str, header_lines: usize, records: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut text = header(header_lines).join("\n");
    for record in records {
        text.push('\n');
        text.push_str(record);
    }
    text.push('\n');

    if name.ends_with(".gz") {
        let mut encoder = GzEncoder::new(File::create(&path).expect("create"), Compression::default());
        encoder.write_all(text.as_bytes()).expect("write");
        encoder.finish().expect("finish gzip");
    } else {
        std::fs::write(&path, text).expect("write catalog");
    }
    path
}
