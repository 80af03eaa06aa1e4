//! Console output for loaded and matched catalogs

use crate::cli::OutputFormat;
use galaxy_survey::{CrossRefRecord, CrossRefTable, RadioRecord, RadioTable};
use serde::Serialize;

pub fn print_radio<'a>(records: impl Iterator<Item = &'a RadioRecord>) {
    for (i, r) in records.enumerate() {
        println!(
            "{:4}: AGC {:>6} {:<9} V={:>5} W50={:>3}±{:<3} S={:>6.2}±{:<5.2} \
             D={:>7.1} logM={:>7.2}",
            i + 1,
            r.agc_number,
            r.name,
            r.velocity,
            r.w50,
            r.w50_error,
            r.hi_flux,
            r.hi_flux_error,
            r.distance,
            r.log_hi_mass
        );
    }
}

pub fn print_cross_ref<'a>(records: impl Iterator<Item = &'a CrossRefRecord>) {
    for (i, x) in records.enumerate() {
        println!(
            "{:4}: AGC {:>6} photo={:>18} spec={:>18} r={:>5.2} u-r={:>5.2} z={:.5}±{:.5}",
            i + 1,
            x.agc_number,
            x.photo_obj_id,
            x.spec_obj_id,
            x.r_model_mag,
            x.u_minus_r,
            x.redshift,
            x.redshift_error
        );
    }
}

#[derive(Serialize)]
struct MatchedPair<'a> {
    radio: &'a RadioRecord,
    cross_reference: &'a CrossRefRecord,
}

pub fn print_matches(
    radio: &RadioTable,
    xref: &CrossRefTable,
    limit: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let pairs = radio.iter().zip(xref.iter()).take(limit);
    match format {
        OutputFormat::Table => print_table(pairs, radio.len()),
        OutputFormat::Json => {
            let pairs: Vec<MatchedPair> = pairs
                .map(|(radio, cross_reference)| MatchedPair {
                    radio,
                    cross_reference,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&pairs)?);
        }
        OutputFormat::Csv => print_csv(pairs),
    }
    Ok(())
}

fn print_table<'a>(
    pairs: impl Iterator<Item = (&'a RadioRecord, &'a CrossRefRecord)>,
    total: usize,
) {
    for (i, (r, x)) in pairs.enumerate() {
        println!(
            "{:4}: AGC {:>6} {:<9} D={:>6.1} Mpc z={:.5} logM={:>5.2} r={:>5.2} u-r={:>5.2}",
            i + 1,
            r.agc_number,
            r.name,
            r.distance,
            x.redshift,
            r.log_hi_mass,
            x.r_model_mag,
            x.u_minus_r
        );
    }

    if total == 0 {
        println!("No sources survive the cross-match.");
    } else {
        println!("\nTotal matched: {}", total);
    }
}

fn print_csv<'a>(pairs: impl Iterator<Item = (&'a RadioRecord, &'a CrossRefRecord)>) {
    println!(
        "agc_number,name,velocity,w50,hi_flux,distance,log_hi_mass,\
         photo_obj_id,r_model_mag,u_minus_r,redshift"
    );
    for (r, x) in pairs {
        println!(
            "{},{},{},{},{},{},{},{},{},{},{}",
            r.agc_number,
            r.name,
            r.velocity,
            r.w50,
            r.hi_flux,
            r.distance,
            r.log_hi_mass,
            x.photo_obj_id,
            x.r_model_mag,
            x.u_minus_r,
            x.redshift
        );
    }
}
