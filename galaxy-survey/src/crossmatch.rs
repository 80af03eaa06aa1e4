//! Identifier cross-match between the radio and cross-reference catalogs.
//!
//! Matching is a hash join on the AGC number: the cross-reference table is
//! indexed once and each radio row probes it in radio order. Every pair with
//! equal identifiers is emitted, so row *i* of both outputs always names the
//! same source. The matched pair is then narrowed by four range cuts, each
//! computed from the rows that survived the previous one.

use crate::cross_reference::{CrossRefRecord, CrossRefTable};
use crate::error::CatalogResult;
use crate::mask::{CoIndexed, Identified, RecordTable};
use crate::radio::{RadioRecord, RadioTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Open bounds applied after the identifier join.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossMatchCuts {
    /// Mpc; also rejects the -1000 missing-distance sentinel.
    pub min_distance: f64,
    pub max_distance: f64,
    /// Also rejects the 1000 missing-redshift sentinel.
    pub max_redshift: f64,
    pub min_redshift: f64,
}

impl Default for CrossMatchCuts {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 500.0,
            max_redshift: 10.0,
            min_redshift: 0.0001,
        }
    }
}

/// Row pairs `(left, right)` whose identifiers are equal, in left-table
/// order. Right-hand duplicates keep their file order.
pub fn join_on_identifier<L: Identified, R: Identified>(
    left: &RecordTable<L>,
    right: &RecordTable<R>,
) -> Vec<(usize, usize)> {
    let mut index: HashMap<i64, Vec<usize>> = HashMap::with_capacity(right.len());
    for (row, record) in right.iter().enumerate() {
        index.entry(record.identifier()).or_default().push(row);
    }

    let mut pairs = Vec::new();
    for (left_row, record) in left.iter().enumerate() {
        if let Some(rows) = index.get(&record.identifier()) {
            pairs.extend(rows.iter().map(|&right_row| (left_row, right_row)));
        }
    }
    pairs
}

/// Number of distinct identifiers that occur on more than one row.
pub fn repeated_identifiers<R: Identified>(table: &RecordTable<R>) -> usize {
    let mut counts: HashMap<i64, usize> = HashMap::with_capacity(table.len());
    for record in table {
        *counts.entry(record.identifier()).or_default() += 1;
    }
    counts.values().filter(|&&n| n > 1).count()
}

fn warn_on_repeats<R: Identified>(table: &RecordTable<R>, label: &str) {
    let repeated = repeated_identifiers(table);
    if repeated > 0 {
        log::warn!(
            "{} identifiers appear more than once in the {} table; each pairing is kept",
            repeated,
            label
        );
    }
}

pub fn cross_match(
    radio: &RadioTable,
    cross_ref: &CrossRefTable,
) -> CatalogResult<(RadioTable, CrossRefTable)> {
    cross_match_with(radio, cross_ref, &CrossMatchCuts::default())
}

pub fn cross_match_with(
    radio: &RadioTable,
    cross_ref: &CrossRefTable,
    cuts: &CrossMatchCuts,
) -> CatalogResult<(RadioTable, CrossRefTable)> {
    warn_on_repeats(radio, "radio");
    warn_on_repeats(cross_ref, "cross-reference");
    let pairs = join_on_identifier(radio, cross_ref);
    let (radio_rows, xref_rows): (Vec<usize>, Vec<usize>) = pairs.into_iter().unzip();
    let mut matched = (radio.take(&radio_rows), cross_ref.take(&xref_rows));
    log::info!(
        "Cross-match: {} of {} radio sources have a cross-reference entry",
        matched.0.len(),
        radio.len()
    );

    matched = narrow_by_radio(matched, "distance >", |r| r.distance > cuts.min_distance)?;
    matched = narrow_by_radio(matched, "distance <", |r| r.distance < cuts.max_distance)?;
    matched = narrow_by_xref(matched, "redshift <", |x| x.redshift < cuts.max_redshift)?;
    matched = narrow_by_xref(matched, "redshift >", |x| x.redshift > cuts.min_redshift)?;

    log::info!("Cross-match: {} sources pass range cuts", matched.0.len());
    Ok(matched)
}

fn narrow_by_radio(
    (radio, xref): (RadioTable, CrossRefTable),
    label: &str,
    keep: impl Fn(&RadioRecord) -> bool,
) -> CatalogResult<(RadioTable, CrossRefTable)> {
    let mask = radio.mask_where(keep);
    log::debug!("Cut {}: {} -> {}", label, radio.len(), mask.selected());
    Ok((radio.subset(&mask)?, xref.subset(&mask)?))
}

fn narrow_by_xref(
    (radio, xref): (RadioTable, CrossRefTable),
    label: &str,
    keep: impl Fn(&CrossRefRecord) -> bool,
) -> CatalogResult<(RadioTable, CrossRefTable)> {
    let mask = xref.mask_where(keep);
    log::debug!("Cut {}: {} -> {}", label, xref.len(), mask.selected());
    Ok((radio.subset(&mask)?, xref.subset(&mask)?))
}
