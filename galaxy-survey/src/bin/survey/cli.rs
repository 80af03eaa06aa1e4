//! CLI argument definitions for survey

use clap::{Parser, Subcommand, ValueEnum};
use galaxy_survey::PhotometryModel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "survey")]
#[command(about = "Load, quality-cut and cross-match galaxy survey catalogs")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file supplying paths, model and cuts
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Drop malformed lines instead of aborting the load
    #[arg(long, global = true)]
    pub skip_malformed: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the photometric catalog and report the quality cut
    Photometry(PhotometryArgs),

    /// Load the ALFALFA HI source catalog
    Radio(CatalogFileArgs),

    /// Load the ALFALFA/SDSS cross-reference catalog
    CrossRef(CatalogFileArgs),

    /// Join the radio and cross-reference catalogs and apply range cuts
    CrossMatch(CrossMatchArgs),
}

#[derive(Parser)]
pub struct PhotometryArgs {
    /// Directory holding the UPenn_PhotDec_*.fits files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Fit model: bestfit, dev, ser, devexp, serexp or 1-5
    #[arg(long)]
    pub model: Option<PhotometryModel>,
}

#[derive(Parser)]
pub struct CatalogFileArgs {
    /// Catalog file (.txt or .txt.gz)
    pub path: Option<PathBuf>,

    /// Print the first N records
    #[arg(long, default_value = "0")]
    pub show: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Parser)]
pub struct CrossMatchArgs {
    /// ALFALFA HI source catalog (a40.datafile1.txt)
    #[arg(long)]
    pub radio: Option<PathBuf>,

    /// ALFALFA/SDSS cross-reference catalog (a40.datafile3.txt)
    #[arg(long)]
    pub cross_ref: Option<PathBuf>,

    /// Output format for matched pairs
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Maximum number of matched pairs to print
    #[arg(long)]
    pub limit: Option<usize>,
}
