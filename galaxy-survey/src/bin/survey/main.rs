//! Survey: galaxy catalog loading and cross-match CLI
//!
//! Loads the UPenn photometric decomposition tables and the ALFALFA α.40
//! catalogs, applies the quality and range cuts, and reports what survives.

mod cli;
mod report;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{CatalogFileArgs, Cli, Commands, CrossMatchArgs, PhotometryArgs};
use galaxy_survey::{
    cross_match_with, load_cross_reference_catalog_with, load_photometric_catalog,
    load_radio_catalog_with, CatalogConfig, ParsePolicy, PhotometricSources,
};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match &cli.config {
        Some(path) => CatalogConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {:?}", path))?,
        None => CatalogConfig::default(),
    };

    match &cli.command {
        Commands::Photometry(args) => run_photometry(args, &config),
        Commands::Radio(args) => run_radio(args, &cli, &config),
        Commands::CrossRef(args) => run_cross_ref(args, &cli, &config),
        Commands::CrossMatch(args) => run_cross_match(args, &cli, &config),
    }
}

fn parse_policy(cli: &Cli, config: &CatalogConfig) -> ParsePolicy {
    if cli.skip_malformed {
        ParsePolicy::SkipRecord
    } else {
        config.parse_policy
    }
}

fn radio_path(explicit: Option<&PathBuf>, config: &CatalogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    match &config.alfalfa {
        Some(alfalfa) => Ok(alfalfa.radio.clone()),
        None => bail!("No radio catalog given; pass a path or set alfalfa.radio in --config"),
    }
}

fn cross_ref_path(explicit: Option<&PathBuf>, config: &CatalogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    match &config.alfalfa {
        Some(alfalfa) => Ok(alfalfa.cross_reference.clone()),
        None => bail!(
            "No cross-reference catalog given; \
             pass a path or set alfalfa.cross_reference in --config"
        ),
    }
}

fn run_photometry(args: &PhotometryArgs, config: &CatalogConfig) -> anyhow::Result<()> {
    let sources = match (&args.data_dir, config.photometric_sources()) {
        (Some(dir), _) => PhotometricSources::from_dir(dir),
        (None, Some(sources)) => sources,
        (None, None) => {
            bail!("No photometric data given; pass --data-dir or set photometry in --config")
        }
    };
    let model = args.model.unwrap_or(config.model);

    for path in sources.paths() {
        log::debug!("Using {:?}", path);
    }

    let catalog = load_photometric_catalog(&sources, model)
        .with_context(|| format!("Failed to load photometric catalog ({} fit)", model))?;

    println!("\n=== Photometric catalog ({} fit) ===", model);
    println!("Initial galaxies: {}", catalog.initial_rows());
    println!("Pass quality cut: {}", catalog.len());
    for (name, table) in catalog.tables() {
        println!(
            "  {:<12} {:>8} rows x {:>3} columns",
            name,
            table.num_rows(),
            table.num_columns()
        );
    }
    Ok(())
}

fn run_radio(args: &CatalogFileArgs, cli: &Cli, config: &CatalogConfig) -> anyhow::Result<()> {
    let path = radio_path(args.path.as_ref(), config)?;
    let table = load_radio_catalog_with(&path, parse_policy(cli, config))
        .with_context(|| format!("Failed to load radio catalog {:?}", path))?;

    let with_distance = table.iter().filter(|r| r.has_distance()).count();
    println!("Radio sources: {}", table.len());
    println!("With distance: {}", with_distance);
    report::print_radio(table.iter().take(args.show));
    Ok(())
}

fn run_cross_ref(
    args: &CatalogFileArgs,
    cli: &Cli,
    config: &CatalogConfig,
) -> anyhow::Result<()> {
    let path = cross_ref_path(args.path.as_ref(), config)?;
    let table = load_cross_reference_catalog_with(&path, parse_policy(cli, config))
        .with_context(|| format!("Failed to load cross-reference catalog {:?}", path))?;

    let with_redshift = table.iter().filter(|r| r.has_redshift()).count();
    println!("Cross-reference entries: {}", table.len());
    println!("With redshift: {}", with_redshift);
    report::print_cross_ref(table.iter().take(args.show));
    Ok(())
}

fn run_cross_match(
    args: &CrossMatchArgs,
    cli: &Cli,
    config: &CatalogConfig,
) -> anyhow::Result<()> {
    let radio_file = radio_path(args.radio.as_ref(), config)?;
    let xref_file = cross_ref_path(args.cross_ref.as_ref(), config)?;
    let policy = parse_policy(cli, config);

    let radio = load_radio_catalog_with(&radio_file, policy)
        .with_context(|| format!("Failed to load radio catalog {:?}", radio_file))?;
    let xref = load_cross_reference_catalog_with(&xref_file, policy)
        .with_context(|| format!("Failed to load cross-reference catalog {:?}", xref_file))?;

    let (radio, xref) = cross_match_with(&radio, &xref, &config.cuts)?;
    let limit = args.limit.unwrap_or(radio.len());
    report::print_matches(&radio, &xref, limit, args.format)
}
