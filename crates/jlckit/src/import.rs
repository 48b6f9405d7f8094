use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::{error, info, warn};
use std::fs;
use std::path::PathBuf;

use crate::table::LibKind;
use crate::{artifacts, clean, convert, resolve, rewrite, table, validate};

#[derive(Args, Debug)]
#[command(about = "Import LCSC parts into the project library")]
pub struct ImportArgs {
    /// LCSC part numbers to process (e.g. C2904912)
    #[arg(value_name = "PART", default_values_t = default_parts())]
    pub parts: Vec<String>,

    /// Base directory for generated library files
    #[arg(long = "lib-dir", default_value = "lib")]
    pub lib_dir: PathBuf,

    /// Staging directory for raw converter output
    #[arg(long = "staging-dir", default_value = "temp")]
    pub staging_dir: PathBuf,

    /// Path to the symbol library table
    #[arg(long = "sym-lib-table", default_value = "sym-lib-table")]
    pub sym_lib_table: PathBuf,

    /// Path to the footprint library table
    #[arg(long = "fp-lib-table", default_value = "fp-lib-table")]
    pub fp_lib_table: PathBuf,

    /// Converter executable (overrides the JLC2KICAD_BIN environment variable)
    #[arg(long = "converter")]
    pub converter: Option<String>,

    /// Keep the staging directory for converter-output debugging
    #[arg(long = "keep-staging")]
    pub keep_staging: bool,
}

fn default_parts() -> Vec<String> {
    vec!["C2904912".to_string(), "C2939725".to_string()]
}

pub fn execute(args: ImportArgs) -> Result<()> {
    let parts = validate::validate_part_numbers(&args.parts);
    let converter = convert::converter_bin(args.converter.as_deref());

    fs::create_dir_all(&args.lib_dir).with_context(|| {
        format!(
            "Failed to create library directory {}",
            args.lib_dir.display()
        )
    })?;
    fs::create_dir_all(&args.staging_dir).with_context(|| {
        format!(
            "Failed to create staging directory {}",
            args.staging_dir.display()
        )
    })?;

    if !parts.is_empty() {
        convert::check_converter(&converter)?;
    }

    // Canonical names in processing order; both table merges run once,
    // after all per-part file operations are done.
    let mut processed: Vec<String> = Vec::new();
    for part in &parts {
        info!("Processing LCSC part number: {part}");
        match import_part(part, &converter, &args) {
            Ok(name) => {
                info!("Imported {part} as {name}");
                processed.push(name);
            }
            Err(e) => error!("Skipping {part}: {e:#}"),
        }
    }

    table::merge_entries(&args.sym_lib_table, &args.lib_dir, &processed, LibKind::Symbol)?;
    table::merge_entries(&args.fp_lib_table, &args.lib_dir, &processed, LibKind::Footprint)?;

    if !args.keep_staging {
        clean::remove_staging(&args.staging_dir);
    }

    println!(
        "{} KiCad library generation complete ({} of {} parts imported)",
        "✓".green().bold(),
        processed.len(),
        parts.len()
    );
    Ok(())
}

/// Full pipeline for one part. Any error here is local to the part:
/// the caller logs it and moves on to the next identifier.
fn import_part(part: &str, converter: &str, args: &ImportArgs) -> Result<String> {
    let staging_dir = args.staging_dir.join(part);

    let generated = convert::generate(converter, part, &staging_dir)?;
    if generated.is_empty() {
        warn!("Converter produced no recognized files for {part}");
    }

    // The canonical name must come out of staging before placement
    // moves the symbol file away.
    let name = resolve::canonical_name(&staging_dir)?;

    let dest_dir = artifacts::place(&generated, &args.lib_dir, &name)?;

    if generated.symbol.is_some() {
        rewrite::footprint_property(&dest_dir.join(artifacts::SYMBOL_FILE), &args.lib_dir, &name)?;
    }
    if generated.footprint.is_some() {
        rewrite::model_reference(&dest_dir.join(artifacts::FOOTPRINT_FILE), &args.lib_dir, &name)?;
    }

    Ok(name)
}
