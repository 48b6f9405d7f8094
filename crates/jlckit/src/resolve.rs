use anyhow::{Context, Result, anyhow};
use jlckit_sexpr::{Sexpr, parse};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Derive the canonical (manufacturer) part name for a converted part.
///
/// The converter leaves the symbol file in a `symbol/` subdirectory of
/// the part's staging directory. The name comes from the symbol's
/// `(property "Value" "...")` when present, otherwise from the symbol
/// file's own stem. No symbol file means the part cannot be named and
/// its processing stops here.
pub fn canonical_name(staging_dir: &Path) -> Result<String> {
    let symbol_dir = staging_dir.join("symbol");
    let symbol_file = find_symbol_file(&symbol_dir).ok_or_else(|| {
        anyhow!(
            "No symbol file found under {} after conversion",
            symbol_dir.display()
        )
    })?;

    if let Some(value) = value_property(&symbol_file)
        && !value.is_empty()
    {
        debug!(
            "Canonical name {value:?} from Value property of {}",
            symbol_file.display()
        );
        return Ok(value);
    }

    symbol_file
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .inspect(|stem| debug!("Canonical name {stem:?} from symbol filename"))
        .ok_or_else(|| {
            anyhow!(
                "Symbol file {} yields no usable part name",
                symbol_file.display()
            )
        })
}

/// First `.kicad_sym` entry in sorted directory order.
fn find_symbol_file(symbol_dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(symbol_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("kicad_sym")
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Read the `(property "Value" "...")` of the first symbol definition.
///
/// An unreadable or unparsable file is not fatal; the caller falls
/// back to the filename strategy.
fn value_property(symbol_file: &Path) -> Option<String> {
    let content = fs::read_to_string(symbol_file)
        .with_context(|| format!("Failed to read {}", symbol_file.display()))
        .inspect_err(|e| debug!("{e:#}"))
        .ok()?;
    let root = match parse(&content) {
        Ok(root) => root,
        Err(e) => {
            debug!("Skipping Value extraction from {}: {e}", symbol_file.display());
            return None;
        }
    };

    let symbol = root.find_list("symbol")?;
    symbol.iter().find_map(|node| {
        let items = node.as_list()?;
        if items.first()?.as_sym()? == "property" && items.get(1)?.as_str()? == "Value" {
            items.get(2)?.as_str().map(str::to_string)
        } else {
            None
        }
    })
}
