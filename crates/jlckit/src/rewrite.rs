use anyhow::{Context, Result};
use jlckit_sexpr::{PatchSet, Sexpr, SexprKind, parse};
use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::artifacts::{FOOTPRINT_FILE, MODEL_FILE};
use crate::paths::{PROJECT_ROOT_VAR, lib_dir_slug};

/// Point the symbol's "Footprint" property at the placed footprint.
///
/// The converter writes a library-nickname reference there; after
/// relocation the footprint lives at a fixed path under the library
/// root, so the property becomes `<lib_dir>/<name>/footprint.kicad_mod`.
/// Re-running replaces the value with itself.
pub fn footprint_property(symbol_file: &Path, lib_dir: &Path, name: &str) -> Result<()> {
    let new_path = format!("{}/{name}/{FOOTPRINT_FILE}", lib_dir_slug(lib_dir));
    let patched = patch_file(symbol_file, |node, patches| {
        let Some(items) = node.as_list() else { return };
        if items.first().and_then(Sexpr::as_sym) == Some("property")
            && items.get(1).and_then(Sexpr::as_str) == Some("Footprint")
            && let Some(value) = items.get(2)
            && value.as_str().is_some()
        {
            patches.replace_string(value.span, &new_path);
        }
    })?;

    if patched {
        info!("Updated Footprint property in {}", symbol_file.display());
    } else {
        warn!(
            "No Footprint property found in {}, leaving file untouched",
            symbol_file.display()
        );
    }
    Ok(())
}

/// Point the footprint's `(model ...)` node at the placed 3D model.
///
/// Only the path argument changes; offset/scale/rotate children stay
/// as generated. A footprint without a model node is left alone.
pub fn model_reference(footprint_file: &Path, lib_dir: &Path, name: &str) -> Result<()> {
    let new_path = format!(
        "{PROJECT_ROOT_VAR}/{}/{name}/{MODEL_FILE}",
        lib_dir_slug(lib_dir)
    );
    let patched = patch_file(footprint_file, |node, patches| {
        let Some(items) = node.as_list() else { return };
        if items.first().and_then(Sexpr::as_sym) == Some("model")
            && let Some(arg) = items.get(1)
            && matches!(arg.kind, SexprKind::Str(_) | SexprKind::Symbol(_))
        {
            patches.replace_string(arg.span, &new_path);
        }
    })?;

    if patched {
        info!("Updated model reference in {}", footprint_file.display());
    } else {
        info!(
            "No model reference in {}, nothing to rewrite",
            footprint_file.display()
        );
    }
    Ok(())
}

/// Parse `file`, let `collect` queue span patches, and write the file
/// back only when something matched. Returns whether anything did.
fn patch_file<F>(file: &Path, collect: F) -> Result<bool>
where
    F: Fn(&Sexpr, &mut PatchSet),
{
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let root =
        parse(&content).with_context(|| format!("Failed to parse {}", file.display()))?;

    let mut patches = PatchSet::new();
    root.walk(&mut |node| collect(node, &mut patches));

    if patches.is_empty() {
        return Ok(false);
    }
    fs::write(file, patches.render(&content))
        .with_context(|| format!("Failed to write {}", file.display()))?;
    Ok(true)
}
