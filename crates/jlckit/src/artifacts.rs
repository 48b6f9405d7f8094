use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SYMBOL_FILE: &str = "symbol.kicad_sym";
pub const FOOTPRINT_FILE: &str = "footprint.kicad_mod";
pub const MODEL_FILE: &str = "model.step";

/// Which of the recognized artifact files a converter run produced.
///
/// Anything the converter writes with an unrecognized extension stays
/// where it is in staging and is discarded with it.
#[derive(Debug, Default)]
pub struct GeneratedArtifacts {
    pub symbol: Option<PathBuf>,
    pub footprint: Option<PathBuf>,
    pub model: Option<PathBuf>,
}

impl GeneratedArtifacts {
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none() && self.footprint.is_none() && self.model.is_none()
    }

    fn slots(&self) -> [(&Option<PathBuf>, &'static str); 3] {
        [
            (&self.symbol, SYMBOL_FILE),
            (&self.footprint, FOOTPRINT_FILE),
            (&self.model, MODEL_FILE),
        ]
    }
}

/// Recursively scan a staging subtree and classify files by extension.
///
/// The walk is sorted so repeated runs over the same tree classify
/// identically; the first match per category wins.
pub fn scan_staging(staging_dir: &Path) -> GeneratedArtifacts {
    let mut found = GeneratedArtifacts::default();

    for entry in WalkDir::new(staging_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let slot = match ext {
            "kicad_sym" => &mut found.symbol,
            "kicad_mod" => &mut found.footprint,
            "step" => &mut found.model,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(path.to_path_buf());
        } else {
            debug!("Ignoring extra .{ext} file in staging: {}", path.display());
        }
    }

    found
}

/// Move classified artifacts into `<lib_dir>/<name>/` under their
/// canonical filenames, overwriting whatever a previous run left there.
/// Returns the destination directory.
pub fn place(artifacts: &GeneratedArtifacts, lib_dir: &Path, name: &str) -> Result<PathBuf> {
    let dest_dir = lib_dir.join(name);
    fs::create_dir_all(&dest_dir)
        .with_context(|| format!("Failed to create component directory {}", dest_dir.display()))?;

    for (src, filename) in artifacts.slots() {
        let Some(src) = src else { continue };
        let dest = dest_dir.join(filename);
        move_file(src, &dest)?;
        info!("Moved {} -> {}", src.display(), dest.display());
    }

    Ok(dest_dir)
}

/// Rename, falling back to copy+remove when staging and the library
/// root sit on different filesystems.
fn move_file(src: &Path, dest: &Path) -> Result<()> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    fs::copy(src, dest)
        .with_context(|| format!("Failed to move {} -> {}", src.display(), dest.display()))?;
    fs::remove_file(src)
        .with_context(|| format!("Failed to remove staged file {}", src.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_classifies_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("C123");
        touch(&staging.join("symbol/NE555.kicad_sym"), "(sym)");
        touch(&staging.join("footprint/SOIC-8.kicad_mod"), "(mod)");
        touch(&staging.join("3dmodel/deep/NE555.step"), "step");
        touch(&staging.join("notes.txt"), "ignore me");

        let found = scan_staging(&staging);
        assert!(found.symbol.as_ref().unwrap().ends_with("NE555.kicad_sym"));
        assert!(
            found
                .footprint
                .as_ref()
                .unwrap()
                .ends_with("SOIC-8.kicad_mod")
        );
        assert!(found.model.as_ref().unwrap().ends_with("NE555.step"));
    }

    #[test]
    fn scan_of_empty_tree_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_staging(dir.path()).is_empty());
    }

    #[test]
    fn place_moves_files_under_canonical_names() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        let lib_dir = dir.path().join("lib");
        touch(&staging.join("symbol/NE555.kicad_sym"), "(sym)");
        touch(&staging.join("footprint/SOIC-8.kicad_mod"), "(mod)");
        touch(&staging.join("unrelated.json"), "{}");

        let found = scan_staging(&staging);
        let dest = place(&found, &lib_dir, "NE555").unwrap();

        assert_eq!(dest, lib_dir.join("NE555"));
        assert_eq!(fs::read_to_string(dest.join(SYMBOL_FILE)).unwrap(), "(sym)");
        assert_eq!(
            fs::read_to_string(dest.join(FOOTPRINT_FILE)).unwrap(),
            "(mod)"
        );
        assert!(!dest.join(MODEL_FILE).exists());
        // Moved, not copied; unrecognized files stay behind.
        assert!(!staging.join("symbol/NE555.kicad_sym").exists());
        assert!(staging.join("unrelated.json").exists());
    }

    #[test]
    fn place_overwrites_previous_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        let lib_dir = dir.path().join("lib");
        touch(&lib_dir.join("NE555").join(SYMBOL_FILE), "(old)");
        touch(&staging.join("NE555.kicad_sym"), "(new)");

        let found = scan_staging(&staging);
        place(&found, &lib_dir, "NE555").unwrap();

        assert_eq!(
            fs::read_to_string(lib_dir.join("NE555").join(SYMBOL_FILE)).unwrap(),
            "(new)"
        );
    }
}
