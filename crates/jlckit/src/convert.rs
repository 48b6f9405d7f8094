use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::artifacts::{self, GeneratedArtifacts};

const DEFAULT_CONVERTER: &str = "JLC2KiCadLib";
const CONVERTER_ENV: &str = "JLC2KICAD_BIN";

/// Resolve the converter executable: explicit flag, then the
/// JLC2KICAD_BIN environment variable, then the PATH default.
pub fn converter_bin(flag: Option<&str>) -> String {
    if let Some(bin) = flag {
        return bin.to_string();
    }
    std::env::var(CONVERTER_ENV).unwrap_or_else(|_| DEFAULT_CONVERTER.to_string())
}

/// Verify the converter can be spawned at all before the batch starts.
pub fn check_converter(bin: &str) -> Result<()> {
    match Command::new(bin).arg("--help").output() {
        Ok(_) => Ok(()),
        Err(e) => Err(anyhow!(
            "Converter '{bin}' is not runnable: {e}\n\
             Install JLC2KiCadLib (pip install JLC2KiCadLib), or point the \
             {CONVERTER_ENV} environment variable or --converter flag at it."
        )),
    }
}

/// Run the converter for one part into its staging subdirectory and
/// report which recognized artifact files appeared.
///
/// The call blocks until the converter exits; its own output goes
/// straight to the terminal. A non-zero exit aborts this part only.
pub fn generate(bin: &str, part: &str, staging_dir: &Path) -> Result<GeneratedArtifacts> {
    fs::create_dir_all(staging_dir).with_context(|| {
        format!(
            "Failed to create staging directory {}",
            staging_dir.display()
        )
    })?;

    debug!("Invoking {bin} {part} -dir {}", staging_dir.display());
    let status = Command::new(bin)
        .arg(part)
        .arg("-dir")
        .arg(staging_dir)
        .status()
        .with_context(|| format!("Failed to execute converter '{bin}'"))?;

    if !status.success() {
        anyhow::bail!("Converter exited with {status} for {part}");
    }
    info!("Converter finished for {part}");

    Ok(artifacts::scan_staging(staging_dir))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Drop a fake converter script that mimics JLC2KiCadLib's output
    /// layout: a `symbol/` subdirectory plus footprint and model files.
    fn fake_converter(dir: &Path, body: &str) -> String {
        let script = dir.join("fake-converter.sh");
        fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script.to_string_lossy().into_owned()
    }

    #[test]
    fn generate_scans_what_the_converter_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_converter(
            dir.path(),
            r#"[ -z "$3" ] && exit 0
mkdir -p "$3/symbol" "$3/footprint"
echo '(sym)' > "$3/symbol/NE555.kicad_sym"
echo '(mod)' > "$3/footprint/SOIC-8.kicad_mod""#,
        );

        let staging = dir.path().join("temp/C123");
        let found = generate(&bin, "C123", &staging).unwrap();
        assert!(found.symbol.is_some());
        assert!(found.footprint.is_some());
        assert!(found.model.is_none());
    }

    #[test]
    fn generate_fails_on_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_converter(dir.path(), "exit 3");

        let staging = dir.path().join("temp/C999");
        let err = generate(&bin, "C999", &staging).unwrap_err();
        assert!(err.to_string().contains("C999"));
    }

    #[test]
    fn check_converter_reports_missing_binary() {
        let err = check_converter("/nonexistent/converter-binary").unwrap_err();
        assert!(err.to_string().contains("not runnable"));
    }

    #[test]
    fn converter_bin_prefers_explicit_flag() {
        assert_eq!(converter_bin(Some("/opt/conv")), "/opt/conv");
    }
}
