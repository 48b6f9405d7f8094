use anyhow::Result;
use clap::Args;
use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
#[command(about = "Remove staging and converter cache directories")]
pub struct CleanArgs {
    /// Staging directory used by previous imports
    #[arg(long = "staging-dir", default_value = "temp")]
    pub staging_dir: PathBuf,
}

pub fn execute(args: CleanArgs) -> Result<()> {
    remove_staging(&args.staging_dir);
    println!("Clean complete");
    Ok(())
}

/// Best-effort removal of the staging tree and the `__pycache__`
/// directory the Python-based converter can leave in the working
/// directory. Never fails the batch: a missing directory is routine
/// and anything else only warrants a warning.
pub fn remove_staging(staging_dir: &Path) {
    for dir in [staging_dir, Path::new("__pycache__")] {
        match std::fs::remove_dir_all(dir) {
            Ok(()) => info!("Removed directory: {}", dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Directory {} not found, nothing to remove", dir.display());
            }
            Err(e) => warn!("Failed to remove {}: {e}", dir.display()),
        }
    }
}
