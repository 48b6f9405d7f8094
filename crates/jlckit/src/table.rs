use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::artifacts::{FOOTPRINT_FILE, SYMBOL_FILE};
use crate::paths::{PROJECT_ROOT_VAR, lib_dir_slug};

/// KiCad writes `(version 7)` into tables it creates; synthesized
/// tables match so a later KiCad save does not churn the file.
const VERSION_LINE: &str = "  (version 7)";
const ENTRY_MARKER: &str = "(lib (name ";
const CLOSING_DELIMITER: &str = ")";

/// Which library table a merge targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibKind {
    Symbol,
    Footprint,
}

impl LibKind {
    fn table_tag(self) -> &'static str {
        match self {
            LibKind::Symbol => "sym_lib_table",
            LibKind::Footprint => "fp_lib_table",
        }
    }

    fn artifact_file(self) -> &'static str {
        match self {
            LibKind::Symbol => SYMBOL_FILE,
            LibKind::Footprint => FOOTPRINT_FILE,
        }
    }
}

/// Idempotently register `names` in a library table.
///
/// Existing lines are carried over verbatim (the merge is
/// line-oriented precisely so entries written by KiCad or by hand are
/// never reformatted); new entries are appended before the closing
/// delimiter in processing order. Names already present, or repeated
/// within one run, produce no second entry.
pub fn merge_entries(table_path: &Path, lib_dir: &Path, names: &[String], kind: LibKind) -> Result<()> {
    let mut lines: Vec<String> = if table_path.exists() {
        fs::read_to_string(table_path)
            .with_context(|| format!("Failed to read {}", table_path.display()))?
            .lines()
            .map(str::to_string)
            .collect()
    } else {
        warn!(
            "{} not found, creating a new {} file",
            table_path.display(),
            kind.table_tag()
        );
        vec![format!("({}", kind.table_tag()), VERSION_LINE.to_string()]
    };

    // Drop the closing delimiter (and stray trailing blanks); it is
    // re-appended below as the single final line.
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.last().is_some_and(|l| l.trim() == CLOSING_DELIMITER) {
        lines.pop();
    }

    let mut existing: HashSet<String> = lines.iter().filter_map(|l| entry_name(l)).collect();

    let mut appended = 0usize;
    for name in names {
        if existing.contains(name) {
            debug!(
                "{name} already registered in {}, skipping",
                table_path.display()
            );
            continue;
        }
        lines.push(entry_line(name, lib_dir, kind));
        existing.insert(name.clone());
        appended += 1;
    }

    lines.push(CLOSING_DELIMITER.to_string());

    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(table_path, content)
        .with_context(|| format!("Failed to write {}", table_path.display()))?;

    info!(
        "Updated {} ({appended} new of {} processed)",
        table_path.display(),
        names.len()
    );
    Ok(())
}

/// Extract the quoted name from an entry line like
/// `  (lib (name "NE555DR")(type "KiCad")...)`.
fn entry_name(line: &str) -> Option<String> {
    let at = line.find(ENTRY_MARKER)?;
    let rest = line[at + ENTRY_MARKER.len()..].trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

fn entry_line(name: &str, lib_dir: &Path, kind: LibKind) -> String {
    format!(
        "  (lib (name \"{name}\")(type \"KiCad\")(uri \"{PROJECT_ROOT_VAR}/{}/{name}/{}\")(options \"\")(descr \"\"))",
        lib_dir_slug(lib_dir),
        kind.artifact_file()
    )
}
