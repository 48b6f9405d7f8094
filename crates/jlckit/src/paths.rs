use path_slash::PathExt as _;
use std::path::Path;

/// Project-root variable KiCad substitutes when loading table URIs.
///
/// Emitted literally; resolution happens in KiCad, never here.
pub const PROJECT_ROOT_VAR: &str = "${KIPRJMOD}";

/// Normalize a library directory for embedding in URIs and properties:
/// forward slashes on every platform, no leading or trailing separators.
pub fn lib_dir_slug(lib_dir: &Path) -> String {
    lib_dir.to_slash_lossy().trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn strips_surrounding_slashes() {
        assert_eq!(lib_dir_slug(Path::new("lib/")), "lib");
        assert_eq!(lib_dir_slug(Path::new("/parts/lib")), "parts/lib");
    }

    #[test]
    fn keeps_relative_paths_untouched() {
        assert_eq!(lib_dir_slug(&PathBuf::from("lib")), "lib");
        assert_eq!(lib_dir_slug(Path::new("nested/lib/dir")), "nested/lib/dir");
    }
}
