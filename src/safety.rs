//! Safety checks to keep output files from clobbering the input.
//!
//! Per-address files are named by plain string concatenation, so an unlucky
//! output prefix plus address can land exactly on the input file.

use anyhow::{bail, Result};
use std::path::{is_separator, Component, Path};

/// Fail if writing `output` would overwrite `source`.
///
/// Paths are compared as given and, when both exist, after canonicalization.
pub fn ensure_not_source(output: &Path, source: &Path) -> Result<()> {
    let same = output == source
        || match (output.canonicalize(), source.canonicalize()) {
            (Ok(out), Ok(src)) => out == src,
            _ => false,
        };

    if same {
        bail!(
            "Safety check failed: output '{}' cannot be the same as source '{}'",
            output.display(),
            source.display()
        );
    }
    Ok(())
}

/// Whether an address can be used verbatim as a single file name.
///
/// Empty names, `.`/`..` and anything containing a separator of the current
/// platform would write somewhere other than `<output_path><address>.csv` implies.
pub fn is_filesystem_safe(address: &str) -> bool {
    if address.is_empty() || address.contains('\0') || address.chars().any(is_separator) {
        return false;
    }
    matches!(
        Path::new(address).components().next(),
        Some(Component::Normal(_))
    ) && Path::new(address).components().count() == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_distinct_paths_ok() {
        let output = PathBuf::from("/tmp/out/5 oak ave.csv");
        let source = PathBuf::from("/data/listings.csv");
        assert!(ensure_not_source(&output, &source).is_ok());
    }

    #[test]
    fn test_output_equals_source() {
        let path = PathBuf::from("/data/listings.csv");
        let result = ensure_not_source(&path, &path);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as source"));
    }

    #[test]
    fn test_output_equals_source_after_canonicalize() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("listings.csv");
        std::fs::write(&source, "address\n").unwrap();
        let output = dir.path().join(".").join("listings.csv");
        assert!(ensure_not_source(&output, &source).is_err());
    }

    #[test]
    fn test_filesystem_safe_addresses() {
        assert!(is_filesystem_safe("123 main st"));
        assert!(is_filesystem_safe("5 oak ave, apt. 2"));
        assert!(!is_filesystem_safe(""));
        assert!(!is_filesystem_safe("."));
        assert!(!is_filesystem_safe(".."));
        assert!(!is_filesystem_safe("12/14 high st"));
        assert!(!is_filesystem_safe("nul\0byte"));
    }

    #[test]
    #[cfg(unix)]
    fn test_backslash_is_a_plain_character_on_unix() {
        assert!(is_filesystem_safe("unit 3\\4"));
    }

    #[test]
    #[cfg(windows)]
    fn test_backslash_is_a_separator_on_windows() {
        assert!(!is_filesystem_safe("unit 3\\4"));
    }
}
