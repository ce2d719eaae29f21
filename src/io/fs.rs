use std::{fs, path::Path};

use anyhow::{bail, Context, Result};

/// Make sure `dir` is a directory, creating it (and its parents) when absent.
pub fn ensure_dir_exists(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => bail!("[io::fs] Output path exists and is not a directory: {}", dir.display()),
        Err(_) => fs::create_dir_all(dir)
            .with_context(|| format!("[io::fs] Failed to create output directory {}", dir.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("report/2024/run");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn rejects_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("report");
        fs::write(&file, "x").unwrap();
        let err = ensure_dir_exists(&file).unwrap_err();
        assert!(err.to_string().starts_with("[io::fs]"), "{err}");
    }
}
