use anyhow::{anyhow, Result};
use std::path::Path;

/// Reads a whole file, naming the `kind` of file in the error message.
pub fn read(path: &Path, kind: &str) -> Result<String> {
    match std::fs::read_to_string(path) {
        Err(e) => Err(anyhow!("Reading {} file `{}`: {}", kind, path.display(), e)),
        Ok(contents) => Ok(contents),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_names_kind_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");
        let err = read(&path, "template").unwrap_err().to_string();
        assert!(err.starts_with("Reading template file `"));
        assert!(err.contains("missing.html"));

        std::fs::write(&path, "[% body %]").unwrap();
        assert_eq!("[% body %]", read(&path, "template").unwrap());
    }
}
