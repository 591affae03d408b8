//! Source file discovery (spec §5): walks every `-s/--source` directory
//! recursively and collects `.cubent` files in deterministic lexicographic
//! order, so repeated compiles of the same tree always parse files in the
//! same sequence and therefore report diagnostics in the same order.
//!
//! Grounded on `faxc-drv/src/lib.rs`'s `read_sources` phase, generalized
//! from a flat file list to a directory walk since Cubent projects are
//! organized into directory trees rather than passed file-by-file.

use std::path::{Path, PathBuf};

use crate::error::DriverError;

pub fn discover(roots: &[PathBuf]) -> Result<Vec<PathBuf>, DriverError> {
    let mut files = Vec::new();
    for root in roots {
        if !root.exists() {
            return Err(DriverError::io(format!("source path '{}' does not exist", root.display())));
        }
        if root.is_file() {
            files.push(root.clone());
        } else {
            walk(root, &mut files)?;
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DriverError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| DriverError::io(format!("reading directory '{}': {e}", dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("cubent") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collects_cubent_files_in_lexicographic_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.cubent"), "").unwrap();
        fs::write(dir.path().join("a.cubent"), "").unwrap();
        fs::write(dir.path().join("ignored.txt"), "").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("c.cubent"), "").unwrap();

        let found = discover(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = found.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.cubent", "b.cubent", "c.cubent"]);
    }

    #[test]
    fn missing_source_path_is_an_error() {
        let result = discover(&[PathBuf::from("/does/not/exist")]);
        assert!(result.is_err());
    }
}
