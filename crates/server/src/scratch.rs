//! Request-scoped scratch files.
//!
//! Every path handed out by a [`ScratchSpace`] is removed when the space is
//! dropped, so early returns and errors clean up the same way success does.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

pub struct ScratchSpace {
    dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl ScratchSpace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Vec::new(),
        }
    }

    /// Reserve a fresh `cadbom-{uuid}.{ext}` path and register it for cleanup.
    ///
    /// The file itself is not created.
    pub fn allocate(&mut self, ext: &str) -> PathBuf {
        let path = self.dir.join(format!("cadbom-{}.{}", Uuid::new_v4(), ext));
        self.paths.push(path.clone());
        path
    }

    #[cfg(test)]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        for path in &self.paths {
            remove(path);
        }
    }
}

fn remove(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed scratch file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to remove scratch file: {}", e),
    }
}

/// File extension to use for a caller-declared type.
///
/// Anything that is not a short alphanumeric token becomes `bin`, so a
/// declared type can never steer the path outside the scratch directory.
pub fn extension_for(declared: &str) -> String {
    let ext = declared.trim().trim_start_matches('.').to_ascii_lowercase();
    if !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        ext
    } else {
        "bin".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_paths_are_unique_and_named() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchSpace::new(dir.path());
        let a = scratch.allocate("step");
        let b = scratch.allocate("step");

        assert_ne!(a, b);
        assert_eq!(a.parent().unwrap(), dir.path());
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("cadbom-"));
        assert!(name.ends_with(".step"));
        assert_eq!(scratch.paths().len(), 2);
    }

    #[test]
    fn drop_removes_written_files_and_ignores_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut scratch = ScratchSpace::new(dir.path());
            std::fs::write(scratch.allocate("stl"), b"solid x").unwrap();
            std::fs::write(scratch.allocate("gltf"), b"{}").unwrap();
            scratch.allocate("never-written");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn declared_types_are_sanitized() {
        assert_eq!(extension_for("STEP"), "step");
        assert_eq!(extension_for(".stp"), "stp");
        assert_eq!(extension_for("../../etc"), "bin");
        assert_eq!(extension_for(""), "bin");
    }
}
