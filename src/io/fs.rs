use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::util::join_posix;

/// Read access to the files a descriptor refers to.
///
/// Paths are forward-slash joined strings, as produced by the parser.
pub trait FileSystem: Send + Sync {
    /// Returns true if something exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Reads the whole file at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

// --- Implementation: Local disk ---

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(path).map_err(|e| io::Error::new(e.kind(), format!("{path}: {e}")))
    }
}

// --- Implementation: In-memory ---

/// A virtual filesystem held in memory.
///
/// Paths are normalized on the way in and on lookup, so `./a/../b.html`
/// and `b.html` name the same file.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        self.files.insert(join_posix("", path), data.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&join_posix("", path))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(&join_posix("", path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path}: not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fs_normalizes_paths() {
        let fs = MemoryFs::new().with_file("root/simple/ctnt.html", "<p/>");
        assert!(fs.exists("root/simple/ctnt.html"));
        assert!(fs.exists("./root/other/../simple/ctnt.html"));
        assert!(!fs.exists("root/ctnt.html"));
        assert_eq!(fs.read("root/simple/ctnt.html").unwrap(), b"<p/>");
        assert_eq!(
            fs.read("root/missing.html").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_local_fs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctnt.html");
        std::fs::write(&path, b"hello").unwrap();
        let path = path.to_string_lossy().replace('\\', "/");

        assert!(LocalFs.exists(&path));
        assert_eq!(LocalFs.read(&path).unwrap(), b"hello");

        let missing = format!("{path}.missing");
        assert!(!LocalFs.exists(&missing));
        assert!(LocalFs.read(&missing).is_err());
    }
}
