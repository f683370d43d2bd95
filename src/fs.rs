//! Filesystem abstraction behind dataset existence checks and deletes.

use crate::error::{Result, SteelToesError};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Storage backend that datasets live on.
pub trait FileSystem {
    /// Check whether something exists at `path`.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Delete `path`; directories are only removed when `recursive` is set.
    fn delete(&self, path: &Path, recursive: bool) -> Result<()>;
}

/// Local disk, with relative dataset paths resolved against a project root.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a dataset path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> Result<bool> {
        let full = self.resolve(path);
        full.try_exists().map_err(|e| {
            SteelToesError::FileSystem(format!("Failed to stat {}: {}", full.display(), e))
        })
    }

    fn delete(&self, path: &Path, recursive: bool) -> Result<()> {
        let full = self.resolve(path);
        let meta = fs::metadata(&full).map_err(|e| {
            SteelToesError::FileSystem(format!("Failed to stat {}: {}", full.display(), e))
        })?;

        let removed = if meta.is_dir() {
            if recursive {
                fs::remove_dir_all(&full)
            } else {
                fs::remove_dir(&full)
            }
        } else {
            fs::remove_file(&full)
        };

        removed.map_err(|e| {
            SteelToesError::FileSystem(format!("Failed to delete {}: {}", full.display(), e))
        })
    }
}

/// In-memory store of paths.
///
/// Every delete call is recorded, including ones that fail.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    paths: RefCell<BTreeSet<PathBuf>>,
    deletes: RefCell<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let fs = Self::new();
        for path in paths {
            fs.touch(path);
        }
        fs
    }

    /// Create `path` in the store.
    pub fn touch(&self, path: impl Into<PathBuf>) {
        self.paths.borrow_mut().insert(path.into());
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.borrow().iter().cloned().collect()
    }

    /// Paths passed to `delete`, in call order.
    pub fn deletes(&self) -> Vec<PathBuf> {
        self.deletes.borrow().clone()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> Result<bool> {
        let paths = self.paths.borrow();
        Ok(paths.iter().any(|p| p == path || p.starts_with(path)))
    }

    fn delete(&self, path: &Path, recursive: bool) -> Result<()> {
        self.deletes.borrow_mut().push(path.to_path_buf());

        let mut paths = self.paths.borrow_mut();
        let children = paths.iter().any(|p| p != path && p.starts_with(path));
        if children && !recursive {
            return Err(SteelToesError::FileSystem(format!(
                "Refusing to delete non-empty directory {}",
                path.display()
            )));
        }

        let before = paths.len();
        paths.retain(|p| !p.starts_with(path));
        if paths.len() == before {
            return Err(SteelToesError::FileSystem(format!("No such path: {}", path.display())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_resolve_relative() {
        let fs = LocalFileSystem::new("/project");
        assert_eq!(
            fs.resolve(Path::new("data/sales.csv")),
            PathBuf::from("/project/data/sales.csv")
        );
        assert_eq!(fs.resolve(Path::new("/abs/sales.csv")), PathBuf::from("/abs/sales.csv"));
    }

    #[test]
    fn test_local_exists_and_delete_file() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("data")).unwrap();
        std::fs::write(temp.path().join("data/sales.csv"), "a,b").unwrap();

        let fs = LocalFileSystem::new(temp.path());
        let path = Path::new("data/sales.csv");
        assert!(fs.exists(path).unwrap());

        fs.delete(path, true).unwrap();
        assert!(!fs.exists(path).unwrap());
    }

    #[test]
    fn test_local_delete_directory_needs_recursive() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("data/model_bob");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("part-0"), "x").unwrap();

        let fs = LocalFileSystem::new(temp.path());
        assert!(fs.delete(Path::new("data/model_bob"), false).is_err());
        fs.delete(Path::new("data/model_bob"), true).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_local_delete_missing_fails() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFileSystem::new(temp.path());
        let result = fs.delete(Path::new("missing.csv"), true);
        assert!(matches!(result, Err(SteelToesError::FileSystem(_))));
    }

    #[test]
    fn test_memory_exists() {
        let fs = MemoryFileSystem::with_paths(["data/sales.csv"]);
        assert!(fs.exists(Path::new("data/sales.csv")).unwrap());
        assert!(fs.exists(Path::new("data")).unwrap());
        assert!(!fs.exists(Path::new("data/sales_bob.csv")).unwrap());
    }

    #[test]
    fn test_memory_delete_records_calls() {
        let fs = MemoryFileSystem::with_paths(["data/a.csv", "data/b.csv"]);
        fs.delete(Path::new("data/a.csv"), true).unwrap();
        assert!(fs.delete(Path::new("data/a.csv"), true).is_err());

        assert_eq!(fs.deletes(), vec![PathBuf::from("data/a.csv"), PathBuf::from("data/a.csv")]);
        assert_eq!(fs.paths(), vec![PathBuf::from("data/b.csv")]);
    }

    #[test]
    fn test_memory_delete_directory() {
        let fs = MemoryFileSystem::with_paths(["out/part-0", "out/part-1", "keep.csv"]);
        assert!(fs.delete(Path::new("out"), false).is_err());
        fs.delete(Path::new("out"), true).unwrap();
        assert_eq!(fs.paths(), vec![PathBuf::from("keep.csv")]);
    }
}
