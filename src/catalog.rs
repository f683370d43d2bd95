//! Dataset catalog loading from YAML configuration
//!
//! The catalog maps dataset names to their declared type and file path.
//! Entries follow the usual pipeline-project layout:
//!
//! ```yaml
//! sales:
//!   type: pandas.CSVDataSet
//!   filepath: data/01_raw/sales.csv
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{Result, SteelToesError};
use crate::fs::{FileSystem, LocalFileSystem};

/// Dataset type used for catalog entries without a `type` key.
pub const DEFAULT_DATASET_TYPE: &str = "MemoryDataSet";

/// The host catalog surface the branch injector works against.
pub trait Catalog {
    /// Dataset names in declaration order.
    fn list(&self) -> Vec<String>;

    /// Current file path of a dataset; `None` if unknown or not file-backed.
    fn filepath(&self, name: &str) -> Option<PathBuf>;

    /// Declared type of a dataset.
    fn dataset_type(&self, name: &str) -> Option<String>;

    /// Point a file-backed dataset at a new path.
    fn set_filepath(&mut self, name: &str, path: PathBuf) -> Result<()>;

    /// Check whether a path exists on the catalog's backing store.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Recursively delete a path on the catalog's backing store.
    fn delete(&mut self, path: &Path) -> Result<()>;
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub dataset_type: String,
    pub filepath: Option<PathBuf>,
}

impl Dataset {
    pub fn new(
        name: impl Into<String>,
        dataset_type: impl Into<String>,
        filepath: Option<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            dataset_type: dataset_type.into(),
            filepath,
        }
    }

    /// File-backed dataset.
    pub fn file(
        name: impl Into<String>,
        dataset_type: impl Into<String>,
        filepath: impl Into<PathBuf>,
    ) -> Self {
        Self::new(name, dataset_type, Some(filepath.into()))
    }

    /// Dataset that only lives in memory.
    pub fn memory(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_DATASET_TYPE, None)
    }
}

/// YAML representation of a catalog entry
#[derive(Debug, Deserialize)]
struct YamlDataset {
    #[serde(rename = "type")]
    dataset_type: Option<String>,
    filepath: Option<PathBuf>,
}

/// Catalog of datasets stored on a [`FileSystem`].
#[derive(Debug)]
pub struct DataCatalog<F: FileSystem = LocalFileSystem> {
    datasets: Vec<Dataset>,
    index: HashMap<String, usize>,
    fs: F,
}

impl<F: FileSystem> DataCatalog<F> {
    /// Create an empty catalog
    pub fn new(fs: F) -> Self {
        Self {
            datasets: Vec::new(),
            index: HashMap::new(),
            fs,
        }
    }

    /// Load catalog from a YAML string
    pub fn from_yaml(content: &str, fs: F) -> Result<Self> {
        let mut catalog = Self::new(fs);
        catalog.merge_yaml(content)?;
        Ok(catalog)
    }

    /// Load catalog from YAML files, later files overriding earlier entries.
    ///
    /// Files that do not exist are skipped.
    pub fn from_files<P: AsRef<Path>>(paths: &[P], fs: F) -> Result<Self> {
        let mut catalog = Self::new(fs);
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                debug!("Catalog file {} not found, skipping", path.display());
                continue;
            }
            let content = std::fs::read_to_string(path).map_err(|e| {
                SteelToesError::Catalog(format!(
                    "Failed to read catalog file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            catalog.merge_yaml(&content)?;
            debug!("Loaded catalog entries from {}", path.display());
        }
        Ok(catalog)
    }

    /// Merge the entries of a YAML document into this catalog.
    pub fn merge_yaml(&mut self, content: &str) -> Result<()> {
        let mut doc: Value = serde_yaml::from_str(content)?;
        doc.apply_merge()?;
        let mapping = match doc {
            Value::Null => return Ok(()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(SteelToesError::Catalog(
                    "Catalog must be a mapping of dataset names".to_string(),
                ));
            }
        };

        for (key, value) in mapping {
            let name = key
                .as_str()
                .ok_or_else(|| SteelToesError::Catalog(format!("Invalid dataset name: {:?}", key)))?
                .to_string();

            // Underscore keys hold YAML anchors, not datasets
            if name.starts_with('_') {
                continue;
            }

            let entry: YamlDataset = serde_yaml::from_value(value).map_err(|e| {
                SteelToesError::Catalog(format!("Invalid entry for dataset '{}': {}", name, e))
            })?;

            let dataset_type = entry
                .dataset_type
                .unwrap_or_else(|| DEFAULT_DATASET_TYPE.to_string());
            self.add(Dataset::new(name, dataset_type, entry.filepath));
        }
        Ok(())
    }

    /// Add a dataset, replacing any existing entry with the same name.
    pub fn add(&mut self, dataset: Dataset) {
        match self.index.get(&dataset.name) {
            Some(&idx) => self.datasets[idx] = dataset,
            None => {
                self.index.insert(dataset.name.clone(), self.datasets.len());
                self.datasets.push(dataset);
            }
        }
    }

    /// Register parameter names as non-file-backed entries.
    pub fn add_parameters<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add(Dataset::new(name, "parameters", None));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.index.get(name).map(|&idx| &self.datasets[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }
}

impl<F: FileSystem> Catalog for DataCatalog<F> {
    fn list(&self) -> Vec<String> {
        self.datasets.iter().map(|d| d.name.clone()).collect()
    }

    fn filepath(&self, name: &str) -> Option<PathBuf> {
        self.get(name).and_then(|d| d.filepath.clone())
    }

    fn dataset_type(&self, name: &str) -> Option<String> {
        self.get(name).map(|d| d.dataset_type.clone())
    }

    fn set_filepath(&mut self, name: &str, path: PathBuf) -> Result<()> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| SteelToesError::Catalog(format!("Unknown dataset: {}", name)))?;
        let dataset = &mut self.datasets[idx];
        if dataset.filepath.is_none() {
            return Err(SteelToesError::Catalog(format!("Dataset '{}' is not file-backed", name)));
        }
        dataset.filepath = Some(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        self.fs.exists(path)
    }

    fn delete(&mut self, path: &Path) -> Result<()> {
        self.fs.delete(path, true)
    }
}
