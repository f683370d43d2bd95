//! Host project bootstrap.
//!
//! Builds the catalog of a project directory the way a pipeline session
//! would and fires the catalog-created hooks on it.

use std::path::{Path, PathBuf};

use log::info;

use crate::catalog::{Catalog, DataCatalog};
use crate::config::Config;
use crate::error::{Result, SteelToesError};
use crate::fs::{FileSystem, LocalFileSystem};
use crate::hooks::{HookRegistry, LifecycleEvent, SteelToes};

/// A loaded project: its catalog plus the hook state attached to it.
#[derive(Debug)]
pub struct ProjectContext<F: FileSystem = LocalFileSystem> {
    pub project_path: PathBuf,
    pub catalog: DataCatalog<F>,
    pub steel_toes: SteelToes,
}

impl ProjectContext<LocalFileSystem> {
    /// Load the project at `project_dir` from its catalog files.
    pub fn bootstrap(project_dir: &Path, config: &Config) -> Result<Self> {
        let project_path = project_dir.canonicalize().map_err(|e| {
            SteelToesError::Context(format!(
                "Project directory {} is not usable: {}",
                project_dir.display(),
                e
            ))
        })?;

        let catalog_paths = config.catalog_paths(&project_path);
        if !catalog_paths.iter().any(|p| p.exists()) {
            return Err(SteelToesError::Context(format!(
                "No catalog found in {}",
                project_path.display()
            )));
        }

        let fs = LocalFileSystem::new(&project_path);
        let catalog = DataCatalog::from_files(&catalog_paths, fs)?;
        info!("Loaded {} datasets from {}", catalog.len(), project_path.display());

        Self::from_catalog(project_path, catalog, config)
    }
}

impl<F: FileSystem> ProjectContext<F> {
    /// Attach steel-toes to an existing catalog and fire the catalog-created hooks.
    ///
    /// The branch is taken from the config, then `STEEL_TOES_BRANCH`, then git.
    pub fn from_catalog(
        project_path: PathBuf,
        catalog: DataCatalog<F>,
        config: &Config,
    ) -> Result<Self> {
        let steel_toes = match &config.branch {
            Some(branch) => SteelToes::new(Some(branch.clone())),
            None => SteelToes::for_project(&project_path),
        };
        let steel_toes = steel_toes
            .with_announce(config.announce)
            .with_ignore_types(config.ignore_types.clone());

        let mut context = Self {
            project_path,
            catalog,
            steel_toes,
        };

        let mut registry = HookRegistry::new();
        SteelToes::register(&mut registry);
        registry.dispatch(
            LifecycleEvent::AfterCatalogCreated,
            &mut context.steel_toes,
            &mut context.catalog,
            &[],
        )?;
        Ok(context)
    }

    /// Names of the file-backed datasets in the catalog.
    pub fn file_datasets(&self) -> Vec<String> {
        self.catalog
            .list()
            .into_iter()
            .filter(|d| self.catalog.filepath(d).is_some())
            .collect()
    }
}
