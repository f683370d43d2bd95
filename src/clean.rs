//! Removal of branch-qualified dataset files.
//!
//! Only datasets the injector has swapped onto a branched path are ever
//! deleted; declared paths are never touched.

use std::path::{Path, PathBuf};

use log::info;

use crate::branch::current_git_branch;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::inject::{BranchInjector, InjectMode};

const SWITCH_HOOK: &str = "switch_branch";
const DRYRUN_HINT: &str = "Run 'steel-toes clean-branch' without --dryrun to remove them.";

/// Arguments of a cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    /// Project directory.
    pub directory: PathBuf,
    /// Branch to clean; the active branch when `None`.
    pub branch: Option<String>,
    /// Report what would be removed without deleting anything.
    pub dryrun: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            branch: None,
            dryrun: false,
        }
    }
}

/// A dataset removed (or, on a dry run, due for removal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedDataset {
    pub name: String,
    pub path: PathBuf,
}

/// Outcome of a cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<RemovedDataset>,
    pub dryrun: bool,
}

impl CleanReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Move every dataset off its current swap and onto `branch`.
///
/// Datasets end up swapped only where a file for `branch` already exists.
/// Nothing happens when the git branch of `directory` cannot be determined.
pub fn switch_branch<C: Catalog + ?Sized>(
    directory: &Path,
    catalog: &mut C,
    injector: &mut BranchInjector,
    branch: &str,
) -> Result<()> {
    let Some(current) = current_git_branch(Some(directory)) else {
        return Ok(());
    };
    info!("STEEL_TOES:{} '{}' -> '{}'", SWITCH_HOOK, current, branch);

    let datasets = unique(catalog.list());
    for dataset in &datasets {
        injector.inject(catalog, dataset, Some(current.as_str()), InjectMode::Reset, SWITCH_HOOK)?;
    }
    for dataset in &datasets {
        injector.inject(catalog, dataset, Some(branch), InjectMode::Load, SWITCH_HOOK)?;
    }
    Ok(())
}

/// Bootstrap the project in `options.directory` and clean it.
pub fn clean_branch(options: &CleanOptions, config: &Config) -> Result<CleanReport> {
    let mut context = ProjectContext::bootstrap(&options.directory, config)?;
    clean_context(&mut context, options)
}

/// Delete the branched files of an already loaded project.
pub fn clean_context<F: FileSystem>(
    context: &mut ProjectContext<F>,
    options: &CleanOptions,
) -> Result<CleanReport> {
    if let Some(branch) = &options.branch {
        switch_branch(
            &options.directory,
            &mut context.catalog,
            context.steel_toes.injector_mut(),
            branch,
        )?;
    }

    let datasets = unique(context.file_datasets());
    let mut report = CleanReport {
        removed: Vec::new(),
        dryrun: options.dryrun,
    };

    if datasets.is_empty() {
        info!("STEEL_TOES: No Datasets to remove.");
        return Ok(report);
    }

    for dataset in datasets {
        if !context.steel_toes.injector().is_swapped(&dataset) {
            continue;
        }
        let Some(path) = context.catalog.filepath(&dataset) else {
            continue;
        };

        if options.dryrun {
            info!("STEEL_TOES:dryrun-remove | '{}'", path.display());
        } else {
            info!("STEEL_TOES:deleting | '{}'", path.display());
            context.catalog.delete(&path)?;
        }
        report.removed.push(RemovedDataset { name: dataset, path });
    }

    if options.dryrun {
        info!("STEEL_TOES:dryrun-remove | logged all files to remove. {}", DRYRUN_HINT);
    }
    Ok(report)
}

fn unique(names: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(names.len());
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DataCatalog, Dataset};
    use crate::fs::MemoryFileSystem;
    use crate::hooks::SteelToes;

    fn context(branch: &str, existing: &[&str]) -> ProjectContext<MemoryFileSystem> {
        let mut catalog = DataCatalog::new(MemoryFileSystem::with_paths(existing.iter().copied()));
        catalog.add(Dataset::file("sales", "pandas.CSVDataSet", "data/sales.csv"));
        catalog.add(Dataset::file("regions", "pandas.CSVDataSet", "data/regions.csv"));
        catalog.add(Dataset::memory("scratch"));
        let config = Config {
            branch: Some(branch.to_string()),
            ..Config::default()
        };
        ProjectContext::from_catalog(PathBuf::from("."), catalog, &config).unwrap()
    }

    fn options(dryrun: bool) -> CleanOptions {
        CleanOptions {
            dryrun,
            ..CleanOptions::default()
        }
    }

    #[test]
    fn test_clean_deletes_only_swapped() {
        let mut ctx = context("bob", &["data/sales.csv", "data/sales_bob.csv", "data/regions.csv"]);

        let report = clean_context(&mut ctx, &options(false)).unwrap();

        assert_eq!(
            report.removed,
            vec![RemovedDataset {
                name: "sales".to_string(),
                path: PathBuf::from("data/sales_bob.csv"),
            }]
        );
        assert_eq!(ctx.catalog.fs().deletes(), vec![PathBuf::from("data/sales_bob.csv")]);
        assert_eq!(
            ctx.catalog.fs().paths(),
            vec![PathBuf::from("data/regions.csv"), PathBuf::from("data/sales.csv")]
        );
    }

    #[test]
    fn test_dryrun_deletes_nothing() {
        let mut ctx = context("bob", &["data/sales_bob.csv", "data/regions_bob.csv"]);

        let report = clean_context(&mut ctx, &options(true)).unwrap();

        assert!(report.dryrun);
        assert_eq!(report.removed.len(), 2);
        assert!(ctx.catalog.fs().deletes().is_empty());
        assert_eq!(ctx.catalog.fs().paths().len(), 2);
    }

    #[test]
    fn test_nothing_swapped_nothing_deleted() {
        let mut ctx = context("bob", &["data/sales.csv", "data/regions.csv"]);

        let report = clean_context(&mut ctx, &options(false)).unwrap();

        assert!(report.is_empty());
        assert!(ctx.catalog.fs().deletes().is_empty());
    }

    #[test]
    fn test_no_file_datasets() {
        let mut catalog = DataCatalog::new(MemoryFileSystem::new());
        catalog.add(Dataset::memory("scratch"));
        let mut ctx = ProjectContext {
            project_path: PathBuf::from("."),
            catalog,
            steel_toes: SteelToes::new(Some("bob".to_string())),
        };

        let report = clean_context(&mut ctx, &options(false)).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_switch_branch_outside_git_is_noop() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut ctx = context("bob", &["data/sales_bob.csv", "data/sales_alice.csv"]);

        let injector = ctx.steel_toes.injector_mut();
        switch_branch(temp.path(), &mut ctx.catalog, injector, "alice").unwrap();

        assert_eq!(ctx.catalog.filepath("sales"), Some(PathBuf::from("data/sales_bob.csv")));
    }

    #[test]
    fn test_unique_keeps_order() {
        let names = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(unique(names), vec!["b", "a"]);
    }
}
