//! Branch injection into dataset file paths.
//!
//! `BranchInjector` owns a side-table of every file-backed dataset it has
//! seen: the path the catalog declared for it and whether that path is
//! currently swapped for a branch-qualified one. Branched paths are always
//! derived from the declared path, so switching branches never stacks
//! suffixes.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::Result;

/// How an injection was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectMode {
    /// Reading: only redirect to a branched file that already exists.
    Load,
    /// Writing: claim the branched location even if nothing is there yet.
    Save,
    /// Unwind an active swap back to the declared path.
    Reset,
}

/// Side-table entry for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapState {
    /// Path declared by the catalog.
    pub original: PathBuf,
    /// Path the catalog currently points at.
    pub current: PathBuf,
    /// `current` is a branch-qualified path written by us.
    pub swapped: bool,
}

impl SwapState {
    fn new(original: PathBuf) -> Self {
        Self {
            current: original.clone(),
            original,
            swapped: false,
        }
    }
}

/// Insert `_{branch}` between the stem and suffix of `path`.
///
/// `data/02_intermediate/iris.csv` becomes `data/02_intermediate/iris_main.csv`.
/// An empty branch leaves the path unchanged.
pub fn branched_path(path: &Path, branch: &str) -> PathBuf {
    if branch.is_empty() {
        return path.to_path_buf();
    }
    let Some(stem) = path.file_stem() else {
        return path.to_path_buf();
    };

    let mut name = OsString::from(stem);
    name.push("_");
    name.push(branch);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Applies branch-qualified paths to catalog datasets and remembers what it did.
#[derive(Debug, Default, Clone)]
pub struct BranchInjector {
    swaps: BTreeMap<String, SwapState>,
    ignore_types: Vec<String>,
}

impl BranchInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never branch datasets of these types.
    pub fn with_ignore_types(mut self, ignore_types: Vec<String>) -> Self {
        self.ignore_types = ignore_types;
        self
    }

    pub fn ignore_types(&self) -> &[String] {
        &self.ignore_types
    }

    /// Inject `branch` into the file path of `dataset`.
    ///
    /// Datasets that are unknown, not file-backed, or of an ignored type are
    /// skipped. An already swapped dataset is left alone unless `mode` is
    /// [`InjectMode::Reset`], which points it back at its declared path and
    /// clears the swap. Otherwise the branched path is committed when it
    /// already exists or when `mode` is [`InjectMode::Save`]. A missing or
    /// empty branch never swaps anything.
    pub fn inject<C: Catalog + ?Sized>(
        &mut self,
        catalog: &mut C,
        dataset: &str,
        branch: Option<&str>,
        mode: InjectMode,
        hook: &str,
    ) -> Result<()> {
        let Some(filepath) = catalog.filepath(dataset) else {
            return Ok(());
        };
        if self.is_ignored(catalog, dataset) {
            debug!("STEEL_TOES:{} skipping ignored dataset '{}'", hook, dataset);
            return Ok(());
        }

        if mode == InjectMode::Reset {
            return self.reset(catalog, dataset, hook);
        }

        let state = self
            .swaps
            .entry(dataset.to_string())
            .or_insert_with(|| SwapState::new(filepath.clone()));
        if state.swapped {
            return Ok(());
        }
        state.original = filepath.clone();
        state.current = filepath;

        let branch = branch.unwrap_or("");
        if branch.is_empty() {
            return Ok(());
        }

        let target = branched_path(&state.original, branch);
        let commit = mode == InjectMode::Save || catalog.exists(&target)?;
        if !commit {
            return Ok(());
        }

        catalog.set_filepath(dataset, target.clone())?;
        info!(
            "STEEL_TOES:{} '{}' -> '{}'",
            hook,
            file_name(&state.current),
            file_name(&target)
        );
        state.current = target;
        state.swapped = true;
        Ok(())
    }

    fn reset<C: Catalog + ?Sized>(
        &mut self,
        catalog: &mut C,
        dataset: &str,
        hook: &str,
    ) -> Result<()> {
        let Some(state) = self.swaps.get_mut(dataset) else {
            return Ok(());
        };
        if !state.swapped {
            return Ok(());
        }

        catalog.set_filepath(dataset, state.original.clone())?;
        debug!(
            "STEEL_TOES:{} reset '{}' -> '{}'",
            hook,
            file_name(&state.current),
            file_name(&state.original)
        );
        state.current = state.original.clone();
        state.swapped = false;
        Ok(())
    }

    fn is_ignored<C: Catalog + ?Sized>(&self, catalog: &C, dataset: &str) -> bool {
        if self.ignore_types.is_empty() {
            return false;
        }
        catalog
            .dataset_type(dataset)
            .is_some_and(|t| self.ignore_types.iter().any(|ignored| *ignored == t))
    }

    /// Whether `dataset` currently points at a branched path.
    pub fn is_swapped(&self, dataset: &str) -> bool {
        self.swaps.get(dataset).is_some_and(|s| s.swapped)
    }

    pub fn state(&self, dataset: &str) -> Option<&SwapState> {
        self.swaps.get(dataset)
    }

    /// Drop entries that no longer describe `catalog`.
    ///
    /// A swap survives only while the catalog still points at the branched
    /// path it recorded; everything else is re-recorded on the next injection.
    pub fn forget_stale<C: Catalog + ?Sized>(&mut self, catalog: &C) {
        self.swaps.retain(|dataset, state| {
            state.swapped && catalog.filepath(dataset).as_ref() == Some(&state.current)
        });
    }
}
