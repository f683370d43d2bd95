//! Reporting on which datasets are protected by a branch swap.

use colored::*;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::inject::{BranchInjector, SwapState};

/// A protected dataset together with its side-table entry.
#[derive(Debug, Serialize)]
pub struct ProtectedDataset<'a> {
    pub name: &'a str,
    #[serde(flatten)]
    pub state: &'a SwapState,
}

/// Datasets currently pointed at a branched path, in catalog order.
///
/// Only datasets that are swapped right now are listed, not ones that could
/// be swapped later in the run.
pub fn whos_protected<C: Catalog + ?Sized>(catalog: &C, injector: &BranchInjector) -> Vec<String> {
    let mut protected: Vec<String> = Vec::new();
    for dataset in catalog.list() {
        if injector.is_swapped(&dataset) && !protected.contains(&dataset) {
            protected.push(dataset);
        }
    }
    protected
}

/// Render the protection summary printed by [`announce`].
pub fn protection_summary<C: Catalog + ?Sized>(
    catalog: &C,
    injector: &BranchInjector,
) -> Vec<String> {
    let protected = whos_protected(catalog, injector);
    let prefix = "STEEL-TOES |".bright_black();

    if protected.is_empty() {
        return vec![format!("{} {}", prefix, "NO DATASETS PROTECTED".red())];
    }

    let mut lines = vec![format!(
        "{} {} {}",
        prefix,
        protected.len().to_string().yellow(),
        "DATASETS PROTECTED".green()
    )];
    for dataset in &protected {
        if let Some(path) = catalog.filepath(dataset) {
            lines.push(format!(
                "{} {}",
                format!("{}:", dataset).bright_black(),
                path.display().to_string().bright_magenta()
            ));
        }
    }
    lines
}

/// Print which datasets are protected and where they point.
pub fn announce<C: Catalog + ?Sized>(catalog: &C, injector: &BranchInjector) {
    for line in protection_summary(catalog, injector) {
        println!("{}", line);
    }
}

/// Protected datasets as pretty-printed JSON, in catalog order.
pub fn protected_json<C: Catalog + ?Sized>(
    catalog: &C,
    injector: &BranchInjector,
) -> Result<String> {
    let protected = whos_protected(catalog, injector);
    let entries: Vec<ProtectedDataset> = protected
        .iter()
        .filter_map(|name| {
            let state = injector.state(name)?;
            Some(ProtectedDataset {
                name: name.as_str(),
                state,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}
