//! steel-toes - protection against stepping on teammates' toes
//!
//! Datasets in a pipeline catalog are redirected to branch-qualified copies
//! (`data/sales.csv` -> `data/sales_feature-a.csv`) so work on a feature
//! branch never overwrites the shared team data. Branched copies are removed
//! again with `clean-branch`.

pub mod branch;
pub mod catalog;
pub mod clean;
pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod hooks;
pub mod inject;
pub mod pipeline;
pub mod report;

pub use branch::{BRANCH_ENV_VAR, resolve_branch};
pub use catalog::{Catalog, DataCatalog, Dataset};
pub use clean::{CleanOptions, CleanReport, clean_branch, clean_context, switch_branch};
pub use config::Config;
pub use context::ProjectContext;
pub use error::{Result, SteelToesError};
pub use hooks::{HookRegistry, LifecycleEvent, SteelToes};
pub use inject::{BranchInjector, InjectMode, branched_path};
pub use report::{ProtectedDataset, announce, protected_json, whos_protected};
