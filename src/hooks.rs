//! Lifecycle hooks.
//!
//! A host registers named callbacks against [`LifecycleEvent`]s and fires
//! them from its own run loop. [`SteelToes`] supplies the three callbacks
//! that keep dataset paths on the active branch.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use log::{debug, info};

use crate::branch::resolve_branch;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::inject::{BranchInjector, InjectMode};
use crate::pipeline::{Node, Pipeline};
use crate::report;

/// Points in a pipeline run where hooks fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A catalog has just been built for the run.
    AfterCatalogCreated,
    /// The pipeline is about to start; payload is every dataset it reads.
    BeforePipelineRun,
    /// A node finished computing; payload is the datasets it is about to save.
    AfterNodeRun,
}

impl LifecycleEvent {
    /// Label used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::AfterCatalogCreated => "after_catalog_created",
            LifecycleEvent::BeforePipelineRun => "before_pipeline_run",
            LifecycleEvent::AfterNodeRun => "after_node_run",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked with the hook state, the host catalog and the event's datasets.
pub type HookFn<H> = Box<dyn Fn(&mut H, &mut dyn Catalog, &[String]) -> Result<()>>;

struct Registration<H> {
    name: String,
    callback: HookFn<H>,
}

/// Named callbacks per lifecycle event, run in registration order.
pub struct HookRegistry<H> {
    hooks: HashMap<LifecycleEvent, Vec<Registration<H>>>,
}

impl<H> Default for HookRegistry<H> {
    fn default() -> Self {
        Self { hooks: HashMap::new() }
    }
}

impl<H> HookRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name` for `event`.
    pub fn register(
        &mut self,
        event: LifecycleEvent,
        name: impl Into<String>,
        callback: impl Fn(&mut H, &mut dyn Catalog, &[String]) -> Result<()> + 'static,
    ) {
        self.hooks.entry(event).or_default().push(Registration {
            name: name.into(),
            callback: Box::new(callback),
        });
    }

    /// Names registered for `event`, in dispatch order.
    pub fn names(&self, event: LifecycleEvent) -> Vec<&str> {
        self.hooks
            .get(&event)
            .map(|regs| regs.iter().map(|r| r.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Fire every callback registered for `event`, stopping at the first error.
    pub fn dispatch(
        &self,
        event: LifecycleEvent,
        state: &mut H,
        catalog: &mut dyn Catalog,
        datasets: &[String],
    ) -> Result<()> {
        let Some(regs) = self.hooks.get(&event) else {
            return Ok(());
        };
        for reg in regs {
            debug!("Dispatching {} hook '{}'", event, reg.name);
            (reg.callback)(state, catalog, datasets)?;
        }
        Ok(())
    }

    /// Fire [`LifecycleEvent::BeforePipelineRun`] with every dataset `pipeline` reads.
    pub fn fire_before_pipeline_run(
        &self,
        state: &mut H,
        catalog: &mut dyn Catalog,
        pipeline: &Pipeline,
    ) -> Result<()> {
        let inputs: Vec<String> = pipeline.all_inputs().into_iter().collect();
        self.dispatch(LifecycleEvent::BeforePipelineRun, state, catalog, &inputs)
    }

    /// Fire [`LifecycleEvent::AfterNodeRun`] with the outputs of `node`.
    pub fn fire_after_node_run(
        &self,
        state: &mut H,
        catalog: &mut dyn Catalog,
        node: &Node,
    ) -> Result<()> {
        self.dispatch(LifecycleEvent::AfterNodeRun, state, catalog, &node.outputs)
    }
}

/// Keeps dataset paths on the active branch across a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct SteelToes {
    branch: String,
    announce: bool,
    injector: BranchInjector,
}

impl SteelToes {
    /// Create a hook for `branch`; `None` means no branch and no swapping.
    pub fn new(branch: Option<String>) -> Self {
        Self {
            branch: branch.unwrap_or_default(),
            announce: false,
            injector: BranchInjector::new(),
        }
    }

    /// Create a hook for the branch resolved in `project_dir`.
    pub fn for_project(project_dir: &Path) -> Self {
        Self::new(resolve_branch(Some(project_dir)))
    }

    /// Print the protected datasets once the catalog is created.
    pub fn with_announce(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    /// Never branch datasets of these types.
    pub fn with_ignore_types(mut self, ignore_types: Vec<String>) -> Self {
        self.injector = self.injector.with_ignore_types(ignore_types);
        self
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn injector(&self) -> &BranchInjector {
        &self.injector
    }

    pub fn injector_mut(&mut self) -> &mut BranchInjector {
        &mut self.injector
    }

    /// Register the three lifecycle callbacks.
    pub fn register(registry: &mut HookRegistry<SteelToes>) {
        registry.register(LifecycleEvent::AfterCatalogCreated, "steel_toes", |hook, catalog, _| {
            hook.after_catalog_created(catalog)
        });
        registry.register(LifecycleEvent::BeforePipelineRun, "steel_toes", |hook, catalog, inputs| {
            hook.before_pipeline_run(catalog, inputs)
        });
        registry.register(LifecycleEvent::AfterNodeRun, "steel_toes", |hook, catalog, outputs| {
            hook.after_node_run(catalog, outputs)
        });
    }

    /// Swap in every dataset whose branched file already exists.
    pub fn after_catalog_created(&mut self, catalog: &mut dyn Catalog) -> Result<()> {
        info!("STEEL_TOES: on branch '{}'", self.branch);
        self.injector.forget_stale(&*catalog);
        for dataset in catalog.list() {
            self.inject(catalog, &dataset, InjectMode::Load, LifecycleEvent::AfterCatalogCreated)?;
        }
        if self.announce {
            report::announce(&*catalog, &self.injector);
        }
        Ok(())
    }

    /// Swap in branched inputs that already exist before anything is read.
    pub fn before_pipeline_run(
        &mut self,
        catalog: &mut dyn Catalog,
        inputs: &[String],
    ) -> Result<()> {
        for dataset in inputs {
            self.inject(catalog, dataset, InjectMode::Load, LifecycleEvent::BeforePipelineRun)?;
        }
        Ok(())
    }

    /// Claim branched locations for outputs so first writes on a branch land there.
    pub fn after_node_run(&mut self, catalog: &mut dyn Catalog, outputs: &[String]) -> Result<()> {
        for dataset in outputs {
            self.inject(catalog, dataset, InjectMode::Save, LifecycleEvent::AfterNodeRun)?;
        }
        Ok(())
    }

    fn inject(
        &mut self,
        catalog: &mut dyn Catalog,
        dataset: &str,
        mode: InjectMode,
        event: LifecycleEvent,
    ) -> Result<()> {
        let branch = self.branch.as_str();
        self.injector
            .inject(catalog, dataset, Some(branch), mode, event.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DataCatalog, Dataset};
    use crate::fs::MemoryFileSystem;
    use std::path::PathBuf;

    fn catalog(existing: &[&str]) -> DataCatalog<MemoryFileSystem> {
        let mut catalog = DataCatalog::new(MemoryFileSystem::with_paths(existing.iter().copied()));
        catalog.add(Dataset::file("raw", "pandas.CSVDataSet", "data/raw.csv"));
        catalog.add(Dataset::file("clean", "pandas.CSVDataSet", "data/clean.csv"));
        catalog.add(Dataset::memory("scratch"));
        catalog
    }

    fn registry() -> HookRegistry<SteelToes> {
        let mut registry = HookRegistry::new();
        SteelToes::register(&mut registry);
        registry
    }

    #[test]
    fn test_event_labels() {
        assert_eq!(LifecycleEvent::AfterCatalogCreated.to_string(), "after_catalog_created");
        assert_eq!(LifecycleEvent::BeforePipelineRun.as_str(), "before_pipeline_run");
        assert_eq!(LifecycleEvent::AfterNodeRun.as_str(), "after_node_run");
    }

    #[test]
    fn test_register_all_events() {
        let registry = registry();
        assert_eq!(registry.names(LifecycleEvent::AfterCatalogCreated), vec!["steel_toes"]);
        assert_eq!(registry.names(LifecycleEvent::BeforePipelineRun), vec!["steel_toes"]);
        assert_eq!(registry.names(LifecycleEvent::AfterNodeRun), vec!["steel_toes"]);
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let mut registry: HookRegistry<Vec<String>> = HookRegistry::new();
        registry.register(LifecycleEvent::AfterNodeRun, "first", |seen, _, outputs| {
            seen.push(format!("first:{}", outputs.join(",")));
            Ok(())
        });
        registry.register(LifecycleEvent::AfterNodeRun, "second", |seen, _, _| {
            seen.push("second".to_string());
            Ok(())
        });

        let mut seen = Vec::new();
        let mut catalog = catalog(&[]);
        registry
            .dispatch(LifecycleEvent::AfterNodeRun, &mut seen, &mut catalog, &["clean".to_string()])
            .unwrap();
        registry
            .dispatch(LifecycleEvent::BeforePipelineRun, &mut seen, &mut catalog, &[])
            .unwrap();

        assert_eq!(seen, vec!["first:clean", "second"]);
    }

    #[test]
    fn test_after_catalog_created_swaps_existing() {
        let mut catalog = catalog(&["data/raw.csv", "data/raw_bob.csv"]);
        let mut hook = SteelToes::new(Some("bob".to_string()));

        registry()
            .dispatch(LifecycleEvent::AfterCatalogCreated, &mut hook, &mut catalog, &[])
            .unwrap();

        assert_eq!(catalog.filepath("raw"), Some(PathBuf::from("data/raw_bob.csv")));
        assert_eq!(catalog.filepath("clean"), Some(PathBuf::from("data/clean.csv")));
        assert!(hook.injector().is_swapped("raw"));
        assert!(!hook.injector().is_swapped("clean"));
    }

    #[test]
    fn test_after_catalog_created_twice_keeps_swaps() {
        let mut catalog = catalog(&["data/raw.csv", "data/raw_bob.csv"]);
        let mut hook = SteelToes::new(Some("bob".to_string()));
        let registry = registry();

        for _ in 0..2 {
            registry
                .dispatch(LifecycleEvent::AfterCatalogCreated, &mut hook, &mut catalog, &[])
                .unwrap();
        }
        registry
            .dispatch(LifecycleEvent::AfterNodeRun, &mut hook, &mut catalog, &["raw".to_string()])
            .unwrap();

        assert_eq!(catalog.filepath("raw"), Some(PathBuf::from("data/raw_bob.csv")));
        assert_eq!(report::whos_protected(&catalog, hook.injector()), vec!["raw"]);
        assert_eq!(hook.injector().state("raw").unwrap().original, PathBuf::from("data/raw.csv"));
    }

    #[test]
    fn test_before_pipeline_run_only_loads() {
        let mut catalog = catalog(&["data/raw.csv"]);
        let mut hook = SteelToes::new(Some("bob".to_string()));

        hook.before_pipeline_run(&mut catalog, &["raw".to_string()]).unwrap();

        assert_eq!(catalog.filepath("raw"), Some(PathBuf::from("data/raw.csv")));
    }

    #[test]
    fn test_after_node_run_claims_outputs() {
        let mut catalog = catalog(&[]);
        let mut hook = SteelToes::new(Some("bob".to_string()));
        let outputs = vec!["clean".to_string(), "scratch".to_string()];

        registry()
            .dispatch(LifecycleEvent::AfterNodeRun, &mut hook, &mut catalog, &outputs)
            .unwrap();
        registry()
            .dispatch(LifecycleEvent::AfterNodeRun, &mut hook, &mut catalog, &outputs)
            .unwrap();

        assert_eq!(catalog.filepath("clean"), Some(PathBuf::from("data/clean_bob.csv")));
        assert!(!hook.injector().is_swapped("scratch"));
    }

    #[test]
    fn test_fire_with_pipeline() {
        let mut catalog = catalog(&["data/raw.csv", "data/raw_bob.csv"]);
        let mut hook = SteelToes::new(Some("bob".to_string()));
        let pipeline = Pipeline::new(vec![
            Node::new("clean", ["raw"], ["clean"]),
            Node::new("train", ["clean"], ["scratch"]),
        ]);
        let registry = registry();

        registry
            .fire_before_pipeline_run(&mut hook, &mut catalog, &pipeline)
            .unwrap();
        assert_eq!(catalog.filepath("raw"), Some(PathBuf::from("data/raw_bob.csv")));
        assert_eq!(catalog.filepath("clean"), Some(PathBuf::from("data/clean.csv")));

        registry
            .fire_after_node_run(&mut hook, &mut catalog, &pipeline.nodes[0])
            .unwrap();
        assert_eq!(catalog.filepath("clean"), Some(PathBuf::from("data/clean_bob.csv")));
    }

    #[test]
    fn test_no_branch_never_swaps() {
        let mut catalog = catalog(&["data/raw.csv"]);
        let mut hook = SteelToes::new(None);
        assert_eq!(hook.branch(), "");

        hook.after_catalog_created(&mut catalog).unwrap();
        hook.after_node_run(&mut catalog, &["clean".to_string()]).unwrap();

        assert_eq!(catalog.filepath("clean"), Some(PathBuf::from("data/clean.csv")));
        assert!(!hook.injector().is_swapped("clean"));
    }
}
