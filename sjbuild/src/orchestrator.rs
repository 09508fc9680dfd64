use sjbuild_shared::log::{error, info};

use crate::{
    builder::{standard_specs, AssetBuilder, BuildOutcome, BuilderSpec},
    compiler::CompilerInvoker,
    config::BuildConfig,
    AssetRoot,
};

/// Aggregated result of an orchestrator run.
#[derive(Debug)]
pub struct OverallResult {
    /// Whether every pass of every builder completed.
    pub all_succeeded: bool,
    /// One entry per builder spec, in the order in which the passes ran.
    pub outcomes: Vec<(BuilderSpec, BuildOutcome)>,
}

/// Runs the build passes of an ordered set of [`BuilderSpec`]s over the asset
/// roots. The passes are independent of each other: a failed texture pass
/// does not prevent the model pass from running.
pub struct BuildOrchestrator {
    specs: Vec<BuilderSpec>,
    roots: Vec<AssetRoot>,
    invoker: CompilerInvoker,
}

impl BuildOrchestrator {
    pub fn new(specs: Vec<BuilderSpec>, roots: Vec<AssetRoot>) -> Self {
        Self {
            specs,
            roots,
            invoker: CompilerInvoker::new(),
        }
    }

    /// Wires the standard asset kinds to the engine and game roots of `config`.
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(standard_specs(&config.builders_bin_dir), config.asset_roots())
    }

    /// Applies `invoker` to every pass, e.g. to limit the compiler runtime.
    pub fn with_invoker(mut self, invoker: CompilerInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn specs(&self) -> &[BuilderSpec] {
        &self.specs
    }

    pub fn roots(&self) -> &[AssetRoot] {
        &self.roots
    }

    /// Runs all passes and reports the overall result.
    pub fn run(&self) -> OverallResult {
        let mut outcomes = Vec::new();
        for spec in &self.specs {
            info!("Running the {} pass", spec.name);
            let builder = AssetBuilder::new(spec.clone()).with_invoker(self.invoker.clone());
            let outcome = builder.build_all(&self.roots);
            if outcome.completed {
                info!("{}: {} item(s) built", spec.name, outcome.items_processed);
            } else {
                error!("{}: pass aborted after {} item(s)", spec.name, outcome.items_processed);
            }
            outcomes.push((spec.clone(), outcome));
        }

        let all_succeeded = outcomes.iter().all(|(_, outcome)| outcome.completed);
        if all_succeeded {
            info!("Asset build complete");
        } else {
            error!("Asset build failed");
        }
        OverallResult { all_succeeded, outcomes }
    }
}
