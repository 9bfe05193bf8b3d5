//! Explicit registry of analysis modules.

use std::sync::Arc;

use chainlens_market_data::AnalyticsEngine;
use log::{debug, info};

use super::model::{AnalysisResult, ModuleCategory};
use super::modules::{FuturesBasisModule, GreeksModule, OptionChainModule};
use super::traits::{AnalysisContext, AnalysisModule};
use crate::errors::{Error, Result};

/// Ordered set of analysis modules, looked up by id or display name.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn AnalysisModule>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The derivatives modules over one engine: option chain, Greeks and
    /// futures basis.
    pub fn derivatives(engine: Arc<AnalyticsEngine>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OptionChainModule::new(Arc::clone(&engine))));
        registry.register(Arc::new(GreeksModule::new(Arc::clone(&engine))));
        registry.register(Arc::new(FuturesBasisModule::new(engine)));
        registry
    }

    /// Adds a module, replacing any module with the same id.
    pub fn register(&mut self, module: Arc<dyn AnalysisModule>) {
        match self.modules.iter().position(|m| m.id() == module.id()) {
            Some(idx) => self.modules[idx] = module,
            None => self.modules.push(module),
        }
    }

    /// Finds a module by id or display name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn AnalysisModule>> {
        let name = name.trim();
        self.modules
            .iter()
            .find(|m| m.id().eq_ignore_ascii_case(name) || m.name().eq_ignore_ascii_case(name))
    }

    /// All modules in registration order.
    pub fn all(&self) -> &[Arc<dyn AnalysisModule>] {
        &self.modules
    }

    pub fn by_category(&self, category: ModuleCategory) -> Vec<&Arc<dyn AnalysisModule>> {
        self.modules
            .iter()
            .filter(|m| m.category() == category)
            .collect()
    }

    /// Categories in the order their first module was registered.
    pub fn categories(&self) -> Vec<ModuleCategory> {
        let mut categories = Vec::new();
        for module in &self.modules {
            if !categories.contains(&module.category()) {
                categories.push(module.category());
            }
        }
        categories
    }

    /// Ids of the modules that run when none are requested.
    pub fn enabled_defaults(&self) -> Vec<&'static str> {
        self.modules
            .iter()
            .filter(|m| m.enabled_by_default())
            .map(|m| m.id())
            .collect()
    }

    /// Runs one module.
    pub async fn run(&self, name: &str, ctx: &AnalysisContext) -> Result<AnalysisResult> {
        let module = self
            .get(name)
            .ok_or_else(|| Error::UnknownModule(name.trim().to_string()))?;
        debug!("Running analysis module {} for {}", module.id(), ctx.symbol);
        Ok(module.analyze(ctx).await)
    }

    /// Runs the named modules in order, or the default-enabled ones when
    /// `names` is empty.
    ///
    /// Every name is checked before any module runs.
    pub async fn run_many(
        &self,
        names: &[String],
        ctx: &AnalysisContext,
    ) -> Result<Vec<AnalysisResult>> {
        let selected: Vec<&Arc<dyn AnalysisModule>> = if names.is_empty() {
            self.modules.iter().filter(|m| m.enabled_by_default()).collect()
        } else {
            names
                .iter()
                .map(|name| {
                    self.get(name)
                        .ok_or_else(|| Error::UnknownModule(name.trim().to_string()))
                })
                .collect::<Result<_>>()?
        };

        info!(
            "Running {} analysis module(s) for {}",
            selected.len(),
            ctx.symbol
        );

        let mut results = Vec::with_capacity(selected.len());
        for module in selected {
            debug!("Running analysis module {} for {}", module.id(), ctx.symbol);
            results.push(module.analyze(ctx).await);
        }
        Ok(results)
    }
}
