//! Chainlens Core - analysis modules over the derivatives engine.
//!
//! Each analysis is a self-contained [`AnalysisModule`] that reports through
//! the uniform [`AnalysisResult`]. Modules are registered explicitly in a
//! [`ModuleRegistry`]; nothing registers itself at load time.

pub mod analysis;
pub mod errors;

pub use analysis::{
    AnalysisContext, AnalysisModule, AnalysisResult, DateRange, FuturesBasisModule, GreeksModule,
    ModuleCategory, ModuleRegistry, OptionChainModule, PriceBar,
};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
