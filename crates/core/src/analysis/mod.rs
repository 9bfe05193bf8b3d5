//! Analysis modules.
//!
//! Self-contained analyses over the derivatives engine, each reporting
//! through one uniform result.
//!
//! # Architecture
//!
//! ```text
//! ModuleRegistry → [explicit module list] → AnalysisModule::analyze
//!                                                   ↓
//!                                           AnalyticsEngine
//!                                                   ↓
//!                                           AnalysisResult
//! ```
//!
//! - **Models** (`model.rs`) - Categories, price history, AnalysisResult
//! - **Traits** (`traits.rs`) - AnalysisModule and AnalysisContext
//! - **Modules** (`modules/`) - Option chain, Greeks, futures basis
//! - **Registry** (`registry.rs`) - Lookup, default selection, runs
//!
//! Required configuration keys are checked before the engine is called.
//! Every failure surfaces as `success = false` with the error message.

pub mod model;
pub mod modules;
pub mod registry;
pub mod traits;

// Re-export commonly used types
pub use model::{AnalysisResult, DateRange, ModuleCategory, PriceBar};
pub use modules::{FuturesBasisModule, GreeksModule, OptionChainModule};
pub use registry::ModuleRegistry;
pub use traits::{AnalysisContext, AnalysisModule};
