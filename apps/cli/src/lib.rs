//! Bootstrap for the `chainlens` binary: environment config, tracing, and
//! wiring of the provider, mapping store and analysis modules.

pub mod cli;
pub mod config;
pub mod main_lib;

pub use main_lib::{
    build_context, build_engine, describe_modules, init_tracing, listing_registry, render, run,
};
