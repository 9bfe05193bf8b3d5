use std::process::ExitCode;

use clap::Parser;

use chainlens_cli::cli::Cli;
use chainlens_cli::config::Config;
use chainlens_cli::{describe_modules, init_tracing, listing_registry, render, run};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing();

    if cli.list_modules {
        let registry = listing_registry(&config);
        println!("{}", render(&describe_modules(&registry), cli.pretty)?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(symbol) = cli.symbol.as_deref() else {
        anyhow::bail!("a symbol is required");
    };

    let results = run(&cli, &config, symbol).await?;
    println!("{}", render(&serde_json::to_value(&results)?, cli.pretty)?);

    if results.iter().all(|r| r.success) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
