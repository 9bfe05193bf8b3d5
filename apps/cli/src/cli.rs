use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "chainlens",
    version,
    about = "Resolve a symbol to its broker key and analyze its derivatives"
)]
pub struct Cli {
    /// Canonical symbol, e.g. ^NSEI or ITC.NS
    #[arg(required_unless_present = "list_modules")]
    pub symbol: Option<String>,

    /// Run the option chain analysis
    #[arg(long)]
    pub chain: bool,

    /// Run the futures basis analysis
    #[arg(long)]
    pub basis: bool,

    /// Futures symbol to measure the basis against (implies --basis)
    #[arg(long, value_name = "SYMBOL")]
    pub futures: Option<String>,

    /// Option chain expiry
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub expiry: Option<NaiveDate>,

    /// Analysis module to run, by id or name (repeatable)
    #[arg(long = "module", value_name = "NAME")]
    pub modules: Vec<String>,

    /// List the available analysis modules and exit
    #[arg(long)]
    pub list_modules: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    /// Modules requested by flags and `--module`, in order, without repeats.
    /// Empty means the default-enabled modules.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name.to_string());
            }
        };
        if self.chain {
            push("options");
        }
        if self.basis || self.futures.is_some() {
            push("basis");
        }
        for name in &self.modules {
            push(name.trim());
        }
        names
    }
}
