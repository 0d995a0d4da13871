use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "honeypot")]
#[command(about = "Inspect, edit and lock live rhai game state")]
pub(crate) struct Cli {
    /// Append logs to this file instead of stderr.
    #[arg(long = "log-file", global = true)]
    pub(crate) log_file: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Inspect(InspectArgs),
    Watch(SessionArgs),
    Tui(SessionArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct SessionArgs {
    /// JSON file holding the initial game state.
    #[arg(long = "state")]
    pub(crate) state: String,
    /// rhai variable the state is bound to.
    #[arg(long = "var", default_value = "variables")]
    pub(crate) var: String,
    /// Candidate root expression; repeat to probe several.
    #[arg(long = "root")]
    pub(crate) roots: Vec<String>,
    /// rhai script run once per game tick.
    #[arg(long = "script")]
    pub(crate) script: Option<String>,
    /// JSON file with sync options.
    #[arg(long = "options")]
    pub(crate) options: Option<String>,
    #[arg(long = "interval-ms")]
    pub(crate) interval_ms: Option<u64>,
    /// Start with automatic polling off.
    #[arg(long = "manual")]
    pub(crate) manual: bool,
    #[arg(long = "title")]
    pub(crate) title: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct InspectArgs {
    #[command(flatten)]
    pub(crate) session: SessionArgs,
    #[arg(long = "filter")]
    pub(crate) filter: Option<String>,
    /// Print one ROW_JSON line per leaf as well.
    #[arg(long = "json")]
    pub(crate) json: bool,
}
