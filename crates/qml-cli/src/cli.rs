//! CLI argument definitions for the `qml` tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "qml",
    version,
    about = "Inspect questionnaire markup - pages, navigation and variables",
    long_about = "Extract the page graph, transitions and variables from questionnaire markup.\n\n\
                  Several files are merged in the order given. Exports the navigation\n\
                  graph as GraphML or DOT and the full model as JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// TOML file with `[extract]` and `[report]` tables.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print headline counts and extraction diagnostics.
    Summary(InputArgs),

    /// List pages, in topological order when the graph allows it.
    Pages(InputArgs),

    /// Print the topological page order.
    Order(InputArgs),

    /// List transitions with their page distance.
    Transitions(TransitionArgs),

    /// List declared, unused or shown variables.
    Variables(VariableArgs),

    /// Show raw and translated transition conditions.
    Conditions(InputArgs),

    /// Export the navigation graph or the full model.
    Export(ExportArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Questionnaire markup files, merged in order.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct TransitionArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Keep transitions with distance >= N.
    #[arg(long = "min-distance", value_name = "N", allow_negative_numbers = true)]
    pub min_distance: Option<i64>,

    /// Keep transitions with distance < N (0 lists backward jumps).
    #[arg(long = "max-distance", value_name = "N", allow_negative_numbers = true)]
    pub max_distance: Option<i64>,

    /// Print at most N transitions.
    #[arg(long = "max-count", value_name = "N")]
    pub max_count: Option<usize>,

    /// Sort by the given field.
    #[arg(long = "sort", value_enum)]
    pub sort: Option<SortKeyArg>,

    /// Reverse the sort order.
    #[arg(long = "descending")]
    pub descending: bool,
}

#[derive(Args)]
pub struct VariableArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only variables declared but never used, or used but never declared.
    #[arg(long = "unused", conflicts_with = "shown")]
    pub unused: bool,

    /// Only variables interpolated into displayed text.
    #[arg(long = "shown")]
    pub shown: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "graphml")]
    pub format: ExportFormatArg,

    /// Output file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortKeyArg {
    Index,
    Distance,
    Source,
    Target,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Graphml,
    Dot,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
