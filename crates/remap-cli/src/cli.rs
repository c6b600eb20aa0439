//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sheet-remap",
    version,
    about = "Remap the values of a spreadsheet column with reviewed mapping rules",
    long_about = "Remap the values of one spreadsheet column.\n\n\
                  Rules come from an AI reply (propose) or manual edits (rule set),\n\
                  are stored in a JSON rule-set file, and are applied by transform.\n\
                  Manual rules always take precedence over AI proposals."
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

    /// Log output format.
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

    /// Include cell values and rule keys in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Settings file to use instead of the platform default.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the sheets of a spreadsheet with their columns.
    Sheets(SheetsArgs),

    /// Show the distinct values of a column.
    Values(ValuesArgs),

    /// Merge an AI reply into a rule set.
    Propose(ProposeArgs),

    /// Edit or list the rules of a rule set.
    #[command(subcommand)]
    Rule(RuleCommand),

    /// Show how the first rows would change.
    Preview(PreviewArgs),

    /// Apply a rule set and write the transformed spreadsheet.
    Transform(TransformArgs),

    /// Inspect or change settings.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
pub struct SheetsArgs {
    /// Spreadsheet file (csv, xlsx, xlsm, xlsb, xls, ods).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Source file, sheet and column selection shared by most commands.
#[derive(Args)]
pub struct SourceArgs {
    /// Spreadsheet file (csv, xlsx, xlsm, xlsb, xls, ods).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Sheet name (default: first sheet).
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,
}

#[derive(Args)]
pub struct ValuesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column header.
    #[arg(long = "column", value_name = "HEADER")]
    pub column: String,

    /// Rule set used to show targets and coverage.
    #[arg(long = "rules", value_name = "RULES")]
    pub rules: Option<PathBuf>,
}

#[derive(Args)]
pub struct ProposeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column header.
    #[arg(long = "column", value_name = "HEADER")]
    pub column: String,

    /// What the transformation should achieve, in plain words.
    #[arg(long = "goal", value_name = "TEXT")]
    pub goal: String,

    /// File holding the AI reply.
    #[arg(long = "reply", value_name = "PATH")]
    pub reply: PathBuf,

    /// Rule set to update (created if missing).
    #[arg(long = "rules", value_name = "RULES")]
    pub rules: PathBuf,
}

#[derive(Subcommand)]
pub enum RuleCommand {
    /// Add or overwrite a manual rule.
    Set {
        /// Rule set file.
        #[arg(value_name = "RULES")]
        rules: PathBuf,
        /// Source value as it appears in the column.
        #[arg(value_name = "SOURCE")]
        source: String,
        /// Replacement value.
        #[arg(value_name = "TARGET")]
        target: String,
        /// Column the rule set applies to (required when creating a rule set).
        #[arg(long = "column", value_name = "HEADER")]
        column: Option<String>,
    },

    /// Delete a rule; AI proposals will not bring it back.
    Delete {
        /// Rule set file.
        #[arg(value_name = "RULES")]
        rules: PathBuf,
        /// Source value of the rule.
        #[arg(value_name = "SOURCE")]
        source: String,
    },

    /// List the rules of a rule set.
    List {
        /// Rule set file.
        #[arg(value_name = "RULES")]
        rules: PathBuf,
    },
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Rule set to apply.
    #[arg(long = "rules", value_name = "RULES")]
    pub rules: PathBuf,

    /// Column header (default: the rule set's column).
    #[arg(long = "column", value_name = "HEADER")]
    pub column: Option<String>,

    /// Number of rows to show (default from settings).
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct TransformArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Rule set to apply.
    #[arg(long = "rules", value_name = "RULES")]
    pub rules: PathBuf,

    /// Column header (default: the rule set's column).
    #[arg(long = "column", value_name = "HEADER")]
    pub column: Option<String>,

    /// Output file (default: <stem>_transformed.<ext> beside the input).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective settings.
    Show,
    /// Print the settings file location.
    Path,
    /// Set the advisor model identifier.
    SetModel {
        #[arg(value_name = "MODEL")]
        model: String,
    },
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
