// stagediff CLI - Test vs Prod reconciliation of closing and contract-list exports

mod compare;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};
use stagediff_recon::{Language, RecordKind};

#[derive(Parser)]
#[command(name = "stagediff")]
#[command(about = "Compare Test and Prod exports of closing records and contract lists")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two closing exports (four-row header region, Contract ID + Asset ID keys)
    #[command(after_help = "\
Exit code 1 indicates differences: changed values outside the 1.0 tolerance, \
or keys present on one side only.

Examples:
  stagediff closing test.xlsx prod.xlsx
  stagediff closing test.xlsx prod.xlsx --lang en --out-dir results
  stagediff closing test.xlsx prod.xlsx --json > report.json")]
    Closing {
        /// Export from the Test environment
        test: PathBuf,

        /// Export from the Prod environment
        prod: PathBuf,

        #[command(flatten)]
        opts: CompareOpts,
    },

    /// Compare two contract lists (single header row, System ID + Asset keys)
    #[command(after_help = "\
When payment/option ID columns are missing, rows are numbered within each \
(System ID, Asset) group and the line number becomes part of the key.

Examples:
  stagediff contracts vertragsliste_test.xlsx vertragsliste_prod.xlsx
  stagediff contracts test.csv prod.csv --lang en --out-dir out")]
    Contracts {
        /// Export from the Test environment
        test: PathBuf,

        /// Export from the Prod environment
        prod: PathBuf,

        #[command(flatten)]
        opts: CompareOpts,
    },

    /// Run a comparison described by a TOML config file
    #[command(after_help = "\
Examples:
  stagediff run monthly-closing.toml
  stagediff run contracts.toml --json")]
    Run {
        /// Path to the config file (input/output paths are relative to it)
        config: PathBuf,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running it
    Validate {
        /// Path to the config file
        config: PathBuf,
    },
}

#[derive(clap::Args)]
struct CompareOpts {
    /// Column-name set and report labels
    #[arg(long, value_enum, default_value = "de")]
    lang: LangArg,

    /// Directory for the cleaned tables and the report
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    De,
    En,
}

impl From<LangArg> for Language {
    fn from(arg: LangArg) -> Self {
        match arg {
            LangArg::De => Language::De,
            LangArg::En => Language::En,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  stagediff-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help / --version are reported through the same path
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };

    let result = match cli.command {
        Commands::Closing { test, prod, opts } => compare::cmd_compare(
            RecordKind::Closing,
            test,
            prod,
            opts.lang.into(),
            opts.out_dir,
            opts.json,
        ),
        Commands::Contracts { test, prod, opts } => compare::cmd_compare(
            RecordKind::ContractList,
            test,
            prod,
            opts.lang.into(),
            opts.out_dir,
            opts.json,
        ),
        Commands::Run { config, json } => compare::cmd_run(config, json),
        Commands::Validate { config } => compare::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
