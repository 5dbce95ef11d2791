mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use mortgage_core::MortgageError;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::amortization::AmortizeArgs;

/// Fixed-rate mortgage payment schedules
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Fixed-rate mortgage payment schedules",
    long_about = "Computes the level monthly payment, lifetime totals, and the \
                  month-by-month interest/principal split of a fixed-rate loan \
                  with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Log engine activity to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Amortize a loan: monthly payment, totals, and payment schedule
    Amortize(AmortizeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::amortization::run_amortize(args, &cli.output),
        Commands::Version => {
            println!("mortgage {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            let code = match e.downcast_ref::<MortgageError>() {
                Some(MortgageError::InvalidInput { .. }) => {
                    eprintln!("{}: {}", "invalid loan terms".red().bold(), e);
                    1
                }
                Some(_) => {
                    eprintln!("{}: {}", "calculation error".red().bold(), e);
                    1
                }
                None => {
                    eprintln!(
                        "{}: please check your input: {}",
                        "input error".red().bold(),
                        e
                    );
                    2
                }
            };
            process::exit(code);
        }
    }
}
