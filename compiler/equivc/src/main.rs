//! `equiv`: check that a rewritten function behaves like the original.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use equiv_validate::FailurePolicy;
use equivc::{exit_codes, logging, CliError, CommandOutput, Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "equiv",
    version,
    about = "Run original and rewritten functions side by side and compare their results"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// Read settings from this TOML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Relative tolerance for float comparison.
    #[arg(long, global = true)]
    tolerance: Option<f64>,
    /// `status-only` or `exact-message`.
    #[arg(long, global = true)]
    failure_policy: Option<FailurePolicy>,
    /// Wall-clock limit per execution.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Step limit per execution.
    #[arg(long, global = true)]
    max_steps: Option<u64>,
    /// Also allow `sorted`, `reversed`, `zip` and `round`.
    #[arg(long, global = true)]
    extended_builtins: bool,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            tolerance: self.tolerance,
            failure_policy: self.failure_policy,
            timeout_ms: self.timeout_ms,
            max_steps: self.max_steps,
            extended_builtins: self.extended_builtins,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run one argument tuple against both implementations of a request file.
    Check {
        /// JSON file with `originalCode`, `optimizedCode` and `testCaseInputs`.
        request: PathBuf,
    },
    /// Validate request files with several test cases each, in parallel.
    Batch {
        /// JSON files with `originalCode`, `optimizedCode` and `testCases`.
        #[arg(required = true)]
        requests: Vec<PathBuf>,
    },
    /// Execute the first function of a source file.
    Run {
        source: PathBuf,
        /// Argument tuple as a JSON array.
        #[arg(long, default_value = "[]")]
        args: String,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{}", output.json);
            std::process::exit(output.exit_code);
        }
        Err(CliError::Boundary(e)) => {
            match serde_json::to_string(&e.to_response()) {
                Ok(body) => println!("{body}"),
                Err(_) => eprintln!("error: {e}"),
            }
            std::process::exit(exit_codes::BOUNDARY);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let settings = Settings::resolve(cli.global.config.as_deref(), &cli.global.overrides())?;
    match &cli.command {
        Command::Check { request } => equivc::check_file(request, &settings),
        Command::Batch { requests } => equivc::batch_files(requests, &settings),
        Command::Run { source, args } => equivc::run_file(source, args, &settings),
    }
}
