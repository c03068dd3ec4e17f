//! Runset CLI - launch parameter sweeps for an external training entry point
//!
//! `runset launch` resolves every experiment of a jobs file against the
//! default parameters, writes one `runset.json` per run directory and runs
//! the training entry point for each of them in order.

mod commands;
mod config;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{classes, labels, launch};

#[derive(Parser, Debug)]
#[command(
    name = "runset",
    author,
    version,
    about = "Runset - experiment sweep launcher",
    long_about = "Runset materializes one self-contained runset.json per experiment of a jobs file\nand launches the training entry point for each run directory, stopping at the first failure."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Materialize run directories from a jobs file and launch them
    ///
    /// Every experiment gets `<exp_dir>/<jobname>/<run_name>/runset.json`.
    /// Jobs run sequentially; a failing job aborts the rest.
    Launch(launch::LaunchArgs),

    /// Print the class names recorded in a dataset's meta file
    Classes(classes::ClassesArgs),

    /// Summarize a label file per class and plan labelled image grid pages
    Labels(labels::LabelsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Launch(launch_args) => {
            let file_config = config::load_config()?;
            launch::execute(launch_args, file_config).await?;
        }
        Command::Classes(classes_args) => {
            classes::execute(&classes_args)?;
        }
        Command::Labels(labels_args) => {
            labels::execute(&labels_args)?;
        }
    }

    Ok(())
}
