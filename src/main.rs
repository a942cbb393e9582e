use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use qa_assist_cli::cli_commands::{run_once, RunOptions};
use qa_assist_cli::ui::output::OutputHandler;
use qa_assist_cli::ui::repl::Repl;
use qa_assist_cli::utils::logger;
use qa_assist_cli::{App, Config};

#[derive(Parser)]
#[command(name = "qa-assist")]
#[command(about = "Quality Assistant - submit testing artifacts for STLC analysis", long_about = None)]
struct Cli {
    /// Run in verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Backend base URL (defaults to the configured one)
    #[arg(long)]
    endpoint: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit once from the command line and print the results
    Run {
        /// Software requirements text
        #[arg(long, conflicts_with = "requirements_file")]
        requirements: Option<String>,

        /// Read software requirements from a .txt file
        #[arg(long)]
        requirements_file: Option<PathBuf>,

        #[arg(long)]
        user_stories: Option<String>,

        #[arg(long)]
        code_diffs: Option<String>,

        #[arg(long)]
        previous_results: Option<String>,

        /// Print the raw result object as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match logger::init_global_logger(cli.debug) {
        Ok(path) if cli.verbose => eprintln!("Logging to {}", path.display()),
        Ok(_) => {}
        Err(e) => eprintln!("Failed to initialize logger: {}", e),
    }

    let config = Config::load_or_default().with_endpoint(cli.endpoint);
    tracing::info!(backend = %config.backend.url, "starting qa-assist");

    if cli.verbose {
        eprintln!("Using backend: {}", config.backend.url);
    }

    let mut app = App::new(config)?;
    let mut output = OutputHandler::new().with_verbose(cli.verbose);

    match cli.command {
        Some(Commands::Run {
            requirements,
            requirements_file,
            user_stories,
            code_diffs,
            previous_results,
            json,
        }) => {
            let options = RunOptions {
                requirements,
                requirements_file,
                user_stories,
                code_diffs,
                previous_results,
                json,
            };
            if !run_once(&mut app, options, &mut output).await? {
                std::process::exit(1);
            }
        }
        None => {
            output.print_banner()?;
            println!();
            let mut repl = Repl::new(app, output);
            repl.run().await?;
        }
    }

    Ok(())
}
