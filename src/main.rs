use std::env;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use sqlnb_report::config::ReportConfig;
use sqlnb_report::pipeline::{print_err, BuildOutcome, Pipeline};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a notebook into an HTML report
    Build {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Configuration file (defaults to report.yml in the working directory, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the cells found in a notebook as JSON
    Cells {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<ReportConfig> {
    let mut config = ReportConfig::discover(config.as_deref(), &env::current_dir()?)?;
    if let Some(input) = input {
        config.input = input;
    }
    if let Some(output) = output {
        config.output = output;
    }
    Ok(config)
}

fn build(config: ReportConfig) -> anyhow::Result<BuildOutcome> {
    println!(
        "{} {}",
        style("Reading").bold(),
        config.input.display()
    );
    Pipeline::new(config)?.build()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            config,
        } => {
            let outcome = print_err(load_config(config, input, output).and_then(build));
            match outcome {
                Some(BuildOutcome::Written(report)) => {
                    println!(
                        "{} cells ({} queries) rendered, {} skipped",
                        style(report.cells).bold(),
                        style(report.queries).bold(),
                        report.skipped
                    );
                    println!("{}", style("-".repeat(60)).blue());
                    println!(
                        "{} {}",
                        style("Report written to").green().bold(),
                        report.output.display()
                    );
                }
                Some(BuildOutcome::NothingToRender { skipped }) => {
                    println!(
                        "{}",
                        style(format!(
                            "No cells could be read from the notebook ({} records skipped)",
                            skipped
                        ))
                        .yellow()
                        .bold()
                    );
                }
                None => process::exit(1),
            }
        }
        Commands::Cells { input, config } => {
            let config = load_config(config, input, None)?;
            let extraction = Pipeline::new(config)?.extract()?;
            println!("{}", serde_json::to_string_pretty(&extraction)?);
        }
    }

    Ok(())
}
