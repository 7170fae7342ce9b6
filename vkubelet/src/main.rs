use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;
mod config;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Provider configuration file, `VK_` environment variables override it
    #[clap(short, long, global = true, parse(from_os_str), value_name = "FILE")]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the workload request a pod translates into.
    Translate(cli::translate::Arg),
    /// Print the pod status reported for an instance.
    Status(cli::status::Arg),
    /// Print the remote names derived for a pod.
    Names(cli::names::Arg),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Translate(arg) => arg.handle(config)?,
        Commands::Status(arg) => arg.handle(&config)?,
        Commands::Names(arg) => arg.handle(&config)?,
    }

    Ok(())
}
