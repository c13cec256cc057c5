mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{convert, init, ConvertArgs, InitArgs};
use vellum_common::init_tracing;
use vellum_editor::EditorConfig;

/// Vellum CLI - run content through the editor's data pipeline
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default vellum.config.json
    Init(InitArgs),

    /// Load a JSON view fragment and print it as HTML or model JSON
    Convert(ConvertArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Convert(args) => {
            let config = EditorConfig::load(&cwd)?;
            init_tracing(&config.log_filter)?;
            convert(args, config)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
