mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, init, new_page, render, templates, tree, CheckArgs, InitArgs, NewArgs, RenderArgs,
    TemplatesCommand, TreeArgs,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Pagecraft CLI - block-based page builder
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a pagecraft.config.json
    Init(InitArgs),

    /// Render a page JSON file to HTML
    Render(RenderArgs),

    /// Report structural problems in a page's block list
    Check(CheckArgs),

    /// Print a page's block tree
    Tree(TreeArgs),

    /// Create a page from a template
    New(NewArgs),

    /// Manage page templates
    Templates {
        #[command(subcommand)]
        command: TemplatesCommand,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command, cwd: &Path) -> anyhow::Result<()> {
    match command {
        Command::Init(args) => init(args, cwd),
        Command::Render(args) => render(args, cwd),
        Command::Check(args) => check(args),
        Command::Tree(args) => tree(args, cwd),
        Command::New(args) => new_page(args, cwd),
        Command::Templates { command } => templates(command, cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| run(cli.command, &cwd));

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
