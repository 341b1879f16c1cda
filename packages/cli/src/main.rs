mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    edit_path, hash_password, init, serve, EditPathArgs, HashPasswordArgs, InitArgs, ServeArgs,
};
use std::path::PathBuf;

/// Pharmasite CLI - run and manage the content backend
#[derive(Parser, Debug)]
#[command(name = "pharmasite")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a config file and seed the content store
    Init(InitArgs),

    /// Start the HTTP server
    Serve(ServeArgs),

    /// Hash a password for the accounts list
    HashPassword(HashPasswordArgs),

    /// Show which editor page owns a public path
    EditPath(EditPathArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cwd = match cli.root {
        Some(root) => root,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(err) => fail(anyhow::anyhow!("Cannot get current directory: {}", err)),
        },
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd).await,
        Command::Serve(args) => serve(args, &cwd).await,
        Command::HashPassword(args) => hash_password(args),
        Command::EditPath(args) => edit_path(args),
    };

    if let Err(err) = result {
        fail(err);
    }
}

fn fail(err: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("{} {:#}", "Error:".red().bold(), err);
    eprintln!();
    std::process::exit(1);
}
