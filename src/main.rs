#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo
    )
)]

//! # balanced-tree
//!
//! Interactive console for an AVL tree of integer keys.

use std::io;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use balanced_tree::console::{self, Console};

#[derive(Parser, Debug)]
#[command(
    name = "balanced-tree",
    version,
    about = "Insert, delete, search and print keys of an AVL tree.",
    long_about = "Starts an interactive menu over an AVL tree of integer keys. \
                  Keys given on the command line are inserted in order before the menu starts."
)]
struct Cli {
    /// Keys inserted before the menu starts. Arguments that are not integers are skipped.
    #[arg(value_name = "KEYS", allow_negative_numbers = true)]
    keys: Vec<String>,

    /// Print the seeded tree and exit without starting the menu.
    #[arg(long)]
    print_only: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let tree = console::seed(&cli.keys).context("failed to seed tree from arguments")?;

    let stdout = io::stdout();
    if cli.print_only {
        let mut out = stdout.lock();
        console::write_report(&mut out, &tree).context("failed to print tree")?;
        return Ok(());
    }

    let stdin = io::stdin();
    let mut console = Console::with_tree(stdin.lock(), stdout.lock(), tree);
    console.run().context("console session failed")?;
    info!("bye");
    Ok(())
}
