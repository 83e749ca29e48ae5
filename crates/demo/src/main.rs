//! Runs the ltk demos without a browser.
//!
//! Each demo builds its widgets, simulates a few user interactions and
//! prints the rendered HTML after each step.
//!
//! Run `cargo run -p demo -- help` for more info.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod mvc;
mod reactive;
mod todo;

#[derive(Parser)]
#[clap(author, version, about, subcommand_required = true)]
struct Cli {
    /// The demo to run
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Two product forms, each bound to its own product
    Reactive,

    /// One field shown by an input and a text
    Mvc,

    /// A todo list persisted between runs
    Todo {
        /// JSON file to keep the todos in. Without it the list only lives
        /// for this run.
        #[clap(long)]
        store: Option<PathBuf>,

        /// Add a todo with this note
        #[clap(long)]
        add: Vec<String>,

        /// Mark the todo at this position as completed
        #[clap(long)]
        done: Vec<usize>,

        /// Delete the todo at this position
        #[clap(long)]
        remove: Vec<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::builder().init();

    let cli = Cli::parse();
    match cli.command {
        Command::Reactive => reactive::run(),
        Command::Mvc => mvc::run(),
        Command::Todo {
            store,
            add,
            done,
            remove,
        } => todo::run(todo::Options {
            store,
            add,
            done,
            remove,
        }),
    }
}

/// Print a titled snapshot of some HTML.
fn show(title: &str, html: &str) {
    println!("{title}:");
    println!("{html}");
    println!();
}
