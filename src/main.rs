use anyhow::Result;
use clap::Parser;
use founders_route::{cli, commands};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init { name } => commands::init(name),
        cli::Command::Board { column } => commands::board(column),
        cli::Command::Task(cmd) => commands::task(cmd),
        cli::Command::Column(cmd) => commands::column(cmd),
        cli::Command::Inbox(cmd) => commands::inbox(cmd),
        cli::Command::Journal(cmd) => commands::journal(cmd),
        cli::Command::Brand(cmd) => commands::brand(cmd),
        cli::Command::Focus(cmd) => commands::focus(cmd),
        cli::Command::Library(cmd) => commands::library(cmd),
        cli::Command::Profile(cmd) => commands::profile(cmd),
        cli::Command::Tui => commands::tui(),
    }
}
