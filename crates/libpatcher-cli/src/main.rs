use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod prompter;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("libpatcher_cli={}", level).parse()?)
                .add_directive(format!("libpatcher_core={}", level).parse()?),
        )
        .with_target(false)
        .init();

    debug!("libpatcher {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Patch(args) => commands::patch::run(args),
        Command::Arch { file } => commands::arch::run(&file),
        Command::Table { arch } => commands::table::run(arch),
        Command::Check { offsets } => commands::check::run(&offsets),
        Command::Hexdump {
            file,
            offset,
            size,
            no_ascii,
        } => commands::hexdump::run(&file, &offset, size, !no_ascii),
    }
}
