use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use libpatcher_core::Arch;

#[derive(Parser)]
#[command(name = "libpatcher")]
#[command(about = "Patch ARM executables at known offsets", version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Patch a binary (prompts for anything not given on the command line)
    Patch(PatchArgs),

    /// Show the machine and patch family of a binary
    Arch {
        /// Path to the executable or shared library
        file: PathBuf,
    },

    /// Print the patch code table
    Table {
        /// Only show one architecture (arm64, arm32)
        #[arg(short, long)]
        arch: Option<Arch>,
    },

    /// Check an offset list such as "0x100, 0x200"
    Check {
        offsets: String,
    },

    /// Dump file bytes at an offset
    Hexdump {
        file: PathBuf,

        /// File offset (hex, e.g. 0x1A2B0)
        offset: String,

        /// Number of bytes to show
        #[arg(short, long, default_value = "64")]
        size: usize,

        /// Hide the ASCII column
        #[arg(long)]
        no_ascii: bool,
    },
}

#[derive(Args)]
pub struct PatchArgs {
    /// Target binary (prompted for when omitted)
    pub file: Option<PathBuf>,

    /// TOML plan with `file` and an `[offsets]` table
    #[arg(long, env = "LIBPATCHER_PLAN")]
    pub plan: Option<PathBuf>,

    /// Offsets for one kind, e.g. `--set boolean_true=0x100,0x200` (repeatable)
    #[arg(long = "set", value_name = "KIND=OFFSETS")]
    pub set: Vec<String>,

    /// Write a JSON report of the run
    #[arg(long, env = "LIBPATCHER_REPORT")]
    pub report: Option<PathBuf>,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}
