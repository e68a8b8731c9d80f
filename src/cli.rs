//! Command line

use clap::Parser;
use std::path::PathBuf;

/// Touch display controller for Klipper printers
#[derive(Parser, Debug)]
#[command(name = "printhmi", version, about)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}
