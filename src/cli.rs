//! Command-line interface for strictly_clinic.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use strictly_triage::TestCategory;

/// Strictly Clinic - diagnose generated patients from the terminal
#[derive(Parser, Debug)]
#[command(name = "strictly_clinic")]
#[command(about = "Clinical diagnosis simulator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play the simulator in the terminal UI
    Play {
        /// Path to clinic configuration file
        #[arg(short, long, default_value = "clinic.toml")]
        config: PathBuf,

        /// Use the built-in offline patient instead of an LLM
        #[arg(long)]
        offline: bool,
    },

    /// List the orderable tests
    Tests {
        /// Only show one category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// Generate one case and print it as JSON
    Case {
        /// Path to clinic configuration file
        #[arg(short, long, default_value = "clinic.toml")]
        config: PathBuf,

        /// Use the built-in offline patient instead of an LLM
        #[arg(long)]
        offline: bool,
    },
}

/// Test category as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryArg {
    /// Bedside tests
    Bedside,
    /// Laboratory tests
    Lab,
    /// Imaging
    Imaging,
    /// Specialist consults
    Special,
}

impl From<CategoryArg> for TestCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Bedside => TestCategory::Bedside,
            CategoryArg::Lab => TestCategory::Lab,
            CategoryArg::Imaging => TestCategory::Imaging,
            CategoryArg::Special => TestCategory::Special,
        }
    }
}
