use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run jpackage to produce an app image, then prune it, attach the
    /// metadata extras and build a reproducible .tgz archive.
    AppImage {
        /// The packaging property file.
        properties: PathBuf,
    },

    /// Run jpackage to produce a Debian package.
    Deb {
        /// The packaging property file.
        properties: PathBuf,
    },

    /// Generate a WiX v4 source file describing the distribution.
    Wix {
        /// The packaging property file.
        properties: PathBuf,
    },

    /// Validate the Inno Setup packaging properties.
    Inno {
        /// The packaging property file.
        properties: PathBuf,
    },

    /// Build a reproducible .tgz archive directly from a directory tree.
    Archive {
        /// The root directory to archive.
        #[arg(long)]
        root: PathBuf,

        /// The path for the output archive file.
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Parses command-line arguments using `clap` and returns the command to
/// execute.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}
