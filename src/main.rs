//! Main entry point for the repack CLI app

use repack::cli::{self, Commands};
use repack::props::Properties;
use repack::{archive, inno, jpackage, wix};

fn main() -> std::process::ExitCode {
    init_logging();
    if let Err(e) = run_app() {
        if e.downcast_ref::<clap::Error>().is_none() {
            eprintln!("Error: {}", e);
        }
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;

    match &command {
        Commands::AppImage { properties } => {
            let properties = Properties::load(properties)?;
            jpackage::AppImageJob::from_properties(&properties)?.run()?;
        }
        Commands::Deb { properties } => {
            let properties = Properties::load(properties)?;
            jpackage::DebJob::from_properties(&properties)?.run()?;
        }
        Commands::Wix { properties } => {
            let properties = Properties::load(properties)?;
            wix::WixJob::from_properties(&properties)?.run()?;
        }
        Commands::Inno { properties } => {
            let properties = Properties::load(properties)?;
            inno::run(&properties)?;
        }
        Commands::Archive { root, output } => {
            archive::build(root, output)?;
        }
    }

    Ok(())
}
