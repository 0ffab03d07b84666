//! `socforge` — build and inspect board topologies.
//!
//! ```text
//! USAGE:
//!   socforge build <board.toml> [--firmware <file>]   Build a described board
//!   socforge evb [--firmware <file>]                  Build the S32K3X8EVB reference board
//!   socforge describe                                 Print the reference board as TOML
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use socforge_topology::{BoardAssembler, BoardDescription, FirmwareImage};

mod evb;

#[derive(Parser)]
#[command(name = "socforge", about = "Hardware-topology assembler CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build a board from a TOML description and print the realized topology.
    Build {
        /// Path to the board description.
        description: PathBuf,
        /// Firmware image to stage into the board's firmware region.
        #[arg(long)]
        firmware: Option<PathBuf>,
    },
    /// Build the built-in S32K3X8EVB reference board.
    Evb {
        /// Firmware image to stage into flash.
        #[arg(long)]
        firmware: Option<PathBuf>,
    },
    /// Print the reference board description as TOML.
    Describe,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Build { description, firmware } => cmd_build(&description, firmware.as_deref()),
        Cmd::Evb { firmware } => cmd_evb(firmware.as_deref()),
        Cmd::Describe => cmd_describe(),
    }
}

fn cmd_build(path: &Path, firmware: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading board description {}", path.display()))?;
    let description: BoardDescription = toml::from_str(&text)
        .with_context(|| format!("parsing board description {}", path.display()))?;
    build_and_print(&description, firmware)
}

fn cmd_evb(firmware: Option<&Path>) -> Result<()> {
    let description = evb::description();
    build_and_print(&description, firmware)
}

fn cmd_describe() -> Result<()> {
    let text = toml::to_string_pretty(&evb::description())
        .context("serializing the reference board description")?;
    print!("{text}");
    Ok(())
}

fn build_and_print(description: &BoardDescription, firmware: Option<&Path>) -> Result<()> {
    let image = firmware.map(read_image).transpose()?;
    let topology = BoardAssembler::build(description, image.as_ref())
        .with_context(|| format!("building board `{}`", description.name))?;
    print!("{}", topology.summary());
    Ok(())
}

fn read_image(path: &Path) -> Result<FirmwareImage> {
    let bytes =
        fs::read(path).with_context(|| format!("reading firmware image {}", path.display()))?;
    let source = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(FirmwareImage::new(bytes, source))
}
