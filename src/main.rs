mod branding;
mod config;
mod helper;
mod patches;
mod target;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};

use crate::config::Config;
use crate::helper::Options;

/// Patch, brand and generate build configuration for Hexavalent.
#[derive(Parser)]
#[command(name = "hexavalent-helper", version, about)]
struct Cli {
    /// Path to chromium source directory.
    #[arg(value_name = "CHROMIUM_SRC_DIR")]
    chromium_src: PathBuf,
    /// Path to Hexavalent source directory. Default: current directory.
    #[arg(short = 'x', long, value_name = "PATH", default_value = ".")]
    hexavalent_src: PathBuf,
    /// Apply patches and GN args for this target OS. Default: current OS.
    #[arg(
        short,
        long,
        value_name = "OS",
        default_value_t = target::current_os(),
        value_parser = target::parse_target
    )]
    target: String,
    /// Path to GN build directory, relative to chromium source.
    #[arg(short, long, value_name = "PATH")]
    gn_build_dir: Option<PathBuf>,
    /// Apply Hexavalent branding changes. Warning: Branding is WIP.
    #[arg(short, long)]
    branding: bool,
    /// Do not apply patch files.
    #[arg(long)]
    no_patch: bool,
    /// Read rules from this TOML file instead of the built-in ones.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Show debug output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::builtin().context("built-in rules are broken")?,
    };

    let options = Options {
        chromium_src: cli.chromium_src,
        hexavalent_src: cli.hexavalent_src,
        target: cli.target,
        gn_build_dir: cli.gn_build_dir,
        branding: cli.branding,
        no_patch: cli.no_patch,
    };
    helper::run(&options, &config)?;

    info!("Done");
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
