use crate::branding;
use crate::config::{Config, Target};
use crate::patches::{self, PatchError};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name GN expects inside a build directory.
pub const GN_ARGS_FILE: &str = "args.gn";

#[derive(Debug, Clone)]
pub struct Options {
    pub chromium_src: PathBuf,
    pub hexavalent_src: PathBuf,
    /// Lowercase target OS.
    pub target: String,
    /// Relative to `chromium_src`.
    pub gn_build_dir: Option<PathBuf>,
    pub branding: bool,
    pub no_patch: bool,
}

/// Patch, configure and brand the Chromium tree, in that order.
///
/// Stops at the first error. Nothing already written is rolled back.
pub fn run(options: &Options, config: &Config) -> Result<()> {
    let target = config.target(&options.target)?;
    info!("Target OS: {}", options.target);

    if options.no_patch {
        info!("Skipping patches");
    } else {
        apply_all_patches(options, config, target)?;
    }

    if let Some(build_dir) = &options.gn_build_dir {
        let dest = install_gn_args(options, target, build_dir)?;
        info!("Wrote {}", dest.display());
    }

    if options.branding {
        branding::apply_branding(&options.chromium_src, &options.hexavalent_src, &config.branding)?;
        info!("Branding applied");
    }

    Ok(())
}

fn apply_all_patches(options: &Options, config: &Config, target: &Target) -> Result<()> {
    let common = options.hexavalent_src.join(&config.common().patches);
    patches::apply_patches(&options.chromium_src, &common)
        .context("failed to apply common patches")?;

    let os_patches = options.hexavalent_src.join(&target.patches);
    match patches::apply_patches(&options.chromium_src, &os_patches) {
        Ok(_) => Ok(()),
        Err(PatchError::NoPatchFiles { dir }) => {
            warn!("OS specific patch files not found in {}", dir.display());
            Ok(())
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to apply {} patches", options.target))
        }
    }
}

fn install_gn_args(options: &Options, target: &Target, build_dir: &Path) -> Result<PathBuf> {
    let gn_args = target
        .gn_args
        .as_ref()
        .with_context(|| format!("target `{}` has no GN args file", options.target))?;
    let src = options.hexavalent_src.join(gn_args);

    let build_dir = options.chromium_src.join(build_dir);
    fs::create_dir_all(&build_dir)
        .with_context(|| format!("failed to create {}", build_dir.display()))?;

    let dest = build_dir.join(GN_ARGS_FILE);
    fs::copy(&src, &dest)
        .with_context(|| format!("failed to copy {} -> {}", src.display(), dest.display()))?;
    Ok(dest)
}
