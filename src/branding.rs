use crate::config::Branding;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use substitute::substitute_file;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Copy the contents of `src` into `dst`, keeping anything already in `dst`
/// and overwriting files with the same relative path.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        bail!("{} is not a directory", src.display());
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} is outside {}", entry.path().display(), src.display()))?;
        let out = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
        } else {
            fs::copy(entry.path(), &out).with_context(|| {
                format!("failed to copy {} -> {}", entry.path().display(), out.display())
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy the icons over the Chromium tree, then run every replacement rule.
///
/// Rules run one after another in config order; a rule sees the output of
/// every rule before it.
pub fn apply_branding(
    chromium_src: &Path,
    hexavalent_src: &Path,
    branding: &Branding,
) -> Result<()> {
    let icons = hexavalent_src.join(&branding.icons);
    let copied = copy_tree(&icons, chromium_src).context("failed to copy icons")?;
    info!("Copied {} icon file(s) from {}", copied, icons.display());

    info!(
        "Applying {} replacement group(s) with {} string(s)",
        branding.groups.len(),
        branding.strings.len()
    );
    for group in &branding.groups {
        info!("Branding: {}", group.name);
        for rule in &group.rules {
            let path = chromium_src.join(&rule.file);
            let count = substitute_file(&path, &rule.pattern, &branding.strings)
                .with_context(|| format!("branding group `{}` failed", group.name))?;
            debug!("{}: {} replacement(s) for `{}`", rule.file.display(), count, rule.pattern);
        }
    }
    Ok(())
}
