use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::{debug, info};

const GIT: &str = "git";
const PATCH_EXTENSION: &str = "patch";

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("no patch files found in {}", .dir.display())]
    NoPatchFiles { dir: PathBuf },
    #[error("failed to list patches in {}: {source}", .dir.display())]
    List { dir: PathBuf, source: io::Error },
    #[error("failed to execute git: {0}")]
    Spawn(#[source] io::Error),
    #[error("`git am` exited with {status} while applying {}", .dir.display())]
    Failed { dir: PathBuf, status: ExitStatus },
}

/// `*.patch` files directly inside `dir`, sorted by name.
///
/// A directory that does not exist has no patches.
pub fn find_patch_files(dir: &Path) -> Result<Vec<PathBuf>, PatchError> {
    let list_err = |source: io::Error| PatchError::List {
        dir: dir.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(list_err(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == PATCH_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Apply every patch in `dir` to the git work tree at `tree` with one
/// `git am` run. Returns the number of patch files handed to git.
pub fn apply_patches(tree: &Path, dir: &Path) -> Result<usize, PatchError> {
    // `git -C` changes directory before reading the mailboxes.
    let dir = std::path::absolute(dir).map_err(|source| PatchError::List {
        dir: dir.to_path_buf(),
        source,
    })?;

    let files = find_patch_files(&dir)?;
    if files.is_empty() {
        return Err(PatchError::NoPatchFiles { dir });
    }

    for file in &files {
        debug!("Queued {}", file.display());
    }
    info!("Applying {} patch(es) from {}", files.len(), dir.display());

    let status = Command::new(GIT)
        .arg("-C")
        .arg(tree)
        .arg("am")
        .args(&files)
        .status()
        .map_err(PatchError::Spawn)?;

    if !status.success() {
        return Err(PatchError::Failed { dir, status });
    }
    Ok(files.len())
}
