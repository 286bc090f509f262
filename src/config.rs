use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use substitute::{Pattern, StringTable};
use thiserror::Error;

/// Rules shipped with the helper.
pub const DEFAULT_CONFIG: &str = include_str!("hexavalent.toml");

/// Pseudo-target whose patches are applied for every OS.
pub const COMMON_TARGET: &str = "common";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config has no `common` target")]
    MissingCommon,
    #[error("the `common` target must not name a GN args file")]
    CommonHasGnArgs,
    #[error("invalid target OS `{requested}` (expected one of: {})", .available.join(", "))]
    InvalidTarget {
        requested: String,
        available: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub targets: BTreeMap<String, Target>,
    pub branding: Branding,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Patch directory, relative to the Hexavalent source directory.
    pub patches: PathBuf,
    /// GN args file, relative to the Hexavalent source directory.
    #[serde(default)]
    pub gn_args: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Branding {
    pub icons: PathBuf,
    pub groups: Vec<ReplacementGroup>,
    pub strings: StringTable,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplacementGroup {
    pub name: String,
    pub rules: Vec<Rule>,
}

/// Replace `pattern` in `file`, relative to the Chromium source directory.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub file: PathBuf,
    pub pattern: Pattern,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse(DEFAULT_CONFIG)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let common = self.targets.get(COMMON_TARGET).ok_or(ConfigError::MissingCommon)?;
        if common.gn_args.is_some() {
            return Err(ConfigError::CommonHasGnArgs);
        }
        Ok(())
    }

    pub fn common(&self) -> &Target {
        // Presence is checked when the config is parsed.
        &self.targets[COMMON_TARGET]
    }

    /// Look up a buildable target. `common` is never one.
    pub fn target(&self, name: &str) -> Result<&Target, ConfigError> {
        match self.targets.get(name) {
            Some(target) if name != COMMON_TARGET => Ok(target),
            _ => Err(ConfigError::InvalidTarget {
                requested: name.to_string(),
                available: self.target_names().map(str::to_string).collect(),
            }),
        }
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str).filter(|name| *name != COMMON_TARGET)
    }
}
