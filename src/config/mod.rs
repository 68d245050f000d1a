//! Configuration management for `fixd`.
//!
//! Configuration is loaded from YAML files with support for:
//! - User config (~/.config/fixdelhi/config.yaml)
//! - Project config (.fixdelhi/config.yaml)
//! - Environment variable overrides (`FIXD_*`)
//! - Command-line overrides
//!
//! Later sources win. Missing files are skipped; malformed files are errors.

use std::fs;
use std::path::{Path, PathBuf};

use civic_core::model::PLACEHOLDER_IMAGE;
use civic_core::store::DEFAULT_MAX_IMAGE_BYTES;
use civic_core::{Caller, IssueStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FixdError, Result};

/// Project-level config location, relative to the working directory.
pub const PROJECT_CONFIG: &str = ".fixdelhi/config.yaml";

/// Identities treated as administrators unless configured otherwise.
pub const DEFAULT_ADMIN_IDENTITIES: [&str; 2] = civic_core::desk::SAMPLE_AUTHORS;

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Identity used when a command doesn't name one.
    pub identity: Option<String>,
    /// Identities granted administrator privileges.
    pub admin_identities: Vec<String>,
    pub placeholder_image: String,
    pub seed_sample_issues: bool,
    pub max_image_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity: None,
            admin_identities: DEFAULT_ADMIN_IDENTITIES.iter().map(ToString::to_string).collect(),
            placeholder_image: PLACEHOLDER_IMAGE.to_string(),
            seed_sample_issues: false,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// One configuration source; unset keys leave earlier values alone.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub identity: Option<String>,
    pub admin_identities: Option<Vec<String>>,
    pub placeholder_image: Option<String>,
    pub seed_sample_issues: Option<bool>,
    pub max_image_bytes: Option<usize>,
}

/// Overrides taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub identity: Option<String>,
    /// Treat the caller as an administrator regardless of identity.
    pub admin: bool,
    pub seed: bool,
    /// Explicit config file, read after the project config.
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed files, `FileNotFound` if an
    /// explicit `--config` path is missing, or `Config` for bad
    /// environment values.
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        let mut paths: Vec<PathBuf> = user_config_path(|key| std::env::var(key).ok())
            .into_iter()
            .collect();
        paths.push(PathBuf::from(PROJECT_CONFIG));
        if let Some(explicit) = &overrides.config_path {
            if !explicit.exists() {
                return Err(FixdError::FileNotFound(explicit.clone()));
            }
            paths.push(explicit.clone());
        }
        Self::load_from(&paths, |key| std::env::var(key).ok(), overrides)
    }

    /// Load from explicit files and an environment lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from<F>(paths: &[PathBuf], env: F, overrides: &CliOverrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for path in paths {
            if let Some(layer) = read_layer(path)? {
                debug!(path = %path.display(), "applying config file");
                config.apply(layer);
            }
        }
        config.apply(env_layer(env)?);
        config.apply_overrides(overrides);
        Ok(config)
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(identity) = layer.identity {
            self.identity = Some(identity);
        }
        if let Some(admins) = layer.admin_identities {
            self.admin_identities = admins;
        }
        if let Some(image) = layer.placeholder_image {
            self.placeholder_image = image;
        }
        if let Some(seed) = layer.seed_sample_issues {
            self.seed_sample_issues = seed;
        }
        if let Some(max) = layer.max_image_bytes {
            self.max_image_bytes = max;
        }
    }

    fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(identity) = &overrides.identity {
            self.identity = Some(identity.clone());
        }
        if overrides.seed {
            self.seed_sample_issues = true;
        }
    }

    /// True if `identity` is on the administrator list (case-insensitive).
    #[must_use]
    pub fn is_admin(&self, identity: &str) -> bool {
        self.admin_identities
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(identity))
    }

    /// Resolve the caller for `identity`.
    #[must_use]
    pub fn caller_for(&self, identity: Option<&str>, force_admin: bool) -> Caller {
        let identity = identity.map(str::trim).filter(|id| !id.is_empty());
        Caller {
            identity: identity.map(String::from),
            privileged: force_admin || identity.is_some_and(|id| self.is_admin(id)),
        }
    }

    /// An empty store configured from this config.
    #[must_use]
    pub fn build_store(&self) -> IssueStore {
        IssueStore::new()
            .with_placeholder_image(self.placeholder_image.clone())
            .with_max_image_bytes(self.max_image_bytes)
    }
}

fn user_config_path<F>(env: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    env("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| env("HOME").map(|home| Path::new(&home).join(".config")))
        .map(|dir| dir.join("fixdelhi").join("config.yaml"))
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FixdError::Io(e)),
    };
    if contents.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|e| FixdError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn env_layer<F>(env: F) -> Result<ConfigLayer>
where
    F: Fn(&str) -> Option<String>,
{
    let mut layer = ConfigLayer {
        identity: env("FIXD_IDENTITY").filter(|v| !v.trim().is_empty()),
        placeholder_image: env("FIXD_PLACEHOLDER_IMAGE").filter(|v| !v.trim().is_empty()),
        ..ConfigLayer::default()
    };
    if let Some(admins) = env("FIXD_ADMIN") {
        layer.admin_identities = Some(
            admins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        );
    }
    if let Some(seed) = env("FIXD_SEED") {
        layer.seed_sample_issues = Some(parse_bool("FIXD_SEED", &seed)?);
    }
    Ok(layer)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(FixdError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
