// src/config/mod.rs
mod error;
mod models;

pub use error::ConfigError;
pub use models::*;

use crate::check::CheckDefinition;
use sha2::{Digest, Sha512};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Load the main YAML configuration and every check file it points at.
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            file: path.to_path_buf(),
            source,
        })?;

    let mut config: Config =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            file: path.to_path_buf(),
            source,
        })?;

    config.validate()?;
    config.checks = load_check_configs(&config.check_config_dir)?;

    info!(
        "Loaded {} checks from {}",
        config.checks.len(),
        config.check_config_dir.display()
    );
    Ok(config)
}

/// Walk `dir` recursively and collect the checks declared in its YAML files.
///
/// Each file maps check names to definitions. Files whose content was
/// already seen are skipped; a name declared twice is an error.
pub fn load_check_configs(dir: &Path) -> Result<Vec<CheckDefinition>, ConfigError> {
    let mut seen = HashSet::new();
    let mut checks: Vec<CheckDefinition> = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| ConfigError::Walk {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            debug!(path = %path.display(), "skipping directory");
            continue;
        }
        if !is_yaml(path) {
            debug!(path = %path.display(), "skipping non-yaml file");
            continue;
        }

        let contents = std::fs::read(path).map_err(|source| ConfigError::Read {
            file: path.to_path_buf(),
            source,
        })?;

        if !seen.insert(hex::encode(Sha512::digest(&contents))) {
            info!(path = %path.display(), "skipping duplicate file");
            continue;
        }

        info!(path = %path.display(), "loading check config");
        let declared: Option<BTreeMap<String, CheckDefinition>> = serde_yaml::from_slice(&contents)
            .map_err(|source| ConfigError::Parse {
                file: path.to_path_buf(),
                source,
            })?;

        for (name, mut check) in declared.unwrap_or_default() {
            if checks.iter().any(|c| c.name == name) {
                return Err(ConfigError::DuplicateCheck {
                    name,
                    file: path.to_path_buf(),
                });
            }

            check.name = name;
            checks.push(check);
        }
    }

    Ok(checks)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yml") | Some("yaml")
    )
}
