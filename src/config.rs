//! Process-wide runtime settings for datum shift grids.

use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

use bon::bon;

use crate::error::Result;

/// Environment variable holding grid search directories, separated like `PATH`.
pub const GRID_PATH_ENV: &str = "REPROJECT_GRID_PATH";

/// What to do when a required grid cannot be found or read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissingGridPolicy {
    /// Fail pipeline construction with `GridNotLoaded`.
    #[default]
    Fail,
    /// Log a warning and leave coordinates unshifted.
    Passthrough,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Settings {
    pub grid_search_paths: Vec<PathBuf>,
    pub missing_grid_policy: MissingGridPolicy,
}

static SETTINGS: OnceLock<RwLock<Settings>> = OnceLock::new();

fn settings_lock() -> &'static RwLock<Settings> {
    SETTINGS.get_or_init(|| {
        RwLock::new(Settings {
            grid_search_paths: paths_from_env(),
            missing_grid_policy: MissingGridPolicy::default(),
        })
    })
}

fn paths_from_env() -> Vec<PathBuf> {
    std::env::var_os(GRID_PATH_ENV)
        .map(|value| std::env::split_paths(&value).collect())
        .unwrap_or_default()
}

/// Snapshot of the active settings.
pub(crate) fn current() -> Settings {
    match settings_lock().read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub struct RuntimeConfiguration {
    settings: Settings,
}

#[bon]
impl RuntimeConfiguration {
    /// Search paths default to the directories listed in `REPROJECT_GRID_PATH`.
    #[builder]
    pub fn new(grid_search_paths: Option<Vec<PathBuf>>, missing_grid_policy: Option<MissingGridPolicy>) -> Self {
        Self {
            settings: Settings {
                grid_search_paths: grid_search_paths.unwrap_or_else(paths_from_env),
                missing_grid_policy: missing_grid_policy.unwrap_or_default(),
            },
        }
    }

    pub fn grid_search_paths(&self) -> &[PathBuf] {
        &self.settings.grid_search_paths
    }

    pub fn missing_grid_policy(&self) -> MissingGridPolicy {
        self.settings.missing_grid_policy
    }

    /// Make these settings the process-wide defaults. Pipelines built
    /// afterwards pick them up; existing pipelines keep their grids.
    pub fn apply(&self) -> Result<()> {
        for path in &self.settings.grid_search_paths {
            if !Path::new(path).is_dir() {
                log::warn!("Grid search path {} is not a directory", path.display());
            }
        }
        let mut guard = match settings_lock().write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = self.settings.clone();
        log::debug!(
            "Applied runtime configuration: {} grid search path(s), missing grids {:?}",
            guard.grid_search_paths.len(),
            guard.missing_grid_policy
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = RuntimeConfiguration::builder().build();
        assert_eq!(config.missing_grid_policy(), MissingGridPolicy::Fail);
        assert_eq!(config.grid_search_paths(), paths_from_env().as_slice());
    }

    #[test]
    fn test_builder_explicit() {
        let dir = std::env::temp_dir();
        let config = RuntimeConfiguration::builder()
            .grid_search_paths(vec![dir.clone()])
            .missing_grid_policy(MissingGridPolicy::Passthrough)
            .build();
        assert_eq!(config.grid_search_paths(), &[dir]);
        assert_eq!(config.missing_grid_policy(), MissingGridPolicy::Passthrough);
    }
}
