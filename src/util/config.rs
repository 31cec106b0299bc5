//! Configuration file support.
//!
//! Two optional configuration file locations are consulted:
//! - Global: `~/.buildrig/config.toml` - User-wide defaults
//! - Project: `<source>/.buildrig/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Driver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Toolchain discovery settings
    pub toolchain: ToolchainSettings,

    /// Distribution packaging settings
    pub package: PackageConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Parallel job count handed to the build tool (overrides the estimate)
    pub jobs: Option<usize>,

    /// CMake generator name (e.g. "Ninja")
    pub generator: Option<String>,

    /// Root of the per-configuration working directories
    pub work_dir: Option<PathBuf>,

    /// Plain-text build log location
    pub log_file: Option<PathBuf>,
}

/// Toolchain discovery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Toolchain nickname, e.g. "vs2019"
    pub studio: Option<String>,
}

/// Distribution packaging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Source package name
    pub name: Option<String>,

    /// Packaging metadata directory, relative to the source root
    pub metadata_dir: Option<PathBuf>,

    /// Extra environment variables forwarded to the packaging tool
    #[serde(default)]
    pub forward_env: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.work_dir.is_some() {
            self.build.work_dir = other.build.work_dir;
        }
        if other.build.log_file.is_some() {
            self.build.log_file = other.build.log_file;
        }

        if other.toolchain.studio.is_some() {
            self.toolchain.studio = other.toolchain.studio;
        }

        if other.package.name.is_some() {
            self.package.name = other.package.name;
        }
        if other.package.metadata_dir.is_some() {
            self.package.metadata_dir = other.package.metadata_dir;
        }
        for var in other.package.forward_env {
            if !self.package.forward_env.contains(&var) {
                self.package.forward_env.push(var);
            }
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.buildrig/config.toml)
/// 2. Global config (~/.buildrig/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.buildrig).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".buildrig"))
}

/// Get the global config path (~/.buildrig/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.buildrig/config.toml).
pub fn project_config_path(source_dir: &Path) -> PathBuf {
    source_dir.join(".buildrig").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "[build]\njobs = 4\ngenerator = \"Ninja\"\n\n[package]\nforward_env = [\"A\"]\n",
        )
        .unwrap();
        std::fs::write(
            &project,
            "[build]\njobs = 8\n\n[toolchain]\nstudio = \"vs2019\"\n\n[package]\nforward_env = [\"B\"]\n",
        )
        .unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.build.generator.as_deref(), Some("Ninja"));
        assert_eq!(config.toolchain.studio.as_deref(), Some("vs2019"));
        assert_eq!(config.package.forward_env, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("nope.toml"));
        assert!(config.build.jobs.is_none());
        assert!(config.package.forward_env.is_empty());
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build\njobs = ").unwrap();
        let config = Config::load_or_default(&path);
        assert!(config.build.jobs.is_none());
    }
}
