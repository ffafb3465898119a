//! Locations of the datasets repository and executables
//!
//! The datasets repository is a directory holding a `static/` tree of
//! curated data (filters, tables, simulation specifications) and a
//! `dynamic/` tree of files generated on demand.

// crate modules
use crate::error::{Error, Result};
use crate::settings::Settings;

// external crates
use glob::{glob, Pattern};
use log::{debug, warn};

// standard library
use std::path::{Path, PathBuf};

/// Path to the datasets repository
pub const DATA_PATH_VARIABLE: &str = "GALACTICUS_DATA_PATH";
/// Optional override for the `dynamic/` tree
pub const DYNAMIC_PATH_VARIABLE: &str = "GALACTICUS_DYNAMIC_DATA_PATH";
/// Optional path to the Galacticus executable directory
pub const EXEC_PATH_VARIABLE: &str = "GALACTICUS_EXEC_PATH";

/// Resolved configuration for a session
#[derive(Debug, Clone)]
pub struct Config {
    data_path: PathBuf,
    dynamic_path: PathBuf,
    exec_path: Option<PathBuf>,
    /// Calculation settings
    pub settings: Settings,
}

impl Config {
    /// Configuration from the environment
    ///
    /// `GALACTICUS_DATA_PATH` is required, every other variable is optional.
    pub fn from_env() -> Result<Self> {
        let data_path = std::env::var(DATA_PATH_VARIABLE)
            .map_err(|_| Error::MissingEnvironment(DATA_PATH_VARIABLE.into()))?;

        let mut config = Self::new(data_path)?.with_settings(Settings::from_env()?);

        if let Ok(dynamic) = std::env::var(DYNAMIC_PATH_VARIABLE) {
            config = config.with_dynamic_path(dynamic)?;
        }
        if let Ok(exec) = std::env::var(EXEC_PATH_VARIABLE) {
            config.exec_path = Some(PathBuf::from(exec));
        }
        Ok(config)
    }

    /// Configuration for a datasets repository at `path`
    ///
    /// The `static/` directory must exist. A missing `dynamic/` directory
    /// is created.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_path = path.as_ref().to_path_buf();
        if !data_path.is_dir() {
            return Err(Error::MissingDirectory(data_path.display().to_string()));
        }

        let static_path = data_path.join("static");
        if !static_path.is_dir() {
            return Err(Error::MissingDirectory(static_path.display().to_string()));
        }

        let dynamic_path = data_path.join("dynamic");
        std::fs::create_dir_all(&dynamic_path)?;

        Ok(Self {
            data_path,
            dynamic_path,
            exec_path: None,
            settings: Settings::default(),
        })
    }

    /// Use a different `dynamic/` tree, created if missing
    pub fn with_dynamic_path<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)?;
        self.dynamic_path = path;
        Ok(self)
    }

    /// Replace the calculation settings
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Root of the datasets repository
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// The curated `static/` tree
    pub fn static_path(&self) -> PathBuf {
        self.data_path.join("static")
    }

    /// The generated `dynamic/` tree
    pub fn dynamic_path(&self) -> &Path {
        &self.dynamic_path
    }

    /// Galacticus executable directory, if known
    pub fn exec_path(&self) -> Option<&Path> {
        self.exec_path.as_deref()
    }

    /// Find a file matching `pattern` anywhere in the repository
    ///
    /// The dynamic tree is searched first, the static tree only if nothing
    /// was found there. Patterns match file names and accept `*` and `?`
    /// wildcards.
    pub fn locate(&self, pattern: &str) -> Result<PathBuf> {
        if let Some(path) = search_directory(&self.dynamic_path, pattern)? {
            return Ok(path);
        }
        search_directory(&self.static_path(), pattern)?.ok_or_else(|| Error::FileNotFound {
            pattern: pattern.to_string(),
            path: self.data_path.display().to_string(),
        })
    }

    /// Search only the static tree
    pub fn search_static(&self, pattern: &str) -> Result<Option<PathBuf>> {
        search_directory(&self.static_path(), pattern)
    }

    /// Search only the dynamic tree
    pub fn search_dynamic(&self, pattern: &str) -> Result<Option<PathBuf>> {
        search_directory(&self.dynamic_path, pattern)
    }
}

/// Recursive search of a directory for file names matching a pattern
///
/// Multiple matches produce a warning and the first, in sorted order, is
/// returned.
pub fn search_directory(root: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let root = Pattern::escape(&root.display().to_string());
    let full = format!("{root}/**/{pattern}");

    let mut files = glob(&full)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();
    files.sort();

    if files.len() > 1 {
        warn!("Multiple files found matching pattern {pattern}");
        for file in &files {
            debug!("  - {}", file.display());
        }
    }
    Ok(files.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("galtools-config-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("static/filters")).unwrap();
        dir
    }

    #[test]
    fn missing_static_directory() {
        let dir = std::env::temp_dir().join(format!("galtools-config-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(matches!(Config::new(&dir), Err(Error::MissingDirectory(_))));
    }

    #[test]
    fn dynamic_takes_priority() {
        let dir = scratch("priority");
        std::fs::write(dir.join("static/filters/SDSS_r.json"), "{}").unwrap();

        let config = Config::new(&dir).unwrap();
        assert!(config.dynamic_path().is_dir());
        assert_eq!(
            config.locate("SDSS_*.json").unwrap(),
            dir.join("static/filters/SDSS_r.json")
        );

        std::fs::create_dir_all(dir.join("dynamic/filters")).unwrap();
        std::fs::write(dir.join("dynamic/filters/SDSS_r.json"), "{}").unwrap();
        assert_eq!(
            config.locate("SDSS_r.json").unwrap(),
            dir.join("dynamic/filters/SDSS_r.json")
        );

        assert!(matches!(
            config.locate("missing.json"),
            Err(Error::FileNotFound { .. })
        ));
    }
}
