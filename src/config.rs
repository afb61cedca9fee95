//! Configuration loading and path resolution.
//!
//! Supports HOSTGUARD_HOME env var override for testing.

use anyhow::{Context, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Paths for the hostguard data directory.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub state_file: PathBuf,
    pub settings_file: PathBuf,
    pub starter_list: PathBuf,
}

impl AppPaths {
    /// Build paths from base directory (e.g. ProjectDirs data dir or HOSTGUARD_HOME).
    pub fn from_base(base: PathBuf) -> Self {
        let state_file = base.join("state.json");
        let settings_file = base.join("settings.toml");
        let starter_list = base.join("presets").join("domains.txt");
        Self {
            data_dir: base,
            state_file,
            settings_file,
            starter_list,
        }
    }

    /// Paths for testing: use a temp dir as base.
    pub fn for_test(base: impl AsRef<Path>) -> Self {
        Self::from_base(base.as_ref().to_path_buf())
    }

    /// Get default paths (respects HOSTGUARD_HOME).
    pub fn default_paths() -> Self {
        let base = if let Ok(home) = std::env::var("HOSTGUARD_HOME") {
            PathBuf::from(home)
        } else if let Some(dirs) = directories::ProjectDirs::from("org", "hostguard", "hostguard") {
            dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".hostguard")
        };
        Self::from_base(base)
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

/// settings.toml structure.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Settings {
    /// tracing filter used when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Edit this file instead of the system hosts file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts_file: Option<PathBuf>,
    /// Starter domain list read on first run instead of `presets/domains.txt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_list: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub flush_dns: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            hosts_file: None,
            starter_list: None,
            flush_dns: true,
        }
    }
}

impl Settings {
    /// Load settings from paths (with shared lock when file exists).
    pub fn load(paths: &AppPaths) -> Result<Settings> {
        if paths.settings_file.is_file() {
            let mut file = fs::OpenOptions::new().read(true).open(&paths.settings_file)?;
            fs2::FileExt::lock_shared(&file)?;
            let mut s = String::new();
            file.read_to_string(&mut s)?;
            let settings: Settings = toml::from_str(&s)
                .with_context(|| format!("parse {}", paths.settings_file.display()))?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to paths. The file is only truncated once the exclusive lock is held,
    /// so a concurrent [`Settings::load`] never sees it empty.
    pub fn save(&self, paths: &AppPaths) -> Result<()> {
        if let Some(p) = paths.settings_file.parent() {
            fs::create_dir_all(p)
                .with_context(|| format!("create {}", p.display()))?;
        }
        let s = toml::to_string_pretty(self)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&paths.settings_file)
            .with_context(|| format!("open {}", paths.settings_file.display()))?;
        fs2::FileExt::lock_exclusive(&file)?;
        file.set_len(0)?;
        file.write_all(s.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Starter list location: settings override, else the data dir preset.
    pub fn starter_list_path(&self, paths: &AppPaths) -> PathBuf {
        self.starter_list
            .clone()
            .unwrap_or_else(|| paths.starter_list.clone())
    }
}
