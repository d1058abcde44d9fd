// src/paths.rs
// Single source of truth for where gifconv keeps its settings.

use std::path::PathBuf;

/// `%APPDATA%\gifconv` on Windows, `~/.config/gifconv` elsewhere.
pub fn app_config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let base = std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    #[cfg(not(target_os = "windows"))]
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|_| std::env::temp_dir());
    base.join("gifconv")
}

pub fn settings_file() -> PathBuf {
    app_config_dir().join("settings.json")
}
