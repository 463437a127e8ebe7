//! Persisted user preferences.
//!
//! A tiny `key=value` file, rewritten in full on every change. Only the
//! advanced-settings fields survive restarts (style preset and negative
//! prompt), plus the UI language.

use std::path::PathBuf;

use crate::api::types::StylePreset;

pub struct AppSettings {
    /// Preset appended to generation prompts (ignored in editing mode).
    pub style_preset: StylePreset,
    /// Exclusion clause appended to generation prompts.
    pub negative_prompt: String,
    /// Language code ("en", "pt"). Empty string = auto-detect on first boot.
    pub language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            style_preset: StylePreset::None,
            negative_prompt: String::new(),
            language: String::new(),
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/genfe/genfe_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\GenFE\genfe_settings.cfg
    /// On macOS:   ~/Library/Application Support/GenFE/genfe_settings.cfg
    /// Fallback:   same directory as the executable.
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("genfe");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("genfe_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .unwrap_or_else(|_| {
                    std::env::current_exe()
                        .ok()
                        .and_then(|p| p.parent().map(|d| d.to_string_lossy().into_owned()))
                        .unwrap_or_default()
                });
            let config_dir = PathBuf::from(appdata).join("GenFE");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("genfe_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("GenFE");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("genfe_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("genfe_settings.cfg")))
        }
    }

    /// Save settings to disk.
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else {
            return;
        };
        let content = format!(
            "style_preset={}\n\
             negative_prompt={}\n\
             language={}\n",
            self.style_preset.id(),
            // the file format is line-based, so flatten any pasted newlines
            self.negative_prompt.replace('\n', " "),
            self.language,
        );
        let _ = std::fs::write(path, content);
    }

    /// Load settings from disk (returns default if file missing or corrupt).
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };

        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "style_preset" => {
                    s.style_preset = StylePreset::from_id(val.trim());
                }
                "negative_prompt" => {
                    s.negative_prompt = val.trim().to_string();
                }
                "language" => {
                    s.language = val.trim().to_string();
                }
                _ => {}
            }
        }
        s
    }
}
