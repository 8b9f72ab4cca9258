use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "lolviewer";
const SETTINGS_FILE: &str = "settings.json";

/// User settings persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The 'Riot Games' folder
    pub root_dir: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_dir: default_root(),
            window_width: 1280,
            window_height: 800,
        }
    }
}

fn default_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\Riot Games")
    } else {
        dirs::home_dir()
            .unwrap_or_default()
            .join("Riot Games")
    }
}

impl Settings {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Loads the user's settings, falling back to the defaults
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory, using default settings");
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e:#}, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .wrap_err_with(|| format!("Couldn't read settings '{}'", path.display()))?;

        serde_json::from_str(&s)
            .wrap_err_with(|| format!("Couldn't parse settings '{}'", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| eyre!("No config directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s).wrap_err_with(|| format!("Couldn't write settings '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::Settings;

    #[test]
    fn saves_and_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            root_dir: "/games/Riot Games".into(),
            window_width: 640,
            window_height: 480,
        };

        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "window_width": 1000 }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.window_width, 1000);
        assert_eq!(settings.window_height, Settings::default().window_height);
        assert!(settings.root_dir.ends_with("Riot Games"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Settings::load_from(&path).is_err());
    }
}
