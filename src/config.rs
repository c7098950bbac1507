use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub tts_endpoint: String,
    pub tts_model: String,
    pub tts_timeout_secs: u64,
    pub default_voice: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_level: "info".into(),
            tts_endpoint: "http://localhost:3000/api/tts".into(),
            tts_model: "eleven_multilingual_v2".into(),
            tts_timeout_secs: 30,
            default_voice: None,
        }
    }
}

impl Settings {
    /// Reads `config.yml` from `dir` (defaults when absent) and applies
    /// environment overrides.
    pub fn load(dir: &Path) -> Result<Settings> {
        let mut settings = Settings::from_file(&dir.join(CONFIG_FILE))?;
        settings.apply_overrides(|name| env::var(name).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        if data.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(&data).with_context(|| format!("parsing {:?}", path))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("ROUTE_LOG") {
            self.log_level = level;
        }
        if let Some(url) = lookup("ROUTE_TTS_URL") {
            self.tts_endpoint = url;
        }
        if let Some(model) = lookup("ROUTE_TTS_MODEL") {
            self.tts_model = model;
        }
    }

    pub fn tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_secs.max(1))
    }

    pub fn write_default(path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(&Settings::default()).context("serializing settings")?;
        fs::write(path, serialized).with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }
}

/// `ROUTE_DATA_DIR`, if set and non-empty.
pub fn data_dir_override() -> Option<PathBuf> {
    env::var_os("ROUTE_DATA_DIR")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::from_file(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "log_level: debug\ntts_timeout_secs: 5\n").unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.tts_timeout(), Duration::from_secs(5));
        assert_eq!(settings.tts_model, Settings::default().tts_model);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "log_level: [unterminated").unwrap();
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn overrides_win() {
        let mut settings = Settings::default();
        settings.apply_overrides(|name| match name {
            "ROUTE_TTS_URL" => Some("http://tts.test/api/tts".into()),
            _ => None,
        });
        assert_eq!(settings.tts_endpoint, "http://tts.test/api/tts");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn default_file_roundtrips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        Settings::write_default(&path).unwrap();
        assert_eq!(Settings::from_file(&path).unwrap(), Settings::default());
    }
}
