use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use dictation_core::lesson::infrastructure::http_segmentation_client::ServiceConfig;
use dictation_core::session::session_config::SessionConfig;
use dictation_core::shared::constants::{DEFAULT_SERVICE_TIMEOUT_SECS, DEFAULT_SERVICE_URL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub appearance: Appearance,
    pub high_contrast: bool,
    pub font_scale: f32,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_SERVICE_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            service_url: default_service_url(),
            timeout_secs: default_timeout_secs(),
            appearance: Appearance::System,
            high_contrast: false,
            font_scale: 1.0,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Dictation").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(path, json);
            }
        }
    }

    /// Segmentation endpoint for the current language profile.
    pub fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::new(&self.service_url, self.session.profile.upload_path());
        config.timeout_secs = self.timeout_secs;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictation_core::dictation::domain::language_profile::LanguageProfile;

    #[test]
    fn test_older_settings_file_gets_defaults() {
        let json = r#"{"appearance":"dark","high_contrast":true,"font_scale":1.2}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.appearance, Appearance::Dark);
        assert_eq!(settings.service_url, DEFAULT_SERVICE_URL);
        assert!(settings.session.loop_default);
    }

    #[test]
    fn test_service_config_follows_profile() {
        let mut settings = Settings::default();
        settings.service_url = "http://lessons.local:8080/".into();
        settings.session.profile = LanguageProfile::Unsegmented;

        assert_eq!(
            settings.service_config().upload_url(),
            "http://lessons.local:8080/upload-china"
        );
    }
}
