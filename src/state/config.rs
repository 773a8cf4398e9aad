//! Configuration management

use crate::error::{QuizVoiceError, Result};
use crate::speech::options::{DEFAULT_LANG, DEFAULT_PITCH, DEFAULT_RATE, DEFAULT_VOLUME};
use crate::speech::{EndpointList, SpeechOptions};
use ini::Ini;
use log::{debug, info};
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_PRIMARY: &str = "/api/tts/";
const DEFAULT_FALLBACKS: &str = "/api/tts/pyttsx3/, /api/tts/edge/, /api/tts/fallback/";
const DEFAULT_STATUS: &str = "/api/tts/status/";

/// Application configuration
///
/// Holds the speech server location and endpoint order, default voice
/// parameters and quiz pacing.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.quizvoice.cfg by default)
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, writing defaults there if missing
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| QuizVoiceError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| QuizVoiceError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// In-memory defaults, nothing read from or written to disk
    pub fn defaults() -> Self {
        Self {
            ini: Self::default_config(),
            path: Self::config_path(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| QuizVoiceError::Config(format!("Failed to save config: {}", e)))
    }

    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quizvoice.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("server"))
            .set("base_url", DEFAULT_BASE_URL)
            .set("primary", DEFAULT_PRIMARY)
            .set("fallbacks", DEFAULT_FALLBACKS)
            .set("status", DEFAULT_STATUS)
            .set("timeout_ms", "15000");

        ini.with_section(Some("speech"))
            .set("rate", DEFAULT_RATE.to_string())
            .set("pitch", DEFAULT_PITCH.to_string())
            .set("volume", DEFAULT_VOLUME.to_string())
            .set("lang", DEFAULT_LANG);

        ini.with_section(Some("quiz"))
            .set("auto_speak", "true")
            .set("explanation_delay_ms", "500")
            .set("trigger_reset_ms", "2000");

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an unsigned integer value from config
    pub fn get_u64(&self, section: &str, key: &str, default: u64) -> u64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    pub fn base_url(&self) -> String {
        self.get_string("server", "base_url", DEFAULT_BASE_URL)
    }

    pub fn primary_endpoint(&self) -> String {
        self.get_string("server", "primary", DEFAULT_PRIMARY)
    }

    /// Secondary endpoints in declared order
    pub fn fallback_endpoints(&self) -> Vec<String> {
        self.get_string("server", "fallbacks", DEFAULT_FALLBACKS)
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn endpoints(&self) -> Result<EndpointList> {
        EndpointList::from_paths(
            &self.base_url(),
            &self.primary_endpoint(),
            &self.fallback_endpoints(),
        )
    }

    pub fn status_url(&self) -> Result<Url> {
        let base = self.base_url();
        let status = self.get_string("server", "status", DEFAULT_STATUS);
        Url::parse(&base)
            .and_then(|b| b.join(&status))
            .map_err(|e| QuizVoiceError::Config(format!("Bad status URL {}{}: {}", base, status, e)))
    }

    /// Ceiling on each remote speech request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.get_u64("server", "timeout_ms", 15_000))
    }

    /// Default voice parameters
    pub fn speech_options(&self) -> SpeechOptions {
        let voice = self.get_string("speech", "voice", "");
        SpeechOptions {
            rate: self.get_float("speech", "rate", DEFAULT_RATE),
            pitch: self.get_float("speech", "pitch", DEFAULT_PITCH),
            volume: self.get_float("speech", "volume", DEFAULT_VOLUME).clamp(0.0, 1.0),
            lang: self.get_string("speech", "lang", DEFAULT_LANG),
            voice_name: Some(voice.trim().to_string()).filter(|v| !v.is_empty()),
        }
    }

    /// Should new questions be read aloud as they appear?
    pub fn auto_speak(&self) -> bool {
        self.get_bool("quiz", "auto_speak", true)
    }

    /// Pause before an explanation is read, letting the explanation panel settle
    pub fn explanation_delay(&self) -> Duration {
        Duration::from_millis(self.get_u64("quiz", "explanation_delay_ms", 500))
    }

    /// Question file replacing the built-in set, if configured
    pub fn questions_path(&self) -> Option<PathBuf> {
        let path = self.get_string("quiz", "questions", "");
        let path = path.trim();
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    /// How long a trigger shows its outcome before resetting
    pub fn trigger_reset(&self) -> Duration {
        Duration::from_millis(self.get_u64("quiz", "trigger_reset_ms", 2000))
    }
}
