//! User settings stored as TOML in the platform config directory.
//!
//! - macOS: ~/Library/Application Support/dev.sheet-remap.sheet-remap/
//! - Windows: %APPDATA%/sheet-remap/sheet-remap/config/
//! - Linux: ~/.config/sheet-remap/

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use remap_map::{AdvisorContext, Credential};
use remap_output::DEFAULT_OUTPUT_SUFFIX;
use remap_transform::DEFAULT_PREVIEW_ROWS;

const APP_QUALIFIER: &str = "dev";
const APP_ORG: &str = "sheet-remap";
const APP_NAME: &str = "sheet-remap";
const CONFIG_FILENAME: &str = "settings.toml";

/// Environment variable that overrides the stored advisor credential.
pub const CREDENTIAL_ENV: &str = "SHEET_REMAP_CREDENTIAL";

/// Default advisor model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub advisor: AdvisorSettings,
    pub output: OutputSettings,
    pub display: DisplaySettings,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorSettings {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            credential: None,
        }
    }
}

impl fmt::Debug for AdvisorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorSettings")
            .field("model", &self.model)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Appended to the source file stem for the default output path.
    pub suffix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub preview_rows: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl Settings {
    /// Advisor configuration, with the environment credential taking precedence.
    pub fn advisor_context(&self) -> AdvisorContext {
        self.advisor_context_with(std::env::var(CREDENTIAL_ENV).ok())
    }

    fn advisor_context_with(&self, env_credential: Option<String>) -> AdvisorContext {
        let credential = env_credential
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.advisor.credential.clone())
            .map(Credential::new);
        AdvisorContext {
            model: self.advisor.model.clone(),
            credential,
        }
    }
}

/// Default settings file location, if the platform has one.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// `explicit` when given, otherwise the platform default.
pub fn resolve_settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(settings_path)
}

/// Load settings, falling back to defaults when the file is missing or invalid.
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    let Some(path) = resolve_settings_path(explicit) else {
        tracing::warn!("could not determine settings path, using defaults");
        return Settings::default();
    };
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
                Settings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Settings::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read settings file, using defaults");
            Settings::default()
        }
    }
}

/// Save settings, creating the parent directory if needed.
pub fn save_settings(settings: &Settings, explicit: Option<&Path>) -> Result<PathBuf> {
    let path = resolve_settings_path(explicit)
        .ok_or_else(|| anyhow!("could not determine settings path"))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("serialize settings")?;
    fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved settings");
    Ok(path)
}
