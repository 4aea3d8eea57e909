use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Player clients yt-dlp knows how to impersonate for YouTube.
pub const KNOWN_CLIENTS: &[&str] = &[
    "default",
    "web",
    "web_safari",
    "web_embedded",
    "mweb",
    "ios",
    "android",
    "tv",
    "tv_embedded",
];

/// Order tried when nothing is configured.
pub const DEFAULT_PRESETS: &[&str] = &["default", "web", "mweb", "ios", "android"];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PresetError {
    #[error("Preset name is empty")]
    Empty,

    #[error("Unknown client preset '{0}' (known: {known})", known = KNOWN_CLIENTS.join(", "))]
    Unknown(String),
}

/// One invocation strategy for the caption tool.
///
/// `default` leaves client selection to yt-dlp; every other preset pins
/// the YouTube player client through `--extractor-args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientPreset {
    name: String,
}

impl ClientPreset {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_default(&self) -> bool {
        self.name == "default"
    }

    /// Value for yt-dlp's `--extractor-args`, if this preset needs one.
    pub fn extractor_args(&self) -> Option<String> {
        if self.is_default() {
            None
        } else {
            Some(format!("youtube:player_client={}", self.name))
        }
    }

    pub fn defaults() -> Vec<ClientPreset> {
        DEFAULT_PRESETS
            .iter()
            .map(|name| ClientPreset {
                name: (*name).to_string(),
            })
            .collect()
    }
}

impl FromStr for ClientPreset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if name.is_empty() {
            return Err(PresetError::Empty);
        }
        if !KNOWN_CLIENTS.contains(&name.as_str()) {
            return Err(PresetError::Unknown(name));
        }
        Ok(Self { name })
    }
}

impl TryFrom<String> for ClientPreset {
    type Error = PresetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClientPreset> for String {
    fn from(preset: ClientPreset) -> Self {
        preset.name
    }
}

impl fmt::Display for ClientPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
