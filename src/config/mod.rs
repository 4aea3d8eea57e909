use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::extractors::ClientPreset;
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Caption tool settings
    pub ytdlp: YtDlpConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YtDlpConfig {
    /// Path or name of the yt-dlp executable
    pub binary: String,

    /// Subtitle language passed to `--sub-langs`
    pub sub_lang: String,

    /// Also request uploaded (non auto-generated) subtitles
    pub include_manual_subs: bool,

    /// Upper bound for a single yt-dlp run
    pub timeout_secs: u64,

    /// Client presets, tried in order
    pub presets: Vec<ClientPreset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for per-request temp workspaces (OS default if unset)
    pub temp_dir: Option<PathBuf>,

    /// Maximum requests running yt-dlp at the same time
    pub max_concurrent_jobs: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            sub_lang: "en".to_string(),
            include_manual_subs: true,
            timeout_secs: 120,
            presets: ClientPreset::defaults(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            max_concurrent_jobs: 3,
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub yt_dlp_path: Option<String>,
    pub sub_lang: Option<String>,
    pub timeout_secs: Option<u64>,
    pub presets: Option<Vec<ClientPreset>>,
    pub temp_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file or fall back to defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let config = match Self::config_path(explicit_path)? {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolve which config file to read, if any
    fn config_path(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            return Ok(Some(path.to_path_buf()));
        }

        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(Some(local_config));
        }

        let user_config = Self::default_path()?;
        Ok(user_config.exists().then_some(user_config))
    }

    /// Per-user config location
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-worker").join("config.yaml"))
    }

    /// Apply command line and environment overrides on top of the file values
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(binary) = overrides.yt_dlp_path {
            self.ytdlp.binary = binary;
        }
        if let Some(sub_lang) = overrides.sub_lang {
            self.ytdlp.sub_lang = sub_lang;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.ytdlp.timeout_secs = timeout_secs;
        }
        if let Some(presets) = overrides.presets {
            self.ytdlp.presets = presets;
        }
        if let Some(temp_dir) = overrides.temp_dir {
            self.app.temp_dir = Some(temp_dir);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ytdlp.binary.trim().is_empty() {
            anyhow::bail!("yt-dlp binary path must not be empty");
        }

        if self.ytdlp.sub_lang.trim().is_empty() {
            anyhow::bail!("Subtitle language must not be empty");
        }

        if self.ytdlp.timeout_secs == 0 {
            anyhow::bail!("yt-dlp timeout must be at least one second");
        }

        if self.ytdlp.presets.is_empty() {
            anyhow::bail!("At least one client preset must be configured");
        }

        if self.app.max_concurrent_jobs == 0 {
            anyhow::bail!("max_concurrent_jobs must be at least 1");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Listen: {}:{}", self.server.host, self.server.port);
        println!("  yt-dlp: {}", self.ytdlp.binary);
        println!("  Subtitle Language: {}", self.ytdlp.sub_lang);
        println!("  Manual Subtitles: {}", self.ytdlp.include_manual_subs);
        println!("  Timeout: {}s", self.ytdlp.timeout_secs);
        println!(
            "  Presets: {}",
            self.ytdlp
                .presets
                .iter()
                .map(ClientPreset::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        match &self.app.temp_dir {
            Some(dir) => println!("  Temp Dir: {}", dir.display()),
            None => println!("  Temp Dir: (system default)"),
        }
        println!("  Max Concurrent Jobs: {}", self.app.max_concurrent_jobs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ytdlp.sub_lang, "en");
        assert!(config.ytdlp.presets[0].is_default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "server:\n  port: 8080\nytdlp:\n  presets: [ios, android]\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ytdlp.binary, "yt-dlp");
        let names: Vec<&str> = config.ytdlp.presets.iter().map(ClientPreset::name).collect();
        assert_eq!(names, ["ios", "android"]);
    }

    #[test]
    fn test_unknown_preset_fails_to_parse() {
        let yaml = "ytdlp:\n  presets: [ios, smart_fridge]\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config::default();
        config.apply_overrides(Overrides {
            port: Some(9000),
            sub_lang: Some("fr".to_string()),
            presets: Some(vec!["tv".parse().unwrap()]),
            ..Overrides::default()
        });

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ytdlp.sub_lang, "fr");
        assert_eq!(config.ytdlp.presets.len(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.ytdlp.presets.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ytdlp.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.app.max_concurrent_jobs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.server.port = 4321;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.server.port, 4321);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(dir.path().join("nope.yaml").as_path())).is_err());
    }
}
