use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

static CONFIG: OnceLock<ConfigInner> = OnceLock::new();

#[derive(Debug)]
struct ConfigInner {
    config: Config,
    file_path: PathBuf,
}

pub struct LoadedConfig {
    pub config: Config,
    pub file_path: PathBuf,
    pub maybe_error: Option<toml::de::Error>,
}

/// Default location of the config file.
///
/// Linux: ~/.config/livepreview/config.toml
/// macOS: ~/Library/Application\ Support/org.livepreview.Live-Preview/config.toml
/// Windows: ~\AppData\Roaming\livepreview\Live Preview\config\config.toml
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("org", "livepreview", "Live Preview")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Reads the config file, falling back to the defaults when it is missing or
/// invalid. A parse error is handed back to the caller for reporting.
pub fn load_config(specified_config_file: Option<PathBuf>) -> LoadedConfig {
    let config_file = specified_config_file
        .or_else(default_config_file)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let mut maybe_error = None;
    let config = match std::fs::read_to_string(&config_file) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
            maybe_error.replace(err);
            Config::default()
        }),
        Err(err) => {
            tracing::debug!(?err, path = ?config_file, "Config file unavailable, using defaults");
            Config::default()
        }
    };

    LoadedConfig {
        config,
        file_path: config_file,
        maybe_error,
    }
}

/// Loads the global [`Config`] once, later calls return the already loaded
/// one.
pub fn load_config_on_startup(
    specified_config_file: Option<PathBuf>,
) -> (&'static Config, Option<toml::de::Error>) {
    let mut config_err = None;

    let inner = CONFIG.get_or_init(|| {
        let LoadedConfig {
            config,
            file_path,
            maybe_error,
        } = load_config(specified_config_file);
        config_err = maybe_error;
        ConfigInner { config, file_path }
    });

    (&inner.config, config_err)
}

/// [`Config`] is a global singleton, explicitly initialized with
/// [`load_config_on_startup`]; the defaults are used if it never was.
pub fn config() -> &'static Config {
    &CONFIG
        .get_or_init(|| ConfigInner {
            config: Config::default(),
            file_path: PathBuf::new(),
        })
        .config
}

pub fn config_file() -> Option<&'static PathBuf> {
    CONFIG.get().map(|inner| &inner.file_path)
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
    /// Specify the log file path.
    ///
    /// This path must be an absolute path.
    pub log_file: Option<String>,

    /// Specify the max log level.
    pub max_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            max_level: "debug".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Quiet period in milliseconds after the last write before the preview
    /// is re-rendered.
    pub debounce_ms: u64,

    /// Whether the preview follows the editor scroll position on startup.
    pub auto_scroll: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            auto_scroll: true,
        }
    }
}

impl PreviewConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Whether starting the preview server opens the preview in the browser.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { open_browser: true }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Log configuration.
    pub log: LogConfig,

    /// Live preview configuration.
    pub preview: PreviewConfig,

    /// Preview server configuration.
    pub server: ServerConfig,
}
