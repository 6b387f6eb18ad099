use crate::consts;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Program configuration read from a configuration file
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct Config {
    /// Board geometry and timing
    pub(crate) game: GameConfig,

    /// Head-steering defaults and the feed location
    pub(crate) tracker: TrackerConfig,

    /// Settings about data files
    pub(crate) files: FileConfig,

    /// User-supplied display styles
    pub(crate) theme: Theme,
}

impl Config {
    /// Return the default configuration file path
    pub(crate) fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_local_dir()
            .map(|p| p.join("nodsnake").join("config.toml"))
            .ok_or(ConfigError::NoPath)
    }

    /// Read configuration from a file on disk.  If the file does not exist
    /// and `allow_missing` is true, a default `Config` value is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file could not be read or if the file's
    /// contents could not be deserialized.
    pub(crate) fn load(path: &Path, allow_missing: bool) -> Result<Config, ConfigError> {
        let content = match fs_err::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
                return Ok(Config::default())
            }
            Err(e) => return Err(ConfigError::Read(e)),
        };
        toml::from_str(&content).map_err(Into::into)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct GameConfig {
    tick_period_ms: u64,
    pub(crate) grid_size: u16,
}

impl GameConfig {
    pub(crate) fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

impl Default for GameConfig {
    fn default() -> GameConfig {
        GameConfig {
            tick_period_ms: consts::TICK_PERIOD_MS,
            grid_size: consts::GRID_SIZE,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct TrackerConfig {
    pub(crate) sensitivity: f64,
    pub(crate) dead_zone: f64,
    pub(crate) mirror: bool,
    /// Samples per second the filter will process at most
    pub(crate) max_rate: f64,
    /// Where to read tracker frames from; `-` means stdin
    pub(crate) feed: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> TrackerConfig {
        TrackerConfig {
            sensitivity: consts::SENSITIVITY,
            dead_zone: consts::DEAD_ZONE,
            mirror: false,
            max_rate: consts::MAX_RATE,
            feed: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct FileConfig {
    /// Path at which score data should be stored
    pub(crate) scores_file: Option<PathBuf>,

    /// Whether to record scores on disk at all
    pub(crate) save_scores: bool,
}

impl Default for FileConfig {
    fn default() -> FileConfig {
        FileConfig {
            scores_file: None,
            save_scores: true,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct Theme {
    snake: Option<parse_style::Style>,
    food: Option<parse_style::Style>,
    score_bar: Option<parse_style::Style>,
}

impl Theme {
    pub(crate) fn snake(&self) -> ratatui::style::Style {
        self.snake.clone().map_or(consts::SNAKE_STYLE, Into::into)
    }

    pub(crate) fn food(&self) -> ratatui::style::Style {
        self.food.clone().map_or(consts::FOOD_STYLE, Into::into)
    }

    pub(crate) fn score_bar(&self) -> ratatui::style::Style {
        self.score_bar
            .clone()
            .map_or(consts::SCORE_BAR_STYLE, Into::into)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to determine path to local configuration directory")]
    NoPath,
    #[error("failed to read configuration file")]
    Read(#[from] std::io::Error),
    #[error("failed to parse configuration file")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.game.tick_period(), Duration::from_millis(120));
        assert_eq!(config.game.grid_size, 20);
        assert_eq!(config.tracker.feed, None);
        assert!(!config.tracker.mirror);
        assert!(config.files.save_scores);
        assert_eq!(config.theme.snake(), consts::SNAKE_STYLE);
    }

    #[test]
    fn full_config_parses() {
        let config: Config = toml::from_str(concat!(
            "[game]\n",
            "tick-period-ms = 90\n",
            "grid-size = 16\n",
            "\n",
            "[tracker]\n",
            "sensitivity = 1.5\n",
            "dead-zone = 0.05\n",
            "mirror = true\n",
            "max-rate = 15.0\n",
            "feed = \"-\"\n",
            "\n",
            "[files]\n",
            "scores-file = \"/tmp/scores.json\"\n",
            "save-scores = false\n",
            "\n",
            "[theme]\n",
            "snake = \"bold cyan\"\n",
        ))
        .unwrap();
        assert_eq!(config.game.tick_period(), Duration::from_millis(90));
        assert_eq!(config.game.grid_size, 16);
        assert!(config.tracker.mirror);
        assert_eq!(config.tracker.feed, Some(PathBuf::from("-")));
        assert!(!config.files.save_scores);
        assert_ne!(config.theme.snake(), consts::SNAKE_STYLE);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(toml::from_str::<Config>("game = 12").is_err());
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(Config::load(&path, true).is_ok());
        assert!(matches!(
            Config::load(&path, false),
            Err(ConfigError::Read(_))
        ));
    }
}
