use config::{Config, ConfigError, Environment, File};
use moveable_common::testing::MockBehavior;
use serde::{Deserialize, Serialize};

/// Default value programmed for `move_once()`
const DEFAULT_MOVE_ONCE: i32 = 2;
/// Default value programmed for `move_to(move_to_target)`
const DEFAULT_MOVE_TO: i32 = 4;
/// Default value programmed for `move_exactly_to(any)`
const DEFAULT_MOVE_EXACTLY_TO: i32 = 8;
const DEFAULT_MOVE_TO_TARGET: i32 = 2;
const DEFAULT_PROBE_TARGET: i32 = 1234;
const DEFAULT_MOVE_ONCE_CALLS: usize = 2;

/// Accepts `strict`/`loose` as well as the capitalized variant names
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigMockBehavior {
    #[default]
    #[serde(alias = "Strict")]
    Strict,
    #[serde(alias = "Loose")]
    Loose,
}

impl From<ConfigMockBehavior> for MockBehavior {
    fn from(behavior: ConfigMockBehavior) -> Self {
        match behavior {
            ConfigMockBehavior::Strict => MockBehavior::Strict,
            ConfigMockBehavior::Loose => MockBehavior::Loose,
        }
    }
}

/// Values the substitute is programmed to return
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResponsesConfig {
    #[serde(default = "default_move_once")]
    pub move_once: i32,
    #[serde(default = "default_move_to")]
    pub move_to: i32,
    #[serde(default = "default_move_exactly_to")]
    pub move_exactly_to: i32,
}

impl Default for ResponsesConfig {
    fn default() -> Self {
        Self {
            move_once: DEFAULT_MOVE_ONCE,
            move_to: DEFAULT_MOVE_TO,
            move_exactly_to: DEFAULT_MOVE_EXACTLY_TO,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Whether unprogrammed calls on the substitute panic
    #[serde(default)]
    pub behavior: ConfigMockBehavior,

    #[serde(default)]
    pub responses: ResponsesConfig,

    /// Argument `move_to` is programmed for and called with
    #[serde(default = "default_move_to_target")]
    pub move_to_target: i32,

    /// Argument passed to `move_exactly_to`, which is programmed for any value
    #[serde(default = "default_probe_target")]
    pub probe_target: i32,

    /// How many times `move_once` is called; also the verified lower bound
    #[serde(default = "default_move_once_calls")]
    pub move_once_calls: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            behavior: ConfigMockBehavior::default(),
            responses: ResponsesConfig::default(),
            move_to_target: DEFAULT_MOVE_TO_TARGET,
            probe_target: DEFAULT_PROBE_TARGET,
            move_once_calls: DEFAULT_MOVE_ONCE_CALLS,
        }
    }
}

impl DemoConfig {
    /// Load configuration from multiple sources in order of priority:
    /// 1. Configuration file (config.toml, config.yaml, config.json), optional
    /// 2. Environment variables (prefixed with MOVEABLE__, nested keys separated by __)
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("MOVEABLE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let demo_config: Self = config.try_deserialize()?;

        demo_config.validate()?;

        Ok(demo_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.move_once_calls == 0 {
            return Err(ConfigError::Message(
                "move_once_calls must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_move_once() -> i32 {
    DEFAULT_MOVE_ONCE
}

fn default_move_to() -> i32 {
    DEFAULT_MOVE_TO
}

fn default_move_exactly_to() -> i32 {
    DEFAULT_MOVE_EXACTLY_TO
}

fn default_move_to_target() -> i32 {
    DEFAULT_MOVE_TO_TARGET
}

fn default_probe_target() -> i32 {
    DEFAULT_PROBE_TARGET
}

fn default_move_once_calls() -> usize {
    DEFAULT_MOVE_ONCE_CALLS
}
