// config.rs

use crate::clock::{HybridWait, SpinWait, WaitStrategy};
use crate::midi::CollisionPolicy;
use config::{Config, ConfigError, Environment, File};
use log::{debug, LevelFilter};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "ticksheet.toml";
pub const ENV_PREFIX: &str = "TICKSHEET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitKind {
    Spin,
    Hybrid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingSettings {
    pub strategy: WaitKind,
    /// Time spent spinning before each deadline in hybrid mode
    pub spin_window_us: u64,
}

impl TimingSettings {
    pub fn strategy(&self) -> Arc<dyn WaitStrategy> {
        match self.strategy {
            WaitKind::Spin => Arc::new(SpinWait),
            WaitKind::Hybrid => Arc::new(HybridWait::new(Duration::from_micros(
                self.spin_window_us,
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub songs_dir: PathBuf,
    pub output_device: Option<String>,
    pub log_level: String,
    pub timing: TimingSettings,
    pub collision_policy: CollisionPolicy,
}

impl Settings {
    /// Defaults, then `path` or `ticksheet.toml` if present, then `TICKSHEET_*`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__");
        Self::load_from(path, env)
    }

    pub fn load_from(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        // an explicit path has to exist, the default file does not
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Self::defaults()?
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("songs_dir", "./data")?
            .set_default("log_level", "info")?
            .set_default("timing.strategy", "spin")?
            .set_default("timing.spin_window_us", 2000i64)?
            .set_default("collision_policy", "keep_all")
    }

    /// `log_level` as a filter, `Info` when unrecognized
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
