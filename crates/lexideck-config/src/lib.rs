use std::env;

use serde::{Deserialize, Serialize};

use self::lookup::LookupConfig;
use self::network::NetworkConfig;
use self::output::OutputConfig;

pub mod lookup;
pub mod network;
pub mod output;

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub lookup: LookupConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config::default();

        if let Some(timeout) = env::var("LEXIDECK_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.network.timeout_seconds = timeout;
        }
        if let Ok(path) = env::var("LEXIDECK_OUTPUT") {
            config.output.deck_path = path;
        }
        if let Ok(dir) = env::var("LEXIDECK_MEDIA_DIR") {
            config.output.media_dir = dir;
        }

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            lookup: LookupConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
