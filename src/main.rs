use std::path::{Path, PathBuf};

use anyhow::Context;
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use liminal_core::engine::{EngineConfig, EnginePlugin};
use liminal_core::gameflow::GameFlowPlugin;
use liminal_core::logging::{self, LoggingPlugin};

const DEFAULT_CONFIG_PATH: &str = "config/engine.json";

fn load_config() -> anyhow::Result<EngineConfig> {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => EngineConfig::load(DEFAULT_CONFIG_PATH)
            .context("loading default config")?,
        None => EngineConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing_default();
    let config = load_config()?;
    tracing::info!(
        seed = ?config.seed,
        phrase = ?config.seed_phrase,
        tick_rate = config.tick_rate,
        "Liminal Castle starting"
    );

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(config.tick_interval())))
        .add_plugins(StatesPlugin)
        .add_plugins(LoggingPlugin)
        .add_plugins(GameFlowPlugin)
        .add_plugins(EnginePlugin::new(config))
        .run();

    Ok(())
}
