#![warn(clippy::unwrap_used, clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

//! Headless driver for the orrery: runs the ticker for a configured
//! wall-clock duration and logs what the bodies are doing.

use std::{env, fs, sync::Arc, thread};

use color_eyre::eyre::{self, WrapErr};
use orrery::{
    clock::SimulationClock,
    system::SolarSystem,
    ticker::{ThreadScheduler, Ticker},
};
use parking_lot::Mutex;
use serde::Deserialize;
use time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    rate_days_per_second: f64,
    tick_interval_ms: i64,
    run_seconds: u64,
    reversed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate_days_per_second: 2.0,
            tick_interval_ms: 100,
            run_seconds: 5,
            reversed: false,
        }
    }
}

impl Config {
    fn load() -> eyre::Result<Self> {
        match env::args().nth(1) {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .wrap_err_with(|| format!("could not read config file {path}"))?;
                toml::from_str(&raw).wrap_err_with(|| format!("could not parse {path}"))
            }
            None => Ok(Self::default()),
        }
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    info!(?config, "starting orrery");

    let mut clock = SimulationClock::new(config.rate_days_per_second);
    clock.set_reversed(config.reversed);
    let mut system = SolarSystem::with_clock(clock);
    system.subscribe(|event| {
        debug!(
            days = event.days,
            changed = event.changes.len(),
            "tick applied"
        );
    });

    let system = Arc::new(Mutex::new(system));
    let mut ticker = Ticker::with_scheduler(
        ThreadScheduler,
        Duration::milliseconds(config.tick_interval_ms),
        system.clone(),
    );
    ticker.start();
    thread::sleep(std::time::Duration::from_secs(config.run_seconds));
    ticker.stop();

    let snapshot = system.lock().snapshot();
    info!(days = snapshot.days, "run finished");
    for (body, state) in snapshot.states {
        info!(
            body = body.name(),
            x = state.position.x,
            y = state.position.y,
            rotation_deg = state.rotation_deg,
            "final state"
        );
    }
    Ok(())
}

#[test]
fn empty_config_means_defaults() {
    let config: Config = toml::from_str("").expect("empty config");
    assert_eq!(config.rate_days_per_second, 2.0);
    assert_eq!(config.tick_interval_ms, 100);
    assert_eq!(config.run_seconds, 5);
    assert!(!config.reversed);
}

#[test]
fn full_config_parses() {
    let config: Config = toml::from_str(
        r#"
            rate_days_per_second = 0.5
            tick_interval_ms = 16
            run_seconds = 30
            reversed = true
        "#,
    )
    .expect("full config");
    assert_eq!(config.rate_days_per_second, 0.5);
    assert_eq!(config.tick_interval_ms, 16);
    assert_eq!(config.run_seconds, 30);
    assert!(config.reversed);
}
