//! Dockline entry point
//!
//! Opens the live preview window, or replays a scenario headlessly when
//! `--scenario` is given.

mod runtime;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::Parser;
use winit::event_loop::EventLoop;

use dockline::autohide::StaticWindowOracle;
use dockline::cli::{CliArgs, StartupMode};
use dockline::config::DockConfig;
use dockline::scenario::Scenario;

use runtime::{preview_model, App};

fn load_config(args: &CliArgs) -> DockConfig {
    let mut config = match &args.config {
        Some(path) => DockConfig::load_from(path),
        None => DockConfig::load(),
    };
    config.apply_overrides(&args.overrides());
    config
}

fn run_scenario(path: &Path, frames_out: Option<&Path>, config: &DockConfig) -> Result<()> {
    let scenario = Scenario::load(path)
        .with_context(|| format!("Failed to load scenario {}", path.display()))?;

    let mut out: Box<dyn Write> = match frames_out {
        Some(file) => Box::new(BufWriter::new(
            File::create(file).with_context(|| format!("Failed to create {}", file.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let report = scenario.run(config, &mut out)?;
    out.flush()?;

    tracing::info!(
        steps = report.steps,
        frames = report.frames,
        hidden = report.hidden,
        "scenario finished"
    );
    Ok(())
}

fn run_preview(args: &CliArgs, config: DockConfig, items: usize) -> Result<()> {
    let oracle = StaticWindowOracle::new();
    let model = preview_model(config, items, oracle.clone(), Instant::now());

    let config_path = args
        .config
        .clone()
        .or_else(dockline::config_paths::config_file);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(model, oracle, config_path, args.overrides());
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    dockline::tracing::init();

    let config = load_config(&args);

    match args.mode() {
        StartupMode::Scenario { path, frames_out } => {
            run_scenario(&path, frames_out.as_deref(), &config)
        }
        StartupMode::Preview { items } => run_preview(&args, config, items),
    }
}
