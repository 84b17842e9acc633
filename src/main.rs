use std::path::PathBuf;

use anyhow::Context;
use flap_brain::{EvolutionConfig, logging, training};

fn main() {
    if let Err(e) = run() {
        log::error!("Fatal error: {e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => EvolutionConfig::load(&path)?,
        None => EvolutionConfig::default(),
    };
    logging::init(config.log_file.as_deref()).context("could not open the log file")?;

    let outcome = training::run_training(&config)?;
    let best = &outcome.best;
    log::info!(
        "best fitness {:.5} after {} generations, outputs {:?}",
        best.fitness,
        outcome.history.len(),
        best.network.outputs()
    );
    Ok(())
}
