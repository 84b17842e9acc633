use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Installs the global logger. Lines look like `[timestamp] LEVEL: message`
/// and go to stderr, or are appended to `log_file` when one is given.
/// `RUST_LOG` overrides the default `info` level.
pub fn init(log_file: Option<&Path>) -> std::io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(Target::Stderr);
        }
    }

    // A second init (tests, embedding) keeps the first logger.
    if let Err(e) = builder.try_init() {
        log::debug!("logger already installed, ignoring log file {log_file:?}: {e}");
    }
    Ok(())
}

/// Metric line in a fixed, grep-friendly shape.
pub fn scalar(step: u64, name: &str, value: f32) {
    log::info!("SCALAR step={step} name={name} value={value:.6}");
}
