use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use env_logger::{Env, Target};

fn env() -> Env<'static> {
    Env::default().default_filter_or("info")
}

/// Log to stderr; used by the one-shot subcommands.
pub fn init_stderr() {
    env_logger::Builder::from_env(env()).init();
}

/// Log to `<cache dir>/supportfy/supportfy.log` so output doesn't land on
/// the alternate screen.
pub fn init_file() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?
        .join("supportfy");
    fs::create_dir_all(&dir)?;

    let path = dir.join("supportfy.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env())
        .target(Target::Pipe(Box::new(file)))
        .init();

    Ok(path)
}
