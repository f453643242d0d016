use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use plum_session::config::{DrawClockPolicy, MatchConfig, PlayerMode};
use plum_session::console::console_loop::run_console;
use plum_session::logging::init_tracing;
use plum_session::session::controller::Session;
use plum_session::session::driver::MatchDriver;

/// Play chess in the terminal against another human or the random mover.
#[derive(Debug, Parser)]
#[command(name = "plum_session", version, about)]
struct Cli {
    /// TOML match configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<PlayerMode>,

    /// Minutes on each clock.
    #[arg(long)]
    minutes: Option<u64>,

    /// Seconds added after each move.
    #[arg(long)]
    increment: Option<u64>,

    #[arg(long, value_enum)]
    draw_clock_policy: Option<DrawClockPolicy>,

    /// Start from this FEN instead of the standard setup.
    #[arg(long)]
    fen: Option<String>,

    /// Seed for the random mover.
    #[arg(long)]
    seed: Option<u64>,

    /// Fallback log level when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn match_config(&self) -> Result<MatchConfig> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => MatchConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(minutes) = self.minutes {
            config.minutes = minutes;
        }
        if let Some(increment) = self.increment {
            config.increment_secs = increment;
        }
        if let Some(policy) = self.draw_clock_policy {
            config.draw_clock_policy = policy;
        }
        if let Some(fen) = &self.fen {
            config.start_fen = Some(fen.clone());
        }
        if let Some(seed) = self.seed {
            config.mover_seed = Some(seed);
        }
        config.validate().context("invalid match settings")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = cli.match_config()?;
    info!(mode = ?config.mode, minutes = config.minutes, "starting console session");

    let session = Session::standard(config).context("starting the match")?;
    run_console(MatchDriver::new(session, Instant::now())).context("console I/O failed")?;
    Ok(())
}
