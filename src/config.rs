//! Match configuration.
//!
//! Loaded from an optional TOML file and then overridden field by field from
//! the command line. Every field has a default so an empty file is valid.

use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::game_state::chess_types::{Color, PieceKind};
use crate::utils::fen_parser::parse_fen;

/// Clock lengths offered by the front-end, in minutes.
pub const TIME_OPTIONS_MINUTES: [u64; 5] = [1, 3, 5, 10, 15];
pub const DEFAULT_MINUTES: u64 = 5;

/// Who controls each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerMode {
    /// Two humans share the board.
    #[default]
    Pvp,
    /// Human plays White against the mover.
    PvaWhite,
    /// Human plays Black against the mover.
    PvaBlack,
}

impl PlayerMode {
    pub const fn mover_color(self) -> Option<Color> {
        match self {
            PlayerMode::Pvp => None,
            PlayerMode::PvaWhite => Some(Color::Dark),
            PlayerMode::PvaBlack => Some(Color::Light),
        }
    }

    #[inline]
    pub fn human_controls(self, color: Color) -> bool {
        self.mover_color() != Some(color)
    }

    /// Side shown at the bottom of the board.
    pub const fn orientation(self) -> Color {
        match self {
            PlayerMode::PvaBlack => Color::Dark,
            _ => Color::Light,
        }
    }

    /// The color a human acts for when it is not their turn.
    pub const fn human_color(self) -> Option<Color> {
        match self {
            PlayerMode::Pvp => None,
            PlayerMode::PvaWhite => Some(Color::Light),
            PlayerMode::PvaBlack => Some(Color::Dark),
        }
    }
}

/// Which clock runs while a draw offer awaits its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DrawClockPolicy {
    #[default]
    ResponderRuns,
    BothStopped,
    OffererRuns,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    pub mode: PlayerMode,
    pub minutes: u64,
    /// Fischer increment added to a player's clock after each of their moves.
    pub increment_secs: u64,
    pub tick_ms: u64,
    pub mover_delay_ms: u64,
    pub draw_response_delay_ms: u64,
    pub draw_clock_policy: DrawClockPolicy,
    pub default_promotion: PieceKind,
    pub start_fen: Option<String>,
    pub mover_seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: PlayerMode::default(),
            minutes: DEFAULT_MINUTES,
            increment_secs: 0,
            tick_ms: 1_000,
            mover_delay_ms: 500,
            draw_response_delay_ms: 1_000,
            draw_clock_policy: DrawClockPolicy::default(),
            default_promotion: PieceKind::Queen,
            start_fen: None,
            mover_seed: None,
        }
    }
}

impl MatchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading match config");
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(mode = ?config.mode, minutes = config.minutes, "match config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minutes == 0 {
            return Err(ConfigError::Invalid("minutes must be positive".to_owned()));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be positive".to_owned()));
        }
        if !self.default_promotion.is_promotion_target() {
            return Err(ConfigError::Invalid(format!(
                "default_promotion cannot be {:?}",
                self.default_promotion
            )));
        }
        if let Some(fen) = &self.start_fen {
            parse_fen(fen).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }

    #[inline]
    pub fn initial_time(&self) -> Duration {
        Duration::from_secs(self.minutes * 60)
    }

    #[inline]
    pub fn increment(&self) -> Duration {
        Duration::from_secs(self.increment_secs)
    }

    #[inline]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    #[inline]
    pub fn mover_delay(&self) -> Duration {
        Duration::from_millis(self.mover_delay_ms)
    }

    #[inline]
    pub fn draw_response_delay(&self) -> Duration {
        Duration::from_millis(self.draw_response_delay_ms)
    }
}
