//! Error types used throughout the crate.
//!
//! Rules-engine failures (`RulesError`) describe bad input or an engine that
//! disagrees with itself. Session failures (`SessionError`) describe why the
//! controller refused an operation; apart from `EngineInconsistency` they are
//! all recoverable and leave the session untouched.

use thiserror::Error;

use crate::game_state::chess_types::Color;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid move notation: {0}")]
    InvalidNotation(String),

    #[error("invalid PGN: {0}")]
    InvalidPgn(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("inconsistent position: {0}")]
    InconsistentState(String),
}

pub type RulesResult<T> = Result<T, RulesError>;

/// Reasons an operation is refused because of match protocol, not legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("the match has ended")]
    MatchOver,

    #[error("a draw offer is awaiting a response")]
    DrawOfferPending,

    #[error("it is {0}'s turn to move")]
    NotYourTurn(Color),

    #[error("this actor may not act for {0}")]
    Unauthorized(Color),

    #[error("there is no draw offer to answer")]
    NoDrawOffer,

    #[error("{0} cannot answer their own draw offer")]
    OwnDrawOffer(Color),

    #[error("there is no move waiting for a promotion choice")]
    NoPendingPromotion,

    #[error("a move is waiting for a promotion choice")]
    PromotionPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("invalid promotion choice: {0}")]
    InvalidPromotion(String),

    #[error("engine inconsistency: {0}")]
    EngineInconsistency(String),

    #[error("rules engine error: {0}")]
    Rules(#[from] RulesError),

    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    /// Violation kind when the error is a protocol refusal.
    pub fn protocol(&self) -> Option<ProtocolViolation> {
        match self {
            SessionError::Protocol(violation) => Some(*violation),
            _ => None,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoverError {
    #[error("mover failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
