//! One-shot user-facing notifications ("toasts").
//!
//! The controller pushes; the front-end drains. Nothing is ever re-sent.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::errors::{ProtocolViolation, SessionError};
use crate::session::outcome::{DrawReason, MatchOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            raised_at: Utc::now(),
        }
    }

    /// Toast for a refused operation.
    pub fn for_error(err: &SessionError) -> Self {
        match err {
            SessionError::IllegalMove(_) => {
                Self::new("Illegal Move", "That move is not allowed.", Severity::Warning)
            }
            SessionError::Protocol(ProtocolViolation::DrawOfferPending) => Self::new(
                "Draw Offer Pending",
                "Please respond to the draw offer before making a move.",
                Severity::Warning,
            ),
            SessionError::Protocol(ProtocolViolation::MatchOver) => Self::new(
                "Game Over",
                "Cannot make moves, the game has ended.",
                Severity::Warning,
            ),
            SessionError::Protocol(violation) => {
                Self::new("Not Allowed", capitalize(&violation.to_string()), Severity::Warning)
            }
            SessionError::InvalidPromotion(kind) => Self::new(
                "Invalid Promotion",
                format!("Cannot promote to {kind}."),
                Severity::Warning,
            ),
            SessionError::EngineInconsistency(_) => Self::new(
                "Internal Error",
                "Move failed unexpectedly after validation. Please reset or try again.",
                Severity::Error,
            ),
            SessionError::Rules(err) => Self::new("Move Error", err.to_string(), Severity::Error),
            SessionError::InvalidConfig(reason) => {
                Self::new("Invalid Settings", reason.clone(), Severity::Warning)
            }
        }
    }

    /// Toast announcing that the match just ended.
    pub fn for_outcome(outcome: &MatchOutcome) -> Option<Self> {
        let note = match outcome {
            MatchOutcome::InProgress => return None,
            MatchOutcome::Checkmate { winner } => {
                Self::new("Checkmate!", format!("{winner} wins."), Severity::Info)
            }
            MatchOutcome::Stalemate => Self::new(
                "Game Drawn!",
                "The game is a draw by Stalemate.",
                Severity::Info,
            ),
            MatchOutcome::Draw(reason) => Self::new(
                "Game Drawn!",
                match reason {
                    DrawReason::Agreement => "The game is a draw by mutual agreement.".to_owned(),
                    other => format!("The game is a draw by {}.", other.label()),
                },
                Severity::Info,
            ),
            MatchOutcome::Resignation { winner } => Self::new(
                "Resignation",
                format!("{} resigned. {winner} wins.", winner.opposite()),
                Severity::Info,
            ),
            MatchOutcome::TimeExpired { winner } => {
                Self::new("Time Out", format!("{winner} wins on time!"), Severity::Info)
            }
            MatchOutcome::ErrorAbort => Self::new(
                "Game Status Error",
                "An unexpected error occurred while checking the game status.",
                Severity::Error,
            ),
        };
        Some(note)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
        None => String::new(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationOutbox {
    queue: VecDeque<Notification>,
}

impl NotificationOutbox {
    pub fn push(&mut self, notification: Notification) {
        self.queue.push_back(notification);
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Notification, NotificationOutbox, Severity};
    use crate::errors::{ProtocolViolation, SessionError};
    use crate::game_state::chess_types::Color;
    use crate::session::outcome::{DrawReason, MatchOutcome};

    #[test]
    fn errors_map_to_toasts() {
        let illegal = Notification::for_error(&SessionError::IllegalMove("e2e5".into()));
        assert_eq!(illegal.title, "Illegal Move");
        assert_eq!(illegal.message, "That move is not allowed.");

        let pending = Notification::for_error(&ProtocolViolation::DrawOfferPending.into());
        assert_eq!(pending.title, "Draw Offer Pending");

        let fatal = Notification::for_error(&SessionError::EngineInconsistency("replay".into()));
        assert_eq!(fatal.severity, Severity::Error);
    }

    #[test]
    fn outcomes_announce_once_terminal() {
        assert!(Notification::for_outcome(&MatchOutcome::InProgress).is_none());
        let drawn = Notification::for_outcome(&MatchOutcome::Draw(DrawReason::ThreefoldRepetition))
            .expect("terminal outcome should notify");
        assert_eq!(drawn.message, "The game is a draw by Threefold Repetition.");
        let mate = Notification::for_outcome(&MatchOutcome::Checkmate { winner: Color::Dark })
            .expect("terminal outcome should notify");
        assert_eq!(mate.message, "Black wins.");
    }

    #[test]
    fn outbox_drains_in_order() {
        let mut outbox = NotificationOutbox::default();
        outbox.push(Notification::new("a", "first", Severity::Info));
        outbox.push(Notification::new("b", "second", Severity::Info));
        let drained = outbox.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].title, "a");
        assert!(outbox.is_empty());
    }
}
