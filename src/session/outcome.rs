//! Match outcome resolution.
//!
//! `resolve` is a pure function of the position, the current outcome and the
//! draw offer. It is re-run after every mutation of the session.

use std::fmt;

use tracing::error;

use crate::errors::RulesResult;
use crate::game_state::chess_types::Color;
use crate::rules::position::ChessPosition;
use crate::session::types::DrawOffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Agreement,
    ThreefoldRepetition,
    InsufficientMaterial,
    FiftyMoveRule,
}

impl DrawReason {
    pub const fn label(self) -> &'static str {
        match self {
            DrawReason::Agreement => "Agreement",
            DrawReason::ThreefoldRepetition => "Threefold Repetition",
            DrawReason::InsufficientMaterial => "Insufficient Material",
            DrawReason::FiftyMoveRule => "Automatic Draw (50-move rule)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchOutcome {
    #[default]
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
    Resignation { winner: Color },
    TimeExpired { winner: Color },
    ErrorAbort,
}

impl MatchOutcome {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchOutcome::InProgress)
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            MatchOutcome::Checkmate { winner }
            | MatchOutcome::Resignation { winner }
            | MatchOutcome::TimeExpired { winner } => Some(*winner),
            _ => None,
        }
    }

    /// PGN result token.
    pub fn pgn_result(&self) -> &'static str {
        match self {
            MatchOutcome::InProgress | MatchOutcome::ErrorAbort => "*",
            MatchOutcome::Stalemate | MatchOutcome::Draw(_) => "1/2-1/2",
            _ => match self.winner() {
                Some(Color::Light) => "1-0",
                Some(Color::Dark) => "0-1",
                None => "*",
            },
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::InProgress => f.write_str("in progress"),
            MatchOutcome::Checkmate { winner } => write!(f, "{winner} wins by checkmate"),
            MatchOutcome::Stalemate => f.write_str("draw by stalemate"),
            MatchOutcome::Draw(reason) => write!(f, "draw ({})", reason.label()),
            MatchOutcome::Resignation { winner } => write!(f, "{winner} wins by resignation"),
            MatchOutcome::TimeExpired { winner } => write!(f, "{winner} wins on time"),
            MatchOutcome::ErrorAbort => f.write_str("aborted after an internal error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: MatchOutcome,
    pub status: String,
}

/// Status line for a terminal outcome.
pub fn terminal_status(outcome: &MatchOutcome) -> String {
    match outcome {
        MatchOutcome::InProgress => String::new(),
        MatchOutcome::Checkmate { winner } => format!("Checkmate! {winner} wins."),
        MatchOutcome::Stalemate => "Stalemate! Game is a draw.".to_owned(),
        MatchOutcome::Draw(DrawReason::Agreement) => "Game drawn by agreement.".to_owned(),
        MatchOutcome::Draw(_) => "Draw!".to_owned(),
        MatchOutcome::Resignation { winner } => {
            format!("{} resigned. {winner} wins.", winner.opposite())
        }
        MatchOutcome::TimeExpired { winner } => format!("{winner} wins on time!"),
        MatchOutcome::ErrorAbort => "Error evaluating game state. Game over.".to_owned(),
    }
}

pub fn resolve<P: ChessPosition>(
    position: &P,
    current: MatchOutcome,
    draw_offer: Option<DrawOffer>,
) -> Resolution {
    if current.is_terminal() {
        return Resolution {
            status: terminal_status(&current),
            outcome: current,
        };
    }

    if let Some(offer) = draw_offer {
        return Resolution {
            outcome: MatchOutcome::InProgress,
            status: format!("{} offered a draw. {} to respond.", offer.by, offer.responder()),
        };
    }

    match evaluate(position) {
        Ok(resolution) => resolution,
        Err(err) => {
            error!(error = %err, "rules engine failed while resolving the outcome");
            Resolution {
                outcome: MatchOutcome::ErrorAbort,
                status: terminal_status(&MatchOutcome::ErrorAbort),
            }
        }
    }
}

fn evaluate<P: ChessPosition>(position: &P) -> RulesResult<Resolution> {
    let to_move = position.turn();

    let outcome = if position.is_checkmate()? {
        MatchOutcome::Checkmate {
            winner: to_move.opposite(),
        }
    } else if position.is_stalemate()? {
        MatchOutcome::Stalemate
    } else if position.is_draw()? {
        let reason = if position.is_threefold_repetition()? {
            DrawReason::ThreefoldRepetition
        } else if position.is_insufficient_material()? {
            DrawReason::InsufficientMaterial
        } else {
            DrawReason::FiftyMoveRule
        };
        MatchOutcome::Draw(reason)
    } else {
        let check = if position.is_check()? { " (Check!)" } else { "" };
        return Ok(Resolution {
            outcome: MatchOutcome::InProgress,
            status: format!("{to_move} to move{check}."),
        });
    };

    Ok(Resolution {
        status: terminal_status(&outcome),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::{resolve, DrawReason, MatchOutcome};
    use crate::game_state::chess_types::Color;
    use crate::rules::standard::StandardPosition;
    use crate::session::types::DrawOffer;

    fn position(fen: &str) -> StandardPosition {
        StandardPosition::from_fen(fen).expect("FEN should parse")
    }

    #[test]
    fn reports_side_to_move_and_check() {
        let quiet = resolve(&StandardPosition::new_game(), MatchOutcome::InProgress, None);
        assert_eq!(quiet.outcome, MatchOutcome::InProgress);
        assert_eq!(quiet.status, "White to move.");

        let checked = resolve(&position("4k3/8/8/8/8/8/8/R3K3 b - - 0 1"), MatchOutcome::InProgress, None);
        assert_eq!(checked.status, "Black to move.");
        let checked = resolve(&position("4k3/8/8/8/8/8/8/4RK2 b - - 0 1"), MatchOutcome::InProgress, None);
        assert_eq!(checked.status, "Black to move (Check!).");
    }

    #[test]
    fn detects_terminal_positions() {
        let mate = resolve(&position("R5k1/5ppp/8/8/8/8/8/4K3 b - - 1 1"), MatchOutcome::InProgress, None);
        assert_eq!(mate.outcome, MatchOutcome::Checkmate { winner: Color::Light });
        assert_eq!(mate.status, "Checkmate! White wins.");

        let stale = resolve(&position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"), MatchOutcome::InProgress, None);
        assert_eq!(stale.outcome, MatchOutcome::Stalemate);

        let bare = resolve(&position("4k3/8/8/8/8/8/8/4K3 w - - 0 1"), MatchOutcome::InProgress, None);
        assert_eq!(bare.outcome, MatchOutcome::Draw(DrawReason::InsufficientMaterial));
        assert_eq!(bare.status, "Draw!");

        let fifty = resolve(&position("4k3/8/8/8/8/8/8/R3K3 w - - 100 90"), MatchOutcome::InProgress, None);
        assert_eq!(fifty.outcome, MatchOutcome::Draw(DrawReason::FiftyMoveRule));
    }

    #[test]
    fn pending_offer_is_not_terminal() {
        let res = resolve(
            &StandardPosition::new_game(),
            MatchOutcome::InProgress,
            Some(DrawOffer { by: Color::Light }),
        );
        assert_eq!(res.outcome, MatchOutcome::InProgress);
        assert_eq!(res.status, "White offered a draw. Black to respond.");
    }

    #[test]
    fn terminal_outcomes_are_kept() {
        let res = resolve(
            &StandardPosition::new_game(),
            MatchOutcome::Resignation { winner: Color::Dark },
            None,
        );
        assert_eq!(res.outcome, MatchOutcome::Resignation { winner: Color::Dark });
        assert_eq!(res.status, "White resigned. Black wins.");
    }

    #[test]
    fn pgn_results() {
        assert_eq!(MatchOutcome::TimeExpired { winner: Color::Dark }.pgn_result(), "0-1");
        assert_eq!(MatchOutcome::Draw(DrawReason::Agreement).pgn_result(), "1/2-1/2");
        assert_eq!(MatchOutcome::InProgress.pgn_result(), "*");
    }
}
