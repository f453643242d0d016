//! Move-selection strategy used for the non-human side of a match.
//!
//! The controller hands a mover the current legal moves and asks for one back;
//! the mover never sees or mutates session state.

use crate::errors::MoverError;
use crate::rules::position::{LegalMove, Move};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoverOutput {
    /// `None` when the mover declines to move (e.g. no legal moves).
    pub best_move: Option<Move>,
    pub info_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawResponse {
    Accept,
    Reject,
}

pub trait Mover: Send {
    fn name(&self) -> &str;

    /// Called when a fresh match starts.
    fn new_game(&mut self) {}

    fn choose_move(&mut self, legal_moves: &[LegalMove]) -> Result<MoverOutput, MoverError>;

    /// Answer to a draw offered by the human side.
    fn respond_to_draw(&mut self) -> DrawResponse {
        DrawResponse::Reject
    }
}
