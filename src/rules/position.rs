//! The rules-engine contract the session controller is written against.
//!
//! Positions are values: `play` returns a new position and leaves the
//! receiver untouched. The controller relies on this to validate a move on a
//! throwaway trial before committing anything.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::RulesResult;
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::utils::algebraic::square_name;

/// A requested move. `promotion` is only meaningful for pawn moves onto the
/// last rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    #[inline]
    pub const fn with_promotion(mut self, promotion: Option<PieceKind>) -> Self {
        self.promotion = promotion;
        self
    }
}

/// Long algebraic form, e.g. `e2e4` or `a7a8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.fen_char())?;
        }
        Ok(())
    }
}

/// One entry of a legal-move enumeration. Promotions appear once per
/// promotion kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMove {
    pub color: Color,
    pub piece: PieceKind,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub san: String,
}

impl LegalMove {
    #[inline]
    pub fn as_move(&self) -> Move {
        Move::new(self.from, self.to).with_promotion(self.promotion)
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// What the rules engine reports about a move it has applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub color: Color,
    pub piece: PieceKind,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub san: String,
}

#[derive(Debug, Clone)]
pub enum PlayOutcome<P> {
    Played(P, MoveResult),
    /// Origin and destination match a pawn promotion but no kind was given.
    NeedsPromotion,
    Illegal,
}

pub trait ChessPosition: Clone + fmt::Debug {
    /// Fresh position from the standard setup, or from `fen` when given.
    fn setup(fen: Option<&str>) -> RulesResult<Self>;

    fn turn(&self) -> Color;

    /// Legal moves for the side to move, optionally only those starting on
    /// `from`.
    fn legal_moves(&self, from: Option<Square>) -> RulesResult<Vec<LegalMove>>;

    fn play(&self, mv: &Move) -> RulesResult<PlayOutcome<Self>>;

    fn is_check(&self) -> RulesResult<bool>;
    fn is_checkmate(&self) -> RulesResult<bool>;
    fn is_stalemate(&self) -> RulesResult<bool>;

    /// Any drawn state: stalemate or one of the automatic draw rules.
    fn is_draw(&self) -> RulesResult<bool> {
        Ok(self.is_stalemate()?
            || self.is_threefold_repetition()?
            || self.is_insufficient_material()?
            || self.is_fifty_move_draw()?)
    }

    fn is_threefold_repetition(&self) -> RulesResult<bool>;
    fn is_insufficient_material(&self) -> RulesResult<bool>;
    fn is_fifty_move_draw(&self) -> RulesResult<bool>;

    /// Full initial setup plus move history in a replayable text form.
    fn serialize(&self) -> RulesResult<String>;

    /// Rebuild a position from `serialize` output.
    fn restore(&self, snapshot: &str) -> RulesResult<Self>;

    fn unit_at(&self, square: Square) -> Option<(Color, PieceKind)>;
    fn king_square(&self, color: Color) -> Option<Square>;
    fn fen(&self) -> String;

    /// Number of moves played since the initial setup.
    fn ply_count(&self) -> usize;
}
