//! Fully-resolved move descriptions produced by move generation.
//!
//! A `MoveDescription` carries everything `apply_move` needs (moved and
//! captured kinds, promotion, special-move flags) so application never has
//! to re-derive them from the board.

use crate::game_state::chess_types::{PieceKind, Square};

pub type MoveFlags = u8;

pub const FLAG_CAPTURE: MoveFlags = 1 << 0;
pub const FLAG_DOUBLE_PAWN_PUSH: MoveFlags = 1 << 1;
pub const FLAG_EN_PASSANT: MoveFlags = 1 << 2;
pub const FLAG_CASTLING: MoveFlags = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveDescription {
    pub from: Square,
    pub to: Square,
    pub moved: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub flags: MoveFlags,
}

impl MoveDescription {
    #[inline]
    pub const fn quiet(from: Square, to: Square, moved: PieceKind) -> Self {
        Self {
            from,
            to,
            moved,
            captured: None,
            promotion: None,
            flags: 0,
        }
    }

    #[inline]
    pub const fn with_capture(mut self, captured: Option<PieceKind>) -> Self {
        if captured.is_some() {
            self.captured = captured;
            self.flags |= FLAG_CAPTURE;
        }
        self
    }

    #[inline]
    pub const fn with_promotion(mut self, promotion: PieceKind) -> Self {
        self.promotion = Some(promotion);
        self
    }

    #[inline]
    pub const fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.flags & FLAG_CAPTURE != 0
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        self.flags & FLAG_EN_PASSANT != 0
    }

    #[inline]
    pub const fn is_castling(&self) -> bool {
        self.flags & FLAG_CASTLING != 0
    }

    #[inline]
    pub const fn is_double_pawn_push(&self) -> bool {
        self.flags & FLAG_DOUBLE_PAWN_PUSH != 0
    }
}
