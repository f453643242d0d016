//! Successor-state construction.
//!
//! `apply_move` never mutates its input: it clones the position, applies the
//! move and returns the successor. Callers use this to keep every committed
//! snapshot immutable.

use crate::errors::{RulesError, RulesResult};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::move_descriptions::MoveDescription;

/// Rook relocation for each castling king move: (king from, king to, rook from, rook to).
const CASTLING_ROOK_HOPS: [(Square, Square, Square, Square); 4] = [
    (4, 6, 7, 5),
    (4, 2, 0, 3),
    (60, 62, 63, 61),
    (60, 58, 56, 59),
];

/// Squares whose vacancy (or capture) revokes a castling right.
const CASTLING_RIGHT_SQUARES: [(Square, CastlingRights); 6] = [
    (4, CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE),
    (7, CASTLE_LIGHT_KINGSIDE),
    (0, CASTLE_LIGHT_QUEENSIDE),
    (60, CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE),
    (63, CASTLE_DARK_KINGSIDE),
    (56, CASTLE_DARK_QUEENSIDE),
];

pub fn apply_move(game_state: &GameState, mv: &MoveDescription) -> RulesResult<GameState> {
    let mover = game_state.side_to_move;
    let enemy = mover.opposite();
    let from_mask = 1u64 << mv.from;
    let to_mask = 1u64 << mv.to;

    if game_state.pieces[mover.index()][mv.moved.index()] & from_mask == 0 {
        return Err(RulesError::InconsistentState(format!(
            "no {:?} of the side to move on square {}",
            mv.moved, mv.from
        )));
    }

    let mut next = game_state.clone();
    next.pieces[mover.index()][mv.moved.index()] &= !from_mask;

    if mv.is_en_passant() {
        let victim = match mover {
            Color::Light => mv.to.checked_sub(8),
            Color::Dark => mv.to.checked_add(8),
        }
        .ok_or_else(|| RulesError::InconsistentState("en passant off the board".to_string()))?;
        next.pieces[enemy.index()][PieceKind::Pawn.index()] &= !(1u64 << victim);
    } else if mv.is_capture() {
        for bb in next.pieces[enemy.index()].iter_mut() {
            *bb &= !to_mask;
        }
    }

    let placed = mv.promotion.unwrap_or(mv.moved);
    next.pieces[mover.index()][placed.index()] |= to_mask;

    if mv.is_castling() {
        let hop = CASTLING_ROOK_HOPS
            .iter()
            .find(|(king_from, king_to, _, _)| *king_from == mv.from && *king_to == mv.to)
            .ok_or_else(|| {
                RulesError::InconsistentState(format!(
                    "castling flag on non-castling king move {}->{}",
                    mv.from, mv.to
                ))
            })?;
        let rooks = &mut next.pieces[mover.index()][PieceKind::Rook.index()];
        *rooks &= !(1u64 << hop.2);
        *rooks |= 1u64 << hop.3;
    }

    for (square, rights) in CASTLING_RIGHT_SQUARES {
        if square == mv.from || square == mv.to {
            next.castling_rights &= !rights;
        }
    }

    next.en_passant_square = if mv.is_double_pawn_push() {
        Some((mv.from + mv.to) / 2)
    } else {
        None
    };

    if mv.moved == PieceKind::Pawn || mv.is_capture() {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }
    if mover == Color::Dark {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }

    next.side_to_move = enemy;
    next.ply = next.ply.saturating_add(1);
    next.recalc_occupancy();

    Ok(next)
}
