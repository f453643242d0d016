//! Full legal move generation pipeline.
//!
//! Generates pseudo-legal candidates, applies each to a cloned successor and
//! drops those that leave the mover's own king attacked. The successor is kept
//! alongside the move so callers never apply the same move twice.

use crate::errors::RulesResult;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::pseudo_moves::generate_pseudo_moves;
use crate::moves::move_descriptions::MoveDescription;

#[derive(Debug, Clone)]
pub struct GeneratedMove {
    pub move_description: MoveDescription,
    pub game_after_move: GameState,
}

impl GeneratedMove {
    /// Whether the move leaves the opponent's king attacked.
    #[inline]
    pub fn gives_check(&self) -> bool {
        is_king_in_check(&self.game_after_move, self.game_after_move.side_to_move)
    }
}

pub fn generate_legal_moves(game_state: &GameState) -> RulesResult<Vec<GeneratedMove>> {
    let mut pseudo = Vec::<MoveDescription>::with_capacity(128);
    generate_pseudo_moves(game_state, &mut pseudo);

    let mut legal = Vec::with_capacity(pseudo.len());
    for mv in pseudo {
        let next = apply_move(game_state, &mv)?;
        if is_king_in_check(&next, game_state.side_to_move) {
            continue;
        }
        legal.push(GeneratedMove {
            move_description: mv,
            game_after_move: next,
        });
    }

    Ok(legal)
}

/// Cheaper than a full generation when only existence matters.
pub fn has_legal_move(game_state: &GameState) -> RulesResult<bool> {
    let mut pseudo = Vec::<MoveDescription>::with_capacity(128);
    generate_pseudo_moves(game_state, &mut pseudo);

    for mv in pseudo {
        let next = apply_move(game_state, &mv)?;
        if !is_king_in_check(&next, game_state.side_to_move) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{generate_legal_moves, has_legal_move};
    use crate::game_state::game_state::GameState;

    #[test]
    fn start_position_has_twenty_moves() {
        let moves = generate_legal_moves(&GameState::new_game()).expect("generation should succeed");
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().all(|m| !m.gives_check()));
    }

    #[test]
    fn pinned_piece_cannot_leave_the_pin_line() {
        // Knight on e2 is pinned against the king by the rook on e8.
        let game = GameState::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").expect("FEN should parse");
        let moves = generate_legal_moves(&game).expect("generation should succeed");
        assert!(moves.iter().all(|m| m.move_description.from != 12));
    }

    #[test]
    fn checkmated_side_has_no_legal_move() {
        let game = GameState::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .expect("FEN should parse");
        assert!(!has_legal_move(&game).expect("generation should succeed"));
    }
}
