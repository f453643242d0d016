//! Automatic draw conditions that do not depend on move generation.

use crate::game_state::chess_rules::{FIFTY_MOVE_HALFMOVES, REPETITION_DRAW_COUNT};
use crate::game_state::{chess_types::*, game_state::GameState};

const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

#[inline]
pub fn is_fifty_move_draw(game_state: &GameState) -> bool {
    game_state.halfmove_clock >= FIFTY_MOVE_HALFMOVES
}

/// True when the last key in `keys` occurs at least three times.
pub fn is_threefold_repetition(keys: &[u64]) -> bool {
    let Some(current) = keys.last() else {
        return false;
    };
    keys.iter().filter(|k| *k == current).count() >= REPETITION_DRAW_COUNT
}

/// Neither side can possibly deliver mate: bare kings, a single minor piece,
/// or any number of bishops that all stand on one square color.
pub fn is_insufficient_material(game_state: &GameState) -> bool {
    let heavy_or_pawn = [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen];
    let any_heavy = Color::BOTH.iter().any(|color| {
        heavy_or_pawn
            .iter()
            .any(|piece| game_state.pieces[color.index()][piece.index()] != 0)
    });
    if any_heavy {
        return false;
    }

    let knights: u32 = Color::BOTH.iter().map(|c| game_state.count(*c, PieceKind::Knight)).sum();
    let bishops_bb = game_state.pieces[Color::Light.index()][PieceKind::Bishop.index()]
        | game_state.pieces[Color::Dark.index()][PieceKind::Bishop.index()];
    let bishops = bishops_bb.count_ones();

    match (knights, bishops) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (0, _) => bishops_bb & LIGHT_SQUARES == 0 || bishops_bb & !LIGHT_SQUARES == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_fifty_move_draw, is_insufficient_material, is_threefold_repetition};
    use crate::game_state::game_state::GameState;

    fn game(fen: &str) -> GameState {
        GameState::from_fen(fen).expect("FEN should parse")
    }

    #[test]
    fn minor_piece_endings_are_dead() {
        assert!(is_insufficient_material(&game("4k3/8/8/8/8/8/8/4K3 w - - 0 1")));
        assert!(is_insufficient_material(&game("4k3/8/8/8/8/8/8/4KN2 w - - 0 1")));
        assert!(is_insufficient_material(&game("4k3/8/8/8/8/8/8/4KB2 w - - 0 1")));
        // Bishops on f1 and c8 both stand on light squares.
        assert!(is_insufficient_material(&game("2b1k3/8/8/8/8/8/8/4KB2 w - - 0 1")));
    }

    #[test]
    fn mating_material_is_sufficient() {
        assert!(!is_insufficient_material(&game("4k3/8/8/8/8/8/8/4KBB1 w - - 0 1")));
        assert!(!is_insufficient_material(&game("4k3/8/8/8/8/8/8/3NKB2 w - - 0 1")));
        assert!(!is_insufficient_material(&game("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")));
        assert!(!is_insufficient_material(&GameState::new_game()));
    }

    #[test]
    fn fifty_move_rule_triggers_at_one_hundred_halfmoves() {
        assert!(!is_fifty_move_draw(&game("4k3/8/8/8/8/8/8/R3K3 w - - 99 80")));
        assert!(is_fifty_move_draw(&game("4k3/8/8/8/8/8/8/R3K3 w - - 100 80")));
    }

    #[test]
    fn repetition_counts_the_latest_key() {
        assert!(!is_threefold_repetition(&[]));
        assert!(!is_threefold_repetition(&[1, 2, 1, 2]));
        assert!(is_threefold_repetition(&[1, 2, 1, 2, 1]));
    }
}
