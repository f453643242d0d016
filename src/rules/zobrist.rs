//! Zobrist keys identifying positions for repetition detection.
//!
//! Keys come from a fixed splitmix64 seed so they are identical across runs.

use std::sync::OnceLock;

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::leaper_attacks::pawn_attacks;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    dark_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed: u64 = 0x5EED_C0FF_EE15_F00D;
    let mut next = || splitmix64(&mut seed);

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for key in piece_square.iter_mut().flatten().flatten() {
        *key = next();
    }
    let dark_to_move = next();
    let castling = std::array::from_fn(|_| next());
    let en_passant_file = std::array::from_fn(|_| next());

    ZobristTables {
        piece_square,
        dark_to_move,
        castling,
        en_passant_file,
    }
}

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn compute_zobrist_key(game_state: &GameState) -> u64 {
    let t = tables();
    let mut key = 0u64;

    for color in Color::BOTH {
        for piece in PieceKind::ALL {
            let mut bb = game_state.pieces[color.index()][piece.index()];
            while bb != 0 {
                let sq = bb.trailing_zeros() as usize;
                key ^= t.piece_square[color.index()][piece.index()][sq];
                bb &= bb - 1;
            }
        }
    }

    if game_state.side_to_move == Color::Dark {
        key ^= t.dark_to_move;
    }
    key ^= t.castling[(game_state.castling_rights & 0x0F) as usize];

    // The en passant square only distinguishes positions when a capture on it
    // is actually available.
    if let Some(ep) = game_state.en_passant_square {
        let side = game_state.side_to_move;
        let own_pawns = game_state.pieces[side.index()][PieceKind::Pawn.index()];
        if pawn_attacks(side.opposite(), ep) & own_pawns != 0 {
            key ^= t.en_passant_file[usize::from(square_file(ep))];
        }
    }

    key
}
