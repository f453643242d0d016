//! Pseudo-legal move generation for the side to move.
//!
//! Emits every move obeying piece movement rules; moves that leave the own
//! king attacked are filtered later by the legal generator. Castling is the
//! exception: its transit squares are checked here because the filter only
//! sees the king's destination.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::moves::leaper_attacks::{king_attacks, knight_attacks, pawn_attacks};
use crate::moves::move_descriptions::{
    MoveDescription, FLAG_CASTLING, FLAG_DOUBLE_PAWN_PUSH, FLAG_EN_PASSANT,
};
use crate::moves::slider_attacks::{bishop_attacks, queen_attacks, rook_attacks};

pub fn generate_pseudo_moves(game_state: &GameState, out: &mut Vec<MoveDescription>) {
    generate_pawn_moves(game_state, out);
    for piece in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        generate_piece_moves(game_state, piece, out);
    }
    generate_castling_moves(game_state, out);
}

fn piece_targets(piece: PieceKind, from: Square, occupancy: u64) -> u64 {
    match piece {
        PieceKind::Knight => knight_attacks(from),
        PieceKind::Bishop => bishop_attacks(from, occupancy),
        PieceKind::Rook => rook_attacks(from, occupancy),
        PieceKind::Queen => queen_attacks(from, occupancy),
        PieceKind::King => king_attacks(from),
        PieceKind::Pawn => 0,
    }
}

fn generate_piece_moves(game_state: &GameState, piece: PieceKind, out: &mut Vec<MoveDescription>) {
    let side = game_state.side_to_move;
    let own_occ = game_state.occupancy_by_color[side.index()];

    let mut pieces = game_state.pieces[side.index()][piece.index()];
    while pieces != 0 {
        let from = pieces.trailing_zeros() as Square;
        let mut targets = piece_targets(piece, from, game_state.occupancy_all) & !own_occ;

        while targets != 0 {
            let to = targets.trailing_zeros() as Square;
            out.push(
                MoveDescription::quiet(from, to, piece).with_capture(enemy_piece_on(game_state, to)),
            );
            targets &= targets - 1;
        }

        pieces &= pieces - 1;
    }
}

fn generate_pawn_moves(game_state: &GameState, out: &mut Vec<MoveDescription>) {
    let side = game_state.side_to_move;
    let enemy_occ = game_state.occupancy_by_color[side.opposite().index()];
    let empty = !game_state.occupancy_all;
    let (forward, start_rank, promotion_rank): (i8, u8, u8) = match side {
        Color::Light => (8, 1, 7),
        Color::Dark => (-8, 6, 0),
    };

    let mut pawns = game_state.pieces[side.index()][PieceKind::Pawn.index()];
    while pawns != 0 {
        let from = pawns.trailing_zeros() as Square;
        pawns &= pawns - 1;

        let one_step = (from as i8 + forward) as Square;
        if (1u64 << one_step) & empty != 0 {
            push_pawn_move(
                out,
                MoveDescription::quiet(from, one_step, PieceKind::Pawn),
                promotion_rank,
            );

            let two_step = (one_step as i8 + forward) as Square;
            if square_rank(from) == start_rank && (1u64 << two_step) & empty != 0 {
                out.push(
                    MoveDescription::quiet(from, two_step, PieceKind::Pawn)
                        .with_flags(FLAG_DOUBLE_PAWN_PUSH),
                );
            }
        }

        let mut captures = pawn_attacks(side, from) & enemy_occ;
        while captures != 0 {
            let to = captures.trailing_zeros() as Square;
            push_pawn_move(
                out,
                MoveDescription::quiet(from, to, PieceKind::Pawn)
                    .with_capture(enemy_piece_on(game_state, to)),
                promotion_rank,
            );
            captures &= captures - 1;
        }

        if let Some(ep) = game_state.en_passant_square {
            if pawn_attacks(side, from) & (1u64 << ep) != 0 {
                out.push(
                    MoveDescription::quiet(from, ep, PieceKind::Pawn)
                        .with_capture(Some(PieceKind::Pawn))
                        .with_flags(FLAG_EN_PASSANT),
                );
            }
        }
    }
}

fn push_pawn_move(out: &mut Vec<MoveDescription>, mv: MoveDescription, promotion_rank: u8) {
    if square_rank(mv.to) == promotion_rank {
        for promo in PieceKind::PROMOTIONS {
            out.push(mv.with_promotion(promo));
        }
    } else {
        out.push(mv);
    }
}

fn generate_castling_moves(game_state: &GameState, out: &mut Vec<MoveDescription>) {
    let side = game_state.side_to_move;
    let enemy = side.opposite();
    let (king_from, kingside, queenside) = match side {
        Color::Light => (4u8, CASTLE_LIGHT_KINGSIDE, CASTLE_LIGHT_QUEENSIDE),
        Color::Dark => (60u8, CASTLE_DARK_KINGSIDE, CASTLE_DARK_QUEENSIDE),
    };

    let king_bb = game_state.pieces[side.index()][PieceKind::King.index()];
    if king_bb & (1u64 << king_from) == 0 || game_state.castling_rights & (kingside | queenside) == 0
    {
        return;
    }
    // Cannot castle out of check.
    if is_square_attacked(game_state, king_from, enemy) {
        return;
    }

    // (right, must be empty, must not be attacked, king destination)
    let wings = [
        (kingside, [king_from + 1, king_from + 2, 0], 2usize, [king_from + 1, king_from + 2], king_from + 2),
        (queenside, [king_from - 1, king_from - 2, king_from - 3], 3usize, [king_from - 1, king_from - 2], king_from - 2),
    ];

    for (right, between, between_len, transit, to) in wings {
        if game_state.castling_rights & right == 0 {
            continue;
        }
        let blocked = between[..between_len]
            .iter()
            .any(|sq| game_state.occupancy_all & (1u64 << sq) != 0);
        if blocked {
            continue;
        }
        if transit.iter().any(|sq| is_square_attacked(game_state, *sq, enemy)) {
            continue;
        }
        out.push(MoveDescription::quiet(king_from, to, PieceKind::King).with_flags(FLAG_CASTLING));
    }
}

#[inline]
fn enemy_piece_on(game_state: &GameState, square: Square) -> Option<PieceKind> {
    let enemy = game_state.side_to_move.opposite();
    let mask = 1u64 << square;
    PieceKind::ALL
        .into_iter()
        .find(|piece| game_state.pieces[enemy.index()][piece.index()] & mask != 0)
}
