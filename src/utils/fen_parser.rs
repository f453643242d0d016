//! FEN-to-GameState parser.

use crate::errors::{RulesError, RulesResult};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::utils::algebraic::algebraic_to_square;

fn invalid(reason: impl Into<String>) -> RulesError {
    RulesError::InvalidFen(reason.into())
}

/// Parses a six-field FEN. The two clock fields may be omitted and default
/// to `0 1`, as many position sources drop them.
pub fn parse_fen(fen: &str) -> RulesResult<GameState> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if !(4..=6).contains(&fields.len()) {
        return Err(invalid(format!("expected 4 to 6 fields, got {}", fields.len())));
    }

    let mut game_state = GameState::new_empty();
    parse_board(fields[0], &mut game_state)?;
    game_state.side_to_move = match fields[1] {
        "w" => Color::Light,
        "b" => Color::Dark,
        other => return Err(invalid(format!("side to move '{other}'"))),
    };
    game_state.castling_rights = parse_castling_rights(fields[2])?;
    game_state.en_passant_square = match fields[3] {
        "-" => None,
        square => Some(algebraic_to_square(square).map_err(|_| invalid(format!("en passant '{square}'")))?),
    };
    game_state.halfmove_clock = parse_counter(fields.get(4).copied().unwrap_or("0"), "halfmove clock")?;
    game_state.fullmove_number = parse_counter(fields.get(5).copied().unwrap_or("1"), "fullmove number")?.max(1);
    game_state.ply = (game_state.fullmove_number - 1)
        .checked_mul(2)
        .and_then(|ply| ply.checked_add(u16::from(game_state.side_to_move == Color::Dark)))
        .ok_or_else(|| invalid(format!("fullmove number {} out of range", game_state.fullmove_number)))?;

    game_state.recalc_occupancy();
    validate_kings(&game_state)?;
    validate_pawns(&game_state)?;

    Ok(game_state)
}

fn parse_board(board_part: &str, game_state: &mut GameState) -> RulesResult<()> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(step) = ch.to_digit(10) {
                if !(1..=8).contains(&step) {
                    return Err(invalid(format!("empty-square count '{ch}'")));
                }
                file += step as usize;
                continue;
            }

            let piece = PieceKind::from_fen_char(ch).ok_or_else(|| invalid(format!("piece character '{ch}'")))?;
            let color = if ch.is_ascii_uppercase() { Color::Light } else { Color::Dark };
            if file >= 8 {
                return Err(invalid(format!("rank {} has too many files", board_rank + 1)));
            }
            game_state.pieces[color.index()][piece.index()] |= 1u64 << (board_rank * 8 + file);
            file += 1;
        }

        if file != 8 {
            return Err(invalid(format!("rank {} does not sum to 8 files", board_rank + 1)));
        }
    }

    Ok(())
}

fn parse_castling_rights(castling_part: &str) -> RulesResult<CastlingRights> {
    if castling_part == "-" {
        return Ok(0);
    }

    castling_part.chars().try_fold(0, |rights, ch| {
        let bit = match ch {
            'K' => CASTLE_LIGHT_KINGSIDE,
            'Q' => CASTLE_LIGHT_QUEENSIDE,
            'k' => CASTLE_DARK_KINGSIDE,
            'q' => CASTLE_DARK_QUEENSIDE,
            _ => return Err(invalid(format!("castling character '{ch}'"))),
        };
        Ok(rights | bit)
    })
}

fn parse_counter(field: &str, name: &str) -> RulesResult<u16> {
    field
        .parse::<u16>()
        .map_err(|_| invalid(format!("{name} '{field}'")))
}

fn validate_kings(game_state: &GameState) -> RulesResult<()> {
    for color in Color::BOTH {
        let kings = game_state.count(color, PieceKind::King);
        if kings != 1 {
            return Err(invalid(format!("{color} has {kings} kings")));
        }
    }
    Ok(())
}

const BACK_RANKS: u64 = 0xFF00_0000_0000_00FF;

fn validate_pawns(game_state: &GameState) -> RulesResult<()> {
    for color in Color::BOTH {
        if game_state.pieces[color.index()][PieceKind::Pawn.index()] & BACK_RANKS != 0 {
            return Err(invalid(format!("{color} has a pawn on the first or eighth rank")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{Color, CASTLE_DARK_KINGSIDE, CASTLE_DARK_QUEENSIDE};

    #[test]
    fn parses_starting_position() {
        let game_state = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        assert_eq!(game_state.side_to_move, Color::Light);
        assert_eq!(game_state.fullmove_number, 1);
        assert_eq!(game_state.halfmove_clock, 0);
        assert_eq!(game_state.occupancy_all.count_ones(), 32);
    }

    #[test]
    fn parses_mid_game_fields() {
        let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 b kq - 4 6";
        let game_state = parse_fen(fen).expect("FEN should parse");
        assert_eq!(game_state.side_to_move, Color::Dark);
        assert_eq!(game_state.castling_rights, CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE);
        assert_eq!(game_state.halfmove_clock, 4);
        assert_eq!(game_state.ply, 11);
    }

    #[test]
    fn clock_fields_are_optional() {
        let game_state = parse_fen("4k3/8/8/8/8/8/8/4K3 w - -").expect("short FEN should parse");
        assert_eq!(game_state.fullmove_number, 1);
    }

    #[test]
    fn rejects_malformed_layouts() {
        assert!(parse_fen("8/8/8 w - - 0 1").is_err());
        assert!(parse_fen("4k3/8/8/8/8/8/8/4K2 w - - 0 1").is_err());
        assert!(parse_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn rejects_pawns_on_back_ranks() {
        assert!(parse_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
        assert!(parse_fen("4k3/8/8/8/8/8/8/p3K3 b - - 0 1").is_err());
        assert!(parse_fen("4k3/P7/8/8/8/8/p7/4K3 w - - 0 1").is_ok());
    }

    #[test]
    fn rejects_fullmove_numbers_past_the_ply_range() {
        assert!(parse_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 40000").is_err());
        let game_state = parse_fen("4k3/8/8/8/8/8/8/4K2R b - - 0 32768").expect("largest fullmove should parse");
        assert_eq!(game_state.ply, u16::MAX);
    }
}
