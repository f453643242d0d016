//! Square name conversions (`e4` <-> square index).

use crate::errors::{RulesError, RulesResult};
use crate::game_state::chess_types::Square;

/// Parse a square name such as "e4".
#[inline]
pub fn algebraic_to_square(square: &str) -> RulesResult<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(RulesError::InvalidSquare(square.to_owned()));
    }

    let (file, rank) = (bytes[0].to_ascii_lowercase(), bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(RulesError::InvalidSquare(square.to_owned()));
    }

    Ok((rank - b'1') * 8 + (file - b'a'))
}

#[inline]
pub fn square_to_algebraic(square: Square) -> RulesResult<String> {
    if square > 63 {
        return Err(RulesError::InvalidSquare(format!("index {square}")));
    }
    Ok(square_name(square))
}

/// Name of an in-range square. Out-of-range indices wrap onto the board.
pub fn square_name(square: Square) -> String {
    let square = square & 63;
    let file_char = char::from(b'a' + square % 8);
    let rank_char = char::from(b'1' + square / 8);
    format!("{file_char}{rank_char}")
}

#[inline]
pub fn file_char(square: Square) -> char {
    char::from(b'a' + (square & 63) % 8)
}

#[inline]
pub fn rank_char(square: Square) -> char {
    char::from(b'1' + (square & 63) / 8)
}

#[cfg(test)]
mod tests {
    use super::{algebraic_to_square, square_name, square_to_algebraic};

    #[test]
    fn square_names_map_both_ways() {
        assert_eq!(algebraic_to_square("a1").expect("a1 should parse"), 0);
        assert_eq!(algebraic_to_square("h8").expect("h8 should parse"), 63);
        assert_eq!(algebraic_to_square("E4").expect("uppercase file should parse"), 28);
        assert_eq!(square_to_algebraic(63).expect("63 should convert"), "h8");
        assert_eq!(square_name(28), "e4");
    }

    #[test]
    fn rejects_off_board_names() {
        assert!(algebraic_to_square("i1").is_err());
        assert!(algebraic_to_square("a9").is_err());
        assert!(algebraic_to_square("e").is_err());
        assert!(square_to_algebraic(64).is_err());
    }
}
