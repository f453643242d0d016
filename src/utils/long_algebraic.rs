use crate::errors::{RulesError, RulesResult};
use crate::game_state::chess_types::PieceKind;
use crate::rules::position::Move;
use crate::utils::algebraic::algebraic_to_square;

/// Parse `e2e4` or `a7a8q` (promotion letter in either case).
pub fn long_algebraic_to_move(text: &str) -> RulesResult<Move> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(RulesError::InvalidNotation(text.to_owned()));
    }

    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(ch) => Some(
            PieceKind::from_fen_char(ch)
                .filter(|kind| kind.is_promotion_target())
                .ok_or_else(|| RulesError::InvalidNotation(text.to_owned()))?,
        ),
    };

    Ok(Move::new(from, to).with_promotion(promotion))
}

/// True when `text` has the shape of a long algebraic move.
pub fn looks_like_long_algebraic(text: &str) -> bool {
    long_algebraic_to_move(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::{long_algebraic_to_move, looks_like_long_algebraic};
    use crate::game_state::chess_types::PieceKind;

    #[test]
    fn parses_plain_and_promotion_moves() {
        let mv = long_algebraic_to_move("e2e4").expect("e2e4 should parse");
        assert_eq!((mv.from, mv.to, mv.promotion), (12, 28, None));

        let promo = long_algebraic_to_move("a7a8Q").expect("a7a8Q should parse");
        assert_eq!(promo.promotion, Some(PieceKind::Queen));
        assert_eq!(promo.to_string(), "a7a8q");
    }

    #[test]
    fn rejects_san_and_bad_promotions() {
        assert!(!looks_like_long_algebraic("Nf3"));
        assert!(!looks_like_long_algebraic("e4"));
        assert!(long_algebraic_to_move("e7e8k").is_err());
        assert!(long_algebraic_to_move("e7e8x").is_err());
    }
}
