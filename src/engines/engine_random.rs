//! Uniform random mover.
//!
//! Picks among distinct origin/destination pairs so a promoting pawn is not
//! four times as likely to be chosen as any other move, then applies the
//! configured default promotion.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::engine_trait::{Mover, MoverOutput};
use crate::errors::MoverError;
use crate::game_state::chess_types::PieceKind;
use crate::rules::position::{LegalMove, Move};

pub struct RandomMover {
    rng: StdRng,
    default_promotion: PieceKind,
}

impl RandomMover {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Reproducible move sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            default_promotion: PieceKind::Queen,
        }
    }

    pub fn with_default_promotion(mut self, promotion: PieceKind) -> Self {
        self.default_promotion = promotion;
        self
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        Self::new()
    }
}

impl Mover for RandomMover {
    fn name(&self) -> &str {
        "Random Mover"
    }

    fn choose_move(&mut self, legal_moves: &[LegalMove]) -> Result<MoverOutput, MoverError> {
        let mut out = MoverOutput::default();

        let mut pairs: Vec<Move> = Vec::with_capacity(legal_moves.len());
        for legal in legal_moves {
            let mv = Move::new(legal.from, legal.to);
            if !pairs.contains(&mv) {
                pairs.push(mv);
            }
        }
        out.info_lines
            .push(format!("random mover: {} distinct moves", pairs.len()));

        let Some(picked) = pairs.choose(&mut self.rng).copied() else {
            return Ok(out);
        };

        let promotes = legal_moves
            .iter()
            .any(|l| l.from == picked.from && l.to == picked.to && l.promotion.is_some());
        let promotion = if promotes {
            let wanted = legal_moves
                .iter()
                .any(|l| l.from == picked.from && l.to == picked.to && l.promotion == Some(self.default_promotion));
            if !wanted {
                return Err(MoverError::Failed(format!(
                    "default promotion {:?} unavailable for {picked}",
                    self.default_promotion
                )));
            }
            Some(self.default_promotion)
        } else {
            None
        };

        out.best_move = Some(picked.with_promotion(promotion));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::RandomMover;
    use crate::engines::engine_trait::{DrawResponse, Mover};
    use crate::game_state::chess_types::PieceKind;
    use crate::rules::position::ChessPosition;
    use crate::rules::standard::StandardPosition;

    #[test]
    fn picks_a_legal_move() {
        let position = StandardPosition::new_game();
        let legal = position.legal_moves(None).expect("generation should succeed");
        let mut mover = RandomMover::seeded(7);
        let mv = mover
            .choose_move(&legal)
            .expect("mover should succeed")
            .best_move
            .expect("start position has moves");
        assert!(legal.iter().any(|l| l.as_move() == mv));
    }

    #[test]
    fn same_seed_same_choice() {
        let legal = StandardPosition::new_game().legal_moves(None).expect("generation");
        let a = RandomMover::seeded(42).choose_move(&legal).expect("mover a").best_move;
        let b = RandomMover::seeded(42).choose_move(&legal).expect("mover b").best_move;
        assert_eq!(a, b);
    }

    #[test]
    fn promotes_with_the_default_kind() {
        let position = StandardPosition::from_fen("7k/P7/7K/8/8/8/8/8 w - - 0 1").expect("FEN should parse");
        let legal: Vec<_> = position
            .legal_moves(Some(48))
            .expect("generation should succeed");
        assert_eq!(legal.len(), 4);
        let mut mover = RandomMover::seeded(1).with_default_promotion(PieceKind::Rook);
        let mv = mover.choose_move(&legal).expect("mover").best_move.expect("a move");
        assert_eq!(mv.promotion, Some(PieceKind::Rook));
    }

    #[test]
    fn no_moves_means_no_choice_and_draws_are_declined() {
        let mut mover = RandomMover::seeded(3);
        assert_eq!(mover.choose_move(&[]).expect("mover").best_move, None);
        assert_eq!(mover.respond_to_draw(), DrawResponse::Reject);
    }
}
