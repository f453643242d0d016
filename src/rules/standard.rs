//! Standard chess implementation of [`ChessPosition`] over bitboards.

use crate::errors::{RulesError, RulesResult};
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_checks::{is_king_in_check, king_square};
use crate::move_generation::legal_move_generator::{generate_legal_moves, has_legal_move, GeneratedMove};
use crate::rules::draw_rules;
use crate::rules::position::{ChessPosition, LegalMove, Move, MoveResult, PlayOutcome};
use crate::rules::san::{move_to_san, san_to_move};
use crate::rules::zobrist::compute_zobrist_key;
use crate::utils::long_algebraic::long_algebraic_to_move;
use crate::utils::pgn::{read_pgn, write_pgn, RESULT_UNDECIDED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardPosition {
    initial: GameState,
    current: GameState,
    history: Vec<MoveResult>,
    // One key per reached position, starting with the initial one.
    repetition_keys: Vec<u64>,
}

impl Default for StandardPosition {
    fn default() -> Self {
        Self::from_state(GameState::new_game())
    }
}

impl StandardPosition {
    pub fn new_game() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> RulesResult<Self> {
        Ok(Self::from_state(GameState::from_fen(fen)?))
    }

    fn from_state(state: GameState) -> Self {
        let key = compute_zobrist_key(&state);
        Self {
            initial: state.clone(),
            current: state,
            history: Vec::new(),
            repetition_keys: vec![key],
        }
    }

    #[inline]
    pub fn game_state(&self) -> &GameState {
        &self.current
    }

    #[inline]
    pub fn initial_state(&self) -> &GameState {
        &self.initial
    }

    #[inline]
    pub fn history(&self) -> &[MoveResult] {
        &self.history
    }

    /// Set-up FEN when the game did not begin from the standard position.
    pub fn setup_fen(&self) -> Option<String> {
        let fen = self.initial.get_fen();
        (fen != STARTING_POSITION_FEN).then_some(fen)
    }

    /// SAN list of the moves played so far.
    pub fn san_history(&self) -> Vec<String> {
        self.history.iter().map(|r| r.san.clone()).collect()
    }

    /// PGN with caller-supplied headers, used for match export.
    pub fn to_pgn(&self, headers: &[(String, String)]) -> String {
        write_pgn(
            headers,
            &self.san_history(),
            self.initial.fullmove_number,
            self.initial.side_to_move == Color::Dark,
        )
    }

    fn successor(&self, generated: &GeneratedMove, siblings: &[GeneratedMove]) -> RulesResult<(Self, MoveResult)> {
        let desc = &generated.move_description;
        let result = MoveResult {
            color: self.current.side_to_move,
            piece: desc.moved,
            from: desc.from,
            to: desc.to,
            captured: desc.captured,
            promotion: desc.promotion,
            san: move_to_san(generated, siblings)?,
        };

        let mut next = self.clone();
        next.current = generated.game_after_move.clone();
        next.history.push(result.clone());
        next.repetition_keys.push(compute_zobrist_key(&next.current));
        Ok((next, result))
    }

    /// Apply one PGN token, accepting SAN or long algebraic.
    fn play_token(&self, token: &str) -> RulesResult<Self> {
        let legal = generate_legal_moves(&self.current)?;
        let generated = match san_to_move(token, &legal) {
            Ok(generated) => generated,
            Err(_) => {
                let mv = long_algebraic_to_move(token)
                    .map_err(|_| RulesError::IllegalMove(token.to_owned()))?;
                legal
                    .iter()
                    .find(|g| {
                        let d = &g.move_description;
                        d.from == mv.from && d.to == mv.to && d.promotion == mv.promotion
                    })
                    .ok_or_else(|| RulesError::IllegalMove(token.to_owned()))?
            }
        };
        Ok(self.successor(generated, &legal)?.0)
    }
}

impl ChessPosition for StandardPosition {
    fn setup(fen: Option<&str>) -> RulesResult<Self> {
        match fen {
            Some(fen) => Self::from_fen(fen),
            None => Ok(Self::new_game()),
        }
    }

    #[inline]
    fn turn(&self) -> Color {
        self.current.side_to_move
    }

    fn legal_moves(&self, from: Option<Square>) -> RulesResult<Vec<LegalMove>> {
        let legal = generate_legal_moves(&self.current)?;
        legal
            .iter()
            .filter(|g| from.map_or(true, |sq| g.move_description.from == sq))
            .map(|g| {
                let d = &g.move_description;
                Ok(LegalMove {
                    color: self.current.side_to_move,
                    piece: d.moved,
                    from: d.from,
                    to: d.to,
                    captured: d.captured,
                    promotion: d.promotion,
                    san: move_to_san(g, &legal)?,
                })
            })
            .collect()
    }

    fn play(&self, mv: &Move) -> RulesResult<PlayOutcome<Self>> {
        let legal = generate_legal_moves(&self.current)?;
        let candidates: Vec<&GeneratedMove> = legal
            .iter()
            .filter(|g| g.move_description.from == mv.from && g.move_description.to == mv.to)
            .collect();

        let Some(first) = candidates.first() else {
            return Ok(PlayOutcome::Illegal);
        };
        let is_promotion = first.move_description.promotion.is_some();

        let chosen = match (is_promotion, mv.promotion) {
            (true, None) => return Ok(PlayOutcome::NeedsPromotion),
            (true, Some(kind)) => candidates
                .iter()
                .find(|g| g.move_description.promotion == Some(kind))
                .copied(),
            (false, None) => Some(*first),
            (false, Some(_)) => None,
        };

        match chosen {
            Some(generated) => {
                let (next, result) = self.successor(generated, &legal)?;
                Ok(PlayOutcome::Played(next, result))
            }
            None => Ok(PlayOutcome::Illegal),
        }
    }

    fn is_check(&self) -> RulesResult<bool> {
        Ok(is_king_in_check(&self.current, self.current.side_to_move))
    }

    fn is_checkmate(&self) -> RulesResult<bool> {
        Ok(self.is_check()? && !has_legal_move(&self.current)?)
    }

    fn is_stalemate(&self) -> RulesResult<bool> {
        Ok(!self.is_check()? && !has_legal_move(&self.current)?)
    }

    fn is_threefold_repetition(&self) -> RulesResult<bool> {
        Ok(draw_rules::is_threefold_repetition(&self.repetition_keys))
    }

    fn is_insufficient_material(&self) -> RulesResult<bool> {
        Ok(draw_rules::is_insufficient_material(&self.current))
    }

    fn is_fifty_move_draw(&self) -> RulesResult<bool> {
        Ok(draw_rules::is_fifty_move_draw(&self.current))
    }

    fn serialize(&self) -> RulesResult<String> {
        let mut headers = vec![("Result".to_owned(), RESULT_UNDECIDED.to_owned())];
        if let Some(fen) = self.setup_fen() {
            headers.push(("SetUp".to_owned(), "1".to_owned()));
            headers.push(("FEN".to_owned(), fen));
        }
        Ok(self.to_pgn(&headers))
    }

    fn restore(&self, snapshot: &str) -> RulesResult<Self> {
        let game = read_pgn(snapshot)?;
        let mut position = match game.setup_fen() {
            Some(fen) => Self::from_fen(fen)?,
            None => Self::new_game(),
        };
        for token in &game.moves {
            position = position.play_token(token)?;
        }
        Ok(position)
    }

    #[inline]
    fn unit_at(&self, square: Square) -> Option<(Color, PieceKind)> {
        if square > 63 {
            return None;
        }
        self.current.piece_on(square)
    }

    #[inline]
    fn king_square(&self, color: Color) -> Option<Square> {
        king_square(&self.current, color)
    }

    #[inline]
    fn fen(&self) -> String {
        self.current.get_fen()
    }

    #[inline]
    fn ply_count(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::StandardPosition;
    use crate::game_state::chess_types::{Color, PieceKind};
    use crate::rules::position::{ChessPosition, Move, PlayOutcome};
    use crate::utils::long_algebraic::long_algebraic_to_move;

    fn play_lan(position: &StandardPosition, lan: &str) -> StandardPosition {
        let mv = long_algebraic_to_move(lan).expect("LAN should parse");
        match position.play(&mv).expect("play should not fail") {
            PlayOutcome::Played(next, _) => next,
            other => panic!("{lan} should be legal, got {other:?}"),
        }
    }

    #[test]
    fn play_returns_new_position_and_keeps_receiver() {
        let start = StandardPosition::new_game();
        let next = play_lan(&start, "e2e4");
        assert_eq!(start.ply_count(), 0);
        assert_eq!(next.ply_count(), 1);
        assert_eq!(next.turn(), Color::Dark);
        assert_eq!(next.history()[0].san, "e4");
        assert_eq!(start.turn(), Color::Light);
    }

    #[test]
    fn promotion_requires_a_choice() {
        let position = StandardPosition::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let bare = Move::new(48, 56);
        assert!(matches!(position.play(&bare), Ok(PlayOutcome::NeedsPromotion)));

        let knight = bare.with_promotion(Some(PieceKind::Knight));
        match position.play(&knight).expect("play should not fail") {
            PlayOutcome::Played(next, result) => {
                assert_eq!(result.promotion, Some(PieceKind::Knight));
                assert_eq!(next.unit_at(56), Some((Color::Light, PieceKind::Knight)));
            }
            other => panic!("promotion should be played, got {other:?}"),
        }
    }

    #[test]
    fn promotion_on_ordinary_move_is_illegal() {
        let start = StandardPosition::new_game();
        let mv = Move::new(12, 28).with_promotion(Some(PieceKind::Queen));
        assert!(matches!(start.play(&mv), Ok(PlayOutcome::Illegal)));
    }

    #[test]
    fn legal_moves_can_be_scoped_to_an_origin() {
        let start = StandardPosition::new_game();
        let knight = start.legal_moves(Some(6)).expect("generation should succeed");
        assert_eq!(knight.len(), 2);
        assert!(knight.iter().all(|m| m.piece == PieceKind::Knight));
        assert_eq!(start.legal_moves(None).expect("generation").len(), 20);
        assert!(start.legal_moves(Some(28)).expect("generation").is_empty());
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut position = StandardPosition::new_game();
        for lan in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            position = play_lan(&position, lan);
        }
        assert!(position.is_check().expect("query"));
        assert!(position.is_checkmate().expect("query"));
        assert!(!position.is_stalemate().expect("query"));
        assert_eq!(position.history()[3].san, "Qh4#");
    }

    #[test]
    fn knight_shuffle_reaches_threefold_repetition() {
        let mut position = StandardPosition::new_game();
        for lan in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
            assert!(!position.is_threefold_repetition().expect("query"));
            position = play_lan(&position, lan);
        }
        assert!(position.is_threefold_repetition().expect("query"));
        assert!(position.is_draw().expect("query"));
    }

    #[test]
    fn stalemate_counts_as_draw() {
        let position = StandardPosition::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert!(position.is_stalemate().expect("query"));
        assert!(position.is_draw().expect("query"));
        assert!(!position.is_checkmate().expect("query"));
    }

    #[test]
    fn serialize_restore_reproduces_position_and_history() {
        let mut position = StandardPosition::new_game();
        for lan in ["e2e4", "d7d5", "e4d5", "g8f6", "f1b5", "c7c6", "d5c6", "d8d7", "c6b7", "d7b5", "b7a8q"] {
            position = play_lan(&position, lan);
        }
        let snapshot = position.serialize().expect("serialize");
        let restored = position.restore(&snapshot).expect("restore");

        assert_eq!(restored.fen(), position.fen());
        assert_eq!(restored.history(), position.history());
        assert_eq!(restored, position);
    }

    #[test]
    fn restore_keeps_custom_setup() {
        let position = StandardPosition::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 3 20").expect("FEN should parse");
        let next = play_lan(&position, "e8d7");
        let restored = next.restore(&next.serialize().expect("serialize")).expect("restore");
        assert_eq!(restored.fen(), next.fen());
        assert_eq!(restored.initial_state(), position.initial_state());
    }

    #[test]
    fn restore_rejects_garbage() {
        let position = StandardPosition::new_game();
        assert!(position.restore("1. e5 *").is_err());
    }
}
