//! Read-only projections of a session for the board surface.
//!
//! Nothing here is stored state: highlights, the history table and the view
//! snapshot are recomputed from the session whenever they are asked for.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::errors::RulesResult;
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::rules::position::ChessPosition;
use crate::session::outcome::MatchOutcome;
use crate::session::types::{DrawOffer, MoveRecord, PendingPromotion};

/// Style tag for one square. When several apply, the strongest wins:
/// check, then selection and destinations, then the last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightTag {
    LastMove,
    LegalDestination { capture: bool },
    SelectedOrigin,
    Check,
}

pub type HighlightMap = BTreeMap<Square, HighlightTag>;

pub fn compute_highlights<P: ChessPosition>(
    position: &P,
    selected: Option<Square>,
    last_move: Option<(Square, Square)>,
) -> RulesResult<HighlightMap> {
    let mut map = HighlightMap::new();

    if let Some((from, to)) = last_move {
        map.insert(from, HighlightTag::LastMove);
        map.insert(to, HighlightTag::LastMove);
    }

    if let Some(origin) = selected {
        for mv in position.legal_moves(Some(origin))? {
            map.insert(
                mv.to,
                HighlightTag::LegalDestination {
                    capture: mv.is_capture(),
                },
            );
        }
        map.insert(origin, HighlightTag::SelectedOrigin);
    }

    if position.is_check()? {
        if let Some(king) = position.king_square(position.turn()) {
            map.insert(king, HighlightTag::Check);
        }
    }

    Ok(map)
}

/// One numbered row of the move list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePair {
    pub number: usize,
    pub white: Option<String>,
    pub black: Option<String>,
}

pub fn history_pairs(history: &[MoveRecord]) -> Vec<MovePair> {
    let mut pairs: Vec<MovePair> = Vec::with_capacity(history.len() / 2 + 1);
    for record in history {
        match (record.color, pairs.last_mut()) {
            (Color::Dark, Some(last)) if last.black.is_none() => {
                last.black = Some(record.san.clone());
            }
            (color, _) => {
                let number = pairs.len() + 1;
                let san = Some(record.san.clone());
                pairs.push(match color {
                    Color::Light => MovePair { number, white: san, black: None },
                    Color::Dark => MovePair { number, white: None, black: san },
                });
            }
        }
    }
    pairs
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockView {
    pub remaining: Duration,
    pub running: bool,
    pub display: String,
}

/// Everything the board surface needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub fen: String,
    pub turn: Color,
    pub orientation: Color,
    pub highlights: HighlightMap,
    pub clocks: [ClockView; 2],
    pub status: String,
    pub outcome: MatchOutcome,
    pub history: Vec<MovePair>,
    pub captured_by_white: Vec<PieceKind>,
    pub captured_by_black: Vec<PieceKind>,
    pub pending_promotion: Option<PendingPromotion>,
    pub draw_offer: Option<DrawOffer>,
    pub can_offer_draw: bool,
    pub can_resign: bool,
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use super::{compute_highlights, history_pairs, HighlightTag};
    use crate::game_state::chess_types::{Color, PieceKind};
    use crate::rules::standard::StandardPosition;
    use crate::session::types::MoveRecord;

    fn record(color: Color, san: &str) -> MoveRecord {
        MoveRecord {
            color,
            san: san.to_owned(),
            piece: PieceKind::Pawn,
            from: 0,
            to: 0,
            captured: None,
            promotion: None,
        }
    }

    #[test]
    fn selection_marks_origin_and_destinations() {
        let position = StandardPosition::new_game();
        let map = compute_highlights(&position, Some(12), None).expect("highlights");
        assert_eq!(map.get(&12), Some(&HighlightTag::SelectedOrigin));
        assert_eq!(map.get(&20), Some(&HighlightTag::LegalDestination { capture: false }));
        assert_eq!(map.get(&28), Some(&HighlightTag::LegalDestination { capture: false }));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn capture_destinations_and_check_are_tagged() {
        // Rook e1 checks the king on e8; the d3 knight can take it or block on e5.
        let position = StandardPosition::from_fen("4k3/8/8/8/8/3n4/8/4RK2 b - - 0 1").expect("FEN should parse");
        let map = compute_highlights(&position, Some(19), Some((13, 5))).expect("highlights");
        assert_eq!(map.get(&60), Some(&HighlightTag::Check));
        assert_eq!(map.get(&19), Some(&HighlightTag::SelectedOrigin));
        assert_eq!(map.get(&4), Some(&HighlightTag::LegalDestination { capture: true }));
        assert_eq!(map.get(&36), Some(&HighlightTag::LegalDestination { capture: false }));
        assert_eq!(map.get(&13), Some(&HighlightTag::LastMove));
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn empty_selection_shows_only_last_move() {
        let position = StandardPosition::new_game();
        let map = compute_highlights(&position, None, Some((12, 28))).expect("highlights");
        assert_eq!(map.len(), 2);
        assert!(map.values().all(|t| *t == HighlightTag::LastMove));
    }

    #[test]
    fn history_groups_into_numbered_pairs() {
        let pairs = history_pairs(&[
            record(Color::Light, "e4"),
            record(Color::Dark, "e5"),
            record(Color::Light, "Nf3"),
        ]);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].white.as_deref(), Some("e4"));
        assert_eq!(pairs[0].black.as_deref(), Some("e5"));
        assert_eq!(pairs[1].number, 2);
        assert_eq!(pairs[1].black, None);

        let from_black = history_pairs(&[record(Color::Dark, "Kd7"), record(Color::Light, "Kd2")]);
        assert_eq!(from_black[0].white, None);
        assert_eq!(from_black[1].white.as_deref(), Some("Kd2"));
    }
}
