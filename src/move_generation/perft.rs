//! Perft node counting used to validate move generation.

use std::thread;

use crate::errors::{RulesError, RulesResult};
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_generator::{generate_legal_moves, has_legal_move, GeneratedMove};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

pub fn perft(game_state: &GameState, depth: u8) -> RulesResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let mut total = PerftCounts::default();
    for mv in generate_legal_moves(game_state)? {
        perft_recurse(&mv, depth, 1, &mut total)?;
    }
    Ok(total)
}

/// Splits the root moves across scoped worker threads.
pub fn perft_multi_threaded(game_state: &GameState, depth: u8) -> RulesResult<PerftCounts> {
    if depth == 0 {
        return perft(game_state, depth);
    }

    let root_moves = generate_legal_moves(game_state)?;
    thread::scope(|scope| {
        let handles: Vec<_> = root_moves
            .iter()
            .map(|mv| {
                scope.spawn(move || {
                    let mut local = PerftCounts::default();
                    perft_recurse(mv, depth, 1, &mut local).map(|_| local)
                })
            })
            .collect();

        let mut total = PerftCounts::default();
        for handle in handles {
            let local = handle
                .join()
                .map_err(|_| RulesError::InconsistentState("perft worker panicked".to_owned()))??;
            total.merge(local);
        }
        Ok(total)
    })
}

fn perft_recurse(
    mv: &GeneratedMove,
    search_depth: u8,
    current_depth: u8,
    counts: &mut PerftCounts,
) -> RulesResult<()> {
    if current_depth == search_depth {
        let desc = &mv.move_description;
        counts.nodes += 1;
        counts.captures += usize::from(desc.is_capture());
        counts.en_passant += usize::from(desc.is_en_passant());
        counts.castles += usize::from(desc.is_castling());
        counts.promotions += usize::from(desc.promotion.is_some());
        if mv.gives_check() {
            counts.checks += 1;
            if !has_legal_move(&mv.game_after_move)? {
                counts.checkmates += 1;
            }
        }
        return Ok(());
    }

    for child in generate_legal_moves(&mv.game_after_move)? {
        perft_recurse(&child, search_depth, current_depth + 1, counts)?;
    }
    Ok(())
}
