//! Crate root module declarations for the Plum chess session controller.
//!
//! The bitboard rules engine (game state, attack tables, move generation)
//! sits underneath `rules`, which exposes it through the `ChessPosition`
//! contract. `session` is the match controller built on that contract, and
//! `console` is the terminal front-end the binary runs.

pub mod config;
pub mod errors;
pub mod logging;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
}

pub mod moves {
    pub mod leaper_attacks;
    pub mod move_descriptions;
    pub mod slider_attacks;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
    pub mod pseudo_moves;
}

pub mod rules {
    pub mod draw_rules;
    pub mod position;
    pub mod san;
    pub mod standard;
    pub mod zobrist;
}

pub mod engines {
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod session {
    pub mod clock;
    pub mod controller;
    pub mod draw;
    pub mod driver;
    pub mod highlights;
    pub mod notifications;
    pub mod outcome;
    pub mod pipeline;
    pub mod types;
}

pub mod console {
    pub mod console_loop;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod pgn;
    pub mod render_game_state;
}
