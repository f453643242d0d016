//! Standard algebraic notation (SAN) for generated moves.
//!
//! Parsing works by generating SAN for every legal move and matching, which
//! keeps reading and writing consistent by construction.

use crate::errors::{RulesError, RulesResult};
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::{has_legal_move, GeneratedMove};
use crate::utils::algebraic::{file_char, rank_char, square_name};

/// SAN for `mv`, disambiguated against the other legal moves in `siblings`.
pub fn move_to_san(mv: &GeneratedMove, siblings: &[GeneratedMove]) -> RulesResult<String> {
    let desc = &mv.move_description;
    let mut out = String::with_capacity(8);

    if desc.is_castling() {
        out.push_str(if square_file(desc.to) == 6 { "O-O" } else { "O-O-O" });
    } else {
        match desc.moved.san_letter() {
            None => {
                if desc.is_capture() {
                    out.push(file_char(desc.from));
                }
            }
            Some(letter) => {
                out.push(letter);
                out.push_str(&disambiguation(mv, siblings));
            }
        }
        if desc.is_capture() {
            out.push('x');
        }
        out.push_str(&square_name(desc.to));
        if let Some(promo) = desc.promotion {
            out.push('=');
            out.push(promo.san_letter().unwrap_or('Q'));
        }
    }

    if mv.gives_check() {
        out.push(if has_legal_move(&mv.game_after_move)? { '+' } else { '#' });
    }
    Ok(out)
}

fn disambiguation(mv: &GeneratedMove, siblings: &[GeneratedMove]) -> String {
    let desc = &mv.move_description;
    let rivals: Vec<Square> = siblings
        .iter()
        .map(|s| &s.move_description)
        .filter(|s| s.moved == desc.moved && s.to == desc.to && s.from != desc.from)
        .map(|s| s.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|sq| square_file(*sq) != square_file(desc.from)) {
        return file_char(desc.from).to_string();
    }
    if rivals.iter().all(|sq| square_rank(*sq) != square_rank(desc.from)) {
        return rank_char(desc.from).to_string();
    }
    square_name(desc.from)
}

/// Strip check marks, annotation glyphs and the `=` of promotions so that
/// `e8Q`, `e8=Q+` and `e8=Q!` all compare equal.
pub fn normalize_san(san: &str) -> String {
    san.trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace("0-0-0", "O-O-O")
        .replace("0-0", "O-O")
        .replace('=', "")
}

/// Find the legal move written as `san`.
pub fn san_to_move<'a>(san: &str, legal: &'a [GeneratedMove]) -> RulesResult<&'a GeneratedMove> {
    let wanted = normalize_san(san);
    for mv in legal {
        if normalize_san(&move_to_san(mv, legal)?) == wanted {
            return Ok(mv);
        }
    }
    Err(RulesError::InvalidNotation(san.to_owned()))
}
