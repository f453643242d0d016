//! Terminal board renderer for the console front-end.
//!
//! Each square is a glyph followed by a one-character highlight marker, so a
//! plain terminal can still show selection, destinations and check.

use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::rules::position::ChessPosition;
use crate::session::highlights::{HighlightMap, HighlightTag};

/// Render `position` with `orientation` at the bottom.
pub fn render_board<P: ChessPosition>(position: &P, orientation: Color, highlights: &HighlightMap) -> String {
    let (ranks, files): (Vec<u8>, Vec<u8>) = match orientation {
        Color::Light => ((0..8).rev().collect(), (0..8).collect()),
        Color::Dark => ((0..8).collect(), (0..8).rev().collect()),
    };
    let file_row: String = files
        .iter()
        .map(|f| format!("{} ", char::from(b'a' + f)))
        .collect();

    let mut out = String::new();
    out.push_str(&format!("   {}\n", file_row.trim_end()));
    for &rank in &ranks {
        let label = char::from(b'1' + rank);
        out.push(label);
        out.push_str("  ");
        for &file in &files {
            let square: Square = rank * 8 + file;
            out.push(match position.unit_at(square) {
                Some((color, kind)) => glyph(color, kind),
                None => '·',
            });
            out.push(marker(highlights.get(&square)));
        }
        out.push(' ');
        out.push(label);
        out.push('\n');
    }
    out.push_str(&format!("   {}", file_row.trim_end()));
    out
}

fn marker(tag: Option<&HighlightTag>) -> char {
    match tag {
        None => ' ',
        Some(HighlightTag::LastMove) => '\'',
        Some(HighlightTag::LegalDestination { capture: false }) => '+',
        Some(HighlightTag::LegalDestination { capture: true }) => 'x',
        Some(HighlightTag::SelectedOrigin) => '*',
        Some(HighlightTag::Check) => '!',
    }
}

pub fn glyph(color: Color, kind: PieceKind) -> char {
    match (color, kind) {
        (Color::Light, PieceKind::Pawn) => '♙',
        (Color::Light, PieceKind::Knight) => '♘',
        (Color::Light, PieceKind::Bishop) => '♗',
        (Color::Light, PieceKind::Rook) => '♖',
        (Color::Light, PieceKind::Queen) => '♕',
        (Color::Light, PieceKind::King) => '♔',
        (Color::Dark, PieceKind::Pawn) => '♟',
        (Color::Dark, PieceKind::Knight) => '♞',
        (Color::Dark, PieceKind::Bishop) => '♝',
        (Color::Dark, PieceKind::Rook) => '♜',
        (Color::Dark, PieceKind::Queen) => '♛',
        (Color::Dark, PieceKind::King) => '♚',
    }
}
