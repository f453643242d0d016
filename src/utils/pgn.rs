//! PGN text read/write.
//!
//! This layer only deals in header maps and move tokens; turning tokens into
//! moves is left to the position that replays them.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::errors::{RulesError, RulesResult};

pub const RESULT_UNDECIDED: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnGame {
    pub headers: BTreeMap<String, String>,
    /// Move tokens with move numbers, comments and variations removed.
    pub moves: Vec<String>,
    pub result: String,
}

impl PgnGame {
    /// Set-up FEN, present only when the game did not start from the
    /// standard position.
    pub fn setup_fen(&self) -> Option<&str> {
        match self.headers.get("SetUp").map(String::as_str) {
            Some("1") => self.headers.get("FEN").map(String::as_str),
            _ => None,
        }
    }
}

/// Seven-tag roster in PGN order, followed by any set-up tags.
pub fn standard_headers(
    date: NaiveDate,
    white: &str,
    black: &str,
    result: &str,
    setup_fen: Option<&str>,
) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Event".to_owned(), "Casual Game".to_owned()),
        ("Site".to_owned(), "Local".to_owned()),
        ("Date".to_owned(), date.format("%Y.%m.%d").to_string()),
        ("Round".to_owned(), "-".to_owned()),
        ("White".to_owned(), white.to_owned()),
        ("Black".to_owned(), black.to_owned()),
        ("Result".to_owned(), normalize_result(result).to_owned()),
    ];
    if let Some(fen) = setup_fen {
        headers.push(("SetUp".to_owned(), "1".to_owned()));
        headers.push(("FEN".to_owned(), fen.to_owned()));
    }
    headers
}

/// Write headers and SAN movetext. `first_move_dark` numbers a game whose
/// set-up position has Black to move (`1... e5`).
pub fn write_pgn(
    headers: &[(String, String)],
    sans: &[String],
    first_fullmove: u16,
    first_move_dark: bool,
) -> String {
    let mut out = String::new();
    for (key, value) in headers {
        out.push_str(&format!("[{} \"{}\"]\n", key, value.replace('"', "\\\"")));
    }
    out.push('\n');

    let result = headers
        .iter()
        .find(|(k, _)| k == "Result")
        .map(|(_, v)| normalize_result(v))
        .unwrap_or(RESULT_UNDECIDED);

    let mut parts = Vec::<String>::with_capacity(sans.len() + 1);
    let offset = usize::from(first_move_dark);
    for (idx, san) in sans.iter().enumerate() {
        let ply = idx + offset;
        let number = usize::from(first_fullmove) + ply / 2;
        if ply % 2 == 0 {
            parts.push(format!("{number}. {san}"));
        } else if idx == 0 {
            parts.push(format!("{number}... {san}"));
        } else {
            parts.push(san.clone());
        }
    }
    parts.push(result.to_owned());
    out.push_str(&parts.join(" "));
    out.push('\n');
    out
}

pub fn read_pgn(pgn: &str) -> RulesResult<PgnGame> {
    let mut game = PgnGame {
        result: RESULT_UNDECIDED.to_owned(),
        ..PgnGame::default()
    };
    let mut movetext = String::new();

    for line in pgn.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with('[') {
            let (key, value) = parse_header_line(line)?;
            game.headers.insert(key, value);
        } else {
            movetext.push_str(line);
            movetext.push(' ');
        }
    }

    for token in strip_comments_and_variations(&movetext).split_whitespace() {
        let token = strip_move_number(token);
        if token.is_empty() || token.starts_with('$') {
            continue;
        }
        if is_result_token(token) {
            game.result = token.to_owned();
            break;
        }
        game.moves.push(token.to_owned());
    }

    if let Some(result) = game.headers.get("Result") {
        game.result = normalize_result(result).to_owned();
    }
    Ok(game)
}

fn parse_header_line(line: &str) -> RulesResult<(String, String)> {
    let invalid = || RulesError::InvalidPgn(format!("header line {line}"));
    let inner = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or_else(invalid)?;
    let (key, raw) = inner.split_once(' ').ok_or_else(invalid)?;
    let value = raw
        .trim()
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or_else(invalid)?;
    Ok((key.trim().to_owned(), value.replace("\\\"", "\"")))
}

fn strip_comments_and_variations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;

    for ch in text.chars() {
        match ch {
            '{' => brace_depth += 1,
            '}' => brace_depth = brace_depth.saturating_sub(1),
            '(' if brace_depth == 0 => paren_depth += 1,
            ')' if brace_depth == 0 => paren_depth = paren_depth.saturating_sub(1),
            _ if brace_depth == 0 && paren_depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// `12.`, `12...` and glued forms like `12.e4` lose their number prefix.
fn strip_move_number(token: &str) -> &str {
    let digits = token.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && token[digits..].starts_with('.') {
        token[digits..].trim_start_matches('.')
    } else {
        token
    }
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

fn normalize_result(result: &str) -> &str {
    if is_result_token(result) {
        result
    } else {
        RESULT_UNDECIDED
    }
}

#[cfg(test)]
mod tests {
    use super::{read_pgn, standard_headers, write_pgn};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date")
    }

    #[test]
    fn writes_numbered_movetext_and_headers() {
        let headers = standard_headers(date(), "White", "Black", "1-0", None);
        let sans: Vec<String> = ["e4", "e5", "Qh5"].iter().map(|s| s.to_string()).collect();
        let pgn = write_pgn(&headers, &sans, 1, false);

        assert!(pgn.contains("[Date \"2024.03.09\"]"));
        assert!(pgn.contains("[Result \"1-0\"]"));
        assert!(pgn.ends_with("1. e4 e5 2. Qh5 1-0\n"));
        assert!(!pgn.contains("SetUp"));
    }

    #[test]
    fn numbers_games_starting_with_black() {
        let fen = "4k3/4p3/8/8/8/8/8/4K3 b - - 0 7";
        let headers = standard_headers(date(), "W", "B", "*", Some(fen));
        let sans: Vec<String> = ["e5", "Kd2"].iter().map(|s| s.to_string()).collect();
        let pgn = write_pgn(&headers, &sans, 7, true);
        assert!(pgn.ends_with("7... e5 8. Kd2 *\n"));

        let parsed = read_pgn(&pgn).expect("PGN should parse");
        assert_eq!(parsed.setup_fen(), Some(fen));
        assert_eq!(parsed.moves, vec!["e5", "Kd2"]);
    }

    #[test]
    fn reading_skips_comments_variations_and_glyphs() {
        let pgn = "[Event \"x\"]\n[Result \"0-1\"]\n\n1.e4 {best by test} e5 (1... c5 2. Nf3) 2. Nf3 $1 Nc6 0-1\n";
        let parsed = read_pgn(pgn).expect("PGN should parse");
        assert_eq!(parsed.moves, vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(parsed.result, "0-1");
        assert_eq!(parsed.setup_fen(), None);
    }

    #[test]
    fn malformed_header_is_an_error() {
        assert!(read_pgn("[Event unquoted]\n1. e4 *").is_err());
    }
}
