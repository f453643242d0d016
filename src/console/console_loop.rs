//! Line-oriented terminal front-end.
//!
//! A reader thread forwards stdin lines over a channel; the driver loop owns
//! the session and interleaves those lines with clock ticks and mover work.

use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::sync::mpsc::channel;
use std::thread;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::{PlayerMode, TIME_OPTIONS_MINUTES};
use crate::game_state::chess_types::PieceKind;
use crate::rules::position::ChessPosition;
use crate::session::driver::{LoopEvent, MatchDriver};
use crate::session::notifications::Severity;
use crate::session::types::{Actor, MoveOutcome, Reply, SessionCommand};
use crate::utils::algebraic::{algebraic_to_square, square_name};
use crate::utils::long_algebraic::{long_algebraic_to_move, looks_like_long_algebraic};
use crate::utils::render_game_state::render_board;

const HELP: &str = "\
commands:
  e2e4 | move e2e4       submit a move (append q/r/b/n to promote)
  click e2               board click (select, deselect or move)
  drop e7 e8             drag a unit from one square to another
  promote q|r|b|n        finish a pending promotion
  cancel                 drop a pending promotion
  offer | accept | reject
  resign
  new                    restart with the current settings
  mode pvp|pva-white|pva-black
  time 1|3|5|10|15       restart with a new clock length
  board | status | history | pgn
  help | quit";

/// Run the interactive loop until `quit` or end of input.
pub fn run_console(mut driver: MatchDriver) -> io::Result<()> {
    let (line_tx, line_rx) = channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut stdout = io::stdout();
    print_board(&driver, &mut stdout)?;
    stdout.flush()?;

    let mut failure: Option<io::Error> = None;
    driver.run(&line_rx, |driver, event| {
        let step = match event {
            LoopEvent::Input(line) => handle_command(driver, &line, &mut stdout),
            LoopEvent::Fired(replies) => report_fired(driver, &replies, &mut stdout).map(|_| false),
        };
        let step = step.and_then(|quit| stdout.flush().map(|_| quit));
        match step {
            Ok(false) => ControlFlow::Continue(()),
            Ok(true) => ControlFlow::Break(()),
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Handle one input line. Returns `true` when the user asked to quit.
pub fn handle_command(driver: &mut MatchDriver, line: &str, out: &mut impl Write) -> io::Result<bool> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(false);
    }

    let mut parts = trimmed.split_whitespace();
    let cmd = parts.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();
    debug!(cmd = %cmd, ?args, "console command");

    let command = match cmd.as_str() {
        "quit" | "exit" => return Ok(true),
        "help" => {
            writeln!(out, "{HELP}")?;
            return Ok(false);
        }
        "board" => {
            print_board(driver, out)?;
            return Ok(false);
        }
        "status" => {
            writeln!(out, "{}", status_line(driver))?;
            return Ok(false);
        }
        "history" => {
            print_history(driver, out)?;
            return Ok(false);
        }
        "pgn" => {
            match driver.session().export_pgn() {
                Ok(pgn) => writeln!(out, "{pgn}")?,
                Err(err) => writeln!(out, "error: {err}")?,
            }
            return Ok(false);
        }
        "move" => parse_move(args.first().copied()),
        "click" => args
            .first()
            .and_then(|s| algebraic_to_square(s).ok())
            .map(SessionCommand::SquareClicked)
            .ok_or_else(|| "usage: click <square>".to_owned()),
        "drop" => match (
            args.first().and_then(|s| algebraic_to_square(s).ok()),
            args.get(1).and_then(|s| algebraic_to_square(s).ok()),
        ) {
            (Some(from), Some(to)) => Ok(SessionCommand::PieceDropped { from, to }),
            _ => Err("usage: drop <from> <to>".to_owned()),
        },
        "promote" => args
            .first()
            .and_then(|s| s.chars().next())
            .and_then(PieceKind::from_fen_char)
            .map(SessionCommand::ResolvePromotion)
            .ok_or_else(|| "usage: promote q|r|b|n".to_owned()),
        "cancel" => Ok(SessionCommand::CancelPromotion),
        "offer" => Ok(SessionCommand::OfferDraw(Actor::Human)),
        "accept" => Ok(SessionCommand::AcceptDraw(Actor::Human)),
        "reject" => Ok(SessionCommand::RejectDraw(Actor::Human)),
        "resign" => Ok(SessionCommand::Resign(Actor::Human)),
        "new" => Ok(SessionCommand::NewMatch(None)),
        "mode" => parse_mode(args.first().copied()).map(|mode| {
            let mut config = driver.session().config().clone();
            config.mode = mode;
            SessionCommand::NewMatch(Some(config))
        }),
        "time" => parse_minutes(args.first().copied()).map(|minutes| {
            let mut config = driver.session().config().clone();
            config.minutes = minutes;
            SessionCommand::NewMatch(Some(config))
        }),
        _ if looks_like_long_algebraic(trimmed) => parse_move(Some(trimmed)),
        _ => Err(format!("unknown command '{trimmed}', try 'help'")),
    };

    let command = match command {
        Ok(command) => command,
        Err(usage) => {
            writeln!(out, "{usage}")?;
            return Ok(false);
        }
    };

    let redraw = matches!(
        command,
        SessionCommand::SubmitMove { .. }
            | SessionCommand::SquareClicked(_)
            | SessionCommand::PieceDropped { .. }
            | SessionCommand::ResolvePromotion(_)
            | SessionCommand::NewMatch(_)
    );
    let result = driver.submit(command, Instant::now());
    match &result {
        Ok(Reply::Move(MoveOutcome::Accepted(moved))) => writeln!(out, "played {}", moved.san)?,
        Ok(Reply::Move(MoveOutcome::NeedsPromotionChoice(_))) => {
            writeln!(out, "choose a promotion: promote q|r|b|n")?
        }
        Ok(Reply::Selection(Some(square))) => writeln!(out, "selected {}", square_name(*square))?,
        Ok(Reply::Selection(None)) => writeln!(out, "selection cleared")?,
        Ok(Reply::Ignored) => writeln!(out, "(ignored)")?,
        Ok(Reply::Done) | Ok(Reply::Ticked) | Err(_) => {}
    }

    print_notifications(driver, out)?;
    if redraw && result.is_ok() {
        print_board(driver, out)?;
    }
    writeln!(out, "{}", status_line(driver))?;
    Ok(false)
}

fn report_fired(driver: &mut MatchDriver, replies: &[Reply], out: &mut impl Write) -> io::Result<()> {
    let mut moved = false;
    for reply in replies {
        if let Reply::Move(MoveOutcome::Accepted(result)) = reply {
            writeln!(out, "{} plays {}", driver.session().mover_name(), result.san)?;
            moved = true;
        }
    }
    print_notifications(driver, out)?;
    if moved {
        print_board(driver, out)?;
    }
    writeln!(out, "{}", status_line(driver))?;
    Ok(())
}

fn parse_move(text: Option<&str>) -> Result<SessionCommand, String> {
    let text = text.ok_or_else(|| "usage: move <from><to>[promotion]".to_owned())?;
    let mv = long_algebraic_to_move(text).map_err(|err| err.to_string())?;
    Ok(SessionCommand::SubmitMove {
        from: mv.from,
        to: mv.to,
        promotion: mv.promotion,
        actor: Actor::Human,
    })
}

fn parse_mode(text: Option<&str>) -> Result<PlayerMode, String> {
    match text {
        Some("pvp") => Ok(PlayerMode::Pvp),
        Some("pva-white") => Ok(PlayerMode::PvaWhite),
        Some("pva-black") => Ok(PlayerMode::PvaBlack),
        _ => Err("usage: mode pvp|pva-white|pva-black".to_owned()),
    }
}

fn parse_minutes(text: Option<&str>) -> Result<u64, String> {
    text.and_then(|s| s.parse::<u64>().ok())
        .filter(|m| TIME_OPTIONS_MINUTES.contains(m))
        .ok_or_else(|| format!("usage: time {:?}", TIME_OPTIONS_MINUTES))
}

fn status_line(driver: &MatchDriver) -> String {
    let view = driver.session().view();
    format!(
        "[White {} | Black {}] {}",
        view.clocks[0].display, view.clocks[1].display, view.status
    )
}

fn print_board(driver: &MatchDriver, out: &mut impl Write) -> io::Result<()> {
    let session = driver.session();
    let view = session.view();
    writeln!(
        out,
        "{}",
        render_board(session.position(), view.orientation, &view.highlights)
    )?;
    let captured = |kinds: &[PieceKind]| kinds.iter().map(|k| k.fen_char()).collect::<String>();
    if !view.captured_by_white.is_empty() || !view.captured_by_black.is_empty() {
        writeln!(
            out,
            "captured by White: {}  by Black: {}",
            captured(&view.captured_by_white),
            captured(&view.captured_by_black)
        )?;
    }
    debug!(fen = %session.position().fen(), "board printed");
    Ok(())
}

fn print_history(driver: &MatchDriver, out: &mut impl Write) -> io::Result<()> {
    for pair in driver.session().view().history {
        writeln!(
            out,
            "{:>3}. {:<8} {}",
            pair.number,
            pair.white.as_deref().unwrap_or("..."),
            pair.black.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

fn print_notifications(driver: &mut MatchDriver, out: &mut impl Write) -> io::Result<()> {
    for note in driver.session_mut().drain_notifications() {
        let tag = match note.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => {
                warn!(title = %note.title, "error surfaced to the user");
                "error"
            }
        };
        writeln!(out, "[{tag}] {}: {}", note.title, note.message)?;
    }
    Ok(())
}
