//! Value types shared by the session subsystems.

use std::time::Duration;

use crate::config::MatchConfig;
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::rules::position::MoveResult;

/// Who is asking the controller to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Human,
    Mover,
}

/// One committed move. Index parity in the history gives the mover when the
/// match starts from the standard position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub color: Color,
    pub san: String,
    pub piece: PieceKind,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
}

impl From<&MoveResult> for MoveRecord {
    fn from(result: &MoveResult) -> Self {
        Self {
            color: result.color,
            san: result.san.clone(),
            piece: result.piece,
            from: result.from,
            to: result.to,
            captured: result.captured,
            promotion: result.promotion,
        }
    }
}

/// Units captured by each side over the match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureLedger {
    by_color: [Vec<PieceKind>; 2],
}

impl CaptureLedger {
    pub fn record(&mut self, capturer: Color, kind: PieceKind) {
        self.by_color[capturer.index()].push(kind);
    }

    /// Captured kinds in capture order.
    pub fn captured_by(&self, capturer: Color) -> &[PieceKind] {
        &self.by_color[capturer.index()]
    }

    /// Captured kinds sorted pawn first, for display.
    pub fn sorted_captured_by(&self, capturer: Color) -> Vec<PieceKind> {
        let mut kinds = self.by_color[capturer.index()].clone();
        kinds.sort();
        kinds
    }

    pub fn total(&self) -> usize {
        self.by_color.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOffer {
    pub by: Color,
}

impl DrawOffer {
    #[inline]
    pub fn responder(&self) -> Color {
        self.by.opposite()
    }
}

/// Origin and destination of a pawn move waiting for its promotion kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPromotion {
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Accepted(MoveResult),
    NeedsPromotionChoice(PendingPromotion),
}

/// Events the controller reacts to. Every event runs to completion before the
/// next one is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SubmitMove {
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        actor: Actor,
    },
    ResolvePromotion(PieceKind),
    CancelPromotion,
    SquareClicked(Square),
    PieceDropped {
        from: Square,
        to: Square,
    },
    OfferDraw(Actor),
    AcceptDraw(Actor),
    RejectDraw(Actor),
    Resign(Actor),
    Tick,
    MoverDue {
        generation: u64,
        ply: usize,
    },
    DrawResponseDue {
        generation: u64,
    },
    NewMatch(Option<MatchConfig>),
}

/// What a dispatched command did, beyond mutating the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Move(MoveOutcome),
    Selection(Option<Square>),
    Done,
    /// A clock tick that only charged the running clock.
    Ticked,
    /// Scheduled work that no longer applies, or a gesture with no effect.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    MoverMove,
    MoverDrawResponse,
}

/// Deferred work the controller asks its driver to deliver back later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScheduledTask {
    pub kind: TaskKind,
    pub generation: u64,
    pub ply: usize,
    pub delay: Duration,
}

impl ScheduledTask {
    /// The command that fires this task.
    pub fn command(&self) -> SessionCommand {
        match self.kind {
            TaskKind::MoverMove => SessionCommand::MoverDue {
                generation: self.generation,
                ply: self.ply,
            },
            TaskKind::MoverDrawResponse => SessionCommand::DrawResponseDue {
                generation: self.generation,
            },
        }
    }
}
