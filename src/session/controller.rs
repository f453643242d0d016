//! The game session controller.
//!
//! `Session` owns every piece of match state and is the only thing that
//! mutates it. Each operation (or `dispatch`ed command) runs to completion,
//! then re-resolves the outcome and works out which deferred mover work, if
//! any, the driver should schedule. Deferred work carries the session
//! generation and ply it was scheduled for and is re-validated when it fires.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::MatchConfig;
use crate::engines::engine_random::RandomMover;
use crate::engines::engine_trait::{DrawResponse, Mover};
use crate::errors::{SessionError, SessionResult};
use crate::game_state::chess_types::{Color, Square};
use crate::rules::position::ChessPosition;
use crate::rules::standard::StandardPosition;
use crate::session::clock::{format_clock, Clocks};
use crate::session::highlights::{compute_highlights, history_pairs, ClockView, HighlightMap, SessionView};
use crate::session::notifications::{Notification, NotificationOutbox};
use crate::session::outcome::{resolve, terminal_status, MatchOutcome};
use crate::session::types::{
    Actor, CaptureLedger, DrawOffer, MoveRecord, PendingPromotion, Reply, ScheduledTask, SessionCommand,
    TaskKind,
};
use crate::utils::pgn::standard_headers;

pub struct Session<P: ChessPosition = StandardPosition> {
    pub(super) config: MatchConfig,
    pub(super) position: P,
    pub(super) history: Vec<MoveRecord>,
    pub(super) captures: CaptureLedger,
    pub(super) clocks: Clocks,
    pub(super) draw_offer: Option<DrawOffer>,
    pub(super) outcome: MatchOutcome,
    pub(super) status: String,
    pub(super) pending_promotion: Option<PendingPromotion>,
    pub(super) selected: Option<Square>,
    pub(super) last_move: Option<(Square, Square)>,
    pub(super) generation: u64,
    pub(super) mover: Box<dyn Mover>,
    pub(super) notifications: NotificationOutbox,
    scheduled: Vec<ScheduledTask>,
    last_scheduled: Option<(TaskKind, u64, usize)>,
}

impl<P: ChessPosition> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("generation", &self.generation)
            .field("status", &self.status)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Session<StandardPosition> {
    /// Standard chess against a [`RandomMover`], seeded from the config when
    /// a seed is given.
    pub fn standard(config: MatchConfig) -> SessionResult<Self> {
        let mover = match config.mover_seed {
            Some(seed) => RandomMover::seeded(seed),
            None => RandomMover::new(),
        }
        .with_default_promotion(config.default_promotion);
        Self::new(config, Box::new(mover))
    }
}

impl<P: ChessPosition> Session<P> {
    pub fn new(config: MatchConfig, mover: Box<dyn Mover>) -> SessionResult<Self> {
        config
            .validate()
            .map_err(|e| SessionError::InvalidConfig(e.to_string()))?;
        let position = P::setup(config.start_fen.as_deref())?;
        let mut session = Self {
            clocks: Clocks::new(config.initial_time(), config.tick()),
            config,
            position,
            history: Vec::new(),
            captures: CaptureLedger::default(),
            draw_offer: None,
            outcome: MatchOutcome::InProgress,
            status: String::new(),
            pending_promotion: None,
            selected: None,
            last_move: None,
            generation: 1,
            mover,
            notifications: NotificationOutbox::default(),
            scheduled: Vec::new(),
            last_scheduled: None,
        };
        session.start();
        Ok(session)
    }

    fn start(&mut self) {
        self.mover.new_game();
        let turn = self.position.turn();
        self.clocks.set_running(turn, true);
        info!(
            generation = self.generation,
            mode = ?self.config.mode,
            minutes = self.config.minutes,
            "match started"
        );
        self.refresh();
    }

    /// Replace the whole match state, optionally with a new configuration.
    /// Deferred work scheduled for the old match becomes stale.
    pub fn new_match(&mut self, config: Option<MatchConfig>) -> SessionResult<()> {
        let config = config.unwrap_or_else(|| self.config.clone());
        let result = config
            .validate()
            .map_err(|e| SessionError::InvalidConfig(e.to_string()))
            .and_then(|_| Ok(P::setup(config.start_fen.as_deref())?));
        let position = match result {
            Ok(position) => position,
            Err(err) => return Err(self.report(err)),
        };

        self.clocks = Clocks::new(config.initial_time(), config.tick());
        self.config = config;
        self.position = position;
        self.history.clear();
        self.captures = CaptureLedger::default();
        self.draw_offer = None;
        self.outcome = MatchOutcome::InProgress;
        self.pending_promotion = None;
        self.selected = None;
        self.last_move = None;
        self.generation += 1;
        self.scheduled.clear();
        self.last_scheduled = None;
        self.start();
        Ok(())
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> SessionResult<Reply> {
        debug!(?command, "dispatch");
        match command {
            SessionCommand::SubmitMove {
                from,
                to,
                promotion,
                actor,
            } => self.submit_move(from, to, promotion, actor).map(Reply::Move),
            SessionCommand::ResolvePromotion(kind) => self.resolve_promotion(kind).map(Reply::Move),
            SessionCommand::CancelPromotion => self.cancel_promotion().map(|_| Reply::Done),
            SessionCommand::SquareClicked(square) => self.square_clicked(square),
            SessionCommand::PieceDropped { from, to } => self.piece_dropped(from, to),
            SessionCommand::OfferDraw(actor) => self.offer_draw(actor).map(|_| Reply::Done),
            SessionCommand::AcceptDraw(actor) => self.accept_draw(actor).map(|_| Reply::Done),
            SessionCommand::RejectDraw(actor) => self.reject_draw(actor).map(|_| Reply::Done),
            SessionCommand::Resign(actor) => self.resign(actor).map(|_| Reply::Done),
            SessionCommand::Tick => Ok(self.tick()),
            SessionCommand::MoverDue { generation, ply } => Ok(self.run_mover(generation, ply)),
            SessionCommand::DrawResponseDue { generation } => self.run_draw_response(generation),
            SessionCommand::NewMatch(config) => self.new_match(config).map(|_| Reply::Done),
        }
    }

    /// Advance the running clock by one tick.
    pub fn tick(&mut self) -> Reply {
        if self.outcome.is_terminal() {
            return Reply::Ignored;
        }
        match self.clocks.tick() {
            Some(flagged) => {
                self.end_match(MatchOutcome::TimeExpired { winner: flagged.opposite() }, true);
                self.refresh();
                Reply::Done
            }
            None => Reply::Ticked,
        }
    }

    // --- accessors -------------------------------------------------------

    #[inline]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    #[inline]
    pub fn position(&self) -> &P {
        &self.position
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    #[inline]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    #[inline]
    pub fn captures(&self) -> &CaptureLedger {
        &self.captures
    }

    #[inline]
    pub fn clocks(&self) -> &Clocks {
        &self.clocks
    }

    #[inline]
    pub fn draw_offer(&self) -> Option<DrawOffer> {
        self.draw_offer
    }

    #[inline]
    pub fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    #[inline]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[inline]
    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.pending_promotion
    }

    #[inline]
    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    #[inline]
    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mover_name(&self) -> &str {
        self.mover.name()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Deferred work requested since the last call.
    pub fn take_scheduled(&mut self) -> Vec<ScheduledTask> {
        std::mem::take(&mut self.scheduled)
    }

    /// Highlight map for the current selection, last move and check.
    pub fn highlights(&self) -> HighlightMap {
        compute_highlights(&self.position, self.selected, self.last_move).unwrap_or_else(|err| {
            warn!(error = %err, "could not compute highlights");
            HighlightMap::new()
        })
    }

    pub fn view(&self) -> SessionView {
        let clock_view = |color: Color| {
            let state = self.clocks.state(color);
            ClockView {
                remaining: state.remaining,
                running: state.running,
                display: format_clock(state.remaining),
            }
        };
        SessionView {
            fen: self.position.fen(),
            turn: self.position.turn(),
            orientation: self.config.mode.orientation(),
            highlights: self.highlights(),
            clocks: [clock_view(Color::Light), clock_view(Color::Dark)],
            status: self.status.clone(),
            outcome: self.outcome,
            history: history_pairs(&self.history),
            captured_by_white: self.captures.sorted_captured_by(Color::Light),
            captured_by_black: self.captures.sorted_captured_by(Color::Dark),
            pending_promotion: self.pending_promotion,
            draw_offer: self.draw_offer,
            can_offer_draw: self.can_offer_draw(),
            can_resign: self.can_resign(),
            generation: self.generation,
        }
    }

    // --- authorization ---------------------------------------------------

    pub(super) fn actor_controls(&self, actor: Actor, color: Color) -> bool {
        match actor {
            Actor::Human => self.config.mode.human_controls(color),
            Actor::Mover => self.config.mode.mover_color() == Some(color),
        }
    }

    /// Whether a human gesture may act for the side to move right now.
    pub(super) fn human_may_act(&self) -> bool {
        !self.outcome.is_terminal()
            && self.draw_offer.is_none()
            && self.actor_controls(Actor::Human, self.position.turn())
    }

    // --- bookkeeping -----------------------------------------------------

    /// Log and surface a refused operation, handing the error back.
    pub(super) fn report(&mut self, err: SessionError) -> SessionError {
        match &err {
            SessionError::EngineInconsistency(_) | SessionError::Rules(_) => {
                tracing::error!(error = %err, "operation failed")
            }
            _ => warn!(error = %err, "operation refused"),
        }
        self.notifications.push(Notification::for_error(&err));
        err
    }

    /// Terminal transition: stop clocks and clear transient state.
    pub(super) fn end_match(&mut self, outcome: MatchOutcome, notify: bool) {
        if self.outcome.is_terminal() {
            return;
        }
        self.outcome = outcome;
        self.status = terminal_status(&outcome);
        self.clocks.stop_all();
        self.draw_offer = None;
        self.pending_promotion = None;
        self.selected = None;
        info!(generation = self.generation, outcome = %outcome, plies = self.history.len(), "match ended");
        if notify {
            if let Some(note) = Notification::for_outcome(&outcome) {
                self.notifications.push(note);
            }
        }
    }

    /// Re-resolve the outcome and queue any mover work it now calls for.
    pub(super) fn refresh(&mut self) {
        let resolution = resolve(&self.position, self.outcome, self.draw_offer);
        if resolution.outcome.is_terminal() {
            self.end_match(resolution.outcome, true);
        } else {
            self.status = resolution.status;
        }
        self.schedule_mover_work();
    }

    fn schedule_mover_work(&mut self) {
        let Some((kind, delay)) = self.pending_mover_work() else {
            self.last_scheduled = None;
            return;
        };

        let ply = self.position.ply_count();
        let key = (kind, self.generation, ply);
        if self.last_scheduled == Some(key) {
            return;
        }
        self.last_scheduled = Some(key);

        let task = ScheduledTask {
            kind,
            generation: self.generation,
            ply,
            delay,
        };
        debug!(?task, "scheduling mover work");
        self.scheduled.push(task);
    }

    fn pending_mover_work(&self) -> Option<(TaskKind, Duration)> {
        let mover_color = self.config.mode.mover_color()?;
        if self.outcome.is_terminal() {
            return None;
        }
        match self.draw_offer {
            Some(offer) if offer.responder() == mover_color => {
                Some((TaskKind::MoverDrawResponse, self.config.draw_response_delay()))
            }
            Some(_) => None,
            None if self.position.turn() == mover_color => Some((TaskKind::MoverMove, self.config.mover_delay())),
            None => None,
        }
    }

    // --- deferred mover work ---------------------------------------------

    fn is_stale(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping work from a replaced match");
            return true;
        }
        false
    }

    /// Let the mover play, if it is still its turn in the same match.
    pub fn run_mover(&mut self, generation: u64, ply: usize) -> Reply {
        if self.is_stale(generation) {
            return Reply::Ignored;
        }
        let Some(mover_color) = self.config.mode.mover_color() else {
            return Reply::Ignored;
        };
        if self.outcome.is_terminal()
            || self.draw_offer.is_some()
            || self.position.turn() != mover_color
            || self.position.ply_count() != ply
        {
            debug!(ply, "mover work no longer applies");
            return Reply::Ignored;
        }

        let legal = match self.position.legal_moves(None) {
            Ok(legal) => legal,
            Err(err) => {
                warn!(error = %err, "mover could not list legal moves");
                return Reply::Ignored;
            }
        };
        if legal.is_empty() {
            warn!("mover invoked without legal moves");
            return Reply::Ignored;
        }

        let output = match self.mover.choose_move(&legal) {
            Ok(output) => output,
            Err(err) => {
                warn!(mover = self.mover.name(), error = %err, "mover failed");
                return Reply::Ignored;
            }
        };
        for line in &output.info_lines {
            debug!(mover = self.mover.name(), "{line}");
        }
        let Some(mv) = output.best_move else {
            warn!(mover = self.mover.name(), "mover abstained");
            return Reply::Ignored;
        };

        match self.submit_move(mv.from, mv.to, mv.promotion, Actor::Mover) {
            Ok(outcome) => Reply::Move(outcome),
            Err(_) => Reply::Ignored,
        }
    }

    /// The mover's answer to a pending draw offer.
    pub fn run_draw_response(&mut self, generation: u64) -> SessionResult<Reply> {
        if self.is_stale(generation) {
            return Ok(Reply::Ignored);
        }
        let responder_is_mover = match (self.draw_offer, self.config.mode.mover_color()) {
            (Some(offer), Some(mover)) => offer.responder() == mover,
            _ => false,
        };
        if self.outcome.is_terminal() || !responder_is_mover {
            return Ok(Reply::Ignored);
        }

        match self.mover.respond_to_draw() {
            DrawResponse::Accept => self.accept_draw(Actor::Mover)?,
            DrawResponse::Reject => self.reject_draw(Actor::Mover)?,
        }
        Ok(Reply::Done)
    }

    // --- export ----------------------------------------------------------

    /// PGN for the current match, with player names from the mode.
    pub fn export_pgn(&self) -> SessionResult<String> {
        let name = |color: Color| {
            if self.config.mode.human_controls(color) {
                "Human".to_owned()
            } else {
                self.mover.name().to_owned()
            }
        };
        let snapshot = self.position.serialize()?;
        let setup = crate::utils::pgn::read_pgn(&snapshot)?;
        let headers = standard_headers(
            chrono::Utc::now().date_naive(),
            &name(Color::Light),
            &name(Color::Dark),
            self.outcome.pgn_result(),
            setup.setup_fen(),
        );

        let first_dark = self.history.first().map(|r| r.color == Color::Dark).unwrap_or(false);
        let first_fullmove = setup
            .setup_fen()
            .and_then(|fen| fen.split_whitespace().nth(5))
            .and_then(|n| n.parse::<u16>().ok())
            .unwrap_or(1);
        let sans: Vec<String> = self.history.iter().map(|r| r.san.clone()).collect();
        Ok(crate::utils::pgn::write_pgn(&headers, &sans, first_fullmove, first_dark))
    }
}
