//! Move pipeline: validate on a throwaway trial, then commit a position
//! re-derived by replaying the full history.
//!
//! Also hosts the board gestures (click and drag) and the promotion slot,
//! which all end up submitting through the same path.

use tracing::{debug, error, info};

use crate::errors::{ProtocolViolation, SessionError, SessionResult};
use crate::game_state::chess_types::{PieceKind, Square};
use crate::rules::position::{ChessPosition, Move, MoveResult, PlayOutcome};
use crate::session::controller::Session;
use crate::session::outcome::MatchOutcome;
use crate::session::types::{Actor, MoveOutcome, MoveRecord, PendingPromotion, Reply};
use crate::utils::algebraic::square_name;

impl<P: ChessPosition> Session<P> {
    /// Submit a move for `actor`. Rejections leave the session untouched,
    /// except for an engine inconsistency which ends the match.
    pub fn submit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        actor: Actor,
    ) -> SessionResult<MoveOutcome> {
        let result = self
            .check_move_preconditions(from, actor)
            .and_then(|_| self.run_pipeline(Move::new(from, to).with_promotion(promotion), actor));
        self.settle(result)
    }

    /// Complete the move waiting in the promotion slot.
    pub fn resolve_promotion(&mut self, kind: PieceKind) -> SessionResult<MoveOutcome> {
        let slot = self.pending_promotion;
        let result = match slot {
            None => Err(ProtocolViolation::NoPendingPromotion.into()),
            Some(_) if !kind.is_promotion_target() => Err(SessionError::InvalidPromotion(format!("{kind:?}"))),
            Some(pending) => {
                self.pending_promotion = None;
                self.check_move_preconditions(pending.from, Actor::Human).and_then(|_| {
                    self.run_pipeline(Move::new(pending.from, pending.to).with_promotion(Some(kind)), Actor::Human)
                })
            }
        };
        self.settle(result)
    }

    /// Drop the pending promotion without moving.
    pub fn cancel_promotion(&mut self) -> SessionResult<()> {
        let result = match self.pending_promotion.take() {
            Some(pending) => {
                debug!(from = %square_name(pending.from), to = %square_name(pending.to), "promotion cancelled");
                self.selected = None;
                Ok(())
            }
            None => Err(ProtocolViolation::NoPendingPromotion.into()),
        };
        self.settle(result)
    }

    /// Click-to-move. The first click selects an own unit, clicking it again
    /// deselects, clicking another own unit switches, and any other square
    /// attempts the move.
    pub fn square_clicked(&mut self, square: Square) -> SessionResult<Reply> {
        if !self.human_may_act() || self.pending_promotion.is_some() {
            return Ok(Reply::Ignored);
        }

        let turn = self.position.turn();
        let own_unit = matches!(self.position.unit_at(square), Some((color, _)) if color == turn);

        match self.selected {
            Some(origin) if origin == square => {
                self.selected = None;
                Ok(Reply::Selection(None))
            }
            Some(_) | None if own_unit => {
                self.selected = Some(square);
                Ok(Reply::Selection(Some(square)))
            }
            Some(origin) => {
                self.selected = None;
                self.submit_move(origin, square, None, Actor::Human).map(Reply::Move)
            }
            None => Ok(Reply::Ignored),
        }
    }

    /// Drag-and-drop. Promotion moves open the promotion slot.
    pub fn piece_dropped(&mut self, from: Square, to: Square) -> SessionResult<Reply> {
        if !self.human_may_act() || self.pending_promotion.is_some() {
            return Ok(Reply::Ignored);
        }
        self.selected = None;
        self.submit_move(from, to, None, Actor::Human).map(Reply::Move)
    }

    /// Run the post-operation bookkeeping for any fallible operation.
    pub(super) fn settle<T>(&mut self, result: SessionResult<T>) -> SessionResult<T> {
        let result = result.map_err(|err| self.report(err));
        self.refresh();
        result
    }

    fn check_move_preconditions(&self, from: Square, actor: Actor) -> SessionResult<()> {
        if self.outcome.is_terminal() {
            return Err(ProtocolViolation::MatchOver.into());
        }
        if self.draw_offer.is_some() {
            return Err(ProtocolViolation::DrawOfferPending.into());
        }
        if self.pending_promotion.is_some() {
            return Err(ProtocolViolation::PromotionPending.into());
        }

        let turn = self.position.turn();
        let Some((color, _)) = self.position.unit_at(from) else {
            return Err(SessionError::IllegalMove(format!("no unit on {}", square_name(from))));
        };
        if color != turn {
            return Err(ProtocolViolation::NotYourTurn(turn).into());
        }
        if !self.actor_controls(actor, color) {
            return Err(ProtocolViolation::Unauthorized(color).into());
        }
        Ok(())
    }

    fn run_pipeline(&mut self, requested: Move, actor: Actor) -> SessionResult<MoveOutcome> {
        let mut mv = requested;
        let mut trial = self.position.play(&mv)?;

        if matches!(trial, PlayOutcome::NeedsPromotion) {
            match actor {
                Actor::Mover => {
                    mv = mv.with_promotion(Some(self.config.default_promotion));
                    trial = self.position.play(&mv)?;
                }
                Actor::Human => {
                    let pending = PendingPromotion {
                        from: mv.from,
                        to: mv.to,
                    };
                    self.pending_promotion = Some(pending);
                    self.selected = None;
                    debug!(from = %square_name(mv.from), to = %square_name(mv.to), "awaiting promotion choice");
                    return Ok(MoveOutcome::NeedsPromotionChoice(pending));
                }
            }
        }

        if !matches!(trial, PlayOutcome::Played(..)) {
            return Err(SessionError::IllegalMove(mv.to_string()));
        }

        let (next, result) = self.replay_commit(&mv)?;
        self.commit(next, &result);
        Ok(MoveOutcome::Accepted(result))
    }

    /// Rebuild the position from the serialized history and play `mv` there.
    fn replay_commit(&mut self, mv: &Move) -> SessionResult<(P, MoveResult)> {
        let replayed = self
            .position
            .serialize()
            .and_then(|snapshot| self.position.restore(&snapshot))
            .and_then(|restored| restored.play(mv));

        let reason = match replayed {
            Ok(PlayOutcome::Played(next, result)) => return Ok((next, result)),
            Ok(PlayOutcome::NeedsPromotion) => format!("replay asked for a promotion on {mv}"),
            Ok(PlayOutcome::Illegal) => format!("replay rejected {mv}"),
            Err(err) => format!("replay of {mv} failed: {err}"),
        };
        error!(reason = %reason, ply = self.position.ply_count(), "trial and replay disagree");
        self.end_match(MatchOutcome::ErrorAbort, false);
        Err(SessionError::EngineInconsistency(reason))
    }

    fn commit(&mut self, next: P, result: &MoveResult) {
        self.position = next;
        self.history.push(MoveRecord::from(result));
        if let Some(kind) = result.captured {
            self.captures.record(result.color, kind);
        }
        self.last_move = Some((result.from, result.to));
        self.selected = None;
        self.pending_promotion = None;
        self.clocks.add_increment(result.color, self.config.increment());
        self.clocks.set_running(self.position.turn(), true);
        info!(
            color = %result.color,
            san = %result.san,
            ply = self.history.len(),
            "move accepted"
        );
    }
}
