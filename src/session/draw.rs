//! Draw negotiation and resignation.

use tracing::info;

use crate::config::DrawClockPolicy;
use crate::errors::{ProtocolViolation, SessionResult};
use crate::game_state::chess_types::Color;
use crate::rules::position::ChessPosition;
use crate::session::controller::Session;
use crate::session::outcome::{DrawReason, MatchOutcome};
use crate::session::types::{Actor, DrawOffer};

impl<P: ChessPosition> Session<P> {
    /// Offer a draw on behalf of the side to move.
    pub fn offer_draw(&mut self, actor: Actor) -> SessionResult<()> {
        let result = self.try_offer_draw(actor);
        self.settle(result)
    }

    pub fn accept_draw(&mut self, actor: Actor) -> SessionResult<()> {
        let result = self.check_draw_response(actor).map(|offer| {
            info!(by = %offer.by, "draw accepted");
            self.end_match(MatchOutcome::Draw(DrawReason::Agreement), true);
        });
        self.settle(result)
    }

    /// Decline the pending offer. Play resumes with the side to move's clock.
    pub fn reject_draw(&mut self, actor: Actor) -> SessionResult<()> {
        let result = self.check_draw_response(actor).map(|offer| {
            info!(by = %offer.by, "draw rejected");
            self.draw_offer = None;
            let turn = self.position.turn();
            self.clocks.set_running(turn, true);
        });
        self.settle(result)
    }

    /// Resign for the side to move when `actor` controls it, otherwise for
    /// the actor's own side.
    pub fn resign(&mut self, actor: Actor) -> SessionResult<()> {
        let result = self.resigning_color(actor).map(|color| {
            self.end_match(MatchOutcome::Resignation { winner: color.opposite() }, true);
        });
        self.settle(result)
    }

    pub fn can_offer_draw(&self) -> bool {
        self.human_may_act() && self.pending_promotion.is_none()
    }

    pub fn can_resign(&self) -> bool {
        self.human_may_act()
    }

    fn try_offer_draw(&mut self, actor: Actor) -> SessionResult<()> {
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
        if !self.actor_controls(actor, turn) {
            return Err(ProtocolViolation::NotYourTurn(turn).into());
        }

        let offer = DrawOffer { by: turn };
        self.draw_offer = Some(offer);
        self.selected = None;
        match self.config.draw_clock_policy {
            DrawClockPolicy::ResponderRuns => self.clocks.set_running(offer.responder(), true),
            DrawClockPolicy::BothStopped => self.clocks.stop_all(),
            DrawClockPolicy::OffererRuns => self.clocks.set_running(offer.by, true),
        }
        info!(by = %turn, policy = ?self.config.draw_clock_policy, "draw offered");
        Ok(())
    }

    fn check_draw_response(&self, actor: Actor) -> SessionResult<DrawOffer> {
        if self.outcome.is_terminal() {
            return Err(ProtocolViolation::MatchOver.into());
        }
        let Some(offer) = self.draw_offer else {
            return Err(ProtocolViolation::NoDrawOffer.into());
        };
        if self.actor_controls(actor, offer.responder()) {
            Ok(offer)
        } else if self.actor_controls(actor, offer.by) {
            Err(ProtocolViolation::OwnDrawOffer(offer.by).into())
        } else {
            Err(ProtocolViolation::Unauthorized(offer.responder()).into())
        }
    }

    fn resigning_color(&self, actor: Actor) -> SessionResult<Color> {
        if self.outcome.is_terminal() {
            return Err(ProtocolViolation::MatchOver.into());
        }
        if self.draw_offer.is_some() {
            return Err(ProtocolViolation::DrawOfferPending.into());
        }
        let turn = self.position.turn();
        if self.actor_controls(actor, turn) {
            return Ok(turn);
        }
        let own = match actor {
            Actor::Human => self.config.mode.human_color(),
            Actor::Mover => self.config.mode.mover_color(),
        };
        own.ok_or_else(|| ProtocolViolation::Unauthorized(turn).into())
    }
}
