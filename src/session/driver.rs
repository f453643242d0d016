//! Single-threaded event loop around a [`Session`].
//!
//! The driver owns the session and feeds it one event at a time: commands
//! from the front-end, clock ticks, and the deferred mover work the session
//! asks for. Deferred work sits in a deadline queue; replacing the match
//! drops everything queued for the old generation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::errors::SessionResult;
use crate::rules::position::ChessPosition;
use crate::rules::standard::StandardPosition;
use crate::session::controller::Session;
use crate::session::types::{Reply, ScheduledTask, SessionCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Deadline {
    due: Instant,
    seq: u64,
}

/// What the loop hands back to its caller.
#[derive(Debug)]
pub enum LoopEvent<I> {
    Input(I),
    /// Timed events fired; the replies of those that changed the match.
    Fired(Vec<Reply>),
}

pub struct MatchDriver<P: ChessPosition = StandardPosition> {
    session: Session<P>,
    queue: BinaryHeap<Reverse<(Deadline, ScheduledTask)>>,
    seq: u64,
    next_tick: Instant,
}

impl<P: ChessPosition> MatchDriver<P> {
    pub fn new(session: Session<P>, now: Instant) -> Self {
        let next_tick = now + session.config().tick();
        let mut driver = Self {
            session,
            queue: BinaryHeap::new(),
            seq: 0,
            next_tick,
        };
        driver.collect(now);
        driver
    }

    #[inline]
    pub fn session(&self) -> &Session<P> {
        &self.session
    }

    #[inline]
    pub fn session_mut(&mut self) -> &mut Session<P> {
        &mut self.session
    }

    /// Tasks waiting in the queue.
    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Dispatch a front-end command at `now`.
    pub fn submit(&mut self, command: SessionCommand, now: Instant) -> SessionResult<Reply> {
        let replaces_match = matches!(command, SessionCommand::NewMatch(_));
        let result = self.session.dispatch(command);
        if replaces_match && result.is_ok() {
            self.purge_stale();
            self.next_tick = now + self.session.config().tick();
        }
        self.collect(now);
        result
    }

    /// Fire every tick and task due at or before `now`, in deadline order.
    pub fn advance(&mut self, now: Instant) -> Vec<Reply> {
        let mut replies = Vec::new();
        loop {
            let task_due = self.queue.peek().map(|Reverse((deadline, _))| deadline.due);
            let tick_first = task_due.map_or(true, |due| self.next_tick <= due);

            if tick_first && self.next_tick <= now {
                let fired_at = self.next_tick;
                self.next_tick += self.session.config().tick();
                trace!("tick");
                keep_reply(self.session.dispatch(SessionCommand::Tick), &mut replies);
                self.collect(fired_at);
                continue;
            }

            match task_due {
                Some(due) if due <= now => {
                    let Some(Reverse((_, task))) = self.queue.pop() else {
                        break;
                    };
                    debug!(?task, "firing scheduled task");
                    keep_reply(self.session.dispatch(task.command()), &mut replies);
                    self.collect(due);
                }
                _ => break,
            }
        }
        replies
    }

    /// Earliest instant at which `advance` has something to do.
    pub fn next_deadline(&self) -> Instant {
        match self.queue.peek() {
            Some(Reverse((deadline, _))) => deadline.due.min(self.next_tick),
            None => self.next_tick,
        }
    }

    /// Block on `inputs` until each deadline, firing timed events in between.
    /// Returns when the handler breaks or every sender has hung up.
    pub fn run<I>(
        &mut self,
        inputs: &Receiver<I>,
        mut handler: impl FnMut(&mut Self, LoopEvent<I>) -> ControlFlow<()>,
    ) {
        loop {
            let now = Instant::now();
            let fired = self.advance(now);
            if !fired.is_empty() && handler(self, LoopEvent::Fired(fired)).is_break() {
                return;
            }

            let wait = self.next_deadline().saturating_duration_since(Instant::now());
            match inputs.recv_timeout(wait.max(Duration::from_millis(1))) {
                Ok(input) => {
                    if handler(self, LoopEvent::Input(input)).is_break() {
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("input channel closed");
                    return;
                }
            }
        }
    }

    fn collect(&mut self, now: Instant) {
        for task in self.session.take_scheduled() {
            self.seq += 1;
            let deadline = Deadline {
                due: now + task.delay,
                seq: self.seq,
            };
            debug!(?task, "queued");
            self.queue.push(Reverse((deadline, task)));
        }
    }

    fn purge_stale(&mut self) {
        let generation = self.session.generation();
        let before = self.queue.len();
        self.queue.retain(|Reverse((_, task))| task.generation == generation);
        let dropped = before - self.queue.len();
        if dropped > 0 {
            debug!(dropped, generation, "dropped work from the replaced match");
        }
    }
}

fn keep_reply(result: SessionResult<Reply>, replies: &mut Vec<Reply>) {
    match result {
        Ok(Reply::Ignored) | Ok(Reply::Ticked) => {}
        Ok(reply) => replies.push(reply),
        // Already logged and surfaced by the session.
        Err(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;
    use std::sync::mpsc::channel;
    use std::time::{Duration, Instant};

    use super::{LoopEvent, MatchDriver};
    use crate::config::{MatchConfig, PlayerMode};
    use crate::game_state::chess_types::Color;
    use crate::session::controller::Session;
    use crate::session::outcome::MatchOutcome;
    use crate::session::types::{Actor, MoveOutcome, Reply, SessionCommand};

    fn driver(mode: PlayerMode, now: Instant) -> MatchDriver {
        let config = MatchConfig {
            mode,
            mover_seed: Some(11),
            ..MatchConfig::default()
        };
        MatchDriver::new(Session::standard(config).expect("session should start"), now)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn mover_plays_after_its_delay() {
        let t0 = Instant::now();
        let mut driver = driver(PlayerMode::PvaBlack, t0);
        assert_eq!(driver.pending_tasks(), 1);
        assert_eq!(driver.next_deadline(), t0 + ms(500));

        assert!(driver.advance(t0 + ms(499)).is_empty());
        let replies = driver.advance(t0 + ms(500));
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0], Reply::Move(MoveOutcome::Accepted(_))));
        assert_eq!(driver.session().turn(), Color::Dark);
        assert_eq!(driver.pending_tasks(), 0);
    }

    #[test]
    fn ticks_charge_the_running_clock() {
        let t0 = Instant::now();
        let mut driver = driver(PlayerMode::PvaBlack, t0);
        driver.advance(t0 + ms(1_000));
        let clocks = driver.session().clocks();
        assert_eq!(clocks.remaining(Color::Light), Duration::from_secs(300));
        assert_eq!(clocks.remaining(Color::Dark), Duration::from_secs(299));

        driver.advance(t0 + ms(3_000));
        assert_eq!(driver.session().clocks().remaining(Color::Dark), Duration::from_secs(297));
    }

    #[test]
    fn new_match_drops_queued_work() {
        let t0 = Instant::now();
        let mut driver = driver(PlayerMode::PvaBlack, t0);
        driver
            .submit(SessionCommand::NewMatch(None), t0 + ms(100))
            .expect("reset should succeed");
        assert_eq!(driver.pending_tasks(), 1);

        assert!(driver.advance(t0 + ms(550)).is_empty());
        assert!(driver.session().history().is_empty());
        let replies = driver.advance(t0 + ms(600));
        assert_eq!(replies.len(), 1);
        assert_eq!(driver.session().history().len(), 1);
    }

    #[test]
    fn draw_offers_get_an_answer() {
        let t0 = Instant::now();
        let mut driver = driver(PlayerMode::PvaWhite, t0);
        driver
            .submit(SessionCommand::OfferDraw(Actor::Human), t0)
            .expect("human may offer");
        assert!(driver.session().draw_offer().is_some());

        driver.advance(t0 + ms(999));
        assert!(driver.session().draw_offer().is_some());
        driver.advance(t0 + ms(1_000));
        assert!(driver.session().draw_offer().is_none());
        assert_eq!(driver.session().clocks().running(), Some(Color::Light));
    }

    #[test]
    fn flag_fall_is_reported_as_fired() {
        let t0 = Instant::now();
        let config = MatchConfig {
            mode: PlayerMode::Pvp,
            minutes: 1,
            ..MatchConfig::default()
        };
        let mut driver = MatchDriver::new(Session::standard(config).expect("session should start"), t0);

        assert!(driver.advance(t0 + ms(59_000)).is_empty());
        let replies = driver.advance(t0 + ms(60_000));
        assert_eq!(replies, vec![Reply::Done]);
        assert_eq!(driver.session().outcome(), MatchOutcome::TimeExpired { winner: Color::Dark });
        let titles: Vec<String> = driver
            .session_mut()
            .drain_notifications()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert!(titles.iter().any(|t| t == "Time Out"));
        assert!(driver.advance(t0 + ms(61_000)).is_empty());
    }

    #[test]
    fn draw_answer_is_reported_as_fired() {
        let t0 = Instant::now();
        let mut driver = driver(PlayerMode::PvaWhite, t0);
        driver
            .submit(SessionCommand::OfferDraw(Actor::Human), t0)
            .expect("human may offer");

        let replies = driver.advance(t0 + ms(1_000));
        assert_eq!(replies, vec![Reply::Done]);
        assert!(driver.session().draw_offer().is_none());
    }

    #[test]
    fn run_stops_when_inputs_close() {
        let mut driver = driver(PlayerMode::Pvp, Instant::now());
        let (tx, rx) = channel();
        tx.send("e2e4").expect("send");
        tx.send("quit").expect("send");
        tx.send("never read").expect("send");
        drop(tx);

        let mut seen = Vec::new();
        driver.run(&rx, |_, event| match event {
            LoopEvent::Input("quit") => ControlFlow::Break(()),
            LoopEvent::Input(line) => {
                seen.push(line);
                ControlFlow::Continue(())
            }
            LoopEvent::Fired(_) => ControlFlow::Continue(()),
        });
        assert_eq!(seen, vec!["e2e4"]);
    }
}
