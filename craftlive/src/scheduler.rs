//! Virtual-clock timer queue driving live builds.
//!
//! The scheduler owns a [`LiveUpdateEngine`] and fires its ticks in deadline
//! order as the clock is advanced. A session's next tick is armed only after
//! the current one has been applied, so at most one tick per session is ever
//! queued. Time never passes on its own: callers advance the clock, either to
//! mirror wall time or to replay a build instantly in tests.

use std::{cmp::Ordering, collections::BinaryHeap, time::Duration};

use crafttree::{recipe::Path, search::PathKey};
use log::debug;

use crate::{
    engine::{LiveUpdateEngine, TickOutcome},
    session::SessionId,
};

#[derive(Debug, Clone)]
struct Timer {
    deadline: Duration,
    seq: u64,
    key: PathKey,
    session: SessionId,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so that `BinaryHeap` pops the earliest deadline first; ties keep
// arming order.
impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline, other.seq).cmp(&(self.deadline, self.seq))
    }
}

/// One tick fired by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTick {
    /// Virtual time at which the tick fired.
    pub at: Duration,
    pub key: PathKey,
    pub outcome: TickOutcome,
}

#[derive(Debug, Default)]
pub struct TickScheduler {
    engine: LiveUpdateEngine,
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Timer>,
}

impl TickScheduler {
    pub fn new(engine: LiveUpdateEngine) -> Self {
        Self {
            engine,
            now: Duration::ZERO,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    #[inline]
    pub fn engine(&self) -> &LiveUpdateEngine {
        &self.engine
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    fn arm(&mut self, key: PathKey, session: SessionId) {
        let deadline = self.now + self.engine.config().tick_delay();
        self.seq += 1;
        self.queue.push(Timer {
            deadline,
            seq: self.seq,
            key,
            session,
        });
    }

    /// Start the live build of `path` under `key` and arm its first tick.
    ///
    /// Timers of a previous build under the same key are dropped.
    pub fn start(&mut self, key: PathKey, path: &Path, target: &str) -> SessionId {
        self.queue.retain(|timer| timer.key != key);
        let session = self.engine.start(key.clone(), path, target);
        if self.engine.phase(&key).is_building() {
            self.arm(key, session);
        }
        session
    }

    /// Stop the build under `key` and drop its timer.
    pub fn cancel(&mut self, key: &PathKey) -> bool {
        self.queue.retain(|timer| &timer.key != key);
        self.engine.reset(key)
    }

    /// Deadline of the next queued tick.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|timer| timer.deadline)
    }

    /// Number of queued ticks.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Advance the clock by `duration`, firing every tick that falls due.
    pub fn advance_by(&mut self, duration: Duration) -> Vec<FiredTick> {
        self.advance_to(self.now + duration)
    }

    /// Advance the clock to `instant`, firing every tick that falls due.
    ///
    /// Ticks armed while advancing fire too if their deadline is not past
    /// `instant`. Moving the clock backwards is a no-op.
    pub fn advance_to(&mut self, instant: Duration) -> Vec<FiredTick> {
        let mut fired = Vec::new();
        while let Some(timer) = self.queue.peek() {
            if timer.deadline > instant {
                break;
            }
            let Some(timer) = self.queue.pop() else {
                break;
            };
            self.now = self.now.max(timer.deadline);

            let outcome = self.engine.tick(&timer.key, timer.session);
            if outcome.is_stale() {
                debug!("Timer for {} at {:?} is stale", timer.key, timer.deadline);
                continue;
            }
            if outcome.wants_next_tick() {
                self.arm(timer.key.clone(), timer.session);
            }
            fired.push(FiredTick {
                at: self.now,
                key: timer.key,
                outcome,
            });
        }
        self.now = self.now.max(instant);
        fired
    }

    /// Fire every queued tick, jumping the clock from deadline to deadline.
    pub fn run_until_idle(&mut self) -> Vec<FiredTick> {
        let mut fired = Vec::new();
        while let Some(deadline) = self.next_deadline() {
            fired.extend(self.advance_to(deadline));
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use crafttree::recipe::RecipeStep;

    use super::*;

    const DELAY: Duration = Duration::from_millis(800);

    fn lava() -> Path {
        Path::new(vec![RecipeStep::new("Fire", "Earth", "Lava")])
    }

    #[test]
    fn first_tick_is_armed_one_delay_ahead() {
        let mut scheduler = TickScheduler::default();
        scheduler.start(PathKey::Shortest, &lava(), "Lava");
        assert_eq!(scheduler.next_deadline(), Some(DELAY));
        assert_eq!(scheduler.pending(), 1);

        assert!(scheduler.advance_by(DELAY / 2).is_empty());
        let fired = scheduler.advance_by(DELAY / 2);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].at, DELAY);
        assert!(fired[0].outcome.is_expanded());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn completed_builds_arm_nothing() {
        let mut scheduler = TickScheduler::default();
        scheduler.start(PathKey::Base("Water".into()), &Path::default(), "Water");
        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.run_until_idle().is_empty());
    }

    #[test]
    fn cancel_drops_the_timer() {
        let mut scheduler = TickScheduler::default();
        scheduler.start(PathKey::Shortest, &lava(), "Lava");
        assert!(scheduler.cancel(&PathKey::Shortest));
        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.engine().phase(&PathKey::Shortest).is_idle());
    }

    #[test]
    fn clock_does_not_move_backwards() {
        let mut scheduler = TickScheduler::default();
        scheduler.advance_by(Duration::from_secs(2));
        scheduler.advance_to(Duration::from_secs(1));
        assert_eq!(scheduler.now(), Duration::from_secs(2));
    }
}
