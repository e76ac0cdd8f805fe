//! Cancellable scheduled timers feeding the overlay event queue

use std::time::Duration;

use tokio::{
    sync::mpsc::WeakSender,
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::state::{OverlayEvent, TimerFired, TimerKind};

/// Handle to a spawned timer; aborting it (or dropping it) stops any further firing
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Fire once after `delay`
    pub fn once(delay: Duration, events: WeakSender<OverlayEvent>, fired: TimerFired) -> Self {
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            if let Some(tx) = events.upgrade() {
                let _ = tx.send(OverlayEvent::Timer(fired)).await;
            }
        });
        Self { handle }
    }

    /// Fire every `period`, first firing one period from now
    pub fn every(period: Duration, events: WeakSender<OverlayEvent>, fired: TimerFired) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(tx) = events.upgrade() else {
                    break;
                };
                if tx.send(OverlayEvent::Timer(fired)).await.is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Holds at most one pending timer of a kind.
///
/// Arming cancels the previous timer first and bumps the generation, so an
/// event the old timer already queued is recognised as stale.
#[derive(Debug)]
pub struct TaskSlot {
    kind: TimerKind,
    generation: u64,
    task: Option<ScheduledTask>,
}

impl TaskSlot {
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            generation: 0,
            task: None,
        }
    }

    fn next_fired(&mut self) -> TimerFired {
        self.cancel();
        TimerFired {
            kind: self.kind,
            generation: self.generation,
        }
    }

    pub fn arm_once(&mut self, delay: Duration, events: WeakSender<OverlayEvent>) {
        let fired = self.next_fired();
        debug!("Arming {:?} timer in {:?}", self.kind, delay);
        self.task = Some(ScheduledTask::once(delay, events, fired));
    }

    pub fn arm_every(&mut self, period: Duration, events: WeakSender<OverlayEvent>) {
        let fired = self.next_fired();
        debug!("Arming {:?} loop every {:?}", self.kind, period);
        self.task = Some(ScheduledTask::every(period, events, fired));
    }

    /// Cancel the pending timer, if any
    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(task) = self.task.take() {
            debug!("Cancelling {:?} timer", self.kind);
            task.cancel();
        }
    }

    /// Check that a firing comes from the currently armed timer
    pub fn accepts(&self, fired: TimerFired) -> bool {
        self.task.is_some() && fired.kind == self.kind && fired.generation == self.generation
    }

    /// Forget a one-shot timer that has fired
    pub fn finish(&mut self) {
        self.task = None;
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }
}
