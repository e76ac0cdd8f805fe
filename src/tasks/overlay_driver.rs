//! Overlay driver background task
//!
//! One task owns the [`Overlay`]. Commands, pushed documents and timer
//! firings all arrive on the same queue and are applied one at a time, so
//! a tick never observes a half-applied command.

use std::{sync::Arc, time::Duration};

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::{
    services::RenderSink,
    state::{
        Clock, Command, DisplaySnapshot, Effect, Overlay, OverlayDoc, OverlayEvent, TimerFired,
        TimerKind,
    },
};

use super::scheduled::TaskSlot;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
const EVENT_QUEUE_SIZE: usize = 64;

/// Cloneable front door to a running overlay driver
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    events_tx: mpsc::Sender<OverlayEvent>,
    display_rx: watch::Receiver<DisplaySnapshot>,
}

impl OverlayHandle {
    /// Apply a command and wait for the resulting frame
    pub async fn command(&self, command: Command) -> Result<DisplaySnapshot, String> {
        let (reply, rx) = oneshot::channel();
        self.send(OverlayEvent::Command {
            command,
            reply: Some(reply),
        })
        .await?;
        rx.await
            .map_err(|e| format!("Overlay driver dropped the reply: {}", e))
    }

    /// Merge a pushed document and wait for the resulting frame
    pub async fn merge(&self, doc: OverlayDoc) -> Result<DisplaySnapshot, String> {
        let (reply, rx) = oneshot::channel();
        self.send(OverlayEvent::Document {
            doc,
            reply: Some(reply),
        })
        .await?;
        rx.await
            .map_err(|e| format!("Overlay driver dropped the reply: {}", e))
    }

    /// Current state in backing-store form
    pub async fn export(&self) -> Result<OverlayDoc, String> {
        let (reply, rx) = oneshot::channel();
        self.send(OverlayEvent::Export { reply }).await?;
        rx.await
            .map_err(|e| format!("Overlay driver dropped the reply: {}", e))
    }

    async fn send(&self, event: OverlayEvent) -> Result<(), String> {
        self.events_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to submit overlay event: {}", e))
    }

    /// Latest painted frame
    pub fn display(&self) -> DisplaySnapshot {
        self.display_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplaySnapshot> {
        self.display_rx.clone()
    }
}

struct OverlayDriver {
    overlay: Overlay,
    clock: Arc<dyn Clock>,
    sinks: Vec<Box<dyn RenderSink>>,
    events: mpsc::WeakSender<OverlayEvent>,
    tick: TaskSlot,
    auto_resume: TaskSlot,
    departing: TaskSlot,
    crossfade: TaskSlot,
}

/// Start the driver task for `overlay`.
///
/// The returned handle also feeds a watch channel with every painted frame,
/// on top of the extra `sinks`. The task ends once every handle is dropped.
pub fn spawn_overlay(
    overlay: Overlay,
    clock: Arc<dyn Clock>,
    mut sinks: Vec<Box<dyn RenderSink>>,
) -> OverlayHandle {
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_SIZE);
    let (display_tx, display_rx) = watch::channel(overlay.snapshot(clock.now_ms()));
    sinks.insert(0, Box::new(display_tx));

    let driver = OverlayDriver {
        overlay,
        clock,
        sinks,
        events: events_tx.downgrade(),
        tick: TaskSlot::new(TimerKind::Tick),
        auto_resume: TaskSlot::new(TimerKind::AutoResume),
        departing: TaskSlot::new(TimerKind::DepartingRelease),
        crossfade: TaskSlot::new(TimerKind::Crossfade),
    };

    tokio::spawn(driver.run(events_rx));

    OverlayHandle {
        events_tx,
        display_rx,
    }
}

impl OverlayDriver {
    async fn run(mut self, mut events_rx: mpsc::Receiver<OverlayEvent>) {
        info!("Starting overlay driver task");

        while let Some(event) = events_rx.recv().await {
            self.handle(event);
        }

        info!("Overlay driver stopped, all handles dropped");
    }

    fn handle(&mut self, event: OverlayEvent) {
        let now = self.clock.now_ms();

        match event {
            OverlayEvent::Command { command, reply } => {
                let effects = self.overlay.apply(command, now);
                self.apply_effects(effects);
                let snapshot = self.paint(now);
                if let Some(reply) = reply {
                    let _ = reply.send(snapshot);
                }
            }
            OverlayEvent::Document { doc, reply } => {
                let effects = self.overlay.merge_doc(doc, now);
                self.apply_effects(effects);
                let snapshot = self.paint(now);
                if let Some(reply) = reply {
                    let _ = reply.send(snapshot);
                }
            }
            OverlayEvent::Export { reply } => {
                let _ = reply.send(self.overlay.to_doc());
            }
            OverlayEvent::Timer(fired) => self.handle_timer(fired, now),
        }
    }

    fn handle_timer(&mut self, fired: TimerFired, now: i64) {
        let slot = match fired.kind {
            TimerKind::Tick => &mut self.tick,
            TimerKind::AutoResume => &mut self.auto_resume,
            TimerKind::DepartingRelease => &mut self.departing,
            TimerKind::Crossfade => &mut self.crossfade,
        };
        if !slot.accepts(fired) {
            debug!("Discarding stale {:?} timer", fired.kind);
            return;
        }
        if fired.kind != TimerKind::Tick {
            slot.finish();
        }

        let effects = match fired.kind {
            TimerKind::Tick => self.overlay.tick(now),
            TimerKind::AutoResume => self.overlay.auto_resume(now),
            TimerKind::DepartingRelease => self.overlay.release_departing(now),
            TimerKind::Crossfade => {
                self.overlay.complete_crossfade();
                Vec::new()
            }
        };
        self.apply_effects(effects);
        self.paint(now);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        let events = self.events.clone();
        for effect in effects {
            match effect {
                Effect::StartTicking => self.tick.arm_every(TICK_PERIOD, events.clone()),
                Effect::StopTicking => self.tick.cancel(),
                Effect::ArmAutoResume(delay) => self.auto_resume.arm_once(delay, events.clone()),
                Effect::CancelAutoResume => {
                    if self.auto_resume.is_armed() {
                        self.auto_resume.cancel();
                    }
                }
                Effect::ArmDepartingRelease(delay) => self.departing.arm_once(delay, events.clone()),
                Effect::CancelDepartingRelease => self.departing.cancel(),
                Effect::ArmCrossfade(delay) => self.crossfade.arm_once(delay, events.clone()),
            }
        }
    }

    fn paint(&mut self, now: i64) -> DisplaySnapshot {
        let snapshot = self.overlay.snapshot(now);
        for sink in self.sinks.iter_mut() {
            sink.paint(&snapshot);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MonotonicClock, StatusLabel};
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tokio::time::sleep;

    const T0: i64 = 1_700_000_000_000;

    struct CountingSink(Arc<AtomicUsize>);

    impl RenderSink for CountingSink {
        fn paint(&mut self, _snapshot: &DisplaySnapshot) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn spawn_default() -> OverlayHandle {
        spawn_overlay(Overlay::default(), Arc::new(MonotonicClock::new(T0)), Vec::new())
    }

    fn cmd(value: serde_json::Value) -> Command {
        Command::from_value(value)
    }

    #[tokio::test(start_paused = true)]
    async fn command_reply_carries_new_frame() {
        let handle = spawn_default();
        let frame = handle
            .command(cmd(json!({"type": "eta:setCountdown", "hours": 1, "minutes": 30})))
            .await
            .unwrap();

        assert_eq!(frame.status, StatusLabel::Departing);
        assert_eq!(frame.remaining_sec, 5400);
        assert_eq!(handle.display(), frame);
    }

    #[tokio::test(start_paused = true)]
    async fn departing_releases_after_window() {
        let handle = spawn_default();
        handle
            .command(cmd(json!({"type": "eta:setCountdown", "hours": 1, "minutes": 30})))
            .await
            .unwrap();

        sleep(Duration::from_millis(9_500)).await;
        assert_eq!(handle.display().status, StatusLabel::Departing);

        sleep(Duration::from_secs(1)).await;
        let frame = handle.display();
        assert_eq!(frame.status, StatusLabel::EnRoute);
        assert_eq!(frame.shown_status, StatusLabel::EnRoute);
        assert!(!frame.fading);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_arrives_and_stops() {
        let handle = spawn_default();
        handle
            .command(cmd(json!({"type": "eta:setCountdown", "minutes": 1})))
            .await
            .unwrap();

        sleep(Duration::from_secs(61)).await;
        let frame = handle.display();
        assert_eq!(frame.status, StatusLabel::Arrived);
        assert_eq!(frame.shown_status, StatusLabel::Arrived);
        assert_eq!(frame.remaining_sec, 0);
        assert_eq!(frame.progress, 1.0);
        assert_eq!(frame.eta_text, "ETA 0m");
    }

    #[tokio::test(start_paused = true)]
    async fn timed_pause_resumes_on_its_own() {
        let handle = spawn_default();
        handle
            .command(cmd(json!({"type": "eta:setCountdown", "hours": 1})))
            .await
            .unwrap();
        let paused = handle
            .command(cmd(json!({"type": "rv:pause", "reason": "break", "minutes": 5})))
            .await
            .unwrap();
        assert_eq!(paused.status, StatusLabel::PausedWithReason("break".to_string()));

        sleep(Duration::from_secs(4 * 60)).await;
        assert!(handle.display().status.is_paused());

        sleep(Duration::from_secs(61)).await;
        let frame = handle.display();
        assert_eq!(frame.status, StatusLabel::EnRoute);
        assert!((3595..=3600).contains(&frame.remaining_sec));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_resume_cancels_auto_resume() {
        let handle = spawn_default();
        handle
            .command(cmd(json!({"type": "eta:setCountdown", "hours": 2})))
            .await
            .unwrap();
        handle
            .command(cmd(json!({"type": "rv:pause", "minutes": 1})))
            .await
            .unwrap();
        handle.command(Command::Resume).await.unwrap();
        handle
            .command(cmd(json!({"type": "rv:pause"})))
            .await
            .unwrap();

        sleep(Duration::from_secs(120)).await;
        assert_eq!(handle.display().status, StatusLabel::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_timer_does_not_tick() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = spawn_overlay(
            Overlay::default(),
            Arc::new(MonotonicClock::new(T0)),
            vec![Box::new(CountingSink(counter.clone()))],
        );
        handle
            .command(cmd(json!({"type": "eta:setCountdown", "hours": 1})))
            .await
            .unwrap();
        handle
            .command(cmd(json!({"type": "rv:pause"})))
            .await
            .unwrap();

        // let the crossfade and departing timers settle
        sleep(Duration::from_secs(15)).await;
        let settled = counter.load(Ordering::SeqCst);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(counter.load(Ordering::SeqCst), settled);
    }

    #[tokio::test(start_paused = true)]
    async fn pushed_document_starts_ticking() {
        let handle = spawn_default();
        let doc: OverlayDoc = serde_json::from_value(json!({
            "baselineSec": 1200,
            "startedAt": T0,
            "endAt": T0 + 1_200_000,
            "paused": false
        }))
        .unwrap();
        handle.merge(doc).await.unwrap();

        sleep(Duration::from_millis(30_500)).await;
        let frame = handle.display();
        assert_eq!(frame.remaining_sec, 1170);
        assert_eq!(frame.status, StatusLabel::EnRoute);

        let exported = handle.export().await.unwrap();
        assert_eq!(exported.baseline_sec, Some(1200));
    }
}
