//! Timer-driven replay scheduler.
//!
//! State machine: `Idle -> Loaded -> Playing -> Done`. A
//! `combat_result` with a usable transcript loads a session and starts
//! a playback task; each scheduler tick consumes exactly one line.
//! Cancellation aborts the task and is idempotent; at most one live
//! session exists, and starting a new one cancels the prior one first.

use std::sync::Arc;
use std::time::Duration;

use game_protocol::{CharacterSnapshot, CombatResultPayload};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::combat::session::{CombatSession, TickOutcome};
use crate::sink::CombatRenderSink;

/// Reference playback cadence: one transcript line per 200 ms.
pub const DEFAULT_TICK: Duration = Duration::from_millis(200);

/// Why a `combat_result` message did not start playback. The engine
/// stays `Idle` in every case.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatStartError {
    #[error("combat refused by server: {0}")]
    Refused(String),
    #[error("combat result carried no transcript")]
    EmptyTranscript,
}

/// Cancellation token for a running replay.
///
/// Cloneable and idempotent: canceling twice, or after the replay
/// finished on its own, is a no-op. No further ticks fire after
/// cancellation.
#[derive(Clone, Debug)]
pub struct ReplayTicket {
    abort: AbortHandle,
}

impl ReplayTicket {
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// True once playback completed or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Owns the single active replay session.
pub struct CombatReplayEngine {
    sink: Arc<dyn CombatRenderSink>,
    /// Victorious replays push the refreshed character sheet here for
    /// the session context to apply.
    refresh: mpsc::UnboundedSender<CharacterSnapshot>,
    tick: Duration,
    active: Option<(ReplayTicket, JoinHandle<()>)>,
}

impl CombatReplayEngine {
    pub fn new(
        sink: Arc<dyn CombatRenderSink>,
        refresh: mpsc::UnboundedSender<CharacterSnapshot>,
    ) -> Self {
        Self::with_tick(sink, refresh, DEFAULT_TICK)
    }

    /// Overrides the playback cadence (tests, local replay tooling).
    pub fn with_tick(
        sink: Arc<dyn CombatRenderSink>,
        refresh: mpsc::UnboundedSender<CharacterSnapshot>,
        tick: Duration,
    ) -> Self {
        Self {
            sink,
            refresh,
            tick,
            active: None,
        }
    }

    /// Loads a combat result and starts playback.
    ///
    /// A failed or empty payload leaves the engine `Idle` and returns
    /// the reason; the caller surfaces it as a notice, not an
    /// exception. A replay already in flight is cancelled first.
    pub fn start(&mut self, payload: CombatResultPayload) -> Result<ReplayTicket, CombatStartError> {
        if payload.is_failure() {
            let reason = payload.error.unwrap_or_else(|| "combat failed".to_owned());
            return Err(CombatStartError::Refused(reason));
        }
        if payload.logs.is_empty() {
            return Err(CombatStartError::EmptyTranscript);
        }

        self.cancel();

        let session = CombatSession::new(payload);
        tracing::debug!(lines = session.remaining(), "starting combat replay");
        self.sink.combat_started(session.view());

        let handle = tokio::spawn(playback(
            session,
            Arc::clone(&self.sink),
            self.refresh.clone(),
            self.tick,
        ));
        let ticket = ReplayTicket {
            abort: handle.abort_handle(),
        };
        self.active = Some((ticket.clone(), handle));
        Ok(ticket)
    }

    /// Cancels any replay in flight. Idempotent; safe when idle.
    pub fn cancel(&mut self) {
        if let Some((ticket, _handle)) = self.active.take() {
            ticket.cancel();
        }
    }

    /// True while a replay task is still consuming its transcript.
    pub fn is_playing(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|(ticket, _)| !ticket.is_finished())
    }
}

impl Drop for CombatReplayEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The playback loop. One line per tick; the first tick fires one full
/// interval after start, matching the reference cadence. Ticks are
/// scheduled at the interval, never back-to-back, so a slow sink
/// delays rather than bursts.
async fn playback(
    mut session: CombatSession,
    sink: Arc<dyn CombatRenderSink>,
    refresh: mpsc::UnboundedSender<CharacterSnapshot>,
    tick: Duration,
) {
    let mut ticks = time::interval_at(Instant::now() + tick, tick);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;
        match session.advance() {
            Some(TickOutcome::Seeded) | Some(TickOutcome::StatusApplied) => {
                sink.combat_updated(session.view());
            }
            Some(TickOutcome::Rendered(line)) => sink.combat_line(&line),
            None => break,
        }
        if session.is_finished() {
            let victory = session.victory();
            if victory {
                if let Some(character) = session.take_character() {
                    // Receiver gone means the session is shutting down.
                    let _ = refresh.send(character);
                }
            }
            sink.combat_finished(session.view(), victory);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use game_protocol::TextLine;

    use super::*;
    use crate::combat::session::CombatView;

    #[derive(Debug, PartialEq)]
    enum Event {
        Started,
        Updated,
        Line(String),
        Finished(bool),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingSink {
        fn len(&self) -> usize {
            self.events.lock().unwrap().len()
        }
    }

    impl CombatRenderSink for RecordingSink {
        fn combat_started(&self, _view: &CombatView) {
            self.events.lock().unwrap().push(Event::Started);
        }

        fn combat_updated(&self, _view: &CombatView) {
            self.events.lock().unwrap().push(Event::Updated);
        }

        fn combat_line(&self, line: &TextLine) {
            self.events.lock().unwrap().push(Event::Line(line.text.clone()));
        }

        fn combat_finished(&self, _view: &CombatView, victory: bool) {
            self.events.lock().unwrap().push(Event::Finished(victory));
        }
    }

    fn payload(logs: &[&str], victory: bool) -> CombatResultPayload {
        CombatResultPayload {
            logs: logs.iter().map(|s| (*s).to_owned()).collect(),
            victory,
            ..CombatResultPayload::default()
        }
    }

    fn engine(sink: &Arc<RecordingSink>) -> (CombatReplayEngine, mpsc::UnboundedReceiver<CharacterSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine =
            CombatReplayEngine::with_tick(Arc::clone(sink) as Arc<dyn CombatRenderSink>, tx, DEFAULT_TICK);
        (engine, rx)
    }

    async fn run_ticks(n: u32) {
        // Paused clock: sleeping auto-advances virtual time, letting
        // the playback task observe each interval tick.
        time::sleep(DEFAULT_TICK * n + Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn n_lines_replay_in_n_ticks() {
        let sink = Arc::new(RecordingSink::default());
        let (mut engine, _rx) = engine(&sink);

        engine
            .start(payload(&["--- 第1回合 ---", "你对Wolf造成 20 点伤害", "🎉 胜利!"], true))
            .unwrap();
        run_ticks(3).await;

        let events = sink.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                Event::Started,
                Event::Line("--- 第1回合 ---".to_owned()),
                Event::Line("你对Wolf造成 20 点伤害".to_owned()),
                Event::Line("🎉 胜利!".to_owned()),
                Event::Finished(true),
            ]
        );
        drop(events);
        assert!(!engine.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_future_ticks() {
        let sink = Arc::new(RecordingSink::default());
        let (mut engine, _rx) = engine(&sink);

        engine
            .start(payload(&["a", "b", "c", "d", "e"], false))
            .unwrap();
        run_ticks(2).await;
        let seen = sink.len();
        assert_eq!(seen, 3); // Started + 2 lines

        engine.cancel();
        engine.cancel(); // idempotent
        run_ticks(5).await;
        assert_eq!(sink.len(), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn new_start_cancels_prior_session() {
        let sink = Arc::new(RecordingSink::default());
        let (mut engine, _rx) = engine(&sink);

        engine
            .start(payload(&["old1", "old2", "old3", "old4"], false))
            .unwrap();
        run_ticks(1).await;

        engine.start(payload(&["new1"], false)).unwrap();
        run_ticks(5).await;

        let events = sink.events.lock().unwrap();
        // The old transcript stops at the line it reached; only the new
        // transcript completes.
        assert!(events.contains(&Event::Line("new1".to_owned())));
        assert!(!events.contains(&Event::Line("old2".to_owned())));
        assert_eq!(events.last(), Some(&Event::Finished(false)));
    }

    #[tokio::test(start_paused = true)]
    async fn victory_emits_character_refresh_before_finish() {
        let sink = Arc::new(RecordingSink::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = CombatReplayEngine::with_tick(
            Arc::clone(&sink) as Arc<dyn CombatRenderSink>,
            tx,
            DEFAULT_TICK,
        );

        let mut result = payload(&["🎉 胜利! 获得 30 经验"], true);
        result.character = Some(CharacterSnapshot {
            level: 8,
            ..CharacterSnapshot::default()
        });
        engine.start(result).unwrap();
        run_ticks(1).await;

        assert_eq!(rx.recv().await.unwrap().level, 8);
        assert_eq!(
            sink.events.lock().unwrap().last(),
            Some(&Event::Finished(true))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refused_and_empty_payloads_stay_idle() {
        let sink = Arc::new(RecordingSink::default());
        let (mut engine, _rx) = engine(&sink);

        let mut refused = payload(&["ignored"], false);
        refused.success = Some(false);
        refused.error = Some("没有怪物".to_owned());
        assert_eq!(
            engine.start(refused).unwrap_err(),
            CombatStartError::Refused("没有怪物".to_owned())
        );

        assert_eq!(
            engine.start(payload(&[], true)).unwrap_err(),
            CombatStartError::EmptyTranscript
        );

        run_ticks(3).await;
        assert_eq!(sink.len(), 0);
        assert!(!engine.is_playing());
    }
}
