//! Countdown timer as an explicit state machine.
//!
//! `Countdown::transition` is pure; `CountdownTimer` owns the one-second
//! ticker and publishes every state change on a watch channel.

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownAction {
    Start(u64),
    Pause,
    Resume,
    Reset,
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub phase: Phase,
    pub time_left: u64,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            time_left: 0,
        }
    }
}

impl Countdown {
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    #[must_use]
    pub fn transition(self, action: CountdownAction) -> Self {
        use CountdownAction::*;
        use Phase::*;

        match (self.phase, action) {
            // Starting from zero has nothing to count down.
            (_, Start(0)) => Self {
                phase: Finished,
                time_left: 0,
            },
            (_, Start(seconds)) => Self {
                phase: Running,
                time_left: seconds,
            },
            (Running, Pause) => Self {
                phase: Paused,
                ..self
            },
            (Paused, Resume) if self.time_left > 0 => Self {
                phase: Running,
                ..self
            },
            (_, Reset) => Self::default(),
            (Running, Tick) if self.time_left <= 1 => Self {
                phase: Finished,
                time_left: 0,
            },
            (Running, Tick) => Self {
                time_left: self.time_left - 1,
                ..self
            },
            _ => self,
        }
    }
}

/// `MM:SS`, or `HH:MM:SS` once there is at least an hour left.
pub fn format_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Drives `Tick` once per second while running. Any outside change restarts
/// the one-second period, so a resume never ticks early.
pub struct CountdownTimer {
    tx: Arc<watch::Sender<Countdown>>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Must be called inside a tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = watch::channel(Countdown::default());
        let tx = Arc::new(tx);
        let task = tokio::spawn(run_ticker(tx.clone(), rx));
        Self { tx, task }
    }

    pub fn dispatch(&self, action: CountdownAction) {
        self.tx.send_if_modified(|state| {
            let next = state.transition(action);
            let changed = next != *state;
            *state = next;
            changed
        });
        debug!(?action, "countdown action");
    }

    pub fn start(&self, seconds: u64) {
        self.dispatch(CountdownAction::Start(seconds));
    }

    pub fn pause(&self) {
        self.dispatch(CountdownAction::Pause);
    }

    pub fn resume(&self) {
        self.dispatch(CountdownAction::Resume);
    }

    pub fn reset(&self) {
        self.dispatch(CountdownAction::Reset);
    }

    pub fn snapshot(&self) -> Countdown {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Countdown> {
        self.tx.subscribe()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_ticker(tx: Arc<watch::Sender<Countdown>>, mut rx: watch::Receiver<Countdown>) {
    loop {
        let running = rx.borrow_and_update().is_running();
        if !running {
            if rx.changed().await.is_err() {
                return;
            }
            continue;
        }

        tokio::select! {
            _ = tokio::time::sleep(TICK) => {
                tx.send_if_modified(|state| {
                    let next = state.transition(CountdownAction::Tick);
                    let changed = next != *state;
                    *state = next;
                    changed
                });
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CountdownAction::*;

    fn at(phase: Phase, time_left: u64) -> Countdown {
        Countdown { phase, time_left }
    }

    fn run(actions: &[CountdownAction]) -> Countdown {
        actions
            .iter()
            .fold(Countdown::default(), |state, action| state.transition(*action))
    }

    #[test]
    fn five_ticks_finish_a_five_second_countdown() {
        let state = run(&[Start(5), Tick, Tick, Tick, Tick]);
        assert_eq!(state, at(Phase::Running, 1));
        let state = state.transition(Tick);
        assert_eq!(state, at(Phase::Finished, 0));
    }

    #[test]
    fn pause_and_resume_keep_the_remaining_time() {
        let paused = run(&[Start(10), Tick, Tick, Pause]);
        assert_eq!(paused, at(Phase::Paused, 8));
        assert_eq!(paused.transition(Tick), paused);
        let resumed = paused.transition(Resume);
        assert_eq!(resumed, at(Phase::Running, 8));
    }

    #[test]
    fn resume_is_ignored_outside_paused() {
        assert_eq!(run(&[Resume]).phase, Phase::Idle);
        assert_eq!(run(&[Start(1), Tick, Resume]).phase, Phase::Finished);
        assert_eq!(run(&[Start(3), Resume]).time_left, 3);
    }

    #[test]
    fn reset_returns_to_idle_from_anywhere() {
        for prefix in [&[Start(4)][..], &[Start(4), Pause], &[Start(1), Tick], &[]] {
            let mut actions = prefix.to_vec();
            actions.push(Reset);
            assert_eq!(run(&actions), Countdown::default());
        }
    }

    #[test]
    fn start_restarts_and_zero_finishes_immediately() {
        assert_eq!(run(&[Start(1), Tick, Start(3)]).time_left, 3);
        assert_eq!(run(&[Start(0)]).phase, Phase::Finished);
        assert_eq!(run(&[Start(5), Pause, Start(2)]).phase, Phase::Running);
    }

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3599), "59:59");
        assert_eq!(format_time(3661), "01:01:01");
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_to_finished() {
        let timer = CountdownTimer::spawn();
        timer.start(5);
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(timer.snapshot(), at(Phase::Finished, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_pause_freezes_and_resume_continues() {
        let timer = CountdownTimer::spawn();
        timer.start(10);
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        timer.pause();
        assert_eq!(timer.snapshot(), at(Phase::Paused, 7));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(timer.snapshot().time_left, 7);

        timer.resume();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(timer.snapshot(), at(Phase::Running, 5));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_finish() {
        let timer = CountdownTimer::spawn();
        let mut rx = timer.subscribe();
        timer.start(2);
        let finished = rx.wait_for(Countdown::is_finished).await.map(|s| *s);
        assert_eq!(finished.unwrap().time_left, 0);
    }
}
