//! Window-gated burst scheduler.
//!
//! ## State Transitions
//!
//! ```text
//! Waiting -> Bursting -> BetweenBursts -> (Waiting | Bursting) ...
//! ```
//!
//! Each call to [`BurstScheduler::step`] makes one scheduling decision:
//! either a single wait until the window opens, or a full burst followed
//! by the inter-burst pause. [`BurstScheduler::run`] repeats `step`
//! until the playback device fails.

use std::convert::Infallible;
use std::time::Duration;

use chrono::Utc;

use super::ports::{Clock, EventReporter, PlaybackDevice, Sleeper};
use crate::error::PlaybackError;
use crate::events::PlaybackEvent;
use crate::playlist::{SelectionPolicy, SoundChooser};
use crate::window::ScheduleWindow;

/// Burst pacing, fixed for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstConfig {
    pub file_choice: SelectionPolicy,
    /// Playback attempts per burst.
    pub burst_repeat: u32,
    /// Pause between attempts inside a burst.
    pub intra_sleep: Duration,
    /// Pause after each burst before looking at the window again.
    pub inter_sleep: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Outside the window.
    Waiting,
    /// Playing sounds.
    Bursting,
    /// Burst finished, pausing before the next decision.
    BetweenBursts,
}

/// Counts for one completed burst.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BurstSummary {
    pub played: u32,
    /// Iterations skipped because no sound could be chosen.
    pub missed: u32,
    /// Events the reporter refused.
    pub unreported: u32,
}

/// Result of one [`BurstScheduler::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Slept this long waiting for the window.
    Waited(Duration),
    /// Ran a burst and the inter-burst pause.
    Burst(BurstSummary),
}

/// Drives playback bursts inside a daily window.
pub struct BurstScheduler<C, S, P, R> {
    window: ScheduleWindow,
    chooser: SoundChooser,
    config: BurstConfig,
    clock: C,
    sleeper: S,
    player: P,
    reporter: R,
    state: SchedulerState,
}

impl<C, S, P, R> BurstScheduler<C, S, P, R>
where
    C: Clock,
    S: Sleeper,
    P: PlaybackDevice,
    R: EventReporter,
{
    pub fn new(
        window: ScheduleWindow,
        chooser: SoundChooser,
        config: BurstConfig,
        clock: C,
        sleeper: S,
        player: P,
        reporter: R,
    ) -> Self {
        Self {
            window,
            chooser,
            config,
            clock,
            sleeper,
            player,
            reporter,
            state: SchedulerState::Waiting,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn window(&self) -> &ScheduleWindow {
        &self.window
    }

    pub fn chooser(&self) -> &SoundChooser {
        &self.chooser
    }

    /// Run until the playback device fails.
    pub async fn run(&mut self) -> Result<Infallible, PlaybackError> {
        loop {
            self.step().await?;
        }
    }

    /// Make one scheduling decision and carry it out.
    pub async fn step(&mut self) -> Result<StepOutcome, PlaybackError> {
        let wait = self.window.time_until_open_at(&self.clock.now());
        if !wait.is_zero() {
            self.state = SchedulerState::Waiting;
            tracing::info!("sleeping until next window ({wait:?})");
            self.sleeper.sleep(wait).await;
            return Ok(StepOutcome::Waited(wait));
        }

        self.state = SchedulerState::Bursting;
        tracing::info!(repeat = self.config.burst_repeat, "starting burst");
        let summary = self.burst().await?;

        self.state = SchedulerState::BetweenBursts;
        tracing::info!(
            played = summary.played,
            missed = summary.missed,
            "sleeping for {:?}",
            self.config.inter_sleep
        );
        self.sleeper.sleep(self.config.inter_sleep).await;
        Ok(StepOutcome::Burst(summary))
    }

    async fn burst(&mut self) -> Result<BurstSummary, PlaybackError> {
        let mut summary = BurstSummary::default();
        for attempt in 0..self.config.burst_repeat {
            if attempt > 0 {
                self.sleeper.sleep(self.config.intra_sleep).await;
            }

            let Some(sound) = self.chooser.choose(self.config.file_choice) else {
                tracing::warn!(choice = %self.config.file_choice, "no sound available, skipping");
                summary.missed += 1;
                continue;
            };

            let started = self.clock.now().with_timezone(&Utc);
            tracing::debug!(id = sound.id, path = %sound.path.display(), "playing");
            self.player.play(&sound.path).await?;
            summary.played += 1;

            if let Err(e) = self.reporter.report(PlaybackEvent::new(started, &sound)) {
                tracing::warn!("failed to queue event: {e}");
                summary.unreported += 1;
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::playlist::SoundCatalogue;
    use async_trait::async_trait;
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    /// Clock and sleeper sharing one timeline: sleeping advances time.
    #[derive(Clone)]
    struct Timeline {
        now: Arc<Mutex<DateTime<FixedOffset>>>,
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl Timeline {
        fn at(h: u32, m: u32) -> Self {
            let start = FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 10, h, m, 0)
                .unwrap();
            Self {
                now: Arc::new(Mutex::new(start)),
                sleeps: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl Clock for Timeline {
        type Tz = FixedOffset;

        fn now(&self) -> DateTime<FixedOffset> {
            *self.now.lock().unwrap()
        }
    }

    #[async_trait]
    impl Sleeper for Timeline {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(duration).unwrap();
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        played: Arc<Mutex<Vec<PathBuf>>>,
        events: Arc<Mutex<Vec<PlaybackEvent>>>,
        fail_play: bool,
        fail_report: bool,
    }

    #[async_trait]
    impl PlaybackDevice for Recorder {
        async fn play(&self, path: &Path) -> Result<(), PlaybackError> {
            if self.fail_play {
                return Err(PlaybackError::PlayerFailed {
                    path: path.to_path_buf(),
                    status: "exit status: 1".into(),
                    output: "no such device".into(),
                });
            }
            self.played.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    impl EventReporter for Recorder {
        fn report(&self, event: PlaybackEvent) -> Result<(), ReportError> {
            if self.fail_report {
                return Err(ReportError::QueueClosed);
            }
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn window(start: (u32, u32), end: (u32, u32)) -> ScheduleWindow {
        ScheduleWindow::new(
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    fn two_sounds() -> SoundCatalogue {
        [(1, PathBuf::from("a.wav")), (2, PathBuf::from("b.wav"))]
            .into_iter()
            .collect()
    }

    fn config(file_choice: SelectionPolicy, burst_repeat: u32) -> BurstConfig {
        BurstConfig {
            file_choice,
            burst_repeat,
            intra_sleep: Duration::from_secs(5),
            inter_sleep: Duration::from_secs(600),
        }
    }

    type TestScheduler = BurstScheduler<Timeline, Timeline, Recorder, Recorder>;

    fn scheduler(
        timeline: &Timeline,
        recorder: &Recorder,
        window: ScheduleWindow,
        catalogue: SoundCatalogue,
        config: BurstConfig,
    ) -> TestScheduler {
        BurstScheduler::new(
            window,
            SoundChooser::with_seed(catalogue, 11),
            config,
            timeline.clone(),
            timeline.clone(),
            recorder.clone(),
            recorder.clone(),
        )
    }

    #[tokio::test]
    async fn starts_waiting() {
        let timeline = Timeline::at(12, 0);
        let recorder = Recorder::default();
        let s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::Random, 1),
        );
        assert_eq!(s.state(), SchedulerState::Waiting);
    }

    #[tokio::test]
    async fn outside_window_sleeps_once_until_open() {
        let timeline = Timeline::at(6, 0);
        let recorder = Recorder::default();
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::Random, 3),
        );

        let outcome = s.step().await.unwrap();
        assert_eq!(outcome, StepOutcome::Waited(Duration::from_secs(2 * 3600)));
        assert_eq!(s.state(), SchedulerState::Waiting);
        assert_eq!(timeline.sleeps(), vec![Duration::from_secs(2 * 3600)]);
        assert!(recorder.played.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn burst_of_three_paces_with_intra_then_inter_sleep() {
        let timeline = Timeline::at(9, 0);
        let recorder = Recorder::default();
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::Explicit(2), 3),
        );

        let outcome = s.step().await.unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Burst(BurstSummary {
                played: 3,
                missed: 0,
                unreported: 0
            })
        );
        assert_eq!(s.state(), SchedulerState::BetweenBursts);
        assert_eq!(recorder.played.lock().unwrap().len(), 3);
        assert_eq!(
            timeline.sleeps(),
            vec![
                Duration::from_secs(5),
                Duration::from_secs(5),
                Duration::from_secs(600)
            ]
        );
    }

    #[tokio::test]
    async fn events_follow_playback_order_with_attempt_time() {
        let timeline = Timeline::at(9, 0);
        let recorder = Recorder::default();
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::Explicit(1), 2),
        );
        s.step().await.unwrap();

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].file_name, "a.wav");
        assert_eq!(events[0].sound_id, 1);
        assert_eq!(
            events[0].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
        );
        assert_eq!(
            events[1].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 5).unwrap()
        );
    }

    #[tokio::test]
    async fn selection_miss_skips_iteration() {
        let timeline = Timeline::at(9, 0);
        let recorder = Recorder::default();
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::Explicit(42), 2),
        );

        let outcome = s.step().await.unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Burst(BurstSummary {
                played: 0,
                missed: 2,
                unreported: 0
            })
        );
        assert!(recorder.played.lock().unwrap().is_empty());
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeat_previous_misses_until_something_was_chosen() {
        let timeline = Timeline::at(9, 0);
        let recorder = Recorder::default();
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::RepeatPrevious, 2),
        );
        let outcome = s.step().await.unwrap();
        assert!(matches!(outcome, StepOutcome::Burst(BurstSummary { played: 0, missed: 2, .. })));
    }

    #[tokio::test]
    async fn empty_catalogue_with_random_is_a_miss() {
        let timeline = Timeline::at(9, 0);
        let recorder = Recorder::default();
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            SoundCatalogue::new(),
            config(SelectionPolicy::Random, 1),
        );
        let outcome = s.step().await.unwrap();
        assert!(matches!(outcome, StepOutcome::Burst(BurstSummary { played: 0, missed: 1, .. })));
    }

    #[tokio::test]
    async fn reporting_failure_does_not_stop_burst() {
        let timeline = Timeline::at(9, 0);
        let recorder = Recorder {
            fail_report: true,
            ..Default::default()
        };
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::Random, 3),
        );
        let outcome = s.step().await.unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Burst(BurstSummary {
                played: 3,
                missed: 0,
                unreported: 3
            })
        );
    }

    #[tokio::test]
    async fn playback_failure_is_fatal() {
        let timeline = Timeline::at(9, 0);
        let recorder = Recorder {
            fail_play: true,
            ..Default::default()
        };
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::Random, 3),
        );

        let err = s.run().await.unwrap_err();
        assert!(matches!(err, PlaybackError::PlayerFailed { .. }));
        assert_eq!(s.state(), SchedulerState::Bursting);
        assert!(timeline.sleeps().is_empty());
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_repeat_burst_still_pauses() {
        let timeline = Timeline::at(9, 0);
        let recorder = Recorder::default();
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((8, 0), (18, 0)),
            two_sounds(),
            config(SelectionPolicy::Random, 0),
        );
        let outcome = s.step().await.unwrap();
        assert_eq!(outcome, StepOutcome::Burst(BurstSummary::default()));
        assert_eq!(timeline.sleeps(), vec![Duration::from_secs(600)]);
    }

    #[tokio::test]
    async fn wrapping_window_bursts_after_midnight() {
        let timeline = Timeline::at(3, 0);
        let recorder = Recorder::default();
        let mut s = scheduler(
            &timeline,
            &recorder,
            window((22, 0), (6, 0)),
            two_sounds(),
            config(SelectionPolicy::Random, 1),
        );
        assert!(matches!(s.step().await.unwrap(), StepOutcome::Burst(_)));
    }

    #[test]
    fn timeline_starts_on_fixed_date() {
        let t = Timeline::at(8, 2);
        assert_eq!(
            t.now().naive_local(),
            NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(8, 2, 0)
                .unwrap()
        );
    }
}
