//! Registry of running countdown timers.
//!
//! Each timer is a tokio task ticking on `interval(tick)`. The task owns the
//! timer's lifecycle: when it ends, for whatever reason, its epilogue splices
//! the entry out of the registry and then runs the caller's `on_cancel`
//! callback, so removal happens exactly once. External cancellation only
//! cancels the token and awaits the task.
//!
//! `set` and `cancel` are serialized by an async mutation lock, so a
//! cancel-all never races a concurrent insertion.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use voxa_types::config::TimerConfig;
use voxa_types::timer::{TimerId, TimerSnapshot};

use crate::text::name_distance;

type TimerList = Mutex<Vec<Arc<TimerEntry>>>;

/// Hooks invoked from a timer's countdown task.
///
/// All callbacks run on the timer task and must not block.
#[derive(Clone)]
pub struct TimerCallbacks {
    /// Every tick, with the remaining milliseconds (negative once expired).
    pub on_millis_tick: Arc<dyn Fn(i64) + Send + Sync>,
    /// Once per whole second crossed, with the seconds left (at least 1).
    pub on_seconds_tick: Arc<dyn Fn(u64) + Send + Sync>,
    /// Exactly once, when the remaining time first reaches zero.
    pub on_expired: Arc<dyn Fn(&TimerSnapshot) + Send + Sync>,
    /// After the timer has been removed from the registry.
    pub on_cancel: Arc<dyn Fn(&TimerSnapshot) + Send + Sync>,
}

impl Default for TimerCallbacks {
    fn default() -> Self {
        Self {
            on_millis_tick: Arc::new(|_| {}),
            on_seconds_tick: Arc::new(|_| {}),
            on_expired: Arc::new(|_: &TimerSnapshot| {}),
            on_cancel: Arc::new(|_: &TimerSnapshot| {}),
        }
    }
}

impl fmt::Debug for TimerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerCallbacks").finish_non_exhaustive()
    }
}

/// Result of looking a timer up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    NoActiveTimers,
    /// `only_one` is set when this is the only running timer.
    Found { timer: TimerSnapshot, only_one: bool },
    NotFound { name: String },
}

/// Result of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    NoActiveTimers,
    /// Snapshots of the removed timers, in the order they were set.
    Cancelled(Vec<TimerSnapshot>),
    NotFound { name: String },
}

struct TimerEntry {
    id: TimerId,
    name: Option<String>,
    duration: Duration,
    remaining_ms: AtomicI64,
    token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TimerEntry {
    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            id: self.id,
            name: self.name.clone(),
            duration_ms: u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX),
            remaining_ms: self.remaining_ms.load(Ordering::SeqCst),
        }
    }
}

/// Owner of every running timer.
pub struct TimerRegistry {
    timers: Arc<TimerList>,
    mutations: tokio::sync::Mutex<()>,
    tick: Duration,
    name_threshold: i32,
    dismiss_on_expiry: bool,
    shutdown: CancellationToken,
}

impl TimerRegistry {
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            timers: Arc::new(Mutex::new(Vec::new())),
            mutations: tokio::sync::Mutex::new(()),
            tick: Duration::from_millis(config.tick_millis.max(1)),
            name_threshold: config.name_threshold,
            dismiss_on_expiry: config.dismiss_on_expiry,
            shutdown: CancellationToken::new(),
        }
    }

    /// Start a countdown. Blank names are stored as unnamed.
    pub async fn set(
        &self,
        duration: Duration,
        name: Option<String>,
        callbacks: TimerCallbacks,
    ) -> TimerSnapshot {
        let _guard = self.mutations.lock().await;

        let name = name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let total_ms = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        let entry = Arc::new(TimerEntry {
            id: TimerId::new(),
            name,
            duration,
            remaining_ms: AtomicI64::new(total_ms),
            token: self.shutdown.child_token(),
            task: Mutex::new(None),
        });

        self.timers
            .lock()
            .expect("timer list lock poisoned")
            .push(Arc::clone(&entry));

        let handle = tokio::spawn(countdown(
            Arc::clone(&entry),
            Arc::downgrade(&self.timers),
            callbacks,
            self.tick,
            self.dismiss_on_expiry,
        ));
        *entry.task.lock().expect("timer task lock poisoned") = Some(handle);

        let snapshot = entry.snapshot();
        info!(timer = %snapshot.id, name = ?snapshot.name, duration_ms = snapshot.duration_ms, "timer set");
        snapshot
    }

    /// Find a timer: the most recently set one, or the closest name match.
    pub fn query(&self, name: Option<&str>) -> QueryOutcome {
        let timers = self.timers.lock().expect("timer list lock poisoned");
        let Some(last) = timers.last() else {
            return QueryOutcome::NoActiveTimers;
        };

        match name {
            None => QueryOutcome::Found {
                timer: last.snapshot(),
                only_one: timers.len() == 1,
            },
            Some(query) => match self.find_by_name(&timers, query) {
                Some(entry) => QueryOutcome::Found {
                    timer: entry.snapshot(),
                    only_one: timers.len() == 1,
                },
                None => QueryOutcome::NotFound {
                    name: query.to_string(),
                },
            },
        }
    }

    /// Cancel one timer by name, or all of them when `name` is `None`.
    ///
    /// Returns once every targeted countdown task has finished, so the
    /// cancelled timers no longer appear in [`snapshot`](Self::snapshot).
    pub async fn cancel(&self, name: Option<&str>) -> CancelOutcome {
        let _guard = self.mutations.lock().await;

        let targets: Vec<Arc<TimerEntry>> = {
            let timers = self.timers.lock().expect("timer list lock poisoned");
            if timers.is_empty() {
                return CancelOutcome::NoActiveTimers;
            }
            match name {
                None => timers.clone(),
                Some(query) => match self.find_by_name(&timers, query) {
                    Some(entry) => vec![entry],
                    None => {
                        debug!(name = query, "no timer matches name");
                        return CancelOutcome::NotFound {
                            name: query.to_string(),
                        };
                    }
                },
            }
        };

        let cancelled = stop_entries(targets).await;
        info!(count = cancelled.len(), "timers cancelled");
        CancelOutcome::Cancelled(cancelled)
    }

    /// Running timers in the order they were set.
    pub fn snapshot(&self) -> Vec<TimerSnapshot> {
        self.timers
            .lock()
            .expect("timer list lock poisoned")
            .iter()
            .map(|entry| entry.snapshot())
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.timers.lock().expect("timer list lock poisoned").len()
    }

    /// Cancel every timer and wait for the countdown tasks to finish.
    pub async fn shutdown(&self) {
        let _guard = self.mutations.lock().await;
        self.shutdown.cancel();
        let targets = self.timers.lock().expect("timer list lock poisoned").clone();
        let stopped = stop_entries(targets).await;
        debug!(count = stopped.len(), "timers stopped on shutdown");
    }

    fn find_by_name(&self, timers: &[Arc<TimerEntry>], query: &str) -> Option<Arc<TimerEntry>> {
        timers
            .iter()
            .filter_map(|entry| {
                let distance = name_distance(query, entry.name.as_deref()?);
                (distance < self.name_threshold).then_some((distance, entry))
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, entry)| Arc::clone(entry))
    }
}

impl fmt::Debug for TimerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerRegistry")
            .field("active", &self.active_count())
            .field("tick", &self.tick)
            .field("name_threshold", &self.name_threshold)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Countdown task
// ---------------------------------------------------------------------------

/// Cancel the entries' tasks and wait for each epilogue to finish.
async fn stop_entries(targets: Vec<Arc<TimerEntry>>) -> Vec<TimerSnapshot> {
    for entry in &targets {
        entry.token.cancel();
    }
    let mut stopped = Vec::with_capacity(targets.len());
    for entry in targets {
        let handle = entry.task.lock().expect("timer task lock poisoned").take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(timer = %entry.id, error = %e, "timer task ended abnormally");
            }
        }
        stopped.push(entry.snapshot());
    }
    stopped
}

/// Seconds left, rounded up; zero once expired.
fn whole_seconds(remaining_ms: i64) -> i64 {
    if remaining_ms <= 0 {
        0
    } else {
        remaining_ms / 1000 + i64::from(remaining_ms % 1000 != 0)
    }
}

async fn countdown(
    entry: Arc<TimerEntry>,
    timers: Weak<TimerList>,
    callbacks: TimerCallbacks,
    tick: Duration,
    dismiss_on_expiry: bool,
) {
    let started = Instant::now();
    let total_ms = i64::try_from(entry.duration.as_millis()).unwrap_or(i64::MAX);
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_second = whole_seconds(total_ms);
    let mut expired = false;

    loop {
        tokio::select! {
            biased;
            _ = entry.token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let elapsed = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
        let measured = total_ms.saturating_sub(elapsed);
        let remaining = entry
            .remaining_ms
            .fetch_min(measured, Ordering::SeqCst)
            .min(measured);

        (callbacks.on_millis_tick)(remaining);

        let seconds = whole_seconds(remaining);
        while last_second > seconds {
            last_second -= 1;
            if last_second >= 1 {
                (callbacks.on_seconds_tick)(last_second as u64);
            }
        }

        if remaining <= 0 && !expired {
            expired = true;
            let snapshot = entry.snapshot();
            info!(timer = %snapshot.id, name = ?snapshot.name, "timer expired");
            (callbacks.on_expired)(&snapshot);
            if dismiss_on_expiry {
                break;
            }
        }
    }

    if let Some(timers) = timers.upgrade() {
        timers
            .lock()
            .expect("timer list lock poisoned")
            .retain(|other| other.id != entry.id);
    }
    let snapshot = entry.snapshot();
    debug!(timer = %snapshot.id, remaining_ms = snapshot.remaining_ms, "timer removed");
    (callbacks.on_cancel)(&snapshot);
}
