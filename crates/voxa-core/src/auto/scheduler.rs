//! Periodic output for auto-runnable skills (clock, weather).
//!
//! One tokio task per enabled auto-runnable skill produces output, publishes
//! it into the shared [`AutoOutputs`] map, and sleeps for the skill's
//! interval. Whenever the enabled set changes the whole job set is replaced:
//! every old task is cancelled and awaited before the map is cleared, so no
//! reader ever sees a disabled skill's output after the clear.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::skill::registry::EnabledSkills;
use crate::skill::{AutoRunnable, BuiltSkill, SkillContext, SkillOutput};

/// Settings key overriding the default refresh interval, in seconds.
pub const DEFAULT_INTERVAL_KEY: &str = "auto.default_interval_secs";

/// Latest output per auto skill id. Replaced wholesale on every write.
pub type AutoOutputs = Arc<HashMap<String, SkillOutput>>;

struct AutoJob {
    interval: Duration,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the auto jobs and the outputs they publish.
pub struct AutoSkillScheduler {
    ctx: Arc<SkillContext>,
    default_interval: Duration,
    jobs: DashMap<String, AutoJob>,
    /// Serializes restarts and shutdown; `true` once shut down.
    lifecycle: Mutex<bool>,
    outputs: watch::Sender<AutoOutputs>,
    shutdown: CancellationToken,
}

impl AutoSkillScheduler {
    pub fn new(ctx: Arc<SkillContext>, default_interval: Duration) -> Self {
        let (outputs, _) = watch::channel(Arc::new(HashMap::new()));
        Self {
            ctx,
            default_interval,
            jobs: DashMap::new(),
            lifecycle: Mutex::new(false),
            outputs,
            shutdown: CancellationToken::new(),
        }
    }

    /// Replace the job set with one job per auto-runnable skill in `skills`.
    ///
    /// Old jobs have fully stopped and the output map is empty before any new
    /// job starts. No-op after [`shutdown`](Self::shutdown).
    pub async fn restart(&self, skills: &[BuiltSkill]) {
        let shut_down = self.lifecycle.lock().await;
        if *shut_down {
            debug!("scheduler shut down, ignoring restart");
            return;
        }

        self.stop_jobs().await;
        self.outputs.send_replace(Arc::new(HashMap::new()));

        for built in skills {
            let Some(auto) = Arc::clone(&built.skill).as_auto_runnable() else {
                continue;
            };
            let skill_id = built.skill.id().to_string();
            let interval = auto
                .auto_update_interval()
                .unwrap_or_else(|| self.fallback_interval());
            let token = self.shutdown.child_token();
            let handle = tokio::spawn(run_job(
                skill_id.clone(),
                auto,
                Arc::clone(&self.ctx),
                interval,
                token.clone(),
                self.outputs.clone(),
            ));
            self.jobs.insert(
                skill_id,
                AutoJob {
                    interval,
                    token,
                    handle,
                },
            );
        }

        info!(jobs = self.jobs.len(), "auto skills restarted");
    }

    /// Stop every job for good. Later restarts do nothing.
    pub async fn shutdown(&self) {
        let mut shut_down = self.lifecycle.lock().await;
        if *shut_down {
            return;
        }
        *shut_down = true;
        self.shutdown.cancel();
        self.stop_jobs().await;
        self.outputs.send_replace(Arc::new(HashMap::new()));
        info!("auto skill scheduler shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Restart on every change of the enabled skill set, latest change wins.
    pub fn watch(self: &Arc<Self>, mut enabled: watch::Receiver<EnabledSkills>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let skills = enabled.borrow_and_update().clone();
                scheduler.restart(&skills).await;

                tokio::select! {
                    biased;
                    _ = scheduler.shutdown.cancelled() => break,
                    changed = enabled.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("enabled-skill watcher stopped");
        })
    }

    /// Current outputs. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> AutoOutputs {
        self.outputs.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutoOutputs> {
        self.outputs.subscribe()
    }

    /// Running jobs and their intervals, sorted by skill id.
    pub fn active_jobs(&self) -> Vec<(String, Duration)> {
        let mut jobs: Vec<(String, Duration)> = self
            .jobs
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().interval))
            .collect();
        jobs.sort();
        jobs
    }

    fn fallback_interval(&self) -> Duration {
        self.ctx
            .settings
            .get_duration_secs(DEFAULT_INTERVAL_KEY)
            .filter(|interval| !interval.is_zero())
            .unwrap_or(self.default_interval)
    }

    async fn stop_jobs(&self) {
        let ids: Vec<String> = self.jobs.iter().map(|entry| entry.key().clone()).collect();
        let mut stopping = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some((id, job)) = self.jobs.remove(&id) {
                job.token.cancel();
                stopping.push((id, job.handle));
            }
        }
        for (id, handle) in stopping {
            if let Err(e) = handle.await {
                warn!(skill = %id, error = %e, "auto job ended abnormally");
            }
        }
    }
}

async fn run_job(
    skill_id: String,
    auto: Arc<dyn AutoRunnable>,
    ctx: Arc<SkillContext>,
    interval: Duration,
    token: CancellationToken,
    outputs: watch::Sender<AutoOutputs>,
) {
    debug!(skill = %skill_id, ?interval, "auto job started");
    loop {
        let output = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            output = auto.auto_output(&ctx) => output,
        };
        outputs.send_modify(|map| {
            Arc::make_mut(map).insert(skill_id.clone(), output);
        });

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    debug!(skill = %skill_id, "auto job stopped");
}

impl fmt::Debug for AutoSkillScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSkillScheduler")
            .field("jobs", &self.jobs.len())
            .field("default_interval", &self.default_interval)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::future::BoxFuture;
    use voxa_types::score::Specificity;
    use voxa_types::skill::SkillMeta;

    use super::*;
    use crate::port::MemorySettings;
    use crate::recognizer::Pattern;
    use crate::skill::{FuzzySkill, Skill};
    use crate::testing::{registry_of, test_context, test_context_with};

    struct TickSkill {
        meta: SkillMeta,
        interval: Option<Duration>,
        produced: AtomicUsize,
    }

    impl TickSkill {
        fn arc(id: &str, interval: Option<Duration>) -> Arc<TickSkill> {
            Arc::new(Self {
                meta: SkillMeta::new(id, Specificity::Low),
                interval,
                produced: AtomicUsize::new(0),
            })
        }
    }

    impl FuzzySkill for TickSkill {
        type Input = ();

        fn meta(&self) -> &SkillMeta {
            &self.meta
        }

        fn patterns(&self) -> &[Pattern<()>] {
            &[]
        }

        async fn generate_output(&self, _ctx: &SkillContext, _input: ()) -> SkillOutput {
            SkillOutput::new(self.meta.id.clone())
        }

        fn auto_runnable(self: Arc<Self>) -> Option<Arc<dyn AutoRunnable>> {
            Some(self)
        }
    }

    impl AutoRunnable for TickSkill {
        fn auto_update_interval(&self) -> Option<Duration> {
            self.interval
        }

        fn auto_output<'a>(&'a self, _ctx: &'a SkillContext) -> BoxFuture<'a, SkillOutput> {
            Box::pin(async move {
                let n = self.produced.fetch_add(1, Ordering::SeqCst) + 1;
                SkillOutput::new(format!("{}:{n}", self.meta.id))
            })
        }
    }

    fn built(skill: Arc<TickSkill>) -> BuiltSkill {
        let skill: Arc<dyn Skill> = skill;
        let registry = registry_of(vec![Arc::clone(&skill)], test_context().0);
        registry.enabled()[0].clone()
    }

    fn keys(outputs: &AutoOutputs) -> Vec<String> {
        let mut keys: Vec<String> = outputs.keys().cloned().collect();
        keys.sort();
        keys
    }

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_jobs_refresh_on_interval() {
        let (ctx, _) = test_context();
        let scheduler = AutoSkillScheduler::new(ctx, MINUTE);
        let tick = TickSkill::arc("clock", Some(MINUTE));

        scheduler.restart(&[built(Arc::clone(&tick))]).await;
        tokio::time::sleep(Duration::from_secs(125)).await;

        assert_eq!(tick.produced.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.snapshot()["clock"].speech, "clock:3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_swaps_job_set_atomically() {
        let (ctx, _) = test_context();
        let scheduler = AutoSkillScheduler::new(ctx, MINUTE);
        let (a, b, c) = (
            built(TickSkill::arc("a", Some(MINUTE))),
            built(TickSkill::arc("b", Some(MINUTE))),
            built(TickSkill::arc("c", Some(MINUTE))),
        );

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let mut rx = scheduler.subscribe();
        let recorder = {
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let snapshot = rx.borrow_and_update().clone();
                    seen.lock().unwrap().push(keys(&snapshot));
                }
            })
        };

        scheduler.restart(&[a, b.clone()]).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(keys(&scheduler.snapshot()), vec!["a", "b"]);

        scheduler.restart(&[b, c]).await;
        assert!(!scheduler.snapshot().contains_key("a"));
        tokio::time::sleep(Duration::from_secs(150)).await;

        assert_eq!(keys(&scheduler.snapshot()), vec!["b", "c"]);
        let jobs: Vec<String> = scheduler.active_jobs().into_iter().map(|(id, _)| id).collect();
        assert_eq!(jobs, vec!["b", "c"]);

        recorder.abort();
        let seen = seen.lock().unwrap().clone();
        let first_with_c = seen
            .iter()
            .position(|keys| keys.contains(&"c".to_string()))
            .unwrap();
        assert!(
            seen[first_with_c..].iter().all(|keys| !keys.contains(&"a".to_string())),
            "stale output observed after restart: {seen:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_final() {
        let (ctx, _) = test_context();
        let scheduler = AutoSkillScheduler::new(ctx, MINUTE);
        let tick = TickSkill::arc("clock", Some(MINUTE));

        scheduler.restart(&[built(Arc::clone(&tick))]).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        scheduler.shutdown().await;
        assert!(scheduler.snapshot().is_empty());
        assert!(scheduler.active_jobs().is_empty());

        scheduler.restart(&[built(Arc::clone(&tick))]).await;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(scheduler.active_jobs().is_empty());
        assert_eq!(tick.produced.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_interval_from_settings() {
        let (ctx, _) =
            test_context_with(MemorySettings::new().with(DEFAULT_INTERVAL_KEY, "5"));
        let scheduler = AutoSkillScheduler::new(ctx, MINUTE);

        scheduler
            .restart(&[
                built(TickSkill::arc("weather", None)),
                built(TickSkill::arc("clock", Some(MINUTE))),
            ])
            .await;

        assert_eq!(
            scheduler.active_jobs(),
            vec![
                ("clock".to_string(), MINUTE),
                ("weather".to_string(), Duration::from_secs(5)),
            ]
        );
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_follows_enabled_set() {
        let (ctx, _) = test_context();
        let a: Arc<dyn Skill> = TickSkill::arc("a", Some(MINUTE));
        let b: Arc<dyn Skill> = TickSkill::arc("b", Some(MINUTE));
        let registry = registry_of(vec![a, b], Arc::clone(&ctx));
        let scheduler = Arc::new(AutoSkillScheduler::new(ctx, MINUTE));

        let watcher = scheduler.watch(registry.subscribe());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(keys(&scheduler.snapshot()), vec!["a", "b"]);

        registry.set_skill_enabled("a", false).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(keys(&scheduler.snapshot()), vec!["b"]);

        scheduler.shutdown().await;
        watcher.await.unwrap();
    }

    fn job_ids(scheduler: &AutoSkillScheduler) -> Vec<String> {
        scheduler.active_jobs().into_iter().map(|(id, _)| id).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_restarts_racing_registry_toggles_settle_on_latest_set() {
        let (ctx, _) = test_context();
        let ids = ["a", "b", "c"];
        let skills: Vec<Arc<dyn Skill>> = ids
            .iter()
            .map(|id| TickSkill::arc(id, Some(MINUTE)) as Arc<dyn Skill>)
            .collect();
        let registry = registry_of(skills, Arc::clone(&ctx));
        let scheduler = Arc::new(AutoSkillScheduler::new(ctx, MINUTE));
        let watcher = scheduler.watch(registry.subscribe());

        let toggler = tokio::spawn({
            let registry = Arc::clone(&registry);
            async move {
                for i in 0..200 {
                    registry.set_skill_enabled(ids[i % 3], i % 2 == 0).unwrap();
                    tokio::task::yield_now().await;
                }
            }
        });
        let restarter = tokio::spawn({
            let (registry, scheduler) = (Arc::clone(&registry), Arc::clone(&scheduler));
            async move {
                for _ in 0..50 {
                    scheduler.restart(&registry.enabled()).await;
                }
            }
        });
        toggler.await.unwrap();
        restarter.await.unwrap();

        registry.set_enabled(["b"]).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while job_ids(&scheduler) != vec!["b"] || keys(&scheduler.snapshot()) != vec!["b"] {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("scheduler never settled on the latest enabled set");

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(job_ids(&scheduler), vec!["b"]);
        assert_eq!(keys(&scheduler.snapshot()), vec!["b"]);

        scheduler.shutdown().await;
        watcher.await.unwrap();
    }
}
