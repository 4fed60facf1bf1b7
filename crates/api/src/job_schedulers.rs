use crate::{
    notification::{
        send_daily_digest::SendDailyDigestsUseCase,
        send_deadline_notifications::SendDeadlineNotificationsUseCase,
    },
    scan::sweep_scan_sessions::SweepScanSessionsUseCase,
    shared::usecase::execute,
};
use actix_web::rt::time::{interval, sleep};
use chrono::{DateTime, Timelike, Utc};
use deadliner_infra::{DeadlinerContext, SchedulerConfig};
use futures::FutureExt;
use std::{
    any::Any,
    future::Future,
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};
use tracing::{error, info, warn};

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    DeadlineNotifications,
    DailyDigest,
    SweepScanSessions,
}

/// Jobs whose schedule matches the wall-clock minute of `now` in service time
pub fn due_jobs(now: DateTime<Utc>, config: &SchedulerConfig) -> Vec<Job> {
    let local = now.with_timezone(&config.timezone);
    let mut jobs = Vec::new();

    if local.minute() % config.notification_interval_minutes.max(1) == 0 {
        jobs.push(Job::DeadlineNotifications);
    }
    if local.minute() == 0 && local.hour() == config.daily_digest_hour {
        jobs.push(Job::DailyDigest);
    }
    if local.minute() == 0 {
        jobs.push(Job::SweepScanSessions);
    }
    jobs
}

/// Remembers the wall-clock window each job last fired in so that a job
/// never fires twice within the same minute (hour for the sweep).
#[derive(Debug, Default)]
struct JobGuards {
    notifications_minute: Option<i64>,
    digest_minute: Option<i64>,
    sweep_hour: Option<i64>,
}

impl JobGuards {
    fn take_due(&mut self, now: DateTime<Utc>, config: &SchedulerConfig) -> Vec<Job> {
        let minute = now.timestamp().div_euclid(60);
        let hour = now.timestamp().div_euclid(60 * 60);

        due_jobs(now, config)
            .into_iter()
            .filter(|job| {
                let (last, window) = match job {
                    Job::DeadlineNotifications => (&mut self.notifications_minute, minute),
                    Job::DailyDigest => (&mut self.digest_minute, minute),
                    Job::SweepScanSessions => (&mut self.sweep_hour, hour),
                };
                if *last == Some(window) {
                    return false;
                }
                *last = Some(window);
                true
            })
            .collect()
    }
}

/// Background loop driving the notification engine, the daily digest and
/// the scan session sweep. Owned by the `Application`.
#[derive(Debug, Default)]
pub struct NotificationScheduler {
    running: Mutex<Option<Arc<AtomicBool>>>,
}

impl NotificationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<Arc<AtomicBool>>> {
        match self.running.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn start(&self, ctx: DeadlinerContext) {
        let mut running = self.lock_running();
        if running.is_some() {
            warn!("Notification scheduler is already running");
            return;
        }

        let flag = Arc::new(AtomicBool::new(true));
        *running = Some(flag.clone());
        actix_web::rt::spawn(run_scheduler(ctx, flag));
        info!("Notification scheduler started");
    }

    /// The current tick is allowed to finish, the loop exits before the next one
    pub fn stop(&self) {
        if let Some(flag) = self.lock_running().take() {
            flag.store(false, Ordering::SeqCst);
            info!("Notification scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

async fn run_scheduler(ctx: DeadlinerContext, running: Arc<AtomicBool>) {
    let now = ctx.sys.get_timestamp_millis();
    let secs_to_next_run = get_start_delay(now as usize, 0);
    sleep(Duration::from_secs(secs_to_next_run as u64)).await;

    let mut minutely_interval = interval(Duration::from_secs(60));
    let mut guards = JobGuards::default();
    loop {
        minutely_interval.tick().await;
        let now = ctx.sys.now();
        let ticked = run_tick(&running, now, &ctx.config.scheduler, &mut guards, |job| {
            run_job(job, &ctx)
        })
        .await;
        if !ticked {
            break;
        }
    }
}

/// Runs every job due at `now`. A panicking job is logged and the remaining
/// jobs of the tick still run. Returns `false` without running anything
/// once the scheduler has been stopped.
async fn run_tick<F, Fut>(
    running: &AtomicBool,
    now: DateTime<Utc>,
    config: &SchedulerConfig,
    guards: &mut JobGuards,
    mut run: F,
) -> bool
where
    F: FnMut(Job) -> Fut,
    Fut: Future<Output = ()>,
{
    if !running.load(Ordering::SeqCst) {
        return false;
    }

    for job in guards.take_due(now, config) {
        if let Err(panic) = AssertUnwindSafe(run(job)).catch_unwind().await {
            error!(job = ?job, "Scheduled job panicked: {}", panic_message(&*panic));
        }
    }
    true
}

async fn run_job(job: Job, ctx: &DeadlinerContext) {
    // Errors are logged by `execute`
    match job {
        Job::DeadlineNotifications => {
            let _ = execute(SendDeadlineNotificationsUseCase, ctx).await;
        }
        Job::DailyDigest => {
            let _ = execute(SendDailyDigestsUseCase, ctx).await;
        }
        Job::SweepScanSessions => {
            let _ = execute(SweepScanSessionsUseCase, ctx).await;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
