use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::SyncError;
use crate::storage::{GeneralConfig, RetentionSweeper, SweepSchedule};
use crate::sync::SyncEngine;

const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Timing knobs for the polling loop
#[derive(Debug, Clone, Copy)]
pub struct DaemonTiming {
    pub poll_interval: Duration,
    pub cleanup_interval: Duration,
    pub error_backoff: Duration,
}

impl From<&GeneralConfig> for DaemonTiming {
    fn from(config: &GeneralConfig) -> Self {
        DaemonTiming {
            poll_interval: config.poll_interval(),
            cleanup_interval: config.cleanup_interval(),
            error_backoff: config.error_backoff(),
        }
    }
}

/// Single-threaded loop driving the engine and the retention sweep
pub struct Daemon {
    engine: SyncEngine,
    sweeper: RetentionSweeper,
    schedule: SweepSchedule,
    timing: DaemonTiming,
    shutdown: Arc<AtomicBool>,
}

impl Daemon {
    pub fn new(engine: SyncEngine, sweeper: RetentionSweeper, timing: DaemonTiming) -> Self {
        Daemon {
            engine,
            sweeper,
            schedule: SweepSchedule::new(timing.cleanup_interval),
            timing,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the loop when set (from a signal handler)
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    fn stopped(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// One iteration: clipboard then focus, then the sweep if it's due
    pub fn tick(&mut self, now: Instant) -> Result<(), SyncError> {
        self.engine.poll();

        if self.schedule.is_due(now) {
            // Marked before sweeping so a failing directory isn't rescanned every tick
            self.schedule.mark_run(now);
            self.sweeper.sweep()?;
        }

        Ok(())
    }

    /// Run until the shutdown flag is set
    pub fn run(&mut self) {
        if let Err(e) = self.sweeper.sweep() {
            log::warn!("Error: {}", e);
        }

        while !self.stopped() {
            let pause = match self.tick(Instant::now()) {
                Ok(()) => self.timing.poll_interval,
                Err(e) => {
                    log::warn!("Error: {}", e);
                    self.timing.error_backoff
                }
            };
            self.sleep(pause);
        }

        log::info!("Stopped");
    }

    /// Sleep in short slices so a shutdown request is noticed promptly
    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.stopped() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}
