//! Background stall detector for the UI loop.
//!
//! Sources are opened on a blocking worker, but pipeline state changes made
//! from `update` (pause, seek, teardown) can still hang inside GStreamer. The
//! watchdog thread notices when `update` has stopped beating and says so in
//! the log.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use crate::source::now_millis;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Ok,
    Slow,
    Stalled,
}

/// Silence thresholds.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub warn: Duration,
    pub stall: Duration,
}

impl Thresholds {
    pub fn classify(&self, silence: Duration) -> Health {
        if silence > self.stall {
            Health::Stalled
        } else if silence > self.warn {
            Health::Slow
        } else {
            Health::Ok
        }
    }
}

pub struct Watchdog {
    last_heartbeat: Arc<AtomicU64>,
}

impl Watchdog {
    /// Spawn the monitoring thread. Returns `None` if the thread can't be started.
    pub fn spawn(thresholds: Thresholds) -> Option<Self> {
        let last_heartbeat = Arc::new(AtomicU64::new(now_millis()));
        let heartbeat = last_heartbeat.clone();

        let spawned = thread::Builder::new()
            .name("ui-watchdog".to_string())
            .spawn(move || {
                log::debug!("Watchdog thread started");
                loop {
                    thread::sleep(POLL_INTERVAL);

                    let silence =
                        Duration::from_millis(now_millis().saturating_sub(heartbeat.load(Ordering::Relaxed)));
                    match thresholds.classify(silence) {
                        Health::Stalled => log::error!(
                            "UI loop stalled for {}ms (GStreamer state change hang?)",
                            silence.as_millis()
                        ),
                        Health::Slow => log::warn!(
                            "UI loop slow: {}ms since last heartbeat",
                            silence.as_millis()
                        ),
                        Health::Ok => log::trace!("Watchdog heartbeat OK ({}ms)", silence.as_millis()),
                    }
                }
            });

        match spawned {
            Ok(_) => {
                log::info!(
                    "Watchdog initialized (warn after {:?}, stall after {:?})",
                    thresholds.warn,
                    thresholds.stall
                );
                Some(Watchdog { last_heartbeat })
            }
            Err(e) => {
                log::warn!("Failed to spawn watchdog thread: {}", e);
                None
            }
        }
    }

    /// Signal that the UI loop is alive.
    pub fn heartbeat(&self) {
        self.last_heartbeat.store(now_millis(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_silence() {
        let t = Thresholds {
            warn: Duration::from_secs(2),
            stall: Duration::from_secs(5),
        };
        assert_eq!(t.classify(Duration::from_millis(500)), Health::Ok);
        assert_eq!(t.classify(Duration::from_secs(2)), Health::Ok);
        assert_eq!(t.classify(Duration::from_millis(2500)), Health::Slow);
        assert_eq!(t.classify(Duration::from_secs(6)), Health::Stalled);
    }
}
