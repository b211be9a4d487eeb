use std::{sync::{Arc, Mutex}, thread, time::{Duration, Instant}};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{objects::participant::Participant, roster::RosterStore};
use super::{requests::UploadParticipantsRequest, RemoteApi};

pub const SYNC_FAILURE_WARN_THRESHOLD: usize = 3;

// how often a sleeping syncer checks whether it has been told to stop
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Clone, PartialEq, Serialize, Debug)]
pub enum Status {
    Running,
    Stopping,
    Stopped,
    Unknown
}

#[derive(Clone, PartialEq, Debug)]
pub enum SyncOutcome {
    NothingChanged,
    Uploaded(usize),
    Failed,
}

/// Participants whose last edit falls inside the trailing window ending at
/// `now`. Participants never edited locally are never included.
pub fn recent_updates(participants: &[Participant], now: DateTime<Utc>, window: chrono::Duration) -> Vec<Participant> {
    let cutoff = now - window;
    participants.iter()
        .filter(|p| match p.last_modified() {
            Some(modified) => modified > cutoff,
            None => false,
        })
        .cloned()
        .collect()
}

/// Periodically pushes recently edited participants to the remote server.
pub struct Syncer {
    server_keepalive: Arc<Mutex<bool>>,
    local_keepalive: Arc<Mutex<bool>>,
    status: Arc<Mutex<Status>>,
    failures: Arc<Mutex<usize>>,
    store: Arc<RosterStore>,
    remote: Arc<dyn RemoteApi>,
    interval: Duration,
    window: chrono::Duration,
}

impl Syncer {
    pub fn new(
        keepalive: Arc<Mutex<bool>>,
        store: Arc<RosterStore>,
        remote: Arc<dyn RemoteApi>,
        interval: Duration,
        window: chrono::Duration,
    ) -> Syncer {
        Syncer {
            server_keepalive: keepalive,
            local_keepalive: Arc::new(Mutex::new(false)),
            status: Arc::new(Mutex::new(Status::Stopped)),
            failures: Arc::new(Mutex::new(0)),
            store,
            remote,
            interval,
            window,
        }
    }

    pub fn status(&self) -> Status {
        let mut output = Status::Unknown;
        if let Ok(stat) = self.status.lock() {
            output = stat.clone();
        }
        output
    }

    pub fn running(&self) -> bool {
        self.status() == Status::Running
    }

    pub fn consecutive_failures(&self) -> usize {
        match self.failures.lock() {
            Ok(f) => *f,
            Err(_) => 0,
        }
    }

    pub fn stop(&self) {
        if let Ok(mut ka) = self.local_keepalive.lock() {
            *ka = false;
        }
        if let Ok(mut r) = self.status.lock() {
            if *r == Status::Running {
                *r = Status::Stopping
            }
        }
    }

    /// A single sync attempt against the current roster. Never touches the
    /// roster itself.
    pub fn sync_once(&self, now: DateTime<Utc>) -> SyncOutcome {
        let snapshot = self.store.snapshot();
        let changed = recent_updates(&snapshot.participants, now, self.window);
        if changed.is_empty() {
            tracing::debug!("no recent changes to upload");
            return SyncOutcome::NothingChanged
        }
        let count = changed.len();
        let request = UploadParticipantsRequest {
            participants: changed,
            session_key: snapshot.session_key.clone(),
        };
        match self.remote.upload_participants(&request) {
            Ok(_) => {
                tracing::info!(count, "uploaded changed participants");
                if let Ok(mut f) = self.failures.lock() {
                    *f = 0;
                }
                SyncOutcome::Uploaded(count)
            },
            Err(e) => {
                let mut failures: usize = 0;
                if let Ok(mut f) = self.failures.lock() {
                    *f += 1;
                    failures = *f;
                }
                tracing::warn!(count, failures, "upload failed, dropping attempt: {e}");
                if failures >= SYNC_FAILURE_WARN_THRESHOLD {
                    tracing::error!(failures, "uploads keep failing, recent changes may not reach the server");
                }
                SyncOutcome::Failed
            }
        }
    }

    fn keep_running(&self) -> bool {
        let local = match self.local_keepalive.lock() {
            Ok(ka) => *ka,
            Err(_) => {
                tracing::error!("unable to grab local keep alive mutex, exiting");
                false
            }
        };
        let server = match self.server_keepalive.lock() {
            Ok(ka) => *ka,
            Err(_) => {
                tracing::error!("unable to grab server keep alive mutex, exiting");
                false
            }
        };
        local && server
    }

    pub fn run(&self) {
        // check if we're already running, exit if so, otherwise set to running
        if let Ok(mut r) = self.status.lock() {
            if *r == Status::Running {
                return;
            }
            *r = Status::Running;
        }
        if let Ok(mut ka) = self.local_keepalive.lock() {
            *ka = true;
        }
        tracing::info!(interval = self.interval.as_secs(), "delta sync started");
        let mut next_tick = Instant::now() + self.interval;
        while self.keep_running() {
            let now = Instant::now();
            if now >= next_tick {
                // window is measured from when the tick fires, not from when
                // the previous upload finished
                self.sync_once(Utc::now());
                next_tick += self.interval;
                if next_tick <= Instant::now() {
                    next_tick = Instant::now() + self.interval;
                }
                continue;
            }
            thread::sleep(STOP_CHECK_INTERVAL.min(next_tick - now));
        }
        if let Ok(mut r) = self.status.lock() {
            *r = Status::Stopped;
        }
        tracing::info!("delta sync finished");
    }
}
