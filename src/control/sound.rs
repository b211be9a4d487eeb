use std::{sync::{Arc, Condvar, Mutex}, time::Duration};

use crate::{announcer::Cue, sound_board::{self, CuePlayer}};

// bounds how long a stopped worker can sit waiting for a cue
const WAIT_TIMEOUT: Duration = Duration::from_millis(500);

/// Queues cues for the sound worker. Triggering never blocks the caller on
/// playback.
pub struct CueNotifier {
    pending: Mutex<Vec<Cue>>,
    notifier: Condvar,
}

impl CueNotifier {
    pub fn new() -> CueNotifier {
        CueNotifier {
            pending: Mutex::new(Vec::new()),
            notifier: Condvar::new(),
        }
    }

    pub fn notify(&self, cue: Cue) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(cue);
        }
        self.notifier.notify_one()
    }

    fn wait_for_cues(&self) -> Vec<Cue> {
        let pending = match self.pending.lock() {
            Ok(p) => p,
            Err(_) => return Vec::new(),
        };
        let mut pending = match self.notifier.wait_timeout_while(pending, WAIT_TIMEOUT, |p| p.is_empty()) {
            Ok((p, _)) => p,
            Err(_) => return Vec::new(),
        };
        std::mem::take(&mut *pending)
    }
}

impl Default for CueNotifier {
    fn default() -> Self {
        CueNotifier::new()
    }
}

impl CuePlayer for CueNotifier {
    fn play_long(&self) {
        self.notify(Cue::Long)
    }

    fn play_short(&self) {
        self.notify(Cue::Short)
    }

    fn play_double(&self) {
        self.notify(Cue::Double)
    }
}

/// Worker that plays queued cues on a blocking player.
pub struct Sounds {
    keepalive: Arc<Mutex<bool>>,
    notifier: Arc<CueNotifier>,
    player: Box<dyn CuePlayer>,
}

impl Sounds {
    pub fn new(keepalive: Arc<Mutex<bool>>, player: Box<dyn CuePlayer>) -> Sounds {
        Sounds {
            keepalive,
            notifier: Arc::new(CueNotifier::new()),
            player,
        }
    }

    pub fn get_notifier(&self) -> Arc<CueNotifier> {
        self.notifier.clone()
    }

    pub fn run(&self) {
        loop {
            match self.keepalive.lock() {
                Ok(ka) if !*ka => break,
                Ok(_) => {},
                Err(_) => {
                    tracing::error!("unable to grab sound keep alive mutex, exiting");
                    break
                }
            }
            let cues = self.notifier.wait_for_cues();
            // a minute boundary that queued several cues only needs the latest
            if let Some(cue) = cues.last() {
                if cues.len() > 1 {
                    tracing::debug!(skipped = cues.len() - 1, "dropping stale cues");
                }
                sound_board::play_cue(self.player.as_ref(), *cue);
            }
        }
        tracing::info!("sound worker finished");
    }
}
