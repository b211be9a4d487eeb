use std::{sync::{Arc, Mutex}, thread, time::Duration as StdDuration};

use chrono::{Duration, Local, NaiveDateTime, Timelike};

use crate::{objects::participant::Participant, roster::RosterStore, sound_board::{self, CuePlayer}, types, util};

#[cfg(test)]
mod tests;

// clock mode flags a participant this many seconds ahead of their start
const CLOCK_LEAD_SECONDS: i64 = 60;
const MAX_SLEEP: StdDuration = StdDuration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    Clock,
    Timer,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Clock => types::MODE_CLOCK,
            Mode::Timer => types::MODE_TIMER,
        }
    }

    pub fn from_str(mode: &str) -> Option<Mode> {
        match mode {
            types::MODE_CLOCK => Some(Mode::Clock),
            types::MODE_TIMER => Some(Mode::Timer),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cue {
    Long,
    Double,
    Short,
}

/// Cue for a given second of the minute. Depends on nothing but the second.
pub fn cue_for_second(second: u32) -> Option<Cue> {
    match second {
        0 => Some(Cue::Long),
        50 => Some(Cue::Double),
        55..=59 => Some(Cue::Short),
        _ => None,
    }
}

pub fn simulated_time(real: NaiveDateTime, offset_minutes: i64) -> NaiveDateTime {
    real + Duration::minutes(offset_minutes)
}

/// Whether a start time belongs on the upcoming board at `now`.
pub fn is_upcoming(start: i64, now: &NaiveDateTime, mode: Mode) -> bool {
    let shifted = match mode {
        Mode::Clock => start - CLOCK_LEAD_SECONDS,
        Mode::Timer => start,
    };
    util::hour_minute(shifted) == (now.hour(), now.minute())
}

/// Whether a start time falls in the displayed minute. No lead applied.
pub fn is_highlighted(start: i64, displayed: &NaiveDateTime) -> bool {
    util::hour_minute(start) == (displayed.hour(), displayed.minute())
}

pub fn display_time(now: &NaiveDateTime, mode: Mode) -> String {
    match mode {
        Mode::Clock => now.format("%H:%M:%S").to_string(),
        Mode::Timer => now.format("%H:%M:00").to_string(),
    }
}

/// Width, as a percentage, of each tile on the upcoming board.
pub fn tile_width_percent(count: usize) -> u8 {
    match count {
        0..=4 => 48,
        5..=6 => 31,
        _ => 23,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub time: NaiveDateTime,
    pub display: String,
    pub upcoming: Vec<Participant>,
    pub cue: Option<Cue>,
    pub minute_changed: bool,
}

/// Pure per-second state: turns a wall clock reading into what the display
/// and the speaker should do. Side effects belong to the caller.
#[derive(Clone, Debug)]
pub struct AnnouncementEngine {
    offset_minutes: i64,
    mode: Mode,
    displayed: Option<NaiveDateTime>,
}

impl AnnouncementEngine {
    pub fn new(offset_minutes: i64, mode: Mode) -> AnnouncementEngine {
        AnnouncementEngine {
            offset_minutes,
            mode,
            displayed: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn offset_minutes(&self) -> i64 {
        self.offset_minutes
    }

    pub fn tick(&mut self, real_now: NaiveDateTime, participants: &[Participant]) -> Tick {
        let now = simulated_time(real_now, self.offset_minutes);
        let minute_changed = match self.displayed {
            Some(prev) => prev.hour() != now.hour() || prev.minute() != now.minute() || prev.date() != now.date(),
            None => true,
        };
        if minute_changed {
            self.displayed = Some(now);
        }
        let upcoming = participants.iter()
            .filter(|p| is_upcoming(p.start(), &now, self.mode))
            .cloned()
            .collect();
        Tick {
            time: now,
            display: display_time(&now, self.mode),
            upcoming,
            cue: cue_for_second(now.second()),
            minute_changed,
        }
    }

    pub fn highlighted(&self, participants: &[Participant]) -> Vec<bool> {
        match self.displayed {
            Some(displayed) => participants.iter().map(|p| is_highlighted(p.start(), &displayed)).collect(),
            None => vec![false; participants.len()],
        }
    }
}

/// Drives an engine from the wall clock once per second, firing cues and
/// handing each tick to the display.
pub struct Announcer {
    keepalive: Arc<Mutex<bool>>,
    engine: Mutex<AnnouncementEngine>,
    store: Arc<RosterStore>,
    player: Arc<dyn CuePlayer>,
    display: Box<dyn Fn(&Tick) + Send + Sync>,
}

impl Announcer {
    pub fn new(
        engine: AnnouncementEngine,
        store: Arc<RosterStore>,
        player: Arc<dyn CuePlayer>,
        display: Box<dyn Fn(&Tick) + Send + Sync>,
    ) -> Announcer {
        Announcer {
            keepalive: Arc::new(Mutex::new(false)),
            engine: Mutex::new(engine),
            store,
            player,
            display,
        }
    }

    pub fn stop(&self) {
        if let Ok(mut ka) = self.keepalive.lock() {
            *ka = false;
        }
    }

    fn keep_running(&self) -> bool {
        match self.keepalive.lock() {
            Ok(ka) => *ka,
            Err(_) => false,
        }
    }

    pub fn run(&self) {
        if let Ok(mut ka) = self.keepalive.lock() {
            *ka = true;
        }
        let mut last_second: Option<NaiveDateTime> = None;
        while self.keep_running() {
            // re-read the wall clock every cycle so a suspended display
            // picks up where real time is instead of where it left off
            let real_now = Local::now().naive_local();
            let second = real_now.with_nanosecond(0).unwrap_or(real_now);
            if last_second != Some(second) {
                last_second = Some(second);
                let snapshot = self.store.snapshot();
                let tick = match self.engine.lock() {
                    Ok(mut engine) => engine.tick(real_now, &snapshot.participants),
                    Err(_) => {
                        tracing::error!("unable to grab announcement engine mutex, exiting");
                        break
                    }
                };
                if let Some(cue) = tick.cue {
                    sound_board::play_cue(self.player.as_ref(), cue);
                }
                (self.display)(&tick);
            }
            let into_second = StdDuration::from_nanos(u64::from(real_now.nanosecond() % 1_000_000_000));
            thread::sleep(MAX_SLEEP.saturating_sub(into_second).max(StdDuration::from_millis(1)));
        }
        tracing::info!("announcer finished");
    }
}
