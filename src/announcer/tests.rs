use std::{sync::{Arc, Mutex}, thread, time::Duration as StdDuration};

use chrono::{NaiveDate, NaiveDateTime};

use super::{cue_for_second, display_time, is_highlighted, is_upcoming, simulated_time, tile_width_percent, AnnouncementEngine, Announcer, Cue, Mode, Tick};
use crate::objects::participant::Participant;
use crate::roster::{FileDocument, RosterStore};
use crate::sound_board::CuePlayer;

#[derive(Default)]
struct RecordingPlayer {
    cues: Mutex<Vec<Cue>>,
}

impl CuePlayer for RecordingPlayer {
    fn play_long(&self) {
        self.cues.lock().unwrap().push(Cue::Long);
    }

    fn play_short(&self) {
        self.cues.lock().unwrap().push(Cue::Short);
    }

    fn play_double(&self) {
        self.cues.lock().unwrap().push(Cue::Double);
    }
}

fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 7, 4).unwrap().and_hms_opt(hour, minute, second).unwrap()
}

fn participant(number: &str, start: i64) -> Participant {
    Participant::new(
        String::from(number),
        format!("Runner {number}"),
        String::from("M21"),
        start,
        String::new(),
        String::new(),
        String::new(),
    )
}

#[test]
fn test_cue_for_second() {
    assert_eq!(Some(Cue::Long), cue_for_second(0));
    assert_eq!(Some(Cue::Double), cue_for_second(50));
    for s in 55..60 {
        assert_eq!(Some(Cue::Short), cue_for_second(s));
    }
    let silent = (1..50).chain(51..55).all(|s| cue_for_second(s).is_none());
    assert!(silent);
}

#[test]
fn test_cues_per_tick() {
    let mut engine = AnnouncementEngine::new(0, Mode::Clock);
    // cues fire with an empty roster too
    assert_eq!(Some(Cue::Long), engine.tick(at(10, 0, 0), &[]).cue);
    assert_eq!(Some(Cue::Double), engine.tick(at(10, 0, 50), &[]).cue);
    assert_eq!(Some(Cue::Short), engine.tick(at(10, 0, 57), &[]).cue);
    assert_eq!(None, engine.tick(at(10, 0, 30), &[]).cue);
}

#[test]
fn test_simulated_time() {
    assert_eq!(at(9, 45, 10), simulated_time(at(10, 0, 10), -15));
    assert_eq!(at(10, 5, 10), simulated_time(at(10, 0, 10), 5));
    // offset crosses midnight
    let next_day = NaiveDate::from_ymd_opt(2026, 7, 5).unwrap().and_hms_opt(0, 10, 0).unwrap();
    assert_eq!(next_day, simulated_time(at(23, 50, 0), 20));
}

#[test]
fn test_is_upcoming() {
    let start = 10 * 3600 + 31 * 60;
    // clock mode flags the runner a minute early
    assert!(is_upcoming(start, &at(10, 30, 0), Mode::Clock));
    assert!(is_upcoming(start, &at(10, 30, 59), Mode::Clock));
    assert!(!is_upcoming(start, &at(10, 31, 0), Mode::Clock));
    // timer mode matches the literal minute
    assert!(is_upcoming(start, &at(10, 31, 20), Mode::Timer));
    assert!(!is_upcoming(start, &at(10, 30, 20), Mode::Timer));
    // start at midnight shows at 23:59 in clock mode
    assert!(is_upcoming(0, &at(23, 59, 5), Mode::Clock));
}

#[test]
fn test_is_highlighted() {
    let start = 10 * 3600 + 31 * 60 + 30;
    assert!(is_highlighted(start, &at(10, 31, 0)));
    assert!(!is_highlighted(start, &at(10, 30, 0)));
}

#[test]
fn test_display_time() {
    assert_eq!("09:05:07", display_time(&at(9, 5, 7), Mode::Clock));
    assert_eq!("09:05:00", display_time(&at(9, 5, 7), Mode::Timer));
}

#[test]
fn test_tile_width() {
    assert_eq!(48, tile_width_percent(0));
    assert_eq!(48, tile_width_percent(4));
    assert_eq!(31, tile_width_percent(6));
    assert_eq!(23, tile_width_percent(7));
}

#[test]
fn test_engine_tick() {
    let roster = vec![
        participant("1", 10 * 3600),
        participant("2", 10 * 3600 + 60),
        participant("3", 10 * 3600 + 60 + 30),
        participant("4", 10 * 3600 + 120),
    ];
    let mut engine = AnnouncementEngine::new(-15, Mode::Clock);
    assert_eq!(vec![false; 4], engine.highlighted(&roster));
    // real 10:15:05 is simulated 10:00:05
    let tick = engine.tick(at(10, 15, 5), &roster);
    assert_eq!("10:00:05", tick.display);
    assert!(tick.minute_changed);
    let numbers: Vec<&str> = tick.upcoming.iter().map(|p| p.number()).collect();
    assert_eq!(vec!["2", "3"], numbers);
    assert_eq!(vec![true, false, false, false], engine.highlighted(&roster));
    let tick = engine.tick(at(10, 15, 6), &roster);
    assert!(!tick.minute_changed);
    let tick = engine.tick(at(10, 16, 0), &roster);
    assert!(tick.minute_changed);
    assert_eq!(Some(Cue::Long), tick.cue);
    assert_eq!(vec![false, true, true, false], engine.highlighted(&roster));

    let mut timer = AnnouncementEngine::new(0, Mode::Timer);
    let tick = timer.tick(at(10, 1, 40), &roster);
    assert_eq!("10:01:00", tick.display);
    let numbers: Vec<&str> = tick.upcoming.iter().map(|p| p.number()).collect();
    assert_eq!(vec!["2", "3"], numbers);
}

#[test]
fn test_mode_str() {
    assert_eq!(Some(Mode::Clock), Mode::from_str("clock"));
    assert_eq!(Some(Mode::Timer), Mode::from_str(Mode::Timer.as_str()));
    assert_eq!(None, Mode::from_str("stopwatch"));
}

#[test]
fn test_announcer_run_stop() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(RosterStore::load(Box::new(FileDocument::new(dir.path().join("content.json")))));
    let player = Arc::new(RecordingPlayer::default());
    let ticks: Arc<Mutex<Vec<Tick>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = ticks.clone();
    let announcer = Arc::new(Announcer::new(
        AnnouncementEngine::new(0, Mode::Clock),
        store,
        player.clone(),
        Box::new(move |tick: &Tick| seen.lock().unwrap().push(tick.clone())),
    ));
    let runner = announcer.clone();
    let handle = thread::spawn(move || runner.run());
    thread::sleep(StdDuration::from_millis(2500));
    announcer.stop();
    handle.join().unwrap();
    let ticks = ticks.lock().unwrap();
    assert!(ticks.len() >= 2);
    // one tick per wall clock second
    for pair in ticks.windows(2) {
        assert!(pair[0].time < pair[1].time);
    }
    let expected: Vec<Cue> = ticks.iter().filter_map(|t| t.cue).collect();
    assert_eq!(expected, *player.cues.lock().unwrap());
}
