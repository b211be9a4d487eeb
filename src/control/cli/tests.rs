use chrono::{NaiveDate, NaiveDateTime};

use super::{current_highlights, roster_lines};
use crate::objects::participant::Participant;
use crate::types;

fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 7, 4).unwrap().and_hms_opt(hour, minute, second).unwrap()
}

fn roster() -> Vec<Participant> {
    vec![
        Participant::new(String::from("1"), String::from("Jonas"), String::from("M21"), 36000, String::new(), String::new(), String::new()),
        Participant::new(String::from("2"), String::from("Anna"), String::from("W21"), 36000, String::new(), String::new(), String::new()),
        Participant::new(String::from("3"), String::from("Ona"), String::from("W21"), 36060, String::from(types::STARTED_CHECKED), String::new(), String::from("41")),
        Participant::new(String::from("4"), String::from("Petras"), String::from("M45"), 36120, String::new(), String::new(), String::new()),
    ]
}

#[test]
fn test_current_highlights() {
    let participants = roster();
    assert_eq!(vec![false, false, true, false], current_highlights(&participants, 0, at(10, 1, 20)));
    // offset shifts the minute being matched, no clock lead applied
    assert_eq!(vec![false, false, true, false], current_highlights(&participants, -1, at(10, 2, 5)));
    assert_eq!(vec![true, true, false, false], current_highlights(&participants, 0, at(10, 0, 59)));
    assert_eq!(vec![false; 4], current_highlights(&participants, 0, at(11, 0, 0)));
}

#[test]
fn test_roster_lines() {
    let participants = roster();
    let highlighted = current_highlights(&participants, 0, at(10, 1, 20));
    let lines = roster_lines(&participants, "on", &highlighted);
    assert_eq!(7, lines.len());
    assert_eq!("-- 10:00:00 --", lines[0]);
    assert!(lines[1].starts_with("  [ ]"));
    assert!(lines[1].contains("J[on]as"));
    assert!(lines[2].starts_with("  [ ]"));
    assert_eq!(">> 10:01:00 <<", lines[3]);
    assert!(lines[4].starts_with("* [x]"));
    assert!(lines[4].contains("[On]a"));
    assert!(lines[4].contains("card: 41"));
    assert_eq!("-- 10:02:00 --", lines[5]);
    assert!(lines[6].starts_with("  [ ]"));
}

#[test]
fn test_roster_lines_empty() {
    assert_eq!(vec![String::from("No participants.")], roster_lines(&[], "", &[]));
}
