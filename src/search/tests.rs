use std::time::{Duration, Instant};

use super::{highlight_spans, SearchIndexer};
use crate::objects::participant::Participant;

fn named(names: &[&str]) -> Vec<Participant> {
    names.iter().enumerate()
        .map(|(ix, name)| Participant::new(
            (ix + 1).to_string(),
            String::from(*name),
            String::from("M21"),
            36000,
            String::new(),
            String::new(),
            String::new(),
        ))
        .collect()
}

#[test]
fn test_search() {
    let subset = named(&["Anna", "Bob", "Ann"]);
    let mut search = SearchIndexer::default();
    search.search("an", &subset);
    assert_eq!(&[0, 2], search.matches());
    assert_eq!(Some(0), search.cursor());
    assert_eq!(Some(0), search.current());
    search.search("", &subset);
    assert!(search.matches().is_empty());
    assert_eq!(None, search.cursor());
    assert_eq!(None, search.current());
    search.search("zz", &subset);
    assert!(search.matches().is_empty());
    assert_eq!(None, search.cursor());
}

#[test]
fn test_search_case_insensitive() {
    let subset = named(&["ŽEMAITIS Jonas", "Petras Žemaitis", "Ona"]);
    let mut search = SearchIndexer::default();
    search.search("žemait", &subset);
    assert_eq!(&[0, 1], search.matches());
}

#[test]
fn test_cursor_wraps() {
    let subset = named(&["Anna", "Bob", "Ann", "Joanna"]);
    let mut search = SearchIndexer::default();
    search.search("AN", &subset);
    assert_eq!(&[0, 2, 3], search.matches());
    assert_eq!(Some(2), search.next());
    assert_eq!(Some(3), search.next());
    assert_eq!(Some(0), search.next());
    assert_eq!(Some(3), search.prev());
    assert_eq!(Some(2), search.cursor());
    search.search("", &subset);
    assert_eq!(None, search.next());
    assert_eq!(None, search.prev());
}

#[test]
fn test_debounce() {
    let subset = named(&["Anna", "Bob", "Ann"]);
    let mut search = SearchIndexer::new(Duration::from_millis(300));
    let t0 = Instant::now();
    search.set_query("b", t0);
    search.set_query("bo", t0 + Duration::from_millis(200));
    // still typing
    assert!(!search.poll(t0 + Duration::from_millis(400), &subset));
    assert!(search.matches().is_empty());
    assert!(search.poll(t0 + Duration::from_millis(500), &subset));
    assert_eq!("bo", search.query());
    assert_eq!(&[1], search.matches());
    // nothing pending any more
    assert!(!search.poll(t0 + Duration::from_millis(900), &subset));
}

#[test]
fn test_refresh_on_subset_change() {
    let mut search = SearchIndexer::default();
    search.search("an", &named(&["Anna", "Bob", "Ann"]));
    search.next();
    search.refresh(&named(&["Bob", "Anna"]));
    assert_eq!(&[1], search.matches());
    assert_eq!(Some(0), search.cursor());
}

#[test]
fn test_highlight_spans() {
    assert_eq!(
        vec![(String::from("Jo"), true), (String::from("anna "), false), (String::from("jo"), true), (String::from("nas"), false)],
        highlight_spans("Joanna jonas", "jo")
    );
    assert_eq!(vec![(String::from("Bob"), false)], highlight_spans("Bob", ""));
    assert_eq!(vec![(String::from("Bob"), false)], highlight_spans("Bob", "x"));
    assert_eq!(
        vec![(String::from("Ona "), false), (String::from("Žemaitė"), true)],
        highlight_spans("Ona Žemaitė", "žemaitė")
    );
}
