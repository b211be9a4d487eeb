use std::{sync::Arc, thread};

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use super::{DocumentStore, FileDocument, RosterStore};
use crate::error::RosterError;
use crate::normalizer;
use crate::objects::{event::EventSnapshot, participant::FieldUpdates};
use crate::types;

struct BrokenDocument;

impl DocumentStore for BrokenDocument {
    fn read(&self) -> Result<Option<String>, RosterError> {
        Ok(None)
    }

    fn write(&self, _contents: &str) -> Result<(), RosterError> {
        Err(RosterError::Persistence(String::from("disk full")))
    }
}

fn sample_snapshot() -> EventSnapshot {
    normalizer::normalize(&json!({
        "DAY": 1,
        "START": 36000,
        "TITLE": "Club Night Sprint",
        "WWW_ID": "55",
        "PARTICIPANTS": [
            { "NUMBER": 101, "NAME": "Rasa Vaitkute", "CLASS": "W21", "START": 36060, "START_INFO": "" },
            { "NUMBER": 102, "NAME": "Tomas Balsys", "CLASS": "M21", "START": 36000, "START_INFO": "+" },
            { "NUMBER": 103, "NAME": "Lina Grigaite", "CLASS": "W21", "START": 36120, "START_INFO": "" }
        ]
    })).unwrap()
}

fn file_store(dir: &tempfile::TempDir) -> RosterStore {
    RosterStore::load(Box::new(FileDocument::new(dir.path().join("content.json"))))
}

#[test]
fn test_load_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_load_unparsable() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("content.json"), "{ not json").unwrap();
    let store = file_store(&dir);
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_replace_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    assert!(store.replace(sample_snapshot()).is_ok());
    assert_eq!(3, store.snapshot().participants.len());
    // no temp file left behind
    assert!(!dir.path().join("content.json.tmp").exists());
    let reloaded = file_store(&dir);
    assert_eq!(*store.snapshot(), *reloaded.snapshot());
    assert_eq!("Club Night Sprint", reloaded.snapshot().title);
    assert!(reloaded.snapshot().classes.contains("M21"));
}

#[test]
fn test_replace_discards_previous() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.replace(sample_snapshot()).unwrap();
    store.mutate("101", &FieldUpdates::card("5")).unwrap();
    let next = normalizer::normalize(&json!({
        "PARTICIPANTS": [ { "NUMBER": 9, "NAME": "Solo", "CLASS": "M", "START": 1, "START_INFO": "" } ]
    })).unwrap();
    store.replace(next).unwrap();
    let snap = store.snapshot();
    assert_eq!(1, snap.participants.len());
    assert!(snap.participant("101").is_none());
}

#[test]
fn test_mutate() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.replace(sample_snapshot()).unwrap();
    let before = store.snapshot();
    let updated = store.mutate("101", &FieldUpdates::started(true)).unwrap();
    assert_eq!(types::STARTED_CHECKED, updated.started());
    assert!(updated.last_modified().is_some());
    // earlier snapshots are not touched
    assert!(before.participant("101").unwrap().last_modified().is_none());
    let after = store.snapshot();
    assert!(after.participant("101").unwrap().is_started());
    // other participants are left alone
    assert!(after.participant("103").unwrap().last_modified().is_none());
    store.mutate("101", &FieldUpdates::notes("lost chip")).unwrap();
    store.mutate("101", &FieldUpdates::started(false)).unwrap();
    let reloaded = file_store(&dir);
    let p = reloaded.snapshot().participant("101").cloned().unwrap();
    assert_eq!("lost chip", p.notes());
    assert_eq!(types::STARTED_NONE, p.started());
    // identifiers and order unchanged
    let numbers: Vec<String> = reloaded.snapshot().participants.iter().map(|p| String::from(p.number())).collect();
    assert_eq!(vec!["102", "101", "103"], numbers);
}

#[test]
fn test_mutate_same_value_twice() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.replace(sample_snapshot()).unwrap();
    let first = store.mutate("103", &FieldUpdates::card("5")).unwrap();
    let second = store.mutate("103", &FieldUpdates::card("5")).unwrap();
    assert_eq!("5", second.card());
    assert!(first.last_modified().unwrap() <= second.last_modified().unwrap());
}

#[test]
fn test_mutate_clock_backwards() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.replace(sample_snapshot()).unwrap();
    let t = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();
    store.mutate_at("103", &FieldUpdates::card("1"), t).unwrap();
    let p = store.mutate_at("103", &FieldUpdates::card("2"), t - Duration::seconds(30)).unwrap();
    assert_eq!(Some(t), p.last_modified());
    assert_eq!("2", p.card());
}

#[test]
fn test_mutate_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.replace(sample_snapshot()).unwrap();
    let res = store.mutate("999", &FieldUpdates::card("1"));
    assert_eq!(Err(RosterError::NotFound(String::from("999"))), res);
}

#[test]
fn test_persistence_failure_keeps_memory() {
    let store = RosterStore::load(Box::new(BrokenDocument));
    let res = store.replace(sample_snapshot());
    assert!(matches!(res, Err(RosterError::Persistence(_))));
    assert_eq!(3, store.snapshot().participants.len());
    let res = store.mutate("102", &FieldUpdates::notes("dns"));
    assert!(matches!(res, Err(RosterError::Persistence(_))));
    assert_eq!("dns", store.snapshot().participant("102").unwrap().notes());
}

#[test]
fn test_concurrent_mutations_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(file_store(&dir));
    store.replace(sample_snapshot()).unwrap();
    let mut joiners = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        joiners.push(thread::spawn(move || {
            let updates = match i % 2 {
                0 => FieldUpdates::notes("late"),
                _ => FieldUpdates::card("77"),
            };
            store.mutate("101", &updates).unwrap();
        }));
    }
    for j in joiners {
        j.join().unwrap();
    }
    // neither field update overwrote the other
    let reloaded = file_store(&dir);
    let p = reloaded.snapshot().participant("101").cloned().unwrap();
    assert_eq!("late", p.notes());
    assert_eq!("77", p.card());
}

#[test]
fn test_session_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.replace(sample_snapshot()).unwrap();
    store.set_session_key(Some(String::from("abc123"))).unwrap();
    let reloaded = file_store(&dir);
    assert_eq!(Some(String::from("abc123")), reloaded.snapshot().session_key);
}

#[test]
fn test_reload_keeps_server_card() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let snapshot = normalizer::normalize(&json!({
        "PARTICIPANTS": [
            { "NUMBER": 9, "NAME": "Rokas Urbonas", "CLASS": "M21", "START": 36000, "START_INFO": "", "CARD": "8123" },
            { "NUMBER": 10, "NAME": "Be Klases", "CLASS": null, "START": 36060, "START_INFO": "", "NOTES": "x" }
        ]
    })).unwrap();
    store.replace(snapshot).unwrap();
    let reloaded = file_store(&dir);
    assert_eq!(2, reloaded.snapshot().participants.len());
    assert_eq!("8123", reloaded.snapshot().participant("9").unwrap().card());
    assert_eq!(*store.snapshot(), *reloaded.snapshot());
}

#[test]
fn test_file_document_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let doc = FileDocument::new(dir.path().join("content.json"));
    assert_eq!(None, doc.read().unwrap());
    doc.write("{\"TITLE\":\"first\"}").unwrap();
    doc.write("{\"TITLE\":\"second\"}").unwrap();
    assert_eq!(Some(String::from("{\"TITLE\":\"second\"}")), doc.read().unwrap());
    assert!(!dir.path().join("content.json.tmp").exists());
}
