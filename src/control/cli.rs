use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime, Utc};

use crate::announcer::{self, AnnouncementEngine, Announcer, Mode, Tick};
use crate::control::{self, Control};
use crate::database::{sqlite, Database};
use crate::display::{self, columns::{self, StickyLabels}, filter::ClassFilter, scroll::{self, ScrollAction, ScrollCursor}};
use crate::objects::{participant::{FieldUpdates, Participant}, setting};
use crate::error::RosterError;
use crate::remote::{importer, start_info, uploader::{SyncOutcome, Syncer}, RemoteApi};
use crate::roster::RosterStore;
use crate::search::{self, SearchIndexer};
use crate::sound_board::CuePlayer;
use crate::util;

#[cfg(test)]
mod tests;

// rows of one kiosk column visible at a time
const KIOSK_ROWS: usize = 12;

pub struct Cli {
    pub sqlite: Arc<Mutex<sqlite::SQLite>>,
    pub control: Arc<Mutex<Control>>,
    pub store: Arc<RosterStore>,
    pub remote: Arc<dyn RemoteApi>,
    pub syncer: Arc<Syncer>,
    pub player: Arc<dyn CuePlayer>,
}

pub fn control_loop(cli: Cli) {
    let mut keepalive: bool = true;
    let mut input: String = String::new();
    let mut search = SearchIndexer::default();
    let mut visible: Vec<Participant> = cli.store.snapshot().participants.clone();

    while keepalive {
        input.clear();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {},
            Err(e) => {
                tracing::error!("unable to read from stdin: {e}");
                break
            }
        }
        let in_string = input.trim().to_string();
        let parts: Vec<&str> = in_string.split_whitespace().collect();
        let first = if !parts.is_empty() {parts[0].to_lowercase()} else {String::new()};
        match first.as_str() {
            "" => {},
            "i" | "import" => {
                if parts.len() < 3 {
                    println!("Invalid number of arguments specified.");
                    continue
                }
                match importer::import_event(cli.remote.as_ref(), &cli.store, parts[1], parts[2]) {
                    Ok(count) => println!("Imported {count} participants."),
                    Err(e) => println!("Unable to import roster. {e}"),
                }
                visible = cli.store.snapshot().participants.clone();
                search.refresh(&visible);
            },
            "l" | "list" => {
                let snapshot = cli.store.snapshot();
                visible = match class_filter(&snapshot.participants, &parts[1..]) {
                    Some(list) => list,
                    None => continue,
                };
                search.refresh(&visible);
                let offset = match cli.control.lock() {
                    Ok(c) => c.time_diff,
                    Err(_) => 0,
                };
                let highlighted = current_highlights(&visible, offset, Local::now().naive_local());
                println!("{} ({} classes)", snapshot.title, snapshot.classes.len());
                for line in roster_lines(&visible, search.query(), &highlighted) {
                    println!("{line}");
                }
            },
            "t" | "toggle" => {
                if parts.len() < 2 {
                    println!("Invalid number of arguments specified.");
                    continue
                }
                let started = match cli.store.snapshot().participant(parts[1]) {
                    Some(p) => !p.is_started(),
                    None => {
                        println!("Participant {} not found.", parts[1]);
                        continue
                    }
                };
                report_mutation(&cli.store, parts[1], &FieldUpdates::started(started));
            },
            "n" | "note" => {
                if parts.len() < 2 {
                    println!("Invalid number of arguments specified.");
                    continue
                }
                report_mutation(&cli.store, parts[1], &FieldUpdates::notes(&parts[2..].join(" ")));
            },
            "c" | "card" => {
                if parts.len() < 2 {
                    println!("Invalid number of arguments specified.");
                    continue
                }
                let card = if parts.len() < 3 {""} else {parts[2]};
                report_mutation(&cli.store, parts[1], &FieldUpdates::card(card));
            },
            "k" | "key" => {
                let key = if parts.len() < 2 {None} else {Some(String::from(parts[1]))};
                match cli.store.set_session_key(key) {
                    Ok(_) => println!("Session key updated."),
                    Err(e) => println!("Session key updated in memory only. {e}"),
                }
            },
            "f" | "find" => {
                search.set_query(&parts[1..].join(" "), Instant::now());
                settle_search(&mut search, &visible);
                print_match(&search, &visible);
            },
            ">" | "next" => {
                search.next();
                print_match(&search, &visible);
            },
            "<" | "prev" => {
                search.prev();
                print_match(&search, &visible);
            },
            "o" | "columns" => {
                let snapshot = cli.store.snapshot();
                let subset = match class_filter(&snapshot.participants, &parts[1..]) {
                    Some(list) => list,
                    None => continue,
                };
                let count = match cli.control.lock() {
                    Ok(c) => c.columns,
                    Err(_) => {
                        println!("Error grabbing control mutex.");
                        continue
                    }
                };
                print_columns(&columns::balance(&subset, count));
            },
            "w" | "kiosk" => {
                run_kiosk(&cli, &parts[1..]);
            },
            "a" | "announce" | "clock" => {
                run_clock(&cli, &parts[1..]);
            },
            "p" | "pass" => {
                let server_addr = match cli.control.lock() {
                    Ok(c) => c.server_addr.clone(),
                    Err(_) => {
                        println!("Error grabbing control mutex.");
                        continue
                    }
                };
                match start_info::send_start_info(cli.remote.as_ref(), &cli.store, &server_addr) {
                    Ok(count) => println!("Sent start info for {count} participants."),
                    Err(e) => println!("Unable to send start info. {e}"),
                }
            },
            "y" | "sync" => {
                match cli.syncer.sync_once(Utc::now()) {
                    SyncOutcome::NothingChanged => println!("No recent changes to upload."),
                    SyncOutcome::Uploaded(count) => println!("Uploaded {count} changed participants."),
                    SyncOutcome::Failed => println!(
                        "Upload failed ({} in a row). It will not be retried until the next scheduled sync.",
                        cli.syncer.consecutive_failures()
                    ),
                }
            },
            "s" | "setting" => {
                if parts.len() < 3 {
                    print_settings(&cli);
                    continue
                }
                change_setting(&cli, parts[1], &parts[2..].join(" "));
            },
            "q" | "quit" | "exit" => {
                keepalive = false;
            },
            "h" | "help" => print_help(),
            option => println!("'{option}' is not a valid command. Type h for help."),
        };
    }
}

fn report_mutation(store: &RosterStore, number: &str, updates: &FieldUpdates) {
    match store.mutate(number, updates) {
        Ok(p) => println!("{} {} -- started: {} card: '{}' notes: '{}'", p.number(), p.name(), p.is_started(), p.card(), p.notes()),
        Err(RosterError::Persistence(e)) => println!("Change kept in memory but not saved. {e}"),
        Err(e) => println!("Unable to update participant. {e}"),
    }
}

/// No classes means the whole roster. `all` selects every class, anything
/// after it toggles that class back out.
fn class_filter(participants: &[Participant], classes: &[&str]) -> Option<Vec<Participant>> {
    if classes.is_empty() {
        return Some(participants.to_vec())
    }
    let mut filter = ClassFilter::new(participants);
    for class in classes {
        if class.eq_ignore_ascii_case("all") {
            filter.toggle_all();
            continue
        }
        if !filter.toggle(class) {
            println!("Unknown class '{class}'. Known classes: {}", filter.classes().join(", "));
            return None
        }
    }
    println!("Showing classes: {}", filter.selected().join(", "));
    Some(filter.apply(participants))
}

/// Rows whose start falls in the current simulated minute.
pub(crate) fn current_highlights(participants: &[Participant], offset_minutes: i64, real_now: NaiveDateTime) -> Vec<bool> {
    let mut engine = AnnouncementEngine::new(offset_minutes, Mode::Clock);
    engine.tick(real_now, participants);
    engine.highlighted(participants)
}

/// Roster rows with a header above each new start time. Rows starting in the
/// current minute, and their header, are marked.
pub(crate) fn roster_lines(participants: &[Participant], query: &str, highlighted: &[bool]) -> Vec<String> {
    if participants.is_empty() {
        return vec![String::from("No participants.")]
    }
    let boundaries = display::start_boundaries(participants);
    let mut output: Vec<String> = Vec::new();
    for (ix, (p, boundary)) in participants.iter().zip(boundaries).enumerate() {
        let hot = highlighted.get(ix).copied().unwrap_or(false);
        if boundary {
            if hot {
                output.push(format!(">> {} <<", util::pretty_time(&p.start())));
            } else {
                output.push(format!("-- {} --", util::pretty_time(&p.start())));
            }
        }
        let name: String = search::highlight_spans(p.name(), query).into_iter()
            .map(|(text, hit)| if hit { format!("[{text}]") } else { text })
            .collect();
        output.push(format!(
            "{} [{}] {:>5} {:<30} {:<8} card: {:<8} {}",
            if hot {"*"} else {" "},
            if p.is_started() {"x"} else {" "},
            p.number(),
            name,
            p.class(),
            p.card(),
            p.notes()
        ));
    }
    output
}

// a line based prompt delivers the whole query at once, so wait out the quiet
// period and apply it
fn settle_search(search: &mut SearchIndexer, visible: &[Participant]) {
    thread::sleep(search.debounce());
    search.poll(Instant::now(), visible);
}

fn print_match(search: &SearchIndexer, visible: &[Participant]) {
    match search.current() {
        Some(ix) => {
            let p = &visible[ix];
            println!("Match {} of {} at row {}: {} {}", search.cursor().unwrap_or(0) + 1, search.matches().len(), ix + 1, p.number(), p.name());
        },
        None => println!("No matches."),
    }
}

fn print_columns(cols: &[columns::Column]) {
    for (ix, col) in cols.iter().enumerate() {
        println!("== Column {} ({} participants) ==", ix + 1, col.total);
        for group in &col.groups {
            println!("  {}", group.class);
            for p in &group.members {
                println!("    {:>5} {:<30} {}", p.number(), p.name(), util::pretty_time(&p.start()));
            }
        }
    }
}

/// Runs the start clock until enter is pressed. Arguments: offset minutes
/// and mode, both optional.
fn run_clock(cli: &Cli, args: &[&str]) {
    let mut offset: i64 = match cli.control.lock() {
        Ok(c) => c.time_diff,
        Err(_) => 0,
    };
    let mut mode = Mode::Clock;
    for arg in args {
        if let Some(m) = Mode::from_str(&arg.to_lowercase()) {
            mode = m;
        } else if let Ok(v) = arg.parse::<i64>() {
            offset = v;
        } else {
            println!("Invalid clock argument '{arg}'. Type h for help.");
            return
        }
    }
    let engine = AnnouncementEngine::new(offset, mode);
    println!("Clock running in {} mode with offset {} minutes. Press enter to stop.", engine.mode().as_str(), engine.offset_minutes());
    let announcer = Arc::new(Announcer::new(
        engine,
        cli.store.clone(),
        cli.player.clone(),
        Box::new(print_tick),
    ));
    let runner = announcer.clone();
    let handle = thread::spawn(move || runner.run());
    let mut buf = String::new();
    _ = io::stdin().read_line(&mut buf);
    announcer.stop();
    if handle.join().is_err() {
        tracing::error!("announcer thread panicked");
    }
}

/// Cycles each balanced column through its rows until enter is pressed.
fn run_kiosk(cli: &Cli, args: &[&str]) {
    let snapshot = cli.store.snapshot();
    let subset = match class_filter(&snapshot.participants, args) {
        Some(list) => list,
        None => return,
    };
    let count = match cli.control.lock() {
        Ok(c) => c.columns,
        Err(_) => {
            println!("Error grabbing control mutex.");
            return
        }
    };
    let cols = columns::balance(&subset, count);
    let running = Arc::new(Mutex::new(true));
    let flag = running.clone();
    let handle = thread::spawn(move || kiosk_loop(cols, flag));
    println!("Kiosk running over {count} columns. Press enter to stop.");
    let mut buf = String::new();
    _ = io::stdin().read_line(&mut buf);
    if let Ok(mut r) = running.lock() {
        *r = false;
    }
    if handle.join().is_err() {
        tracing::error!("kiosk thread panicked");
    }
}

fn kiosk_rows(col: &columns::Column) -> Vec<String> {
    let mut rows: Vec<String> = Vec::new();
    for group in &col.groups {
        rows.push(format!("== {} ==", group.class));
        for p in &group.members {
            rows.push(format!("{:>5} {:<30} {}", p.number(), p.name(), util::pretty_time(&p.start())));
        }
    }
    rows
}

fn kiosk_loop(cols: Vec<columns::Column>, running: Arc<Mutex<bool>>) {
    let rows: Vec<Vec<String>> = cols.iter().map(kiosk_rows).collect();
    let mut labels = StickyLabels::new(cols.len());
    let mut cursors: Vec<ScrollCursor> = Vec::new();
    for (ix, col) in cols.iter().enumerate() {
        // one row per scroll step
        let mut top = 0.0;
        for group in &col.groups {
            labels.set_group_top(ix, &group.class, top);
            top += (group.members.len() + 1) as f64 * scroll::SCROLL_STEP;
        }
        let mut cursor = ScrollCursor::new();
        cursor.set_content_height(rows[ix].len() as f64 * scroll::SCROLL_STEP);
        cursor.set_view_height(KIOSK_ROWS as f64 * scroll::SCROLL_STEP);
        cursors.push(cursor);
        print_kiosk_column(ix, labels.on_scroll(ix, 0.0), &rows[ix], 0);
    }
    let started = Instant::now();
    loop {
        match running.lock() {
            Ok(r) if *r => {},
            _ => break,
        }
        let now_ms = started.elapsed().as_millis() as u64;
        for (ix, cursor) in cursors.iter_mut().enumerate() {
            let y = match cursor.tick(now_ms) {
                ScrollAction::Hold => continue,
                ScrollAction::ScrollTo(y) | ScrollAction::JumpTo(y) => y,
            };
            print_kiosk_column(ix, labels.on_scroll(ix, y), &rows[ix], (y / scroll::SCROLL_STEP) as usize);
        }
        thread::sleep(Duration::from_millis(scroll::SCROLL_DELAY_MS));
    }
}

fn print_kiosk_column(ix: usize, label: &str, rows: &[String], first: usize) {
    println!("-- Column {} [{}] --", ix + 1, label);
    for row in rows.iter().skip(first).take(KIOSK_ROWS) {
        println!("  {row}");
    }
}

fn print_tick(tick: &Tick) {
    if tick.minute_changed {
        println!("== {} ==", tick.time.format("%H:%M"));
    }
    if tick.upcoming.is_empty() {
        println!("{}", tick.display);
        return
    }
    let names: Vec<String> = tick.upcoming.iter().map(|p| format!("{} {}", p.number(), p.name())).collect();
    println!("{} ({}% tiles) {}", tick.display, announcer::tile_width_percent(names.len()), names.join(" | "));
}

fn print_settings(cli: &Cli) {
    println!("  {:<16} {}", "delta sync", if cli.syncer.running() {"running"} else {"stopped"});
    let sq = match cli.sqlite.lock() {
        Ok(sq) => sq,
        Err(_) => {
            println!("Error grabbing database mutex.");
            return
        }
    };
    match sq.get_settings() {
        Ok(settings) => {
            for s in settings {
                println!("  {:<16} {}", s.name(), s.value());
            }
        },
        Err(e) => println!("Unable to read settings. {e}"),
    }
}

fn change_setting(cli: &Cli, name: &str, value: &str) {
    let mut candidate = match cli.control.lock() {
        Ok(c) => c.clone(),
        Err(_) => {
            println!("Error grabbing control mutex.");
            return
        }
    };
    if !candidate.apply(name, value) {
        println!("Invalid value '{value}' for setting '{name}'. Type h for help.");
        return
    }
    let sq = match cli.sqlite.lock() {
        Ok(sq) => sq,
        Err(_) => {
            println!("Error grabbing database mutex.");
            return
        }
    };
    match sq.set_setting(&setting::Setting::new(String::from(name), String::from(value))) {
        Ok(_) => {
            if name == control::SETTING_UPLOAD_INTERVAL || name == control::SETTING_SYNC_WINDOW
                || name == control::SETTING_UPLOAD_URL || name == control::SETTING_IMPORT_URL {
                println!("Sync and import changes apply on next start.");
            }
            if let Ok(mut c) = cli.control.lock() {
                *c = candidate;
            }
            println!("{name} set to {value}.");
        },
        Err(e) => println!("Unable to save setting. {e}"),
    }
}

fn print_help() {
    println!("(i)mport <event> <day>   -- Fetch the roster for an event day, replacing the stored one.");
    println!("(l)ist [class ...]       -- Show the roster, optionally only the given classes (or all).");
    println!("(t)oggle <number>        -- Mark a participant started or not started.");
    println!("(n)ote <number> <text>   -- Set a participant's notes.");
    println!("(c)ard <number> <value>  -- Set a participant's card.");
    println!("(k)ey [value]            -- Set or clear the session key sent with uploads.");
    println!("(f)ind <text>            -- Search names in the last list. > or next, < or prev to move.");
    println!("c(o)lumns [class ...]    -- Show the roster balanced over the configured columns.");
    println!("(w) kiosk [class ...]    -- Auto-scroll the balanced columns until enter is pressed.");
    println!("(a)nnounce [offset] [mode] -- Run the start clock. Mode is clock or timer.");
    println!("(p)ass                   -- Send started participants to the local timing server.");
    println!("s(y)nc                   -- Upload recent changes now.");
    println!("(s)etting [name value]   -- List settings or change one. Valid names are:");
    for (name, _) in control::default_settings() {
        println!("    {name}");
    }
    println!("(q)uit                   -- Exit.");
}
