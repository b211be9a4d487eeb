use std::env;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::control::{cli, sound::Sounds, Control};
use crate::database::{sqlite, Database};
use crate::remote::{uploader::Syncer, HttpRemote, RemoteApi};
use crate::roster::{FileDocument, RosterStore};
use crate::sound_board::SoundBoard;

pub mod announcer;
pub mod control;
pub mod database;
pub mod defaults;
pub mod display;
pub mod error;
pub mod normalizer;
pub mod objects;
pub mod remote;
pub mod roster;
pub mod search;
pub mod sound_board;
pub mod types;
pub mod util;

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("Start roster v{} starting up...", env!("CARGO_PKG_VERSION"));

    let mut sqlite = match sqlite::SQLite::new() {
        Ok(sq) => sq,
        Err(e) => {
            tracing::error!("Unable to open settings database: {e}");
            return
        }
    };
    if let Err(e) = sqlite.setup() {
        tracing::error!("Error setting up database: {e}");
        return
    }
    if let Err(e) = control::ensure_defaults(&sqlite) {
        tracing::error!("Unable to write default settings: {e}");
        return
    }
    let control = match Control::new(&sqlite) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Unable to read settings: {e}");
            return
        }
    };
    tracing::info!(
        "Uploading changes from the last {} every {}.",
        util::pretty_duration(&control.sync_window),
        util::pretty_duration(&control.upload_interval)
    );

    let document_path = env::var(defaults::DOCUMENT_PATH_ENV).unwrap_or_else(|_| String::from(defaults::DOCUMENT_PATH));
    let document = FileDocument::new(&document_path);
    tracing::info!(path = %document.path().display(), "using roster document");
    let store = Arc::new(RosterStore::load(Box::new(document)));
    let remote: Arc<dyn RemoteApi> = match HttpRemote::new(&control.import_url, &control.upload_url) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            tracing::error!("{e}");
            return
        }
    };

    let keepalive = Arc::new(Mutex::new(true));
    let mut joiners: Vec<thread::JoinHandle<()>> = Vec::new();

    let syncer = Arc::new(Syncer::new(
        keepalive.clone(),
        store.clone(),
        remote.clone(),
        Duration::from_secs(control.upload_interval),
        chrono::Duration::seconds(control.sync_window as i64),
    ));
    let sync_runner = syncer.clone();
    joiners.push(thread::spawn(move || sync_runner.run()));

    let sounds = Sounds::new(keepalive.clone(), Box::new(SoundBoard::new(control.frequency, control.duration)));
    let player = sounds.get_notifier();
    joiners.push(thread::spawn(move || sounds.run()));

    cli::control_loop(cli::Cli {
        sqlite: Arc::new(Mutex::new(sqlite)),
        control: Arc::new(Mutex::new(control)),
        store,
        remote,
        syncer: syncer.clone(),
        player,
    });

    if let Ok(mut ka) = keepalive.lock() {
        *ka = false;
    }
    syncer.stop();
    for j in joiners {
        if j.join().is_err() {
            tracing::error!("worker thread panicked");
        }
    }
    println!("Goodbye!")
}
