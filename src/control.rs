use crate::{database::{DBError, Database}, defaults, objects::setting};

pub mod cli;
pub mod sound;


pub const SETTING_DURATION: &str = "duration";
pub const SETTING_FREQUENCY: &str = "frequency";
pub const SETTING_SERVER_ADDR: &str = "server_addr";
pub const SETTING_STATUS: &str = "status";
pub const SETTING_TIME_DIFF: &str = "time_diff";
pub const SETTING_UPLOAD_INTERVAL: &str = "upload_interval";
pub const SETTING_SYNC_WINDOW: &str = "sync_window";
pub const SETTING_UPLOAD_URL: &str = "upload_url";
pub const SETTING_IMPORT_URL: &str = "import_url";
pub const SETTING_COLUMNS: &str = "columns";

#[derive(Clone, Debug, PartialEq)]
pub struct Control {
    pub duration: u64,
    pub frequency: u32,
    pub server_addr: String,
    pub status: String,
    pub time_diff: i64,
    pub upload_interval: u64,
    pub sync_window: u64,
    pub upload_url: String,
    pub import_url: String,
    pub columns: usize,
}

impl Default for Control {
    fn default() -> Self {
        Control {
            duration: defaults::DEFAULT_DURATION,
            frequency: defaults::DEFAULT_FREQUENCY,
            server_addr: String::from(defaults::DEFAULT_SERVER_ADDR),
            status: String::from(defaults::DEFAULT_STATUS),
            time_diff: defaults::DEFAULT_TIME_DIFF,
            upload_interval: defaults::DEFAULT_UPLOAD_INTERVAL,
            sync_window: defaults::DEFAULT_SYNC_WINDOW,
            upload_url: String::from(defaults::DEFAULT_UPLOAD_URL),
            import_url: String::from(defaults::DEFAULT_IMPORT_URL),
            columns: defaults::DEFAULT_COLUMNS,
        }
    }
}

pub fn default_settings() -> Vec<(&'static str, String)> {
    vec![
        (SETTING_DURATION, defaults::DEFAULT_DURATION.to_string()),
        (SETTING_FREQUENCY, defaults::DEFAULT_FREQUENCY.to_string()),
        (SETTING_SERVER_ADDR, String::from(defaults::DEFAULT_SERVER_ADDR)),
        (SETTING_STATUS, String::from(defaults::DEFAULT_STATUS)),
        (SETTING_TIME_DIFF, defaults::DEFAULT_TIME_DIFF.to_string()),
        (SETTING_UPLOAD_INTERVAL, defaults::DEFAULT_UPLOAD_INTERVAL.to_string()),
        (SETTING_SYNC_WINDOW, defaults::DEFAULT_SYNC_WINDOW.to_string()),
        (SETTING_UPLOAD_URL, String::from(defaults::DEFAULT_UPLOAD_URL)),
        (SETTING_IMPORT_URL, String::from(defaults::DEFAULT_IMPORT_URL)),
        (SETTING_COLUMNS, defaults::DEFAULT_COLUMNS.to_string()),
    ]
}

/// Seeds every known setting that is not stored yet. Existing values are
/// never touched, so calling this again is a no-op. Returns how many keys
/// were written.
pub fn ensure_defaults(db: &impl Database) -> Result<usize, DBError> {
    let mut seeded: usize = 0;
    for (name, value) in default_settings() {
        match db.get_setting(name) {
            Ok(_) => {},
            Err(DBError::NotFound) => {
                db.set_setting(&setting::Setting::new(String::from(name), value))?;
                seeded += 1;
            },
            Err(e) => return Err(e),
        }
    }
    if seeded > 0 {
        tracing::info!(seeded, "default settings written");
    }
    Ok(seeded)
}

impl Control {
    pub fn new(db: &impl Database) -> Result<Control, DBError> {
        let mut output = Control::default();
        for s in db.get_settings()? {
            output.apply(s.name(), s.value());
        }
        Ok(output)
    }

    /// Applies a single stored value. Values that fail to parse keep the
    /// current value and are reported.
    pub fn apply(&mut self, name: &str, value: &str) -> bool {
        let parsed = match name {
            SETTING_DURATION => value.parse::<u64>().map(|v| self.duration = v).is_ok(),
            SETTING_FREQUENCY => value.parse::<u32>().map(|v| self.frequency = v).is_ok(),
            SETTING_SERVER_ADDR => {
                self.server_addr = String::from(value);
                true
            },
            SETTING_STATUS => {
                self.status = String::from(value);
                true
            },
            SETTING_TIME_DIFF => value.parse::<i64>().map(|v| self.time_diff = v).is_ok(),
            SETTING_UPLOAD_INTERVAL => value.parse::<u64>().map(|v| self.upload_interval = v).is_ok(),
            SETTING_SYNC_WINDOW => value.parse::<u64>().map(|v| self.sync_window = v).is_ok(),
            SETTING_UPLOAD_URL => {
                self.upload_url = String::from(value);
                true
            },
            SETTING_IMPORT_URL => {
                self.import_url = String::from(value);
                true
            },
            SETTING_COLUMNS => match value.parse::<usize>() {
                Ok(v) if v > 0 => {
                    self.columns = v;
                    true
                },
                _ => false,
            },
            _ => {
                tracing::debug!(name, "ignoring unknown setting");
                return false
            },
        };
        if !parsed {
            tracing::warn!(name, value, "invalid value stored for setting");
        }
        parsed
    }
}
