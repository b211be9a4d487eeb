use crate::database::{DBError, Database};
use crate::defaults;
use crate::objects::setting;

use std::env;
use std::str::FromStr;


const DATABASE_VERSION_SETTING: &str = "ROSTER_DATABASE_VERSION";
const DATABASE_VERSION: u16 = 1;

pub struct SQLite {
    conn: rusqlite::Connection,
}

impl SQLite {
    pub fn new() -> Result<SQLite, DBError> {
        let path = match env::var(defaults::DATABASE_PATH_ENV) {
            Ok(db_path) => db_path,
            Err(_) => String::from(defaults::DATABASE_PATH),
        };
        SQLite::open(&path)
    }

    pub fn open(path: &str) -> Result<SQLite, DBError> {
        match rusqlite::Connection::open(path) {
            Ok(c) => Ok(SQLite { conn: c }),
            Err(e) => Err(DBError::ConnectionError(e.to_string())),
        }
    }

    fn make_tables(&mut self) -> Result<(), DBError> {
        let tx = match self.conn.transaction() {
            Ok(tx) => tx,
            Err(e) => return Err(DBError::ConnectionError(format!("unable to start transaction: {e}"))),
        };
        if let Err(e) = tx.execute(
            "INSERT INTO settings (setting, value) VALUES (?1, ?2);",
            (DATABASE_VERSION_SETTING, DATABASE_VERSION.to_string()),
        ) {
            return Err(DBError::DataInsertionError(e.to_string()))
        }
        tx.commit().map_err(|e| DBError::DataInsertionError(e.to_string()))
    }
}

impl Database for SQLite {
    fn setup(&mut self) -> Result<(), DBError> {
        // Without the settings table the version lookup below has nothing to query.
        if let Err(e) = self.conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                setting VARCHAR NOT NULL,
                value VARCHAR NOT NULL,
                UNIQUE (setting) ON CONFLICT REPLACE
            );",
            []
        ) {
            return Err(DBError::DataInsertionError(e.to_string()))
        }
        match self.conn.query_row("SELECT setting, value FROM settings WHERE setting=?1;",
            [DATABASE_VERSION_SETTING],
            |row| {
                Ok(setting::Setting::new(row.get(0)?, row.get(1)?))
        }) {
            Ok(it) => {
                match u16::from_str(it.value()) {
                    Ok(v) if v > DATABASE_VERSION => Err(DBError::DatabaseTooNew(format!("database version {v} is newer than {DATABASE_VERSION}"))),
                    Ok(_) => Ok(()),
                    Err(_) => Err(DBError::DataRetrievalError(String::from("error parsing version value"))),
                }
            },
            Err(rusqlite::Error::QueryReturnedNoRows) => self.make_tables(),
            Err(err) => Err(DBError::DataRetrievalError(err.to_string())),
        }
    }

    fn set_setting(&self, setting: &setting::Setting) -> Result<setting::Setting, DBError> {
        match self.conn.execute(
            "INSERT INTO settings (setting, value) VALUES (?1, ?2);",
            (setting.name(), setting.value()),
        ) {
            Ok(_) => Ok(setting.clone()),
            Err(e) => Err(DBError::DataInsertionError(e.to_string())),
        }
    }

    fn get_setting(&self, name: &str) -> Result<setting::Setting, DBError> {
        match self.conn.query_row("SELECT setting, value FROM settings WHERE setting=?1;",
            [name],
            |row| {
                Ok(setting::Setting::new(row.get(0)?, row.get(1)?))
        }) {
            Ok(it) => Ok(it),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DBError::NotFound),
            Err(err) => Err(DBError::DataRetrievalError(err.to_string())),
        }
    }

    fn get_settings(&self) -> Result<Vec<setting::Setting>, DBError> {
        let mut stmt = self.conn.prepare("SELECT setting, value FROM settings WHERE setting != ?1 ORDER BY setting;")
            .map_err(|e| DBError::DataRetrievalError(e.to_string()))?;
        let rows = stmt.query_map([DATABASE_VERSION_SETTING], |row| {
                Ok(setting::Setting::new(row.get(0)?, row.get(1)?))
            })
            .map_err(|e| DBError::DataRetrievalError(e.to_string()))?;
        let mut output: Vec<setting::Setting> = Vec::new();
        for row in rows {
            match row {
                Ok(s) => output.push(s),
                Err(e) => return Err(DBError::DataRetrievalError(e.to_string())),
            }
        }
        Ok(output)
    }
}
