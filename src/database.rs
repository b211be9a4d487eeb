use crate::objects::setting;
use std::fmt;

pub mod sqlite;

#[derive(Debug)]
pub enum DBError {
    ConnectionError(String),
    DatabaseTooNew(String),
    MutexError(String),
    DataInsertionError(String),
    DataRetrievalError(String),
    NotFound,
}

impl std::error::Error for DBError {}

impl fmt::Display for DBError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DBError::ConnectionError(val) => write!(f, "Connection Error: {val}"),
            DBError::DatabaseTooNew(val) => write!(f, "Database Version Too New: {val}"),
            DBError::MutexError(val) => write!(f, "Mutex Error: {val}"),
            DBError::DataInsertionError(val) => write!(f, "Error Inserting Data: {val}"),
            DBError::DataRetrievalError(val) => write!(f, "Error Retrieving Data: {val}"),
            DBError::NotFound => write!(f, "Data Not Found"),
        }
    }
}

/// Key/value settings persisted across restarts.
pub trait Database {
    fn setup(&mut self) -> Result<(), DBError>;
    fn set_setting(&self, setting: &setting::Setting) -> Result<setting::Setting, DBError>;
    fn get_setting(&self, name: &str) -> Result<setting::Setting, DBError>;
    fn get_settings(&self) -> Result<Vec<setting::Setting>, DBError>;
}
