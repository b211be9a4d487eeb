use std::{fs, io::{ErrorKind, Write}, path::{Path, PathBuf}};

use crate::error::RosterError;

/// Whole-document durable storage. Only `RosterStore` writes through it.
pub trait DocumentStore: Send + Sync {
    fn read(&self) -> Result<Option<String>, RosterError>;
    fn write(&self, contents: &str) -> Result<(), RosterError>;
}

pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    pub fn new(path: impl AsRef<Path>) -> FileDocument {
        FileDocument { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentStore for FileDocument {
    fn read(&self) -> Result<Option<String>, RosterError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RosterError::Persistence(format!("error reading {}: {e}", self.path.display()))),
        }
    }

    // written beside the target, flushed to disk and renamed over it so a
    // reader sees the old document or the new one, never half of each
    fn write(&self, contents: &str) -> Result<(), RosterError> {
        let temp = self.temp_path();
        let written = fs::File::create(&temp).and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written {
            return Err(RosterError::Persistence(format!("error writing {}: {e}", temp.display())))
        }
        fs::rename(&temp, &self.path)
            .map_err(|e| RosterError::Persistence(format!("error replacing {}: {e}", self.path.display())))
    }
}
