//! Result log store: append, done-set reads and raw export

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{LogError, LogReadError};
use crate::record::ResponseRecord;
use crate::respondent::RespondentId;
use crate::{LOG_EXTENSION, LOG_PREFIX};

/// Column holding the image file name that keys the done-set
const IMAGE_FILE_COLUMN: &str = "image_file";

/// Image file names a respondent has already rated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoneSet(HashSet<String>);

impl DoneSet {
    pub fn contains(&self, file_name: &str) -> bool {
        self.0.contains(file_name)
    }

    pub fn insert(&mut self, file_name: impl Into<String>) -> bool {
        self.0.insert(file_name.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DoneSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A persisted result log as seen by the export listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// File name inside the store directory
    pub file_name: String,
    /// Respondent decoded from the file name, if it follows the naming scheme
    pub respondent: Option<RespondentId>,
    /// Size on disk in bytes
    pub size: u64,
}

/// Directory of per-respondent result logs
#[derive(Debug, Clone)]
pub struct LogStore {
    base_path: PathBuf,
}

impl LogStore {
    /// Open or create a log store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        debug!(?base_path, "Opened result log store");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the log owned by `respondent`
    pub fn log_path(&self, respondent: &RespondentId) -> PathBuf {
        self.base_path.join(respondent.log_file_name())
    }

    /// Append exactly one record to the respondent's log
    ///
    /// A missing or zero-length log gets the header row first. Existing rows are
    /// never touched. On error the record must be treated as not persisted.
    pub fn append(&self, respondent: &RespondentId, record: &ResponseRecord) -> Result<(), LogError> {
        let path = self.log_path(respondent);
        let is_new = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);
        writer.serialize(record)?;
        let file = writer.into_inner().map_err(|e| LogError::Io(e.into_error()))?;
        file.sync_all()?;

        info!(
            respondent = %respondent,
            image_file = %record.image_file,
            new_log = is_new,
            "Appended response record"
        );
        Ok(())
    }

    /// Read the done-set, reporting why it could not be read
    ///
    /// A missing log is not an error: it is an empty done-set.
    pub fn read_done_set(&self, respondent: &RespondentId) -> Result<DoneSet, LogReadError> {
        let path = self.log_path(respondent);
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(respondent = %respondent, "No result log yet");
                return Ok(DoneSet::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let headers = reader.byte_headers()?.clone();
        if headers.is_empty() {
            return Err(LogReadError::Empty);
        }
        let column = headers
            .iter()
            .position(|h| h == IMAGE_FILE_COLUMN.as_bytes())
            .ok_or(LogReadError::MissingColumn(IMAGE_FILE_COLUMN))?;

        let mut done = DoneSet::default();
        for (row, result) in reader.byte_records().enumerate() {
            let record = result?;
            let Some(field) = record.get(column) else {
                continue;
            };
            let file_name = std::str::from_utf8(field).map_err(|_| LogReadError::InvalidUtf8 { row: row as u64 + 1 })?;
            if !file_name.is_empty() {
                done.insert(file_name);
            }
        }

        debug!(respondent = %respondent, done = done.len(), "Read done-set");
        Ok(done)
    }

    /// Read the done-set, treating any unreadable log as "nothing done yet"
    ///
    /// The respondent may be shown items again if their log is damaged; they are
    /// never blocked.
    pub fn load_done_set(&self, respondent: &RespondentId) -> DoneSet {
        match self.read_done_set(respondent) {
            Ok(done) => done,
            Err(LogReadError::Empty) => {
                debug!(respondent = %respondent, "Result log is empty, no progress");
                DoneSet::default()
            }
            Err(e) => {
                warn!(respondent = %respondent, error = %e, "Unreadable result log, treating as no progress");
                DoneSet::default()
            }
        }
    }

    /// Read every record of a respondent's log
    pub fn read_records(&self, respondent: &RespondentId) -> Result<Vec<ResponseRecord>, LogReadError> {
        let path = self.log_path(respondent);
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut reader = csv::Reader::from_reader(BufReader::new(file));
        let mut records = Vec::new();
        for result in reader.deserialize() {
            records.push(result?);
        }
        Ok(records)
    }

    /// Enumerate persisted result logs, sorted by file name
    pub fn list_logs(&self) -> Result<Vec<LogEntry>, LogError> {
        let pattern = self
            .base_path
            .join(format!("{}*.{}", LOG_PREFIX, LOG_EXTENSION))
            .to_string_lossy()
            .to_string();

        let paths = glob::glob(&pattern).map_err(|e| LogError::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let mut entries = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| LogError::Io(e.into_error()))?;
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            entries.push(LogEntry {
                file_name: file_name.to_string(),
                respondent: RespondentId::from_log_file_name(file_name),
                size: fs::metadata(&path)?.len(),
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!(count = entries.len(), "Listed result logs");
        Ok(entries)
    }

    /// Raw bytes of one result log, unmodified
    pub fn read_raw(&self, file_name: &str) -> Result<Vec<u8>, LogError> {
        let is_plain_name = Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name);
        if !is_plain_name {
            return Err(LogError::InvalidLogName(file_name.to_string()));
        }

        let path = self.base_path.join(file_name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LogError::NotFound(file_name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
