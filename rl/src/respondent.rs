//! Respondent identity and its file-name encoding

use std::fmt;
use std::str::FromStr;

use crate::error::LogError;
use crate::{LOG_EXTENSION, LOG_PREFIX};

/// Free-text respondent identifier, kept verbatim
///
/// No uniqueness or authentication: two people typing the same name share a
/// result log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RespondentId(String);

impl RespondentId {
    /// Surrounding whitespace is trimmed; an empty identifier is rejected
    pub fn new(raw: &str) -> Result<Self, LogError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LogError::InvalidRespondent(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe stem for this identifier
    ///
    /// Alphanumerics (any script), `-` and `_` pass through; every other UTF-8
    /// byte becomes `%XX`. `%` itself is escaped, so the mapping is reversible.
    pub fn file_stem(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for ch in self.0.chars() {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                out.push(ch);
            } else {
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
        }
        out
    }

    /// Result log file name, e.g. `eval_yamada.csv`
    pub fn log_file_name(&self) -> String {
        format!("{}{}.{}", LOG_PREFIX, self.file_stem(), LOG_EXTENSION)
    }

    /// Recover the identifier from a result log file name
    pub fn from_log_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_prefix(LOG_PREFIX)?
            .strip_suffix(LOG_EXTENSION)?
            .strip_suffix('.')?;
        let decoded = decode_stem(stem)?;
        Self::new(&decoded).ok()
    }
}

fn decode_stem(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

impl FromStr for RespondentId {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for RespondentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
