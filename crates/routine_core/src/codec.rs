//! Byte codec for persisted collections.
//!
//! # Responsibility
//! - Map routine and to-do collections to JSON arrays and back.
//! - Keep decode tolerant of older and newer payload shapes.
//!
//! # Invariants
//! - Collection order is preserved byte-for-byte through encode/decode.
//! - Missing optional fields decode to their unset default; unknown fields
//!   are ignored.
//! - A payload that is not a JSON array fails as a whole; inside an array a
//!   bad record is skipped, never the collection.

use crate::model::normalize_title;
use crate::model::routine::RoutineRecord;
use crate::model::todo::TodoRecord;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage key of the routines array.
pub const ROUTINES_KEY: &str = "routine_items_v1";
/// Storage key of the to-dos array.
pub const TODOS_KEY: &str = "todo_items_v1";
/// Storage key of the raw brain-dump text.
pub const BRAIN_DUMP_KEY: &str = "brain_dump_text_v1";

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    NotAnArray,
    InvalidUtf8(std::string::FromUtf8Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid json payload: {err}"),
            Self::NotAnArray => write!(f, "payload is not a json array"),
            Self::InvalidUtf8(err) => write!(f, "payload is not valid utf-8: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnArray => None,
            Self::InvalidUtf8(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Decoded collection plus the count of records that had to be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Persisted record shape shared by both collections.
trait Record: DeserializeOwned {
    fn id(&self) -> Uuid;
    fn title_mut(&mut self) -> &mut String;
}

impl Record for RoutineRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }
}

impl Record for TodoRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }
}

pub fn encode_routines(routines: &[RoutineRecord]) -> CodecResult<Vec<u8>> {
    encode(routines)
}

pub fn decode_routines(bytes: &[u8]) -> CodecResult<Decoded<RoutineRecord>> {
    decode(bytes)
}

pub fn encode_todos(todos: &[TodoRecord]) -> CodecResult<Vec<u8>> {
    encode(todos)
}

pub fn decode_todos(bytes: &[u8]) -> CodecResult<Decoded<TodoRecord>> {
    decode(bytes)
}

/// Brain-dump text is stored as plain UTF-8, not JSON.
pub fn encode_brain_dump(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

pub fn decode_brain_dump(bytes: &[u8]) -> CodecResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(CodecError::InvalidUtf8)
}

fn encode<T: Serialize>(records: &[T]) -> CodecResult<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

fn decode<T: Record>(bytes: &[u8]) -> CodecResult<Decoded<T>> {
    let Value::Array(items) = serde_json::from_slice::<Value>(bytes)? else {
        return Err(CodecError::NotAnArray);
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in items {
        let Ok(mut record) = serde_json::from_value::<T>(item) else {
            skipped += 1;
            continue;
        };
        // Older payloads may predate title trimming.
        let Some(title) = normalize_title(record.title_mut()) else {
            skipped += 1;
            continue;
        };
        if !seen.insert(record.id()) {
            skipped += 1;
            continue;
        }
        *record.title_mut() = title;
        records.push(record);
    }

    Ok(Decoded { records, skipped })
}
