use std::path::PathBuf;

use thiserror::Error;

use super::gate::SaveBlocker;

pub const GEM_OK: i32 = 0;
pub const GEM_ERROR: i32 = -1;

#[derive(Debug, Error)]
pub enum SlotScanError {
    #[error("failed to create save directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read save directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Scan(#[from] SlotScanError),
    #[error("save slot name is empty")]
    EmptySlotName,
    #[error("save slot name \"{0}\" contains characters a slot directory cannot hold")]
    InvalidSlotName(String),
    #[error("slot path {0} is too long")]
    SlotPathTooLong(PathBuf),
    #[error("failed to create slot directory {path}: {source}")]
    CreateSlotDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove slot directory {path}: {source}")]
    RemoveSlot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to rename quick save {from} to {to}: {source}")]
    RenameQuickSave {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read/write file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("slot {slot} has no {resource}")]
    MissingResource { slot: PathBuf, resource: String },
    #[error("failed to decode image {path}: {source}")]
    DecodeImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode image {path}: {source}")]
    EncodeImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("save step {step} failed: {reason}")]
    Writer { step: &'static str, reason: String },
    #[error("background area extraction could not flush its cache: {0}")]
    ExtractorFlush(String),
}

impl SaveError {
    pub fn writer(step: &'static str, reason: impl Into<String>) -> Self {
        SaveError::Writer {
            step,
            reason: reason.into(),
        }
    }
}

/// Outcome of a save request as the interface sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed,
    Blocked(SaveBlocker),
}

impl SaveStatus {
    /// Numeric code: 0 for success, -1 for failure, gate codes otherwise.
    pub fn code(self) -> i32 {
        match self {
            SaveStatus::Saved => GEM_OK,
            SaveStatus::Failed => GEM_ERROR,
            SaveStatus::Blocked(blocker) => blocker.code(),
        }
    }
}
