use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Segment {0} does not exist")]
    SegmentNotFound(PathBuf),

    #[error("Segment {0} was never finished by its creator")]
    SegmentNotReady(PathBuf),

    #[error("Segment size {size} is smaller than the channel headers")]
    SegmentTooSmall { size: u64 },

    #[error("Segment magic mismatch, expected {expected:#x} found {found:#x}")]
    MagicMismatch { expected: u32, found: u32 },

    #[error("Segment size mismatch, expected {expected} found {found}")]
    SizeMismatch { expected: u64, found: u64 },

    #[error("Segment header of {0} failed crc validation")]
    HeaderCorrupt(PathBuf),

    #[error("Invalid channel layout: {0}")]
    InvalidLayout(String),

    #[error("Channel name is empty")]
    EmptyName,

    #[error("Invalid channel name: {0}")]
    InvalidName(String),

    #[error("Channel {0} registered twice")]
    AlreadyRegistered(String),

    #[error("Channel {0} is not a producer")]
    ReadOnlyChannel(String),

    #[error("Channel {0} does not support this publish mode")]
    WrongMode(String),

    #[error("Record size mismatch, channel slots are {expected} bytes, got {found}")]
    RecordSize { expected: usize, found: usize },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Frame of {len} bytes can never fit a data region of {capacity} bytes")]
    FrameTooLarge { len: usize, capacity: usize },

    #[error("Channel {0} is full")]
    ChannelFull(String),

    #[error("Cannot recover write position: {0}")]
    CursorRecovery(String),
}

impl Error {
    /// Errors that signal a protocol/version inconsistency or a programming
    /// error in the caller. Composition roots typically abort on these.
    pub fn is_fatal(&self) -> bool {
        return !matches!(
            self,
            Error::Io(_) | Error::SegmentNotReady(_) | Error::ChannelFull(_)
        );
    }
}
