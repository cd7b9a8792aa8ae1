mod channel;
mod config;
mod constants;
mod control_block;
mod coordinator;
mod error;
mod frame;
mod frame_reader;
mod mem_map;
mod registry;
mod segment;
mod slot_reader;
mod utils;

#[cfg(not(unix))]
compile_error!("shm_channel maps shared memory through mmap and only builds on unix");

pub use crate::channel::{Channel, ChannelRole};
pub use crate::config::{RegistryConfig, DEFAULT_DIR, ENV_DIR, ENV_LOCK, ENV_SESSION};
pub use crate::constants::{CHANNEL_MAGIC, DATA_START, FRAME_HEADER_SIZE, MAX_FRAME_LEN};
pub use crate::coordinator::ChannelCoordinator;
pub use crate::error::{Error, Result};
pub use crate::frame::{encode_frame, Frame, MessageFrame};
pub use crate::frame_reader::FrameReader;
pub use crate::mem_map::MemMap;
pub use crate::registry::ChannelRegistry;
pub use crate::segment::{
    acquire, acquire_with, attach, read_header, release, SegmentHeader, SegmentOptions,
};
pub use crate::slot_reader::SlotReader;
pub use crate::utils::{format_nanos, now_nanos, today_session_id};
