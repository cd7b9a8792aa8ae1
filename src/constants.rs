// Every channel segment starts with the same two fixed headers, after which
// the rest of the segment is the data region (slots or frames).

// layout
//  0  -- u32 magic, written last by the creator (0 means still initializing)
//  4  -- i32 session id
//  8  -- i32 creator pid
// 12  -- u32 crc32 over bytes 4..12 and 16..32
// 16  -- u64 total segment size
// 24  -- i64 creation time, nanos since epoch
// 32  -- end of segment header
//
// control block, starting at 32:
// 32  -- u16 slot size (0 for variable length)
// 34  -- u16 overwrite (1 wraps to the start of the data region)
// 36  -- u32 slot count (0 for variable length)
// 40  -- i64 publish index, -1 when empty, only ever touched atomically
// 48  -- start of the data region

// The crc takes the place of what would be alignment padding, so the publish
// index sits on an 8 byte boundary.

pub const SEGMENT_HEADER_SIZE: usize = 32;
pub const CONTROL_BLOCK_SIZE: usize = 16;
pub const DATA_START: usize = SEGMENT_HEADER_SIZE + CONTROL_BLOCK_SIZE;

// Absolute positions of the segment header
pub const HDR_POS_MAGIC: usize = 0;
pub const HDR_POS_SESSION_ID: usize = 4;
pub const HDR_POS_CREATOR_PID: usize = 8;
pub const HDR_POS_CRC: usize = 12;
pub const HDR_POS_TOTAL_SIZE: usize = 16;
pub const HDR_POS_CREATION_TIME: usize = 24;

// Absolute positions of the control block
pub const CB_POS_SLOT_SIZE: usize = 32;
pub const CB_POS_OVERWRITE: usize = 34;
pub const CB_POS_SLOT_COUNT: usize = 36;
pub const CB_POS_PUBLISH_INDEX: usize = 40;

// Variable length frames, relative to the start of the frame
// u16  0 -- msg type
// u16  2 -- frame len (header + payload)
// i32  4 -- timestamp
// i64  8 -- seq
//     16 -- payload
pub const FRAME_HEADER_SIZE: usize = 16;
pub const FRAME_POS_MSG_TYPE: usize = 0;
pub const FRAME_POS_LEN: usize = 2;
pub const FRAME_POS_TIMESTAMP: usize = 4;
pub const FRAME_POS_SEQ: usize = 8;
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Type tag stamped into every channel segment.
pub const CHANNEL_MAGIC: u32 = ('C' as u32) * 42 + ('n' as u32) * 41 + ('l' as u32) * 37;

// How long attach waits for a concurrent creator to finish the header
pub const ATTACH_RETRIES: u32 = 200;
pub const ATTACH_RETRY_INTERVAL: std::time::Duration = std::time::Duration::from_millis(5);

pub const EMPTY_INDEX: i64 = -1;
