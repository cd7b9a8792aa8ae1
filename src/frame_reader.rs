use crate::channel::Channel;
use crate::constants::{DATA_START, EMPTY_INDEX, FRAME_HEADER_SIZE};
use crate::error::Error;
use crate::frame::{Frame, MessageFrame};
use log::warn;

enum ReadResult {
    // nothing readable at the current position
    Wrap,
    Success(Frame, usize), // frame, len
}

/// Consumer side of a variable length channel, walks the frames in the order
/// they were written.
#[derive(Debug, Clone)]
pub struct FrameReader {
    position: usize,
    done_index: i64,
}

impl Default for FrameReader {
    fn default() -> Self {
        return FrameReader::new();
    }
}

impl FrameReader {
    pub fn new() -> FrameReader {
        return FrameReader {
            position: DATA_START,
            done_index: EMPTY_INDEX,
        };
    }

    /// Offset of the next frame to read.
    pub fn position(&self) -> usize {
        return self.position;
    }

    pub fn done_index(&self) -> i64 {
        return self.done_index;
    }

    /// Returns the next frame, or None if nothing new was published (or the
    /// channel doesn't wrap and the walk hit the end of the region).
    pub fn poll_var(&mut self, channel: &Channel) -> Result<Option<Frame>, Error> {
        if !channel.is_variable() {
            return Err(Error::WrongMode(channel.name().to_string()));
        }

        let cur_index = channel.index();
        if cur_index < self.done_index {
            warn!(
                "{} < {}, channel {} maybe cleared",
                cur_index,
                self.done_index,
                channel.name()
            );
            self.position = channel.data_start();
            self.done_index = EMPTY_INDEX;
        }
        if cur_index == self.done_index {
            return Ok(None);
        }

        let mut wrapped = false;
        loop {
            match self.read_frame(channel, cur_index) {
                ReadResult::Success(frame, frame_len) => {
                    if frame.seq != self.done_index + 1 {
                        warn!(
                            "caused by channel warp, {} jumps from idx={} to idx={}",
                            channel.name(),
                            self.done_index,
                            frame.seq
                        );
                    }
                    self.position += frame_len;
                    self.done_index = frame.seq;
                    return Ok(Some(frame));
                }
                ReadResult::Wrap => {
                    if !channel.overwrite() || wrapped {
                        return Ok(None);
                    }
                    self.position = channel.data_start();
                    wrapped = true;
                }
            }
        }
    }

    fn read_frame(&self, channel: &Channel, cur_index: i64) -> ReadResult {
        let mem = channel.mem();
        let pos = self.position;
        if pos + FRAME_HEADER_SIZE > channel.data_end() {
            return ReadResult::Wrap;
        }

        // zero frame_len is the sentinel, anything else out of range means the
        // producer is rewriting these bytes
        let header = MessageFrame::read_at(mem, pos);
        let frame_len = header.frame_len as usize;
        if frame_len < FRAME_HEADER_SIZE || pos + frame_len > channel.data_end() {
            return ReadResult::Wrap;
        }
        if header.seq <= self.done_index || header.seq > cur_index {
            return ReadResult::Wrap;
        }

        let mut payload = vec![0u8; header.payload_len()];
        mem.read_bytes(pos + FRAME_HEADER_SIZE, &mut payload);

        // check the header again to ensure nothing changed while copying
        std::sync::atomic::fence(std::sync::atomic::Ordering::Acquire);
        if MessageFrame::read_at(mem, pos) != header {
            return ReadResult::Wrap;
        }

        return ReadResult::Success(
            Frame {
                msg_type: header.msg_type,
                timestamp: header.timestamp,
                seq: header.seq,
                payload: payload,
            },
            frame_len,
        );
    }
}
