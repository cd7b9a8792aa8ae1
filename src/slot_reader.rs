use crate::channel::Channel;
use crate::constants::EMPTY_INDEX;
use crate::error::Error;
use log::warn;

/// Consumer side of a fixed slot channel. Each reader keeps its own
/// position, the producer never knows it exists.
#[derive(Debug)]
pub struct SlotReader {
    done_index: i64,
    scratch: Vec<u8>,
}

impl Default for SlotReader {
    fn default() -> Self {
        return SlotReader::new();
    }
}

impl SlotReader {
    /// Start from the first record ever published.
    pub fn new() -> SlotReader {
        return SlotReader {
            done_index: EMPTY_INDEX,
            scratch: vec![],
        };
    }

    /// Only deliver records published after this call.
    pub fn from_latest(channel: &Channel) -> SlotReader {
        return SlotReader {
            done_index: channel.index(),
            scratch: vec![],
        };
    }

    pub fn done_index(&self) -> i64 {
        return self.done_index;
    }

    /// Hands every record published since the last poll to `on_record`, in
    /// order, and returns how many were delivered. Records the producer has
    /// already overwritten are skipped, where walking `copy_slot` over the
    /// same indices would hand back the newer bytes. A ring that went back
    /// (publisher restart) is picked up from its current index.
    pub fn poll<F>(&mut self, channel: &Channel, mut on_record: F) -> Result<usize, Error>
    where
        F: FnMut(i64, &[u8]),
    {
        if channel.is_variable() {
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
            self.done_index = cur_index;
            return Ok(0);
        }
        if cur_index == self.done_index {
            return Ok(0);
        }

        let oldest = cur_index - channel.slot_count() as i64 + 1;
        let mut first = self.done_index + 1;
        if first < oldest {
            warn!(
                "{} lapped, {} records were overwritten before being read",
                channel.name(),
                oldest - first
            );
            first = oldest;
        }

        self.scratch.resize(channel.slot_size(), 0);
        for i in first..=cur_index {
            channel.copy_slot(i, &mut self.scratch)?;
            on_record(i, &self.scratch);
        }
        self.done_index = cur_index;
        return Ok((cur_index - first + 1) as usize);
    }
}
