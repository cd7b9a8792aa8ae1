use crate::constants::{
    FRAME_HEADER_SIZE, FRAME_POS_LEN, FRAME_POS_MSG_TYPE, FRAME_POS_SEQ, FRAME_POS_TIMESTAMP,
    MAX_FRAME_LEN,
};
use crate::error::Error;
use crate::mem_map::MemMap;

/// Header stored in front of every variable length payload. `frame_len`
/// includes the header itself; a zero `frame_len` is the wrap sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageFrame {
    pub msg_type: u16,
    pub frame_len: u16,
    pub timestamp: i32,
    pub seq: i64,
}

impl MessageFrame {
    pub fn for_payload(msg_type: u16, timestamp: i32, payload_len: usize) -> Result<Self, Error> {
        let frame_len = FRAME_HEADER_SIZE + payload_len;
        if frame_len > MAX_FRAME_LEN {
            return Err(Error::InvalidFrame(format!(
                "payload of {} bytes exceeds the {} byte frame limit",
                payload_len, MAX_FRAME_LEN
            )));
        }
        return Ok(MessageFrame {
            msg_type: msg_type,
            frame_len: frame_len as u16,
            timestamp: timestamp,
            seq: 0,
        });
    }

    pub fn payload_len(&self) -> usize {
        return (self.frame_len as usize).saturating_sub(FRAME_HEADER_SIZE);
    }

    pub fn encode(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut out = [0u8; FRAME_HEADER_SIZE];
        out[FRAME_POS_MSG_TYPE..FRAME_POS_LEN].copy_from_slice(&self.msg_type.to_ne_bytes());
        out[FRAME_POS_LEN..FRAME_POS_TIMESTAMP].copy_from_slice(&self.frame_len.to_ne_bytes());
        out[FRAME_POS_TIMESTAMP..FRAME_POS_SEQ].copy_from_slice(&self.timestamp.to_ne_bytes());
        out[FRAME_POS_SEQ..FRAME_HEADER_SIZE].copy_from_slice(&self.seq.to_ne_bytes());
        return out;
    }

    /// Decode the header at the front of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        if data.len() < FRAME_HEADER_SIZE {
            return Err(Error::InvalidFrame(format!(
                "{} bytes is shorter than a frame header",
                data.len()
            )));
        }
        let mut msg_type = [0u8; 2];
        let mut frame_len = [0u8; 2];
        let mut timestamp = [0u8; 4];
        let mut seq = [0u8; 8];
        msg_type.copy_from_slice(&data[FRAME_POS_MSG_TYPE..FRAME_POS_LEN]);
        frame_len.copy_from_slice(&data[FRAME_POS_LEN..FRAME_POS_TIMESTAMP]);
        timestamp.copy_from_slice(&data[FRAME_POS_TIMESTAMP..FRAME_POS_SEQ]);
        seq.copy_from_slice(&data[FRAME_POS_SEQ..FRAME_HEADER_SIZE]);
        return Ok(MessageFrame {
            msg_type: u16::from_ne_bytes(msg_type),
            frame_len: u16::from_ne_bytes(frame_len),
            timestamp: i32::from_ne_bytes(timestamp),
            seq: i64::from_ne_bytes(seq),
        });
    }

    pub fn read_at(map: &MemMap, pos: usize) -> Self {
        return MessageFrame {
            msg_type: map.read_u16_at(pos + FRAME_POS_MSG_TYPE),
            frame_len: map.read_u16_at(pos + FRAME_POS_LEN),
            timestamp: map.read_i32_at(pos + FRAME_POS_TIMESTAMP),
            seq: map.read_i64_at(pos + FRAME_POS_SEQ),
        };
    }
}

/// A message copied out of a variable length channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u16,
    pub timestamp: i32,
    pub seq: i64,
    pub payload: Vec<u8>,
}

/// Build header + payload in one buffer, ready for `Channel::publish_var`.
pub fn encode_frame(msg_type: u16, timestamp: i32, payload: &[u8]) -> Result<Vec<u8>, Error> {
    let header = MessageFrame::for_payload(msg_type, timestamp, payload.len())?;
    let mut out = Vec::with_capacity(header.frame_len as usize);
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(payload);
    return Ok(out);
}
