/*
 * A single writer, multiple reader channel over one shared segment.
 *
 * Fixed slot mode: the data region is `slot_count` slots of `slot_size`
 * bytes, record i lives in slot i % slot_count.
 *
 * Variable length mode (slot_size == slot_count == 0): records are
 * MessageFrames laid end to end. When a frame doesn't fit before the end of
 * the region the producer zeroes the tail (a zero frame_len means "wrap") and
 * starts over at the front.
 *
 * In both modes the producer copies the record first and only then bumps
 * the publish index with release ordering; readers acquire the index before
 * touching record bytes.
 */
use crate::constants::{DATA_START, EMPTY_INDEX, FRAME_HEADER_SIZE, FRAME_POS_SEQ};
use crate::control_block;
use crate::error::Error;
use crate::frame::MessageFrame;
use crate::mem_map::MemMap;
use crate::segment::SegmentHeader;
use crate::utils::format_nanos;
use log::{debug, info};
use std::sync::atomic::{fence, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    /// Producer of a directly registered channel, resets the ring on attach
    Publisher,
    /// Consumer of a directly registered channel
    Subscriber,
    /// Producer side of a coordinator created channel
    TuberProducer,
    /// Consumer side of a coordinator created channel
    TuberConsumer,
}

impl ChannelRole {
    pub fn is_producer(&self) -> bool {
        return match self {
            ChannelRole::Publisher | ChannelRole::TuberProducer => true,
            ChannelRole::Subscriber | ChannelRole::TuberConsumer => false,
        };
    }
}

pub struct Channel {
    name: String,
    role: ChannelRole,
    mem: MemMap,
    header: SegmentHeader,
    data_start: usize,
    data_end: usize,

    // where the producer writes next
    write_position: usize,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("index", &self.index())
            .field("write_position", &self.write_position)
            .finish()
    }
}

impl Channel {
    pub fn new(name: &str, mut mem: MemMap, role: ChannelRole) -> Result<Channel, Error> {
        let header = SegmentHeader::read(&mem);
        let data_start = DATA_START;
        let data_end = header.total_size as usize;
        if data_end > mem.len() || data_end < data_start {
            return Err(Error::InvalidLayout(format!(
                "{} header size {} does not match the {} byte mapping",
                name,
                header.total_size,
                mem.len()
            )));
        }

        let slot_size = control_block::slot_size(&mem) as usize;
        let slot_count = control_block::slot_count(&mem) as usize;
        if (slot_size == 0) != (slot_count == 0) {
            return Err(Error::InvalidLayout(format!(
                "{} has slot size {} with slot count {}",
                name, slot_size, slot_count
            )));
        }
        if slot_size * slot_count > data_end - data_start {
            return Err(Error::InvalidLayout(format!(
                "{} needs {} x {} bytes of slots but the data region is {} bytes",
                name,
                slot_count,
                slot_size,
                data_end - data_start
            )));
        }

        match role {
            ChannelRole::Publisher => control_block::reset_ring(&mut mem),
            ChannelRole::Subscriber | ChannelRole::TuberProducer | ChannelRole::TuberConsumer => {}
        }

        let index = control_block::publish_index(&mem);
        let overwrite = control_block::overwrite(&mem);
        let write_position = if slot_count != 0 {
            let next = index + 1;
            if !overwrite && next >= slot_count as i64 {
                data_start + slot_count * slot_size
            } else {
                data_start + next.rem_euclid(slot_count as i64) as usize * slot_size
            }
        } else if index == EMPTY_INDEX || !role.is_producer() {
            data_start
        } else {
            recover_write_position(&mem, data_start, data_end, index, overwrite)?
        };

        info!(
            "{} init role={:?}, idx={}, warp={}, slot_count={}, slot_size={}, pid={}, session={}, t={}",
            name,
            role,
            index,
            overwrite as u32,
            slot_count,
            slot_size,
            header.creator_pid,
            header.session_id,
            format_nanos(header.creation_time_nanos)
        );

        return Ok(Channel {
            name: name.to_string(),
            role: role,
            mem: mem,
            header: header,
            data_start: data_start,
            data_end: data_end,
            write_position: write_position,
        });
    }

    pub fn name(&self) -> &str {
        return &self.name;
    }

    pub fn role(&self) -> ChannelRole {
        return self.role;
    }

    pub fn header(&self) -> &SegmentHeader {
        return &self.header;
    }

    /// Index of the last published record, -1 when nothing was published.
    pub fn index(&self) -> i64 {
        return control_block::publish_index(&self.mem);
    }

    pub fn slot_size(&self) -> usize {
        return control_block::slot_size(&self.mem) as usize;
    }

    pub fn slot_count(&self) -> usize {
        return control_block::slot_count(&self.mem) as usize;
    }

    pub fn overwrite(&self) -> bool {
        return control_block::overwrite(&self.mem);
    }

    pub fn is_variable(&self) -> bool {
        return self.slot_count() == 0;
    }

    pub fn data_start(&self) -> usize {
        return self.data_start;
    }

    pub fn data_end(&self) -> usize {
        return self.data_end;
    }

    pub fn write_position(&self) -> usize {
        return self.write_position;
    }

    pub(crate) fn mem(&self) -> &MemMap {
        return &self.mem;
    }

    /// Turning wrapping off makes the channel bounded, publishing into a full
    /// channel then fails with `ChannelFull`. Turning it back on lets a full
    /// channel carry on from the start.
    pub fn set_overwrite(&mut self, overwrite: bool) -> Result<(), Error> {
        self.require_producer()?;
        control_block::set_overwrite(&mut self.mem, overwrite);
        if overwrite && !self.is_variable() && self.write_position >= self.slots_end() {
            debug!("{} warp to data start", self.name);
            self.write_position = self.data_start;
        }
        return Ok(());
    }

    fn require_producer(&self) -> Result<(), Error> {
        if !self.role.is_producer() {
            return Err(Error::ReadOnlyChannel(self.name.clone()));
        }
        return Ok(());
    }

    fn slots_end(&self) -> usize {
        return self.data_start + self.slot_count() * self.slot_size();
    }

    /// Publish one fixed size record, returns the index assigned to it.
    pub fn publish(&mut self, record: &[u8]) -> Result<i64, Error> {
        self.require_producer()?;
        if self.is_variable() {
            return Err(Error::WrongMode(self.name.clone()));
        }
        let slot_size = self.slot_size();
        if record.len() != slot_size {
            return Err(Error::RecordSize {
                expected: slot_size,
                found: record.len(),
            });
        }

        let slots_end = self.slots_end();
        if self.write_position + slot_size > slots_end {
            return Err(Error::ChannelFull(self.name.clone()));
        }

        self.mem.write_bytes(self.write_position, record);
        self.write_position += slot_size;
        if self.write_position >= slots_end && self.overwrite() {
            debug!("{} warp to data start", self.name);
            self.write_position = self.data_start;
        }

        return Ok(control_block::commit(&self.mem));
    }

    /// Publish a frame that already carries its MessageFrame header. The seq
    /// in the header is overwritten with the index this record gets.
    pub fn publish_var(&mut self, frame: &[u8]) -> Result<i64, Error> {
        self.require_producer()?;
        if !self.is_variable() {
            return Err(Error::WrongMode(self.name.clone()));
        }
        let mut header = MessageFrame::decode(frame)?;
        let frame_len = header.frame_len as usize;
        if frame_len < FRAME_HEADER_SIZE || frame_len > frame.len() {
            return Err(Error::InvalidFrame(format!(
                "frame_len {} with a {} byte buffer",
                frame_len,
                frame.len()
            )));
        }

        header.seq = self.index() + 1;
        let pos = self.reserve_frame(frame_len)?;
        self.write_frame(pos, &header, &frame[FRAME_HEADER_SIZE..frame_len]);
        return Ok(self.finish_frame(pos, frame_len));
    }

    /// Encode the frame header straight into the channel, no staging buffer.
    pub fn publish_msg(
        &mut self,
        msg_type: u16,
        timestamp: i32,
        payload: &[u8],
    ) -> Result<i64, Error> {
        self.require_producer()?;
        if !self.is_variable() {
            return Err(Error::WrongMode(self.name.clone()));
        }
        let mut header = MessageFrame::for_payload(msg_type, timestamp, payload.len())?;
        header.seq = self.index() + 1;
        let frame_len = header.frame_len as usize;

        let pos = self.reserve_frame(frame_len)?;
        self.write_frame(pos, &header, payload);
        return Ok(self.finish_frame(pos, frame_len));
    }

    // find where a frame of frame_len goes, wrapping if we have to
    fn reserve_frame(&mut self, frame_len: usize) -> Result<usize, Error> {
        let capacity = self.data_end - self.data_start;
        if frame_len > capacity {
            return Err(Error::FrameTooLarge {
                len: frame_len,
                capacity: capacity,
            });
        }
        if self.write_position + frame_len <= self.data_end {
            return Ok(self.write_position);
        }
        if !self.overwrite() {
            return Err(Error::ChannelFull(self.name.clone()));
        }

        // zeroed tail tells readers to go back to the start
        let tail = self.data_end - self.write_position;
        self.mem.zero(self.write_position, tail);
        debug!("{} warp to data start", self.name);
        self.write_position = self.data_start;
        return Ok(self.write_position);
    }

    // The slot's header is invalidated before the payload goes in, and the
    // new seq is stored last. Until then readers see frame_len 0 or seq -1.
    fn write_frame(&mut self, pos: usize, header: &MessageFrame, payload: &[u8]) {
        let invalid = MessageFrame {
            msg_type: 0,
            frame_len: 0,
            timestamp: 0,
            seq: EMPTY_INDEX,
        };
        self.mem.write_bytes(pos, &invalid.encode());
        fence(Ordering::Release);
        self.mem.write_bytes(pos + FRAME_HEADER_SIZE, payload);
        fence(Ordering::Release);
        self.mem.write_bytes(pos, &header.encode()[..FRAME_POS_SEQ]);
        fence(Ordering::Release);
        self.mem.write_i64_at(pos + FRAME_POS_SEQ, header.seq);
    }

    fn finish_frame(&mut self, pos: usize, frame_len: usize) -> i64 {
        self.write_position = pos + frame_len;
        if self.write_position == self.data_end && self.overwrite() {
            debug!("{} warp to data start", self.name);
            self.write_position = self.data_start;
        }
        return control_block::commit(&self.mem);
    }

    /// Copy the slot holding record `index`. Once the producer has lapped the
    /// slot this returns the newer record's bytes.
    pub fn copy_slot(&self, index: i64, out: &mut [u8]) -> Result<(), Error> {
        if self.is_variable() {
            return Err(Error::WrongMode(self.name.clone()));
        }
        let slot_size = self.slot_size();
        if out.len() != slot_size {
            return Err(Error::RecordSize {
                expected: slot_size,
                found: out.len(),
            });
        }
        let slot = index.rem_euclid(self.slot_count() as i64) as usize;
        self.mem.read_bytes(self.data_start + slot * slot_size, out);
        return Ok(());
    }
}

// The frames from the start of the region form an unbroken seq chain that
// ends with the newest record, the write position is right after it.
fn recover_write_position(
    mem: &MemMap,
    data_start: usize,
    data_end: usize,
    index: i64,
    overwrite: bool,
) -> Result<usize, Error> {
    let mut pos = data_start;
    let mut expected: Option<i64> = None;
    while pos + FRAME_HEADER_SIZE <= data_end {
        let frame = MessageFrame::read_at(mem, pos);
        let frame_len = frame.frame_len as usize;
        if frame_len < FRAME_HEADER_SIZE || pos + frame_len > data_end {
            break;
        }
        if expected.map_or(false, |seq| seq != frame.seq) || frame.seq > index {
            break;
        }
        if frame.seq == index {
            let end = pos + frame_len;
            if end == data_end && overwrite {
                return Ok(data_start);
            }
            return Ok(end);
        }
        expected = Some(frame.seq + 1);
        pos += frame_len;
    }
    return Err(Error::CursorRecovery(format!(
        "no frame chain from the data start reaches index {}",
        index
    )));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CHANNEL_MAGIC;
    use crate::frame::encode_frame;
    use crate::segment::{acquire_with, attach, SegmentOptions};
    use std::path::Path;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn create(path: &Path, data_size: usize, slot_size: u16, slot_count: u32) -> MemMap {
        return acquire_with(
            path,
            (DATA_START + data_size) as u64,
            CHANNEL_MAGIC,
            1,
            SegmentOptions::default(),
            |mem| {
                control_block::set_layout(mem, slot_size, slot_count);
                control_block::reset_ring(mem);
            },
        )
        .expect("Should create segment");
    }

    fn publisher(path: &Path, data_size: usize, slot_size: u16, slot_count: u32) -> Channel {
        let mem = create(path, data_size, slot_size, slot_count);
        return Channel::new("test", mem, ChannelRole::Publisher).expect("Should construct");
    }

    fn subscriber(path: &Path) -> Channel {
        let mem = attach(path, CHANNEL_MAGIC).expect("Should attach");
        return Channel::new("test", mem, ChannelRole::Subscriber).expect("Should construct");
    }

    #[test]
    fn fixed_index_increments_per_record() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        let mut channel = publisher(&path, 32, 8, 4);
        assert!(channel.index() == -1);
        for i in 0..10i64 {
            let idx = channel.publish(&i.to_ne_bytes()).expect("Should publish");
            assert!(idx == i);
            assert!(channel.index() == i);
        }
    }

    #[test]
    fn fixed_round_trip_before_wrap() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        let mut channel = publisher(&path, 40, 8, 5);
        for i in 0..5u64 {
            channel
                .publish(&(100 + i).to_ne_bytes())
                .expect("Should publish");
        }

        let sub = subscriber(&path);
        let mut out = [0u8; 8];
        for i in 0..5i64 {
            sub.copy_slot(i, &mut out).expect("Should copy");
            assert!(u64::from_ne_bytes(out) == 100 + i as u64);
        }
    }

    #[test]
    fn md_scenario_wraps_and_overwrites() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        let mut channel = publisher(&path, 32, 8, 4);
        for i in 0..6u64 {
            channel.publish(&i.to_ne_bytes()).expect("Should publish");
        }
        assert!(channel.index() == 5);

        let sub = subscriber(&path);
        let mut out = [0u8; 8];
        // 0 and 1 were overwritten by 4 and 5
        sub.copy_slot(0, &mut out).expect("Should copy");
        assert!(u64::from_ne_bytes(out) == 4);
        sub.copy_slot(1, &mut out).expect("Should copy");
        assert!(u64::from_ne_bytes(out) == 5);
        for i in 2..6i64 {
            sub.copy_slot(i, &mut out).expect("Should copy");
            assert!(u64::from_ne_bytes(out) == i as u64);
        }

        // slots 2, 3, 0, 1 hold 2, 3, 4, 5
        let mut raw = [0u8; 32];
        sub.mem().read_bytes(DATA_START, &mut raw);
        let values: Vec<u64> = raw
            .chunks(8)
            .map(|c| u64::from_ne_bytes(c.try_into().expect("8 bytes")))
            .collect();
        assert!(values == vec![4, 5, 2, 3]);
    }

    #[test]
    fn wrong_record_size_is_rejected() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        let mut channel = publisher(&path, 32, 8, 4);
        match channel.publish(&[1, 2, 3]) {
            Err(Error::RecordSize { expected, found }) => {
                assert!(expected == 8);
                assert!(found == 3);
            }
            other => panic!("Expected record size error, got {:?}", other),
        }
        assert!(channel.index() == -1);
        assert!(matches!(
            channel.publish_msg(0, 0, b"x"),
            Err(Error::WrongMode(_))
        ));
    }

    #[test]
    fn subscriber_cannot_publish() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        let _publisher = publisher(&path, 32, 8, 4);
        let mut sub = subscriber(&path);
        assert!(matches!(
            sub.publish(&[0u8; 8]),
            Err(Error::ReadOnlyChannel(_))
        ));
        assert!(matches!(
            sub.set_overwrite(false),
            Err(Error::ReadOnlyChannel(_))
        ));
        assert!(sub.index() == -1);
    }

    #[test]
    fn fixed_without_overwrite_fills_up() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        let mut channel = publisher(&path, 16, 8, 2);
        channel.set_overwrite(false).expect("Producer may set overwrite");
        channel.publish(&[1u8; 8]).expect("Should publish");
        channel.publish(&[2u8; 8]).expect("Should publish");
        assert!(matches!(
            channel.publish(&[3u8; 8]),
            Err(Error::ChannelFull(_))
        ));
        assert!(channel.index() == 1);
    }

    #[test]
    fn full_fixed_channel_continues_once_overwrite_is_back_on() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        let mut channel = publisher(&path, 16, 8, 2);
        channel.set_overwrite(false).expect("Producer may set overwrite");
        channel.publish(&[1u8; 8]).expect("Should publish");
        channel.publish(&[2u8; 8]).expect("Should publish");
        assert!(channel.write_position() == DATA_START + 16);

        channel.set_overwrite(true).expect("Producer may set overwrite");
        assert!(channel.write_position() == DATA_START);
        assert!(channel.publish(&[3u8; 8]).expect("Should publish") == 2);
        let mut out = [0u8; 8];
        channel.copy_slot(2, &mut out).expect("Should copy");
        assert!(out == [3u8; 8]);
    }

    #[test]
    fn publisher_restart_resets_index() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        {
            let mut channel = publisher(&path, 32, 8, 4);
            channel.publish(&[1u8; 8]).expect("Should publish");
            channel.publish(&[2u8; 8]).expect("Should publish");
        }
        let sub = subscriber(&path);
        assert!(sub.index() == 1);

        let mem = attach(&path, CHANNEL_MAGIC).expect("Should attach");
        let mut restarted = Channel::new("test", mem, ChannelRole::Publisher).expect("Ok");
        assert!(sub.index() == -1);
        assert!(restarted.write_position() == DATA_START);
        assert!(restarted.publish(&[3u8; 8]).expect("Should publish") == 0);
    }

    #[test]
    fn tuber_producer_resumes_fixed() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("md");
        {
            let mut channel = publisher(&path, 32, 8, 4);
            for i in 0..5u64 {
                channel.publish(&i.to_ne_bytes()).expect("Should publish");
            }
        }
        let mem = attach(&path, CHANNEL_MAGIC).expect("Should attach");
        let mut resumed = Channel::new("test", mem, ChannelRole::TuberProducer).expect("Ok");
        assert!(resumed.index() == 4);
        // record 5 goes into slot 1
        assert!(resumed.write_position() == DATA_START + 8);
        assert!(resumed.publish(&5u64.to_ne_bytes()).expect("Should publish") == 5);
        let mut out = [0u8; 8];
        resumed.copy_slot(5, &mut out).expect("Should copy");
        assert!(u64::from_ne_bytes(out) == 5);
    }

    #[test]
    fn var_frames_are_laid_end_to_end() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("var");
        let mut channel = publisher(&path, 256, 0, 0);
        assert!(channel.is_variable());

        // the caller's seq is ignored, the producer stamps the real one
        let mut frame = encode_frame(7, 99, b"0123456789").expect("Should encode");
        frame[FRAME_POS_SEQ..FRAME_HEADER_SIZE].copy_from_slice(&1234i64.to_ne_bytes());
        assert!(channel.publish_var(&frame).expect("Should publish") == 0);
        assert!(channel.publish_msg(8, 100, b"").expect("Should publish") == 1);

        let first = MessageFrame::read_at(channel.mem(), DATA_START);
        assert!(first.msg_type == 7);
        assert!(first.frame_len == 26);
        assert!(first.timestamp == 99);
        assert!(first.seq == 0);
        let second = MessageFrame::read_at(channel.mem(), DATA_START + 26);
        assert!(second.frame_len as usize == FRAME_HEADER_SIZE);
        assert!(second.seq == 1);
        assert!(channel.write_position() == DATA_START + 26 + FRAME_HEADER_SIZE);
    }

    #[test]
    fn var_wrap_leaves_zero_sentinel() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("var");
        // 100 bytes of data: two 40 byte frames fit, the third wraps
        let mut channel = publisher(&path, 100, 0, 0);
        let payload = [0xabu8; 24];
        channel.publish_msg(1, 0, &payload).expect("Should publish");
        channel.publish_msg(1, 0, &payload).expect("Should publish");
        let old_position = channel.write_position();
        assert!(old_position == DATA_START + 80);

        let seq = channel.publish_msg(2, 0, &payload).expect("Should publish");
        assert!(seq == 2);
        assert!(MessageFrame::read_at(channel.mem(), old_position).frame_len == 0);
        let mut tail = [0xffu8; 20];
        channel.mem().read_bytes(old_position, &mut tail);
        assert!(tail == [0u8; 20]);

        let wrapped = MessageFrame::read_at(channel.mem(), DATA_START);
        assert!(wrapped.msg_type == 2);
        assert!(wrapped.seq == 2);
        assert!(channel.write_position() == DATA_START + 40);
    }

    #[test]
    fn var_without_overwrite_reports_full() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("var");
        let mut channel = publisher(&path, 64, 0, 0);
        channel.set_overwrite(false).expect("Producer may set overwrite");
        channel.publish_msg(1, 0, &[0u8; 24]).expect("Should publish");
        let before = channel.write_position();
        assert!(matches!(
            channel.publish_msg(1, 0, &[0u8; 24]),
            Err(Error::ChannelFull(_))
        ));
        assert!(channel.write_position() == before);
        assert!(channel.index() == 0);
        assert!(matches!(
            channel.publish_msg(1, 0, &[0u8; 100]),
            Err(Error::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn var_rejects_inconsistent_frame_len() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("var");
        let mut channel = publisher(&path, 64, 0, 0);
        let mut frame = encode_frame(1, 0, b"abc").expect("Should encode");
        frame.truncate(FRAME_HEADER_SIZE + 1);
        assert!(matches!(
            channel.publish_var(&frame),
            Err(Error::InvalidFrame(_))
        ));
        let sentinel = [0u8; FRAME_HEADER_SIZE];
        assert!(matches!(
            channel.publish_var(&sentinel),
            Err(Error::InvalidFrame(_))
        ));
        assert!(channel.index() == -1);
    }

    #[test]
    fn tuber_producer_recovers_var_position() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("var");
        let expected_position;
        {
            let mut channel = publisher(&path, 100, 0, 0);
            for i in 0..4u8 {
                // 30 byte frames, the fourth wraps to the start
                channel.publish_msg(i as u16, 0, &[i; 14]).expect("Should publish");
            }
            expected_position = channel.write_position();
        }
        assert!(expected_position == DATA_START + 30);

        let mem = attach(&path, CHANNEL_MAGIC).expect("Should attach");
        let mut resumed = Channel::new("test", mem, ChannelRole::TuberProducer).expect("Ok");
        assert!(resumed.write_position() == expected_position);
        assert!(resumed.publish_msg(9, 0, &[9; 14]).expect("Should publish") == 4);
        let frame = MessageFrame::read_at(resumed.mem(), expected_position);
        assert!(frame.seq == 4);
        assert!(frame.msg_type == 9);
    }

    #[test]
    fn unrecoverable_var_position_is_an_error() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("var");
        {
            let mut channel = publisher(&path, 100, 0, 0);
            channel.publish_msg(1, 0, b"abc").expect("Should publish");
        }
        // wipe the only frame, the index still claims one was published
        let mut mem = attach(&path, CHANNEL_MAGIC).expect("Should attach");
        mem.zero(DATA_START, FRAME_HEADER_SIZE);
        assert!(matches!(
            Channel::new("test", mem, ChannelRole::TuberProducer),
            Err(Error::CursorRecovery(_))
        ));
    }

    #[test]
    fn inconsistent_layout_is_rejected() {
        init();
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("bad");
        let mem = create(&path, 16, 8, 4);
        assert!(matches!(
            Channel::new("bad", mem, ChannelRole::Publisher),
            Err(Error::InvalidLayout(_))
        ));
    }
}
