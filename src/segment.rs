/*
 * Named segments shared between processes. A segment is a file that every
 * process maps MAP_SHARED. The first process to create it writes the header
 * once; everyone after that links to the existing bytes and validates the
 * header against what they expect.
 */
use crate::constants::{
    ATTACH_RETRIES, ATTACH_RETRY_INTERVAL, DATA_START, HDR_POS_CRC, HDR_POS_CREATION_TIME,
    HDR_POS_CREATOR_PID, HDR_POS_MAGIC, HDR_POS_SESSION_ID, HDR_POS_TOTAL_SIZE,
    SEGMENT_HEADER_SIZE,
};
use crate::error::Error;
use crate::mem_map::MemMap;
use crate::utils::{compute_crc32, format_nanos, now_nanos};
use log::{info, warn};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::atomic::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    pub magic: u32,
    pub session_id: i32,
    pub creator_pid: i32,
    pub header_crc: u32,
    pub total_size: u64,
    pub creation_time_nanos: i64,
}

impl SegmentHeader {
    fn new(magic: u32, session_id: i32, total_size: u64) -> SegmentHeader {
        let mut header = SegmentHeader {
            magic: magic,
            session_id: session_id,
            creator_pid: std::process::id() as i32,
            header_crc: 0,
            total_size: total_size,
            creation_time_nanos: now_nanos(),
        };
        header.header_crc = header.compute_crc();
        return header;
    }

    pub fn read(map: &MemMap) -> SegmentHeader {
        return SegmentHeader {
            magic: map.atomic_u32_at(HDR_POS_MAGIC).load(Ordering::Acquire),
            session_id: map.read_i32_at(HDR_POS_SESSION_ID),
            creator_pid: map.read_i32_at(HDR_POS_CREATOR_PID),
            header_crc: map.read_u32_at(HDR_POS_CRC),
            total_size: map.read_u64_at(HDR_POS_TOTAL_SIZE),
            creation_time_nanos: map.read_i64_at(HDR_POS_CREATION_TIME),
        };
    }

    pub fn compute_crc(&self) -> u32 {
        return compute_crc32(&[
            &self.session_id.to_ne_bytes(),
            &self.creator_pid.to_ne_bytes(),
            &self.total_size.to_ne_bytes(),
            &self.creation_time_nanos.to_ne_bytes(),
        ]);
    }

    pub fn is_intact(&self) -> bool {
        return self.header_crc == self.compute_crc();
    }

    // magic goes last, it is what tells attaching processes we're done
    fn write(&self, map: &mut MemMap) {
        map.write_i32_at(HDR_POS_SESSION_ID, self.session_id);
        map.write_i32_at(HDR_POS_CREATOR_PID, self.creator_pid);
        map.write_u32_at(HDR_POS_CRC, self.header_crc);
        map.write_u64_at(HDR_POS_TOTAL_SIZE, self.total_size);
        map.write_i64_at(HDR_POS_CREATION_TIME, self.creation_time_nanos);
        map.atomic_u32_at(HDR_POS_MAGIC)
            .store(self.magic, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SegmentOptions {
    /// mlock the mapping after creating it
    pub lock: bool,
    /// Write zeros over the whole segment when we are the creator. A freshly
    /// sized file already reads as zeros, so this doesn't change the content;
    /// it touches every page up front so the first publishes don't fault.
    /// Linking never zeroes.
    pub reset: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        return SegmentOptions {
            lock: false,
            reset: true,
        };
    }
}

/// Create the segment at `path`, or link to it if some process already did.
/// A linked segment must carry the same magic and total size.
pub fn acquire(
    path: &Path,
    total_size: u64,
    magic: u32,
    session_id: i32,
    options: SegmentOptions,
) -> Result<MemMap, Error> {
    return acquire_with(path, total_size, magic, session_id, options, |_| {});
}

/// Same as `acquire`, but when this call creates the segment `init` runs on
/// the fresh mapping before the magic is published, so no other process can
/// link to a half initialized segment.
pub fn acquire_with<F>(
    path: &Path,
    total_size: u64,
    magic: u32,
    session_id: i32,
    options: SegmentOptions,
    init: F,
) -> Result<MemMap, Error>
where
    F: FnOnce(&mut MemMap),
{
    if total_size < DATA_START as u64 {
        return Err(Error::SegmentTooSmall { size: total_size });
    }

    let file = match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            info!("Segment {} already created, linking", path.display());
            let map = attach(path, magic)?;
            let header = SegmentHeader::read(&map);
            if header.total_size != total_size {
                return Err(Error::SizeMismatch {
                    expected: total_size,
                    found: header.total_size,
                });
            }
            return Ok(map);
        }
        Err(err) => return Err(Error::Io(err)),
    };

    // unrelated users of the same session need to be able to link
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666))?;
    file.set_len(total_size)?;

    let mut map = MemMap::map(&file, total_size as usize)?;
    if options.reset {
        map.zero(0, map.len());
    }
    if options.lock {
        if let Err(err) = map.lock() {
            warn!("Failed to lock segment {} in memory: {}", path.display(), err);
        }
    }

    init(&mut map);
    let header = SegmentHeader::new(magic, session_id, total_size);
    header.write(&mut map);
    info!(
        "Segment {} created session={}, size={}, creation_time={}",
        path.display(),
        session_id,
        total_size,
        format_nanos(header.creation_time_nanos)
    );
    return Ok(map);
}

/// Link to an existing segment. Never writes to it.
pub fn attach(path: &Path, magic: u32) -> Result<MemMap, Error> {
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(Error::SegmentNotFound(path.to_path_buf()));
        }
        Err(err) => return Err(Error::Io(err)),
    };

    // the creator may still be between create and writing the magic
    for _ in 0..ATTACH_RETRIES {
        if let Some(header) = probe_header(&file)? {
            return map_validated(&file, path, magic, header);
        }
        std::thread::sleep(ATTACH_RETRY_INTERVAL);
    }
    return Err(Error::SegmentNotReady(path.to_path_buf()));
}

/// Unmap a segment. The backing file stays in place for other processes.
pub fn release(map: MemMap) {
    drop(map);
}

pub fn read_header(map: &MemMap) -> SegmentHeader {
    return SegmentHeader::read(map);
}

fn probe_header(file: &File) -> Result<Option<SegmentHeader>, Error> {
    if file.metadata()?.len() < SEGMENT_HEADER_SIZE as u64 {
        return Ok(None);
    }
    let probe = MemMap::map(file, SEGMENT_HEADER_SIZE)?;
    let header = SegmentHeader::read(&probe);
    if header.magic == 0 {
        return Ok(None);
    }
    return Ok(Some(header));
}

fn map_validated(
    file: &File,
    path: &Path,
    magic: u32,
    header: SegmentHeader,
) -> Result<MemMap, Error> {
    if header.magic != magic {
        return Err(Error::MagicMismatch {
            expected: magic,
            found: header.magic,
        });
    }
    if !header.is_intact() {
        return Err(Error::HeaderCorrupt(path.to_path_buf()));
    }
    if header.total_size < DATA_START as u64 {
        return Err(Error::SegmentTooSmall {
            size: header.total_size,
        });
    }
    let file_len = file.metadata()?.len();
    if file_len < header.total_size {
        return Err(Error::SizeMismatch {
            expected: header.total_size,
            found: file_len,
        });
    }

    let map = MemMap::map(file, header.total_size as usize)?;
    info!(
        "Linked to segment {} session={}, size={}, pid={}, creation_time={}",
        path.display(),
        header.session_id,
        header.total_size,
        header.creator_pid,
        format_nanos(header.creation_time_nanos)
    );
    return Ok(map);
}
