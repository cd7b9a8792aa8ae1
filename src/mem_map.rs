use crate::error::Error;
use std::fs::File;
use std::os::fd::AsRawFd;
use std::sync::atomic::{AtomicI64, AtomicU32};

/// A shared mapping of one segment file. All offset arithmetic over the
/// segment goes through here so that bounds are checked in one place.
pub struct MemMap {
    addr: *mut u8,
    n_bytes: usize,
}

// The mapping is plain shared memory; synchronization between processes is
// done through the atomics in the control block.
unsafe impl Send for MemMap {}

impl MemMap {
    pub fn map(file: &File, n_bytes: usize) -> Result<MemMap, Error> {
        assert!(n_bytes > 0);
        unsafe {
            let hint: *mut libc::c_void = std::ptr::null_mut();
            let addr = libc::mmap(
                hint,
                n_bytes,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED, // other processes must see our writes
                file.as_raw_fd(),
                0,
            );

            if addr == libc::MAP_FAILED {
                return Err(Error::Io(std::io::Error::last_os_error()));
            }

            return Ok(MemMap {
                addr: addr as *mut u8,
                n_bytes: n_bytes,
            });
        }
    }

    /// Pin the mapping in physical memory.
    pub fn lock(&self) -> Result<(), Error> {
        let ret = unsafe { libc::mlock(self.addr as *const libc::c_void, self.n_bytes) };
        if ret != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        return Ok(());
    }

    pub fn len(&self) -> usize {
        return self.n_bytes;
    }

    fn check(&self, start: usize, len: usize) {
        assert!(
            start <= self.n_bytes && len <= self.n_bytes - start,
            "Access of {} bytes at {} is outside of a {} byte segment",
            len,
            start,
            self.n_bytes
        );
    }

    fn read_array<const N: usize>(&self, start: usize) -> [u8; N] {
        self.check(start, N);
        let mut data = [0u8; N];
        unsafe {
            std::ptr::copy_nonoverlapping(self.addr.add(start), data.as_mut_ptr(), N);
        }
        return data;
    }

    fn write_array<const N: usize>(&mut self, start: usize, data: [u8; N]) {
        self.check(start, N);
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.addr.add(start), N);
        }
    }

    pub fn read_u16_at(&self, start: usize) -> u16 {
        return u16::from_ne_bytes(self.read_array(start));
    }

    pub fn read_u32_at(&self, start: usize) -> u32 {
        return u32::from_ne_bytes(self.read_array(start));
    }

    pub fn read_i32_at(&self, start: usize) -> i32 {
        return i32::from_ne_bytes(self.read_array(start));
    }

    pub fn read_u64_at(&self, start: usize) -> u64 {
        return u64::from_ne_bytes(self.read_array(start));
    }

    pub fn read_i64_at(&self, start: usize) -> i64 {
        return i64::from_ne_bytes(self.read_array(start));
    }

    pub fn write_u16_at(&mut self, start: usize, value: u16) {
        self.write_array(start, value.to_ne_bytes());
    }

    pub fn write_u32_at(&mut self, start: usize, value: u32) {
        self.write_array(start, value.to_ne_bytes());
    }

    pub fn write_i32_at(&mut self, start: usize, value: i32) {
        self.write_array(start, value.to_ne_bytes());
    }

    pub fn write_u64_at(&mut self, start: usize, value: u64) {
        self.write_array(start, value.to_ne_bytes());
    }

    pub fn write_i64_at(&mut self, start: usize, value: i64) {
        self.write_array(start, value.to_ne_bytes());
    }

    /// Raw bytes of `[start, start + len)`, copied out.
    pub fn read_bytes(&self, start: usize, out: &mut [u8]) {
        self.check(start, out.len());
        unsafe {
            std::ptr::copy_nonoverlapping(self.addr.add(start), out.as_mut_ptr(), out.len());
        }
    }

    pub fn write_bytes(&mut self, start: usize, data: &[u8]) {
        self.check(start, data.len());
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.addr.add(start), data.len());
        }
    }

    pub fn zero(&mut self, start: usize, len: usize) {
        self.check(start, len);
        unsafe {
            std::ptr::write_bytes(self.addr.add(start), 0, len);
        }
    }

    pub fn atomic_u32_at(&self, start: usize) -> &AtomicU32 {
        self.check(start, 4);
        assert!(start % std::mem::align_of::<AtomicU32>() == 0);
        unsafe {
            return &*(self.addr.add(start) as *const AtomicU32);
        }
    }

    pub fn atomic_i64_at(&self, start: usize) -> &AtomicI64 {
        self.check(start, 8);
        assert!(start % std::mem::align_of::<AtomicI64>() == 0);
        unsafe {
            return &*(self.addr.add(start) as *const AtomicI64);
        }
    }
}

impl Drop for MemMap {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.addr as *mut libc::c_void, self.n_bytes);
        }
    }
}
