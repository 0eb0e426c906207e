//! In-memory medium for tests - NEVER touches real hardware

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MediumState {
    data: Vec<u8>,
    position: u64,
    write_calls: usize,
    seek_calls: usize,
}

/// Fixed-capacity handle that rejects writes past its end, the way a full
/// removable medium does.
///
/// Clones share state, so a test can keep one clone while another is moved
/// into a device and still inspect what happened to the medium.
#[derive(Debug, Clone)]
pub struct MockMedium {
    state: Arc<Mutex<MediumState>>,
    length: LengthReport,
    failing_reads: bool,
}

/// What `SeekFrom::End` sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthReport {
    Actual,
    Unsupported,
    /// Raw disks on Windows and macOS put the end at offset 0.
    Zero,
}

impl MockMedium {
    /// A zero-filled medium of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::from_bytes(vec![0u8; capacity])
    }

    /// A medium holding exactly `data`; its capacity is `data.len()`.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MediumState {
                data,
                ..Default::default()
            })),
            length: LengthReport::Actual,
            failing_reads: false,
        }
    }

    /// Makes `SeekFrom::End` fail, like media that cannot report a length.
    pub fn without_size(mut self) -> Self {
        self.length = LengthReport::Unsupported;
        self
    }

    /// Makes `SeekFrom::End` land on offset 0, the way raw disks report
    /// their length on some platforms.
    pub fn reporting_zero_length(mut self) -> Self {
        self.length = LengthReport::Zero;
        self
    }

    /// Makes every read fail.
    pub fn with_failing_reads(mut self) -> Self {
        self.failing_reads = true;
        self
    }

    pub fn contents(&self) -> Vec<u8> {
        self.lock().data.clone()
    }

    pub fn sector(&self, index: usize) -> Vec<u8> {
        let state = self.lock();
        let start = (index * crate::SECTOR_SIZE).min(state.data.len());
        let end = (start + crate::SECTOR_SIZE).min(state.data.len());
        state.data[start..end].to_vec()
    }

    /// Number of `write` calls made, including rejected ones.
    pub fn write_calls(&self) -> usize {
        self.lock().write_calls
    }

    pub fn seek_calls(&self) -> usize {
        self.lock().seek_calls
    }

    fn lock(&self) -> MutexGuard<'_, MediumState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Read for MockMedium {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.failing_reads {
            return Err(io::Error::new(ErrorKind::Other, "medium read error"));
        }
        let mut state = self.lock();
        let start = (state.position as usize).min(state.data.len());
        let n = buf.len().min(state.data.len() - start);
        buf[..n].copy_from_slice(&state.data[start..start + n]);
        state.position += n as u64;
        Ok(n)
    }
}

impl Write for MockMedium {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        state.write_calls += 1;
        let start = state.position as usize;
        if start >= state.data.len() {
            return Err(io::Error::new(ErrorKind::Other, "no space left on medium"));
        }
        let n = buf.len().min(state.data.len() - start);
        state.data[start..start + n].copy_from_slice(&buf[..n]);
        state.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MockMedium {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let length = self.length;
        let mut state = self.lock();
        state.seek_calls += 1;
        let target = match (pos, length) {
            (SeekFrom::Start(offset), _) => offset as i64,
            (SeekFrom::Current(delta), _) => state.position as i64 + delta,
            (SeekFrom::End(delta), LengthReport::Actual) => state.data.len() as i64 + delta,
            (SeekFrom::End(delta), LengthReport::Zero) => delta,
            (SeekFrom::End(_), LengthReport::Unsupported) => {
                return Err(io::Error::new(
                    ErrorKind::Unsupported,
                    "medium cannot report its length",
                ))
            }
        };
        if target < 0 {
            return Err(io::Error::new(ErrorKind::InvalidInput, "seek before start"));
        }
        state.position = target as u64;
        Ok(state.position)
    }
}
