//! Sector-granular I/O against a raw device handle.
//!
//! Failures end the current run instead of propagating; callers compare the
//! returned count against what they asked for.

use crate::layout::{SectorPattern, SECTOR_SIZE};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use tracing::{debug, trace, warn};

/// Writes `pattern` into consecutive sectors starting at `start_sector`.
///
/// With `sector_count == None` the run continues until the first write
/// failure, which is taken as the physical end of the medium. A handle that
/// grows on write (a regular file) never fails, so unbounded runs are only
/// meaningful on fixed-size media.
///
/// Returns the number of sectors written.
pub fn write_fill<H: Write + Seek>(
    handle: &mut H,
    sector_count: Option<usize>,
    pattern: SectorPattern,
    start_sector: usize,
) -> usize {
    let offset = (start_sector * SECTOR_SIZE) as u64;
    if let Err(e) = handle.seek(SeekFrom::Start(offset)) {
        warn!("Cannot seek to sector {} (offset {:#x}): {}", start_sector, offset, e);
        return 0;
    }

    let sector = pattern.sector();
    let mut written = 0;
    while sector_count.map_or(true, |count| written < count) {
        if let Err(e) = handle.write_all(&sector) {
            debug!("Write stopped at sector {}: {}", start_sector + written, e);
            break;
        }
        written += 1;
    }

    if let Err(e) = handle.flush() {
        warn!("Flush after {} sectors failed: {}", written, e);
    }

    trace!(
        "Filled {} sectors from sector {} (requested {:?})",
        written, start_sector, sector_count
    );
    written
}

/// Reads up to one sector from the current position.
///
/// A result shorter than `SECTOR_SIZE` means the end of the medium was
/// reached, either physically or through a read error.
pub fn read_sector<H: Read>(handle: &mut H) -> Vec<u8> {
    let mut buffer = vec![0u8; SECTOR_SIZE];
    let mut filled = 0;

    while filled < SECTOR_SIZE {
        match handle.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Read failed after {} bytes, treating as end of medium: {}", filled, e);
                break;
            }
        }
    }

    buffer.truncate(filled);
    buffer
}

/// Writes one full sector at `offset`.
pub fn write_sector_at<H: Write + Seek>(
    handle: &mut H,
    offset: u64,
    sector: &[u8; SECTOR_SIZE],
) -> std::io::Result<()> {
    handle.seek(SeekFrom::Start(offset))?;
    handle.write_all(sector)?;
    handle.flush()
}

/// Number of sectors on the medium, rounding a trailing partial sector up.
///
/// Returns `None` if the handle cannot report its length. Raw disks on
/// Windows and macOS report 0 through `SeekFrom::End`, so a zero length is
/// unknown too. The position is left at offset 0 either way.
pub fn medium_sectors<H: Seek>(handle: &mut H) -> Option<usize> {
    match medium_len(handle) {
        Some(0) => {
            debug!("Medium reports a length of 0, size unknown");
            None
        }
        Some(len) => sectors_for_len(len),
        None => None,
    }
}

/// Length reported by `SeekFrom::End`, rewinding to offset 0 afterwards.
pub fn medium_len<H: Seek>(handle: &mut H) -> Option<u64> {
    let len = handle.seek(SeekFrom::End(0));
    if let Err(e) = handle.seek(SeekFrom::Start(0)) {
        warn!("Cannot rewind after sizing the medium: {}", e);
    }

    match len {
        Ok(len) => Some(len),
        Err(e) => {
            debug!("Medium size unknown: {}", e);
            None
        }
    }
}

/// Whole sectors needed to cover `len` bytes.
pub fn sectors_for_len(len: u64) -> Option<usize> {
    let sectors = len.div_ceil(SECTOR_SIZE as u64);
    match usize::try_from(sectors) {
        Ok(sectors) => Some(sectors),
        Err(_) => {
            warn!("Medium of {} bytes exceeds the addressable sector range", len);
            None
        }
    }
}
