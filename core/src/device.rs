use crate::layout::{
    header, SectorPattern, HEADER_LEN, INIT_SECTORS, SECTOR_SIZE, SIGNATURE, TERMINAL,
};
use crate::options::{DeviceOptions, DeviceReport, PermissionLevel};
use crate::sector::{
    medium_len, medium_sectors, read_sector, sectors_for_len, write_fill, write_sector_at,
};
use crate::NofsError;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One open device bound to the format state observed when it was opened.
///
/// `valid_format` is decided by a single signature probe at construction and
/// only changes when `initialize_nofs` succeeds. Destructive operations never
/// return errors; they return `false` when refused or cut short.
#[derive(Debug)]
pub struct NofsDevice<H = File> {
    handle: H,
    path: Option<PathBuf>,
    options: DeviceOptions,
    valid_format: bool,
    sectors_read: Option<usize>,
    payload_len: Option<u64>,
    /// Regular files report their true length, zero included.
    regular_file: bool,
}

impl NofsDevice<File> {
    pub fn open(
        path: impl AsRef<Path>,
        permissions: PermissionLevel,
        force: bool,
    ) -> Result<Self, NofsError> {
        Self::open_with(path, &DeviceOptions::new(permissions, force))
    }

    pub fn open_with(path: impl AsRef<Path>, options: &DeviceOptions) -> Result<Self, NofsError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(options.permissions.allows_writes())
            .open(path)
            .map_err(|e| NofsError::unavailable(path, e))?;

        let mut device = Self::from_handle(file, options).map_err(|e| match e {
            NofsError::IoError(source) => NofsError::unavailable(path, source),
            other => other,
        })?;
        device.path = Some(path.to_path_buf());
        device.regular_file = device
            .handle
            .metadata()
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);

        debug!(
            "Opened {} ({:?}, force: {}, valid NoFS: {})",
            path.display(),
            options.permissions,
            options.force,
            device.valid_format
        );
        Ok(device)
    }
}

impl<H: Read + Write + Seek> NofsDevice<H> {
    /// Wraps an already open handle and probes it for the signature.
    pub fn from_handle(mut handle: H, options: &DeviceOptions) -> Result<Self, NofsError> {
        let valid_format = probe_signature(&mut handle)?;
        Ok(Self {
            handle,
            path: None,
            options: options.clone(),
            valid_format,
            sectors_read: None,
            payload_len: None,
            regular_file: false,
        })
    }

    pub fn valid_format(&self) -> bool {
        self.valid_format
    }

    pub fn force(&self) -> bool {
        self.options.force
    }

    pub fn permissions(&self) -> PermissionLevel {
        self.options.permissions
    }

    /// Sectors consumed by the last content scan, header excluded.
    pub fn sectors_read(&self) -> Option<usize> {
        self.sectors_read
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn report(&self) -> DeviceReport {
        DeviceReport {
            path: self.path.clone(),
            valid_format: self.valid_format,
            force: self.options.force,
            sectors_read: self.sectors_read,
            payload_len: self.payload_len,
        }
    }

    pub fn into_inner(self) -> H {
        self.handle
    }

    /// Returns the payload, see [`NofsDevice::write_contents`].
    pub fn get_contents(&mut self) -> Vec<u8> {
        let mut contents = Vec::new();
        if let Err(e) = self.write_contents(&mut contents) {
            warn!("Collecting contents failed: {}", e);
        }
        contents
    }

    /// Streams the payload into `out` and records how many sectors it spans.
    ///
    /// On a formatted device the header sector is skipped and the payload
    /// ends before the first terminal byte. Without a signature the scan starts
    /// at offset 0 and ends before the first fill byte of the configured
    /// convention. A short sector ends the scan either way, and the sector
    /// holding the end marker is counted.
    ///
    /// Only failures of `out` are returned; device read failures end the
    /// payload early. On error `sectors_read` keeps its previous value.
    pub fn write_contents<W: Write>(&mut self, out: &mut W) -> io::Result<u64> {
        if let Err(e) = self.handle.seek(SeekFrom::Start(0)) {
            warn!("Cannot rewind device before reading: {}", e);
            self.record_scan(0, 0);
            return Ok(0);
        }

        if self.valid_format && read_sector(&mut self.handle).len() < HEADER_LEN {
            debug!("Device ends inside the header");
            self.record_scan(0, 0);
            return Ok(0);
        }

        let marker = if self.valid_format {
            TERMINAL
        } else {
            self.options.fill.byte()
        };

        let mut sectors = 0;
        let mut total = 0u64;
        loop {
            let sector = read_sector(&mut self.handle);
            if sector.is_empty() {
                break;
            }
            sectors += 1;

            if let Some(end) = sector.iter().position(|&b| b == marker) {
                out.write_all(&sector[..end])?;
                total += end as u64;
                break;
            }

            out.write_all(&sector)?;
            total += sector.len() as u64;
            if sector.len() < SECTOR_SIZE {
                break;
            }
        }

        debug!("Read {} payload bytes from {} sectors", total, sectors);
        self.record_scan(sectors, total);
        Ok(total)
    }

    /// Overwrites the payload with the erased pattern.
    ///
    /// `complete` covers the whole medium from offset 0; otherwise only the
    /// sectors counted by the last content scan are overwritten, running a scan
    /// first if none happened yet. A formatted device gets its header back
    /// afterwards. Returns `false` without touching the device unless it is
    /// formatted or forced, and `false` if the run stopped early, in which case
    /// the device is left partially erased.
    pub fn erase(&mut self, complete: bool) -> bool {
        if !self.valid_format && !self.options.force {
            warn!("Refusing to erase a device without NoFS signature (force not set)");
            return false;
        }
        if !self.writable("erase") {
            return false;
        }

        let (requested, written) = if complete {
            let requested = if self.regular_file {
                match medium_len(&mut self.handle).and_then(sectors_for_len) {
                    Some(sectors) => Some(sectors),
                    None => {
                        warn!("Cannot size the image file, not erasing");
                        return false;
                    }
                }
            } else {
                medium_sectors(&mut self.handle)
            };
            let written = write_fill(&mut self.handle, requested, SectorPattern::ERASED, 0);
            (requested, written)
        } else {
            let count = match self.sectors_read {
                Some(count) => count,
                None => {
                    self.get_contents();
                    self.sectors_read.unwrap_or(0)
                }
            };
            let start = self.payload_start_sector();
            let written = write_fill(&mut self.handle, Some(count), SectorPattern::ERASED, start);
            (Some(count), written)
        };

        let finished = match requested {
            Some(count) => written == count,
            None => written > 0,
        };
        if !finished {
            warn!(
                "Erase stopped after {} of {:?} sectors, device is partially erased",
                written, requested
            );
            return false;
        }

        if self.valid_format && !self.write_header() {
            return false;
        }

        info!("Erased {} sectors (complete: {})", written, complete);
        true
    }

    /// Writes a fresh NoFS onto a forced, unformatted device.
    pub fn initialize_nofs(&mut self) -> bool {
        if self.valid_format {
            warn!("Device already carries a NoFS signature, not reformatting");
            return false;
        }
        if !self.options.force {
            warn!("Refusing to initialize a device without force");
            return false;
        }
        if !self.writable("initialize") {
            return false;
        }

        let written = write_fill(&mut self.handle, Some(INIT_SECTORS), SectorPattern::ERASED, 0);
        if written < INIT_SECTORS {
            warn!("Medium too small: wrote {} of {} leading sectors", written, INIT_SECTORS);
            return false;
        }
        if !self.write_header() {
            return false;
        }

        self.valid_format = true;
        self.sectors_read = None;
        self.payload_len = None;
        info!("Initialized NoFS");
        true
    }

    fn writable(&self, operation: &str) -> bool {
        if self.options.permissions.allows_writes() {
            return true;
        }
        warn!("Refusing to {} a device opened read-only", operation);
        false
    }

    fn payload_start_sector(&self) -> usize {
        if self.valid_format {
            HEADER_LEN / SECTOR_SIZE
        } else {
            0
        }
    }

    fn write_header(&mut self) -> bool {
        match write_sector_at(&mut self.handle, 0, &header()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Writing NoFS header failed: {}", e);
                false
            }
        }
    }

    fn record_scan(&mut self, sectors: usize, payload_len: u64) {
        self.sectors_read = Some(sectors);
        self.payload_len = Some(payload_len);
    }
}

/// Reads the signature at offset 0 and rewinds.
fn probe_signature<H: Read + Seek>(handle: &mut H) -> Result<bool, NofsError> {
    handle.seek(SeekFrom::Start(0))?;
    let mut probe = [0u8; SIGNATURE.len()];
    let valid = match handle.read_exact(&mut probe) {
        Ok(()) => &probe == SIGNATURE,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e.into()),
    };
    handle.seek(SeekFrom::Start(0))?;
    Ok(valid)
}
