//! On-disk layout of a NoFS device.
//!
//! A formatted device starts with one header sector:
//!
//! ```text
//! offset  0..7    signature "k621.de"
//! offset  7..11   reserved, zero
//! offset 11       terminal byte 0x03
//! offset 12..512  fill 0xFF
//! ```
//!
//! The payload follows at sector 1 and ends at the first terminal byte or at
//! the end of the medium.

/// Unit of all device I/O.
pub const SECTOR_SIZE: usize = 512;

/// Identifies a NoFS-formatted region at offset 0.
pub const SIGNATURE: &[u8; 7] = b"k621.de";

/// Reserved bytes between the signature and the header's terminal byte.
pub const RESERVED_LEN: usize = 4;

/// Marks the end of the payload and the start of every erased sector.
pub const TERMINAL: u8 = 0x03;

/// Padding used by the header and by erased sectors.
pub const FILL: u8 = 0xFF;

/// Fill byte written by early tool versions.
pub const LEGACY_FILL: u8 = 0x00;

/// Position of the terminal byte inside the header.
pub const HEADER_TERMINAL_OFFSET: usize = SIGNATURE.len() + RESERVED_LEN;

/// Length of the header, always one sector.
pub const HEADER_LEN: usize = SECTOR_SIZE;

/// Leading sectors overwritten by `initialize_nofs` before the header is written.
pub const INIT_SECTORS: usize = 2;

/// Builds the header sector.
pub fn header() -> [u8; HEADER_LEN] {
    let mut sector = [FILL; HEADER_LEN];
    sector[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
    sector[SIGNATURE.len()..HEADER_TERMINAL_OFFSET].fill(0);
    sector[HEADER_TERMINAL_OFFSET] = TERMINAL;
    sector
}

/// Contents written into every sector of a fill run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorPattern {
    /// Every byte of the sector is the given byte.
    Uniform(u8),
    /// A terminal byte followed by the given fill byte. A sector holding this
    /// pattern reads as an empty payload on its own.
    Terminated(u8),
}

impl SectorPattern {
    /// The pattern left behind by `erase` and `initialize_nofs`.
    pub const ERASED: SectorPattern = SectorPattern::Terminated(FILL);

    pub fn sector(&self) -> [u8; SECTOR_SIZE] {
        match *self {
            SectorPattern::Uniform(byte) => [byte; SECTOR_SIZE],
            SectorPattern::Terminated(fill) => {
                let mut sector = [fill; SECTOR_SIZE];
                sector[0] = TERMINAL;
                sector
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = header();
        assert_eq!(header.len(), SECTOR_SIZE);
        assert_eq!(&header[..7], b"k621.de");
        assert_eq!(&header[7..11], &[0, 0, 0, 0]);
        assert_eq!(header[11], TERMINAL);
        assert!(header[12..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_terminal_offset_follows_signature_and_reserved() {
        assert_eq!(HEADER_TERMINAL_OFFSET, 11);
    }

    #[test]
    fn test_erased_pattern() {
        let sector = SectorPattern::ERASED.sector();
        assert_eq!(sector[0], 0x03);
        assert!(sector[1..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_uniform_pattern_has_no_terminal() {
        let sector = SectorPattern::Uniform(LEGACY_FILL).sector();
        assert!(sector.iter().all(|&b| b == 0x00));
    }
}
