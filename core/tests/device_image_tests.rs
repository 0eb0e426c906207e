//! Integration tests against file-backed device images

use nofs_core::layout::{header, FILL};
use nofs_core::{NofsDevice, NofsError, PermissionLevel, SectorPattern, SECTOR_SIZE, TERMINAL};
use std::io::Write;
use tempfile::NamedTempFile;

fn create_image(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(data).expect("Failed to write image");
    file.flush().expect("Failed to flush image");
    file
}

fn formatted_image(payload: &[u8], sectors: usize) -> Vec<u8> {
    let mut image = header().to_vec();
    image.extend_from_slice(payload);
    image.push(TERMINAL);
    image.resize(SECTOR_SIZE * sectors, FILL);
    image
}

#[test]
fn test_missing_path_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let result = NofsDevice::open(dir.path().join("no-such-device"), PermissionLevel::ReadOnly, false);
    assert!(matches!(result, Err(NofsError::DeviceUnavailable { .. })));
}

#[test]
fn test_full_access_on_read_only_image_is_unavailable() {
    let image = create_image(&formatted_image(b"locked", 2));
    let mut permissions = std::fs::metadata(image.path()).unwrap().permissions();
    permissions.set_readonly(true);
    std::fs::set_permissions(image.path(), permissions).unwrap();

    // Privileged users can write read-only files anyway.
    if std::fs::OpenOptions::new().write(true).open(image.path()).is_ok() {
        return;
    }

    let result = NofsDevice::open(image.path(), PermissionLevel::FullAccess, false);
    assert!(matches!(result, Err(NofsError::DeviceUnavailable { .. })));
    assert!(NofsDevice::open(image.path(), PermissionLevel::ReadOnly, false).is_ok());
}

#[test]
fn test_read_hello_from_image() {
    let image = create_image(&formatted_image(b"hello", 2));
    let mut device = NofsDevice::open(image.path(), PermissionLevel::ReadOnly, false).unwrap();
    assert!(device.valid_format());
    assert_eq!(device.path(), Some(image.path()));
    assert_eq!(device.get_contents(), b"hello");
    assert_eq!(device.sectors_read(), Some(1));
}

#[test]
fn test_write_contents_streams_payload() {
    let payload: Vec<u8> = (0..3000u32).map(|i| b'a' + (i % 26) as u8).collect();
    let image = create_image(&formatted_image(&payload, 8));
    let mut device = NofsDevice::open(image.path(), PermissionLevel::ReadOnly, false).unwrap();

    let mut out = Vec::new();
    let written = device.write_contents(&mut out).unwrap();
    assert_eq!(written, payload.len() as u64);
    assert_eq!(out, payload);
    assert_eq!(device.sectors_read(), Some(6));
}

#[test]
fn test_format_round_trip() {
    let image = create_image(&vec![0x5Au8; SECTOR_SIZE * 8]);
    {
        let mut device = NofsDevice::open(image.path(), PermissionLevel::FullAccess, true).unwrap();
        assert!(!device.valid_format());
        assert!(device.initialize_nofs());
    }

    let mut device = NofsDevice::open(image.path(), PermissionLevel::ReadOnly, false).unwrap();
    assert!(device.valid_format());
    assert_eq!(device.get_contents(), b"");
}

#[test]
fn test_reformat_refusal_keeps_header() {
    let original = formatted_image(b"keep me", 4);
    let image = create_image(&original);
    let mut device = NofsDevice::open(image.path(), PermissionLevel::FullAccess, true).unwrap();
    assert!(!device.initialize_nofs());
    drop(device);

    let on_disk = std::fs::read(image.path()).unwrap();
    assert_eq!(on_disk, original);
}

#[test]
fn test_full_erase_of_image_keeps_its_length() {
    let image = create_image(&formatted_image(b"private", 6));
    let mut device = NofsDevice::open(image.path(), PermissionLevel::FullAccess, false).unwrap();
    assert!(device.erase(true));
    drop(device);

    let on_disk = std::fs::read(image.path()).unwrap();
    assert_eq!(on_disk.len(), SECTOR_SIZE * 6);
    assert_eq!(&on_disk[..SECTOR_SIZE], &header()[..]);
    for sector in on_disk[SECTOR_SIZE..].chunks(SECTOR_SIZE) {
        assert_eq!(sector, &SectorPattern::ERASED.sector()[..]);
    }
}

#[test]
fn test_full_erase_of_empty_image_finishes() {
    let image = create_image(&[]);
    let mut device = NofsDevice::open(image.path(), PermissionLevel::FullAccess, true).unwrap();
    assert!(device.erase(true));
    drop(device);
    assert!(std::fs::read(image.path()).unwrap().is_empty());
}

#[test]
fn test_full_erase_after_initializing_empty_image() {
    let image = create_image(&[]);
    let mut device = NofsDevice::open(image.path(), PermissionLevel::FullAccess, true).unwrap();
    assert!(device.initialize_nofs());
    assert!(device.erase(true));
    drop(device);

    let on_disk = std::fs::read(image.path()).unwrap();
    assert_eq!(on_disk.len(), SECTOR_SIZE * 2);
    assert_eq!(&on_disk[..SECTOR_SIZE], &header()[..]);
    assert_eq!(&on_disk[SECTOR_SIZE..], &SectorPattern::ERASED.sector()[..]);
}

#[test]
fn test_read_only_open_cannot_erase() {
    let original = formatted_image(b"untouched", 2);
    let image = create_image(&original);
    let mut device = NofsDevice::open(image.path(), PermissionLevel::ReadOnly, true).unwrap();
    assert!(!device.erase(false));
    drop(device);
    assert_eq!(std::fs::read(image.path()).unwrap(), original);
}
