/// Tests for candidate probing against file-backed device images

use nofs_core::layout::header;
use nofs_core::{DeviceOptions, NofsError, PermissionLevel, SECTOR_SIZE};
use nofs_platform::{available_devices, find_nofs_device, newly_available, FixedPaths};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_image(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, data).expect("Failed to write image");
    path
}

fn nofs_image() -> Vec<u8> {
    let mut image = header().to_vec();
    image.extend_from_slice(b"found\x03");
    image.resize(SECTOR_SIZE * 2, 0xFF);
    image
}

#[test]
fn test_find_skips_missing_and_unformatted_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("sda");
    let blank = write_image(&dir, "sdb", &vec![0u8; SECTOR_SIZE * 2]);
    let formatted = write_image(&dir, "sdc", &nofs_image());

    let enumerator = FixedPaths(vec![missing, blank, formatted.clone()]);
    let mut device = find_nofs_device(&enumerator, &DeviceOptions::default()).unwrap();
    assert_eq!(device.path(), Some(formatted.as_path()));
    assert_eq!(device.get_contents(), b"found");
}

#[test]
fn test_find_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let blank = write_image(&dir, "sda", &vec![0u8; SECTOR_SIZE]);

    let result = find_nofs_device(&FixedPaths(vec![blank]), &DeviceOptions::default());
    assert!(matches!(result, Err(NofsError::DeviceNotFound(_))));
}

#[test]
fn test_find_opens_with_requested_permissions() {
    let dir = tempfile::tempdir().unwrap();
    let formatted = write_image(&dir, "sda", &nofs_image());

    let options = DeviceOptions::new(PermissionLevel::FullAccess, false);
    let mut device = find_nofs_device(&FixedPaths(vec![formatted]), &options).unwrap();
    assert_eq!(device.permissions(), PermissionLevel::FullAccess);
    assert!(device.erase(false));
    assert_eq!(device.get_contents(), b"");
}

#[test]
fn test_newly_available_diffs_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let present = write_image(&dir, "sda", &[0u8; 16]);
    let inserted = dir.path().join("sdb");
    let enumerator = FixedPaths(vec![present.clone(), inserted.clone()]);

    let before = available_devices(&enumerator);
    assert_eq!(before, vec![present]);
    assert!(newly_available(&before, &enumerator).is_empty());

    std::fs::write(&inserted, [0u8; 16]).unwrap();
    assert_eq!(newly_available(&before, &enumerator), vec![inserted]);
}
