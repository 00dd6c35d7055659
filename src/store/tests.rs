use super::*;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tempfile::tempdir;

fn store_with_frames(path: &Path) -> StoreFile {
    let mut store = StoreFile::create(path, &StoreConfig::default(), false).unwrap();
    store.append(FrameKind::Declaration, "a", &[]).unwrap();
    store.append(FrameKind::Acquisition, "a", &[1; 40]).unwrap();
    store.append(FrameKind::Declaration, "b", &[]).unwrap();
    store.append(FrameKind::Acquisition, "a", &[2; 40]).unwrap();
    store.append(FrameKind::Document, "b", b"{}").unwrap();
    store
}

// ==================== Create / open ====================

#[test]
fn test_create_writes_preamble() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("new.mrd");

    let store = StoreFile::create(&path, &StoreConfig::default(), false).unwrap();
    assert_eq!(store.len(), PREAMBLE_SIZE as u64);
    drop(store);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), PREAMBLE_SIZE);
    assert_eq!(&bytes[..8], STORE_MAGIC);
}

#[test]
fn test_create_refuses_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exists.mrd");
    fs::write(&path, b"something").unwrap();

    let result = StoreFile::create(&path, &StoreConfig::default(), false);
    assert!(matches!(result, Err(StoreError::AlreadyExists(_))));

    // Explicit truncation replaces it
    StoreFile::create(&path, &StoreConfig::default(), true).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), PREAMBLE_SIZE as u64);
}

#[test]
fn test_create_parent_dirs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("store.mrd");

    let plain = StoreFile::create(&path, &StoreConfig::default(), false);
    assert!(matches!(plain, Err(StoreError::IoError(_))));

    let config = StoreConfig::default().with_parent_dirs(true);
    StoreFile::create(&path, &config, false).unwrap();
    assert!(path.exists());
}

#[test]
fn test_open_missing() {
    let dir = tempdir().unwrap();
    let result = StoreFile::open(&dir.path().join("nope.mrd"), &StoreConfig::default(), false);
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_open_rejects_foreign_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("foreign.mrd");
    fs::write(&path, b"PK\x03\x04 definitely not a store").unwrap();

    let result = StoreFile::open(&path, &StoreConfig::default(), false);
    assert!(matches!(result, Err(StoreError::Corrupt { offset: 0, .. })));

    fs::write(&path, b"MRD").unwrap();
    let result = StoreFile::open(&path, &StoreConfig::default(), false);
    assert!(matches!(result, Err(StoreError::Corrupt { .. })));
}

// ==================== Scanning ====================

#[test]
fn test_scan_finds_all_frames() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan.mrd");
    let written = store_with_frames(&path);
    let expected_len = written.len();
    drop(written);

    let (store, scan) = StoreFile::open(&path, &StoreConfig::default(), false).unwrap();
    assert_eq!(scan.frames.len(), 5);
    assert_eq!(scan.torn_bytes(), 0);
    assert_eq!(store.len(), expected_len);

    let a = LabelIndex::collect(&scan.frames, "a");
    assert!(a.declared);
    assert_eq!(a.acquisitions.len(), 2);
    assert!(a.document.is_none());
    assert_eq!(store.read_body(&a.acquisitions[1]).unwrap(), vec![2; 40]);

    let b = LabelIndex::collect(&scan.frames, "b");
    assert!(b.acquisitions.is_empty());
    assert_eq!(store.read_body(&b.document.unwrap()).unwrap(), b"{}".to_vec());

    assert!(!LabelIndex::collect(&scan.frames, "c").declared);
}

#[test]
fn test_partial_frame_is_torn_tail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("torn.mrd");
    let store = store_with_frames(&path);
    let clean_len = store.len();
    drop(store);

    // Half a frame: complete header, missing payload
    let partial = frame::encode_frame(FrameKind::Acquisition, "a", &[3; 100]);
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&partial[..60]).unwrap();
    drop(file);

    let (_, scan) = StoreFile::open(&path, &StoreConfig::default(), false).unwrap();
    assert_eq!(scan.frames.len(), 5);
    assert_eq!(scan.torn_bytes(), 60);
    // Read-only open leaves the file alone
    assert_eq!(fs::metadata(&path).unwrap().len(), clean_len + 60);

    let (store, _) = StoreFile::open(&path, &StoreConfig::default(), true).unwrap();
    assert_eq!(store.len(), clean_len);
    assert_eq!(fs::metadata(&path).unwrap().len(), clean_len);
}

#[test]
fn test_short_header_is_torn_tail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.mrd");
    drop(store_with_frames(&path));

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"MRDF\x02").unwrap();
    drop(file);

    let (_, scan) = StoreFile::open(&path, &StoreConfig::default(), false).unwrap();
    assert_eq!(scan.frames.len(), 5);
    assert_eq!(scan.torn_bytes(), 5);
}

#[test]
fn test_checksum_failure_on_last_frame_is_torn_tail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last.mrd");
    drop(store_with_frames(&path));

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let (_, scan) = StoreFile::open(&path, &StoreConfig::default(), false).unwrap();
    assert_eq!(scan.frames.len(), 4);
    assert!(scan.torn_bytes() > 0);
}

#[test]
fn test_checksum_failure_in_middle_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("middle.mrd");
    let mut store = StoreFile::create(&path, &StoreConfig::default(), false).unwrap();
    store.append(FrameKind::Declaration, "a", &[]).unwrap();
    let damaged = store.append(FrameKind::Acquisition, "a", &[7; 32]).unwrap();
    store.append(FrameKind::Acquisition, "a", &[8; 32]).unwrap();
    drop(store);

    let mut bytes = fs::read(&path).unwrap();
    let inside = (damaged.end() - 4) as usize;
    bytes[inside] ^= 0x01;
    fs::write(&path, &bytes).unwrap();

    let result = StoreFile::open(&path, &StoreConfig::default(), false);
    match result {
        Err(StoreError::Corrupt { offset, .. }) => assert_eq!(offset, damaged.offset),
        other => panic!("expected Corrupt, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_damaged_length_in_middle_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("length.mrd");
    let written = store_with_frames(&path);
    let clean_len = written.len();
    drop(written);

    // High byte of the second frame's body_len now points far past EOF
    let (_, scan) = StoreFile::open(&path, &StoreConfig::default(), false).unwrap();
    let second = scan.frames[1].frame;
    let mut bytes = fs::read(&path).unwrap();
    bytes[second.offset as usize + 12 + 7] = 0x7f;
    fs::write(&path, &bytes).unwrap();

    let result = StoreFile::open(&path, &StoreConfig::default(), true);
    match result {
        Err(StoreError::Corrupt { offset, .. }) => assert_eq!(offset, second.offset),
        other => panic!("expected Corrupt, got {:?}", other.map(|_| ())),
    }
    // Nothing was cut away
    assert_eq!(fs::metadata(&path).unwrap().len(), clean_len);
}

#[test]
fn test_damaged_header_of_last_frame_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last_header.mrd");
    let mut store = store_with_frames(&path);
    let last = store.append(FrameKind::Acquisition, "a", &[4; 40]).unwrap();
    drop(store);

    let mut bytes = fs::read(&path).unwrap();
    bytes[last.offset as usize + 9] ^= 0x01;
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        StoreFile::open(&path, &StoreConfig::default(), true),
        Err(StoreError::Corrupt { .. })
    ));
}

#[test]
fn test_bad_tag_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tag.mrd");
    drop(store_with_frames(&path));

    let mut bytes = fs::read(&path).unwrap();
    bytes[PREAMBLE_SIZE] = b'X';
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        StoreFile::open(&path, &StoreConfig::default(), false),
        Err(StoreError::Corrupt { .. })
    ));
}

#[test]
fn test_read_body_detects_damage_after_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("late.mrd");
    let mut store = StoreFile::create(&path, &StoreConfig::default(), false).unwrap();
    let frame = store.append(FrameKind::Acquisition, "a", &[5; 16]).unwrap();
    store.append(FrameKind::Acquisition, "a", &[6; 16]).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[(frame.end() - 1) as usize] ^= 0x10;
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        store.read_body(&frame),
        Err(StoreError::Corrupt { .. })
    ));
}

#[test]
fn test_scan_from_picks_up_new_frames() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("incremental.mrd");
    let mut writer = store_with_frames(&path);

    let (mut reader, _) = StoreFile::open(&path, &StoreConfig::default(), false).unwrap();
    writer.append(FrameKind::Acquisition, "a", &[9; 8]).unwrap();

    let scan = reader.scan_from(reader.len()).unwrap();
    assert_eq!(scan.frames.len(), 1);
    assert_eq!(scan.frames[0].label, "a");
    reader.set_scanned_end(scan.end);
    assert_eq!(reader.len(), writer.len());
}

// ==================== Listing ====================

#[test]
fn test_list_datasets() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("list.mrd");
    drop(store_with_frames(&path));

    let datasets = list_datasets(&path).unwrap();
    assert_eq!(
        datasets,
        vec![
            DatasetSummary {
                name: "a".to_string(),
                acquisition_count: 2,
                has_header_document: false,
            },
            DatasetSummary {
                name: "b".to_string(),
                acquisition_count: 0,
                has_header_document: true,
            },
        ]
    );

    let info = inspect(&path).unwrap();
    assert_eq!(info.frame_count, 5);
    assert_eq!(info.torn_bytes, 0);
    assert_eq!(info.file_size, fs::metadata(&path).unwrap().len());
}

#[test]
fn test_store_config_toml() {
    let config: StoreConfig = toml::from_str("sync = \"every_record\"").unwrap();
    assert_eq!(config, StoreConfig::durable());

    let config: StoreConfig = toml::from_str("").unwrap();
    assert_eq!(config, StoreConfig::default());
    assert_eq!(config.sync, SyncPolicy::OnClose);
}
