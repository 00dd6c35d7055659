use super::*;
use crate::counters::EncodingDimension;
use crate::flags::AcquisitionFlag;

fn populated_header() -> AcquisitionHeader {
    let mut idx = EncodingCounters::new();
    idx.kspace_encode_step_1 = 127;
    idx.slice = 3;
    idx.repetition = 4;
    idx.set(EncodingDimension::User(7), 99);

    let mut mask = [0u64; CHANNEL_MASKS];
    mask[0] = 0b1111;
    mask[15] = u64::MAX;

    AcquisitionHeader::builder(256, 4)
        .flags(AcquisitionFlag::LastInSlice | AcquisitionFlag::LastInRepetition)
        .counters(idx)
        .measurement_uid(0xDEAD_BEEF)
        .scan_counter(1279)
        .time_stamps(42, [1, 2, 3])
        .available_channels(32)
        .channel_mask(mask)
        .discard(4, 8)
        .center_sample(128)
        .encoding_space_ref(1)
        .sample_time_us(2.5)
        .position([1.5, -2.25, 30.0], [0.0, 0.0, -1200.0])
        .directions([0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0])
        .user_int([1, -2, 3, -4, 5, -6, 7, i32::MIN])
        .user_float([0.5, f32::NAN, -0.0, 1e-40, 4.0, 5.0, 6.0, f32::INFINITY])
        .build()
}

// ==================== Builder ====================

#[test]
fn test_builder_defaults() {
    let header = AcquisitionHeader::builder(128, 8).build();

    assert_eq!(header.version, ACQUISITION_HEADER_VERSION);
    assert_eq!(header.number_of_samples, 128);
    assert_eq!(header.active_channels, 8);
    assert_eq!(header.available_channels, 8);
    assert!(header.flags.is_empty());
    assert_eq!(header.idx, EncodingCounters::new());
    assert_eq!(header.read_dir, [1.0, 0.0, 0.0]);
    assert_eq!(header.phase_dir, [0.0, 1.0, 0.0]);
    assert_eq!(header.slice_dir, [0.0, 0.0, 1.0]);
    assert_eq!(header.sample_count(), 1024);
    assert_eq!(header.trajectory_len(), 0);
}

#[test]
fn test_builder_flags_are_set_once() {
    let header = AcquisitionHeader::builder(4, 1)
        .flags(AcquisitionFlag::FirstInSlice | AcquisitionFlag::FirstInRepetition)
        .build();

    assert!(header.flags.test(AcquisitionFlag::FirstInSlice));
    assert!(header.flags.test(AcquisitionFlag::FirstInRepetition));
    assert!(!header.flags.test(AcquisitionFlag::LastInSlice));
}

// ==================== Validation ====================

#[test]
fn test_validate_accepts_populated_header() {
    assert!(populated_header().validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_counts() {
    let no_samples = AcquisitionHeader::builder(0, 4).build();
    assert!(matches!(
        no_samples.validate(),
        Err(AcquisitionError::MalformedHeader(_))
    ));

    let no_channels = AcquisitionHeader::builder(16, 0).build();
    assert!(matches!(
        no_channels.validate(),
        Err(AcquisitionError::MalformedHeader(_))
    ));
}

#[test]
fn test_validate_center_sample_bounds() {
    let at_end = AcquisitionHeader::builder(16, 1).center_sample(16).build();
    assert!(at_end.validate().is_ok());

    let beyond = AcquisitionHeader::builder(16, 1).center_sample(17).build();
    assert!(matches!(
        beyond.validate(),
        Err(AcquisitionError::MalformedHeader(_))
    ));
}

#[test]
fn test_validate_rejects_unknown_version() {
    let header = AcquisitionHeader::builder(16, 1).version(2).build();
    let err = header.validate().unwrap_err();
    assert!(err.to_string().contains("version"));
}

// ==================== Binary layout ====================

#[test]
fn test_bytes_roundtrip_is_exact() {
    let header = populated_header();
    let bytes = header.to_bytes();

    let decoded = AcquisitionHeader::from_bytes(&bytes).unwrap();
    // NaN in user_float defeats PartialEq, compare the encodings instead
    assert_eq!(decoded.to_bytes(), bytes);
    assert_eq!(decoded.idx, header.idx);
    assert_eq!(decoded.flags, header.flags);
    assert_eq!(decoded.channel_mask, header.channel_mask);
    assert_eq!(decoded.user_int, header.user_int);
}

#[test]
fn test_field_offsets() {
    let header = populated_header();
    let bytes = header.to_bytes();

    assert_eq!(&bytes[0..2], &1u16.to_le_bytes());
    assert_eq!(&bytes[2..4], &[0, 0]);
    assert_eq!(&bytes[4..8], &0xDEAD_BEEFu32.to_le_bytes());
    assert_eq!(&bytes[8..16], &header.flags.raw().to_le_bytes());
    assert_eq!(&bytes[88..92], &1279u32.to_le_bytes());
    assert_eq!(&bytes[108..112], &256u32.to_le_bytes());
    assert_eq!(&bytes[116..120], &4u32.to_le_bytes());
    assert_eq!(&bytes[256..260], &128u32.to_le_bytes());
    assert_eq!(&bytes[268..272], &2.5f32.to_le_bytes());
    assert_eq!(&bytes[332..336], &1i32.to_le_bytes());
    assert_eq!(&bytes[396..400], &[0, 0, 0, 0]);
}

#[test]
fn test_from_bytes_rejects_unknown_version() {
    let mut bytes = populated_header().to_bytes();
    bytes[0..2].copy_from_slice(&7u16.to_le_bytes());

    assert!(matches!(
        AcquisitionHeader::from_bytes(&bytes),
        Err(AcquisitionError::MalformedHeader(_))
    ));
}

#[test]
fn test_from_bytes_truncated() {
    let bytes = populated_header().to_bytes();
    let result = AcquisitionHeader::from_bytes(&bytes[..ACQUISITION_HEADER_SIZE - 1]);
    assert!(matches!(
        result,
        Err(AcquisitionError::Truncated {
            expected: ACQUISITION_HEADER_SIZE,
            ..
        })
    ));
}

#[test]
fn test_stream_roundtrip() {
    let header = AcquisitionHeader::builder(64, 2).scan_counter(9).build();
    let mut buf = Vec::new();
    header.write_to(&mut buf).unwrap();
    assert_eq!(buf.len(), ACQUISITION_HEADER_SIZE);

    let decoded = AcquisitionHeader::read_from(&mut buf.as_slice()).unwrap();
    assert_eq!(decoded, header);
}

#[test]
fn test_serde_json_roundtrip() {
    let header = AcquisitionHeader::builder(32, 2)
        .flags(AcquisitionFlag::IsReverse)
        .build();
    let json = serde_json::to_string(&header).unwrap();
    let decoded: AcquisitionHeader = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, header);
}
