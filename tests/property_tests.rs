//! Property-based tests for the acquisition header and record codecs

use mrdstore::prelude::*;
use proptest::prelude::*;
use tempfile::tempdir;

fn any_flag() -> impl Strategy<Value = AcquisitionFlag> {
    prop::sample::select(AcquisitionFlag::ALL.to_vec())
}

fn any_counters() -> impl Strategy<Value = EncodingCounters> {
    prop::collection::vec(any::<u16>(), EncodingDimension::all().count()).prop_map(|values| {
        let mut idx = EncodingCounters::new();
        for (dim, value) in EncodingDimension::all().zip(values) {
            idx.set(dim, u32::from(value));
        }
        idx
    })
}

fn any_header() -> impl Strategy<Value = AcquisitionHeader> {
    (
        1u32..64,
        1u32..8,
        0u32..4,
        any::<u64>(),
        any_counters(),
        any::<u32>(),
        any::<[i32; 8]>(),
    )
        .prop_map(|(samples, channels, dims, flags, idx, scan, user)| {
            AcquisitionHeader::builder(samples, channels)
                .trajectory_dimensions(dims)
                .flags(FlagSet::from_raw(flags))
                .counters(idx)
                .scan_counter(scan)
                .center_sample(samples / 2)
                .user_int(user)
                .build()
        })
}

fn any_acquisition() -> impl Strategy<Value = Acquisition> {
    any_header().prop_flat_map(|header| {
        let samples = prop::collection::vec(
            (any::<f32>(), any::<f32>()).prop_map(|(re, im)| Complex32::new(re, im)),
            header.sample_count(),
        );
        let trajectory = prop::collection::vec(-0.5f32..0.5, header.trajectory_len());
        (Just(header), samples, trajectory)
            .prop_map(|(header, samples, trajectory)| {
                let trajectory = if trajectory.is_empty() {
                    None
                } else {
                    Some(trajectory)
                };
                Acquisition::from_parts(header, samples, trajectory).unwrap()
            })
    })
}

fn sample_bits(acq: &Acquisition) -> Vec<(u32, u32)> {
    acq.samples()
        .iter()
        .map(|s| (s.re.to_bits(), s.im.to_bits()))
        .collect()
}

proptest! {
    /// Setting a flag makes exactly that flag test true
    #[test]
    fn test_flag_set_is_isolated(flag in any_flag()) {
        let set = FlagSet::new().with(flag);
        for other in AcquisitionFlag::ALL {
            prop_assert_eq!(set.test(other), other == flag);
        }
        let mut cleared = set;
        cleared.clear(flag);
        prop_assert!(cleared.is_empty());
    }

    /// The raw integer is a bijection with the set
    #[test]
    fn test_flag_raw_bijection(raw in any::<u64>()) {
        prop_assert_eq!(FlagSet::from_raw(raw).raw(), raw);
    }

    /// Header bytes decode to an identical header
    #[test]
    fn test_header_bytes_roundtrip(header in any_header()) {
        let bytes = header.to_bytes();
        let decoded = AcquisitionHeader::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded.to_bytes(), bytes);
        prop_assert_eq!(decoded.flags, header.flags);
        prop_assert_eq!(decoded.idx, header.idx);
    }

    /// Records decode to bit-identical samples, NaN payloads included
    #[test]
    fn test_record_roundtrip(acq in any_acquisition()) {
        let decoded = Acquisition::decode(&acq.encode()).unwrap();
        prop_assert_eq!(decoded.header().to_bytes(), acq.header().to_bytes());
        prop_assert_eq!(sample_bits(&decoded), sample_bits(&acq));
        prop_assert_eq!(decoded.trajectory(), acq.trajectory());
    }

    /// Decoding arbitrary bytes fails cleanly instead of panicking
    #[test]
    fn test_decode_garbage(bytes in prop::collection::vec(any::<u8>(), 0..2048)) {
        let _ = Acquisition::decode(&bytes);
    }

    /// Wrong sample counts are rejected and never reach the store
    #[test]
    fn test_shape_mismatch_rejected(samples in 1u32..32, channels in 1u32..4, delta in 1usize..8) {
        let header = AcquisitionHeader::builder(samples, channels).build();
        let data = vec![Complex32::new(1.0, 1.0); header.sample_count() + delta];
        let result = Acquisition::new(header, &data, None);
        let is_mismatch = matches!(result, Err(AcquisitionError::DataMismatch { .. }));
        prop_assert!(is_mismatch);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Whatever is appended is read back in order
    #[test]
    fn test_dataset_append_read(acqs in prop::collection::vec(any_acquisition(), 1..12)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prop.mrd");

        let mut dataset = Dataset::create_with_config(&path, "dataset", &StoreConfig::fast_write()).unwrap();
        for acq in &acqs {
            dataset.append(acq).unwrap();
        }
        prop_assert_eq!(dataset.acquisition_count(), acqs.len());

        for (i, expected) in acqs.iter().enumerate() {
            let read = dataset.read_acquisition(i).unwrap();
            prop_assert_eq!(read.header().to_bytes(), expected.header().to_bytes());
            prop_assert_eq!(sample_bits(&read), sample_bits(expected));
        }
        let is_out_of_range = matches!(
            dataset.read_acquisition(acqs.len()),
            Err(DatasetError::OutOfRange { .. })
        );
        prop_assert!(is_out_of_range);
        dataset.close().unwrap();
    }
}
