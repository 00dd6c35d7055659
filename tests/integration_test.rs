//! Integration tests for mrdstore
//!
//! These tests drive the public API the way an acquisition pipeline would:
//! write a complete scan, close, reopen and read it back.

use mrdstore::prelude::*;
use mrdstore::store::inspect;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tempfile::tempdir;

const REPETITIONS: u32 = 5;
const LINES: u32 = 256;
const SAMPLES: u32 = 256;
const CHANNELS: u32 = 4;

fn first_line_flags() -> FlagSet {
    AcquisitionFlag::LastInEncodeStep1
        | AcquisitionFlag::FirstInSlice
        | AcquisitionFlag::FirstInRepetition
}

fn last_line_flags() -> FlagSet {
    AcquisitionFlag::LastInEncodeStep1
        | AcquisitionFlag::LastInSlice
        | AcquisitionFlag::LastInRepetition
}

fn scan_line(rep: u32, line: u32) -> Acquisition {
    let mut idx = EncodingCounters::new();
    idx.kspace_encode_step_1 = line;
    idx.repetition = rep;

    let flags = if line == 0 {
        first_line_flags()
    } else if line == LINES - 1 {
        last_line_flags()
    } else {
        FlagSet::new()
    };

    let header = AcquisitionHeader::builder(SAMPLES, CHANNELS)
        .flags(flags)
        .counters(idx)
        .scan_counter(rep * LINES + line)
        .center_sample(SAMPLES / 2)
        .directions([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0])
        .build();

    let samples: Vec<Complex32> = (0..SAMPLES * CHANNELS)
        .map(|i| Complex32::new((rep * 7 + line) as f32 * 0.5, i as f32 * -0.25))
        .collect();
    Acquisition::from_parts(header, samples, None).unwrap()
}

fn scan_document() -> HeaderDocument {
    let space = EncodingSpace::new(
        MatrixSize::new(SAMPLES, LINES, 1),
        FieldOfView::new(256.0, 256.0, 5.0),
    );
    let limits = EncodingLimits {
        kspace_encoding_step_0: Some(Limit::span(SAMPLES)),
        kspace_encoding_step_1: Some(Limit::span(LINES)),
        repetition: Some(Limit::new(0, 0, REPETITIONS - 1)),
        ..Default::default()
    };
    HeaderDocument::new(
        AcquisitionSystemInformation {
            receiver_channels: Some(CHANNELS),
            ..Default::default()
        },
        ExperimentalConditions::new(128_000_000),
        Encoding::new(Trajectory::Cartesian, space, limits),
    )
}

/// The full 5 x 256 line Cartesian scenario
#[test]
fn test_cartesian_scan_write_read_cycle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("testdata.mrd");

    let mut dataset = Dataset::create(&path, "dataset").unwrap();
    for rep in 0..REPETITIONS {
        for line in 0..LINES {
            dataset.append(&scan_line(rep, line)).unwrap();
        }
    }
    dataset.write_header_document(&scan_document()).unwrap();

    assert_eq!(dataset.acquisition_count(), 1280);
    for rep in 0..REPETITIONS {
        let first = dataset.read_acquisition((rep * LINES) as usize).unwrap();
        assert_eq!(first.flags(), first_line_flags());
        assert_eq!(first.counters().repetition, rep);

        let last = dataset
            .read_acquisition((rep * LINES + LINES - 1) as usize)
            .unwrap();
        assert_eq!(last.flags(), last_line_flags());
    }

    let stats = dataset.close().unwrap();
    assert_eq!(stats.acquisition_count, 1280);

    // Reopen and compare everything bit for bit
    let dataset = Dataset::open_read_only(&path, "dataset").unwrap();
    assert_eq!(dataset.read_header_document().unwrap(), scan_document());
    for (i, acq) in dataset.acquisitions().enumerate() {
        let acq = acq.unwrap();
        let rep = i as u32 / LINES;
        let line = i as u32 % LINES;
        let expected = scan_line(rep, line);
        assert_eq!(acq.header().to_bytes(), expected.header().to_bytes());
        let bits = |a: &Acquisition| -> Vec<(u32, u32)> {
            a.samples()
                .iter()
                .map(|s| (s.re.to_bits(), s.im.to_bits()))
                .collect()
        };
        assert_eq!(bits(&acq), bits(&expected));
    }

    let report = validate_store(&path).unwrap();
    assert!(!report.has_failures(), "{}", report);
    assert!(!report.has_warnings(), "{}", report);
}

/// A scan interrupted mid-record resumes cleanly
#[test]
fn test_resume_after_interrupted_append() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resume.mrd");

    let mut dataset = Dataset::create(&path, "dataset").unwrap();
    for line in 0..10 {
        dataset.append(&scan_line(0, line)).unwrap();
    }
    dataset.close().unwrap();

    // Half of a record header reaches the disk
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[b'M', b'R', b'D', b'F', 2, 0, 0, 0, 7, 0]).unwrap();
    drop(file);

    let info = inspect(&path).unwrap();
    assert_eq!(info.torn_bytes, 10);
    assert_eq!(info.datasets[0].acquisition_count, 10);

    let mut dataset = Dataset::open(&path, "dataset").unwrap();
    for line in 10..LINES {
        dataset.append(&scan_line(0, line)).unwrap();
    }
    dataset.write_header_document(&scan_document()).unwrap();
    dataset.close().unwrap();

    let info = inspect(&path).unwrap();
    assert_eq!(info.torn_bytes, 0);
    assert_eq!(info.datasets[0].acquisition_count, LINES as usize);
    assert_eq!(info.file_size, fs::metadata(&path).unwrap().len());
}

/// Imaging and noise datasets share one file
#[test]
fn test_noise_dataset_alongside_imaging() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shared.mrd");

    let mut noise = Dataset::create(&path, "noise").unwrap();
    for scan in 0..4 {
        let header = AcquisitionHeader::builder(SAMPLES, CHANNELS)
            .flags(AcquisitionFlag::IsNoiseMeasurement)
            .scan_counter(scan)
            .build();
        let samples = vec![Complex32::new(0.01, -0.01); (SAMPLES * CHANNELS) as usize];
        noise
            .append(&Acquisition::new(header, &samples, None).unwrap())
            .unwrap();
    }
    noise.close().unwrap();

    let mut imaging = Dataset::add_to_store(&path, "dataset").unwrap();
    for line in 0..LINES {
        imaging.append(&scan_line(0, line)).unwrap();
    }
    imaging.write_header_document(&scan_document()).unwrap();
    imaging.close().unwrap();

    let summaries = list_datasets(&path).unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].name, "noise");
    assert_eq!(summaries[0].acquisition_count, 4);
    assert!(!summaries[0].has_header_document);
    assert_eq!(summaries[1].acquisition_count, LINES as usize);
    assert!(summaries[1].has_header_document);

    let noise = Dataset::open_read_only(&path, "noise").unwrap();
    for acq in noise.acquisitions() {
        assert!(acq.unwrap().is_flag_set(AcquisitionFlag::IsNoiseMeasurement));
    }
}
