use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mrdstore::prelude::*;
use tempfile::TempDir;

fn make_line(line: u32, samples: u32, channels: u32) -> Acquisition {
    let mut idx = EncodingCounters::new();
    idx.kspace_encode_step_1 = line;
    let header = AcquisitionHeader::builder(samples, channels)
        .counters(idx)
        .scan_counter(line)
        .center_sample(samples / 2)
        .build();
    let data: Vec<Complex32> = (0..samples * channels)
        .map(|i| Complex32::new(i as f32, line as f32))
        .collect();
    Acquisition::from_parts(header, data, None).unwrap()
}

/// Create a store with `lines` acquisitions of 256 samples x 4 channels
fn create_test_store(path: &std::path::Path, lines: u32) {
    let mut dataset =
        Dataset::create_with_config(path, "dataset", &StoreConfig::fast_write()).unwrap();
    for line in 0..lines {
        dataset.append(&make_line(line, 256, 4)).unwrap();
    }
    dataset.close().unwrap();
}

/// Benchmark appending one repetition for different readout lengths
fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for samples in [128u32, 256, 512] {
        let lines: Vec<Acquisition> = (0..256).map(|l| make_line(l, samples, 4)).collect();
        let bytes: usize = lines
            .iter()
            .map(|a| Acquisition::encoded_len(a.header()).unwrap())
            .sum();
        group.throughput(Throughput::Bytes(bytes as u64));

        group.bench_with_input(BenchmarkId::new("samples", samples), &lines, |b, lines| {
            b.iter(|| {
                let temp_dir = TempDir::new().unwrap();
                let path = temp_dir.path().join("bench.mrd");
                let mut dataset =
                    Dataset::create_with_config(&path, "dataset", &StoreConfig::fast_write())
                        .unwrap();
                for acq in lines {
                    dataset.append(acq).unwrap();
                }
                black_box(dataset.close().unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark random access by acquisition index
fn bench_random_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_read");

    for lines in [256u32, 1280] {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bench.mrd");
        create_test_store(&path, lines);
        let dataset = Dataset::open_read_only(&path, "dataset").unwrap();

        group.bench_with_input(BenchmarkId::new("lines", lines), &lines, |b, &lines| {
            let mut index = 0usize;
            b.iter(|| {
                index = (index * 7919 + 13) % lines as usize;
                black_box(dataset.read_acquisition(index).unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark opening a store, which scans every frame
fn bench_open(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bench.mrd");
    create_test_store(&path, 1280);

    c.bench_function("open_1280_lines", |b| {
        b.iter(|| black_box(Dataset::open_read_only(&path, "dataset").unwrap()))
    });
}

/// Benchmark the record codec without I/O
fn bench_codec(c: &mut Criterion) {
    let acq = make_line(17, 256, 4);
    let encoded = acq.encode();

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("encode", |b| b.iter(|| black_box(acq.encode())));
    group.bench_function("decode", |b| {
        b.iter(|| black_box(Acquisition::decode(&encoded).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_append, bench_random_read, bench_open, bench_codec);
criterion_main!(benches);
