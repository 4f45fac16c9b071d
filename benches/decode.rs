use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use igornx::archive::ArchiveTree;
use igornx::entry::{ConversionRun, InputFile};
use igornx::wave::WaveRecord;

/// Little-endian version 5 wave with a 2-D f64 payload and a short note
fn generate_wave(rows: usize, cols: usize) -> Vec<u8> {
    let note = b"Ep=20\rLensMode=WideAngle\rPassEnergy=10";
    let data: Vec<u8> = (0..rows * cols)
        .flat_map(|i| (i as f64 * 0.5).to_le_bytes())
        .collect();

    let mut buf = vec![0u8; 384];
    buf[0..2].copy_from_slice(&5i16.to_le_bytes());
    buf[4..8].copy_from_slice(&(320 + data.len() as i32).to_le_bytes());
    buf[12..16].copy_from_slice(&(note.len() as i32).to_le_bytes());
    buf[76..80].copy_from_slice(&((rows * cols) as i32).to_le_bytes());
    buf[80..82].copy_from_slice(&4i16.to_le_bytes());
    buf[92..97].copy_from_slice(b"bench");
    buf[132..136].copy_from_slice(&(rows as i32).to_le_bytes());
    buf[136..140].copy_from_slice(&(cols as i32).to_le_bytes());
    buf[148..156].copy_from_slice(&0.01f64.to_le_bytes());
    buf[156..164].copy_from_slice(&0.1f64.to_le_bytes());
    buf[180..188].copy_from_slice(&80.0f64.to_le_bytes());
    buf[188..196].copy_from_slice(&(-15.0f64).to_le_bytes());
    buf[216..218].copy_from_slice(b"eV");

    let sum = buf
        .chunks_exact(2)
        .fold(0u16, |acc, w| acc.wrapping_add(u16::from_le_bytes([w[0], w[1]])));
    buf[2..4].copy_from_slice(&0u16.wrapping_sub(sum).to_le_bytes());

    buf.extend_from_slice(&data);
    buf.extend_from_slice(note);
    buf
}

/// Packed experiment holding `count` waves in one folder
fn generate_archive(count: usize, wave: &[u8]) -> Vec<u8> {
    fn record(buf: &mut Vec<u8>, record_type: u16, body: &[u8]) {
        buf.extend_from_slice(&record_type.to_le_bytes());
        buf.extend_from_slice(&1i16.to_le_bytes());
        buf.extend_from_slice(&(body.len() as i32).to_le_bytes());
        buf.extend_from_slice(body);
    }

    let mut buf = Vec::new();
    let mut folder = [0u8; 32];
    folder[..5].copy_from_slice(b"scans");
    record(&mut buf, 9, &folder);
    for _ in 0..count {
        record(&mut buf, 3, wave);
    }
    record(&mut buf, 10, &[]);
    buf
}

fn bench_wave_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("wave_decode");

    for rows in [100, 1000, 4000] {
        let cols = 64;
        let bytes = generate_wave(rows, cols);

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &bytes, |b, bytes| {
            b.iter(|| {
                let wave = WaveRecord::from_bytes(black_box(bytes)).unwrap();
                black_box(wave.data.len());
            });
        });
    }

    group.finish();
}

fn bench_archive_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_decode");
    let wave = generate_wave(200, 32);

    for count in [10, 100] {
        let bytes = generate_archive(count, &wave);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &bytes, |b, bytes| {
            b.iter(|| {
                let tree = ArchiveTree::from_bytes(black_box(bytes)).unwrap();
                black_box(tree.wave_count());
            });
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let wave = generate_wave(500, 64);

    c.bench_function("normalize_single_waves", |b| {
        b.iter(|| {
            let mut run = ConversionRun::new();
            for i in 0..16 {
                run.add_input(InputFile::wave_bytes(format!("scan_{i}.ibw"), wave.clone()));
            }
            let store = run.run().unwrap();
            black_box(store.len());
        });
    });
}

criterion_group!(benches, bench_wave_decode, bench_archive_decode, bench_normalize);
criterion_main!(benches);
