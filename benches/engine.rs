use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use seiswave::{decode_win, SliceWave, Spectrogram, Wave};

/// Generate realistic seismic-like samples (smooth drift plus small noise).
fn seismic_samples(n: usize) -> Vec<i32> {
    let mut v = Vec::with_capacity(n);
    for i in 0..n {
        let drift = (i as f64 * 0.05).sin() * 50.0;
        let noise = ((i as f64 * 1.7).sin() * 10.0) as i32;
        v.push(1000 + drift as i32 + noise);
    }
    v
}

/// Build a WIN stream of `seconds` one-second packets of `rate` samples
/// for a single channel, width-2 deltas.
fn win_stream(seconds: u32, rate: usize) -> Vec<u8> {
    let samples = seismic_samples(rate * seconds as usize);
    let mut stream = Vec::new();
    for s in 0..seconds {
        let run = &samples[s as usize * rate..(s as usize + 1) * rate];
        let mut block = vec![0x00, 0x01, 0x20, rate as u8];
        block.extend_from_slice(&run[0].to_be_bytes());
        for w in run.windows(2) {
            let delta = (w[1] - w[0]) as i16;
            block.extend_from_slice(&delta.to_be_bytes());
        }
        stream.extend_from_slice(&((10 + block.len()) as u32).to_be_bytes());
        // BCD seconds tick within one minute
        let sec = s % 60;
        let bcd = ((sec / 10) << 4 | (sec % 10)) as u8;
        stream.extend_from_slice(&[0x07, 0x03, 0x15, 0x12, 0x30, bcd]);
        stream.extend_from_slice(&block);
    }
    stream
}

fn bench_win_decode(c: &mut Criterion) {
    let stream = win_stream(30, 100);

    let mut group = c.benchmark_group("win");
    group.throughput(Throughput::Elements(30 * 100));
    group.bench_function("decode/30s/100hz", |b| {
        b.iter(|| decode_win(black_box(&stream)).unwrap())
    });
    group.finish();
}

fn bench_wave_engine(c: &mut Criterion) {
    let a = Wave::new(seismic_samples(6000), 0.0, 100.0);
    let b = Wave::new(seismic_samples(6000), 30.0, 100.0);

    let mut group = c.benchmark_group("wave");
    group.throughput(Throughput::Elements(6000));

    group.bench_function("combine/60s_overlap_30s", |bench| {
        bench.iter(|| black_box(&a).combine(black_box(&b)).unwrap())
    });
    group.bench_function("join/pair", |bench| {
        bench.iter(|| Wave::join(black_box(&[a.clone(), b.clone()])).unwrap())
    });
    group.bench_function("wire/roundtrip", |bench| {
        bench.iter(|| Wave::from_binary(&black_box(&a).to_binary()).unwrap())
    });
    group.finish();
}

fn bench_spectrogram(c: &mut Criterion) {
    let wave = Wave::new(seismic_samples(6000), 0.0, 100.0);
    let view = SliceWave::whole(&wave);
    let signal = view.to_samples();

    c.bench_function("spectrogram/6000samp/nfft256", |b| {
        b.iter(|| Spectrogram::new(black_box(&signal), 100.0, 256, 256, 128, 5.0))
    });
}

criterion_group!(benches, bench_win_decode, bench_wave_engine, bench_spectrogram);
criterion_main!(benches);
