use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, Criterion, SamplingMode,
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use wavedic::bit_vectors::RsBitVector;
use wavedic::WaveletMatrix;

const SAMPLE_SIZE: usize = 30;
const WARM_UP_TIME: Duration = Duration::from_secs(5);
const MEASURE_TIME: Duration = Duration::from_secs(10);

const SEED_VALS: u64 = 334;
const SEED_QUERIES: u64 = 114514;

const NUM_VALS: &[usize] = &[1 << 10, 1 << 15, 1 << 20];
const ALPH_SIZE: usize = 256;
const NUM_QUERIES: usize = 1000;

fn gen_random_ints(len: usize, dim: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..dim)).collect()
}

fn criterion_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing_wavelet_matrix_access");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);

    for &n in NUM_VALS {
        let vals = gen_random_ints(n, ALPH_SIZE, SEED_VALS);
        let queries = gen_random_ints(NUM_QUERIES, n, SEED_QUERIES);
        let wm = WaveletMatrix::<RsBitVector>::from_ints(&vals).unwrap();
        perform(&mut group, &format!("access/n={n}"), || {
            let mut sum = 0;
            for &q in &queries {
                sum += wm.access(q).unwrap();
            }
            sum
        });
    }
}

fn criterion_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing_wavelet_matrix_rank");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);

    for &n in NUM_VALS {
        let vals = gen_random_ints(n, ALPH_SIZE, SEED_VALS);
        let wm = WaveletMatrix::<RsBitVector>::from_ints(&vals).unwrap();
        let positions = gen_random_ints(NUM_QUERIES, n, SEED_QUERIES);
        let symbols = gen_random_ints(NUM_QUERIES, wm.alph_size(), SEED_QUERIES + 1);
        perform(&mut group, &format!("rank/n={n}"), || {
            let mut sum = 0;
            for (&p, &s) in positions.iter().zip(&symbols) {
                sum += wm.rank(p, s).unwrap();
            }
            sum
        });
    }
}

fn criterion_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing_wavelet_matrix_select");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);

    for &n in NUM_VALS {
        let vals = gen_random_ints(n, ALPH_SIZE, SEED_VALS);
        let wm = WaveletMatrix::<RsBitVector>::from_ints(&vals).unwrap();
        let mut rng = ChaChaRng::seed_from_u64(SEED_QUERIES);
        let queries: Vec<_> = (0..NUM_QUERIES)
            .map(|_| loop {
                let s = rng.gen_range(0..wm.alph_size());
                let occ = wm.rank(n, s).unwrap();
                if occ != 0 {
                    break (rng.gen_range(0..occ), s);
                }
            })
            .collect();
        perform(&mut group, &format!("select/n={n}"), || {
            let mut sum = 0;
            for &(k, s) in &queries {
                sum += wm.select(k, s).unwrap();
            }
            sum
        });
    }
}

fn criterion_quantile(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing_wavelet_matrix_quantile");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);

    for &n in NUM_VALS {
        let vals = gen_random_ints(n, ALPH_SIZE, SEED_VALS);
        let wm = WaveletMatrix::<RsBitVector>::from_ints(&vals).unwrap();
        let mut rng = ChaChaRng::seed_from_u64(SEED_QUERIES);
        let queries: Vec<_> = (0..NUM_QUERIES)
            .map(|_| {
                let start = rng.gen_range(0..n);
                let end = rng.gen_range(start + 1..=n);
                (start..end, rng.gen_range(0..end - start))
            })
            .collect();
        perform(&mut group, &format!("quantile/n={n}"), || {
            let mut sum = 0;
            for (r, k) in &queries {
                sum += wm.quantile(r.clone(), *k).unwrap();
            }
            sum
        });
    }
}

fn perform<F>(group: &mut BenchmarkGroup<WallTime>, name: &str, mut routine: F)
where
    F: FnMut() -> usize,
{
    group.bench_function(name, |b| b.iter(&mut routine));
}

criterion_group!(
    benches,
    criterion_access,
    criterion_rank,
    criterion_select,
    criterion_quantile
);
criterion_main!(benches);
