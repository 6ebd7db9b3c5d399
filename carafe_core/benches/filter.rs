use carafe_core::{DetectorCfg, FilterCfg, WeightFilter, WeightPipeline};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

// Synthetic HX711-like trace in cg: a pot on the plate, lifted and returned,
// with white noise and sparse spikes
fn synth_trace(n: usize, noise_cg: i32, seed: u32) -> Vec<i32> {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        x
    };
    let mut v = Vec::with_capacity(n);
    for i in 0..n {
        let base = if (i / 2_000) % 2 == 0 { 500_000 } else { 30_000 };
        let r = next();
        let noise = (r % (2 * noise_cg as u32 + 1)) as i32 - noise_cg;
        let spike = if r % 997 == 0 { 250_000 } else { 0 };
        v.push(base + noise + spike);
    }
    v
}

pub fn bench_filter(c: &mut Criterion) {
    let mut g = c.benchmark_group("weight_filter");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p carafe_core --bench filter
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    let trace = synth_trace(50_000, 150, 0xC0FFEE);

    for &(n, m) in &[(5usize, 3usize), (9, 5), (15, 8)] {
        g.bench_function(format!("median_{n}_mean_{m}"), |b| {
            b.iter_batched(
                || {
                    WeightFilter::new(FilterCfg {
                        median_window: n,
                        smoothing_window: m,
                        stability_tolerance_cg: 200,
                    })
                },
                |mut f| {
                    for &s in &trace {
                        black_box(f.ingest(black_box(s)));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    g.bench_function("pipeline_default", |b| {
        b.iter_batched(
            || {
                WeightPipeline::new(
                    Default::default(),
                    FilterCfg::default(),
                    DetectorCfg::default(),
                )
            },
            |mut p| {
                for &s in &trace {
                    black_box(p.process(black_box(s)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(filter, bench_filter);
criterion_main!(filter);
