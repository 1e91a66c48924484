use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sonar_core::{RawRange, StabilizerCfg, StabilizerState, update};

fn bench_update(c: &mut Criterion) {
    let cfg = StabilizerCfg::default();
    // A noisy approach with periodic misses and out-of-range spikes.
    let inputs: Vec<RawRange> = (0..1024u32)
        .map(|i| match i % 16 {
            0 => RawRange::NoEcho,
            7 => RawRange::Distance(4000),
            _ => RawRange::Distance(200 + (i * 13) % 1500),
        })
        .collect();

    c.bench_function("stabilizer_update_1024", |b| {
        b.iter(|| {
            let mut st = StabilizerState::new();
            let mut acc = 0u64;
            for raw in &inputs {
                let (out, next) = update(black_box(*raw), st, &cfg);
                acc = acc.wrapping_add(u64::from(out));
                st = next;
            }
            black_box(acc)
        });
    });
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
