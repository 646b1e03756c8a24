use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use double_key_hashtable::DoubleKeyTable;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

// 64 first keys with up to 256 second keys each.
fn pair(n: u64) -> (String, String) {
    (format!("g{:02x}", n & 0x3f), format!("k{:016x}", n >> 6))
}

fn filled(seed: u64, n: usize) -> (DoubleKeyTable<String, String, u64>, Vec<(String, String)>) {
    let mut t = DoubleKeyTable::new();
    let pairs: Vec<_> = lcg(seed).take(n).map(pair).collect();
    for (i, (k1, k2)) in pairs.iter().enumerate() {
        t.set(k1.clone(), k2.clone(), i as u64).unwrap();
    }
    (t, pairs)
}

fn bench_set(c: &mut Criterion) {
    c.bench_function("double_key_table_set_10k", |b| {
        let pairs: Vec<_> = lcg(1).take(10_000).map(pair).collect();
        b.iter_batched(
            || (DoubleKeyTable::<String, String, u64>::new(), pairs.clone()),
            |(mut t, pairs)| {
                for (i, (k1, k2)) in pairs.into_iter().enumerate() {
                    t.set(k1, k2, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("double_key_table_get_hit", |b| {
        let (t, pairs) = filled(7, 10_000);
        let mut it = pairs.iter().cycle();
        b.iter(|| {
            let (k1, k2) = it.next().unwrap();
            black_box(t.get(k1.as_str(), k2.as_str()).unwrap());
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("double_key_table_get_miss", |b| {
        let (t, _) = filled(11, 10_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let (k1, k2) = pair(miss.next().unwrap());
            black_box(t.get(k1.as_str(), k2.as_str()).is_ok());
        })
    });
}

fn bench_values_of(c: &mut Criterion) {
    c.bench_function("double_key_table_values_of", |b| {
        let (t, pairs) = filled(13, 10_000);
        let mut it = pairs.iter().cycle();
        b.iter(|| {
            let (k1, _) = it.next().unwrap();
            black_box(t.values_of(k1.as_str()).unwrap().sum::<u64>());
        })
    });
}

fn bench_remove_reinsert(c: &mut Criterion) {
    c.bench_function("double_key_table_remove_reinsert", |b| {
        let (mut t, pairs) = filled(17, 10_000);
        let mut it = pairs.iter().cycle();
        b.iter(|| {
            let (k1, k2) = it.next().unwrap();
            let v = t.remove(k1.as_str(), k2.as_str()).unwrap();
            t.set(k1.clone(), k2.clone(), black_box(v)).unwrap();
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_set, bench_get_hit, bench_get_miss, bench_values_of, bench_remove_reinsert
}
criterion_main!(benches);
