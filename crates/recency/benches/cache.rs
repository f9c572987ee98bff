use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use recency::{LruCache, MemoryBacking, SharedLruCache, ThroughCache};

fn bench_cached_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_get");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit", |b| {
        let mut cache = LruCache::new(1000);
        for i in 0..100u64 {
            cache.set(i, vec![b'x'; 1024]);
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 100)));
            counter += 1;
        });
    });

    group.bench_function("get_hit_shared", |b| {
        let cache = SharedLruCache::new(1000);
        for i in 0..100u64 {
            cache.set(i, vec![b'x'; 1024]);
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 100)));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write", |b| {
        let mut cache = LruCache::new(1000);
        for i in 0..1000u64 {
            cache.set(i, i);
        }

        let mut counter = 0u64;
        b.iter(|| {
            if counter % 2 == 0 {
                black_box(cache.get(&(counter % 1000)));
            } else {
                black_box(cache.set(counter % 2000, counter));
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("insert_evicting", |b| {
        let mut cache = LruCache::new(10); // Small cache
        let mut counter = 0u64;
        b.iter(|| {
            // Every key is new, so every set past the tenth evicts
            black_box(cache.set(counter, counter));
            counter += 1;
        });
    });

    group.bench_function("read_through_miss", |b| {
        let cache = ThroughCache::new(MemoryBacking::new(), 10);
        for i in 0..100u64 {
            cache.set(i, i).unwrap();
        }

        let mut counter = 0u64;
        b.iter(|| {
            // Cycling over 100 keys with room for 10 guarantees misses
            black_box(cache.get(&(counter % 100)).unwrap());
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_cached_get, bench_mixed_50_50, bench_eviction);
criterion_main!(benches);
