use criterion::{black_box, criterion_group, criterion_main, Criterion};
use futures::future::join_all;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use ipwake::ReachabilityCache;

async fn mixed_load(cache: ReachabilityCache, tasks: usize) -> usize {
    let handles = (0..tasks).map(|i| {
        let cache = cache.clone();
        tokio::spawn(async move {
            let host = IpAddr::V4(Ipv4Addr::new(10, 0, (i / 256) as u8, (i % 256) as u8));
            cache.put(host, Duration::from_millis(1)).await;
            cache.is_present(host).await
        })
    });

    join_all(handles)
        .await
        .into_iter()
        .filter(|present| matches!(present, Ok(true)))
        .count()
}

fn benchmark_cache(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("reachability_cache");
    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(2));

    for &tasks in &[1, 10, 100, 1000] {
        group.bench_function(format!("put_then_read_{}", tasks), |b| {
            b.to_async(&rt).iter(|| async {
                let cache = ReachabilityCache::new(Duration::from_secs(60));
                black_box(mixed_load(cache, tasks).await)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_cache);
criterion_main!(benches);
