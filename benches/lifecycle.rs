use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hwtexture::capability::probe;
use hwtexture::{DummyBackend, HardwareTexture, SourceDescriptor, TextureConfig};
use std::sync::Arc;

// =============================================================================
// LIFECYCLE BENCHMARKS (dummy device)
// =============================================================================

fn bench_full_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");

    for size in [8u32, 256, 1024] {
        group.throughput(Throughput::Bytes(size as u64 * size as u64 * 4));

        group.bench_with_input(BenchmarkId::new("cpu_access", size), &size, |b, &size| {
            let device = Arc::new(DummyBackend::new());
            b.iter(|| {
                let mut texture = HardwareTexture::new(Arc::clone(&device), size, size);
                texture.allocate_texture(size, size, None).ok();
                black_box(texture.image_handle());
                texture.destroy();
                // Keep the call log from growing across iterations.
                device.take_calls();
            });
        });

        group.bench_with_input(BenchmarkId::new("gpu_only", size), &size, |b, &size| {
            let device = Arc::new(DummyBackend::new());
            let config = TextureConfig::gpu_only();
            b.iter(|| {
                let mut texture = HardwareTexture::with_config(Arc::clone(&device), size, size, &config);
                texture.allocate_texture(size, size, None).ok();
                black_box(texture.image_handle());
                texture.destroy();
                device.take_calls();
            });
        });
    }

    group.finish();
}

fn bench_update_allocated(c: &mut Criterion) {
    let device = Arc::new(DummyBackend::new());
    let mut texture = HardwareTexture::new(Arc::clone(&device), 256, 256);
    let source = SourceDescriptor::new(256, 256, true);
    texture.update_from_source(&source).ok();

    c.bench_function("update_from_source_allocated", |b| {
        b.iter(|| {
            texture.mark_dirty();
            black_box(texture.update_from_source(black_box(&source))).ok();
        });
    });
}

fn bench_probe(c: &mut Criterion) {
    let device = Arc::new(DummyBackend::new());
    c.bench_function("capability_probe", |b| {
        b.iter(|| {
            black_box(probe(&device));
            device.take_calls();
        });
    });
}

criterion_group!(benches, bench_full_lifecycle, bench_update_allocated, bench_probe);
criterion_main!(benches);
