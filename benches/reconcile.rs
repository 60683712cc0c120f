use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scene_animator::core::{evaluate, PlaybackState, Reconciler};
use scene_animator::scene::{CubeOptions, Keyframe, SceneDocument, Track};
use scene_animator::RecordingRenderer;
use std::f32::consts::PI;

fn animated_document(count: usize) -> SceneDocument {
    let mut doc = SceneDocument::with_seed(240, 42);
    for _ in 0..count {
        doc.add_cube(CubeOptions::default());
    }
    doc
}

fn bench_evaluate(c: &mut Criterion) {
    let spin = Track::linear(Keyframe::new(0, 0.0), Keyframe::new(240, 2.0 * PI));

    c.bench_function("evaluate_rotation_y", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for frame in 0..=240 {
                total += evaluate(black_box(&spin), 240, frame).unwrap_or(0.0);
            }
            black_box(total)
        });
    });
}

fn bench_reconcile_unchanged(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_unchanged");

    for count in [10usize, 100, 1000].iter() {
        let doc = animated_document(*count);
        let snapshot = doc.snapshot();
        let mut renderer = RecordingRenderer::new();
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&snapshot, &mut renderer);

        group.bench_with_input(BenchmarkId::new("cubes", count), count, |b, _| {
            b.iter(|| black_box(reconciler.reconcile(black_box(&snapshot), &mut renderer)));
        });
    }

    group.finish();
}

fn bench_reconcile_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_replace");

    for size in [4u32, 10, 30].iter() {
        let mut doc = SceneDocument::with_seed(240, 7);
        doc.generate_city_blocks(*size);
        let city = doc.snapshot();
        let cubes = animated_document((*size * *size) as usize).snapshot();

        group.bench_with_input(BenchmarkId::new("city_blocks", size * size), size, |b, _| {
            let mut renderer = RecordingRenderer::new();
            let mut reconciler = Reconciler::new();
            b.iter(|| {
                reconciler.reconcile(black_box(&city), &mut renderer);
                black_box(reconciler.reconcile(black_box(&cubes), &mut renderer))
            });
        });
    }

    group.finish();
}

fn bench_sync_animation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_animation");

    for count in [100usize, 1000].iter() {
        let snapshot = animated_document(*count).snapshot();
        let mut renderer = RecordingRenderer::new();
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&snapshot, &mut renderer);

        group.bench_with_input(BenchmarkId::new("spinning_cubes", count), count, |b, _| {
            let mut playback = PlaybackState::new(240);
            b.iter(|| {
                playback.current_frame = (playback.current_frame + 1) % 241;
                black_box(reconciler.sync_animation(&playback, &mut renderer))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_reconcile_unchanged,
    bench_reconcile_replace,
    bench_sync_animation
);
criterion_main!(benches);
