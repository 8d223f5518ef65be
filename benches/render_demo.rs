use std::{sync::Arc, time::Duration};

use criterion::{Criterion, criterion_group, criterion_main};
use shinytrace::{
    RenderSettings, TargetBuffer,
    demo::{demo_camera, demo_scene},
    geometry::ScreenSize,
    render,
};

fn criterion_benchmark(c: &mut Criterion) {
    let resolution = ScreenSize::new(320, 240);
    let scene = Arc::new(demo_scene().unwrap());
    let mut camera = demo_camera();
    camera.frustum_mut().fit_aspect(resolution);
    let settings = RenderSettings::default();

    c.bench_function("render_demo", |b| {
        b.iter_batched(
            || Arc::new(TargetBuffer::new(resolution)),
            |buffer| {
                let mut render_progress =
                    render(Arc::clone(&scene), camera, settings, buffer, |_, _| {}).unwrap();
                render_progress.wait();
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(60));
    targets = criterion_benchmark
}
criterion_main!(benches);
