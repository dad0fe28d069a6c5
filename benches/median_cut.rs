#[path = "../util/util.rs"]
mod util;

use util::benchmark_images;

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use pixquant::{median_cut, Bitmap};

fn bench(
    c: &mut Criterion,
    group: &str,
    mut f: impl FnMut(&mut Bencher<WallTime>, &(u8, &Bitmap)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (levels, secs) in [(8, 3), (4, 2), (12, 4)] {
        group.measurement_time(Duration::from_secs(secs));
        for (path, image) in benchmark_images() {
            group.bench_with_input(
                BenchmarkId::new(levels.to_string(), path),
                &(levels, image),
                &mut f,
            );
        }
    }
}

fn median_cut_samples_single(c: &mut Criterion) {
    bench(c, "median_cut_samples_single", |b, &(_, image)| {
        b.iter(|| median_cut::samples(image))
    })
}

fn median_cut_palette_single(c: &mut Criterion) {
    bench(c, "median_cut_palette_single", |b, &(levels, image)| {
        b.iter(|| median_cut::palette(image, levels))
    })
}

fn median_cut_palette_par(c: &mut Criterion) {
    bench(c, "median_cut_palette_par", |b, &(levels, image)| {
        b.iter(|| median_cut::palette_par(image, levels))
    })
}

criterion_group!(
    benches,
    median_cut_samples_single,
    median_cut_palette_single,
    median_cut_palette_par
);
criterion_main!(benches);
