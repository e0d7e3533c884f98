/**
 * Performance benchmarks for layered-noise
 *
 * Run with:
 *   cargo bench
 *
 * View HTML reports in:
 *   target/criterion/report/index.html
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use layered_noise::{
    build_base_noise, BlurAmplifyStage, BlurStrategy, DiscardSink, GaussianBlur, LayerCombiner,
    NoiseSynthesizer, RandomColorSampler, SynthesisConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn base_noise(size: u32) -> layered_noise::Raster {
    let mut sampler = RandomColorSampler::with_rng(StdRng::seed_from_u64(42));
    build_base_noise(size, size, &mut sampler).unwrap()
}

/// Benchmark direct vs FFT Gaussian blur across radii
fn bench_gaussian_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_blur");
    let base = base_noise(256);

    for radius in [2.0f32, 10.0, 30.0].iter() {
        for (name, strategy) in [("direct", BlurStrategy::Direct), ("fft", BlurStrategy::Fft)] {
            let blur = GaussianBlur::new(*radius).unwrap().with_strategy(strategy);
            group.bench_with_input(BenchmarkId::new(name, radius), radius, |b, _| {
                b.iter(|| black_box(blur.apply(&base)))
            });
        }
    }

    group.finish();
}

/// Benchmark a single octave (two blurs and the amplify pass)
fn bench_octave(c: &mut Criterion) {
    let mut group = c.benchmark_group("octave");
    let base = base_noise(256);
    let stage = BlurAmplifyStage::new();

    for radius in [10.0f32, 20.0, 30.0].iter() {
        group.bench_with_input(BenchmarkId::new("radius", radius), radius, |b, &r| {
            b.iter(|| black_box(stage.process(&base, r).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark combining three octaves
fn bench_combine(c: &mut Criterion) {
    let base = base_noise(256);
    let stage = BlurAmplifyStage::new();
    let layers: Vec<_> = [10.0, 20.0, 30.0]
        .iter()
        .map(|&r| stage.process(&base, r).unwrap())
        .collect();
    let combiner = LayerCombiner::new();

    c.bench_function("combine_3_layers_256", |b| {
        b.iter(|| black_box(combiner.combine(&base, &layers).unwrap()))
    });
}

/// Benchmark the whole pipeline at different sizes
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for size in [64u32, 128, 256].iter() {
        let config = SynthesisConfig {
            width: *size,
            height: *size,
            persist: false,
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::new("size", size), size, |b, _| {
            b.iter(|| {
                let mut sampler = RandomColorSampler::with_rng(StdRng::seed_from_u64(7));
                let synthesizer = NoiseSynthesizer::new(config.clone()).unwrap();
                black_box(
                    synthesizer
                        .run_with(&mut sampler, &mut DiscardSink, &mut ())
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_gaussian_blur,
    bench_octave,
    bench_combine,
    bench_pipeline
);
criterion_main!(benches);
