use criterion::{black_box, criterion_group, criterion_main, Criterion};
use saliency::backprop::Backprop;
use saliency::models::simple_cnn;
use saliency::tensor::Tensor;

fn bench_calculate_gradients(c: &mut Criterion) {
    let mut net = simple_cnn(64, 10);
    let data: Vec<f32> = (0..3 * 64 * 64).map(|i| (i % 255) as f32 / 255.0).collect();
    let input = Tensor::new(data, vec![1, 3, 64, 64]);
    let mut bp = Backprop::new(&mut net);

    c.bench_function("calculate_gradients_guided", |bencher| {
        bencher.iter(|| {
            let out = bp
                .calculate_gradients(black_box(&input), None, true, true, false)
                .unwrap();
            black_box(out);
        })
    });
}

criterion_group!(benches, bench_calculate_gradients);
criterion_main!(benches);
