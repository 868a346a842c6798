use criterion::{criterion_group, criterion_main, Criterion};
use sentinel::{ModelConfig, OutbreakModel};

static SEED: u64 = 123;
static DAYS: u32 = 365;

fn simulate_year(outbreak_probability: u32) -> OutbreakModel {
    let mut model = OutbreakModel::new(ModelConfig {
        outbreak_probability,
        seed: Some(SEED),
        ..ModelConfig::default()
    })
    .expect("default config is valid");

    for _ in 0..DAYS {
        model.step();
    }
    model
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("simulate one year", |bencher| {
        bencher.iter_with_large_drop(|| simulate_year(30));
    });
    c.bench_function("simulate one year, frequent outbreaks", |bencher| {
        bencher.iter_with_large_drop(|| simulate_year(100));
    });
    c.bench_function("snapshot after one year", |bencher| {
        let model = simulate_year(30);
        bencher.iter(|| model.get_state());
    });
}

criterion_group!(simulation_benches, criterion_benchmark);
criterion_main!(simulation_benches);
