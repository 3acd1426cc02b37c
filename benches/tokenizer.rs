use criterion::{criterion_group, criterion_main, Criterion};
use sheen::css::parser_config::ParserConfig;
use sheen::styling::useragent::load_default_useragent_stylesheet;
use sheen::testing;

const STYLESHEET: &str = include_str!("../crates/sheen_styling/resources/useragent.css");

fn criterion_benchmark(c: &mut Criterion) {
    // Criterion can report inconsistent results from run to run in some cases.  We attempt to
    // minimize that in this setup.
    // https://stackoverflow.com/a/74136347/61048
    let mut group = c.benchmark_group("tokenization");
    group.significance_level(0.1).sample_size(500);

    let config = ParserConfig::default();
    group.bench_function("tokens", |b| {
        b.iter(|| testing::tokens(STYLESHEET.as_bytes(), 0, &config).unwrap())
    });
    group.bench_function("tokens in 16 byte chunks", |b| {
        b.iter(|| testing::tokens(STYLESHEET.as_bytes(), 16, &config).unwrap())
    });
    group.finish();

    let mut group = c.benchmark_group("parsing");
    group.bench_function("events", |b| {
        b.iter(|| testing::events(STYLESHEET.as_bytes(), 0, ParserConfig::default()).unwrap())
    });
    group.bench_function("useragent stylesheet", |b| {
        b.iter(|| load_default_useragent_stylesheet().unwrap())
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
