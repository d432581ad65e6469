// Build and query throughput on synthetic catalogs
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use toolrec_core::{
    AttributeFilter, BuildConfig, Catalog, RecommenderModel, RecommenderService, ToolRecord,
    BINARY_COLUMNS,
};

const CATEGORIES: &[&str] = &[
    "Chatbot",
    "Language Model",
    "Image Generation",
    "Video Generation",
    "Speech Synthesis",
    "Code Assistant",
    "Productivity",
    "Design",
    "AI Safety",
];
const MODALITIES: &[&str] = &["Text", "Image", "Video", "Audio", "Code", "Multimodal"];

fn generate_catalog(size: usize) -> Catalog {
    let mut rng = rand::rng();
    let tools = (0..size)
        .map(|i| {
            let mut tool = ToolRecord::new(format!("tool-{}", i))
                .with_company(format!("company{}", rng.random_range(0..size / 4 + 1)))
                .with_category(CATEGORIES[rng.random_range(0..CATEGORIES.len())])
                .with_modality(MODALITIES[rng.random_range(0..MODALITIES.len())])
                .with_release_year(rng.random_range(2015..=2025));
            for column in BINARY_COLUMNS {
                tool = tool.with_flag(column, rng.random_bool(0.3));
            }
            tool
        })
        .collect();
    Catalog::new(tools)
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for size in [100, 500, 2000].iter() {
        let catalog = generate_catalog(*size);
        group.bench_with_input(BenchmarkId::new("model", size), &catalog, |b, catalog| {
            b.iter(|| {
                RecommenderModel::build(black_box(catalog.clone()), BuildConfig::default()).unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let model = RecommenderModel::build(generate_catalog(2000), BuildConfig::default()).unwrap();
    let service = RecommenderService::new(model);
    let no_filters = AttributeFilter::new();
    let open_source = AttributeFilter::new().with("open_source", 1);

    group.bench_function("similar_to_item", |b| {
        b.iter(|| service.similar_to_item(black_box("tool-42"), 10, &no_filters).unwrap());
    });

    group.bench_function("similar_to_item_filtered", |b| {
        b.iter(|| service.similar_to_item(black_box("tool-42"), 10, &open_source).unwrap());
    });

    group.bench_function("similar_to_text", |b| {
        b.iter(|| {
            service
                .similar_to_text(black_box("image generation"), 10, &no_filters)
                .unwrap()
        });
    });

    group.bench_function("by_category", |b| {
        b.iter(|| service.by_category(black_box("chatbot"), 10, &no_filters).unwrap());
    });

    group.bench_function("search", |b| {
        b.iter(|| service.search(black_box("code"), 10).unwrap());
    });

    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_queries);
criterion_main!(benches);
