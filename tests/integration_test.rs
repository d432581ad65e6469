// Integration tests for toolrec
use std::fs;
use std::path::PathBuf;
use toolrec_core::{
    AttributeFilter, BuildConfig, Catalog, RecommenderModel, RecommenderService, ToolRecord,
};
use toolrec_storage::{ModelManager, ModelOrigin};

fn sample_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/ai_tools.csv")
}

fn sample_service() -> RecommenderService {
    let catalog = Catalog::from_path(sample_catalog_path()).unwrap();
    let model = RecommenderModel::build(catalog, BuildConfig::default()).unwrap();
    RecommenderService::new(model)
}

#[test]
fn test_open_source_filter_example() {
    let catalog = Catalog::new(vec![
        ToolRecord::new("ChatGPT")
            .with_company("OpenAI")
            .with_category("Chatbot")
            .with_modality("Text")
            .with_flag("api_available", true),
        ToolRecord::new("Llama")
            .with_company("Meta")
            .with_category("Chatbot")
            .with_modality("Text")
            .with_flag("open_source", true),
    ]);
    let model = RecommenderModel::build(catalog, BuildConfig::default()).unwrap();
    let service = RecommenderService::new(model);

    let filters = AttributeFilter::new().with("open_source", 1);
    let results = service.similar_to_item("ChatGPT", 5, &filters).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Llama");
}

#[test]
fn test_search_chat_example() {
    let service = sample_service();
    let results = service.search("chat", 10).unwrap();
    assert!(!results.is_empty());
    assert!(results.len() <= 10);
    assert_eq!(results[0].name, "ChatGPT");
    for r in &results {
        let hit = [&r.name, &r.company, &r.category, &r.modality]
            .iter()
            .any(|f| f.to_lowercase().contains("chat"));
        assert!(hit, "{} does not mention chat", r.name);
    }
}

#[test]
fn test_similarity_matrix_properties() {
    let service = sample_service();
    let model = service.model();
    let sim = model.similarity();
    let n = sim.size();
    assert_eq!(n, model.catalog().len());

    for i in 0..n {
        if !model.features()[i].is_zero() {
            assert!((sim.get(i, i) - 1.0).abs() < 1e-5);
        }
        for j in 0..n {
            assert_eq!(sim.get(i, j), sim.get(j, i));
        }
    }
}

#[test]
fn test_recommendations_exclude_query_tool() {
    let service = sample_service();
    for tool in service.model().catalog().iter() {
        let results = service
            .similar_to_item(&tool.tool_name, 5, &AttributeFilter::new())
            .unwrap();
        assert!(results.len() <= 5);
        // names are unique in the sample catalog
        assert!(results.iter().all(|r| r.name != tool.tool_name));
    }
}

#[test]
fn test_filters_are_conjunctive() {
    let service = sample_service();
    let filters = AttributeFilter::new()
        .with("open_source", 1)
        .with("api_available", 1)
        .with("unknown_attribute", "ignored");
    let results = service.similar_to_item("ChatGPT", 50, &filters).unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.open_source && r.api_available));
}

#[test]
fn test_category_sorted_by_recency() {
    let service = sample_service();
    let results = service
        .by_category("image generation", 10, &AttributeFilter::new())
        .unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.category == "Image Generation"));

    let years: Vec<i32> = results
        .iter()
        .map(|r| r.release_year.flatten().unwrap())
        .collect();
    assert!(years.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_statistics_consistent() {
    let service = sample_service();
    let stats = service.statistics();
    assert_eq!(stats.total_tools, service.tool_count());
    assert_eq!(stats.categories.values().sum::<usize>(), stats.total_tools);
    assert!(stats.open_source_count <= stats.total_tools);
    assert!(stats.api_available_count <= stats.total_tools);
    // DeepSeek has no release year
    assert_eq!(
        stats.releases_by_year.values().sum::<usize>(),
        stats.total_tools - 1
    );
}

#[test]
fn test_blank_text_fields_yield_zero_text_block() {
    let catalog = Catalog::new(vec![
        ToolRecord::new("Anonymous").with_flag("mod_text", true),
        ToolRecord::new("ChatGPT").with_company("OpenAI").with_category("Chatbot"),
    ]);
    let model = RecommenderModel::build(catalog, BuildConfig::default()).unwrap();
    assert!(model.text_features(0).iter().all(|&x| x == 0.0));
}

#[test]
fn test_persist_and_reload_gives_identical_results() {
    let temp_dir = tempfile::tempdir().unwrap();
    let csv_path = temp_dir.path().join("tools.csv");
    fs::copy(sample_catalog_path(), &csv_path).unwrap();
    let data_dir = temp_dir.path().join("models");

    let manager = ModelManager::new(&data_dir, BuildConfig::default()).unwrap();
    let (built, origin) = manager.load_or_build(&csv_path, false).unwrap();
    assert_eq!(origin, ModelOrigin::Built);
    let built = RecommenderService::new(built);

    // A fresh manager over the same directory loads instead of building
    let manager = ModelManager::new(&data_dir, BuildConfig::default()).unwrap();
    let (loaded, origin) = manager.load_or_build(&csv_path, false).unwrap();
    assert_eq!(origin, ModelOrigin::Loaded);
    let loaded = RecommenderService::new(loaded);

    let filters = AttributeFilter::new().with("api_available", 1);
    for name in ["ChatGPT", "Midjourney", "Whisper"] {
        assert_eq!(
            built.similar_to_item(name, 5, &filters).unwrap(),
            loaded.similar_to_item(name, 5, &filters).unwrap()
        );
    }
    assert_eq!(
        built.similar_to_text("video generation", 3, &AttributeFilter::new()).unwrap(),
        loaded.similar_to_text("video generation", 3, &AttributeFilter::new()).unwrap()
    );
    assert_eq!(built.statistics(), loaded.statistics());
}

#[test]
fn test_manifest_written() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = ModelManager::new(temp_dir.path(), BuildConfig::default()).unwrap();
    manager.build(sample_catalog_path()).unwrap();

    let raw = fs::read_to_string(manager.store().manifest_path()).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(manifest["tool_count"], 36);
    assert_eq!(manifest["feature_dim"], 112);
    assert_eq!(manifest["checksum"].as_str().unwrap().len(), 64);
}
