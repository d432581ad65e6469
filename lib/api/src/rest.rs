use actix_cors::Cors;
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use toolrec_core::{AttributeFilter, Error, RecommenderService};
use tracing::{debug, error, info};

const DEFAULT_RECOMMENDATIONS: usize = 5;
const DEFAULT_LISTING: usize = 10;

fn default_recommendations() -> usize {
    DEFAULT_RECOMMENDATIONS
}

fn default_listing() -> usize {
    DEFAULT_LISTING
}

#[derive(Deserialize)]
struct ToolsQuery {
    open_source: Option<i64>,
    api_available: Option<i64>,
    category: Option<String>,
    modality: Option<String>,
}

#[derive(Deserialize)]
struct RecommendQuery {
    #[serde(default = "default_recommendations")]
    n: usize,
    open_source: Option<i64>,
    api_available: Option<i64>,
}

#[derive(Deserialize)]
struct TextRecommendQuery {
    #[serde(default)]
    q: String,
    #[serde(default = "default_recommendations")]
    n: usize,
    open_source: Option<i64>,
    api_available: Option<i64>,
}

#[derive(Deserialize)]
struct CategoryQuery {
    #[serde(default = "default_listing")]
    n: usize,
    open_source: Option<i64>,
    api_available: Option<i64>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default = "default_listing")]
    n: usize,
}

/// Flag filters shared by the recommendation endpoints
fn flag_filters(open_source: Option<i64>, api_available: Option<i64>) -> AttributeFilter {
    let mut filters = AttributeFilter::new();
    if let Some(v) = open_source {
        filters.insert("open_source", v);
    }
    if let Some(v) = api_available {
        filters.insert("api_available", v);
    }
    filters
}

fn error_response(e: &Error) -> HttpResponse {
    let body = json!({
        "success": false,
        "error": e.to_string()
    });
    if !e.is_client_error() {
        error!("Request failed: {}", e);
    }
    match e {
        Error::ToolNotFound(_) => HttpResponse::NotFound().json(body),
        Error::InvalidArgument(_) => HttpResponse::BadRequest().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = json!({
        "success": false,
        "error": format!("Invalid query parameters: {}", err)
    });
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Register every route; used by the server and by handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/api/tools", web::get().to(list_tools))
        .route("/api/recommend/{tool_name}", web::get().to(recommend))
        .route("/api/recommend-text", web::get().to(recommend_text))
        .route("/api/category/{category}", web::get().to(by_category))
        .route("/api/search", web::get().to(search))
        .route("/api/categories", web::get().to(categories))
        .route("/api/modalities", web::get().to(modalities))
        .route("/api/stats", web::get().to(stats));
}

pub struct RestApi;

impl RestApi {
    /// Run the server on a fresh actix `System`, blocking the calling thread
    /// until it stops. Bind errors are returned, not swallowed.
    pub fn run(
        service: Arc<RecommenderService>,
        host: &str,
        port: u16,
        workers: Option<usize>,
    ) -> std::io::Result<()> {
        actix_web::rt::System::new().block_on(Self::start(service, host, port, workers))
    }

    pub async fn start(
        service: Arc<RecommenderService>,
        host: &str,
        port: u16,
        workers: Option<usize>,
    ) -> std::io::Result<()> {
        info!("Binding HTTP server to {}:{}", host, port);
        let mut server = HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(service.clone()))
                .configure(configure)
        });
        if let Some(workers) = workers {
            server = server.workers(workers);
        }
        server.bind((host, port))?.run().await
    }
}

async fn index() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "message": "AI tool recommendation API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/health": "Liveness and number of loaded tools",
            "/api/tools": "List tools, optionally filtered",
            "/api/recommend/{tool_name}": "Tools similar to a tool",
            "/api/recommend-text?q=<query>": "Tools matching a free-text description",
            "/api/category/{category}": "Tools in a category, newest first",
            "/api/search?q=<query>": "Substring search",
            "/api/categories": "All categories",
            "/api/modalities": "All modalities",
            "/api/stats": "Catalog statistics"
        }
    })))
}

async fn health(service: web::Data<Arc<RecommenderService>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "tools_loaded": service.tool_count()
    })))
}

async fn list_tools(
    service: web::Data<Arc<RecommenderService>>,
    query: web::Query<ToolsQuery>,
) -> ActixResult<HttpResponse> {
    let query = query.into_inner();
    let mut filters = flag_filters(query.open_source, query.api_available);
    if let Some(category) = query.category.filter(|c| !c.is_empty()) {
        filters.insert("category", category);
    }
    if let Some(modality) = query.modality.filter(|m| !m.is_empty()) {
        filters.insert("modality", modality);
    }

    let tools = service.list_tools(&filters);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": tools.len(),
        "tools": tools
    })))
}

async fn recommend(
    service: web::Data<Arc<RecommenderService>>,
    path: web::Path<String>,
    query: web::Query<RecommendQuery>,
) -> ActixResult<HttpResponse> {
    let tool_name = path.into_inner();
    let filters = flag_filters(query.open_source, query.api_available);
    debug!("recommend {:?} n={} filters={:?}", tool_name, query.n, filters);

    match service.similar_to_item(&tool_name, query.n, &filters) {
        Ok(recommendations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "tool_name": tool_name,
            "count": recommendations.len(),
            "recommendations": recommendations
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn recommend_text(
    service: web::Data<Arc<RecommenderService>>,
    query: web::Query<TextRecommendQuery>,
) -> ActixResult<HttpResponse> {
    let filters = flag_filters(query.open_source, query.api_available);

    match service.similar_to_text(&query.q, query.n, &filters) {
        Ok(recommendations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "query": query.q,
            "count": recommendations.len(),
            "recommendations": recommendations
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn by_category(
    service: web::Data<Arc<RecommenderService>>,
    path: web::Path<String>,
    query: web::Query<CategoryQuery>,
) -> ActixResult<HttpResponse> {
    let category = path.into_inner();
    let filters = flag_filters(query.open_source, query.api_available);

    match service.by_category(&category, query.n, &filters) {
        Ok(tools) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "category": category,
            "count": tools.len(),
            "tools": tools
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn search(
    service: web::Data<Arc<RecommenderService>>,
    query: web::Query<SearchQuery>,
) -> ActixResult<HttpResponse> {
    match service.search(&query.q, query.n) {
        Ok(results) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "query": query.q,
            "count": results.len(),
            "results": results
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn categories(service: web::Data<Arc<RecommenderService>>) -> ActixResult<HttpResponse> {
    let categories = service.categories();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": categories.len(),
        "categories": categories
    })))
}

async fn modalities(service: web::Data<Arc<RecommenderService>>) -> ActixResult<HttpResponse> {
    let modalities = service.modalities();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": modalities.len(),
        "modalities": modalities
    })))
}

async fn stats(service: web::Data<Arc<RecommenderService>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "statistics": service.statistics()
    })))
}
