//! # API Server Module
//!
//! ## Purpose
//! REST API server exposing the search subsystem: profile search,
//! autocomplete suggestions, search history management and a small
//! admin/seed surface for profile and user records.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with queries, filters, records
//! - **Output**: JSON responses with hydrated results, suggestions, history
//! - **Endpoints**: Search, suggestions, history, profiles, users, health,
//!   stats
//!
//! ## Key Features
//! - CORS support for web frontends
//! - Structured error responses mapped from `DirectoryError`
//! - Request timing reported alongside search results

use crate::errors::{DirectoryError, Result};
use crate::utils::Timer;
use crate::{
    AppState, HydratedProfile, Profile, ProfileId, ProfileStatus, SearchFilters, SearchHistoryEntry,
    User, UserId,
};
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// REST API server over the shared application state
pub struct ApiServer {
    app_state: AppState,
}

/// Search request payload
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl SearchRequest {
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            category: self.category.clone(),
            location: self.location.clone(),
            country: self.country.clone(),
        }
    }
}

/// Search response payload
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<HydratedProfile>,
    pub total_results: usize,
    pub query_time_ms: u64,
}

/// Suggestion query string, e.g. `/suggestions?q=nurs`
#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

/// Suggestion response payload
#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<String>,
}

/// History save payload
#[derive(Debug, Deserialize)]
pub struct SaveHistoryRequest {
    pub user_id: UserId,
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
}

/// History list query string
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// History list response payload
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<SearchHistoryEntry>,
}

/// Profile create/update payload (admin/seed surface)
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub user_id: UserId,
    pub profession: String,
    #[serde(default)]
    pub skills: String,
    pub category: String,
    pub location: String,
    pub country: String,
    pub status: ProfileStatus,
}

/// User create payload (admin/seed surface)
#[derive(Debug, Deserialize)]
pub struct UpsertUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "member".to_string()
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    /// Bind the listener and return the running server handle
    ///
    /// The returned `Server` is `Send`, so the caller may drive it on the
    /// current task or hand it to `tokio::spawn`.
    pub fn bind(self) -> Result<Server> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;
        let app_state = self.app_state;

        tracing::info!("Starting API server on {}", bind_addr);

        let server = HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::permissive()
            } else {
                Cors::default()
            };

            App::new()
                .app_data(web::Data::new(app_state.clone()))
                .wrap(cors)
                .configure(configure_routes)
        })
        .bind(&bind_addr)
        .map_err(|e| DirectoryError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run();

        Ok(server)
    }

    /// Bind and serve until the server is stopped
    pub async fn run(self) -> Result<()> {
        self.bind()?
            .await
            .map_err(|e| DirectoryError::Internal {
                message: format!("Server error: {}", e),
            })
    }
}

/// Route table shared by the server and the test harness
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/search", web::post().to(search_handler))
        .route("/suggestions", web::get().to(suggestions_handler))
        .route("/history", web::post().to(save_history_handler))
        .route("/history/{user_id}", web::get().to(get_history_handler))
        .route("/history/{user_id}", web::delete().to(clear_history_handler))
        .route("/profiles", web::put().to(upsert_profile_handler))
        .route("/profiles/{id}", web::get().to(get_profile_handler))
        .route("/users", web::put().to(upsert_user_handler))
        .route("/health", web::get().to(health_handler))
        .route("/stats", web::get().to(stats_handler))
        .route("/", web::get().to(index_handler));
}

/// Map a subsystem error onto a structured JSON response
fn error_response(e: &DirectoryError) -> HttpResponse {
    tracing::error!("Request failed ({}): {}", e.category(), e);
    let body = serde_json::json!({
        "error": e.category(),
        "message": e.to_string(),
    });
    match e.status_code() {
        400 => HttpResponse::BadRequest().json(body),
        404 => HttpResponse::NotFound().json(body),
        503 => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// Search endpoint handler
async fn search_handler(
    app_state: web::Data<AppState>,
    request: web::Json<SearchRequest>,
) -> ActixResult<HttpResponse> {
    let timer = Timer::new("search");
    let filters = request.filters();

    match app_state
        .search_engine
        .search_profiles(&request.query, &filters)
        .await
    {
        Ok(results) => {
            let total_results = results.len();
            Ok(HttpResponse::Ok().json(SearchResponse {
                results,
                total_results,
                query_time_ms: timer.stop(),
            }))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

/// Autocomplete suggestions endpoint handler
async fn suggestions_handler(
    app_state: web::Data<AppState>,
    query: web::Query<SuggestionQuery>,
) -> ActixResult<HttpResponse> {
    match app_state.suggestions.suggestions(&query.q).await {
        Ok(suggestions) => Ok(HttpResponse::Ok().json(SuggestionResponse { suggestions })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// History save endpoint handler
async fn save_history_handler(
    app_state: web::Data<AppState>,
    request: web::Json<SaveHistoryRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    match app_state
        .history
        .save(request.user_id, &request.query, request.filters)
        .await
    {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(error_response(&e)),
    }
}

/// History list endpoint handler
async fn get_history_handler(
    app_state: web::Data<AppState>,
    path: web::Path<UserId>,
    query: web::Query<HistoryQuery>,
) -> ActixResult<HttpResponse> {
    match app_state.history.get(path.into_inner(), query.limit).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(HistoryResponse { entries })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// History clear endpoint handler
async fn clear_history_handler(
    app_state: web::Data<AppState>,
    path: web::Path<UserId>,
) -> ActixResult<HttpResponse> {
    match app_state.history.clear(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Profile upsert endpoint handler (admin/seed surface)
async fn upsert_profile_handler(
    app_state: web::Data<AppState>,
    request: web::Json<UpsertProfileRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    let profile = Profile {
        id: Uuid::new_v4(),
        user_id: request.user_id,
        profession: request.profession,
        skills: request.skills,
        category: request.category,
        location: request.location,
        country: request.country,
        status: request.status,
        created_at: Utc::now(),
    };

    match app_state.store.put_profile(&profile).await {
        Ok(()) => Ok(HttpResponse::Created().json(profile)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Profile fetch endpoint handler
async fn get_profile_handler(
    app_state: web::Data<AppState>,
    path: web::Path<ProfileId>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match app_state.store.get_profile(&id).await {
        Ok(Some(profile)) => Ok(HttpResponse::Ok().json(profile)),
        Ok(None) => Ok(error_response(&DirectoryError::NotFound {
            kind: "profile",
            id: id.to_string(),
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// User upsert endpoint handler (admin/seed surface)
async fn upsert_user_handler(
    app_state: web::Data<AppState>,
    request: web::Json<UpsertUserRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    let user = User {
        id: Uuid::new_v4(),
        name: request.name,
        email: request.email,
        phone: request.phone,
        role: request.role,
    };

    match app_state.store.put_user(&user).await {
        Ok(()) => Ok(HttpResponse::Created().json(user)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Health check endpoint handler
async fn health_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let storage_status = match app_state.store.health_check().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let response = HealthResponse {
        status: storage_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage_status.to_string(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Statistics endpoint handler
async fn stats_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match app_state.store.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(stats)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Index page handler
async fn index_handler() -> ActixResult<HttpResponse> {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Member Directory Search</title></head>
    <body>
        <h1>Member Directory Search API</h1>
        <ul>
            <li>POST /search &mdash; filtered full-text profile search</li>
            <li>GET /suggestions?q= &mdash; autocomplete suggestions</li>
            <li>POST /history &mdash; record an executed search</li>
            <li>GET /history/{user_id}?limit= &mdash; recent searches</li>
            <li>DELETE /history/{user_id} &mdash; clear history</li>
            <li>GET /health, GET /stats</li>
        </ul>
    </body>
    </html>
    "#;

    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}
