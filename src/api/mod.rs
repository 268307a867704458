mod admin;
mod error;
mod events;
mod extract;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;
use extract::QueryParams;

use crate::config::Config;
use crate::db::{self, create_pool, init_database_with_pool};
use crate::models::{ApiResponse, League, MatchWithTeams, UserRole, ADMIN_ROLE};
use crate::services::admin::AdminService;
use crate::services::events::ChangeHub;
use crate::services::stats::MatchBuckets;
use crate::services::views::{self, Dashboard, ManagerRow, StandingsView, TeamDetails};

/// Header carrying the signed-in user's id. Issuing it is the auth provider's job.
pub const USER_HEADER: &str = "x-user-id";

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub hub: ChangeHub,
    pub admin: AdminService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let hub = ChangeHub::new();
        Self {
            admin: AdminService::new(pool.clone(), hub.clone()),
            pool,
            hub,
        }
    }
}

pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let pool = create_pool(&config.database_url).await?;
    init_database_with_pool(&pool).await?;

    let app = create_router(AppState::new(pool));

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Matchday API server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    let admin_routes = admin::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        admin::require_admin,
    ));

    Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(dashboard_handler))
        .route("/leagues", get(leagues_handler))
        .route("/standings", get(standings_handler))
        .route("/matches", get(matches_handler))
        .route("/matches/{id}", get(match_details_handler))
        .route("/teams/{id}", get(team_details_handler))
        .route("/managers", get(managers_handler))
        .route("/me", get(me_handler))
        .route("/events/{table}", get(events::table_events_handler))
        .nest("/admin", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub(crate) fn user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Matchday API is running"))
}

// GET /dashboard - Overall table, top scorers/assists, next fixtures
async fn dashboard_handler(State(state): State<AppState>) -> ApiResult<Dashboard> {
    Ok(Json(ApiResponse::success(views::dashboard(&state.pool).await?)))
}

// GET /leagues - League picker
async fn leagues_handler(State(state): State<AppState>) -> ApiResult<Vec<League>> {
    Ok(Json(ApiResponse::success(db::list_leagues(&state.pool).await?)))
}

#[derive(Deserialize)]
struct StandingsQuery {
    league_id: Option<String>,
}

// GET /standings?league_id= - League table for the selected league
async fn standings_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<StandingsQuery>,
) -> ApiResult<StandingsView> {
    let league_id = params.league_id.as_deref().filter(|id| !id.is_empty());
    match views::standings(&state.pool, league_id).await? {
        Some(view) => Ok(Json(ApiResponse::success(view))),
        None => Err(ApiError::not_found("League", league_id.unwrap_or_default())),
    }
}

// GET /matches - Live, upcoming and finished buckets
async fn matches_handler(State(state): State<AppState>) -> ApiResult<MatchBuckets> {
    Ok(Json(ApiResponse::success(views::matches_overview(&state.pool).await?)))
}

// GET /matches/{id} - Match detail
async fn match_details_handler(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResult<MatchWithTeams> {
    views::match_details(&state.pool, &match_id)
        .await?
        .map(|m| Json(ApiResponse::success(m)))
        .ok_or_else(|| ApiError::not_found("Match", &match_id))
}

// GET /teams/{id} - Team, squad, manager and recent form
async fn team_details_handler(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ApiResult<TeamDetails> {
    views::team_details(&state.pool, &team_id)
        .await?
        .map(|t| Json(ApiResponse::success(t)))
        .ok_or_else(|| ApiError::not_found("Team", &team_id))
}

// GET /managers - Managers ranked by points
async fn managers_handler(State(state): State<AppState>) -> ApiResult<Vec<ManagerRow>> {
    Ok(Json(ApiResponse::success(views::managers(&state.pool).await?)))
}

#[derive(Serialize)]
struct Me {
    user_id: String,
    is_admin: bool,
    roles: Vec<UserRole>,
}

// GET /me - Whether the caller sees the admin entry
async fn me_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Me> {
    let user = user_id(&headers).ok_or_else(|| ApiError::Unauthorized("Sign in required".to_string()))?;
    let roles = db::roles_for_user(&state.pool, &user).await?;
    let is_admin = roles.iter().any(|r| r.role == ADMIN_ROLE);

    Ok(Json(ApiResponse::success(Me {
        user_id: user,
        is_admin,
        roles,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const ADMIN: &str = "admin-user";

    async fn spawn_app() -> Router {
        let pool = db::memory_pool().await.unwrap();
        db::grant_role(&pool, ADMIN, ADMIN_ROLE).await.unwrap();
        create_router(AppState::new(pool))
    }

    async fn send(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = spawn_app().await;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_admin_routes_are_gated() {
        let app = spawn_app().await;

        let (status, body) = send(&app, "GET", "/admin/leagues", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, "GET", "/admin/leagues", Some("someone"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "GET", "/admin/leagues", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_me_reports_admin_flag() {
        let app = spawn_app().await;
        let (_, body) = send(&app, "GET", "/me", Some(ADMIN), None).await;
        assert_eq!(body["data"]["is_admin"], true);

        let (_, body) = send(&app, "GET", "/me", Some("fan"), None).await;
        assert_eq!(body["data"]["is_admin"], false);
    }

    #[tokio::test]
    async fn test_league_create_list_delete_round_trip() {
        let app = spawn_app().await;
        let form = json!({ "name": "Premier League", "country": "England", "season": "2025-26" });

        let (status, body) = send(&app, "POST", "/admin/leagues", Some(ADMIN), Some(form)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "League added successfully");
        let id = body["data"]["rows"][0]["id"].as_str().unwrap().to_string();

        let (_, body) = send(&app, "GET", "/leagues", None, None).await;
        assert_eq!(body["data"][0]["name"], "Premier League");

        let uri = format!("/admin/leagues/{}", id);
        let (status, body) = send(&app, "DELETE", &uri, Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Deletion must be confirmed");

        let uri = format!("/admin/leagues/{}?confirm=true", id);
        let (status, _) = send(&app, "DELETE", &uri, Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/leagues", None, None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_same_team_match_is_bad_request() {
        let app = spawn_app().await;
        let form = json!({
            "home_team_id": "t1",
            "away_team_id": "t1",
            "match_date": "2026-03-01T15:00",
            "venue": "Ground"
        });
        let (status, body) = send(&app, "POST", "/admin/matches", Some(ADMIN), Some(form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Home and away teams must be different");
    }

    #[tokio::test]
    async fn test_malformed_bodies_use_the_envelope() {
        let app = spawn_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/admin/leagues")
            .header(USER_HEADER, ADMIN)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": 5"#))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(!body["error"].as_str().unwrap().is_empty());

        let uri = "/admin/leagues/x?confirm=maybe";
        let (status, body) = send(&app, "DELETE", uri, Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_references_are_bad_request() {
        let app = spawn_app().await;
        let form = json!({
            "home_team_id": "ghost-a",
            "away_team_id": "ghost-b",
            "match_date": "2026-03-01T15:00",
            "venue": "Ground"
        });
        let (status, body) = send(&app, "POST", "/admin/matches", Some(ADMIN), Some(form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("FOREIGN KEY"));
    }

    #[tokio::test]
    async fn test_text_numbers_accepted_by_team_form() {
        let app = spawn_app().await;
        let form = json!({ "name": "Rovers", "stadium": "Park", "wins": "4", "draws": "x", "founded": 1901 });
        let (status, body) = send(&app, "POST", "/admin/teams", Some(ADMIN), Some(form)).await;
        assert_eq!(status, StatusCode::OK);
        let team = &body["data"]["rows"][0];
        assert_eq!(team["wins"], 4);
        assert_eq!(team["draws"], 0);
        assert_eq!(team["points"], 12);
        assert_eq!(team["founded"], 1901);
    }

    #[tokio::test]
    async fn test_read_errors_use_the_envelope() {
        let app = spawn_app().await;

        let (status, body) = send(&app, "GET", "/teams/missing", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Team missing not found");

        let (status, _) = send(&app, "GET", "/matches/missing", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/standings?league_id=missing", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/events/user_roles", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_views() {
        let app = spawn_app().await;

        let (status, body) = send(&app, "GET", "/matches", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["live"].as_array().unwrap().len(), 0);

        let (_, body) = send(&app, "GET", "/standings", None, None).await;
        assert!(body["data"]["selected_league"].is_null());

        let (_, body) = send(&app, "GET", "/dashboard", None, None).await;
        assert_eq!(body["data"]["top_scorers"].as_array().unwrap().len(), 0);
    }
}
