use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{Json, Response},
    routing::{get, put},
    Router,
};
use serde::Deserialize;

use super::extract::{JsonBody, QueryParams};
use super::{error::ApiError, user_id, ApiResult, AppState};
use crate::db;
use crate::models::{ApiResponse, League, Manager, MatchWithTeams, Player, Team, ADMIN_ROLE};
use crate::services::admin::{LeagueForm, ManagerForm, MatchForm, MutationOutcome, PlayerForm, TeamForm};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/leagues", get(list_leagues).post(create_league))
        .route("/leagues/{id}", put(update_league).delete(delete_league))
        .route("/teams", get(list_teams).post(create_team))
        .route("/teams/{id}", put(update_team).delete(delete_team))
        .route("/players", get(list_players).post(create_player))
        .route("/players/{id}", put(update_player).delete(delete_player))
        .route("/managers", get(list_managers).post(create_manager))
        .route("/managers/{id}", put(update_manager).delete(delete_manager))
        .route("/matches", get(list_matches).post(create_match))
        .route("/matches/{id}", put(update_match).delete(delete_match))
}

/// Lets the request through only for users holding the admin role.
pub(super) async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = user_id(&headers).ok_or_else(|| ApiError::Unauthorized("Sign in required".to_string()))?;

    if !db::has_role(&state.pool, &user, ADMIN_ROLE).await? {
        return Err(ApiError::Forbidden(format!("User {} is not an admin", user)));
    }

    Ok(next.run(request).await)
}

/// Deletion only goes ahead with `?confirm=true`.
#[derive(Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    confirm: bool,
}

type Outcome<T> = ApiResult<MutationOutcome<T>>;

// ── Leagues ─────────────────────────────────────────────────────────────────

async fn list_leagues(State(state): State<AppState>) -> ApiResult<Vec<League>> {
    Ok(Json(ApiResponse::success(state.admin.list_leagues().await?)))
}

async fn create_league(State(state): State<AppState>, JsonBody(form): JsonBody<LeagueForm>) -> Outcome<League> {
    Ok(Json(ApiResponse::success(state.admin.create_league(form).await?)))
}

async fn update_league(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<LeagueForm>,
) -> Outcome<League> {
    Ok(Json(ApiResponse::success(state.admin.update_league(&id, form).await?)))
}

async fn delete_league(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(q): QueryParams<DeleteQuery>,
) -> Outcome<League> {
    Ok(Json(ApiResponse::success(state.admin.delete_league(&id, q.confirm).await?)))
}

// ── Teams ───────────────────────────────────────────────────────────────────

async fn list_teams(State(state): State<AppState>) -> ApiResult<Vec<Team>> {
    Ok(Json(ApiResponse::success(state.admin.list_teams().await?)))
}

async fn create_team(State(state): State<AppState>, JsonBody(form): JsonBody<TeamForm>) -> Outcome<Team> {
    Ok(Json(ApiResponse::success(state.admin.create_team(form).await?)))
}

async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<TeamForm>,
) -> Outcome<Team> {
    Ok(Json(ApiResponse::success(state.admin.update_team(&id, form).await?)))
}

async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(q): QueryParams<DeleteQuery>,
) -> Outcome<Team> {
    Ok(Json(ApiResponse::success(state.admin.delete_team(&id, q.confirm).await?)))
}

// ── Players ─────────────────────────────────────────────────────────────────

async fn list_players(State(state): State<AppState>) -> ApiResult<Vec<Player>> {
    Ok(Json(ApiResponse::success(state.admin.list_players().await?)))
}

async fn create_player(State(state): State<AppState>, JsonBody(form): JsonBody<PlayerForm>) -> Outcome<Player> {
    Ok(Json(ApiResponse::success(state.admin.create_player(form).await?)))
}

async fn update_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<PlayerForm>,
) -> Outcome<Player> {
    Ok(Json(ApiResponse::success(state.admin.update_player(&id, form).await?)))
}

async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(q): QueryParams<DeleteQuery>,
) -> Outcome<Player> {
    Ok(Json(ApiResponse::success(state.admin.delete_player(&id, q.confirm).await?)))
}

// ── Managers ────────────────────────────────────────────────────────────────

async fn list_managers(State(state): State<AppState>) -> ApiResult<Vec<Manager>> {
    Ok(Json(ApiResponse::success(state.admin.list_managers().await?)))
}

async fn create_manager(State(state): State<AppState>, JsonBody(form): JsonBody<ManagerForm>) -> Outcome<Manager> {
    Ok(Json(ApiResponse::success(state.admin.create_manager(form).await?)))
}

async fn update_manager(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<ManagerForm>,
) -> Outcome<Manager> {
    Ok(Json(ApiResponse::success(state.admin.update_manager(&id, form).await?)))
}

async fn delete_manager(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(q): QueryParams<DeleteQuery>,
) -> Outcome<Manager> {
    Ok(Json(ApiResponse::success(state.admin.delete_manager(&id, q.confirm).await?)))
}

// ── Matches ─────────────────────────────────────────────────────────────────

async fn list_matches(State(state): State<AppState>) -> ApiResult<Vec<MatchWithTeams>> {
    Ok(Json(ApiResponse::success(state.admin.list_matches().await?)))
}

async fn create_match(State(state): State<AppState>, JsonBody(form): JsonBody<MatchForm>) -> Outcome<MatchWithTeams> {
    Ok(Json(ApiResponse::success(state.admin.create_match(form).await?)))
}

async fn update_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<MatchForm>,
) -> Outcome<MatchWithTeams> {
    Ok(Json(ApiResponse::success(state.admin.update_match(&id, form).await?)))
}

async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(q): QueryParams<DeleteQuery>,
) -> Outcome<MatchWithTeams> {
    Ok(Json(ApiResponse::success(state.admin.delete_match(&id, q.confirm).await?)))
}
