use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;
use crate::models::{League, Manager, Match, MatchStatus, MatchWithTeams, Player, Position, Team};
use crate::services::events::{ChangeAction, ChangeHub, Table, TableChange};
use crate::services::stats::{league_points, win_percentage};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("Home and away teams must be different")]
    SameTeams,
    #[error("Invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
    #[error("Deletion must be confirmed")]
    Unconfirmed,
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AdminError {
    fn not_found(entity: &'static str, id: &str) -> Self {
        AdminError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// A numeric form field as it arrives from a text input or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FormNumber {
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            FormNumber::Int(v) => i32::try_from(*v).ok(),
            FormNumber::Float(v) if v.is_finite() => i32::try_from(v.trunc() as i64).ok(),
            FormNumber::Float(_) => None,
            FormNumber::Text(s) => {
                let s = s.trim();
                s.parse::<i32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i32))
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FormNumber::Int(v) => Some(*v as f64),
            FormNumber::Float(v) => Some(*v).filter(|v| v.is_finite()),
            FormNumber::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, FormNumber::Text(s) if s.trim().is_empty())
    }
}

/// Optional counters fall back to 0 when missing or unparseable.
fn stat(value: &Option<FormNumber>) -> i32 {
    value.as_ref().and_then(FormNumber::as_i32).unwrap_or(0)
}

fn stat_f64(value: &Option<FormNumber>) -> f64 {
    value.as_ref().and_then(FormNumber::as_f64).unwrap_or(0.0)
}

fn required_number(field: &'static str, value: &Option<FormNumber>) -> Result<i32, ValidationError> {
    match value {
        None => Err(ValidationError::Required(field)),
        Some(v) if v.is_blank() => Err(ValidationError::Required(field)),
        Some(v) => v.as_i32().ok_or(ValidationError::NotANumber(field)),
    }
}

fn optional_number(field: &'static str, value: &Option<FormNumber>) -> Result<Option<i32>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) if v.is_blank() => Ok(None),
        Some(v) => v.as_i32().map(Some).ok_or(ValidationError::NotANumber(field)),
    }
}

fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Empty strings mean "none", the way an unselected dropdown submits.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts RFC 3339 or the `YYYY-MM-DDTHH:MM[:SS]` a datetime-local input sends (read as UTC).
pub fn parse_match_date(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required("match_date"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::Invalid {
            field: "match_date",
            message: format!("'{}' is not a date", value),
        })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeagueForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub season: String,
    pub logo: Option<String>,
}

impl LeagueForm {
    pub fn build(self, id: String, created_at: DateTime<Utc>) -> Result<League, ValidationError> {
        Ok(League {
            id,
            name: required_text("name", &self.name)?,
            country: required_text("country", &self.country)?,
            season: required_text("season", &self.season)?,
            logo: optional_text(self.logo),
            created_at,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stadium: String,
    pub founded: Option<FormNumber>,
    pub logo: Option<String>,
    pub league_id: Option<String>,
    pub wins: Option<FormNumber>,
    pub draws: Option<FormNumber>,
    pub losses: Option<FormNumber>,
    pub goals_for: Option<FormNumber>,
    pub goals_against: Option<FormNumber>,
}

impl TeamForm {
    pub fn build(self, id: String, created_at: DateTime<Utc>) -> Result<Team, ValidationError> {
        let (wins, draws, losses) = (stat(&self.wins), stat(&self.draws), stat(&self.losses));
        Ok(Team {
            id,
            name: required_text("name", &self.name)?,
            stadium: required_text("stadium", &self.stadium)?,
            founded: optional_number("founded", &self.founded)?,
            logo: optional_text(self.logo),
            league_id: optional_text(self.league_id),
            wins,
            draws,
            losses,
            goals_for: stat(&self.goals_for),
            goals_against: stat(&self.goals_against),
            points: league_points(wins, draws, losses),
            created_at,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerForm {
    #[serde(default)]
    pub name: String,
    pub position: Option<String>,
    pub jersey_number: Option<FormNumber>,
    pub team_id: Option<String>,
    pub goals: Option<FormNumber>,
    pub assists: Option<FormNumber>,
    pub rating: Option<FormNumber>,
    pub appearances: Option<FormNumber>,
}

impl PlayerForm {
    pub fn build(self, id: String, created_at: DateTime<Utc>) -> Result<Player, ValidationError> {
        let position = match optional_text(self.position) {
            None => Position::Forward,
            Some(p) => p.parse::<Position>().map_err(|e| ValidationError::Invalid {
                field: "position",
                message: e.to_string(),
            })?,
        };

        Ok(Player {
            id,
            name: required_text("name", &self.name)?,
            position,
            jersey_number: required_number("jersey_number", &self.jersey_number)?,
            team_id: optional_text(self.team_id),
            goals: stat(&self.goals),
            assists: stat(&self.assists),
            rating: stat_f64(&self.rating),
            appearances: stat(&self.appearances),
            created_at,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManagerForm {
    #[serde(default)]
    pub name: String,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub nationality: String,
    pub age: Option<FormNumber>,
    pub team_id: Option<String>,
    pub wins: Option<FormNumber>,
    pub draws: Option<FormNumber>,
    pub losses: Option<FormNumber>,
    pub matches_managed: Option<FormNumber>,
}

impl ManagerForm {
    pub fn build(self, id: String, created_at: DateTime<Utc>) -> Result<Manager, ValidationError> {
        let (wins, draws, losses) = (stat(&self.wins), stat(&self.draws), stat(&self.losses));
        let matches_managed = stat(&self.matches_managed);
        Ok(Manager {
            id,
            name: required_text("name", &self.name)?,
            photo_url: optional_text(self.photo_url),
            nationality: required_text("nationality", &self.nationality)?,
            age: required_number("age", &self.age)?,
            team_id: optional_text(self.team_id),
            wins,
            draws,
            losses,
            points: league_points(wins, draws, losses),
            matches_managed,
            win_percentage: win_percentage(wins, matches_managed),
            created_at,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchForm {
    #[serde(default)]
    pub home_team_id: String,
    #[serde(default)]
    pub away_team_id: String,
    pub home_score: Option<FormNumber>,
    pub away_score: Option<FormNumber>,
    #[serde(default)]
    pub match_date: String,
    pub status: Option<String>,
    #[serde(default)]
    pub venue: String,
    pub league_id: Option<String>,
}

impl MatchForm {
    pub fn build(self, id: String, created_at: DateTime<Utc>) -> Result<Match, ValidationError> {
        // Checked before anything else, so a same-team submission never reaches the store.
        if self.home_team_id.trim() == self.away_team_id.trim() {
            return Err(ValidationError::SameTeams);
        }

        let status = match optional_text(self.status) {
            None => MatchStatus::Upcoming,
            Some(s) => s.parse::<MatchStatus>().map_err(|e| ValidationError::Invalid {
                field: "status",
                message: e.to_string(),
            })?,
        };

        Ok(Match {
            id,
            home_team_id: required_text("home_team_id", &self.home_team_id)?,
            away_team_id: required_text("away_team_id", &self.away_team_id)?,
            home_score: stat(&self.home_score),
            away_score: stat(&self.away_score),
            match_date: parse_match_date(&self.match_date)?,
            status,
            venue: required_text("venue", &self.venue)?,
            league_id: optional_text(self.league_id),
            created_at,
        })
    }
}

/// What a panel shows after a successful mutation: the notice and the freshly
/// fetched list.
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome<T> {
    pub message: String,
    pub rows: Vec<T>,
}

impl<T> MutationOutcome<T> {
    fn new(message: &str, rows: Vec<T>) -> Self {
        Self {
            message: message.to_string(),
            rows,
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct AdminService {
    pool: SqlitePool,
    hub: ChangeHub,
}

impl AdminService {
    pub fn new(pool: SqlitePool, hub: ChangeHub) -> Self {
        Self { pool, hub }
    }

    fn announce(&self, table: Table, action: ChangeAction, id: &str) {
        tracing::info!("{:?} on {} ({})", action, table, id);
        self.hub.publish(TableChange {
            table,
            action,
            id: id.to_string(),
        });
    }

    /// Foreign keys rewrite child rows when a parent goes away. Watchers of
    /// those tables get a notice carrying the parent's id.
    fn announce_dependents(&self, parent_id: &str, dependents: &[(Table, ChangeAction)]) {
        for (table, action) in dependents {
            self.announce(*table, *action, parent_id);
        }
    }

    // ── Leagues ─────────────────────────────────────────────────────────────

    pub async fn list_leagues(&self) -> Result<Vec<League>, AdminError> {
        Ok(db::list_leagues(&self.pool).await?)
    }

    pub async fn create_league(&self, form: LeagueForm) -> Result<MutationOutcome<League>, AdminError> {
        let league = form.build(new_id(), Utc::now())?;
        db::insert_league(&self.pool, &league).await?;
        self.announce(Table::Leagues, ChangeAction::Insert, &league.id);
        Ok(MutationOutcome::new("League added successfully", self.list_leagues().await?))
    }

    pub async fn update_league(&self, id: &str, form: LeagueForm) -> Result<MutationOutcome<League>, AdminError> {
        let league = form.build(id.to_string(), Utc::now())?;
        if !db::update_league(&self.pool, &league).await? {
            return Err(AdminError::not_found("League", id));
        }
        self.announce(Table::Leagues, ChangeAction::Update, id);
        Ok(MutationOutcome::new("League updated successfully", self.list_leagues().await?))
    }

    pub async fn delete_league(&self, id: &str, confirmed: bool) -> Result<MutationOutcome<League>, AdminError> {
        if !confirmed {
            return Err(ValidationError::Unconfirmed.into());
        }
        if !db::delete_league(&self.pool, id).await? {
            return Err(AdminError::not_found("League", id));
        }
        self.announce(Table::Leagues, ChangeAction::Delete, id);
        self.announce_dependents(id, &[
            (Table::Teams, ChangeAction::Update),
            (Table::Matches, ChangeAction::Update),
        ]);
        Ok(MutationOutcome::new("League deleted successfully", self.list_leagues().await?))
    }

    // ── Teams ───────────────────────────────────────────────────────────────

    pub async fn list_teams(&self) -> Result<Vec<Team>, AdminError> {
        Ok(db::list_teams(&self.pool).await?)
    }

    pub async fn create_team(&self, form: TeamForm) -> Result<MutationOutcome<Team>, AdminError> {
        let team = form.build(new_id(), Utc::now())?;
        db::insert_team(&self.pool, &team).await?;
        self.announce(Table::Teams, ChangeAction::Insert, &team.id);
        Ok(MutationOutcome::new("Team added successfully", self.list_teams().await?))
    }

    pub async fn update_team(&self, id: &str, form: TeamForm) -> Result<MutationOutcome<Team>, AdminError> {
        let team = form.build(id.to_string(), Utc::now())?;
        if !db::update_team(&self.pool, &team).await? {
            return Err(AdminError::not_found("Team", id));
        }
        self.announce(Table::Teams, ChangeAction::Update, id);
        Ok(MutationOutcome::new("Team updated successfully", self.list_teams().await?))
    }

    pub async fn delete_team(&self, id: &str, confirmed: bool) -> Result<MutationOutcome<Team>, AdminError> {
        if !confirmed {
            return Err(ValidationError::Unconfirmed.into());
        }
        if !db::delete_team(&self.pool, id).await? {
            return Err(AdminError::not_found("Team", id));
        }
        self.announce(Table::Teams, ChangeAction::Delete, id);
        self.announce_dependents(id, &[
            (Table::Players, ChangeAction::Update),
            (Table::Managers, ChangeAction::Update),
            (Table::Matches, ChangeAction::Delete),
        ]);
        Ok(MutationOutcome::new("Team deleted successfully", self.list_teams().await?))
    }

    // ── Players ─────────────────────────────────────────────────────────────

    pub async fn list_players(&self) -> Result<Vec<Player>, AdminError> {
        Ok(db::list_players(&self.pool).await?)
    }

    pub async fn create_player(&self, form: PlayerForm) -> Result<MutationOutcome<Player>, AdminError> {
        let player = form.build(new_id(), Utc::now())?;
        db::insert_player(&self.pool, &player).await?;
        self.announce(Table::Players, ChangeAction::Insert, &player.id);
        Ok(MutationOutcome::new("Player added successfully", self.list_players().await?))
    }

    pub async fn update_player(&self, id: &str, form: PlayerForm) -> Result<MutationOutcome<Player>, AdminError> {
        let player = form.build(id.to_string(), Utc::now())?;
        if !db::update_player(&self.pool, &player).await? {
            return Err(AdminError::not_found("Player", id));
        }
        self.announce(Table::Players, ChangeAction::Update, id);
        Ok(MutationOutcome::new("Player updated successfully", self.list_players().await?))
    }

    pub async fn delete_player(&self, id: &str, confirmed: bool) -> Result<MutationOutcome<Player>, AdminError> {
        if !confirmed {
            return Err(ValidationError::Unconfirmed.into());
        }
        if !db::delete_player(&self.pool, id).await? {
            return Err(AdminError::not_found("Player", id));
        }
        self.announce(Table::Players, ChangeAction::Delete, id);
        Ok(MutationOutcome::new("Player deleted successfully", self.list_players().await?))
    }

    // ── Managers ────────────────────────────────────────────────────────────

    pub async fn list_managers(&self) -> Result<Vec<Manager>, AdminError> {
        Ok(db::list_managers(&self.pool).await?)
    }

    pub async fn create_manager(&self, form: ManagerForm) -> Result<MutationOutcome<Manager>, AdminError> {
        let manager = form.build(new_id(), Utc::now())?;
        db::insert_manager(&self.pool, &manager).await?;
        self.announce(Table::Managers, ChangeAction::Insert, &manager.id);
        Ok(MutationOutcome::new("Manager added successfully", self.list_managers().await?))
    }

    pub async fn update_manager(&self, id: &str, form: ManagerForm) -> Result<MutationOutcome<Manager>, AdminError> {
        let manager = form.build(id.to_string(), Utc::now())?;
        if !db::update_manager(&self.pool, &manager).await? {
            return Err(AdminError::not_found("Manager", id));
        }
        self.announce(Table::Managers, ChangeAction::Update, id);
        Ok(MutationOutcome::new("Manager updated successfully", self.list_managers().await?))
    }

    pub async fn delete_manager(&self, id: &str, confirmed: bool) -> Result<MutationOutcome<Manager>, AdminError> {
        if !confirmed {
            return Err(ValidationError::Unconfirmed.into());
        }
        if !db::delete_manager(&self.pool, id).await? {
            return Err(AdminError::not_found("Manager", id));
        }
        self.announce(Table::Managers, ChangeAction::Delete, id);
        Ok(MutationOutcome::new("Manager deleted successfully", self.list_managers().await?))
    }

    // ── Matches ─────────────────────────────────────────────────────────────

    pub async fn list_matches(&self) -> Result<Vec<MatchWithTeams>, AdminError> {
        Ok(db::list_matches(&self.pool).await?)
    }

    pub async fn create_match(&self, form: MatchForm) -> Result<MutationOutcome<MatchWithTeams>, AdminError> {
        let match_data = form.build(new_id(), Utc::now())?;
        db::insert_match(&self.pool, &match_data).await?;
        self.announce(Table::Matches, ChangeAction::Insert, &match_data.id);
        Ok(MutationOutcome::new("Match added successfully", self.list_matches().await?))
    }

    pub async fn update_match(&self, id: &str, form: MatchForm) -> Result<MutationOutcome<MatchWithTeams>, AdminError> {
        let match_data = form.build(id.to_string(), Utc::now())?;
        if !db::update_match(&self.pool, &match_data).await? {
            return Err(AdminError::not_found("Match", id));
        }
        self.announce(Table::Matches, ChangeAction::Update, id);
        Ok(MutationOutcome::new("Match updated successfully", self.list_matches().await?))
    }

    pub async fn delete_match(&self, id: &str, confirmed: bool) -> Result<MutationOutcome<MatchWithTeams>, AdminError> {
        if !confirmed {
            return Err(ValidationError::Unconfirmed.into());
        }
        if !db::delete_match(&self.pool, id).await? {
            return Err(AdminError::not_found("Match", id));
        }
        self.announce(Table::Matches, ChangeAction::Delete, id);
        Ok(MutationOutcome::new("Match deleted successfully", self.list_matches().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> AdminService {
        let pool = db::memory_pool().await.unwrap();
        AdminService::new(pool, ChangeHub::new())
    }

    fn league_form(name: &str) -> LeagueForm {
        LeagueForm {
            name: name.to_string(),
            country: "England".to_string(),
            season: "2025-26".to_string(),
            logo: None,
        }
    }

    fn team_form(name: &str) -> TeamForm {
        TeamForm {
            name: name.to_string(),
            stadium: format!("{} Stadium", name),
            ..Default::default()
        }
    }

    fn match_form(home: &str, away: &str) -> MatchForm {
        MatchForm {
            home_team_id: home.to_string(),
            away_team_id: away.to_string(),
            match_date: "2026-03-01T15:00".to_string(),
            venue: "Ground".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_form_number_parsing() {
        assert_eq!(FormNumber::Text("12".into()).as_i32(), Some(12));
        assert_eq!(FormNumber::Text(" 7.9 ".into()).as_i32(), Some(7));
        assert_eq!(FormNumber::Text("abc".into()).as_i32(), None);
        assert_eq!(FormNumber::Int(3).as_i32(), Some(3));
        assert_eq!(FormNumber::Text("8.5".into()).as_f64(), Some(8.5));
    }

    #[test]
    fn test_optional_stats_default_to_zero() {
        let form = TeamForm {
            wins: Some(FormNumber::Text("lots".into())),
            draws: Some(FormNumber::Text("2".into())),
            ..team_form("Rovers")
        };
        let team = form.build("t".into(), Utc::now()).unwrap();
        assert_eq!(team.wins, 0);
        assert_eq!(team.draws, 2);
        assert_eq!(team.points, 2);
    }

    #[test]
    fn test_required_fields() {
        let err = TeamForm {
            stadium: "   ".into(),
            ..team_form("Rovers")
        }
        .build("t".into(), Utc::now())
        .unwrap_err();
        assert_eq!(err, ValidationError::Required("stadium"));

        let err = league_form("").build("l".into(), Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::Required("name"));

        let err = PlayerForm {
            name: "Keeper".into(),
            jersey_number: Some(FormNumber::Text("one".into())),
            ..Default::default()
        }
        .build("p".into(), Utc::now())
        .unwrap_err();
        assert_eq!(err, ValidationError::NotANumber("jersey_number"));
    }

    #[test]
    fn test_manager_points_and_win_percentage_are_derived() {
        let manager = ManagerForm {
            name: "Boss".into(),
            nationality: "Spain".into(),
            age: Some(FormNumber::Int(52)),
            wins: Some(FormNumber::Int(6)),
            draws: Some(FormNumber::Int(2)),
            losses: Some(FormNumber::Int(2)),
            matches_managed: Some(FormNumber::Int(10)),
            ..Default::default()
        }
        .build("m".into(), Utc::now())
        .unwrap();
        assert_eq!(manager.points, 20);
        assert_eq!(manager.win_percentage, 60.0);
    }

    #[test]
    fn test_match_date_formats() {
        let local = parse_match_date("2026-03-01T15:00").unwrap();
        let rfc = parse_match_date("2026-03-01T15:00:00Z").unwrap();
        assert_eq!(local, rfc);
        assert!(matches!(parse_match_date("soon"), Err(ValidationError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_same_team_match_rejected_without_store_access() {
        let admin = service().await;
        // A closed pool fails any query, so a validation error proves no query ran.
        admin.pool.close().await;

        let err = admin.create_match(match_form("t1", "t1")).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(ValidationError::SameTeams)));
    }

    #[tokio::test]
    async fn test_create_then_list_shows_row() {
        let admin = service().await;
        let outcome = admin.create_league(league_form("Premier League")).await.unwrap();
        assert_eq!(outcome.message, "League added successfully");
        assert_eq!(outcome.rows.len(), 1);

        let listed = admin.list_leagues().await.unwrap();
        assert_eq!(listed[0].name, "Premier League");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation_and_removes_row() {
        let admin = service().await;
        let created = admin.create_team(team_form("Rovers")).await.unwrap();
        let id = created.rows[0].id.clone();

        let err = admin.delete_team(&id, false).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(ValidationError::Unconfirmed)));
        assert_eq!(admin.list_teams().await.unwrap().len(), 1);

        let outcome = admin.delete_team(&id, true).await.unwrap();
        assert!(outcome.rows.is_empty());
        assert!(admin.list_teams().await.unwrap().is_empty());

        let err = admin.delete_team(&id, true).await.unwrap_err();
        assert!(matches!(err, AdminError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let admin = service().await;
        let err = admin.update_league("missing", league_form("La Liga")).await.unwrap_err();
        assert!(matches!(err, AdminError::NotFound { entity: "League", .. }));
    }

    #[tokio::test]
    async fn test_match_round_trip_embeds_team_names() {
        let admin = service().await;
        admin.create_team(team_form("Alpha")).await.unwrap();
        let teams = admin.create_team(team_form("Beta")).await.unwrap().rows;
        // Listed by name.
        let (alpha, beta) = (&teams[0], &teams[1]);

        let outcome = admin.create_match(match_form(&alpha.id, &beta.id)).await.unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].home_team.name, "Alpha");
        assert_eq!(outcome.rows[0].away_team.name, "Beta");
        assert_eq!(outcome.rows[0].match_info.status, MatchStatus::Upcoming);
    }

    #[tokio::test]
    async fn test_store_errors_surface_message() {
        let admin = service().await;
        // Unknown team ids violate the foreign keys.
        let err = admin.create_match(match_form("ghost-a", "ghost-b")).await.unwrap_err();
        match err {
            AdminError::Store(e) => assert!(e.to_string().contains("FOREIGN KEY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mutations_publish_changes() {
        let admin = service().await;
        let mut rx = admin.hub.subscribe();
        admin.create_league(league_form("Serie A")).await.unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.table, Table::Leagues);
        assert_eq!(change.action, ChangeAction::Insert);
    }

    #[tokio::test]
    async fn test_team_delete_notifies_dependent_tables() {
        let admin = service().await;
        let team_id = admin.create_team(team_form("Rovers")).await.unwrap().rows[0].id.clone();
        admin
            .create_manager(ManagerForm {
                name: "Boss".into(),
                nationality: "Wales".into(),
                age: Some(FormNumber::Int(50)),
                team_id: Some(team_id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut rx = admin.hub.subscribe();
        admin.delete_team(&team_id, true).await.unwrap();

        let mut seen = Vec::new();
        while let Ok(change) = rx.try_recv() {
            seen.push((change.table, change.action));
        }
        assert!(seen.contains(&(Table::Teams, ChangeAction::Delete)));
        assert!(seen.contains(&(Table::Managers, ChangeAction::Update)));
        assert!(seen.contains(&(Table::Matches, ChangeAction::Delete)));

        let managers = admin.list_managers().await.unwrap();
        assert_eq!(managers[0].team_id, None);
    }
}
