use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use super::timestamp;
use crate::models::{Match, MatchStatus, MatchWithTeams, TeamRef};

// Every match read embeds both teams, the same shape the views render.
const MATCH_WITH_TEAMS: &str = r#"
    SELECT m.*,
           ht.name AS home_team_name, ht.logo AS home_team_logo,
           at.name AS away_team_name, at.logo AS away_team_logo
    FROM matches m
    JOIN teams ht ON ht.id = m.home_team_id
    JOIN teams at ON at.id = m.away_team_id
"#;

fn match_from_row(row: &SqliteRow) -> Result<MatchWithTeams> {
    let status: String = row.try_get("status")?;
    let match_info = Match {
        id: row.try_get("id")?,
        home_team_id: row.try_get("home_team_id")?,
        away_team_id: row.try_get("away_team_id")?,
        home_score: row.try_get("home_score")?,
        away_score: row.try_get("away_score")?,
        match_date: timestamp(row, "match_date")?,
        status: status.parse::<MatchStatus>()?,
        venue: row.try_get("venue")?,
        league_id: row.try_get("league_id")?,
        created_at: timestamp(row, "created_at")?,
    };

    Ok(MatchWithTeams {
        home_team: TeamRef {
            id: match_info.home_team_id.clone(),
            name: row.try_get("home_team_name")?,
            logo: row.try_get("home_team_logo")?,
        },
        away_team: TeamRef {
            id: match_info.away_team_id.clone(),
            name: row.try_get("away_team_name")?,
            logo: row.try_get("away_team_logo")?,
        },
        match_info,
    })
}

/// All matches, latest first.
pub async fn list_matches(pool: &SqlitePool) -> Result<Vec<MatchWithTeams>> {
    let query = format!("{} ORDER BY m.match_date DESC", MATCH_WITH_TEAMS);
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    rows.iter().map(match_from_row).collect()
}

pub async fn get_match_by_id(pool: &SqlitePool, match_id: &str) -> Result<Option<MatchWithTeams>> {
    let query = format!("{} WHERE m.id = ?", MATCH_WITH_TEAMS);
    let row = sqlx::query(&query)
        .bind(match_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(match_from_row).transpose()
}

pub async fn get_matches_by_status(pool: &SqlitePool, status: MatchStatus) -> Result<Vec<MatchWithTeams>> {
    let query = format!("{} WHERE m.status = ? ORDER BY m.match_date DESC", MATCH_WITH_TEAMS);
    let rows = sqlx::query(&query)
        .bind(status.as_str())
        .fetch_all(pool)
        .await?;
    rows.iter().map(match_from_row).collect()
}

/// Next `limit` upcoming fixtures, soonest first.
pub async fn get_upcoming_matches(pool: &SqlitePool, limit: i64) -> Result<Vec<MatchWithTeams>> {
    let query = format!(
        "{} WHERE m.status = 'upcoming' ORDER BY m.match_date ASC LIMIT ?",
        MATCH_WITH_TEAMS
    );
    let rows = sqlx::query(&query).bind(limit).fetch_all(pool).await?;
    rows.iter().map(match_from_row).collect()
}

pub async fn get_team_recent_matches(pool: &SqlitePool, team_id: &str, limit: i64) -> Result<Vec<MatchWithTeams>> {
    let query = format!(
        r#"{} WHERE (m.home_team_id = ? OR m.away_team_id = ?)
           ORDER BY m.match_date DESC LIMIT ?"#,
        MATCH_WITH_TEAMS
    );
    let rows = sqlx::query(&query)
        .bind(team_id)
        .bind(team_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    rows.iter().map(match_from_row).collect()
}

/// Latest finished matches a team played, newest first.
pub async fn get_team_finished_matches(pool: &SqlitePool, team_id: &str, limit: i64) -> Result<Vec<MatchWithTeams>> {
    let query = format!(
        r#"{} WHERE m.status = 'finished' AND (m.home_team_id = ? OR m.away_team_id = ?)
           ORDER BY m.match_date DESC LIMIT ?"#,
        MATCH_WITH_TEAMS
    );
    let rows = sqlx::query(&query)
        .bind(team_id)
        .bind(team_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    rows.iter().map(match_from_row).collect()
}

pub async fn get_finished_matches_by_league(pool: &SqlitePool, league_id: &str) -> Result<Vec<MatchWithTeams>> {
    let query = format!(
        "{} WHERE m.status = 'finished' AND m.league_id = ? ORDER BY m.match_date DESC",
        MATCH_WITH_TEAMS
    );
    let rows = sqlx::query(&query)
        .bind(league_id)
        .fetch_all(pool)
        .await?;
    rows.iter().map(match_from_row).collect()
}

pub async fn insert_match<'e, E>(executor: E, match_data: &Match) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO matches
        (id, home_team_id, away_team_id, home_score, away_score, match_date,
         status, venue, league_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&match_data.id)
    .bind(&match_data.home_team_id)
    .bind(&match_data.away_team_id)
    .bind(match_data.home_score)
    .bind(match_data.away_score)
    .bind(match_data.match_date.to_rfc3339())
    .bind(match_data.status.as_str())
    .bind(&match_data.venue)
    .bind(&match_data.league_id)
    .bind(match_data.created_at.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn update_match(pool: &SqlitePool, match_data: &Match) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE matches SET
            home_team_id = ?, away_team_id = ?, home_score = ?, away_score = ?,
            match_date = ?, status = ?, venue = ?, league_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&match_data.home_team_id)
    .bind(&match_data.away_team_id)
    .bind(match_data.home_score)
    .bind(match_data.away_score)
    .bind(match_data.match_date.to_rfc3339())
    .bind(match_data.status.as_str())
    .bind(&match_data.venue)
    .bind(&match_data.league_id)
    .bind(&match_data.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_match(pool: &SqlitePool, match_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM matches WHERE id = ?")
        .bind(match_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
