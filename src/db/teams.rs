use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use super::timestamp;
use crate::models::Team;

fn team_from_row(row: &SqliteRow) -> Result<Team> {
    Ok(Team {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        stadium: row.try_get("stadium")?,
        founded: row.try_get("founded")?,
        logo: row.try_get("logo")?,
        league_id: row.try_get("league_id")?,
        wins: row.try_get("wins")?,
        draws: row.try_get("draws")?,
        losses: row.try_get("losses")?,
        goals_for: row.try_get("goals_for")?,
        goals_against: row.try_get("goals_against")?,
        points: row.try_get("points")?,
        created_at: timestamp(row, "created_at")?,
    })
}

pub async fn list_teams(pool: &SqlitePool) -> Result<Vec<Team>> {
    let rows = sqlx::query("SELECT * FROM teams ORDER BY name")
        .fetch_all(pool)
        .await?;
    rows.iter().map(team_from_row).collect()
}

pub async fn get_teams_by_league(pool: &SqlitePool, league_id: &str) -> Result<Vec<Team>> {
    let rows = sqlx::query("SELECT * FROM teams WHERE league_id = ? ORDER BY name")
        .bind(league_id)
        .fetch_all(pool)
        .await?;
    rows.iter().map(team_from_row).collect()
}

pub async fn get_team_by_id(pool: &SqlitePool, team_id: &str) -> Result<Option<Team>> {
    let row = sqlx::query("SELECT * FROM teams WHERE id = ?")
        .bind(team_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(team_from_row).transpose()
}

/// Case-insensitive substring search used by the CLI lookup.
pub async fn search_teams_by_name(pool: &SqlitePool, fragment: &str) -> Result<Vec<Team>> {
    let rows = sqlx::query("SELECT * FROM teams WHERE LOWER(name) LIKE LOWER(?) ORDER BY name")
        .bind(format!("%{}%", fragment))
        .fetch_all(pool)
        .await?;
    rows.iter().map(team_from_row).collect()
}

pub async fn insert_team<'e, E>(executor: E, team: &Team) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO teams
        (id, name, stadium, founded, logo, league_id, wins, draws, losses,
         goals_for, goals_against, points, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&team.id)
    .bind(&team.name)
    .bind(&team.stadium)
    .bind(team.founded)
    .bind(&team.logo)
    .bind(&team.league_id)
    .bind(team.wins)
    .bind(team.draws)
    .bind(team.losses)
    .bind(team.goals_for)
    .bind(team.goals_against)
    .bind(team.points)
    .bind(team.created_at.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn update_team(pool: &SqlitePool, team: &Team) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE teams SET
            name = ?, stadium = ?, founded = ?, logo = ?, league_id = ?,
            wins = ?, draws = ?, losses = ?, goals_for = ?, goals_against = ?, points = ?
        WHERE id = ?
        "#,
    )
    .bind(&team.name)
    .bind(&team.stadium)
    .bind(team.founded)
    .bind(&team.logo)
    .bind(&team.league_id)
    .bind(team.wins)
    .bind(team.draws)
    .bind(team.losses)
    .bind(team.goals_for)
    .bind(team.goals_against)
    .bind(team.points)
    .bind(&team.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_team(pool: &SqlitePool, team_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM teams WHERE id = ?")
        .bind(team_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
