use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use super::timestamp;
use crate::models::League;

fn league_from_row(row: &SqliteRow) -> Result<League> {
    Ok(League {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        country: row.try_get("country")?,
        season: row.try_get("season")?,
        logo: row.try_get("logo")?,
        created_at: timestamp(row, "created_at")?,
    })
}

pub async fn list_leagues(pool: &SqlitePool) -> Result<Vec<League>> {
    let rows = sqlx::query("SELECT * FROM leagues ORDER BY name")
        .fetch_all(pool)
        .await?;
    rows.iter().map(league_from_row).collect()
}

pub async fn find_league_by_name(pool: &SqlitePool, name: &str) -> Result<Option<League>> {
    let row = sqlx::query("SELECT * FROM leagues WHERE LOWER(name) = LOWER(?) LIMIT 1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(league_from_row).transpose()
}

pub async fn insert_league<'e, E>(executor: E, league: &League) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO leagues (id, name, country, season, logo, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&league.id)
    .bind(&league.name)
    .bind(&league.country)
    .bind(&league.season)
    .bind(&league.logo)
    .bind(league.created_at.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

/// Returns false when no row has the league's id.
pub async fn update_league(pool: &SqlitePool, league: &League) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE leagues SET name = ?, country = ?, season = ?, logo = ? WHERE id = ?",
    )
    .bind(&league.name)
    .bind(&league.country)
    .bind(&league.season)
    .bind(&league.logo)
    .bind(&league.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_league(pool: &SqlitePool, league_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM leagues WHERE id = ?")
        .bind(league_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
