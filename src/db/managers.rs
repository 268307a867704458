use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use super::timestamp;
use crate::models::Manager;

fn manager_from_row(row: &SqliteRow) -> Result<Manager> {
    Ok(Manager {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        photo_url: row.try_get("photo_url")?,
        nationality: row.try_get("nationality")?,
        age: row.try_get("age")?,
        team_id: row.try_get("team_id")?,
        wins: row.try_get("wins")?,
        draws: row.try_get("draws")?,
        losses: row.try_get("losses")?,
        points: row.try_get("points")?,
        matches_managed: row.try_get("matches_managed")?,
        win_percentage: row.try_get("win_percentage")?,
        created_at: timestamp(row, "created_at")?,
    })
}

/// Ordered by points, highest first, as the managers table is ranked.
pub async fn list_managers(pool: &SqlitePool) -> Result<Vec<Manager>> {
    let rows = sqlx::query("SELECT * FROM managers ORDER BY points DESC, name ASC")
        .fetch_all(pool)
        .await?;
    rows.iter().map(manager_from_row).collect()
}

/// One manager per team is a convention only; the earliest created wins.
pub async fn get_manager_by_team(pool: &SqlitePool, team_id: &str) -> Result<Option<Manager>> {
    let row = sqlx::query("SELECT * FROM managers WHERE team_id = ? ORDER BY created_at LIMIT 1")
        .bind(team_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(manager_from_row).transpose()
}

pub async fn insert_manager<'e, E>(executor: E, manager: &Manager) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO managers
        (id, name, photo_url, nationality, age, team_id, wins, draws, losses,
         points, matches_managed, win_percentage, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&manager.id)
    .bind(&manager.name)
    .bind(&manager.photo_url)
    .bind(&manager.nationality)
    .bind(manager.age)
    .bind(&manager.team_id)
    .bind(manager.wins)
    .bind(manager.draws)
    .bind(manager.losses)
    .bind(manager.points)
    .bind(manager.matches_managed)
    .bind(manager.win_percentage)
    .bind(manager.created_at.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn update_manager(pool: &SqlitePool, manager: &Manager) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE managers SET
            name = ?, photo_url = ?, nationality = ?, age = ?, team_id = ?,
            wins = ?, draws = ?, losses = ?, points = ?, matches_managed = ?, win_percentage = ?
        WHERE id = ?
        "#,
    )
    .bind(&manager.name)
    .bind(&manager.photo_url)
    .bind(&manager.nationality)
    .bind(manager.age)
    .bind(&manager.team_id)
    .bind(manager.wins)
    .bind(manager.draws)
    .bind(manager.losses)
    .bind(manager.points)
    .bind(manager.matches_managed)
    .bind(manager.win_percentage)
    .bind(&manager.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_manager(pool: &SqlitePool, manager_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM managers WHERE id = ?")
        .bind(manager_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
