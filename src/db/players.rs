use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use super::timestamp;
use crate::models::{Player, Position};

/// Player counters that can be ranked with a `> 0` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStat {
    Goals,
    Assists,
}

impl PlayerStat {
    pub fn column(&self) -> &'static str {
        match self {
            PlayerStat::Goals => "goals",
            PlayerStat::Assists => "assists",
        }
    }

    pub fn value(&self, player: &Player) -> i32 {
        match self {
            PlayerStat::Goals => player.goals,
            PlayerStat::Assists => player.assists,
        }
    }
}

fn player_from_row(row: &SqliteRow) -> Result<Player> {
    let position: String = row.try_get("position")?;
    Ok(Player {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        position: position.parse::<Position>()?,
        jersey_number: row.try_get("jersey_number")?,
        team_id: row.try_get("team_id")?,
        goals: row.try_get("goals")?,
        assists: row.try_get("assists")?,
        rating: row.try_get("rating")?,
        appearances: row.try_get("appearances")?,
        created_at: timestamp(row, "created_at")?,
    })
}

pub async fn list_players(pool: &SqlitePool) -> Result<Vec<Player>> {
    let rows = sqlx::query("SELECT * FROM players ORDER BY name")
        .fetch_all(pool)
        .await?;
    rows.iter().map(player_from_row).collect()
}

pub async fn get_players_by_team(pool: &SqlitePool, team_id: &str) -> Result<Vec<Player>> {
    let rows = sqlx::query("SELECT * FROM players WHERE team_id = ? ORDER BY jersey_number ASC")
        .bind(team_id)
        .fetch_all(pool)
        .await?;
    rows.iter().map(player_from_row).collect()
}

/// Players with `stat > 0`, highest first, at most `limit` rows.
pub async fn top_players_by(pool: &SqlitePool, stat: PlayerStat, limit: i64) -> Result<Vec<Player>> {
    // The column name comes from a closed enum, never from user input.
    let query = format!(
        "SELECT * FROM players WHERE {col} > 0 ORDER BY {col} DESC, name ASC LIMIT ?",
        col = stat.column()
    );
    let rows = sqlx::query(&query).bind(limit).fetch_all(pool).await?;
    rows.iter().map(player_from_row).collect()
}

pub async fn insert_player<'e, E>(executor: E, player: &Player) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO players
        (id, name, position, jersey_number, team_id, goals, assists, rating, appearances, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&player.id)
    .bind(&player.name)
    .bind(player.position.as_str())
    .bind(player.jersey_number)
    .bind(&player.team_id)
    .bind(player.goals)
    .bind(player.assists)
    .bind(player.rating)
    .bind(player.appearances)
    .bind(player.created_at.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn update_player(pool: &SqlitePool, player: &Player) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE players SET
            name = ?, position = ?, jersey_number = ?, team_id = ?,
            goals = ?, assists = ?, rating = ?, appearances = ?
        WHERE id = ?
        "#,
    )
    .bind(&player.name)
    .bind(player.position.as_str())
    .bind(player.jersey_number)
    .bind(&player.team_id)
    .bind(player.goals)
    .bind(player.assists)
    .bind(player.rating)
    .bind(player.appearances)
    .bind(&player.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_player(pool: &SqlitePool, player_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM players WHERE id = ?")
        .bind(player_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
