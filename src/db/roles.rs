use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::models::UserRole;

pub async fn grant_role(pool: &SqlitePool, user_id: &str, role: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;

    tracing::info!("Granted role '{}' to user {}", role, user_id);
    Ok(())
}

pub async fn has_role(pool: &SqlitePool, user_id: &str, role: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE user_id = ? AND role = ?")
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn roles_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<UserRole>> {
    let rows = sqlx::query("SELECT user_id, role FROM user_roles WHERE user_id = ? ORDER BY role")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|r| UserRole {
            user_id: r.get("user_id"),
            role: r.get("role"),
        })
        .collect())
}
