use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use super::{insert_league, insert_manager, insert_match, insert_player, insert_team};
use crate::models::{League, Manager, Match, MatchStatus, Player, Position, Team};
use crate::services::stats::{league_points, win_percentage};

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

pub async fn seed_data(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leagues")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::info!("Database already seeded ({} leagues found), skipping.", count);
        return Ok(());
    }

    tracing::info!("Seeding database with demo league data...");

    // A partial seed would make every later run skip, so it is all or nothing.
    let mut tx = pool.begin().await?;
    seed_leagues(&mut tx).await?;
    seed_teams(&mut tx).await?;
    seed_players(&mut tx).await?;
    seed_managers(&mut tx).await?;
    seed_matches(&mut tx).await?;
    tx.commit().await?;

    tracing::info!("Database seeded successfully.");
    Ok(())
}

async fn seed_leagues(conn: &mut SqliteConnection) -> Result<()> {
    let now = Utc::now();
    let leagues = [
        ("pl", "Premier League", "England"),
        ("laliga", "La Liga", "Spain"),
    ];

    for (id, name, country) in leagues {
        insert_league(&mut *conn, &League {
            id: id.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            season: "2025-26".to_string(),
            logo: None,
            created_at: now,
        })
        .await?;
    }
    Ok(())
}

async fn seed_teams(conn: &mut SqliteConnection) -> Result<()> {
    let now = Utc::now();

    // (id, league, name, stadium, founded, wins, draws, losses, goals_for, goals_against)
    let teams: Vec<(&str, &str, &str, &str, i32, i32, i32, i32, i32, i32)> = vec![
        ("ars", "pl", "Arsenal", "Emirates Stadium", 1886, 18, 4, 4, 58, 26),
        ("liv", "pl", "Liverpool", "Anfield", 1892, 19, 3, 4, 62, 29),
        ("mci", "pl", "Manchester City", "Etihad Stadium", 1880, 17, 5, 4, 55, 30),
        ("che", "pl", "Chelsea", "Stamford Bridge", 1905, 14, 6, 6, 52, 38),
        ("avl", "pl", "Aston Villa", "Villa Park", 1874, 14, 5, 7, 47, 40),
        ("tot", "pl", "Tottenham Hotspur", "Tottenham Hotspur Stadium", 1882, 13, 6, 7, 49, 44),
        ("rma", "laliga", "Real Madrid", "Santiago Bernabeu", 1902, 20, 4, 2, 61, 21),
        ("fcb", "laliga", "Barcelona", "Estadi Olimpic", 1899, 19, 4, 3, 66, 28),
        ("atm", "laliga", "Atletico Madrid", "Metropolitano", 1903, 16, 6, 4, 45, 22),
        ("ath", "laliga", "Athletic Club", "San Mames", 1898, 13, 8, 5, 39, 27),
    ];

    for (id, league, name, stadium, founded, w, d, l, gf, ga) in teams {
        insert_team(&mut *conn, &Team {
            id: id.to_string(),
            name: name.to_string(),
            stadium: stadium.to_string(),
            founded: Some(founded),
            logo: None,
            league_id: Some(league.to_string()),
            wins: w,
            draws: d,
            losses: l,
            goals_for: gf,
            goals_against: ga,
            points: league_points(w, d, l),
            created_at: now,
        })
        .await?;
    }
    Ok(())
}

async fn seed_players(conn: &mut SqliteConnection) -> Result<()> {
    let now = Utc::now();

    // (id, team, name, position, number, goals, assists, rating, appearances)
    let players: Vec<(&str, &str, &str, Position, i32, i32, i32, f64, i32)> = vec![
        ("p1", "ars", "Bukayo Saka", Position::Forward, 7, 12, 10, 7.8, 25),
        ("p2", "ars", "Martin Odegaard", Position::Midfielder, 8, 6, 11, 7.6, 24),
        ("p3", "ars", "David Raya", Position::Goalkeeper, 22, 0, 0, 7.1, 26),
        ("p4", "liv", "Mohamed Salah", Position::Forward, 11, 19, 12, 8.1, 26),
        ("p5", "liv", "Virgil van Dijk", Position::Defender, 4, 3, 1, 7.4, 26),
        ("p6", "mci", "Erling Haaland", Position::Forward, 9, 22, 4, 7.9, 25),
        ("p7", "mci", "Phil Foden", Position::Midfielder, 47, 8, 7, 7.3, 23),
        ("p8", "che", "Cole Palmer", Position::Midfielder, 10, 14, 8, 7.7, 26),
        ("p9", "avl", "Ollie Watkins", Position::Forward, 11, 13, 6, 7.2, 26),
        ("p10", "tot", "Son Heung-min", Position::Forward, 7, 10, 7, 7.2, 24),
        ("p11", "rma", "Kylian Mbappe", Position::Forward, 9, 21, 5, 8.0, 25),
        ("p12", "rma", "Jude Bellingham", Position::Midfielder, 5, 9, 8, 7.6, 24),
        ("p13", "fcb", "Robert Lewandowski", Position::Forward, 9, 18, 3, 7.5, 25),
        ("p14", "fcb", "Lamine Yamal", Position::Forward, 19, 9, 13, 7.9, 26),
        ("p15", "atm", "Antoine Griezmann", Position::Forward, 7, 11, 6, 7.4, 26),
        ("p16", "ath", "Nico Williams", Position::Forward, 10, 7, 9, 7.3, 25),
    ];

    for (id, team, name, position, number, goals, assists, rating, apps) in players {
        insert_player(&mut *conn, &Player {
            id: id.to_string(),
            name: name.to_string(),
            position,
            jersey_number: number,
            team_id: Some(team.to_string()),
            goals,
            assists,
            rating,
            appearances: apps,
            created_at: now,
        })
        .await?;
    }
    Ok(())
}

async fn seed_managers(conn: &mut SqliteConnection) -> Result<()> {
    let now = Utc::now();

    // (id, team, name, nationality, age, wins, draws, losses, matches_managed)
    let managers: Vec<(&str, &str, &str, &str, i32, i32, i32, i32, i32)> = vec![
        ("m1", "ars", "Mikel Arteta", "Spain", 43, 18, 4, 4, 26),
        ("m2", "liv", "Arne Slot", "Netherlands", 47, 19, 3, 4, 26),
        ("m3", "mci", "Pep Guardiola", "Spain", 54, 17, 5, 4, 26),
        ("m4", "che", "Enzo Maresca", "Italy", 45, 14, 6, 6, 26),
        ("m5", "rma", "Xabi Alonso", "Spain", 43, 20, 4, 2, 26),
        ("m6", "fcb", "Hansi Flick", "Germany", 60, 19, 4, 3, 26),
    ];

    for (id, team, name, nationality, age, w, d, l, managed) in managers {
        insert_manager(&mut *conn, &Manager {
            id: id.to_string(),
            name: name.to_string(),
            photo_url: None,
            nationality: nationality.to_string(),
            age,
            team_id: Some(team.to_string()),
            wins: w,
            draws: d,
            losses: l,
            points: league_points(w, d, l),
            matches_managed: managed,
            win_percentage: win_percentage(w, managed),
            created_at: now,
        })
        .await?;
    }
    Ok(())
}

async fn seed_matches(conn: &mut SqliteConnection) -> Result<()> {
    let now = Utc::now();

    // (id, league, home, away, date, home_score, away_score, status, venue)
    let matches: Vec<(&str, &str, &str, &str, &str, i32, i32, MatchStatus, &str)> = vec![
        ("pl_1", "pl", "ars", "tot", "2025-09-14T15:30:00Z", 3, 2, MatchStatus::Finished, "Emirates Stadium"),
        ("pl_2", "pl", "liv", "mci", "2025-11-23T15:30:00Z", 3, 2, MatchStatus::Finished, "Anfield"),
        ("pl_3", "pl", "che", "ars", "2025-10-19T15:30:00Z", 1, 2, MatchStatus::Finished, "Stamford Bridge"),
        ("pl_4", "pl", "mci", "liv", "2025-12-26T12:30:00Z", 2, 1, MatchStatus::Finished, "Etihad Stadium"),
        ("pl_5", "pl", "avl", "che", "2026-01-04T14:00:00Z", 2, 2, MatchStatus::Finished, "Villa Park"),
        ("pl_6", "pl", "tot", "avl", "2026-02-01T14:00:00Z", 0, 1, MatchStatus::Finished, "Tottenham Hotspur Stadium"),
        ("pl_7", "pl", "ars", "liv", "2026-02-22T16:30:00Z", 1, 1, MatchStatus::Live, "Emirates Stadium"),
        ("pl_8", "pl", "mci", "che", "2026-03-01T15:00:00Z", 0, 0, MatchStatus::Upcoming, "Etihad Stadium"),
        ("pl_9", "pl", "tot", "ars", "2026-03-08T14:00:00Z", 0, 0, MatchStatus::Upcoming, "Tottenham Hotspur Stadium"),
        ("ll_1", "laliga", "rma", "fcb", "2025-10-26T15:15:00Z", 2, 1, MatchStatus::Finished, "Santiago Bernabeu"),
        ("ll_2", "laliga", "atm", "ath", "2025-11-30T20:00:00Z", 1, 0, MatchStatus::Finished, "Metropolitano"),
        ("ll_3", "laliga", "fcb", "atm", "2026-01-18T20:00:00Z", 3, 1, MatchStatus::Finished, "Estadi Olimpic"),
        ("ll_4", "laliga", "ath", "rma", "2026-03-02T20:00:00Z", 0, 0, MatchStatus::Upcoming, "San Mames"),
    ];

    for (id, league, home, away, date, hs, as_, status, venue) in matches {
        insert_match(&mut *conn, &Match {
            id: id.to_string(),
            home_team_id: home.to_string(),
            away_team_id: away.to_string(),
            home_score: hs,
            away_score: as_,
            match_date: parse_date(date)?,
            status,
            venue: venue.to_string(),
            league_id: Some(league.to_string()),
            created_at: now,
        })
        .await?;
    }
    Ok(())
}
