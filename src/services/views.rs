use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::db::{self, PlayerStat};
use crate::models::{League, Manager, MatchWithTeams, Player, Team};
use crate::services::stats::{self, FormResult, MatchBuckets, StandingRow, FORM_LENGTH, TOP_LIST_LIMIT};

const UPCOMING_LIMIT: i64 = 5;
const RECENT_MATCHES_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub standings: Vec<StandingRow>,
    pub top_scorers: Vec<Player>,
    pub top_assists: Vec<Player>,
    pub upcoming: Vec<MatchWithTeams>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StandingsView {
    pub leagues: Vec<League>,
    pub selected_league: Option<League>,
    pub table: Vec<StandingRow>,
}

#[derive(Debug, Serialize)]
pub struct TeamDetails {
    pub team: Team,
    pub games_played: i32,
    pub goal_difference: String,
    pub players: Vec<Player>,
    pub manager: Option<Manager>,
    pub recent_matches: Vec<MatchWithTeams>,
    pub form: Vec<FormResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerRow {
    #[serde(flatten)]
    pub manager: Manager,
    pub team_name: Option<String>,
}

/// Home screen: overall table, scoring leaders and the next fixtures.
pub async fn dashboard(pool: &SqlitePool) -> Result<Dashboard> {
    let limit = TOP_LIST_LIMIT as i64;
    let (teams, matches, scorers, assisters, upcoming) = tokio::try_join!(
        db::list_teams(pool),
        db::get_matches_by_status(pool, crate::models::MatchStatus::Finished),
        db::top_players_by(pool, PlayerStat::Goals, limit),
        db::top_players_by(pool, PlayerStat::Assists, limit),
        db::get_upcoming_matches(pool, UPCOMING_LIMIT),
    )?;

    let forms = stats::forms_for(&teams, &matches);
    Ok(Dashboard {
        standings: stats::standings(teams, &forms),
        top_scorers: stats::top_players(scorers, PlayerStat::Goals, TOP_LIST_LIMIT),
        top_assists: stats::top_players(assisters, PlayerStat::Assists, TOP_LIST_LIMIT),
        upcoming,
    })
}

/// Table for one league. Without a selection the first league by name is used.
/// An unknown id yields `Ok(None)`.
pub async fn standings(pool: &SqlitePool, league_id: Option<&str>) -> Result<Option<StandingsView>> {
    let leagues = db::list_leagues(pool).await?;

    let selected = match league_id {
        Some(id) => match leagues.iter().find(|l| l.id == id) {
            Some(league) => Some(league.clone()),
            None => return Ok(None),
        },
        None => leagues.first().cloned(),
    };

    let table = match &selected {
        Some(league) => {
            let (teams, matches) = tokio::try_join!(
                db::get_teams_by_league(pool, &league.id),
                db::get_finished_matches_by_league(pool, &league.id),
            )?;
            let forms = stats::forms_for(&teams, &matches);
            stats::standings(teams, &forms)
        }
        None => Vec::new(),
    };

    Ok(Some(StandingsView {
        leagues,
        selected_league: selected,
        table,
    }))
}

pub async fn matches_overview(pool: &SqlitePool) -> Result<MatchBuckets> {
    let matches = db::list_matches(pool).await?;
    Ok(stats::bucket_matches(matches))
}

pub async fn match_details(pool: &SqlitePool, match_id: &str) -> Result<Option<MatchWithTeams>> {
    db::get_match_by_id(pool, match_id).await
}

/// Team page. All reads run concurrently and nothing is returned until
/// every one of them has resolved. Form comes from finished matches only, so
/// scheduled fixtures never crowd results out of it.
pub async fn team_details(pool: &SqlitePool, team_id: &str) -> Result<Option<TeamDetails>> {
    let (team, players, manager, recent_matches, finished) = tokio::try_join!(
        db::get_team_by_id(pool, team_id),
        db::get_players_by_team(pool, team_id),
        db::get_manager_by_team(pool, team_id),
        db::get_team_recent_matches(pool, team_id, RECENT_MATCHES_LIMIT),
        db::get_team_finished_matches(pool, team_id, FORM_LENGTH as i64),
    )?;

    let Some(team) = team else {
        return Ok(None);
    };

    let form = stats::recent_form(team_id, &finished, FORM_LENGTH);
    Ok(Some(TeamDetails {
        games_played: stats::games_played(team.wins, team.draws, team.losses),
        goal_difference: stats::format_signed(stats::goal_difference(team.goals_for, team.goals_against)),
        team,
        players,
        manager,
        recent_matches,
        form,
    }))
}

/// Managers ranked by points, each with the name of the team they manage.
pub async fn managers(pool: &SqlitePool) -> Result<Vec<ManagerRow>> {
    let (managers, teams) = tokio::try_join!(db::list_managers(pool), db::list_teams(pool))?;
    let names: HashMap<String, String> = teams.into_iter().map(|t| (t.id, t.name)).collect();

    Ok(managers
        .into_iter()
        .map(|manager| ManagerRow {
            team_name: manager.team_id.as_ref().and_then(|id| names.get(id).cloned()),
            manager,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::admin::{AdminService, FormNumber, LeagueForm, ManagerForm, MatchForm, PlayerForm, TeamForm};
    use crate::services::events::ChangeHub;

    async fn seeded() -> (SqlitePool, AdminService) {
        let pool = db::memory_pool().await.unwrap();
        let admin = AdminService::new(pool.clone(), ChangeHub::new());
        (pool, admin)
    }

    fn team(name: &str, league_id: &str, w: i64, d: i64, l: i64, gf: i64, ga: i64) -> TeamForm {
        TeamForm {
            name: name.to_string(),
            stadium: "Park".to_string(),
            league_id: Some(league_id.to_string()),
            wins: Some(FormNumber::Int(w)),
            draws: Some(FormNumber::Int(d)),
            losses: Some(FormNumber::Int(l)),
            goals_for: Some(FormNumber::Int(gf)),
            goals_against: Some(FormNumber::Int(ga)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_standings_scoped_to_league_with_computed_form() {
        let (pool, admin) = seeded().await;
        let league = admin
            .create_league(LeagueForm {
                name: "Premier League".into(),
                country: "England".into(),
                season: "2025-26".into(),
                logo: None,
            })
            .await
            .unwrap()
            .rows
            .remove(0);

        admin.create_team(team("B", &league.id, 7, 3, 2, 18, 9)).await.unwrap();
        let teams = admin.create_team(team("A", &league.id, 8, 2, 2, 20, 10)).await.unwrap().rows;
        admin.create_team(team("Elsewhere", "", 20, 0, 0, 50, 0)).await.unwrap();

        let (a, b) = (&teams[0], &teams[1]);
        admin
            .create_match(MatchForm {
                home_team_id: b.id.clone(),
                away_team_id: a.id.clone(),
                home_score: Some(FormNumber::Int(0)),
                away_score: Some(FormNumber::Int(2)),
                match_date: "2025-09-01T15:00:00Z".into(),
                status: Some("finished".into()),
                venue: "Park".into(),
                league_id: Some(league.id.clone()),
            })
            .await
            .unwrap();

        let view = standings(&pool, None).await.unwrap().unwrap();
        assert_eq!(view.selected_league.unwrap().id, league.id);
        assert_eq!(view.table.len(), 2);
        assert_eq!(view.table[0].team.name, "A");
        assert_eq!(view.table[0].team.points, 26);
        assert_eq!(view.table[0].games_played, 12);
        assert_eq!(view.table[0].goal_difference_display, "+10");
        assert_eq!(view.table[0].form, vec![FormResult::W]);
        assert_eq!(view.table[1].form, vec![FormResult::L]);

        assert!(standings(&pool, Some("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_team_details_assembles_all_parts() {
        let (pool, admin) = seeded().await;
        let team_id = admin.create_team(team("Rovers", "", 1, 0, 0, 2, 0)).await.unwrap().rows[0].id.clone();

        for (name, number) in [("Striker", 9), ("Keeper", 1)] {
            admin
                .create_player(PlayerForm {
                    name: name.into(),
                    jersey_number: Some(FormNumber::Int(number)),
                    team_id: Some(team_id.clone()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        admin
            .create_manager(ManagerForm {
                name: "Boss".into(),
                nationality: "Scotland".into(),
                age: Some(FormNumber::Text("55".into())),
                team_id: Some(team_id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        let details = team_details(&pool, &team_id).await.unwrap().unwrap();
        assert_eq!(details.players[0].name, "Keeper");
        assert_eq!(details.manager.unwrap().name, "Boss");
        assert_eq!(details.goal_difference, "+2");
        assert_eq!(details.games_played, 1);

        assert!(team_details(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_team_form_ignores_scheduled_fixtures() {
        let (pool, admin) = seeded().await;
        admin.create_team(team("Alpha", "", 5, 0, 0, 10, 0)).await.unwrap();
        let teams = admin.create_team(team("Beta", "", 0, 0, 5, 0, 10)).await.unwrap().rows;
        let (alpha, beta) = (teams[0].id.clone(), teams[1].id.clone());

        let fixture = |day: u32, status: &str, score: i64| MatchForm {
            home_team_id: alpha.clone(),
            away_team_id: beta.clone(),
            home_score: Some(FormNumber::Int(score)),
            away_score: Some(FormNumber::Int(0)),
            match_date: format!("2025-10-{:02}T15:00:00Z", day),
            status: Some(status.into()),
            venue: "Park".into(),
            league_id: None,
        };
        for day in 1..=5 {
            admin.create_match(fixture(day, "finished", 2)).await.unwrap();
        }
        for day in 20..=22 {
            admin.create_match(fixture(day, "upcoming", 0)).await.unwrap();
        }

        let details = team_details(&pool, &alpha).await.unwrap().unwrap();
        assert_eq!(details.form, vec![FormResult::W; 5]);

        let board = dashboard(&pool).await.unwrap();
        let row = board.standings.iter().find(|r| r.team.id == alpha).unwrap();
        assert_eq!(row.form, details.form);
    }

    #[tokio::test]
    async fn test_managers_joined_with_team_names() {
        let (pool, admin) = seeded().await;
        let team_id = admin.create_team(team("Rovers", "", 0, 0, 0, 0, 0)).await.unwrap().rows[0].id.clone();
        for (name, wins, team) in [("Low", 1, None), ("High", 5, Some(team_id.clone()))] {
            admin
                .create_manager(ManagerForm {
                    name: name.into(),
                    nationality: "Wales".into(),
                    age: Some(FormNumber::Int(50)),
                    team_id: team,
                    wins: Some(FormNumber::Int(wins)),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let rows = managers(&pool).await.unwrap();
        assert_eq!(rows[0].manager.name, "High");
        assert_eq!(rows[0].team_name.as_deref(), Some("Rovers"));
        assert_eq!(rows[1].team_name, None);
    }
}
