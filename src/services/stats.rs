//! Display values derived from stored counters. Nothing here touches the store.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::db::PlayerStat;
use crate::models::{MatchStatus, MatchWithTeams, Player, Team};

pub const TOP_LIST_LIMIT: usize = 10;
pub const FORM_LENGTH: usize = 5;

pub fn games_played(wins: i32, draws: i32, losses: i32) -> i32 {
    wins + draws + losses
}

pub fn goal_difference(goals_for: i32, goals_against: i32) -> i32 {
    goals_for - goals_against
}

/// Standard 3/1/0 scoring.
pub fn league_points(wins: i32, draws: i32, _losses: i32) -> i32 {
    wins * 3 + draws
}

/// `+` only for positive values: "+5", "0", "-3".
pub fn format_signed(value: i32) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Share of managed matches won, one decimal place.
pub fn win_percentage(wins: i32, matches_managed: i32) -> f64 {
    if matches_managed <= 0 {
        return 0.0;
    }
    let pct = wins as f64 / matches_managed as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    W,
    D,
    L,
}

impl FormResult {
    pub fn as_char(&self) -> char {
        match self {
            FormResult::W => 'W',
            FormResult::D => 'D',
            FormResult::L => 'L',
        }
    }

    fn from_scores(team_score: i32, opponent_score: i32) -> Self {
        match team_score.cmp(&opponent_score) {
            Ordering::Greater => FormResult::W,
            Ordering::Less => FormResult::L,
            Ordering::Equal => FormResult::D,
        }
    }
}

/// Result of `m` from `team_id`'s point of view. `None` when the team did not
/// play in it or the match has not finished.
pub fn match_result_for(team_id: &str, m: &MatchWithTeams) -> Option<FormResult> {
    if m.match_info.status != MatchStatus::Finished {
        return None;
    }
    let info = &m.match_info;
    if info.home_team_id == team_id {
        Some(FormResult::from_scores(info.home_score, info.away_score))
    } else if info.away_team_id == team_id {
        Some(FormResult::from_scores(info.away_score, info.home_score))
    } else {
        None
    }
}

/// Last `length` results for a team, most recent first.
pub fn recent_form(team_id: &str, matches: &[MatchWithTeams], length: usize) -> Vec<FormResult> {
    let mut played: Vec<&MatchWithTeams> = matches
        .iter()
        .filter(|m| match_result_for(team_id, m).is_some())
        .collect();
    played.sort_by(|a, b| b.match_info.match_date.cmp(&a.match_info.match_date));

    played
        .into_iter()
        .filter_map(|m| match_result_for(team_id, m))
        .take(length)
        .collect()
}

pub fn form_string(form: &[FormResult]) -> String {
    form.iter().map(FormResult::as_char).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingRow {
    pub position: usize,
    pub team: Team,
    pub games_played: i32,
    pub goal_difference: i32,
    pub goal_difference_display: String,
    pub form: Vec<FormResult>,
}

/// Orders by points, then goal difference, then goals scored. Remaining ties
/// keep their input order.
pub fn standings(teams: Vec<Team>, forms: &HashMap<String, Vec<FormResult>>) -> Vec<StandingRow> {
    let mut teams = teams;
    teams.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| {
                goal_difference(b.goals_for, b.goals_against)
                    .cmp(&goal_difference(a.goals_for, a.goals_against))
            })
            .then_with(|| b.goals_for.cmp(&a.goals_for))
    });

    teams
        .into_iter()
        .enumerate()
        .map(|(i, team)| {
            let gd = goal_difference(team.goals_for, team.goals_against);
            StandingRow {
                position: i + 1,
                games_played: games_played(team.wins, team.draws, team.losses),
                goal_difference: gd,
                goal_difference_display: format_signed(gd),
                form: forms.get(&team.id).cloned().unwrap_or_default(),
                team,
            }
        })
        .collect()
}

/// Recent form of each team, keyed by team id.
pub fn forms_for(teams: &[Team], matches: &[MatchWithTeams]) -> HashMap<String, Vec<FormResult>> {
    teams
        .iter()
        .map(|t| (t.id.clone(), recent_form(&t.id, matches, FORM_LENGTH)))
        .collect()
}

/// Players with the stat above zero, highest first, at most `limit`.
pub fn top_players(players: Vec<Player>, stat: PlayerStat, limit: usize) -> Vec<Player> {
    let mut ranked: Vec<Player> = players.into_iter().filter(|p| stat.value(p) > 0).collect();
    ranked.sort_by(|a, b| {
        stat.value(b)
            .cmp(&stat.value(a))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchBuckets {
    pub live: Vec<MatchWithTeams>,
    pub upcoming: Vec<MatchWithTeams>,
    pub finished: Vec<MatchWithTeams>,
}

/// Splits one fetch by status. Upcoming is soonest first, finished latest first.
pub fn bucket_matches(matches: Vec<MatchWithTeams>) -> MatchBuckets {
    let mut buckets = MatchBuckets::default();
    for m in matches {
        match m.match_info.status {
            MatchStatus::Live => buckets.live.push(m),
            MatchStatus::Upcoming => buckets.upcoming.push(m),
            MatchStatus::Finished => buckets.finished.push(m),
        }
    }
    buckets
        .live
        .sort_by(|a, b| a.match_info.match_date.cmp(&b.match_info.match_date));
    buckets
        .upcoming
        .sort_by(|a, b| a.match_info.match_date.cmp(&b.match_info.match_date));
    buckets
        .finished
        .sort_by(|a, b| b.match_info.match_date.cmp(&a.match_info.match_date));
    buckets
}

#[cfg(test)]
mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::models::*;

    pub fn team(id: &str, w: i32, d: i32, l: i32, gf: i32, ga: i32, pts: i32) -> Team {
        Team {
            id: id.to_string(),
            name: id.to_uppercase(),
            stadium: format!("{} Park", id),
            founded: None,
            logo: None,
            league_id: None,
            wins: w,
            draws: d,
            losses: l,
            goals_for: gf,
            goals_against: ga,
            points: pts,
            created_at: Utc::now(),
        }
    }

    pub fn player(name: &str, goals: i32, assists: i32) -> Player {
        Player {
            id: name.to_lowercase(),
            name: name.to_string(),
            position: Position::Forward,
            jersey_number: 9,
            team_id: None,
            goals,
            assists,
            rating: 7.0,
            appearances: 10,
            created_at: Utc::now(),
        }
    }

    pub fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, d, 15, 0, 0).unwrap()
    }

    pub fn fixture(home: &str, away: &str, hs: i32, as_: i32, date: DateTime<Utc>, status: MatchStatus) -> MatchWithTeams {
        MatchWithTeams {
            match_info: Match {
                id: format!("{}-{}-{}", home, away, date.timestamp()),
                home_team_id: home.to_string(),
                away_team_id: away.to_string(),
                home_score: hs,
                away_score: as_,
                match_date: date,
                status,
                venue: "Ground".to_string(),
                league_id: None,
                created_at: Utc::now(),
            },
            home_team: TeamRef { id: home.to_string(), name: home.to_uppercase(), logo: None },
            away_team: TeamRef { id: away.to_string(), name: away.to_uppercase(), logo: None },
        }
    }
}
