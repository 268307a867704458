use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::client::{DashboardClient, LatestSlot, ViewState};
use crate::config::Config;
use crate::db::{self, create_pool, init_database_with_pool};
use crate::models::{MatchStatus, ADMIN_ROLE};
use crate::services::events::Table;
use crate::services::stats;
use crate::services::views::{self, ManagerRow};
use crate::utils::{fit, format_record, suggest};

async fn open(config: &Config) -> Result<sqlx::SqlitePool> {
    let pool = create_pool(&config.database_url).await?;
    init_database_with_pool(&pool).await?;
    Ok(pool)
}

pub async fn init_db(config: &Config) -> Result<()> {
    open(config).await?;
    println!("✅ Database ready at {}", config.database_url);
    Ok(())
}

pub async fn seed(config: &Config) -> Result<()> {
    let pool = open(config).await?;
    db::seed_data(&pool).await?;
    println!("🌱 Demo data loaded. Try: matchday standings");
    Ok(())
}

pub async fn print_standings(config: &Config, league_name: Option<&str>) -> Result<()> {
    let pool = open(config).await?;

    let league_id = match league_name {
        Some(name) => match db::find_league_by_name(&pool, name).await? {
            Some(league) => Some(league.id),
            None => {
                println!("❌ No league named '{}'", name);
                let names: Vec<String> = db::list_leagues(&pool).await?.into_iter().map(|l| l.name).collect();
                print_suggestions(name, &names);
                return Ok(());
            }
        },
        None => None,
    };

    let Some(view) = views::standings(&pool, league_id.as_deref()).await? else {
        return Ok(());
    };
    let Some(league) = view.selected_league else {
        println!("📭 No leagues yet. Load demo data with: matchday seed");
        return Ok(());
    };

    println!("🏆 {} {} ({})\n", league.name, league.season, league.country);
    if view.table.is_empty() {
        println!("   No teams in this league yet");
        return Ok(());
    }

    println!("{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>5} {:>4}  {}", "#", "Team", "P", "W", "D", "L", "GD", "Pts", "Form");
    for row in &view.table {
        println!(
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>5} {:>4}  {}",
            row.position,
            fit(&row.team.name, 24),
            row.games_played,
            row.team.wins,
            row.team.draws,
            row.team.losses,
            row.goal_difference_display,
            row.team.points,
            stats::form_string(&row.form),
        );
    }

    Ok(())
}

pub async fn query_team(config: &Config, team_name: &str) -> Result<()> {
    let pool = open(config).await?;

    println!("🔍 Searching for team: {}", team_name);

    let teams = db::search_teams_by_name(&pool, team_name).await?;
    if teams.is_empty() {
        println!("❌ No teams found matching '{}'", team_name);
        let names: Vec<String> = db::list_teams(&pool).await?.into_iter().map(|t| t.name).collect();
        print_suggestions(team_name, &names);
        return Ok(());
    }

    if teams.len() > 1 {
        println!("📋 Found {} teams matching '{}':\n", teams.len(), team_name);
        for (i, team) in teams.iter().enumerate() {
            println!("{}. {}", i + 1, team.name);
        }
        println!("\n🔍 Showing details for first match:");
    }

    let Some(details) = views::team_details(&pool, &teams[0].id).await? else {
        return Err(anyhow!("Team {} disappeared during lookup", teams[0].id));
    };
    let team = &details.team;

    println!("📊 Team Details:");
    println!("   Name: {}", team.name);
    println!("   Stadium: {}", team.stadium);
    if let Some(founded) = team.founded {
        println!("   Founded: {}", founded);
    }
    println!(
        "   Record: {} ({} played, {} pts, GD {})",
        format_record(team.wins, team.draws, team.losses),
        details.games_played,
        team.points,
        details.goal_difference
    );
    println!("   Form: {}", stats::form_string(&details.form));
    match &details.manager {
        Some(manager) => println!("   Manager: {} ({})", manager.name, manager.nationality),
        None => println!("   Manager: none"),
    }

    println!("\n👥 Squad:");
    if details.players.is_empty() {
        println!("   No players registered");
    }
    for player in &details.players {
        println!(
            "   #{:<3} {:<24} {:<11} {} G / {} A",
            player.jersey_number,
            fit(&player.name, 24),
            player.position.as_str(),
            player.goals,
            player.assists
        );
    }

    println!("\n📅 Recent Matches:");
    if details.recent_matches.is_empty() {
        println!("   No recent matches found");
    }
    for m in &details.recent_matches {
        let is_home = m.match_info.home_team_id == team.id;
        let (venue, opponent) = if is_home {
            ("vs", &m.away_team.name)
        } else {
            ("at", &m.home_team.name)
        };
        let score = match m.match_info.status {
            MatchStatus::Upcoming => "(TBD)".to_string(),
            _ => format!("({}-{})", m.match_info.home_score, m.match_info.away_score),
        };
        let result = stats::match_result_for(&team.id, m)
            .map(|r| r.as_char().to_string())
            .unwrap_or_else(|| m.match_info.status.to_string());

        println!("   {} {} {} {} {}", m.match_info.match_date.format("%m/%d"), venue, opponent, score, result);
    }

    Ok(())
}

pub async fn grant_admin(config: &Config, user_id: &str) -> Result<()> {
    let pool = open(config).await?;
    db::grant_role(&pool, user_id, ADMIN_ROLE).await?;
    println!("🔑 {} is now an admin", user_id);
    Ok(())
}

pub async fn export_standings(config: &Config, league_name: &str, out: &Path) -> Result<()> {
    let pool = open(config).await?;

    let league = db::find_league_by_name(&pool, league_name)
        .await?
        .ok_or_else(|| anyhow!("No league named '{}'", league_name))?;
    let view = views::standings(&pool, Some(&league.id))
        .await?
        .ok_or_else(|| anyhow!("League {} not found", league.id))?;

    let mut writer = csv::Writer::from_path(out)?;
    writer.write_record([
        "position", "team", "played", "wins", "draws", "losses", "goals_for", "goals_against",
        "goal_difference", "points", "form",
    ])?;
    for row in &view.table {
        writer.write_record([
            row.position.to_string(),
            row.team.name.clone(),
            row.games_played.to_string(),
            row.team.wins.to_string(),
            row.team.draws.to_string(),
            row.team.losses.to_string(),
            row.team.goals_for.to_string(),
            row.team.goals_against.to_string(),
            row.goal_difference.to_string(),
            row.team.points.to_string(),
            stats::form_string(&row.form),
        ])?;
    }
    writer.flush()?;

    println!("📄 Wrote {} rows for {} to {}", view.table.len(), league.name, out.display());
    Ok(())
}

/// Live manager rankings: refetches on every change notice from the server
/// until Ctrl-C.
pub async fn watch_managers(api_url: &str) -> Result<()> {
    let client = DashboardClient::new(api_url);
    let slot: Arc<LatestSlot<Vec<ManagerRow>>> = Arc::new(LatestSlot::new());
    let (tx, mut rx) = mpsc::channel::<()>(16);

    let feed = {
        let client = client.clone();
        tokio::spawn(async move {
            if let Err(e) = client.follow_table(Table::Managers, tx).await {
                tracing::warn!("Manager change feed stopped: {}", e);
            }
        })
    };

    println!("👀 Watching manager rankings at {} (Ctrl-C to stop)", api_url);
    refresh_managers(&client, &slot);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            notice = rx.recv() => match notice {
                Some(()) => refresh_managers(&client, &slot),
                None => {
                    println!("🔌 Change feed closed");
                    break;
                }
            },
        }
    }

    feed.abort();
    Ok(())
}

fn refresh_managers(client: &DashboardClient, slot: &Arc<LatestSlot<Vec<ManagerRow>>>) {
    let ticket = slot.begin();
    let client = client.clone();
    let slot = Arc::clone(slot);
    tokio::spawn(async move {
        let state = ViewState::from_rows(client.managers().await);
        if slot.apply(ticket, state) {
            render_managers(&slot.snapshot());
        }
    });
}

fn render_managers(state: &ViewState<Vec<ManagerRow>>) {
    match state {
        ViewState::Loading => println!("⏳ Loading..."),
        ViewState::Empty => println!("📭 No managers yet"),
        ViewState::Error(e) => println!("❌ {}", e),
        ViewState::Data(rows) => {
            println!("\n🧑‍💼 Manager rankings:");
            for (i, row) in rows.iter().enumerate() {
                let m = &row.manager;
                println!(
                    "{:>3}. {:<24} {:<20} {:>4} pts  {}  {:.1}%",
                    i + 1,
                    fit(&m.name, 24),
                    fit(row.team_name.as_deref().unwrap_or("-"), 20),
                    m.points,
                    format_record(m.wins, m.draws, m.losses),
                    m.win_percentage
                );
            }
        }
    }
}

fn print_suggestions(query: &str, names: &[String]) {
    let hits = suggest(query, names, 3);
    if hits.is_empty() {
        return;
    }
    println!("\n💡 Did you mean:");
    for name in hits {
        println!("   • {}", name);
    }
}
