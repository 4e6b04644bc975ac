use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

use football_hub::config::{Config, parse_flag_value};
use football_hub::export::{club_metrics, league_metrics};
use football_hub::sections;
use football_hub::store::{self, Club};
use football_hub::telemetry;

fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init_stderr_subscriber(&config.log_filter)?;

    let conn = store::open_existing(&config.db_path)?;
    store::check_connection(&conn)
        .with_context(|| format!("failed to connect to database {}", config.db_path.display()))?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match parse_flag_value(&args, "club") {
        Some(query) => print_club(&conn, &query),
        None => print_league(&conn),
    }
}

fn print_club(conn: &Connection, query: &str) -> Result<()> {
    let club = resolve_club(conn, query)?;
    let analysis = sections::analyse_club(conn, &club)?;

    println!("{} Performance Analysis", analysis.club_name);
    if !analysis.has_matches() {
        println!("No match data available for this club.");
        return Ok(());
    }
    print_metrics(&club_metrics(&analysis.record));
    println!("Goal Difference: {:+}", analysis.record.goal_difference());
    Ok(())
}

fn print_league(conn: &Connection) -> Result<()> {
    let league = sections::league_outcomes(conn)?;
    println!("Match Statistics Overview");
    print_metrics(&league_metrics(&league));
    Ok(())
}

fn resolve_club(conn: &Connection, query: &str) -> Result<Club> {
    if let Ok(id) = query.parse::<i64>() {
        let clubs = store::load_clubs(conn)?;
        return clubs
            .into_iter()
            .find(|c| c.club_id == id)
            .ok_or_else(|| anyhow!("no club with id {id}"));
    }
    store::find_club_by_name(conn, query)?.ok_or_else(|| anyhow!("no club named '{query}'"))
}

fn print_metrics(rows: &[Vec<String>]) {
    let width = rows
        .iter()
        .filter_map(|row| row.first())
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0);
    for row in rows {
        let label = row.first().map(String::as_str).unwrap_or_default();
        let value = row.get(1).map(String::as_str).unwrap_or_default();
        println!("{label:<width$}  {value}");
    }
}
