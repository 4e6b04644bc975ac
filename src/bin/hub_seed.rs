use std::path::PathBuf;

use anyhow::{Context, Result};

use football_hub::config::{parse_database_url, parse_db_path_arg, parse_flag_value};
use football_hub::{seed, store, telemetry};

const DEFAULT_SEED: u64 = 2024;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let log_filter = std::env::var("HUB_LOG").unwrap_or_else(|_| "info".to_string());
    telemetry::init_stderr_subscriber(&log_filter)?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let db_path = resolve_db_path(&args)?;
    let seed_value = match parse_flag_value(&args, "seed") {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("invalid --seed value '{raw}'"))?,
        None => DEFAULT_SEED,
    };
    let reset = args.iter().any(|a| a == "--reset");

    let mut conn = store::open_db(&db_path)?;
    if reset {
        store::reset(&conn)?;
        tracing::info!(db = %db_path.display(), "existing rows cleared");
    } else if !store::load_clubs(&conn)?.is_empty() {
        println!(
            "DB {} already has data; pass --reset to replace it",
            db_path.display()
        );
        return Ok(());
    }

    let summary = seed::seed_demo(&mut conn, seed_value)?;

    println!("Seed complete");
    println!("DB: {}", db_path.display());
    println!("Seed: {seed_value}");
    println!("Clubs: {}", summary.clubs);
    println!("Players: {}", summary.players);
    println!("Matches: {} ({} goals)", summary.matches, summary.goals);
    println!("Injuries: {}", summary.injuries);
    println!("Transfers: {}", summary.transfers);
    Ok(())
}

fn resolve_db_path(args: &[String]) -> Result<PathBuf> {
    if let Some(path) = parse_db_path_arg(args.iter().cloned()) {
        return Ok(path);
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return parse_database_url(&url);
    }
    store::default_db_path().context("unable to resolve sqlite path")
}
