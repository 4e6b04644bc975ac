use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use crate::match_record::{ClubId, Match};
use crate::persist::app_cache_dir;

pub const DB_FILE: &str = "football.sqlite";

const TABLES: [&str; 6] = [
    "clubs",
    "players",
    "matches",
    "player_stats",
    "injuries",
    "transfers",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Club {
    pub club_id: ClubId,
    pub club_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub player_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub club_name: Option<String>,
    pub nationality: Option<String>,
    pub position: Option<String>,
    pub market_value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerTotal {
    pub player_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub total_goals: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjuryTotal {
    pub player_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub injury_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub first_name: String,
    pub last_name: String,
    pub from_club: String,
    pub to_club: String,
    pub transfer_fee: Option<i64>,
    pub transfer_date: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewPlayer<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub club_id: Option<ClubId>,
    pub nationality: Option<&'a str>,
    pub position: Option<&'a str>,
    pub market_value: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewTransfer<'a> {
    pub player_id: i64,
    pub from_club_id: ClubId,
    pub to_club_id: ClubId,
    pub transfer_fee: Option<i64>,
    pub transfer_date: &'a str,
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "sqlite db opened");
    Ok(conn)
}

/// Opens an existing database read-only. A missing file is an error, never a new empty db.
pub fn open_existing(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(anyhow!("database file {} does not exist", path.display()));
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("open sqlite db {} read-only", path.display()))?;
    tracing::debug!(path = %path.display(), "sqlite db opened read-only");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS clubs (
            club_id INTEGER PRIMARY KEY,
            club_name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS players (
            player_id INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            club_id INTEGER NULL REFERENCES clubs(club_id),
            nationality TEXT NULL,
            position TEXT NULL,
            market_value INTEGER NULL
        );
        CREATE INDEX IF NOT EXISTS idx_players_club ON players(club_id);

        CREATE TABLE IF NOT EXISTS matches (
            match_id INTEGER PRIMARY KEY,
            home_club_id INTEGER NOT NULL REFERENCES clubs(club_id),
            away_club_id INTEGER NOT NULL REFERENCES clubs(club_id),
            home_score INTEGER NOT NULL,
            away_score INTEGER NOT NULL,
            match_date TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_home ON matches(home_club_id);
        CREATE INDEX IF NOT EXISTS idx_matches_away ON matches(away_club_id);

        CREATE TABLE IF NOT EXISTS player_stats (
            stat_id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL REFERENCES players(player_id),
            match_id INTEGER NULL REFERENCES matches(match_id),
            goals INTEGER NOT NULL DEFAULT 0,
            assists INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_player_stats_player ON player_stats(player_id);

        CREATE TABLE IF NOT EXISTS injuries (
            injury_id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL REFERENCES players(player_id),
            injury_type TEXT NULL,
            start_date TEXT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_injuries_player ON injuries(player_id);

        CREATE TABLE IF NOT EXISTS transfers (
            transfer_id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL REFERENCES players(player_id),
            from_club_id INTEGER NOT NULL REFERENCES clubs(club_id),
            to_club_id INTEGER NOT NULL REFERENCES clubs(club_id),
            transfer_fee INTEGER NULL,
            transfer_date TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_transfers_date ON transfers(transfer_date);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Startup probe. Any failure here means the dashboard has nothing to show.
pub fn check_connection(conn: &Connection) -> Result<()> {
    let one = conn
        .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .context("database connection check failed")?;
    if one != 1 {
        return Err(anyhow!("database connection check returned {one}"));
    }

    for table in TABLES {
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )
            .with_context(|| format!("look up table {table}"))?;
        if found == 0 {
            return Err(anyhow!("database is missing table '{table}'"));
        }
    }
    Ok(())
}

/// Deletes every row, children first. Schema is kept.
pub fn reset(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM transfers;
        DELETE FROM injuries;
        DELETE FROM player_stats;
        DELETE FROM matches;
        DELETE FROM players;
        DELETE FROM clubs;
        "#,
    )
    .context("reset tables")?;
    Ok(())
}

pub fn load_players(conn: &Connection) -> Result<Vec<PlayerRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT p.player_id, p.first_name, p.last_name, c.club_name,
                   p.nationality, p.position, p.market_value
            FROM players p
            LEFT JOIN clubs c ON p.club_id = c.club_id
            ORDER BY p.player_id ASC
            "#,
        )
        .context("prepare players query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(PlayerRecord {
                player_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                club_name: row.get(3)?,
                nationality: row.get(4)?,
                position: row.get(5)?,
                market_value: row.get(6)?,
            })
        })
        .context("query players")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player row")?);
    }
    Ok(out)
}

pub fn load_top_scorers(conn: &Connection, limit: usize) -> Result<Vec<ScorerTotal>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT p.player_id, p.first_name, p.last_name, COALESCE(SUM(s.goals), 0) AS total_goals
            FROM player_stats s
            JOIN players p ON s.player_id = p.player_id
            GROUP BY p.player_id, p.first_name, p.last_name
            ORDER BY total_goals DESC, p.player_id ASC
            LIMIT ?1
            "#,
        )
        .context("prepare top scorers query")?;

    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(ScorerTotal {
                player_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                total_goals: row.get(3)?,
            })
        })
        .context("query top scorers")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode scorer row")?);
    }
    Ok(out)
}

pub fn load_most_injured(conn: &Connection, limit: usize) -> Result<Vec<InjuryTotal>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT p.player_id, p.first_name, p.last_name, COUNT(i.injury_id) AS injury_count
            FROM injuries i
            JOIN players p ON i.player_id = p.player_id
            GROUP BY p.player_id, p.first_name, p.last_name
            ORDER BY injury_count DESC, p.player_id ASC
            LIMIT ?1
            "#,
        )
        .context("prepare injuries query")?;

    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(InjuryTotal {
                player_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                injury_count: row.get(3)?,
            })
        })
        .context("query injuries")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode injury row")?);
    }
    Ok(out)
}

pub fn load_transfers(conn: &Connection) -> Result<Vec<TransferRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT p.first_name, p.last_name, c1.club_name AS from_club, c2.club_name AS to_club,
                   t.transfer_fee, t.transfer_date
            FROM transfers t
            JOIN players p ON t.player_id = p.player_id
            JOIN clubs c1 ON t.from_club_id = c1.club_id
            JOIN clubs c2 ON t.to_club_id = c2.club_id
            ORDER BY t.transfer_date DESC, t.transfer_id DESC
            "#,
        )
        .context("prepare transfers query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(TransferRecord {
                first_name: row.get(0)?,
                last_name: row.get(1)?,
                from_club: row.get(2)?,
                to_club: row.get(3)?,
                transfer_fee: row.get(4)?,
                transfer_date: row.get(5)?,
            })
        })
        .context("query transfers")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode transfer row")?);
    }
    Ok(out)
}

pub fn load_clubs(conn: &Connection) -> Result<Vec<Club>> {
    let mut stmt = conn
        .prepare("SELECT club_id, club_name FROM clubs ORDER BY club_id ASC")
        .context("prepare clubs query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Club {
                club_id: row.get(0)?,
                club_name: row.get(1)?,
            })
        })
        .context("query clubs")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode club row")?);
    }
    Ok(out)
}

pub fn find_club_by_name(conn: &Connection, name: &str) -> Result<Option<Club>> {
    conn.query_row(
        "SELECT club_id, club_name FROM clubs WHERE club_name = ?1 COLLATE NOCASE LIMIT 1",
        params![name],
        |row| {
            Ok(Club {
                club_id: row.get(0)?,
                club_name: row.get(1)?,
            })
        },
    )
    .optional()
    .context("query club by name")
}

pub fn load_club_matches(conn: &Connection, club_id: ClubId) -> Result<Vec<Match>> {
    query_matches(
        conn,
        r#"
        SELECT home_club_id, away_club_id, home_score, away_score
        FROM matches
        WHERE home_club_id = ?1 OR away_club_id = ?1
        ORDER BY match_id ASC
        "#,
        params![club_id],
    )
    .with_context(|| format!("load matches for club {club_id}"))
}

pub fn load_all_matches(conn: &Connection) -> Result<Vec<Match>> {
    query_matches(
        conn,
        r#"
        SELECT home_club_id, away_club_id, home_score, away_score
        FROM matches
        ORDER BY match_id ASC
        "#,
        params![],
    )
    .context("load all matches")
}

fn query_matches(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Match>> {
    let mut stmt = conn.prepare(sql).context("prepare matches query")?;
    let rows = stmt
        .query_map(args, |row| {
            Ok(Match {
                home_club_id: row.get(0)?,
                away_club_id: row.get(1)?,
                home_score: row.get::<_, u32>(2)?,
                away_score: row.get::<_, u32>(3)?,
            })
        })
        .context("query matches")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode match row")?);
    }
    Ok(out)
}

pub fn insert_club(conn: &Connection, club_name: &str) -> Result<ClubId> {
    conn.execute("INSERT INTO clubs (club_name) VALUES (?1)", params![club_name])
        .with_context(|| format!("insert club {club_name}"))?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_player(conn: &Connection, p: &NewPlayer<'_>) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO players (first_name, last_name, club_id, nationality, position, market_value)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            p.first_name,
            p.last_name,
            p.club_id,
            p.nationality,
            p.position,
            p.market_value
        ],
    )
    .with_context(|| format!("insert player {} {}", p.first_name, p.last_name))?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_match(conn: &Connection, m: &Match, match_date: Option<&str>) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO matches (home_club_id, away_club_id, home_score, away_score, match_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            m.home_club_id,
            m.away_club_id,
            m.home_score,
            m.away_score,
            match_date
        ],
    )
    .context("insert match")?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_player_stat(
    conn: &Connection,
    player_id: i64,
    match_id: Option<i64>,
    goals: u32,
    assists: u32,
) -> Result<()> {
    conn.execute(
        "INSERT INTO player_stats (player_id, match_id, goals, assists) VALUES (?1, ?2, ?3, ?4)",
        params![player_id, match_id, goals, assists],
    )
    .context("insert player stat")?;
    Ok(())
}

pub fn insert_injury(
    conn: &Connection,
    player_id: i64,
    injury_type: Option<&str>,
    start_date: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO injuries (player_id, injury_type, start_date) VALUES (?1, ?2, ?3)",
        params![player_id, injury_type, start_date],
    )
    .context("insert injury")?;
    Ok(())
}

pub fn insert_transfer(conn: &Connection, t: &NewTransfer<'_>) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO transfers (player_id, from_club_id, to_club_id, transfer_fee, transfer_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            t.player_id,
            t.from_club_id,
            t.to_club_id,
            t.transfer_fee,
            t.transfer_date
        ],
    )
    .context("insert transfer")?;
    Ok(())
}
