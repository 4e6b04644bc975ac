use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

use crate::match_record::{ClubId, Match};
use crate::store::{self, NewPlayer, NewTransfer};

const CLUBS: &[&str] = &[
    "Riverside FC",
    "Northgate United",
    "Harbor City",
    "Ashford Athletic",
    "Kingsmoor Rovers",
    "Vale Town",
    "Stonebridge Albion",
    "Eastport Wanderers",
];

const FIRST_NAMES: &[&str] = &[
    "Luca", "Mateo", "Noah", "Jonas", "Rafael", "Kofi", "Yusuf", "Elias", "Tomas", "Andre",
    "Kenji", "Diego", "Samuel", "Ivan", "Marco", "Theo", "Oscar", "Hugo", "Nico", "Felix",
];

const LAST_NAMES: &[&str] = &[
    "Stone", "Vega", "Holt", "Nox", "Vale", "Rook", "Quinn", "Park", "Moss", "Noor", "Hale",
    "Ash", "Mendes", "Okafor", "Laurent", "Berg", "Costa", "Novak", "Sato", "Reyes",
];

const NATIONALITIES: &[&str] = &[
    "England", "Spain", "France", "Germany", "Brazil", "Nigeria", "Japan", "Portugal",
];

// (position, players per club)
const SQUAD_SHAPE: &[(&str, usize)] = &[
    ("Goalkeeper", 2),
    ("Defender", 5),
    ("Midfielder", 4),
    ("Forward", 3),
];

const INJURY_TYPES: &[&str] = &[
    "Hamstring", "Ankle sprain", "Knee ligament", "Groin strain", "Concussion", "Calf strain",
];

const INJURIES: usize = 40;
const TRANSFERS: usize = 25;

#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub clubs: usize,
    pub players: usize,
    pub matches: usize,
    pub goals: u64,
    pub injuries: usize,
    pub transfers: usize,
}

#[derive(Debug, Clone)]
struct SeededPlayer {
    id: i64,
    club_id: ClubId,
    position: &'static str,
}

/// Fills the database with a reproducible demo league. Same seed, same rows.
pub fn seed_demo(conn: &mut Connection, seed: u64) -> Result<SeedSummary> {
    let mut rng = StdRng::seed_from_u64(seed);
    let season_start = NaiveDate::from_ymd_opt(2024, 8, 10).context("invalid season start")?;

    let tx = conn.transaction().context("begin seed transaction")?;
    let mut summary = SeedSummary::default();

    let mut club_ids = Vec::with_capacity(CLUBS.len());
    for name in CLUBS {
        club_ids.push(store::insert_club(&tx, name)?);
    }
    summary.clubs = club_ids.len();

    let mut squads: BTreeMap<ClubId, Vec<SeededPlayer>> = BTreeMap::new();
    for club_id in &club_ids {
        for &(position, count) in SQUAD_SHAPE {
            for _ in 0..count {
                let first = pick(&mut rng, FIRST_NAMES);
                let last = pick(&mut rng, LAST_NAMES);
                let nationality = pick(&mut rng, NATIONALITIES);
                // Round to 100k like real listings.
                let market_value = rng.gen_range(5..=900) * 100_000;
                let id = store::insert_player(
                    &tx,
                    &NewPlayer {
                        first_name: first,
                        last_name: last,
                        club_id: Some(*club_id),
                        nationality: Some(nationality),
                        position: Some(position),
                        market_value: Some(market_value),
                    },
                )?;
                squads.entry(*club_id).or_default().push(SeededPlayer {
                    id,
                    club_id: *club_id,
                    position,
                });
                summary.players += 1;
            }
        }
    }

    // Double round robin, one match day per week.
    let per_round = club_ids.len() / 2;
    let mut fixture_idx = 0usize;
    for home in &club_ids {
        for away in &club_ids {
            if home == away {
                continue;
            }
            let m = Match::new(*home, *away, goals(&mut rng, true), goals(&mut rng, false));
            let week = (fixture_idx / per_round.max(1)) as i64;
            let day = season_start + ChronoDuration::days(week * 7);
            let date = day.format("%Y-%m-%d").to_string();
            let match_id = store::insert_match(&tx, &m, Some(&date))?;

            record_scorers(&tx, &mut rng, &squads, match_id, m.home_club_id, m.home_score)?;
            record_scorers(&tx, &mut rng, &squads, match_id, m.away_club_id, m.away_score)?;

            summary.goals += u64::from(m.home_score) + u64::from(m.away_score);
            summary.matches += 1;
            fixture_idx += 1;
        }
    }

    let all_players: Vec<&SeededPlayer> = squads.values().flatten().collect();
    for _ in 0..INJURIES {
        let Some(player) = all_players.choose(&mut rng) else {
            break;
        };
        let start = season_start + ChronoDuration::days(rng.gen_range(0..280));
        store::insert_injury(
            &tx,
            player.id,
            Some(pick(&mut rng, INJURY_TYPES)),
            Some(&start.format("%Y-%m-%d").to_string()),
        )?;
        summary.injuries += 1;
    }

    let window_start = NaiveDate::from_ymd_opt(2022, 6, 1).context("invalid transfer window")?;
    for _ in 0..TRANSFERS {
        let Some(player) = all_players.choose(&mut rng) else {
            break;
        };
        let others: Vec<ClubId> = club_ids
            .iter()
            .copied()
            .filter(|id| *id != player.club_id)
            .collect();
        let Some(from) = others.choose(&mut rng).copied() else {
            continue;
        };
        // Roughly one in ten moves is a free transfer.
        let fee = if rng.gen_bool(0.1) {
            None
        } else {
            Some(rng.gen_range(5..=900) * 100_000)
        };
        let date = window_start + ChronoDuration::days(rng.gen_range(0..800));
        store::insert_transfer(
            &tx,
            &NewTransfer {
                player_id: player.id,
                from_club_id: from,
                to_club_id: player.club_id,
                transfer_fee: fee,
                transfer_date: &date.format("%Y-%m-%d").to_string(),
            },
        )?;
        summary.transfers += 1;
    }

    tx.commit().context("commit seed transaction")?;
    tracing::info!(
        seed,
        clubs = summary.clubs,
        players = summary.players,
        matches = summary.matches,
        "demo data seeded"
    );
    Ok(summary)
}

fn pick<R: Rng>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

fn goals<R: Rng>(rng: &mut R, home: bool) -> u32 {
    // Skewed toward low scores with a small home edge.
    let roll = rng.gen_range(0..100);
    let base = match roll {
        0..=24 => 0,
        25..=59 => 1,
        60..=82 => 2,
        83..=94 => 3,
        _ => 4,
    };
    if home && rng.gen_bool(0.12) { base + 1 } else { base }
}

fn record_scorers<R: Rng>(
    conn: &Connection,
    rng: &mut R,
    squads: &BTreeMap<ClubId, Vec<SeededPlayer>>,
    match_id: i64,
    club_id: ClubId,
    count: u32,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let Some(squad) = squads.get(&club_id) else {
        return Ok(());
    };
    let outfield: Vec<&SeededPlayer> = squad
        .iter()
        .filter(|p| p.position != "Goalkeeper")
        .collect();

    let mut per_player: HashMap<i64, u32> = HashMap::new();
    for _ in 0..count {
        // Half the goals go to a forward, the rest to any outfield player.
        let pool_pick = if rng.gen_bool(0.5) {
            outfield
                .iter()
                .filter(|p| p.position == "Forward")
                .copied()
                .collect::<Vec<_>>()
                .choose(&mut *rng)
                .copied()
        } else {
            outfield.choose(&mut *rng).copied()
        };
        if let Some(player) = pool_pick {
            *per_player.entry(player.id).or_default() += 1;
        }
    }

    let mut scorers: Vec<_> = per_player.into_iter().collect();
    scorers.sort_unstable();
    for (player_id, n) in scorers {
        store::insert_player_stat(conn, player_id, Some(match_id), n, 0)?;
    }
    Ok(())
}
