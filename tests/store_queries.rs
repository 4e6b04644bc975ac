use rusqlite::Connection;

use football_hub::match_record::{Match, compute_club_record};
use football_hub::sections;
use football_hub::store::{self, NewPlayer, NewTransfer};

struct Fixture {
    conn: Connection,
    lions: i64,
    eagles: i64,
    otters: i64,
    striker: i64,
    winger: i64,
    keeper: i64,
}

fn fixture() -> Fixture {
    let conn = Connection::open_in_memory().expect("in-memory db");
    store::init_schema(&conn).expect("schema");

    let lions = store::insert_club(&conn, "Lions").expect("club");
    let eagles = store::insert_club(&conn, "Eagles").expect("club");
    let otters = store::insert_club(&conn, "Otters").expect("club");

    let striker = store::insert_player(
        &conn,
        &NewPlayer {
            first_name: "Ada",
            last_name: "Stone",
            club_id: Some(lions),
            nationality: Some("England"),
            position: Some("Forward"),
            market_value: Some(42_000_000),
        },
    )
    .expect("player");
    let winger = store::insert_player(
        &conn,
        &NewPlayer {
            first_name: "Kofi",
            last_name: "Vale",
            club_id: Some(eagles),
            nationality: Some("Nigeria"),
            position: Some("Forward"),
            market_value: None,
        },
    )
    .expect("player");
    let keeper = store::insert_player(
        &conn,
        &NewPlayer {
            first_name: "Free",
            last_name: "Agent",
            ..Default::default()
        },
    )
    .expect("player");

    Fixture {
        conn,
        lions,
        eagles,
        otters,
        striker,
        winger,
        keeper,
    }
}

#[test]
fn players_keep_rows_without_a_club() {
    let f = fixture();
    let players = store::load_players(&f.conn).expect("players");
    assert_eq!(players.len(), 3);
    let agent = players
        .iter()
        .find(|p| p.player_id == f.keeper)
        .expect("clubless player listed");
    assert_eq!(agent.club_name, None);
    assert_eq!(players[0].club_name.as_deref(), Some("Lions"));
}

#[test]
fn top_scorers_sum_goals_and_respect_limit() {
    let f = fixture();
    let m = store::insert_match(&f.conn, &Match::new(f.lions, f.eagles, 3, 2), None).expect("match");
    store::insert_player_stat(&f.conn, f.striker, Some(m), 2, 0).expect("stat");
    store::insert_player_stat(&f.conn, f.striker, None, 1, 1).expect("stat");
    store::insert_player_stat(&f.conn, f.winger, Some(m), 2, 0).expect("stat");

    let top = store::load_top_scorers(&f.conn, 10).expect("scorers");
    assert_eq!(top.len(), 2);
    assert_eq!((top[0].player_id, top[0].total_goals), (f.striker, 3));
    assert_eq!((top[1].player_id, top[1].total_goals), (f.winger, 2));

    let one = store::load_top_scorers(&f.conn, 1).expect("scorers");
    assert_eq!(one.len(), 1);
}

#[test]
fn injury_ties_break_by_player_id() {
    let f = fixture();
    store::insert_injury(&f.conn, f.winger, Some("Ankle sprain"), Some("2024-09-01")).expect("injury");
    store::insert_injury(&f.conn, f.striker, Some("Hamstring"), None).expect("injury");
    store::insert_injury(&f.conn, f.keeper, None, None).expect("injury");
    store::insert_injury(&f.conn, f.keeper, None, None).expect("injury");

    let rows = sections::injury_rows(store::load_most_injured(&f.conn, 10).expect("injuries"));
    let names: Vec<_> = rows.iter().map(|r| (r.player.as_str(), r.injuries)).collect();
    assert_eq!(
        names,
        vec![("Free Agent", 2), ("Ada Stone", 1), ("Kofi Vale", 1)]
    );
}

#[test]
fn transfers_are_newest_first_with_club_names() {
    let f = fixture();
    store::insert_transfer(
        &f.conn,
        &NewTransfer {
            player_id: f.striker,
            from_club_id: f.otters,
            to_club_id: f.lions,
            transfer_fee: Some(30_000_000),
            transfer_date: "2023-01-15",
        },
    )
    .expect("transfer");
    store::insert_transfer(
        &f.conn,
        &NewTransfer {
            player_id: f.winger,
            from_club_id: f.lions,
            to_club_id: f.eagles,
            transfer_fee: None,
            transfer_date: "2024-07-01",
        },
    )
    .expect("transfer");

    let rows = sections::transfer_rows(store::load_transfers(&f.conn).expect("transfers"));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].player, "Kofi Vale");
    assert_eq!((rows[0].from_club.as_str(), rows[0].to_club.as_str()), ("Lions", "Eagles"));
    assert_eq!(rows[0].fee, None);
    assert_eq!(rows[1].date, "2023-01-15");

    let top = sections::top_fees(&rows, sections::TOP_FEES);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].player, "Ada Stone");
}

#[test]
fn club_matches_cover_home_and_away_only() {
    let f = fixture();
    store::insert_match(&f.conn, &Match::new(f.lions, f.eagles, 2, 1), Some("2024-08-10")).expect("m");
    store::insert_match(&f.conn, &Match::new(f.otters, f.lions, 1, 1), Some("2024-08-17")).expect("m");
    store::insert_match(&f.conn, &Match::new(f.eagles, f.otters, 0, 3), Some("2024-08-24")).expect("m");

    let mine = store::load_club_matches(&f.conn, f.lions).expect("club matches");
    assert_eq!(mine.len(), 2);
    assert!(
        mine.iter()
            .all(|m| m.home_club_id == f.lions || m.away_club_id == f.lions)
    );

    let record = compute_club_record(f.lions, &mine).expect("pre-filtered input");
    assert_eq!((record.wins, record.draws, record.losses), (1, 1, 0));
    assert_eq!((record.goals_for, record.goals_against), (3, 2));

    assert_eq!(store::load_all_matches(&f.conn).expect("all").len(), 3);
}

#[test]
fn club_without_matches_yields_empty_analysis() {
    let f = fixture();
    let clubs = sections::sorted_clubs(store::load_clubs(&f.conn).expect("clubs"));
    let names: Vec<_> = clubs.iter().map(|c| c.club_name.as_str()).collect();
    assert_eq!(names, vec!["Eagles", "Lions", "Otters"]);

    let analysis = sections::analyse_club(&f.conn, &clubs[2]).expect("analysis");
    assert!(!analysis.has_matches());
    assert_eq!(analysis.record.avg_goals_for, 0.0);
}

#[test]
fn club_lookup_ignores_case() {
    let f = fixture();
    let club = store::find_club_by_name(&f.conn, "eAgLeS")
        .expect("query")
        .expect("club exists");
    assert_eq!(club.club_id, f.eagles);
    assert!(store::find_club_by_name(&f.conn, "Sharks").expect("query").is_none());
}

#[test]
fn reset_clears_rows_but_keeps_schema() {
    let f = fixture();
    store::insert_match(&f.conn, &Match::new(f.lions, f.eagles, 1, 0), None).expect("m");
    store::reset(&f.conn).expect("reset");
    assert!(store::load_clubs(&f.conn).expect("clubs").is_empty());
    assert!(store::load_all_matches(&f.conn).expect("matches").is_empty());
    store::check_connection(&f.conn).expect("still usable");
}
