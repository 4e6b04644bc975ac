use rusqlite::Connection;

use football_hub::export;
use football_hub::seed;
use football_hub::sections::FilterColumn;
use football_hub::state::{AppState, Section};
use football_hub::store;

fn seeded() -> Connection {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    store::init_schema(&conn).expect("schema");
    seed::seed_demo(&mut conn, 42).expect("seed");
    conn
}

fn refreshed(conn: &Connection, section: Section) -> AppState {
    let mut state = AppState::new();
    state.set_section(section);
    state.needs_reload = true;
    state.refresh_section(conn).expect("refresh");
    state
}

#[test]
fn every_section_loads_from_seeded_db() {
    let conn = seeded();
    for section in Section::ALL {
        let state = refreshed(&conn, section);
        assert!(!state.needs_reload);
        match section {
            Section::Players => assert!(!state.players.is_empty()),
            Section::TopScorers => {
                assert!(!state.scorers.is_empty());
                assert!(state.scorers.len() <= state.top_limit);
                assert!(state.scorers.windows(2).all(|w| w[0].goals >= w[1].goals));
            }
            Section::Injuries => {
                assert!(state.injuries.len() <= state.top_limit);
                assert!(state.injuries.windows(2).all(|w| w[0].injuries >= w[1].injuries));
            }
            Section::Transfers => {
                assert!(state.transfers.windows(2).all(|w| w[0].date >= w[1].date));
            }
            Section::ClubAnalysis => {
                let analysis = state.club_analysis.as_ref().expect("first club analysed");
                assert_eq!(analysis.club_name, state.clubs[0].club_name);
                assert!(analysis.has_matches());
            }
            Section::MatchStats => {
                let league = state.league.expect("league stats");
                assert_eq!(
                    league.home_wins + league.away_wins + league.draws,
                    league.total_matches
                );
            }
        }
    }
}

#[test]
fn top_limit_caps_leaderboards() {
    let conn = seeded();
    let mut state = AppState::new();
    state.top_limit = 3;
    state.set_section(Section::TopScorers);
    state.refresh_section(&conn).expect("refresh");
    assert_eq!(state.scorers.len(), 3);
}

#[test]
fn filters_narrow_visible_players() {
    let conn = seeded();
    let mut state = refreshed(&conn, Section::Players);
    let total = state.visible_players().len();

    state.filter_column = FilterColumn::Position;
    let options = state.filter_options();
    let forward_idx = options
        .iter()
        .position(|o| o == "Forward")
        .expect("seeded forwards");
    state.filter_cursor = forward_idx;
    state.toggle_filter_value();

    let forwards = state.visible_players();
    assert!(!forwards.is_empty());
    assert!(forwards.len() < total);
    assert!(
        forwards
            .iter()
            .all(|p| p.position.as_deref() == Some("Forward"))
    );

    state.clear_filters();
    assert_eq!(state.visible_players().len(), total);
}

#[test]
fn club_filter_and_position_filter_combine() {
    let conn = seeded();
    let mut state = refreshed(&conn, Section::Players);
    let club = state.players[0].club.clone().expect("seeded players have clubs");

    state.player_filters.clubs.insert(club.clone());
    state
        .player_filters
        .positions
        .insert("Goalkeeper".to_string());

    let rows = state.visible_players();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|p| p.club.as_deref() == Some(club.as_str())));
}

#[test]
fn moving_club_selection_reanalyses() {
    let conn = seeded();
    let mut state = refreshed(&conn, Section::ClubAnalysis);
    let first = state.club_analysis.clone().expect("analysis");

    state.select_next();
    assert!(state.needs_reload);
    state.refresh_section(&conn).expect("refresh");

    let second = state.club_analysis.clone().expect("analysis");
    assert_ne!(first.club_id, second.club_id);
    assert_eq!(Some(second.club_id), state.selected_club().map(|c| c.club_id));
}

#[test]
fn preferred_club_is_selected_on_first_load() {
    let conn = seeded();
    let vale = store::find_club_by_name(&conn, "Vale Town")
        .expect("query")
        .expect("seeded club");
    let mut state = AppState::new();
    state.preferred_club = Some(vale.club_id);
    state.set_section(Section::ClubAnalysis);
    state.refresh_section(&conn).expect("refresh");
    assert_eq!(
        state.club_analysis.as_ref().map(|a| a.club_name.as_str()),
        Some("Vale Town")
    );
}

#[test]
fn export_table_follows_section() {
    let conn = seeded();
    let state = refreshed(&conn, Section::MatchStats);
    let table = export::section_table(&state);
    assert_eq!(table[0], ["Metric", "Value"]);
    assert!(table.iter().any(|row| row[0] == "Home Wins"));

    let path = std::env::temp_dir().join(format!(
        "football_hub_export_{}.xlsx",
        std::process::id()
    ));
    let report = export::export_section(&path, &state).expect("export");
    assert_eq!(report.rows, table.len() - 1);
    assert!(path.exists());
    let _ = std::fs::remove_file(&path);
}
