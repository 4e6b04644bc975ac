use std::collections::BTreeSet;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::match_record::{self, ClubRecord, LeagueOutcomes};
use crate::store::{self, Club, InjuryTotal, PlayerRecord, ScorerTotal, TransferRecord};

pub const TOP_FEES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub name: String,
    pub club: Option<String>,
    pub nationality: Option<String>,
    pub position: Option<String>,
    pub market_value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerRow {
    pub player: String,
    pub goals: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjuryRow {
    pub player: String,
    pub injuries: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRow {
    pub player: String,
    pub from_club: String,
    pub to_club: String,
    pub fee: Option<i64>,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClubAnalysis {
    pub club_id: i64,
    pub club_name: String,
    pub record: ClubRecord,
}

impl ClubAnalysis {
    pub fn has_matches(&self) -> bool {
        self.record.played > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Club,
    Nationality,
    Position,
}

impl FilterColumn {
    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::Club => "Club",
            FilterColumn::Nationality => "Nationality",
            FilterColumn::Position => "Position",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FilterColumn::Club => FilterColumn::Nationality,
            FilterColumn::Nationality => FilterColumn::Position,
            FilterColumn::Position => FilterColumn::Club,
        }
    }
}

/// Multi-select filters. An empty set means "no filter" for that column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilters {
    pub clubs: BTreeSet<String>,
    pub nationalities: BTreeSet<String>,
    pub positions: BTreeSet<String>,
}

impl PlayerFilters {
    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty() && self.nationalities.is_empty() && self.positions.is_empty()
    }

    pub fn set(&self, column: FilterColumn) -> &BTreeSet<String> {
        match column {
            FilterColumn::Club => &self.clubs,
            FilterColumn::Nationality => &self.nationalities,
            FilterColumn::Position => &self.positions,
        }
    }

    pub fn set_mut(&mut self, column: FilterColumn) -> &mut BTreeSet<String> {
        match column {
            FilterColumn::Club => &mut self.clubs,
            FilterColumn::Nationality => &mut self.nationalities,
            FilterColumn::Position => &mut self.positions,
        }
    }

    /// Adds `value` if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, column: FilterColumn, value: &str) -> bool {
        let set = self.set_mut(column);
        if set.remove(value) {
            false
        } else {
            set.insert(value.to_string());
            true
        }
    }

    pub fn matches(&self, row: &PlayerRow) -> bool {
        passes(&self.clubs, row.club.as_deref())
            && passes(&self.nationalities, row.nationality.as_deref())
            && passes(&self.positions, row.position.as_deref())
    }
}

fn passes(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    value.is_some_and(|v| selected.contains(v))
}

pub fn full_name(first: &str, last: &str) -> String {
    format!("{first} {last}")
}

pub fn player_rows(records: Vec<PlayerRecord>) -> Vec<PlayerRow> {
    records
        .into_iter()
        .map(|p| PlayerRow {
            name: full_name(&p.first_name, &p.last_name),
            club: p.club_name,
            nationality: p.nationality,
            position: p.position,
            market_value: p.market_value,
        })
        .collect()
}

/// Sorted, de-duplicated non-null values of `column`.
pub fn filter_options(rows: &[PlayerRow], column: FilterColumn) -> Vec<String> {
    let values: BTreeSet<&str> = rows
        .iter()
        .filter_map(|row| match column {
            FilterColumn::Club => row.club.as_deref(),
            FilterColumn::Nationality => row.nationality.as_deref(),
            FilterColumn::Position => row.position.as_deref(),
        })
        .collect();
    values.into_iter().map(str::to_string).collect()
}

pub fn apply_player_filters<'a>(rows: &'a [PlayerRow], filters: &PlayerFilters) -> Vec<&'a PlayerRow> {
    rows.iter().filter(|row| filters.matches(row)).collect()
}

pub fn scorer_rows(totals: Vec<ScorerTotal>) -> Vec<ScorerRow> {
    totals
        .into_iter()
        .map(|s| ScorerRow {
            player: full_name(&s.first_name, &s.last_name),
            goals: s.total_goals,
        })
        .collect()
}

pub fn injury_rows(totals: Vec<InjuryTotal>) -> Vec<InjuryRow> {
    totals
        .into_iter()
        .map(|i| InjuryRow {
            player: full_name(&i.first_name, &i.last_name),
            injuries: i.injury_count,
        })
        .collect()
}

pub fn transfer_rows(records: Vec<TransferRecord>) -> Vec<TransferRow> {
    records
        .into_iter()
        .map(|t| TransferRow {
            player: full_name(&t.first_name, &t.last_name),
            from_club: t.from_club,
            to_club: t.to_club,
            fee: t.transfer_fee,
            date: t.transfer_date,
        })
        .collect()
}

/// The `n` largest fees, biggest first. Rows without a fee are skipped.
pub fn top_fees(rows: &[TransferRow], n: usize) -> Vec<&TransferRow> {
    let mut with_fee: Vec<&TransferRow> = rows.iter().filter(|t| t.fee.is_some()).collect();
    // Stable sort keeps the newer transfer first among equal fees.
    with_fee.sort_by(|a, b| b.fee.cmp(&a.fee));
    with_fee.truncate(n);
    with_fee
}

pub fn sorted_clubs(mut clubs: Vec<Club>) -> Vec<Club> {
    clubs.sort_by(|a, b| a.club_name.cmp(&b.club_name).then(a.club_id.cmp(&b.club_id)));
    clubs
}

pub fn analyse_club(conn: &Connection, club: &Club) -> Result<ClubAnalysis> {
    let matches = store::load_club_matches(conn, club.club_id)?;
    let record = match_record::compute_club_record(club.club_id, &matches)
        .with_context(|| format!("aggregate record for {}", club.club_name))?;
    Ok(ClubAnalysis {
        club_id: club.club_id,
        club_name: club.club_name.clone(),
        record,
    })
}

pub fn league_outcomes(conn: &Connection) -> Result<LeagueOutcomes> {
    let matches = store::load_all_matches(conn)?;
    Ok(match_record::compute_league_outcome_distribution(&matches))
}

pub fn format_money(value: Option<i64>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        format!("-€{out}")
    } else {
        format!("€{out}")
    }
}

pub fn format_avg(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, club: Option<&str>, nat: Option<&str>, pos: Option<&str>) -> PlayerRow {
        PlayerRow {
            name: name.to_string(),
            club: club.map(str::to_string),
            nationality: nat.map(str::to_string),
            position: pos.map(str::to_string),
            market_value: None,
        }
    }

    #[test]
    fn format_money_groups_thousands() {
        assert_eq!(format_money(Some(0)), "€0");
        assert_eq!(format_money(Some(999)), "€999");
        assert_eq!(format_money(Some(1_000)), "€1,000");
        assert_eq!(format_money(Some(85_500_000)), "€85,500,000");
        assert_eq!(format_money(None), "-");
    }

    #[test]
    fn filters_and_across_columns_or_within() {
        let rows = vec![
            row("A", Some("Alpha"), Some("ES"), Some("Forward")),
            row("B", Some("Beta"), Some("ES"), Some("Defender")),
            row("C", Some("Alpha"), Some("FR"), Some("Forward")),
            row("D", None, Some("ES"), Some("Forward")),
        ];
        let mut filters = PlayerFilters::default();
        assert_eq!(apply_player_filters(&rows, &filters).len(), 4);

        filters.toggle(FilterColumn::Nationality, "ES");
        assert_eq!(apply_player_filters(&rows, &filters).len(), 3);

        filters.toggle(FilterColumn::Club, "Alpha");
        filters.toggle(FilterColumn::Club, "Beta");
        let names: Vec<_> = apply_player_filters(&rows, &filters)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, ["A", "B"]);

        // Toggling again removes the value.
        assert!(!filters.toggle(FilterColumn::Club, "Beta"));
        assert_eq!(apply_player_filters(&rows, &filters).len(), 1);
    }

    #[test]
    fn filter_options_are_sorted_unique_and_skip_null() {
        let rows = vec![
            row("A", Some("Beta"), None, None),
            row("B", Some("Alpha"), None, None),
            row("C", Some("Beta"), None, None),
            row("D", None, None, None),
        ];
        assert_eq!(filter_options(&rows, FilterColumn::Club), ["Alpha", "Beta"]);
        assert!(filter_options(&rows, FilterColumn::Position).is_empty());
    }

    #[test]
    fn top_fees_skips_missing_and_orders_desc() {
        let t = |player: &str, fee: Option<i64>| TransferRow {
            player: player.to_string(),
            from_club: "X".to_string(),
            to_club: "Y".to_string(),
            fee,
            date: "2024-01-01".to_string(),
        };
        let rows = vec![
            t("a", Some(10)),
            t("b", None),
            t("c", Some(50)),
            t("d", Some(30)),
            t("e", Some(5)),
            t("f", Some(40)),
            t("g", Some(20)),
        ];
        let top: Vec<_> = top_fees(&rows, TOP_FEES).iter().map(|r| r.player.as_str()).collect();
        assert_eq!(top, ["c", "f", "d", "g", "a"]);
    }
}
