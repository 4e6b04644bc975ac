use std::collections::VecDeque;

use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::match_record::{ClubId, LeagueOutcomes};
use crate::sections::{
    self, ClubAnalysis, FilterColumn, InjuryRow, PlayerFilters, PlayerRow, ScorerRow, TransferRow,
};
use crate::store::{self, Club};

pub const DEFAULT_TOP_LIMIT: usize = 10;
const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Players,
    TopScorers,
    Injuries,
    Transfers,
    ClubAnalysis,
    MatchStats,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Players,
        Section::TopScorers,
        Section::Injuries,
        Section::Transfers,
        Section::ClubAnalysis,
        Section::MatchStats,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

pub fn section_label(section: Section) -> &'static str {
    match section {
        Section::Players => "Players",
        Section::TopScorers => "Top Scorers",
        Section::Injuries => "Injuries",
        Section::Transfers => "Transfers",
        Section::ClubAnalysis => "Club Analysis",
        Section::MatchStats => "Match Stats",
    }
}

#[derive(Debug)]
pub struct AppState {
    pub section: Section,
    pub selected: usize,
    pub top_limit: usize,
    pub needs_reload: bool,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,

    pub players: Vec<PlayerRow>,
    pub player_filters: PlayerFilters,
    pub filter_column: FilterColumn,
    pub filter_cursor: usize,

    pub scorers: Vec<ScorerRow>,
    pub injuries: Vec<InjuryRow>,
    pub transfers: Vec<TransferRow>,

    pub clubs: Vec<Club>,
    pub club_selected: usize,
    pub preferred_club: Option<ClubId>,
    pub club_analysis: Option<ClubAnalysis>,

    pub league: Option<LeagueOutcomes>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            section: Section::Players,
            selected: 0,
            top_limit: DEFAULT_TOP_LIMIT,
            needs_reload: true,
            help_overlay: false,
            logs: VecDeque::new(),
            players: Vec::new(),
            player_filters: PlayerFilters::default(),
            filter_column: FilterColumn::Club,
            filter_cursor: 0,
            scorers: Vec::new(),
            injuries: Vec::new(),
            transfers: Vec::new(),
            clubs: Vec::new(),
            club_selected: 0,
            preferred_club: None,
            club_analysis: None,
            league: None,
        }
    }

    pub fn set_section(&mut self, section: Section) {
        if self.section == section {
            return;
        }
        self.section = section;
        self.selected = 0;
        self.needs_reload = true;
    }

    pub fn next_section(&mut self) {
        let idx = (self.section.index() + 1) % Section::ALL.len();
        self.set_section(Section::ALL[idx]);
    }

    pub fn prev_section(&mut self) {
        let len = Section::ALL.len();
        let idx = (self.section.index() + len - 1) % len;
        self.set_section(Section::ALL[idx]);
    }

    /// Re-runs the queries backing the current section.
    pub fn refresh_section(&mut self, conn: &Connection) -> Result<()> {
        self.needs_reload = false;
        match self.section {
            Section::Players => {
                self.players = sections::player_rows(store::load_players(conn)?);
                self.clamp_filter_cursor();
                tracing::debug!(rows = self.players.len(), "players loaded");
            }
            Section::TopScorers => {
                self.scorers = sections::scorer_rows(store::load_top_scorers(conn, self.top_limit)?);
                tracing::debug!(rows = self.scorers.len(), "top scorers loaded");
            }
            Section::Injuries => {
                self.injuries =
                    sections::injury_rows(store::load_most_injured(conn, self.top_limit)?);
                tracing::debug!(rows = self.injuries.len(), "injuries loaded");
            }
            Section::Transfers => {
                self.transfers = sections::transfer_rows(store::load_transfers(conn)?);
                tracing::debug!(rows = self.transfers.len(), "transfers loaded");
            }
            Section::ClubAnalysis => {
                self.clubs = sections::sorted_clubs(store::load_clubs(conn)?);
                if let Some(club_id) = self.preferred_club.take()
                    && let Some(idx) = self.clubs.iter().position(|c| c.club_id == club_id)
                {
                    self.club_selected = idx;
                }
                if self.club_selected >= self.clubs.len() {
                    self.club_selected = 0;
                }
                self.selected = self.club_selected;
                self.club_analysis = match self.clubs.get(self.club_selected) {
                    Some(club) => Some(sections::analyse_club(conn, club)?),
                    None => None,
                };
            }
            Section::MatchStats => {
                self.league = Some(sections::league_outcomes(conn)?);
            }
        }
        Ok(())
    }

    pub fn visible_players(&self) -> Vec<&PlayerRow> {
        sections::apply_player_filters(&self.players, &self.player_filters)
    }

    pub fn filter_options(&self) -> Vec<String> {
        sections::filter_options(&self.players, self.filter_column)
    }

    pub fn selected_club(&self) -> Option<&Club> {
        self.clubs.get(self.club_selected)
    }

    fn row_count(&self) -> usize {
        match self.section {
            Section::Players => self.visible_players().len(),
            Section::TopScorers => self.scorers.len(),
            Section::Injuries => self.injuries.len(),
            Section::Transfers => self.transfers.len(),
            Section::ClubAnalysis => self.clubs.len(),
            Section::MatchStats => 0,
        }
    }

    pub fn select_next(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
        self.sync_club_selection();
    }

    pub fn select_prev(&mut self) {
        if self.row_count() == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.sync_club_selection();
    }

    fn sync_club_selection(&mut self) {
        if self.section == Section::ClubAnalysis && self.club_selected != self.selected {
            self.club_selected = self.selected;
            self.needs_reload = true;
        }
    }

    pub fn cycle_filter_column(&mut self) {
        self.filter_column = self.filter_column.next();
        self.filter_cursor = 0;
    }

    pub fn filter_cursor_next(&mut self) {
        let total = self.filter_options().len();
        if total == 0 {
            self.filter_cursor = 0;
            return;
        }
        self.filter_cursor = (self.filter_cursor + 1) % total;
    }

    pub fn filter_cursor_prev(&mut self) {
        let total = self.filter_options().len();
        if total == 0 {
            self.filter_cursor = 0;
            return;
        }
        self.filter_cursor = (self.filter_cursor + total - 1) % total;
    }

    /// Toggles the option under the filter cursor.
    pub fn toggle_filter_value(&mut self) {
        let options = self.filter_options();
        let Some(value) = options.get(self.filter_cursor) else {
            return;
        };
        let on = self.player_filters.toggle(self.filter_column, value);
        self.selected = 0;
        self.push_log(format!(
            "[INFO] {} filter {} {value}",
            self.filter_column.label(),
            if on { "+" } else { "-" }
        ));
    }

    pub fn clear_filters(&mut self) {
        if self.player_filters.is_empty() {
            return;
        }
        self.player_filters = PlayerFilters::default();
        self.selected = 0;
        self.push_log("[INFO] Filters cleared");
    }

    fn clamp_filter_cursor(&mut self) {
        let total = self.filter_options().len();
        if self.filter_cursor >= total {
            self.filter_cursor = 0;
        }
        let rows = self.visible_players().len();
        if self.selected >= rows {
            self.selected = rows.saturating_sub(1);
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_cycle_both_ways() {
        let mut state = AppState::new();
        state.needs_reload = false;
        state.prev_section();
        assert_eq!(state.section, Section::MatchStats);
        assert!(state.needs_reload);
        state.next_section();
        state.next_section();
        assert_eq!(state.section, Section::TopScorers);
    }

    #[test]
    fn selection_is_clamped_to_rows() {
        let mut state = AppState::new();
        state.section = Section::TopScorers;
        state.scorers = vec![
            ScorerRow {
                player: "A".to_string(),
                goals: 3,
            },
            ScorerRow {
                player: "B".to_string(),
                goals: 2,
            },
        ];
        state.select_next();
        state.select_next();
        state.select_next();
        assert_eq!(state.selected, 1);
        state.select_prev();
        state.select_prev();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn logs_are_bounded() {
        let mut state = AppState::new();
        for i in 0..(MAX_LOGS + 25) {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 25"));
    }
}
