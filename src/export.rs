use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::match_record::{ClubRecord, LeagueOutcomes};
use crate::sections::format_avg;
use crate::state::{AppState, Section, section_label};

pub struct ExportReport {
    pub section: Section,
    pub rows: usize,
}

/// Header row followed by the rows currently shown for the active section.
pub fn section_table(state: &AppState) -> Vec<Vec<String>> {
    match state.section {
        Section::Players => {
            let mut rows = vec![header(&[
                "Player Name",
                "Club",
                "Nationality",
                "Position",
                "Market Value (€)",
            ])];
            for p in state.visible_players() {
                rows.push(vec![
                    p.name.clone(),
                    p.club.clone().unwrap_or_default(),
                    p.nationality.clone().unwrap_or_default(),
                    p.position.clone().unwrap_or_default(),
                    p.market_value.map(|v| v.to_string()).unwrap_or_default(),
                ]);
            }
            rows
        }
        Section::TopScorers => {
            let mut rows = vec![header(&["Player", "Goals"])];
            rows.extend(
                state
                    .scorers
                    .iter()
                    .map(|s| vec![s.player.clone(), s.goals.to_string()]),
            );
            rows
        }
        Section::Injuries => {
            let mut rows = vec![header(&["Player", "Injuries"])];
            rows.extend(
                state
                    .injuries
                    .iter()
                    .map(|i| vec![i.player.clone(), i.injuries.to_string()]),
            );
            rows
        }
        Section::Transfers => {
            let mut rows = vec![header(&["Player", "From Club", "To Club", "Fee (€)", "Date"])];
            rows.extend(state.transfers.iter().map(|t| {
                vec![
                    t.player.clone(),
                    t.from_club.clone(),
                    t.to_club.clone(),
                    t.fee.map(|v| v.to_string()).unwrap_or_default(),
                    t.date.clone(),
                ]
            }));
            rows
        }
        Section::ClubAnalysis => {
            let mut rows = vec![header(&["Metric", "Value"])];
            if let Some(analysis) = state.club_analysis.as_ref() {
                rows.push(vec!["Club".to_string(), analysis.club_name.clone()]);
                rows.extend(club_metrics(&analysis.record));
            }
            rows
        }
        Section::MatchStats => {
            let mut rows = vec![header(&["Metric", "Value"])];
            if let Some(league) = state.league.as_ref() {
                rows.extend(league_metrics(league));
            }
            rows
        }
    }
}

pub fn club_metrics(record: &ClubRecord) -> Vec<Vec<String>> {
    vec![
        metric("Matches Played", record.played.to_string()),
        metric("Wins", record.wins.to_string()),
        metric("Draws", record.draws.to_string()),
        metric("Losses", record.losses.to_string()),
        metric("Goals Scored", record.goals_for.to_string()),
        metric("Goals Conceded", record.goals_against.to_string()),
        metric("Avg Goals per Match", format_avg(record.avg_goals_for)),
    ]
}

pub fn league_metrics(league: &LeagueOutcomes) -> Vec<Vec<String>> {
    vec![
        metric("Total Matches", league.total_matches.to_string()),
        metric("Total Goals", league.total_goals.to_string()),
        metric("Avg Goals/Match", format_avg(league.avg_goals_per_match)),
        metric("Home Wins", league.home_wins.to_string()),
        metric("Away Wins", league.away_wins.to_string()),
        metric("Draws", league.draws.to_string()),
    ]
}

pub fn export_section(path: &Path, state: &AppState) -> Result<ExportReport> {
    let rows = section_table(state);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(section_label(state.section))?;
        write_rows(sheet, &rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    let report = ExportReport {
        section: state.section,
        rows: rows.len().saturating_sub(1),
    };
    tracing::info!(
        section = section_label(report.section),
        rows = report.rows,
        path = %path.display(),
        "section exported"
    );
    Ok(report)
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn metric(name: &str, value: String) -> Vec<String> {
    vec![name.to_string(), value]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
