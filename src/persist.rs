use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::match_record::ClubId;
use crate::sections::PlayerFilters;
use crate::state::{AppState, Section};

const CACHE_DIR: &str = "football_hub";
const PREFS_FILE: &str = "ui.json";
const PREFS_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PrefsFile {
    version: u32,
    section: Option<Section>,
    #[serde(default)]
    clubs: BTreeSet<String>,
    #[serde(default)]
    nationalities: BTreeSet<String>,
    #[serde(default)]
    positions: BTreeSet<String>,
    #[serde(default)]
    club_id: Option<ClubId>,
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn load_into_state(state: &mut AppState) {
    let Some(path) = prefs_path() else {
        return;
    };
    load_from_path(&path, state);
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = prefs_path() else {
        return;
    };
    save_to_path(&path, state);
}

pub fn load_from_path(path: &Path, state: &mut AppState) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let Ok(prefs) = serde_json::from_str::<PrefsFile>(&raw) else {
        tracing::warn!(path = %path.display(), "ignoring unreadable ui prefs");
        return;
    };
    if prefs.version != PREFS_VERSION {
        return;
    }

    if let Some(section) = prefs.section {
        state.section = section;
    }
    state.player_filters = PlayerFilters {
        clubs: prefs.clubs,
        nationalities: prefs.nationalities,
        positions: prefs.positions,
    };
    state.preferred_club = prefs.club_id;
}

pub fn save_to_path(path: &Path, state: &AppState) {
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let prefs = PrefsFile {
        version: PREFS_VERSION,
        section: Some(state.section),
        clubs: state.player_filters.clubs.clone(),
        nationalities: state.player_filters.nationalities.clone(),
        positions: state.player_filters.positions.clone(),
        club_id: state
            .club_analysis
            .as_ref()
            .map(|a| a.club_id)
            .or(state.preferred_club),
    };

    if let Ok(json) = serde_json::to_string(&prefs) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, path);
        }
    }
}

fn prefs_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(PREFS_FILE))
}
