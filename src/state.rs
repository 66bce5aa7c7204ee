//! Durable state store for keyword research data
//!
//! Persists favorites, saved gigs, analysis history, and generated gigs to a
//! single JSON document. Every read re-parses the file and every mutation
//! rewrites the whole document, so the store itself is the single source of
//! truth — callers keep no in-memory mirror. Reads degrade to the empty
//! document on I/O or parse errors; writes surface their errors so callers
//! can decide whether a lost update matters.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

/// Filename of the state document within the data directory
const STATE_FILE_NAME: &str = "app_state.json";

/// The whole persisted document: four named collections
///
/// The serialized field names are the on-disk contract; external tools that
/// inspect the state file rely on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    /// Favorite keywords; insertion-ordered, no duplicates
    pub favorites: Vec<String>,
    /// Saved gig content bundles, keyed by keyword
    pub saved_gigs: Map<String, Value>,
    /// Analysis results, keyed by keyword; re-analysis replaces the entry
    pub analysis_history: Map<String, Value>,
    /// Generated gig content plus supporting analysis, keyed by keyword
    pub generated_gigs: Map<String, Value>,
}

/// Whole-document persistence for [`AppState`]
///
/// Mutations are read-modify-rewrite of the entire file, written to a
/// sibling temp file and renamed into place so readers never observe a torn
/// document. No cross-process locking is provided: concurrent writers from
/// independent processes race, and the last full rewrite wins.
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Path of the backing JSON document
    state_file: PathBuf,
}

impl StateStore {
    /// Creates a store backed by the XDG data directory
    ///
    /// Uses `~/.local/share/gigscout/app_state.json` on Linux. Returns
    /// `None` if the data directory cannot be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "gigscout")?;
        let state_file = project_dirs.data_local_dir().join(STATE_FILE_NAME);
        Some(Self { state_file })
    }

    /// Creates a store backed by a specific file
    pub fn with_file(state_file: PathBuf) -> Self {
        Self { state_file }
    }

    /// Loads the current document, degrading to the default on any failure
    ///
    /// A missing file is the normal first-run case and is silent; a
    /// malformed or unreadable file is logged.
    pub fn load(&self) -> AppState {
        let content = match fs::read_to_string(&self.state_file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return AppState::default(),
            Err(e) => {
                warn!(path = %self.state_file.display(), error = %e, "failed to read state file");
                return AppState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.state_file.display(), error = %e, "state file is malformed");
                AppState::default()
            }
        }
    }

    /// Replaces the on-disk document with `state`
    ///
    /// Writes the full document to a temp file and renames it over the
    /// target, so a crash mid-write leaves the previous document intact.
    pub fn save_state(&self, state: &AppState) -> io::Result<()> {
        if let Some(parent) = self.state_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let tmp_file = self.state_file.with_extension("json.tmp");
        fs::write(&tmp_file, json)?;
        fs::rename(&tmp_file, &self.state_file)
    }

    /// Resets the document to the four empty collections
    pub fn clear_state(&self) -> io::Result<()> {
        self.save_state(&AppState::default())
    }

    /// Returns the favorite keywords
    pub fn get_favorites(&self) -> Vec<String> {
        self.load().favorites
    }

    /// Adds a keyword to favorites; idempotent
    pub fn add_to_favorites(&self, keyword: &str) -> io::Result<()> {
        let mut state = self.load();
        if !state.favorites.iter().any(|k| k == keyword) {
            state.favorites.push(keyword.to_string());
        }
        self.save_state(&state)
    }

    /// Removes a keyword from favorites; no-op if absent
    pub fn remove_from_favorites(&self, keyword: &str) -> io::Result<()> {
        let mut state = self.load();
        state.favorites.retain(|k| k != keyword);
        self.save_state(&state)
    }

    /// Returns the saved gigs collection
    pub fn get_saved_gigs(&self) -> Map<String, Value> {
        self.load().saved_gigs
    }

    /// Upserts a saved gig for a keyword
    pub fn save_gig(&self, keyword: &str, gig_data: Value) -> io::Result<()> {
        let mut state = self.load();
        state.saved_gigs.insert(keyword.to_string(), gig_data);
        self.save_state(&state)
    }

    /// Deletes the saved gig for a keyword, if present
    pub fn delete_gig(&self, keyword: &str) -> io::Result<()> {
        let mut state = self.load();
        state.saved_gigs.remove(keyword);
        self.save_state(&state)
    }

    /// Returns the analysis history collection
    pub fn get_analysis_history(&self) -> Map<String, Value> {
        self.load().analysis_history
    }

    /// Upserts an analysis result for a keyword, replacing any prior entry
    pub fn add_to_history(&self, keyword: &str, data: Value) -> io::Result<()> {
        let mut state = self.load();
        state.analysis_history.insert(keyword.to_string(), data);
        self.save_state(&state)
    }

    /// Returns the generated gigs collection
    pub fn get_generated_gigs(&self) -> Map<String, Value> {
        self.load().generated_gigs
    }

    /// Upserts generated gig content for a keyword
    pub fn add_generated_gig(&self, keyword: &str, gig_data: Value) -> io::Result<()> {
        let mut state = self.load();
        state.generated_gigs.insert(keyword.to_string(), gig_data);
        self.save_state(&state)
    }
}
