//! Debounced place search feeding the autocomplete dropdown.
//!
//! Each keystroke aborts the previous debounce/request task and bumps a
//! generation counter; a task only publishes results if its generation is
//! still current, so a stale response can never overwrite a newer one.

use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use locfinder_core::{AppConfig, Coordinate};
use locfinder_geocoder::{Geocode, GeocodeResult};
use regex::Regex;
use tokio::task::JoinHandle;

use crate::dataset::LocationDataset;
use crate::surface::MapNavigator;

static SUGGESTION_WORD_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,]+").expect("valid suggestion split regex"));

/// What the dropdown shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestions {
    /// Query too short, blank, or a suggestion was just picked.
    Hidden,
    /// The dropdown is open but nothing matches.
    NotFound,
    Items(Vec<String>),
}

#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_len: usize,
    /// Zoom used when flying to the venue nearest a picked suggestion.
    pub focus_zoom: f64,
}

impl SearchSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.search_debounce_ms),
            min_query_len: config.search_min_query_len,
            focus_zoom: config.map.focus_zoom,
        }
    }
}

#[derive(Debug, Default)]
struct SearchSession {
    generation: u64,
    suggestions: Vec<String>,
    /// Coordinate of the top result of the last completed query.
    last_coordinate: Option<Coordinate>,
}

/// Whether `suggestion` should be offered for `query`.
///
/// Suggestion words are split on whitespace and commas, query words on
/// whitespace. Matching is case-insensitive: any query word must be a
/// prefix of any suggestion word.
#[must_use]
pub fn matches_query(suggestion: &str, query: &str) -> bool {
    let suggestion = suggestion.to_lowercase();
    let words: Vec<&str> = SUGGESTION_WORD_SPLIT
        .split(&suggestion)
        .filter(|w| !w.is_empty())
        .collect();
    query
        .to_lowercase()
        .split_whitespace()
        .any(|q| words.iter().any(|w| w.starts_with(q)))
}

pub struct SearchController {
    geocoder: Option<Arc<dyn Geocode>>,
    settings: SearchSettings,
    query: String,
    /// Text of the suggestion just picked; its echo must not search again.
    selected: Option<String>,
    session: Arc<Mutex<SearchSession>>,
    task: Option<JoinHandle<()>>,
}

impl SearchController {
    /// `geocoder` is `None` when no access token is configured; queries are
    /// then accepted but never sent.
    #[must_use]
    pub fn new(geocoder: Option<Arc<dyn Geocode>>, settings: SearchSettings) -> Self {
        Self {
            geocoder,
            settings,
            query: String::new(),
            selected: None,
            session: Arc::new(Mutex::new(SearchSession::default())),
            task: None,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Handles new input text.
    ///
    /// Supersedes any pending or in-flight search and schedules a new one
    /// after the debounce delay. Must be called from within a Tokio runtime.
    pub fn set_query(&mut self, text: &str) {
        if self.selected.take().is_some_and(|picked| picked == text) {
            self.query = text.to_owned();
            return;
        }

        self.query = text.to_owned();
        self.abort_in_flight();

        let blank = text.trim().is_empty();
        let generation = {
            let mut session = lock(&self.session);
            session.generation += 1;
            if blank {
                session.suggestions.clear();
            }
            session.generation
        };
        if blank {
            return;
        }
        let Some(geocoder) = self.geocoder.clone() else {
            return;
        };

        let session = Arc::clone(&self.session);
        let query = text.to_owned();
        let delay = self.settings.debounce;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = match geocoder.geocode(&query).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(error = %e, query = %query, "place search failed");
                    GeocodeResult::default()
                }
            };

            let mut session = lock(&session);
            if session.generation != generation {
                tracing::debug!(query = %query, "discarding superseded search result");
                return;
            }
            session.suggestions = result.suggestions;
            if result.top.is_some() {
                session.last_coordinate = result.top;
            }
        }));
    }

    /// The dropdown contents for the current query.
    #[must_use]
    pub fn suggestions(&self) -> Suggestions {
        if self.selected.is_some()
            || self.query.trim().is_empty()
            || self.query.chars().count() < self.settings.min_query_len
        {
            return Suggestions::Hidden;
        }
        let session = lock(&self.session);
        let items: Vec<String> = session
            .suggestions
            .iter()
            .filter(|s| matches_query(s, &self.query))
            .cloned()
            .collect();
        if items.is_empty() {
            Suggestions::NotFound
        } else {
            Suggestions::Items(items)
        }
    }

    /// Picks a suggestion.
    ///
    /// Sets the query to the suggestion without searching again, then flies
    /// to the venue nearest the last resolved coordinate. Returns that
    /// venue's id.
    pub fn select(
        &mut self,
        suggestion: &str,
        dataset: &LocationDataset,
        navigator: &mut dyn MapNavigator,
    ) -> Option<String> {
        self.abort_in_flight();
        let target = {
            let mut session = lock(&self.session);
            session.generation += 1;
            session.suggestions.clear();
            session.last_coordinate
        };
        suggestion.clone_into(&mut self.query);
        self.selected = Some(suggestion.to_owned());

        let Some(target) = target else {
            tracing::debug!(suggestion = %suggestion, "no resolved coordinate for suggestion");
            return None;
        };
        let record = dataset.nearest(&target)?;
        let at = record.coordinate?;
        navigator.fly_to_with_popup(at, record, Some(self.settings.focus_zoom));
        tracing::debug!(location_id = %record.id, "flying to nearest location");
        Some(record.id.clone())
    }

    /// Waits for the pending search, if any, to finish.
    pub async fn settled(&mut self) {
        if let Some(task) = self.task.take() {
            // A cancelled task is already superseded.
            let _ = task.await;
        }
    }

    /// Aborts any pending search. Results that were still in flight are
    /// discarded.
    pub fn cancel(&mut self) {
        self.abort_in_flight();
        lock(&self.session).generation += 1;
    }

    fn abort_in_flight(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

fn lock(session: &Mutex<SearchSession>) -> MutexGuard<'_, SearchSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
