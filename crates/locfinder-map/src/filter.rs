//! Filter engine: city and category predicates over the dataset.
//!
//! [`apply_filters`] is a pure function of the dataset and a
//! [`FilterState`]. Category groups intersect: a record stays visible only if
//! it belongs to every selected group. An empty intersection is reported as
//! `no_match`, which is distinct from "nothing selected".

use std::collections::{BTreeSet, HashSet};

use locfinder_core::LocationRecord;

use crate::dataset::LocationDataset;

/// Ephemeral filter inputs owned by the finder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    country_tab: Option<usize>,
    city: Option<String>,
    /// Checkboxes ticked in the filter panel. They survive closing and
    /// reopening the panel until submitted or cleared.
    staged: BTreeSet<String>,
    /// Category ids in effect.
    applied: BTreeSet<String>,
}

impl FilterState {
    #[must_use]
    pub fn country_tab(&self) -> Option<usize> {
        self.country_tab
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Selecting a country tab resets the city.
    pub fn select_country(&mut self, tab: usize) {
        self.country_tab = Some(tab);
        self.city = None;
    }

    /// Sets or clears the single-value city filter. Blank clears.
    pub fn select_city(&mut self, city: Option<&str>) {
        self.city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);
    }

    /// Ticks or unticks a category checkbox. Returns whether it is now ticked.
    pub fn toggle(&mut self, filter_id: &str) -> bool {
        if self.staged.remove(filter_id) {
            false
        } else {
            self.staged.insert(filter_id.to_owned());
            true
        }
    }

    #[must_use]
    pub fn is_staged(&self, filter_id: &str) -> bool {
        self.staged.contains(filter_id)
    }

    /// Applies the staged checkboxes.
    pub fn submit(&mut self) {
        self.applied.clone_from(&self.staged);
    }

    #[must_use]
    pub fn applied(&self) -> &BTreeSet<String> {
        &self.applied
    }

    /// Count shown on the filter button badge.
    #[must_use]
    pub fn badge_count(&self) -> usize {
        self.staged.len()
    }

    /// Resets tab, city and every category selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.applied.is_empty()
    }
}

/// Result of applying a [`FilterState`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Visible records in dataset order.
    pub visible: Vec<LocationRecord>,
    /// The selected category groups have no record in common. `visible` is
    /// always empty when set.
    pub no_match: bool,
}

/// Computes the visible subset for `state`.
///
/// Selected groups that resolve to no members (unknown id or empty category)
/// are ignored. If no group remains, category filtering is skipped.
#[must_use]
pub fn apply_filters(dataset: &LocationDataset, state: &FilterState) -> FilterOutcome {
    let allowed = intersect_groups(dataset, &state.applied);
    if matches!(&allowed, Some(ids) if ids.is_empty()) {
        tracing::debug!(
            selected = state.applied.len(),
            "category filters have no location in common"
        );
        return FilterOutcome {
            visible: Vec::new(),
            no_match: true,
        };
    }

    let visible = dataset
        .records()
        .iter()
        .filter(|r| state.city().is_none_or(|city| r.in_city(city)))
        .filter(|r| allowed.as_ref().is_none_or(|ids| ids.contains(r.id.as_str())))
        .cloned()
        .collect();

    FilterOutcome {
        visible,
        no_match: false,
    }
}

/// Intersection of the selected groups' member ids, or `None` when no
/// non-empty group is selected.
fn intersect_groups<'a>(
    dataset: &'a LocationDataset,
    selected: &BTreeSet<String>,
) -> Option<HashSet<&'a str>> {
    selected
        .iter()
        .filter_map(|id| dataset.filter_members(id))
        .filter(|members| !members.is_empty())
        .map(|members| members.iter().map(String::as_str).collect::<HashSet<_>>())
        .reduce(|acc, group| acc.intersection(&group).copied().collect())
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
