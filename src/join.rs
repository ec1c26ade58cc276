//! Cross-source join coordination.
//!
//! The three sheets are exported independently and disagree on spelling for
//! the same real-world country. [`Dashboard`] is the one place keys are
//! attached: it runs the shared normalizer over every row of every table and
//! drops the aggregate/rollup pseudo-entities, so a selection made against
//! one table applies to the other two by key equality alone.

use crate::aggregate::{self, CategoryChange, EntityTotal, RankEntry};
use crate::models::{EmissionRecord, NormalizedKey, Observation};
use crate::normalize::{is_excluded, normalize};
use log::info;

/// The three joined long-form tables plus their query surface.
///
/// Tables are read-only snapshots once constructed; every derived view is
/// recomputed from them on demand.
#[derive(Debug, Clone)]
pub struct Dashboard {
    country: Vec<EmissionRecord>,
    sector: Vec<EmissionRecord>,
    lulucf: Vec<EmissionRecord>,
}

/// Attach keys and drop pseudo-entities, identically for every source.
fn attach_keys(observations: Vec<Observation>) -> Vec<EmissionRecord> {
    observations
        .into_iter()
        .filter_map(|obs| {
            let key = normalize(Some(&obs.entity));
            if is_excluded(&key) {
                return None;
            }
            Some(EmissionRecord::from_observation(key, obs))
        })
        .collect()
}

impl Dashboard {
    /// Build the joined view from the three reshaped sources.
    pub fn new(
        country: Vec<Observation>,
        sector: Vec<Observation>,
        lulucf: Vec<Observation>,
    ) -> Self {
        let country = attach_keys(country);
        let sector = attach_keys(sector);
        let lulucf = attach_keys(lulucf);
        info!(
            "joined tables: {} country rows, {} sector rows, {} lulucf rows",
            country.len(),
            sector.len(),
            lulucf.len()
        );
        Self { country, sector, lulucf }
    }

    /// Resolve a free-text country name to its grouping key.
    pub fn resolve(&self, name: &str) -> NormalizedKey {
        normalize(Some(name))
    }

    /// Whether any table has rows for this key.
    pub fn contains(&self, key: &NormalizedKey) -> bool {
        self.country.iter().any(|r| &r.key == key)
            || self.sector.iter().any(|r| &r.key == key)
            || self.lulucf.iter().any(|r| &r.key == key)
    }

    pub fn country_records(&self) -> &[EmissionRecord] {
        &self.country
    }

    pub fn sector_records(&self) -> &[EmissionRecord] {
        &self.sector
    }

    pub fn lulucf_records(&self) -> &[EmissionRecord] {
        &self.lulucf
    }

    /// Inclusive (min, max) year across the totals table, if any rows exist.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let mut years = self.country.iter().map(|r| r.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// The totals series for one country, empty when the key resolves to no
    /// row (an empty-result condition, never a panic).
    pub fn country_series(&self, key: &NormalizedKey) -> Vec<&EmissionRecord> {
        self.country.iter().filter(|r| &r.key == key).collect()
    }

    /// Per-sector rows for one country in one year.
    pub fn sector_breakdown(&self, key: &NormalizedKey, year: i32) -> Vec<&EmissionRecord> {
        self.sector
            .iter()
            .filter(|r| &r.key == key && r.year == year)
            .collect()
    }

    /// LULUCF rows for one country across all years.
    pub fn lulucf_series(&self, key: &NormalizedKey) -> Vec<&EmissionRecord> {
        self.lulucf.iter().filter(|r| &r.key == key).collect()
    }

    /// Country totals for one year, summed over the totals table.
    pub fn totals_for_year(&self, year: i32) -> Vec<EntityTotal> {
        aggregate::totals_for_year(&self.country, year)
    }

    /// Net LULUCF emissions per country for one year (negative = sink).
    pub fn lulucf_totals_for_year(&self, year: i32) -> Vec<EntityTotal> {
        aggregate::totals_for_year(&self.lulucf, year)
    }

    /// Ten-year percent change per sector for one country.
    pub fn decadal_change(&self, key: &NormalizedKey, year: i32) -> Vec<CategoryChange> {
        aggregate::decadal_change(&self.sector, key, year)
    }

    /// Dense rank of every country in every year of the totals table.
    pub fn rank_over_time(&self) -> Vec<RankEntry> {
        aggregate::dense_rank_by_year(&self.country)
    }

    /// Dominant emission sector per country for one year.
    pub fn dominant_sectors(&self, year: i32) -> Vec<EmissionRecord> {
        aggregate::dominant_category(&self.sector, year)
    }

    /// The top-`n` emitters for a year plus the highlighted country.
    pub fn top_emitters(
        &self,
        year: i32,
        n: usize,
        highlight: &NormalizedKey,
    ) -> Vec<EntityTotal> {
        aggregate::top_with_highlight(&self.totals_for_year(year), n, highlight)
    }
}
