//! Derived views over the long-form tables.
//!
//! Every function here is pure: it reads a slice of keyed records and returns
//! an owned result, recomputed on demand when the year or selection changes.
//! Missing observations are data-exclusion conditions, not errors; they drop
//! out of the result silently.
//!
//! Tie-break policy: wherever two rows compare equal (dominant category,
//! top-N cutoff), the first row encountered in input order wins. This is a
//! deliberate, documented choice, not an accident of iteration order.

use crate::models::{EmissionRecord, NormalizedKey};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summed emissions for one entity in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTotal {
    pub key: NormalizedKey,
    /// Display spelling from the first record encountered for this entity.
    pub entity: String,
    pub value: f64,
}

/// Percent change of one category over a ten-year window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryChange {
    pub category: String,
    pub percent: f64,
}

/// Dense rank of one entity within one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub key: NormalizedKey,
    pub entity: String,
    pub year: i32,
    pub value: f64,
    /// 1 = largest value that year; ties share a rank, no gaps.
    pub rank: u32,
}

/// Sum observed values per entity for a fixed year.
///
/// Entities with no observation in `year` are omitted. Groups appear in
/// first-encounter order, which downstream tie-breaks rely on.
pub fn totals_for_year(records: &[EmissionRecord], year: i32) -> Vec<EntityTotal> {
    sum_by_entity(records.iter(), year)
}

fn sum_by_entity<'a>(
    rows: impl Iterator<Item = &'a EmissionRecord>,
    year: i32,
) -> Vec<EntityTotal> {
    let mut index: AHashMap<NormalizedKey, usize> = AHashMap::new();
    let mut out: Vec<EntityTotal> = Vec::new();
    for r in rows {
        if r.year != year {
            continue;
        }
        let Some(v) = r.value else { continue };
        match index.get(&r.key) {
            Some(&i) => out[i].value += v,
            None => {
                index.insert(r.key.clone(), out.len());
                out.push(EntityTotal {
                    key: r.key.clone(),
                    entity: r.entity.clone(),
                    value: v,
                });
            }
        }
    }
    out
}

/// Per-category percent change for one entity between `year - 10` and `year`.
///
/// A category is excluded when either endpoint has no observation, or when
/// the base value is exactly zero (undefined change, not an error). Output
/// order follows the first encounter of each category in the input.
pub fn decadal_change(
    records: &[EmissionRecord],
    key: &NormalizedKey,
    year: i32,
) -> Vec<CategoryChange> {
    let base_year = year - 10;
    let mut order: Vec<&str> = Vec::new();
    let mut endpoints: AHashMap<&str, (Option<f64>, Option<f64>)> = AHashMap::new();
    for r in records {
        if &r.key != key {
            continue;
        }
        let Some(sector) = r.sector.as_deref() else { continue };
        let Some(v) = r.value else { continue };
        let slot = endpoints.entry(sector).or_insert_with(|| {
            order.push(sector);
            (None, None)
        });
        if r.year == base_year {
            slot.0 = Some(v);
        } else if r.year == year {
            slot.1 = Some(v);
        }
    }

    order
        .into_iter()
        .filter_map(|sector| {
            let (base, end) = endpoints[sector];
            let (base, end) = (base?, end?);
            if base == 0.0 {
                return None;
            }
            Some(CategoryChange {
                category: sector.to_string(),
                percent: (end - base) / base * 100.0,
            })
        })
        .collect()
}

/// Dense rank of every entity within every year, descending by value.
///
/// Ties share a rank and the next distinct value gets exactly rank + 1; with
/// k entities tied at the top, all k rank 1 and the next entity ranks 2.
pub fn dense_rank_by_year(records: &[EmissionRecord]) -> Vec<RankEntry> {
    // Group per year first; each year ranks independently.
    let mut by_year: BTreeMap<i32, Vec<&EmissionRecord>> = BTreeMap::new();
    for r in records {
        by_year.entry(r.year).or_default().push(r);
    }

    let mut out = Vec::new();
    for (year, rows) in by_year {
        let totals = sum_by_entity(rows.iter().copied(), year);
        let mut values: Vec<f64> = totals.iter().map(|t| t.value).collect();
        values.sort_by(|a, b| b.total_cmp(a));
        values.dedup();
        for t in totals {
            // values is sorted descending and deduped, so position + 1 is the
            // dense rank.
            let rank = values
                .iter()
                .position(|v| *v == t.value)
                .map(|p| p as u32 + 1)
                .unwrap_or(0);
            out.push(RankEntry {
                key: t.key,
                entity: t.entity,
                year,
                value: t.value,
                rank,
            });
        }
    }
    out
}

/// For a fixed year, the single maximum-value category row per entity.
///
/// Entities with no rows for the year are omitted. On a tie for the maximum
/// the first row encountered in input order is kept. Output follows entity
/// first-encounter order.
pub fn dominant_category(records: &[EmissionRecord], year: i32) -> Vec<EmissionRecord> {
    let mut index: AHashMap<&NormalizedKey, usize> = AHashMap::new();
    let mut best: Vec<&EmissionRecord> = Vec::new();
    for r in records {
        if r.year != year {
            continue;
        }
        let Some(v) = r.value else { continue };
        match index.get(&r.key) {
            Some(&i) => {
                // strictly greater, so the earlier row wins ties
                if v > best[i].value.unwrap_or(f64::NEG_INFINITY) {
                    best[i] = r;
                }
            }
            None => {
                index.insert(&r.key, best.len());
                best.push(r);
            }
        }
    }
    best.into_iter().cloned().collect()
}

/// The `n` largest totals plus a caller-designated highlight entity.
///
/// The sort is stable, so entities tied in value keep their encounter order.
/// When the highlight is already inside the cut it appears once; when it is
/// outside, its total is appended, giving `n + 1` entries. A highlight with
/// no total for the year changes nothing.
pub fn top_with_highlight(
    totals: &[EntityTotal],
    n: usize,
    highlight: &NormalizedKey,
) -> Vec<EntityTotal> {
    let mut sorted: Vec<EntityTotal> = totals.to_vec();
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
    let mut out: Vec<EntityTotal> = sorted.iter().take(n).cloned().collect();
    if !out.iter().any(|t| &t.key == highlight) {
        if let Some(sel) = sorted.iter().find(|t| &t.key == highlight) {
            out.push(sel.clone());
        }
    }
    out
}
