//! Country-name canonicalization.
//!
//! The three source tables spell the same country with inconsistent case,
//! accents, and punctuation ("Côte d'Ivoire", "COTE D IVOIRE", ...). Every
//! cross-table comparison goes through [`normalize`]; raw display strings are
//! reserved for rendering.

use crate::models::NormalizedKey;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Aggregate/rollup rows that must not be treated as countries.
///
/// Stored in already-normalized form; membership is checked after
/// normalization so case, spacing, and punctuation variants are all caught.
const EXCLUDED_PSEUDO_ENTITIES: &[&str] = &[
    "global total",
    "world",
    "world total",
    "international transport",
    "statistical difference",
    "other",
];

/// Canonicalize a display name for equality comparison.
///
/// `None` maps to [`NormalizedKey::Absent`]. Otherwise the name is trimmed,
/// NFD-decomposed with combining marks dropped (so accented letters fall back
/// to their base letter), lowercased, stripped of anything that is not an
/// ASCII letter, digit, or space, and whitespace runs are collapsed to one
/// space. Pure and deterministic; applying it to its own output is a no-op.
pub fn normalize(name: Option<&str>) -> NormalizedKey {
    let Some(raw) = name else {
        return NormalizedKey::Absent;
    };

    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.trim().nfd().filter(|c| !is_combining_mark(*c)) {
        for lc in c.to_lowercase() {
            if lc.is_whitespace() {
                pending_space = true;
            } else if lc.is_ascii_lowercase() || lc.is_ascii_digit() {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(lc);
            }
            // anything else (punctuation, symbols) is dropped
        }
    }
    NormalizedKey::Key(out)
}

/// Whether a key names an aggregate/rollup pseudo-entity ("World Total" and
/// friends). `Absent` is never excluded here; absent names are a separate
/// condition handled by the caller.
pub fn is_excluded(key: &NormalizedKey) -> bool {
    match key.as_str() {
        Some(s) => EXCLUDED_PSEUDO_ENTITIES.contains(&s),
        None => false,
    }
}
