use serde::{Deserialize, Serialize};

/// Canonical grouping key derived from a display name.
///
/// Keys exist only for equality and grouping across the three source tables;
/// they are never rendered. `Absent` is the distinguished value for a
/// missing/null name and can never collide with a legitimately empty name,
/// which normalizes to `Key(String::new())`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NormalizedKey {
    Absent,
    Key(String),
}

impl NormalizedKey {
    /// The key string, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NormalizedKey::Absent => None,
            NormalizedKey::Key(s) => Some(s.as_str()),
        }
    }
}

/// Un-keyed long-form row produced by reshaping a wide table.
///
/// `value` is `None` when the source cell was empty or not a number: a
/// missing observation propagates as "no data for that entity/year", never
/// as zero. Negative values are valid (LULUCF net sinks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub entity: String,
    pub sector: Option<String>,
    pub region: Option<String>,
    pub year: i32,
    pub value: Option<f64>,
}

/// Tidy row used by the aggregate engine: an [`Observation`] with the
/// normalized key attached by the join coordinator. Immutable once built;
/// `entity` keeps the original display spelling for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub key: NormalizedKey,
    pub entity: String,
    pub sector: Option<String>,
    pub region: Option<String>,
    pub year: i32,
    pub value: Option<f64>,
}

impl EmissionRecord {
    pub fn from_observation(key: NormalizedKey, obs: Observation) -> Self {
        Self {
            key,
            entity: obs.entity,
            sector: obs.sector,
            region: obs.region,
            year: obs.year,
            value: obs.value,
        }
    }
}

/// Declared shape of one wide source table: which headers identify a row.
/// Any non-id header made solely of digits is a year column; anything else
/// is passed through and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Short table name used in error messages ("country_totals", ...).
    pub name: &'static str,
    /// Header of the entity (country) column.
    pub entity_column: &'static str,
    /// Header of the sector/category column, if the table has one.
    pub sector_column: Option<&'static str>,
    /// Header of the macro-region column, if the table has one.
    pub region_column: Option<&'static str>,
}

/// GHG totals by country: `Country`, then year columns.
pub const COUNTRY_TOTALS: TableSchema = TableSchema {
    name: "country_totals",
    entity_column: "Country",
    sector_column: None,
    region_column: None,
};

/// GHG by sector and country: `Country`, `Sector`, then year columns.
pub const SECTOR_TOTALS: TableSchema = TableSchema {
    name: "sector_totals",
    entity_column: "Country",
    sector_column: Some("Sector"),
    region_column: None,
};

/// LULUCF sheet: `Country`, `Sector`, `Macro-region`, then year columns.
pub const LULUCF: TableSchema = TableSchema {
    name: "lulucf",
    entity_column: "Country",
    sector_column: Some("Sector"),
    region_column: Some("Macro-region"),
};
