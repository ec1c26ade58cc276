//! End-to-end: CSV files on disk -> store -> reshape -> joined dashboard.

use ghg_rs::models::{COUNTRY_TOTALS, LULUCF, SECTOR_TOTALS};
use ghg_rs::reshape::{SchemaError, reshape};
use ghg_rs::{Dashboard, TableStore};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, text: &str) {
    let mut f = std::fs::File::create(path).unwrap();
    f.write_all(text.as_bytes()).unwrap();
}

const COUNTRY_CSV: &str = "\
Country,2010,2020
Atlantis,100,150
Buranda,90,95
Cascadia,80,95
World Total,500,600
";

const SECTOR_CSV: &str = "\
Country,Sector,2010,2020
ATLANTIS,Power,60,90
ATLANTIS,Transport,40,60
Buranda,Power,0,50
Buranda,Transport,90,45
WORLD TOTAL,Power,500,600
";

const LULUCF_CSV: &str = "\
Country,Sector,Macro-region,2010,2020
Atlantis,Forest land,Oceania,-20,-25
Buranda,Cropland,Africa,5,4
world  total,Forest land,World,-100,-120
";

fn build(dir: &Path) -> Dashboard {
    let country_p = dir.join("country.csv");
    let sector_p = dir.join("sector.csv");
    let lulucf_p = dir.join("lulucf.csv");
    write_file(&country_p, COUNTRY_CSV);
    write_file(&sector_p, SECTOR_CSV);
    write_file(&lulucf_p, LULUCF_CSV);

    let mut store = TableStore::new();
    let country = reshape(&store.load(&country_p).unwrap(), &COUNTRY_TOTALS).unwrap();
    let sector = reshape(&store.load(&sector_p).unwrap(), &SECTOR_TOTALS).unwrap();
    let lulucf = reshape(&store.load(&lulucf_p).unwrap(), &LULUCF).unwrap();
    Dashboard::new(country, sector, lulucf)
}

#[test]
fn rollup_rows_are_dropped_from_every_table() {
    let dir = tempdir().unwrap();
    let dash = build(dir.path());

    for records in [
        dash.country_records(),
        dash.sector_records(),
        dash.lulucf_records(),
    ] {
        assert!(
            records
                .iter()
                .all(|r| r.key.as_str() != Some("world total")),
            "rollup row survived the join"
        );
    }
    // Real countries survive.
    assert_eq!(dash.totals_for_year(2020).len(), 3);
}

#[test]
fn selection_in_one_table_applies_to_the_others() {
    let dir = tempdir().unwrap();
    let dash = build(dir.path());

    // Totals table says "Atlantis", sector table says "ATLANTIS".
    let key = dash.resolve("atlantis");
    assert_eq!(dash.country_series(&key).len(), 2);
    let breakdown = dash.sector_breakdown(&key, 2020);
    assert_eq!(breakdown.len(), 2);

    let changes = dash.decadal_change(&key, 2020);
    assert_eq!(changes.len(), 2);
    let power = changes.iter().find(|c| c.category == "Power").unwrap();
    assert!((power.percent - 50.0).abs() < 1e-12);
}

#[test]
fn zero_base_sector_is_excluded_from_decadal_change() {
    let dir = tempdir().unwrap();
    let dash = build(dir.path());

    // Buranda Power was 0 in 2010: undefined change, silently excluded.
    let key = dash.resolve("Buranda");
    let changes = dash.decadal_change(&key, 2020);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].category, "Transport");
    assert!((changes[0].percent + 50.0).abs() < 1e-12);
}

#[test]
fn rank_and_top_emitters_agree_on_ties() {
    let dir = tempdir().unwrap();
    let dash = build(dir.path());

    // 2020: Atlantis 150, Buranda 95, Cascadia 95 -> dense ranks 1, 2, 2.
    let ranks: Vec<_> = dash
        .rank_over_time()
        .into_iter()
        .filter(|r| r.year == 2020)
        .collect();
    let rank_of = |name: &str| {
        let key = dash.resolve(name);
        ranks.iter().find(|r| r.key == key).unwrap().rank
    };
    assert_eq!(rank_of("Atlantis"), 1);
    assert_eq!(rank_of("Buranda"), 2);
    assert_eq!(rank_of("Cascadia"), 2);

    // Top-2 with Cascadia highlighted: the tie at 95 goes to Buranda
    // (encountered first), Cascadia is appended.
    let key = dash.resolve("Cascadia");
    let top = dash.top_emitters(2020, 2, &key);
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].entity, "Atlantis");
    assert_eq!(top[1].entity, "Buranda");
    assert_eq!(top[2].entity, "Cascadia");
}

#[test]
fn lulucf_sinks_keep_their_sign() {
    let dir = tempdir().unwrap();
    let dash = build(dir.path());

    let sinks = dash.lulucf_totals_for_year(2020);
    let key = dash.resolve("Atlantis");
    let atlantis = sinks.iter().find(|t| t.key == key).unwrap();
    assert_eq!(atlantis.value, -25.0);
}

#[test]
fn dominant_sector_map_omits_entities_without_rows() {
    let dir = tempdir().unwrap();
    let dash = build(dir.path());

    let dom = dash.dominant_sectors(2020);
    // Cascadia has no sector rows: omitted, not an error.
    assert_eq!(dom.len(), 2);
    let key = dash.resolve("Atlantis");
    let atlantis = dom.iter().find(|r| r.key == key).unwrap();
    assert_eq!(atlantis.sector.as_deref(), Some("Power"));
}

#[test]
fn one_broken_dataset_does_not_block_the_others() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.csv");
    let good = dir.path().join("good.csv");
    write_file(&bad, "Nation,2020\nAtlantis,1\n");
    write_file(&good, "Country,2020\nAtlantis,1\n");

    let mut store = TableStore::new();
    let err = reshape(&store.load(&bad).unwrap(), &COUNTRY_TOTALS).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingColumn { table: "country_totals", column: "Country" }
    );
    assert!(err.to_string().contains("Country"));

    // The well-formed dataset still loads.
    let obs = reshape(&store.load(&good).unwrap(), &COUNTRY_TOTALS).unwrap();
    assert_eq!(obs.len(), 1);
}
