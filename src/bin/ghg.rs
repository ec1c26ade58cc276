use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ghg_rs::models::{COUNTRY_TOTALS, LULUCF, SECTOR_TOTALS};
use ghg_rs::{Dashboard, NormalizedKey, TableStore, reshape};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ghg",
    version,
    about = "Load, reshape & summarize greenhouse-gas emissions data"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print derived views for a selected country and year.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// CSV with GHG totals by country (Country, <year>...)
    #[arg(long)]
    country_totals: PathBuf,
    /// CSV with GHG by sector and country (Country, Sector, <year>...)
    #[arg(long)]
    by_sector: PathBuf,
    /// CSV with LULUCF figures (Country, Sector, Macro-region, <year>...)
    #[arg(long)]
    lulucf: PathBuf,
    /// Country to highlight; falls back to the top emitter when absent.
    #[arg(short, long, default_value = "United States")]
    country: String,
    /// Report year; defaults to the latest year in the totals table.
    #[arg(short, long)]
    year: Option<i32>,
    /// How many top emitters to list.
    #[arg(long, default_value_t = 10)]
    top: usize,
    /// Emit the report as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn fmt_val(x: f64) -> String {
    // Up to 3 decimals, trailing zeros trimmed.
    let s = format!("{x:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Report(args) => cmd_report(args),
    }
}

fn cmd_report(args: ReportArgs) -> Result<()> {
    let mut store = TableStore::new();
    let country = reshape::reshape(&*store.load(&args.country_totals)?, &COUNTRY_TOTALS)?;
    let sector = reshape::reshape(&*store.load(&args.by_sector)?, &SECTOR_TOTALS)?;
    let lulucf = reshape::reshape(&*store.load(&args.lulucf)?, &LULUCF)?;
    let dash = Dashboard::new(country, sector, lulucf);

    let (_, latest) = dash
        .year_range()
        .ok_or_else(|| anyhow::anyhow!("totals table contains no data rows"))?;
    let year = args.year.unwrap_or(latest);

    let totals = dash.totals_for_year(year);
    if totals.is_empty() {
        anyhow::bail!("no observations for year {year}");
    }

    // Fall back to the largest emitter when the requested name matches no row.
    let mut highlight = dash.resolve(&args.country);
    if !dash.contains(&highlight) {
        let top = totals
            .iter()
            .reduce(|best, t| if t.value > best.value { t } else { best })
            .map(|t| t.key.clone());
        if let Some(top) = top {
            eprintln!("'{}' matches no country; using the top emitter", args.country);
            highlight = top;
        }
    }
    let highlight_name = display_name(&dash, &highlight).unwrap_or_else(|| args.country.clone());

    let top = dash.top_emitters(year, args.top, &highlight);
    let changes = dash.decadal_change(&highlight, year);
    let dominant = dash.dominant_sectors(year);
    let sinks = dash.lulucf_totals_for_year(year);
    let ranks: Vec<_> = dash
        .rank_over_time()
        .into_iter()
        .filter(|r| r.key == highlight)
        .collect();

    if args.json {
        let doc = json!({
            "year": year,
            "country": highlight_name,
            "top_emitters": top,
            "decadal_change": changes,
            "dominant_sectors": dominant,
            "lulucf_totals": sinks,
            "rank_over_time": ranks,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Top {} emitters + {} ({})", args.top, highlight_name, year);
    for (i, t) in top.iter().enumerate() {
        let marker = if t.key == highlight { " *" } else { "" };
        println!("  {:>2}. {}  {}{}", i + 1, t.entity, fmt_val(t.value), marker);
    }

    println!("\nSector change {}..{} for {}", year - 10, year, highlight_name);
    if changes.is_empty() {
        println!("  no sector with observations in both years");
    }
    for c in &changes {
        println!("  {}  {:+.1}%", c.category, c.percent);
    }

    if let Some(dom) = dominant.iter().find(|r| r.key == highlight) {
        if let Some(sector) = dom.sector.as_deref() {
            println!("\nDominant sector in {}: {}", year, sector);
        }
    }

    if let Some(sink) = sinks.iter().find(|t| t.key == highlight) {
        let kind = if sink.value < 0.0 { "net sink" } else { "net source" };
        println!("LULUCF {}: {} ({})", year, fmt_val(sink.value), kind);
    }

    if !ranks.is_empty() {
        print!("\nRank trajectory:");
        for r in &ranks {
            print!(" {}:{}", r.year, r.rank);
        }
        println!();
    }

    Ok(())
}

fn display_name(dash: &Dashboard, key: &NormalizedKey) -> Option<String> {
    dash.country_series(key)
        .first()
        .map(|r| r.entity.clone())
}
