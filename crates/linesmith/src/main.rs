// Linesmith entry point.
//
// Startup sequence:
// 1. Parse arguments, initialize tracing (stderr, so stdout stays JSON)
// 2. Load config (copying defaults on first run)
// 3. Load weekly results, aggregate season stats up to the target week
// 4. Price every matchup of the week
// 5. Print the report as JSON

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use linesmith_core::config;
use linesmith_core::league::{results, schedule, season};
use linesmith_core::odds::markets::{
    generate_clean_betting_markets, BettingMarkets, MarketOptions,
};

/// Sportsbook-style lines for a fantasy football league week.
#[derive(Parser, Debug)]
#[command(name = "linesmith")]
#[command(version)]
#[command(about = "Synthetic betting markets for fantasy football matchups", long_about = None)]
struct Cli {
    /// Directory holding defaults/, config/ and the results data
    #[arg(long, env = "LINESMITH_BASE_DIR", default_value = ".")]
    base_dir: PathBuf,

    /// Week to price (otherwise `current_week` from league.toml)
    #[arg(short, long)]
    week: Option<u32>,

    /// Skip prop bets even when odds.toml enables them
    #[arg(long)]
    no_props: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct MarketReport {
    league: String,
    season: u32,
    week: u32,
    generated_at: DateTime<Utc>,
    markets: Vec<BettingMarkets>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Tracing
    init_tracing()?;

    // 2. Config
    let config = config::load_config_in(&cli.base_dir).context("failed to load configuration")?;
    let week = cli.week.unwrap_or(config.league.current_week);
    if week == 0 || week > config.league.regular_season_weeks {
        anyhow::bail!(
            "week {} is outside the regular season (1-{})",
            week,
            config.league.regular_season_weeks
        );
    }
    info!(
        "Config loaded: league={}, season {}, pricing week {}",
        config.league.name, config.league.season, week
    );

    // 3. Results and season stats
    let results_path = resolve_data_path(&cli.base_dir, &config.data_paths.results);
    let results = results::load_results(&results_path)
        .with_context(|| format!("failed to load results from {}", results_path.display()))?;
    let stats = season::build_season_stats(&results, week);
    info!(
        "Loaded {} result rows, {} teams",
        results.len(),
        stats.len()
    );

    // 4. Markets
    let matchups = schedule::matchups_for_week(&results, week);
    if matchups.is_empty() {
        warn!("No matchups found for week {}", week);
    }
    let mut options = MarketOptions::from_config(&config, week);
    if cli.no_props {
        options.include_prop_bets = false;
    }
    let markets: Vec<BettingMarkets> = matchups
        .iter()
        .map(|m| generate_clean_betting_markets(m, &stats, &options))
        .collect();
    info!("Priced {} matchups", markets.len());

    // 5. Report
    let report = MarketReport {
        league: config.league.name.clone(),
        season: config.league.season,
        week,
        generated_at: Utc::now(),
        markets,
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize market report")?;
    println!("{json}");

    Ok(())
}

/// Relative data paths are taken from the base directory.
fn resolve_data_path(base_dir: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Initialize tracing to stderr; stdout carries the JSON report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linesmith=info,linesmith_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
