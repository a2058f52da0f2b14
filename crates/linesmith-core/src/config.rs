// Configuration: league.toml and odds.toml under `<base>/config/`.
//
// First run seeds `config/` from the shipped `defaults/`; user edits in
// `config/` are never overwritten.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_DIR: &str = "config";
const DEFAULTS_DIR: &str = "defaults";
const LEAGUE_FILE: &str = "league.toml";
const ODDS_FILE: &str = "odds.toml";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("could not seed config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Everything the CLI needs, assembled from both files.
#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub markets: MarketsConfig,
    pub data_paths: DataPaths,
}

/// `league.toml` is a single `[league]` table.
#[derive(Debug, Deserialize)]
struct LeagueToml {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub season: u32,
    /// Week whose matchups get priced when no week is given on the command line.
    pub current_week: u32,
    pub regular_season_weeks: u32,
}

#[derive(Debug, Deserialize)]
struct OddsToml {
    markets: MarketsConfig,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketsConfig {
    /// Bookmaker margin applied to moneylines (0.045 is a standard -110 book).
    pub vig: f64,
    pub include_prop_bets: bool,
    /// Half-width of the multiplicative jitter applied to game totals.
    #[serde(default = "default_total_variance")]
    pub total_variance: f64,
}

fn default_total_variance() -> f64 {
    0.03
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Weekly results CSV, relative to the base directory unless absolute.
    pub results: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse and validate `config/league.toml` and `config/odds.toml` under
/// `base_dir`. Does not touch `defaults/`; see [`load_config_in`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join(CONFIG_DIR);
    let league: LeagueToml = read_toml(&config_dir.join(LEAGUE_FILE))?;
    let odds: OddsToml = read_toml(&config_dir.join(ODDS_FILE))?;

    let config = Config {
        league: league.league,
        markets: odds.markets,
        data_paths: odds.data_paths,
    };
    validate(&config)?;
    Ok(config)
}

/// Copy each file of `defaults/` that `config/` lacks, skipping `*.example`.
///
/// Returns the paths written. With no `defaults/`, an existing `config/` is
/// accepted as-is; with neither directory this is an error.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join(DEFAULTS_DIR);
    let config_dir = base_dir.join(CONFIG_DIR);

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(copy_error(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the workspace root or pass --base-dir",
            base_dir.display()
        )));
    }

    fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let entries = fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut written = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        let Some(file_name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        if source.extension().is_some_and(|ext| ext == "example") {
            continue;
        }
        let target = config_dir.join(file_name);
        if copy_if_absent(&source, &target)? {
            written.push(target);
        }
    }
    Ok(written)
}

/// Create `target` from `source` unless it already exists.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let mut src = fs::File::open(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    io::copy(&mut src, &mut dest)
        .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

/// Seed missing files from `defaults/`, then load from `base_dir`.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

/// [`load_config_in`] for the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_in(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check_unit_range(field: &str, value: f64, max: f64) -> Result<(), ConfigError> {
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("expected 0.0..={max}, got {value}")))
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.current_week == 0 {
        return Err(invalid("league.current_week", "weeks start at 1"));
    }
    if league.regular_season_weeks == 0 {
        return Err(invalid("league.regular_season_weeks", "must be at least 1"));
    }
    check_unit_range("markets.vig", config.markets.vig, 0.25)?;
    check_unit_range("markets.total_variance", config.markets.total_variance, 0.10)?;
    if config.data_paths.results.trim().is_empty() {
        return Err(invalid("data_paths.results", "must name a CSV file"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
