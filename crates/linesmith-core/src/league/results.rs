// Weekly results loading.
//
// One CSV row per team per week. Two rows sharing `(week, matchup_id)` are
// opponents; `points` is empty for games that have not been played yet.

use crate::league::RosterId;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One team's line for one scoring week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyResult {
    pub week: u32,
    pub matchup_id: u32,
    pub roster_id: RosterId,
    pub owner_id: Option<String>,
    pub team_name: String,
    /// `None` until the week has been played.
    pub points: Option<f64>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// Extra columns are ignored by the csv deserializer.
#[derive(Debug, Deserialize)]
struct RawResultRow {
    week: u32,
    matchup_id: u32,
    roster_id: RosterId,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default, alias = "name")]
    team_name: String,
    #[serde(default)]
    points: Option<f64>,
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_results_from_reader<R: Read>(rdr: R) -> Result<Vec<WeeklyResult>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut results = Vec::new();
    for row in reader.deserialize::<RawResultRow>() {
        match row {
            Ok(raw) => {
                if raw.points.is_some_and(|p| !p.is_finite()) {
                    warn!(
                        "skipping week {} roster {}: non-finite points value",
                        raw.week, raw.roster_id
                    );
                    continue;
                }
                let owner_id = raw
                    .owner_id
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty());
                let team_name = match raw.team_name.trim() {
                    "" => format!("Team {}", raw.roster_id),
                    name => name.to_string(),
                };
                results.push(WeeklyResult {
                    week: raw.week,
                    matchup_id: raw.matchup_id,
                    roster_id: raw.roster_id,
                    owner_id,
                    team_name,
                    points: raw.points,
                });
            }
            Err(e) => {
                warn!("skipping malformed result row: {}", e);
            }
        }
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load weekly results from a CSV file. Fails when no valid row survives.
pub fn load_results(path: &Path) -> Result<Vec<WeeklyResult>, ResultsError> {
    let file = std::fs::File::open(path).map_err(|e| ResultsError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let results = load_results_from_reader(file).map_err(|e| ResultsError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if results.is_empty() {
        return Err(ResultsError::Validation(format!(
            "{} produced zero valid rows",
            path.display()
        )));
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
