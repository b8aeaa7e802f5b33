use serde::{Deserialize, Serialize};

/// Similarity below which a stated path is treated as a new file.
pub const NEW_FILE_THRESHOLD: f64 = 0.6;
/// Allowed deviation, in lines, between a candidate window and the query.
pub const WINDOW_TOLERANCE: usize = 5;
pub const BODY_WEIGHT: f64 = 1.0;
/// Weight of the first-line and last-line similarity each.
pub const ENDPOINT_WEIGHT: f64 = 3.0;
/// Highest score the matcher can produce with the default weights.
pub const MAX_SCORE: f64 = BODY_WEIGHT + 2.0 * ENDPOINT_WEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditFormat {
    #[default]
    UnifiedDiff,
    SearchReplace,
    WholeFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub window_tolerance: usize,
    pub body_weight: f64,
    pub endpoint_weight: f64,
    /// Best scores at or below this are rejected.
    pub min_score: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            window_tolerance: WINDOW_TOLERANCE,
            body_weight: BODY_WEIGHT,
            endpoint_weight: ENDPOINT_WEIGHT,
            min_score: super::types::Match::NO_MATCH_SCORE,
        }
    }
}

impl MatchConfig {
    pub fn max_score(&self) -> f64 {
        self.body_weight + 2.0 * self.endpoint_weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub new_file_threshold: f64,
    pub edit_format: EditFormat,
    pub matcher: MatchConfig,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            new_file_threshold: NEW_FILE_THRESHOLD,
            edit_format: EditFormat::default(),
            matcher: MatchConfig::default(),
        }
    }
}
