//! Progressive-overload evaluation over the shared exercise history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{percent_delta, Metric, TrendDirection};
use crate::config::OverloadConfig;
use crate::models::SessionEntry;
use crate::store::ExerciseHistory;

/// Weight increment range suggested below the heavy-bar threshold (kg).
const LIGHT_INCREMENT_KG: (f64, f64) = (1.0, 2.5);

/// Weight increment range suggested at or above the heavy-bar threshold (kg).
const HEAVY_INCREMENT_KG: (f64, f64) = (2.5, 5.0);

/// Volume change band treated as stable in progress summaries (percent).
const STABLE_BAND_PERCENT: f64 = 5.0;

/// Outcome of comparing the two most recent sessions of an exercise.
///
/// Variants carry structured deltas only; message rendering happens in
/// [`super::feedback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    /// Fewer than two sessions logged
    InsufficientData { sessions: usize },
    /// Weight went up between the two most recent sessions
    WeightIncrease {
        previous_kg: f64,
        current_kg: f64,
        percent: f64,
    },
    /// Reps went up at the same or lower weight
    RepIncrease { previous: u32, current: u32 },
    /// Sets went up
    SetIncrease { previous: u32, current: u32 },
    /// Total volume went up without a single-field increase
    VolumeIncrease {
        previous: f64,
        current: f64,
        percent: f64,
    },
    /// The last sessions share an identical prescription
    Stagnation {
        sessions: usize,
        suggestion: StagnationSuggestion,
    },
    /// No improvement, but no stagnation run either
    Consistent,
}

/// Deterministic break-the-plateau suggestion derived from the current
/// prescription. Always renders to non-empty text: the technique hints are
/// fixed and appended at the presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagnationSuggestion {
    pub current_weight_kg: f64,
    pub current_reps: u32,
    pub current_sets: u32,
    /// Suggested weight bump range (kg), sized to the bar weight
    pub weight_increment_kg: (f64, f64),
    /// Worth chasing extra reps (below the rep ceiling)
    pub add_reps: bool,
    /// Worth adding a set (below the set ceiling)
    pub add_sets: bool,
}

/// Result of checking a candidate session against historical maxima.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrCheck {
    /// No history for this exercise yet
    FirstSession,
    /// One record per metric strictly exceeded
    Records(Vec<PrRecord>),
    /// Nothing exceeded (ties do not count)
    NoRecord,
}

/// A single personal record: the candidate value against the old best.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrRecord {
    pub metric: Metric,
    pub previous_best: f64,
    pub value: f64,
}

/// Historical maxima for one exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecords {
    pub exercise: String,
    pub max_weight_kg: f64,
    pub max_reps: u32,
    pub max_volume: f64,
    pub sessions: usize,
    pub last_trained: DateTime<Utc>,
}

/// First-to-last progression for one exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub exercise: String,
    pub sessions: usize,
    pub first_session: DateTime<Utc>,
    pub last_session: DateTime<Utc>,
    pub weight_change_kg: f64,
    pub weight_change_percent: f64,
    pub volume_change_percent: f64,
    pub trend: TrendDirection,
}

/// Stateless progressive-overload evaluator.
#[derive(Debug, Clone, Default)]
pub struct OverloadEvaluator {
    cfg: OverloadConfig,
}

impl OverloadEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: OverloadConfig) -> Self {
        Self { cfg }
    }

    /// Compare the two most recent sessions in strict priority order:
    /// weight, then reps, then sets, then volume. When nothing improved,
    /// a run of identical prescriptions (config `stagnation_run`, default 3)
    /// classifies as stagnation; anything else is consistent.
    pub fn suggest_increase(&self, history: &ExerciseHistory, exercise: &str) -> Recommendation {
        let entries = history.entries(exercise);
        if entries.len() < 2 {
            return Recommendation::InsufficientData {
                sessions: entries.len(),
            };
        }

        let current = &entries[entries.len() - 1];
        let previous = &entries[entries.len() - 2];

        if current.weight_kg > previous.weight_kg {
            return Recommendation::WeightIncrease {
                previous_kg: previous.weight_kg,
                current_kg: current.weight_kg,
                percent: percent_delta(previous.weight_kg, current.weight_kg),
            };
        }
        if current.reps > previous.reps {
            return Recommendation::RepIncrease {
                previous: previous.reps,
                current: current.reps,
            };
        }
        if current.sets > previous.sets {
            return Recommendation::SetIncrease {
                previous: previous.sets,
                current: current.sets,
            };
        }
        if current.volume > previous.volume {
            return Recommendation::VolumeIncrease {
                previous: previous.volume,
                current: current.volume,
                percent: percent_delta(previous.volume, current.volume),
            };
        }

        let run = self.cfg.stagnation_run;
        if entries.len() >= run {
            let tail = &entries[entries.len() - run..];
            if tail.windows(2).all(|w| w[0].same_prescription(&w[1])) {
                return Recommendation::Stagnation {
                    sessions: run,
                    suggestion: self.suggest_for(current),
                };
            }
        }

        Recommendation::Consistent
    }

    /// Build the deterministic plateau-breaking suggestion for the current
    /// prescription.
    fn suggest_for(&self, entry: &SessionEntry) -> StagnationSuggestion {
        let weight_increment_kg = if entry.weight_kg >= self.cfg.heavy_bar_kg {
            HEAVY_INCREMENT_KG
        } else {
            LIGHT_INCREMENT_KG
        };
        StagnationSuggestion {
            current_weight_kg: entry.weight_kg,
            current_reps: entry.reps,
            current_sets: entry.sets,
            weight_increment_kg,
            add_reps: entry.reps < self.cfg.rep_ceiling,
            add_sets: entry.sets < self.cfg.set_ceiling,
        }
    }

    /// Check a candidate session against the historical maxima. Returns one
    /// record per metric strictly exceeded; ties are not records.
    pub fn check_for_pr(
        &self,
        history: &ExerciseHistory,
        exercise: &str,
        candidate: &SessionEntry,
    ) -> PrCheck {
        let entries = history.entries(exercise);
        if entries.is_empty() {
            return PrCheck::FirstSession;
        }

        let max_weight = entries.iter().map(|e| e.weight_kg).fold(0.0, f64::max);
        let max_reps = entries.iter().map(|e| e.reps).max().unwrap_or(0);
        let max_volume = entries.iter().map(|e| e.volume).fold(0.0, f64::max);

        let mut records = Vec::new();
        if candidate.weight_kg > max_weight {
            records.push(PrRecord {
                metric: Metric::Weight,
                previous_best: max_weight,
                value: candidate.weight_kg,
            });
        }
        if candidate.reps > max_reps {
            records.push(PrRecord {
                metric: Metric::Reps,
                previous_best: f64::from(max_reps),
                value: f64::from(candidate.reps),
            });
        }
        if candidate.volume > max_volume {
            records.push(PrRecord {
                metric: Metric::Volume,
                previous_best: max_volume,
                value: candidate.volume,
            });
        }

        if records.is_empty() {
            PrCheck::NoRecord
        } else {
            PrCheck::Records(records)
        }
    }

    /// Historical maxima for an exercise; `None` when nothing is logged.
    pub fn personal_records(
        &self,
        history: &ExerciseHistory,
        exercise: &str,
    ) -> Option<PersonalRecords> {
        let entries = history.entries(exercise);
        let last = entries.last()?;
        Some(PersonalRecords {
            exercise: exercise.to_string(),
            max_weight_kg: entries.iter().map(|e| e.weight_kg).fold(0.0, f64::max),
            max_reps: entries.iter().map(|e| e.reps).max().unwrap_or(0),
            max_volume: entries.iter().map(|e| e.volume).fold(0.0, f64::max),
            sessions: entries.len(),
            last_trained: last.date,
        })
    }

    /// First-to-last progression report; `None` when nothing is logged.
    pub fn progress_summary(
        &self,
        history: &ExerciseHistory,
        exercise: &str,
    ) -> Option<ProgressSummary> {
        let entries = history.entries(exercise);
        let first = entries.first()?;
        let last = entries.last()?;

        let volume_change_percent = percent_delta(first.volume, last.volume);
        let trend = if volume_change_percent > STABLE_BAND_PERCENT {
            TrendDirection::Improving
        } else if volume_change_percent < -STABLE_BAND_PERCENT {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        Some(ProgressSummary {
            exercise: exercise.to_string(),
            sessions: entries.len(),
            first_session: first.date,
            last_session: last.date,
            weight_change_kg: last.weight_kg - first.weight_kg,
            weight_change_percent: percent_delta(first.weight_kg, last.weight_kg),
            volume_change_percent,
            trend,
        })
    }
}
