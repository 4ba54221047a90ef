//! Rest and recovery evaluation over the training log.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;
use crate::config::RecoveryConfig;
use crate::models::{Intensity, TrainingSession};
use crate::store::TrainingLog;

/// Length of the rolling load window in days.
const WEEK_DAYS: u64 = 7;

/// Overall weekly status, worst severity first when comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    Excellent,
    Good,
    Caution,
    Warning,
    Critical,
}

/// One piece of weekly advice. Warnings carry a severity; informational and
/// positive notes do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceItem {
    pub kind: AdviceKind,
    pub severity: Option<Severity>,
}

/// What the advice is about, with the structured facts behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdviceKind {
    /// More than the weekly per-group ceiling
    Overtraining { muscle_group: String, sessions: usize },
    /// Exactly one session this week for the group
    Undertraining { muscle_group: String },
    /// Within the optimal weekly frequency band
    OptimalFrequency { muscle_group: String, sessions: usize },
    /// No rest day across the whole week
    NoRestDay,
    /// Only one rest day
    LowRest { rest_days: u32 },
    /// A healthy two-to-three rest days
    GoodRestBalance { rest_days: u32 },
    /// More total weekly sessions than the volume ceiling
    HighVolume { sessions: usize },
    /// Vigorous share at or above the threshold on a busy week
    HighIntensity { vigorous: usize, total: usize },
    /// Synthesized when nothing else applied
    Balanced,
}

impl AdviceItem {
    fn warning(kind: AdviceKind, severity: Severity) -> Self {
        Self {
            kind,
            severity: Some(severity),
        }
    }

    fn note(kind: AdviceKind) -> Self {
        Self {
            kind,
            severity: None,
        }
    }
}

/// Aggregated numbers for the trailing week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    pub sessions: usize,
    pub rest_days: u32,
    pub vigorous_sessions: usize,
    pub vigorous_share: f64,
    pub total_duration_minutes: f64,
    pub sessions_per_group: HashMap<String, usize>,
}

/// Full weekly advice payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestAdvice {
    pub items: Vec<AdviceItem>,
    pub metrics: WeeklyMetrics,
    pub status: RecoveryStatus,
}

/// Today's rest-or-train call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestDecision {
    pub recommended: bool,
    pub reason: RestReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RestReason {
    /// Both of the two prior days trained vigorously
    ConsecutiveHighIntensity,
    /// Both of the two prior days hit the same single muscle group
    RepeatedMuscleGroup { muscle_group: String },
    /// The weekly status is already in warning territory
    WeeklyOverload { status: RecoveryStatus },
    /// Nothing suggests resting
    Ready,
}

/// 0-100 recovery score with its rating band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryScore {
    pub score: u8,
    pub rating: RecoveryRating,
    pub items: Vec<AdviceItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryRating {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

/// Stateless rest/recovery evaluator.
#[derive(Debug, Clone, Default)]
pub struct RecoveryEvaluator {
    cfg: RecoveryConfig,
}

impl RecoveryEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: RecoveryConfig) -> Self {
        Self { cfg }
    }

    /// Weekly training-load advice over the trailing 7 calendar days
    /// (inclusive of `as_of`, exclusive of the future).
    pub fn rest_advice(&self, log: &TrainingLog, as_of: DateTime<Utc>) -> RestAdvice {
        let week = log.sessions_in_window(as_of, WEEK_DAYS);

        let mut sessions_per_group: HashMap<String, usize> = HashMap::new();
        for session in &week {
            *sessions_per_group
                .entry(session.muscle_group.clone())
                .or_insert(0) += 1;
        }

        let mut items = Vec::new();

        // Per-group frequency, alphabetical for deterministic output.
        let mut groups: Vec<(&String, &usize)> = sessions_per_group.iter().collect();
        groups.sort();
        for (group, &count) in groups {
            if count > self.cfg.overtraining_sessions {
                items.push(AdviceItem::warning(
                    AdviceKind::Overtraining {
                        muscle_group: group.clone(),
                        sessions: count,
                    },
                    Severity::High,
                ));
            } else if count == 1 {
                items.push(AdviceItem::warning(
                    AdviceKind::Undertraining {
                        muscle_group: group.clone(),
                    },
                    Severity::Low,
                ));
            } else if count >= self.cfg.optimal_min && count <= self.cfg.optimal_max {
                items.push(AdviceItem::note(AdviceKind::OptimalFrequency {
                    muscle_group: group.clone(),
                    sessions: count,
                }));
            }
        }

        let trained_days: HashSet<NaiveDate> =
            week.iter().map(|s| s.date.date_naive()).collect();
        let rest_days = WEEK_DAYS as u32 - trained_days.len() as u32;
        if rest_days < 1 {
            items.push(AdviceItem::warning(AdviceKind::NoRestDay, Severity::Critical));
        } else if rest_days < 2 {
            items.push(AdviceItem::warning(
                AdviceKind::LowRest { rest_days },
                Severity::Medium,
            ));
        } else if rest_days <= 3 {
            items.push(AdviceItem::note(AdviceKind::GoodRestBalance { rest_days }));
        }

        if week.len() > self.cfg.high_volume_sessions {
            items.push(AdviceItem::warning(
                AdviceKind::HighVolume {
                    sessions: week.len(),
                },
                Severity::Medium,
            ));
        }

        let vigorous_sessions = week
            .iter()
            .filter(|s| s.intensity == Intensity::Vigorous)
            .count();
        let vigorous_share = if week.is_empty() {
            0.0
        } else {
            vigorous_sessions as f64 / week.len() as f64
        };
        if vigorous_share >= self.cfg.vigorous_share && week.len() >= self.cfg.vigorous_min_sessions
        {
            items.push(AdviceItem::warning(
                AdviceKind::HighIntensity {
                    vigorous: vigorous_sessions,
                    total: week.len(),
                },
                Severity::Medium,
            ));
        }

        let status = match items.iter().filter_map(|i| i.severity).max() {
            Some(Severity::Critical) => RecoveryStatus::Critical,
            Some(Severity::High) => RecoveryStatus::Warning,
            Some(Severity::Medium) => RecoveryStatus::Caution,
            Some(Severity::Low) => RecoveryStatus::Good,
            None if items.is_empty() => RecoveryStatus::Excellent,
            None => RecoveryStatus::Good,
        };
        if items.is_empty() {
            items.push(AdviceItem::note(AdviceKind::Balanced));
        }

        let total_duration_minutes = week.iter().map(|s| s.duration_minutes).sum();
        RestAdvice {
            items,
            metrics: WeeklyMetrics {
                sessions: week.len(),
                rest_days,
                vigorous_sessions,
                vigorous_share,
                total_duration_minutes,
                sessions_per_group,
            },
            status,
        }
    }

    /// Should the user rest today? Rest is recommended after two straight
    /// vigorous days, two straight days on one identical muscle group, or
    /// when the weekly status is already Warning/Critical.
    pub fn should_rest_today(&self, log: &TrainingLog, as_of: DateTime<Utc>) -> RestDecision {
        let today = as_of.date_naive();
        let day1 = sessions_on(log, today - Days::new(1));
        let day2 = sessions_on(log, today - Days::new(2));

        if !day1.is_empty() && !day2.is_empty() {
            if any_vigorous(&day1) && any_vigorous(&day2) {
                return RestDecision {
                    recommended: true,
                    reason: RestReason::ConsecutiveHighIntensity,
                };
            }

            let groups1 = day_groups(&day1);
            let groups2 = day_groups(&day2);
            if groups1.len() == 1 && groups1 == groups2 {
                let muscle_group = groups1.iter().next().map(|g| g.to_string()).unwrap_or_default();
                return RestDecision {
                    recommended: true,
                    reason: RestReason::RepeatedMuscleGroup { muscle_group },
                };
            }
        }

        let status = self.rest_advice(log, as_of).status;
        if matches!(status, RecoveryStatus::Critical | RecoveryStatus::Warning) {
            return RestDecision {
                recommended: true,
                reason: RestReason::WeeklyOverload { status },
            };
        }

        RestDecision {
            recommended: false,
            reason: RestReason::Ready,
        }
    }

    /// 0-100 recovery score: 100 minus 30/20/10/5 per critical/high/medium/
    /// low advice item, plus 5 per optimal-frequency group, clamped.
    pub fn recovery_score(&self, log: &TrainingLog, as_of: DateTime<Utc>) -> RecoveryScore {
        let advice = self.rest_advice(log, as_of);

        let mut score: i32 = 100;
        for item in &advice.items {
            score -= match item.severity {
                Some(Severity::Critical) => 30,
                Some(Severity::High) => 20,
                Some(Severity::Medium) => 10,
                Some(Severity::Low) => 5,
                None => 0,
            };
            if matches!(item.kind, AdviceKind::OptimalFrequency { .. }) {
                score += 5;
            }
        }
        let score = score.clamp(0, 100) as u8;

        let rating = match score {
            90..=100 => RecoveryRating::Excellent,
            75..=89 => RecoveryRating::Good,
            60..=74 => RecoveryRating::Fair,
            40..=59 => RecoveryRating::Poor,
            _ => RecoveryRating::Critical,
        };

        RecoveryScore {
            score,
            rating,
            items: advice.items,
        }
    }
}

/// All sessions logged on one calendar date.
fn sessions_on(log: &TrainingLog, date: NaiveDate) -> Vec<&TrainingSession> {
    log.sessions()
        .iter()
        .filter(|s| s.date.date_naive() == date)
        .collect()
}

/// A day counts as vigorous when any of its sessions was.
fn any_vigorous(day: &[&TrainingSession]) -> bool {
    day.iter().any(|s| s.intensity == Intensity::Vigorous)
}

fn day_groups<'a>(day: &[&'a TrainingSession]) -> HashSet<&'a str> {
    day.iter().map(|s| s.muscle_group.as_str()).collect()
}
