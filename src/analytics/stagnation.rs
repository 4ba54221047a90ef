//! Multi-session stagnation and plateau-break detection.
//!
//! The detector reads the shared exercise history; the only state it owns
//! is the notification throttle, which is created lazily and never
//! persisted. Rebuilding the evaluator resets it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Metric, Severity};
use crate::config::StagnationConfig;
use crate::models::SessionEntry;
use crate::store::ExerciseHistory;

/// A detected stagnation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stagnation {
    pub kind: StagnationKind,
    pub severity: Severity,
    /// Number of trailing sessions inspected
    pub window: usize,
}

/// How the window stagnated, in evaluation order: a window matching none of
/// the branches yields no signal at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagnationKind {
    /// Weight, reps, and sets all constant
    Complete,
    /// Weight constant while reps or sets moved
    WeightOnly,
    /// Volume spread below the configured share of the window mean
    Volume,
}

/// A broken plateau: which metrics the latest session improved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateauBreak {
    /// Length of the constant run preceding the break
    pub plateau_sessions: usize,
    pub improvements: Vec<Improvement>,
}

/// One improved metric relative to the plateau prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub metric: Metric,
    pub from: f64,
    pub to: f64,
}

/// Coaching mood derived from the recent history, rendered by the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Motivation {
    /// Fewer than two sessions logged
    GettingStarted { sessions: usize },
    /// The latest session broke a plateau
    PlateauBroken { improvements: usize },
    /// The trailing window stagnated
    Stagnating { kind: StagnationKind },
    /// Volume has climbed for consecutive sessions
    OnStreak { sessions: usize },
    /// Nothing remarkable either way
    Steady,
}

/// Stagnation detector with the per-exercise notification throttle.
#[derive(Debug, Clone, Default)]
pub struct StagnationDetector {
    cfg: StagnationConfig,
    throttle: HashMap<String, DateTime<Utc>>,
}

impl StagnationDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: StagnationConfig) -> Self {
        Self {
            cfg,
            throttle: HashMap::new(),
        }
    }

    /// Inspect the trailing window (config `default_window`, default 4).
    pub fn check_stagnation(
        &self,
        history: &ExerciseHistory,
        exercise: &str,
    ) -> Option<Stagnation> {
        self.check_stagnation_with(history, exercise, self.cfg.default_window)
    }

    /// Inspect the trailing `window` sessions. Requires at least `window`
    /// entries; evaluation order is complete → weight-only → volume, and a
    /// window matching none returns `None`.
    pub fn check_stagnation_with(
        &self,
        history: &ExerciseHistory,
        exercise: &str,
        window: usize,
    ) -> Option<Stagnation> {
        let window = window.max(2);
        let entries = history.entries(exercise);
        if entries.len() < window {
            return None;
        }
        let recent = &entries[entries.len() - window..];

        let weight_constant = recent
            .windows(2)
            .all(|w| (w[0].weight_kg - w[1].weight_kg).abs() < f64::EPSILON);
        let reps_constant = recent.windows(2).all(|w| w[0].reps == w[1].reps);
        let sets_constant = recent.windows(2).all(|w| w[0].sets == w[1].sets);

        if weight_constant && reps_constant && sets_constant {
            return Some(Stagnation {
                kind: StagnationKind::Complete,
                severity: Severity::High,
                window,
            });
        }
        if weight_constant {
            return Some(Stagnation {
                kind: StagnationKind::WeightOnly,
                severity: Severity::Medium,
                window,
            });
        }

        let mean = recent.iter().map(|e| e.volume).sum::<f64>() / window as f64;
        let max = recent.iter().map(|e| e.volume).fold(f64::MIN, f64::max);
        let min = recent.iter().map(|e| e.volume).fold(f64::MAX, f64::min);
        if mean > 0.0 && (max - min) < self.cfg.volume_spread_ratio * mean {
            return Some(Stagnation {
                kind: StagnationKind::Volume,
                severity: Severity::Low,
                window,
            });
        }

        None
    }

    /// Detect a plateau break: the configured run of sessions before the
    /// latest must be fully constant, and the latest must improve at least
    /// one of weight, reps, sets, or volume relative to it.
    pub fn check_plateau_break(
        &self,
        history: &ExerciseHistory,
        exercise: &str,
    ) -> Option<PlateauBreak> {
        let plateau_window = self.cfg.plateau_window;
        let entries = history.entries(exercise);
        if entries.len() < plateau_window + 1 {
            return None;
        }

        let latest = &entries[entries.len() - 1];
        let plateau = &entries[entries.len() - 1 - plateau_window..entries.len() - 1];
        if !plateau.windows(2).all(|w| w[0].same_prescription(&w[1])) {
            return None;
        }

        let baseline = &plateau[0];
        let improvements = Self::improvements_over(baseline, latest);
        if improvements.is_empty() {
            return None;
        }

        Some(PlateauBreak {
            plateau_sessions: plateau_window,
            improvements,
        })
    }

    fn improvements_over(baseline: &SessionEntry, latest: &SessionEntry) -> Vec<Improvement> {
        let mut improvements = Vec::new();
        if latest.weight_kg > baseline.weight_kg {
            improvements.push(Improvement {
                metric: Metric::Weight,
                from: baseline.weight_kg,
                to: latest.weight_kg,
            });
        }
        if latest.reps > baseline.reps {
            improvements.push(Improvement {
                metric: Metric::Reps,
                from: f64::from(baseline.reps),
                to: f64::from(latest.reps),
            });
        }
        if latest.sets > baseline.sets {
            improvements.push(Improvement {
                metric: Metric::Sets,
                from: f64::from(baseline.sets),
                to: f64::from(latest.sets),
            });
        }
        if latest.volume > baseline.volume {
            improvements.push(Improvement {
                metric: Metric::Volume,
                from: baseline.volume,
                to: latest.volume,
            });
        }
        improvements
    }

    /// Consecutive session-over-session volume increases ending at the
    /// latest entry, walking backward until the first non-increase.
    pub fn progress_streak(&self, history: &ExerciseHistory, exercise: &str) -> usize {
        let entries = history.entries(exercise);
        if entries.len() < 2 {
            return 0;
        }
        let mut streak = 0;
        for i in (1..entries.len()).rev() {
            if entries[i].volume > entries[i - 1].volume {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    }

    /// Coaching mood for an exercise, most newsworthy signal first.
    pub fn motivation(&self, history: &ExerciseHistory, exercise: &str) -> Motivation {
        let entries = history.entries(exercise);
        if entries.len() < 2 {
            return Motivation::GettingStarted {
                sessions: entries.len(),
            };
        }
        if let Some(pb) = self.check_plateau_break(history, exercise) {
            return Motivation::PlateauBroken {
                improvements: pb.improvements.len(),
            };
        }
        if let Some(stagnation) = self.check_stagnation(history, exercise) {
            return Motivation::Stagnating {
                kind: stagnation.kind,
            };
        }
        let streak = self.progress_streak(history, exercise);
        if streak >= 2 {
            return Motivation::OnStreak { sessions: streak };
        }
        Motivation::Steady
    }

    /// Gate repeated stagnation alerts: at most one notification per
    /// exercise per cooldown window (default 7 days). A `true` result
    /// records `now` as the last notification time.
    pub fn should_notify(&mut self, exercise: &str, now: DateTime<Utc>) -> bool {
        let cooldown = Duration::days(self.cfg.notify_cooldown_days);
        match self.throttle.get(exercise) {
            Some(last) if now.signed_duration_since(*last) < cooldown => false,
            _ => {
                self.throttle.insert(exercise.to_string(), now);
                true
            }
        }
    }

    /// Drop all throttle state (used by the aggregator's reset).
    pub fn clear_throttle(&mut self) {
        self.throttle.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 8, 0, 0).unwrap()
    }

    fn history_of(sessions: &[(f64, u32, u32)]) -> ExerciseHistory {
        let mut history = ExerciseHistory::new();
        for (i, (w, r, s)) in sessions.iter().enumerate() {
            history.log_session("Squat", SessionEntry::new(*w, *r, *s, day(i as u32 + 1)));
        }
        history
    }

    #[test]
    fn test_complete_stagnation_is_high_severity() {
        let history = history_of(&[(100.0, 5, 3); 4]);
        let detector = StagnationDetector::new();
        let stagnation = detector.check_stagnation(&history, "Squat").unwrap();
        assert_eq!(stagnation.kind, StagnationKind::Complete);
        assert_eq!(stagnation.severity, Severity::High);
        assert_eq!(stagnation.window, 4);
    }

    #[test]
    fn test_weight_only_stagnation_is_medium() {
        let history = history_of(&[(100.0, 5, 3), (100.0, 6, 3), (100.0, 5, 4), (100.0, 7, 3)]);
        let detector = StagnationDetector::new();
        let stagnation = detector.check_stagnation(&history, "Squat").unwrap();
        assert_eq!(stagnation.kind, StagnationKind::WeightOnly);
        assert_eq!(stagnation.severity, Severity::Medium);
    }

    #[test]
    fn test_volume_stagnation_is_low() {
        // Weight moves, but volume stays within 5% of the window mean:
        // volumes 1500, 1512, 1500, 1488, a spread of 24 on a mean of 1500.
        let history = history_of(&[
            (100.0, 5, 3),
            (126.0, 4, 3),
            (125.0, 4, 3),
            (124.0, 4, 3),
        ]);
        let detector = StagnationDetector::new();
        let stagnation = detector.check_stagnation(&history, "Squat").unwrap();
        assert_eq!(stagnation.kind, StagnationKind::Volume);
        assert_eq!(stagnation.severity, Severity::Low);
    }

    #[test]
    fn test_moving_window_gives_no_signal() {
        let history = history_of(&[(100.0, 5, 3), (105.0, 5, 3), (110.0, 5, 3), (115.0, 5, 3)]);
        let detector = StagnationDetector::new();
        assert!(detector.check_stagnation(&history, "Squat").is_none());
    }

    #[test]
    fn test_short_history_gives_no_signal() {
        let history = history_of(&[(100.0, 5, 3), (100.0, 5, 3), (100.0, 5, 3)]);
        let detector = StagnationDetector::new();
        assert!(detector.check_stagnation(&history, "Squat").is_none());
        assert!(detector
            .check_stagnation_with(&history, "Squat", 3)
            .is_some());
    }

    #[test]
    fn test_plateau_break_lists_improved_metrics() {
        let history = history_of(&[
            (100.0, 5, 3),
            (100.0, 5, 3),
            (100.0, 5, 3),
            (100.0, 5, 3),
            (102.5, 6, 3),
        ]);
        let detector = StagnationDetector::new();
        let pb = detector.check_plateau_break(&history, "Squat").unwrap();
        assert_eq!(pb.plateau_sessions, 4);
        let metrics: Vec<Metric> = pb.improvements.iter().map(|i| i.metric).collect();
        assert_eq!(metrics, vec![Metric::Weight, Metric::Reps, Metric::Volume]);
    }

    #[test]
    fn test_no_plateau_break_without_prior_plateau() {
        let history = history_of(&[
            (95.0, 5, 3),
            (100.0, 5, 3),
            (100.0, 5, 3),
            (100.0, 5, 3),
            (102.5, 5, 3),
        ]);
        let detector = StagnationDetector::new();
        assert!(detector.check_plateau_break(&history, "Squat").is_none());
    }

    #[test]
    fn test_no_plateau_break_when_nothing_improved() {
        let history = history_of(&[
            (100.0, 5, 3),
            (100.0, 5, 3),
            (100.0, 5, 3),
            (100.0, 5, 3),
            (97.5, 5, 3),
        ]);
        let detector = StagnationDetector::new();
        assert!(detector.check_plateau_break(&history, "Squat").is_none());
    }

    #[test]
    fn test_progress_streak_counts_increases_from_latest() {
        let history = history_of(&[
            (100.0, 5, 3), // 1500
            (95.0, 5, 3),  // 1425, breaks the run
            (100.0, 5, 3), // 1500
            (102.5, 5, 3), // 1537.5
            (105.0, 5, 3), // 1575
        ]);
        let detector = StagnationDetector::new();
        assert_eq!(detector.progress_streak(&history, "Squat"), 3);
        assert_eq!(detector.progress_streak(&history, "Deadlift"), 0);
    }

    #[test]
    fn test_motivation_prefers_plateau_break() {
        let history = history_of(&[
            (100.0, 5, 3),
            (100.0, 5, 3),
            (100.0, 5, 3),
            (100.0, 5, 3),
            (102.5, 5, 3),
        ]);
        let detector = StagnationDetector::new();
        assert_eq!(
            detector.motivation(&history, "Squat"),
            Motivation::PlateauBroken { improvements: 2 }
        );

        let empty = ExerciseHistory::new();
        assert_eq!(
            detector.motivation(&empty, "Squat"),
            Motivation::GettingStarted { sessions: 0 }
        );
    }

    #[test]
    fn test_notification_throttled_to_one_per_week() {
        let mut detector = StagnationDetector::new();
        let monday = day(4);
        assert!(detector.should_notify("Squat", monday));
        // Three days later: still throttled
        assert!(!detector.should_notify("Squat", monday + Duration::days(3)));
        // Other exercises are tracked independently
        assert!(detector.should_notify("Bench Press", monday + Duration::days(3)));
        // Seven days later: allowed again
        assert!(detector.should_notify("Squat", monday + Duration::days(7)));
    }
}
