//! MET-based calorie estimation with fuzzy activity matching.
//!
//! Pure computation, no side effects: missing weight or duration yields 0
//! rather than an error. MET values follow the compendium conventions used
//! by consumer trackers; unknown activities fall back to a moderate default.

// === Constants ===

/// MET coefficients for activities the estimator knows by name.
const MET_TABLE: &[(&str, f64)] = &[
    ("running", 8.0),
    ("jogging", 7.0),
    ("sprinting", 12.0),
    ("walking", 3.5),
    ("hiking", 6.0),
    ("cycling", 7.5),
    ("spinning", 8.5),
    ("swimming", 8.0),
    ("rowing", 7.0),
    ("elliptical", 5.0),
    ("jump rope", 11.0),
    ("jumping jacks", 8.0),
    ("burpees", 8.0),
    ("hiit", 9.0),
    ("tabata", 9.0),
    ("circuit training", 8.0),
    ("weightlifting", 6.0),
    ("strength training", 6.0),
    ("crossfit", 9.0),
    ("yoga", 2.5),
    ("pilates", 3.0),
    ("stretching", 2.3),
    ("boxing", 9.5),
    ("kickboxing", 10.0),
    ("dancing", 5.5),
    ("stair climbing", 8.8),
    ("basketball", 8.0),
    ("soccer", 10.0),
    ("tennis", 7.3),
];

/// Synonym patterns checked after exact and substring lookup fails.
const SYNONYM_PATTERNS: &[(&[&str], f64)] = &[
    (&["run", "jog"], 8.0),
    (&["walk"], 3.5),
    (&["cycle", "bike"], 7.5),
    (&["swim"], 8.0),
    (&["jump", "burpee"], 8.0),
    (&["hiit", "tabata"], 9.0),
];

/// Fallback MET when nothing matches.
const DEFAULT_MET: f64 = 5.0;

/// MET base for the strength variant when the activity is unknown.
const STRENGTH_MET: f64 = 6.0;

/// Flat bonus per repetition performed (kcal).
const REP_BONUS_KCAL: f64 = 0.25;

/// Flat bonus per kilogram lifted across the session (kcal).
const LIFTED_KG_BONUS_KCAL: f64 = 0.005;

/// Strength sessions never estimate below this (kcal).
const STRENGTH_FLOOR_KCAL: u32 = 3;

/// Intensity percentage treated as baseline effort.
const BASELINE_INTENSITY_PERCENT: f64 = 50.0;

/// Calorie estimator over the fixed MET table.
#[derive(Debug, Clone)]
pub struct CalorieEstimator {
    default_met: f64,
}

impl CalorieEstimator {
    pub fn new() -> Self {
        Self {
            default_met: DEFAULT_MET,
        }
    }

    /// Override the fallback MET, typically from
    /// [`crate::config::CalorieConfig`].
    pub fn with_default_met(default_met: f64) -> Self {
        let default_met = if default_met.is_finite() && default_met > 0.0 {
            default_met
        } else {
            DEFAULT_MET
        };
        Self { default_met }
    }

    /// Estimate energy expenditure at baseline intensity for a single round.
    ///
    /// `estimate("running", 70.0, 30.0)` is 280 kcal.
    pub fn estimate(&self, activity: &str, body_weight_kg: f64, duration_minutes: f64) -> u32 {
        self.estimate_with(
            activity,
            body_weight_kg,
            duration_minutes,
            BASELINE_INTENSITY_PERCENT,
            1,
        )
    }

    /// Full estimate: `MET × kg × (min/60) × (intensity/50) × rounds`,
    /// rounded to the nearest kcal. Returns 0 when weight or duration is
    /// missing or zero.
    pub fn estimate_with(
        &self,
        activity: &str,
        body_weight_kg: f64,
        duration_minutes: f64,
        intensity_percent: f64,
        rounds: u32,
    ) -> u32 {
        if !Self::usable(body_weight_kg) || !Self::usable(duration_minutes) {
            return 0;
        }
        let intensity = if Self::usable(intensity_percent) {
            intensity_percent
        } else {
            BASELINE_INTENSITY_PERCENT
        };
        let met = self.met_for(activity);
        let kcal = met
            * body_weight_kg
            * (duration_minutes / 60.0)
            * (intensity / BASELINE_INTENSITY_PERCENT)
            * f64::from(rounds.max(1));
        kcal.round().max(0.0) as u32
    }

    /// Strength-training variant: MET base at baseline intensity plus flat
    /// per-rep and per-kg-lifted bonuses, floored at 3 kcal. A session with
    /// no usable weight or duration still returns 0.
    pub fn estimate_strength(
        &self,
        activity: &str,
        body_weight_kg: f64,
        duration_minutes: f64,
        total_reps: u32,
        total_lifted_kg: f64,
    ) -> u32 {
        if !Self::usable(body_weight_kg) || !Self::usable(duration_minutes) {
            return 0;
        }
        let met = self.lookup(activity).unwrap_or(STRENGTH_MET);
        let base = met * body_weight_kg * (duration_minutes / 60.0);
        let lifted = if total_lifted_kg.is_finite() && total_lifted_kg > 0.0 {
            total_lifted_kg
        } else {
            0.0
        };
        let bonus = f64::from(total_reps) * REP_BONUS_KCAL + lifted * LIFTED_KG_BONUS_KCAL;
        ((base + bonus).round().max(0.0) as u32).max(STRENGTH_FLOOR_KCAL)
    }

    /// A numeric input is usable when it is finite and positive.
    fn usable(value: f64) -> bool {
        value.is_finite() && value > 0.0
    }

    /// Resolve a MET coefficient, falling back to the configured default.
    fn met_for(&self, activity: &str) -> f64 {
        self.lookup(activity).unwrap_or(self.default_met)
    }

    /// Table lookup: exact case-insensitive, then substring in either
    /// direction, then synonym patterns.
    fn lookup(&self, activity: &str) -> Option<f64> {
        let needle = activity.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some((_, met)) = MET_TABLE.iter().find(|(key, _)| *key == needle) {
            return Some(*met);
        }

        if let Some((_, met)) = MET_TABLE
            .iter()
            .find(|(key, _)| needle.contains(key) || key.contains(&needle))
        {
            return Some(*met);
        }

        for (patterns, met) in SYNONYM_PATTERNS {
            if patterns.iter().any(|p| needle.contains(p)) {
                return Some(*met);
            }
        }

        None
    }
}

impl Default for CalorieEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_baseline() {
        let estimator = CalorieEstimator::new();
        // 8.0 MET x 70 kg x 0.5 h x 1.0 intensity x 1 round
        assert_eq!(estimator.estimate("running", 70.0, 30.0), 280);
    }

    #[test]
    fn test_intensity_and_rounds_scale() {
        let estimator = CalorieEstimator::new();
        assert_eq!(
            estimator.estimate_with("running", 70.0, 30.0, 100.0, 1),
            560
        );
        assert_eq!(estimator.estimate_with("running", 70.0, 30.0, 50.0, 3), 840);
    }

    #[test]
    fn test_missing_inputs_yield_zero() {
        let estimator = CalorieEstimator::new();
        assert_eq!(estimator.estimate("running", 0.0, 30.0), 0);
        assert_eq!(estimator.estimate("running", 70.0, 0.0), 0);
        assert_eq!(estimator.estimate("running", f64::NAN, 30.0), 0);
        assert_eq!(estimator.estimate_strength("squats", 0.0, 45.0, 50, 5000.0), 0);
    }

    #[test]
    fn test_lookup_exact_is_case_insensitive() {
        let estimator = CalorieEstimator::new();
        assert_eq!(
            estimator.estimate("Running", 70.0, 30.0),
            estimator.estimate("running", 70.0, 30.0)
        );
    }

    #[test]
    fn test_lookup_substring_both_directions() {
        let estimator = CalorieEstimator::new();
        // "trail running" contains table key "running"
        assert_eq!(estimator.estimate("trail running", 70.0, 30.0), 280);
        // "swim" is contained in table key "swimming"
        assert_eq!(
            estimator.estimate("swim", 70.0, 60.0),
            estimator.estimate("swimming", 70.0, 60.0)
        );
    }

    #[test]
    fn test_lookup_synonym_patterns() {
        let estimator = CalorieEstimator::new();
        // No table entry, but matches the cycle/bike pattern
        assert_eq!(
            estimator.estimate("mountain biking uphill", 70.0, 60.0),
            (7.5f64 * 70.0).round() as u32
        );
    }

    #[test]
    fn test_unknown_activity_uses_default_met() {
        let estimator = CalorieEstimator::new();
        assert_eq!(
            estimator.estimate("underwater basket weaving", 70.0, 60.0),
            (DEFAULT_MET * 70.0).round() as u32
        );

        let custom = CalorieEstimator::with_default_met(4.0);
        assert_eq!(
            custom.estimate("underwater basket weaving", 70.0, 60.0),
            280
        );
    }

    #[test]
    fn test_strength_adds_bonuses_over_base() {
        let estimator = CalorieEstimator::new();
        let base_only = estimator.estimate_strength("strength training", 80.0, 45.0, 0, 0.0);
        let with_work = estimator.estimate_strength("strength training", 80.0, 45.0, 60, 4000.0);
        assert!(with_work > base_only);
        // 60 reps x 0.25 + 4000 kg x 0.005 = 35 kcal of bonus
        assert_eq!(with_work, base_only + 35);
    }

    #[test]
    fn test_strength_floor() {
        let estimator = CalorieEstimator::new();
        // Tiny but non-zero inputs still clear the floor
        assert_eq!(estimator.estimate_strength("curls", 1.0, 1.0, 0, 0.0), 3);
    }
}
