//! Aggregation of the three evaluators over backend-loaded history.
//!
//! One [`WorkoutAnalytics`] instance per user session, constructed
//! explicitly with its backend; there is no shared global instance. The
//! in-memory stores are a derived cache: initialization rebuilds them
//! wholesale from the backend, and a failed source load degrades to an
//! empty category instead of aborting.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::feedback::{self, FeedbackItem};
use super::overload::{OverloadEvaluator, PrCheck, ProgressSummary, Recommendation};
use super::recovery::{RecoveryEvaluator, RecoveryScore, RestAdvice, RestDecision, WeeklyMetrics};
use super::stagnation::{Motivation, StagnationDetector};
use super::Severity;
use crate::backend::WorkoutBackend;
use crate::calories::CalorieEstimator;
use crate::config::AnalyticsConfig;
use crate::models::{CompletedWorkout, Intensity, SessionEntry, TrainingSession};
use crate::store::{ExerciseHistory, TrainingLog};

/// The aggregator's single hard failure mode.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics not initialized: call initialize() for a user first")]
    NotInitialized,
}

/// Unified feedback payload for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub generated_at: DateTime<Utc>,
    pub items: Vec<FeedbackItem>,
    pub recovery: RecoveryScore,
}

/// Post-workout summary payload.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSummary {
    pub achievements: Vec<FeedbackItem>,
    pub warnings: Vec<FeedbackItem>,
    pub suggestions: Vec<FeedbackItem>,
    /// Estimated energy expenditure for the workout
    pub estimated_calories: u32,
}

/// Dashboard payload: totals, weekly load, and per-exercise progression.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardAnalytics {
    pub generated_at: DateTime<Utc>,
    pub total_strength_sessions: usize,
    pub exercises_tracked: usize,
    pub weekly: WeeklyMetrics,
    pub recovery: RecoveryScore,
    pub exercises: Vec<ProgressSummary>,
}

/// Orchestrates the evaluators against the shared stores for one user.
pub struct WorkoutAnalytics {
    backend: Box<dyn WorkoutBackend>,
    history: ExerciseHistory,
    training_log: TrainingLog,
    overload: OverloadEvaluator,
    stagnation: StagnationDetector,
    recovery: RecoveryEvaluator,
    calories: CalorieEstimator,
    /// Body weight used for calorie estimates when known
    body_weight_kg: Option<f64>,
    initialized_for: Option<Uuid>,
}

impl WorkoutAnalytics {
    /// Build with default thresholds.
    pub fn new(backend: Box<dyn WorkoutBackend>) -> Self {
        Self::with_config(backend, AnalyticsConfig::default())
    }

    /// Build with explicit thresholds.
    pub fn with_config(backend: Box<dyn WorkoutBackend>, config: AnalyticsConfig) -> Self {
        Self {
            backend,
            history: ExerciseHistory::new(),
            training_log: TrainingLog::new(),
            overload: OverloadEvaluator::with_config(config.overload),
            stagnation: StagnationDetector::with_config(config.stagnation),
            recovery: RecoveryEvaluator::with_config(config.recovery),
            calories: CalorieEstimator::with_default_met(config.calories.default_met),
            body_weight_kg: None,
            initialized_for: None,
        }
    }

    /// Set the user's body weight for calorie estimation.
    pub fn set_body_weight(&mut self, weight_kg: f64) {
        self.body_weight_kg = (weight_kg.is_finite() && weight_kg > 0.0).then_some(weight_kg);
    }

    /// Bulk-load the user's history from the backend. Idempotent per user:
    /// calling again for the already-loaded user is a no-op; a different
    /// user triggers a destructive reload. Each source failure is logged
    /// and leaves that category empty, so initialization itself never fails.
    pub async fn initialize(&mut self, user_id: Uuid) {
        if self.initialized_for == Some(user_id) {
            debug!(user.id = %user_id, "analytics already initialized, skipping reload");
            return;
        }

        let strength_rows = match self.backend.load_strength_rows(user_id).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(user.id = %user_id, error = %err,
                    "strength history load failed, continuing with empty history");
                Vec::new()
            }
        };
        let mut skipped = 0usize;
        let mut entries = Vec::with_capacity(strength_rows.len());
        for row in strength_rows {
            match row.resolved_date() {
                Some(date) => entries.push((
                    row.exercise_name,
                    SessionEntry::new(row.weight, row.reps, row.sets, date),
                )),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(user.id = %user_id, skipped, "dropped strength rows with no resolvable date");
        }
        self.history.reload(entries);

        let cardio_rows = match self.backend.load_cardio_rows(user_id).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(user.id = %user_id, error = %err,
                    "cardio history load failed, continuing with empty log");
                Vec::new()
            }
        };
        let mut skipped = 0usize;
        let mut sessions = Vec::with_capacity(cardio_rows.len());
        for row in cardio_rows {
            match row.resolved_date() {
                Some(date) => sessions.push(TrainingSession::new(
                    &row.muscle_group,
                    date,
                    Intensity::parse(row.intensity.as_deref().unwrap_or_default()),
                    row.duration,
                )),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(user.id = %user_id, skipped, "dropped cardio rows with no resolvable date");
        }
        self.training_log.reload(sessions);

        self.initialized_for = Some(user_id);
        info!(
            user.id = %user_id,
            exercises = self.history.exercise_count(),
            strength_sessions = self.history.total_sessions(),
            training_sessions = self.training_log.len(),
            "workout history loaded"
        );
    }

    /// Log one strength session into the shared store.
    pub fn log_session(
        &mut self,
        exercise: &str,
        weight_kg: f64,
        reps: u32,
        sets: u32,
        date: DateTime<Utc>,
    ) {
        self.history
            .log_session(exercise, SessionEntry::new(weight_kg, reps, sets, date));
    }

    /// Log one recovery-domain training session.
    pub fn log_training_session(
        &mut self,
        muscle_group: &str,
        intensity: Intensity,
        duration_minutes: f64,
        date: DateTime<Utc>,
    ) {
        self.training_log.log_session(TrainingSession::new(
            muscle_group,
            date,
            intensity,
            duration_minutes,
        ));
    }

    /// Feed a completed workout into both stores.
    pub fn log_workout(&mut self, workout: &CompletedWorkout) {
        for exercise in &workout.exercises {
            self.history.log_session(
                &exercise.name,
                SessionEntry::new(exercise.weight_kg, exercise.reps, exercise.sets, workout.date),
            );
        }
        for group in &workout.muscle_groups {
            self.training_log.log_session(TrainingSession::new(
                group,
                workout.date,
                workout.intensity,
                workout.duration_minutes,
            ));
        }
    }

    /// Coaching feedback, for one exercise or across everything tracked.
    pub fn feedback(&self, exercise: Option<&str>) -> Result<FeedbackReport, AnalyticsError> {
        self.feedback_at(exercise, Utc::now())
    }

    /// [`Self::feedback`] with an explicit evaluation time.
    pub fn feedback_at(
        &self,
        exercise: Option<&str>,
        as_of: DateTime<Utc>,
    ) -> Result<FeedbackReport, AnalyticsError> {
        self.ensure_initialized()?;

        let mut items = Vec::new();
        match exercise {
            Some(name) => self.exercise_feedback(name, &mut items),
            None => {
                let mut names: Vec<&str> = self.history.exercises().collect();
                names.sort_unstable();
                for name in names {
                    self.exercise_feedback(name, &mut items);
                }
            }
        }

        let advice = self.recovery.rest_advice(&self.training_log, as_of);
        for advice_entry in &advice.items {
            items.push(feedback::advice_item(advice_entry));
        }

        debug!(
            exercise = exercise.unwrap_or("*"),
            items = items.len(),
            "feedback generated"
        );
        Ok(FeedbackReport {
            generated_at: as_of,
            items,
            recovery: self.recovery.recovery_score(&self.training_log, as_of),
        })
    }

    fn exercise_feedback(&self, exercise: &str, items: &mut Vec<FeedbackItem>) {
        let recommendation = self.overload.suggest_increase(&self.history, exercise);
        items.push(feedback::recommendation_item(exercise, &recommendation));

        // A stagnation item on top of the recommendation would be redundant.
        if !matches!(recommendation, Recommendation::Stagnation { .. }) {
            if let Some(stagnation) = self.stagnation.check_stagnation(&self.history, exercise) {
                items.push(feedback::stagnation_item(
                    exercise,
                    stagnation.kind,
                    stagnation.severity,
                ));
            }
        }
        if let Some(pb) = self.stagnation.check_plateau_break(&self.history, exercise) {
            items.push(feedback::plateau_break_item(exercise, &pb));
        }
    }

    /// Should a stagnation alert fire for this exercise right now? Combines
    /// detection with the 7-day per-exercise throttle; a `true` consumes
    /// the notification slot.
    pub fn should_notify_stagnation(&mut self, exercise: &str) -> Result<bool, AnalyticsError> {
        self.ensure_initialized()?;
        if self
            .stagnation
            .check_stagnation(&self.history, exercise)
            .is_none()
        {
            return Ok(false);
        }
        let allowed = self.stagnation.should_notify(exercise, Utc::now());
        debug!(exercise, allowed, "stagnation notification gate");
        Ok(allowed)
    }

    /// Analyze a finished workout: PRs are checked against the history as
    /// it stood before the workout, the workout is ingested, and plateau
    /// breaks plus active recovery warnings are collected after.
    pub fn post_workout_summary(
        &mut self,
        workout: &CompletedWorkout,
    ) -> Result<WorkoutSummary, AnalyticsError> {
        self.ensure_initialized()?;

        let mut achievements = Vec::new();
        let mut suggestions = Vec::new();

        for exercise in &workout.exercises {
            let candidate =
                SessionEntry::new(exercise.weight_kg, exercise.reps, exercise.sets, workout.date);
            match self
                .overload
                .check_for_pr(&self.history, &exercise.name, &candidate)
            {
                PrCheck::FirstSession => {
                    achievements.push(feedback::first_session_item(&exercise.name));
                }
                PrCheck::Records(records) => {
                    for record in &records {
                        achievements.push(feedback::pr_item(&exercise.name, record));
                    }
                }
                PrCheck::NoRecord => {}
            }

            self.history.log_session(&exercise.name, candidate);

            if let Some(pb) = self.stagnation.check_plateau_break(&self.history, &exercise.name) {
                achievements.push(feedback::plateau_break_item(&exercise.name, &pb));
            }
            if let Recommendation::Stagnation { suggestion, .. } =
                self.overload.suggest_increase(&self.history, &exercise.name)
            {
                suggestions.push(feedback::suggestion_item(&exercise.name, &suggestion));
            }
        }

        for group in &workout.muscle_groups {
            self.training_log.log_session(TrainingSession::new(
                group,
                workout.date,
                workout.intensity,
                workout.duration_minutes,
            ));
        }

        let advice = self.recovery.rest_advice(&self.training_log, workout.date);
        let warnings: Vec<FeedbackItem> = advice
            .items
            .iter()
            .filter(|i| matches!(i.severity, Some(Severity::High) | Some(Severity::Critical)))
            .map(feedback::advice_item)
            .collect();

        let estimated_calories = self.estimate_workout_calories(workout);

        info!(
            exercises = workout.exercises.len(),
            achievements = achievements.len(),
            warnings = warnings.len(),
            "post-workout summary generated"
        );
        Ok(WorkoutSummary {
            achievements,
            warnings,
            suggestions,
            estimated_calories,
        })
    }

    fn estimate_workout_calories(&self, workout: &CompletedWorkout) -> u32 {
        let Some(body_weight) = self.body_weight_kg else {
            return 0;
        };
        let total_reps: u32 = workout
            .exercises
            .iter()
            .map(|e| e.reps.saturating_mul(e.sets))
            .sum();
        let total_lifted: f64 = workout
            .exercises
            .iter()
            .map(|e| e.weight_kg * f64::from(e.reps) * f64::from(e.sets))
            .sum();
        if workout.exercises.is_empty() {
            self.calories
                .estimate("cardio", body_weight, workout.duration_minutes)
        } else {
            self.calories.estimate_strength(
                "strength training",
                body_weight,
                workout.duration_minutes,
                total_reps,
                total_lifted,
            )
        }
    }

    /// Dashboard rollup across everything tracked.
    pub fn dashboard_analytics(&self) -> Result<DashboardAnalytics, AnalyticsError> {
        self.dashboard_analytics_at(Utc::now())
    }

    /// [`Self::dashboard_analytics`] with an explicit evaluation time.
    pub fn dashboard_analytics_at(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<DashboardAnalytics, AnalyticsError> {
        self.ensure_initialized()?;

        let mut names: Vec<&str> = self.history.exercises().collect();
        names.sort_unstable();
        let exercises: Vec<ProgressSummary> = names
            .iter()
            .filter_map(|name| self.overload.progress_summary(&self.history, name))
            .collect();

        let advice = self.recovery.rest_advice(&self.training_log, as_of);
        Ok(DashboardAnalytics {
            generated_at: as_of,
            total_strength_sessions: self.history.total_sessions(),
            exercises_tracked: self.history.exercise_count(),
            weekly: advice.metrics,
            recovery: self.recovery.recovery_score(&self.training_log, as_of),
            exercises,
        })
    }

    /// Weekly rest advice passthrough.
    pub fn rest_advice_at(&self, as_of: DateTime<Utc>) -> Result<RestAdvice, AnalyticsError> {
        self.ensure_initialized()?;
        Ok(self.recovery.rest_advice(&self.training_log, as_of))
    }

    /// Rest-or-train call for today, rendered and raw.
    pub fn should_rest_today_at(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<(RestDecision, FeedbackItem), AnalyticsError> {
        self.ensure_initialized()?;
        let decision = self.recovery.should_rest_today(&self.training_log, as_of);
        let item = feedback::rest_decision_item(&decision);
        Ok((decision, item))
    }

    /// Coaching mood for one exercise, raw and rendered.
    pub fn motivation(
        &self,
        exercise: &str,
    ) -> Result<(Motivation, FeedbackItem), AnalyticsError> {
        self.ensure_initialized()?;
        let motivation = self.stagnation.motivation(&self.history, exercise);
        let item = feedback::motivation_item(exercise, &motivation);
        Ok((motivation, item))
    }

    /// The calorie estimator configured for this instance.
    pub fn calorie_estimator(&self) -> &CalorieEstimator {
        &self.calories
    }

    /// Read access to the shared strength history.
    pub fn history(&self) -> &ExerciseHistory {
        &self.history
    }

    /// Read access to the recovery-domain training log.
    pub fn training_log(&self) -> &TrainingLog {
        &self.training_log
    }

    /// Discard all loaded state and the initialization marker.
    pub fn reset(&mut self) {
        self.history.clear();
        self.training_log.clear();
        self.stagnation.clear_throttle();
        self.initialized_for = None;
        info!("analytics state reset");
    }

    fn ensure_initialized(&self) -> Result<(), AnalyticsError> {
        if self.initialized_for.is_none() {
            return Err(AnalyticsError::NotInitialized);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CardioRow, StrengthRow};
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 8, 0, 0).unwrap()
    }

    struct StubBackend {
        strength: Vec<StrengthRow>,
        cardio: Vec<CardioRow>,
        fail_strength: bool,
    }

    impl StubBackend {
        fn empty() -> Self {
            Self {
                strength: Vec::new(),
                cardio: Vec::new(),
                fail_strength: false,
            }
        }
    }

    #[async_trait]
    impl WorkoutBackend for StubBackend {
        async fn load_strength_rows(&self, _user_id: Uuid) -> Result<Vec<StrengthRow>> {
            if self.fail_strength {
                anyhow::bail!("backend unavailable");
            }
            Ok(self.strength.clone())
        }

        async fn load_cardio_rows(&self, _user_id: Uuid) -> Result<Vec<CardioRow>> {
            Ok(self.cardio.clone())
        }
    }

    fn strength_row(name: &str, weight: f64, reps: u32, sets: u32, d: u32) -> StrengthRow {
        StrengthRow {
            exercise_name: name.to_string(),
            weight,
            reps,
            sets,
            date: Some(day(d)),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_queries_require_initialization() {
        let analytics = WorkoutAnalytics::new(Box::new(StubBackend::empty()));
        assert!(matches!(
            analytics.feedback(None),
            Err(AnalyticsError::NotInitialized)
        ));
        assert!(matches!(
            analytics.dashboard_analytics(),
            Err(AnalyticsError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent_per_user() {
        let backend = StubBackend {
            strength: vec![strength_row("Squat", 100.0, 5, 3, 1)],
            cardio: Vec::new(),
            fail_strength: false,
        };
        let mut analytics = WorkoutAnalytics::new(Box::new(backend));
        let user = Uuid::new_v4();

        analytics.initialize(user).await;
        assert_eq!(analytics.history().total_sessions(), 1);

        // Mutate, then re-initialize for the same user: must be a no-op.
        analytics.log_session("Squat", 102.5, 5, 3, day(2));
        analytics.initialize(user).await;
        assert_eq!(analytics.history().total_sessions(), 2);

        // A different user reloads destructively.
        analytics.initialize(Uuid::new_v4()).await;
        assert_eq!(analytics.history().total_sessions(), 1);
    }

    #[tokio::test]
    async fn test_failed_source_degrades_to_empty() {
        let backend = StubBackend {
            strength: vec![strength_row("Squat", 100.0, 5, 3, 1)],
            cardio: vec![CardioRow {
                muscle_group: "legs".to_string(),
                intensity: Some("high".to_string()),
                duration: 40.0,
                date: Some(day(14)),
                created_at: None,
            }],
            fail_strength: true,
        };
        let mut analytics = WorkoutAnalytics::new(Box::new(backend));
        analytics.initialize(Uuid::new_v4()).await;

        // Strength failed and stayed empty; cardio still loaded.
        assert!(analytics.history().is_empty());
        assert_eq!(analytics.training_log().len(), 1);
        assert!(analytics.feedback_at(None, day(15)).is_ok());
    }

    #[tokio::test]
    async fn test_rows_without_dates_are_skipped() {
        let backend = StubBackend {
            strength: vec![
                strength_row("Squat", 100.0, 5, 3, 1),
                StrengthRow {
                    exercise_name: "Squat".to_string(),
                    weight: 95.0,
                    reps: 5,
                    sets: 3,
                    date: None,
                    created_at: None,
                },
            ],
            cardio: Vec::new(),
            fail_strength: false,
        };
        let mut analytics = WorkoutAnalytics::new(Box::new(backend));
        analytics.initialize(Uuid::new_v4()).await;
        assert_eq!(analytics.history().total_sessions(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let backend = StubBackend {
            strength: vec![strength_row("Squat", 100.0, 5, 3, 1)],
            cardio: Vec::new(),
            fail_strength: false,
        };
        let mut analytics = WorkoutAnalytics::new(Box::new(backend));
        analytics.initialize(Uuid::new_v4()).await;
        analytics.reset();

        assert!(analytics.history().is_empty());
        assert!(analytics.training_log().is_empty());
        assert!(matches!(
            analytics.feedback(None),
            Err(AnalyticsError::NotInitialized)
        ));
    }
}
