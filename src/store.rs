// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared session-history store.
//!
//! One [`ExerciseHistory`] and one [`TrainingLog`] per user session hold all
//! logged data; the evaluators in [`crate::analytics`] are stateless views
//! over them. The store is a derived, disposable cache of the backend:
//! [`ExerciseHistory::reload`] rebuilds it wholesale, and re-ingesting the
//! same rows reproduces the identical ordered sequence.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{SessionEntry, TrainingSession};

/// Per-exercise strength history, keyed by exercise name.
///
/// Keys are case-sensitive external identifiers with no normalization:
/// "Bench Press" and "bench press" are distinct histories. The backend is
/// the system of record for spellings; merging them here would fabricate
/// history the backend does not have.
#[derive(Debug, Clone, Default)]
pub struct ExerciseHistory {
    exercises: HashMap<String, Vec<SessionEntry>>,
}

impl ExerciseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session and restore the ascending-by-date order. The sort is
    /// stable: entries sharing a date keep insertion order.
    pub fn log_session(&mut self, exercise: &str, entry: SessionEntry) {
        let entries = self.exercises.entry(exercise.to_string()).or_default();
        entries.push(entry);
        entries.sort_by_key(|e| e.date);
    }

    /// Destructively rebuild the store from row data. Idempotent under
    /// re-ingestion of the same input.
    pub fn reload<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = (String, SessionEntry)>,
    {
        self.exercises.clear();
        for (exercise, entry) in rows {
            self.exercises.entry(exercise).or_default().push(entry);
        }
        for entries in self.exercises.values_mut() {
            entries.sort_by_key(|e| e.date);
        }
    }

    /// Entries for an exercise, oldest first. Unknown names yield an empty
    /// slice, never an error.
    pub fn entries(&self, exercise: &str) -> &[SessionEntry] {
        self.exercises
            .get(exercise)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Exercise names currently tracked, in arbitrary order.
    pub fn exercises(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }

    pub fn total_sessions(&self) -> usize {
        self.exercises.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn clear(&mut self) {
        self.exercises.clear();
    }
}

/// Single chronological log of training sessions across all muscle groups,
/// consumed by the recovery evaluator.
#[derive(Debug, Clone, Default)]
pub struct TrainingLog {
    sessions: Vec<TrainingSession>,
}

impl TrainingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_session(&mut self, session: TrainingSession) {
        self.sessions.push(session);
        self.sessions.sort_by_key(|s| s.date);
    }

    /// Destructively rebuild the log from row data.
    pub fn reload<I>(&mut self, sessions: I)
    where
        I: IntoIterator<Item = TrainingSession>,
    {
        self.sessions = sessions.into_iter().collect();
        self.sessions.sort_by_key(|s| s.date);
    }

    /// All sessions, oldest first.
    pub fn sessions(&self) -> &[TrainingSession] {
        &self.sessions
    }

    /// Sessions whose calendar date falls within the trailing `days` window
    /// ending at `as_of` (inclusive of `as_of`'s date, exclusive of the
    /// future).
    pub fn sessions_in_window(&self, as_of: DateTime<Utc>, days: u64) -> Vec<&TrainingSession> {
        let today = as_of.date_naive();
        let start = today - chrono::Days::new(days.saturating_sub(1));
        self.sessions
            .iter()
            .filter(|s| {
                let d = s.date.date_naive();
                d >= start && d <= today
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Intensity;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_entries_sorted_by_date_after_out_of_order_insert() {
        let mut history = ExerciseHistory::new();
        history.log_session("Squat", SessionEntry::new(100.0, 5, 3, day(10)));
        history.log_session("Squat", SessionEntry::new(90.0, 5, 3, day(3)));
        history.log_session("Squat", SessionEntry::new(95.0, 5, 3, day(7)));

        let weights: Vec<f64> = history
            .entries("Squat")
            .iter()
            .map(|e| e.weight_kg)
            .collect();
        assert_eq!(weights, vec![90.0, 95.0, 100.0]);
    }

    #[test]
    fn test_duplicate_dates_keep_insertion_order() {
        let mut history = ExerciseHistory::new();
        history.log_session("Row", SessionEntry::new(50.0, 10, 3, day(5)));
        history.log_session("Row", SessionEntry::new(52.5, 10, 3, day(5)));

        let weights: Vec<f64> = history.entries("Row").iter().map(|e| e.weight_kg).collect();
        assert_eq!(weights, vec![50.0, 52.5]);
    }

    #[test]
    fn test_exercise_names_are_case_sensitive() {
        let mut history = ExerciseHistory::new();
        history.log_session("Bench Press", SessionEntry::new(60.0, 8, 3, day(1)));
        history.log_session("bench press", SessionEntry::new(40.0, 8, 3, day(1)));

        assert_eq!(history.entries("Bench Press").len(), 1);
        assert_eq!(history.entries("bench press").len(), 1);
        assert_eq!(history.exercise_count(), 2);
    }

    #[test]
    fn test_unknown_exercise_is_empty_slice() {
        let history = ExerciseHistory::new();
        assert!(history.entries("Deadlift").is_empty());
    }

    #[test]
    fn test_reload_is_idempotent() {
        let rows = vec![
            ("Squat".to_string(), SessionEntry::new(100.0, 5, 3, day(10))),
            ("Squat".to_string(), SessionEntry::new(90.0, 5, 3, day(3))),
            ("Bench Press".to_string(), SessionEntry::new(60.0, 8, 3, day(4))),
        ];

        let mut history = ExerciseHistory::new();
        history.reload(rows.clone());
        let first: Vec<SessionEntry> = history.entries("Squat").to_vec();

        history.reload(rows);
        assert_eq!(history.entries("Squat"), first.as_slice());
        assert_eq!(history.total_sessions(), 3);
    }

    #[test]
    fn test_training_log_window_excludes_future_and_stale() {
        let mut log = TrainingLog::new();
        log.log_session(TrainingSession::new("legs", day(1), Intensity::Moderate, 45.0));
        log.log_session(TrainingSession::new("back", day(9), Intensity::Moderate, 45.0));
        log.log_session(TrainingSession::new("chest", day(15), Intensity::Moderate, 45.0));
        log.log_session(TrainingSession::new("arms", day(20), Intensity::Moderate, 45.0));

        // Window of 7 days ending March 15: March 9..=15.
        let window = log.sessions_in_window(day(15), 7);
        let groups: Vec<&str> = window.iter().map(|s| s.muscle_group.as_str()).collect();
        assert_eq!(groups, vec!["back", "chest"]);
    }
}
