// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures shared across the analytics engine. These models
//! provide a backend-agnostic representation of logged training data.
//!
//! ## Design Principles
//!
//! - **Invariants at construction**: volume is derived once, sets are at
//!   least 1, muscle groups are lowercased. Constructors enforce this so
//!   evaluators never have to
//! - **Graceful on bad input**: malformed numerics clamp to 0/defaults
//!   instead of failing
//! - **Serializable**: all models support JSON serialization for the
//!   presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged strength session for a single exercise.
///
/// Entries are kept sorted ascending by date inside
/// [`crate::store::ExerciseHistory`]. `volume` is always
/// `weight × reps × sets` as computed at construction and is never
/// independently mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Weight moved per rep, in kilograms (0 for bodyweight work)
    pub weight_kg: f64,
    /// Repetitions per set
    pub reps: u32,
    /// Number of sets (at least 1)
    pub sets: u32,
    /// When the session happened (UTC)
    pub date: DateTime<Utc>,
    /// Total training load: weight × reps × sets
    pub volume: f64,
}

impl SessionEntry {
    /// Build an entry, enforcing the model invariants: negative or
    /// non-finite weights degrade to 0, sets are clamped to at least 1,
    /// and volume is derived from the sanitized fields.
    pub fn new(weight_kg: f64, reps: u32, sets: u32, date: DateTime<Utc>) -> Self {
        let weight_kg = if weight_kg.is_finite() && weight_kg > 0.0 {
            weight_kg
        } else {
            0.0
        };
        let sets = sets.max(1);
        Self {
            weight_kg,
            reps,
            sets,
            date,
            volume: weight_kg * f64::from(reps) * f64::from(sets),
        }
    }

    /// True when this entry prescribes the same weight, reps, and sets as
    /// `other` (dates and volume are not compared).
    pub fn same_prescription(&self, other: &Self) -> bool {
        (self.weight_kg - other.weight_kg).abs() < f64::EPSILON
            && self.reps == other.reps
            && self.sets == other.sets
    }
}

/// Session intensity as reported by the tracking app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    Moderate,
    Vigorous,
}

impl Intensity {
    /// Lenient mapping from backend strings. Unknown values fall back to
    /// `Moderate` rather than failing the row.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "light" | "easy" | "low" => Self::Light,
            "vigorous" | "high" | "hard" | "intense" => Self::Vigorous,
            _ => Self::Moderate,
        }
    }
}

/// One logged training session in the recovery domain, tagged by muscle
/// group rather than keyed by exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Muscle group trained, lowercased at construction
    pub muscle_group: String,
    /// When the session happened (UTC)
    pub date: DateTime<Utc>,
    /// Reported intensity
    pub intensity: Intensity,
    /// Session length in minutes
    pub duration_minutes: f64,
}

impl TrainingSession {
    pub fn new(
        muscle_group: &str,
        date: DateTime<Utc>,
        intensity: Intensity,
        duration_minutes: f64,
    ) -> Self {
        let duration_minutes = if duration_minutes.is_finite() && duration_minutes > 0.0 {
            duration_minutes
        } else {
            0.0
        };
        Self {
            muscle_group: muscle_group.trim().to_lowercase(),
            date,
            intensity,
            duration_minutes,
        }
    }
}

/// A finished workout as handed over by the app for post-workout analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWorkout {
    /// Strength exercises performed, in order
    pub exercises: Vec<LoggedExercise>,
    /// Muscle groups this workout targeted
    pub muscle_groups: Vec<String>,
    /// Overall intensity of the workout
    pub intensity: Intensity,
    /// Total duration in minutes
    pub duration_minutes: f64,
    /// When the workout happened (UTC)
    pub date: DateTime<Utc>,
}

/// One exercise inside a [`CompletedWorkout`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedExercise {
    pub name: String,
    pub weight_kg: f64,
    pub reps: u32,
    pub sets: u32,
}
