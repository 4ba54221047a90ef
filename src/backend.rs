// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Read contract for the backing store.
//!
//! The engine never talks to a database or network itself; it consumes rows
//! through [`WorkoutBackend`]. Row shapes mirror what managed backends
//! typically return: aliased column names, missing numerics, and a creation
//! timestamp standing in for an absent session date.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source of historical workout rows for one user.
#[async_trait]
pub trait WorkoutBackend: Send + Sync {
    /// Structured strength-training rows (routine workouts with weights).
    async fn load_strength_rows(&self, user_id: Uuid) -> Result<Vec<StrengthRow>>;

    /// Cardio/recovery rows tagged by muscle group.
    async fn load_cardio_rows(&self, user_id: Uuid) -> Result<Vec<CardioRow>>;
}

fn default_sets() -> u32 {
    1
}

/// One strength-logging row as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthRow {
    /// Exercise name; some tables call the column `name`
    #[serde(alias = "name")]
    pub exercise_name: String,
    /// Weight in kilograms, 0 when missing
    #[serde(default)]
    pub weight: f64,
    /// Reps per set, 0 when missing
    #[serde(default)]
    pub reps: u32,
    /// Set count, 1 when missing
    #[serde(default = "default_sets")]
    pub sets: u32,
    /// Session date when the app recorded one
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Row creation timestamp, the date fallback
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl StrengthRow {
    /// Session date, falling back to the creation timestamp. Rows with
    /// neither are unplaceable on a timeline and get skipped at ingestion.
    pub fn resolved_date(&self) -> Option<DateTime<Utc>> {
        self.date.or(self.created_at)
    }
}

/// One cardio/recovery row as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardioRow {
    /// Muscle group; some tables call the column `body_parts`
    #[serde(alias = "body_parts")]
    pub muscle_group: String,
    /// Intensity label, parsed leniently ("high" counts as vigorous)
    #[serde(default)]
    pub intensity: Option<String>,
    /// Duration in minutes; some tables call the column `estimated_time`
    #[serde(default, alias = "estimated_time")]
    pub duration: f64,
    /// Session date when the app recorded one
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Row creation timestamp, the date fallback
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CardioRow {
    pub fn resolved_date(&self) -> Option<DateTime<Utc>> {
        self.date.or(self.created_at)
    }
}
