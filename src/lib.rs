// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Trainsight
//!
//! Workout analytics engine for fitness tracking applications. Trainsight
//! turns logged strength and cardio sessions into coaching feedback:
//! progressive-overload recommendations, stagnation and plateau-break
//! detection, and rest/recovery scoring.
//!
//! ## Features
//!
//! - **Calorie estimation**: MET-based energy expenditure with fuzzy
//!   activity-name matching and a strength-training variant
//! - **Progressive overload**: session-over-session comparison with a strict
//!   weight → reps → sets → volume priority chain
//! - **Stagnation detection**: windowed plateau classification by severity,
//!   plateau-break celebration, and notification throttling
//! - **Rest & recovery**: 7-day training-load summary, rest-day advice, and
//!   a 0-100 recovery score
//! - **Pluggable backend**: bulk-load history from any store implementing
//!   the [`backend::WorkoutBackend`] trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trainsight::analytics::WorkoutAnalytics;
//! use trainsight::backend::WorkoutBackend;
//! use uuid::Uuid;
//!
//! # async fn run(backend: Box<dyn WorkoutBackend>) -> anyhow::Result<()> {
//! let mut analytics = WorkoutAnalytics::new(backend);
//! analytics.initialize(Uuid::new_v4()).await;
//!
//! let report = analytics.feedback(Some("Bench Press"))?;
//! for item in &report.items {
//!     println!("{} {}", item.emoji, item.message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The crate follows a store-and-views design: one shared
//! [`store::ExerciseHistory`] and [`store::TrainingLog`] hold the session
//! data, and the evaluators in [`analytics`] are stateless views over them.
//! Results are tagged variants; human-readable messages are rendered once,
//! at the presentation boundary, by [`analytics::feedback`].

/// Rule-based evaluators and the orchestrating aggregator
pub mod analytics;

/// Read contract for the backing store (rows, trait)
pub mod backend;

/// MET-based calorie estimation
pub mod calories;

/// Threshold configuration with TOML loading
pub mod config;

/// Structured logging setup and domain event helpers
pub mod logging;

/// Core domain data models
pub mod models;

/// Shared session-history store
pub mod store;

pub use analytics::aggregator::{AnalyticsError, WorkoutAnalytics};
pub use calories::CalorieEstimator;
pub use config::AnalyticsConfig;
