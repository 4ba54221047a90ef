// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Analytics Module
//!
//! Rule-based evaluators that turn the session store into coaching signals:
//!
//! - Progressive-overload recommendations ([`overload`])
//! - Stagnation and plateau-break detection ([`stagnation`])
//! - Rest and recovery scoring ([`recovery`])
//! - Orchestration over a backend ([`aggregator`])
//! - Presentation-boundary formatting ([`feedback`])
//!
//! Evaluators are stateless views over [`crate::store`]; their results are
//! tagged variants with structured fields, rendered to text only by
//! [`feedback`].

use serde::{Deserialize, Serialize};

pub mod aggregator;
pub mod feedback;
pub mod overload;
pub mod recovery;
pub mod stagnation;

pub use aggregator::{AnalyticsError, WorkoutAnalytics};
pub use feedback::FeedbackItem;

/// Severity attached to warnings and advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Direction of a metric over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

/// Session metric a record or improvement refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Weight,
    Reps,
    Sets,
    Volume,
}

/// Percentage delta from `previous` to `current`, rounded to one decimal.
/// A zero or non-finite baseline yields 0 rather than a division error.
pub(crate) fn percent_delta(previous: f64, current: f64) -> f64 {
    if !previous.is_finite() || previous <= 0.0 || !current.is_finite() {
        return 0.0;
    }
    ((current - previous) / previous * 1000.0).round() / 10.0
}
