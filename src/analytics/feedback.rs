//! Presentation-boundary formatting.
//!
//! Everything user-facing is rendered here, once, from the tagged results
//! the evaluators return. Items carry a machine-readable `kind` and
//! severity next to the emoji and message so the UI can filter without
//! parsing prose.

use serde::Serialize;

use super::overload::{PrRecord, Recommendation, StagnationSuggestion};
use super::recovery::{AdviceItem, AdviceKind, RestDecision, RestReason};
use super::stagnation::{Motivation, PlateauBreak, StagnationKind};
use super::{Metric, Severity};

/// Fixed advanced-technique hints appended to every stagnation suggestion.
pub const TECHNIQUE_HINTS: [&str; 3] = [
    "slow the tempo (3s down, 1s up)",
    "trim 15-30s off your rest periods",
    "rotate in a close variation for 2-3 weeks",
];

/// One renderable feedback entry.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackItem {
    /// Machine-readable category tag
    pub kind: &'static str,
    /// Severity for warnings; `None` for neutral/positive items
    pub severity: Option<Severity>,
    /// Emoji marker for compact UI surfaces
    pub emoji: &'static str,
    /// Human-readable message
    pub message: String,
}

impl FeedbackItem {
    fn new(kind: &'static str, emoji: &'static str, message: String) -> Self {
        Self {
            kind,
            severity: None,
            emoji,
            message,
        }
    }

    fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Format kilograms without a trailing `.0` for whole numbers.
fn kg(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn metric_name(metric: Metric) -> &'static str {
    match metric {
        Metric::Weight => "weight",
        Metric::Reps => "reps",
        Metric::Sets => "sets",
        Metric::Volume => "volume",
    }
}

/// Render a progressive-overload recommendation.
pub fn recommendation_item(exercise: &str, rec: &Recommendation) -> FeedbackItem {
    match rec {
        Recommendation::InsufficientData { sessions } => FeedbackItem::new(
            "insufficient_data",
            "📋",
            format!(
                "{}: log {} more session{} to unlock progression feedback.",
                exercise,
                2 - sessions.min(&1),
                if *sessions == 1 { "" } else { "s" }
            ),
        ),
        Recommendation::WeightIncrease {
            previous_kg,
            current_kg,
            percent,
        } => FeedbackItem::new(
            "weight_progress",
            "📈",
            format!(
                "{}: weight up from {} kg to {} kg (+{}%). Keep riding the wave.",
                exercise,
                kg(*previous_kg),
                kg(*current_kg),
                percent
            ),
        ),
        Recommendation::RepIncrease { previous, current } => FeedbackItem::new(
            "rep_progress",
            "💪",
            format!(
                "{}: {} reps, up from {}. Extra reps at the same load build the base for the next weight jump.",
                exercise, current, previous
            ),
        ),
        Recommendation::SetIncrease { previous, current } => FeedbackItem::new(
            "set_progress",
            "🔁",
            format!(
                "{}: {} sets, up from {}. More quality volume in the bank.",
                exercise, current, previous
            ),
        ),
        Recommendation::VolumeIncrease { percent, .. } => FeedbackItem::new(
            "volume_progress",
            "📊",
            format!(
                "{}: total volume up {}% on last session. Solid work.",
                exercise, percent
            ),
        ),
        Recommendation::Stagnation {
            sessions,
            suggestion,
        } => FeedbackItem::new(
            "stagnation",
            "🔄",
            format!(
                "{}: {} sessions at the same prescription. {}",
                exercise,
                sessions,
                suggestion_text(suggestion)
            ),
        )
        .with_severity(Severity::Medium),
        Recommendation::Consistent => FeedbackItem::new(
            "consistent",
            "✅",
            format!("{}: steady work. Consistency is what progress is built on.", exercise),
        ),
    }
}

/// Render the break-the-plateau suggestion. Always non-empty: the fixed
/// technique hints close every message.
pub fn suggestion_text(suggestion: &StagnationSuggestion) -> String {
    let mut parts = Vec::new();
    let (lo, hi) = suggestion.weight_increment_kg;
    parts.push(format!("Try adding {}-{} kg next session", kg(lo), kg(hi)));
    if suggestion.add_reps {
        parts.push(format!(
            "push past {} reps at the current weight",
            suggestion.current_reps
        ));
    }
    if suggestion.add_sets {
        parts.push(format!(
            "or add another set (currently {})",
            suggestion.current_sets
        ));
    }
    let mut text = parts.join(", ");
    text.push_str(". Also worth a shot: ");
    text.push_str(&TECHNIQUE_HINTS.join("; "));
    text.push('.');
    text
}

/// Render a standalone stagnation suggestion item.
pub fn suggestion_item(exercise: &str, suggestion: &StagnationSuggestion) -> FeedbackItem {
    FeedbackItem::new(
        "stagnation_suggestion",
        "🛠",
        format!("{}: {}", exercise, suggestion_text(suggestion)),
    )
}

/// Render a personal record.
pub fn pr_item(exercise: &str, record: &PrRecord) -> FeedbackItem {
    let message = match record.metric {
        Metric::Weight => format!(
            "New {} PR on {}: {} kg (previous best {} kg)!",
            metric_name(record.metric),
            exercise,
            kg(record.value),
            kg(record.previous_best)
        ),
        Metric::Reps => format!(
            "New rep PR on {}: {} reps (previous best {})!",
            exercise, record.value as u32, record.previous_best as u32
        ),
        _ => format!(
            "New {} PR on {}: {} (previous best {})!",
            metric_name(record.metric),
            exercise,
            kg(record.value),
            kg(record.previous_best)
        ),
    };
    FeedbackItem::new("personal_record", "🏆", message)
}

/// Render the first-ever session marker for an exercise.
pub fn first_session_item(exercise: &str) -> FeedbackItem {
    FeedbackItem::new(
        "first_session",
        "🌱",
        format!("First {} session logged. Every PR starts here.", exercise),
    )
}

/// Render a plateau-break celebration.
pub fn plateau_break_item(exercise: &str, pb: &PlateauBreak) -> FeedbackItem {
    let improved: Vec<String> = pb
        .improvements
        .iter()
        .map(|i| match i.metric {
            Metric::Weight => format!("weight {} → {} kg", kg(i.from), kg(i.to)),
            Metric::Reps => format!("reps {} → {}", i.from as u32, i.to as u32),
            Metric::Sets => format!("sets {} → {}", i.from as u32, i.to as u32),
            Metric::Volume => format!("volume {} → {}", kg(i.from), kg(i.to)),
        })
        .collect();
    FeedbackItem::new(
        "plateau_break",
        "🎉",
        format!(
            "Plateau broken on {} after {} flat sessions: {}!",
            exercise,
            pb.plateau_sessions,
            improved.join(", ")
        ),
    )
}

/// Render a stagnation detection on its own.
pub fn stagnation_item(exercise: &str, kind: StagnationKind, severity: Severity) -> FeedbackItem {
    let message = match kind {
        StagnationKind::Complete => format!(
            "{} has been completely flat: same weight, reps, and sets. Time to shake something up.",
            exercise
        ),
        StagnationKind::WeightOnly => format!(
            "{} weight hasn't moved even though reps and sets have. Consider a small weight bump.",
            exercise
        ),
        StagnationKind::Volume => format!(
            "{} volume has gone sideways. A deload or a new rep scheme can restart progress.",
            exercise
        ),
    };
    FeedbackItem::new("stagnation", "🔄", message).with_severity(severity)
}

/// Render the coaching mood line.
pub fn motivation_item(exercise: &str, motivation: &Motivation) -> FeedbackItem {
    match motivation {
        Motivation::GettingStarted { .. } => FeedbackItem::new(
            "motivation",
            "🌱",
            format!("{}: just getting started. Showing up is the hardest part.", exercise),
        ),
        Motivation::PlateauBroken { improvements } => FeedbackItem::new(
            "motivation",
            "🎉",
            format!(
                "{}: plateau smashed with {} metric{} improved!",
                exercise,
                improvements,
                if *improvements == 1 { "" } else { "s" }
            ),
        ),
        Motivation::Stagnating { .. } => FeedbackItem::new(
            "motivation",
            "🔄",
            format!(
                "{}: progress has stalled. Stalls end the session you change something.",
                exercise
            ),
        ),
        Motivation::OnStreak { sessions } => FeedbackItem::new(
            "motivation",
            "🔥",
            format!("{}: {} sessions of climbing volume in a row!", exercise, sessions),
        ),
        Motivation::Steady => FeedbackItem::new(
            "motivation",
            "✅",
            format!("{}: steady as she goes.", exercise),
        ),
    }
}

/// Render one weekly advice entry.
pub fn advice_item(item: &AdviceItem) -> FeedbackItem {
    let feedback = match &item.kind {
        AdviceKind::Overtraining {
            muscle_group,
            sessions,
        } => FeedbackItem::new(
            "overtraining",
            "⚠️",
            format!(
                "{} trained {} times this week, which is over the line. Give it 48h before the next session.",
                muscle_group, sessions
            ),
        ),
        AdviceKind::Undertraining { muscle_group } => FeedbackItem::new(
            "undertraining",
            "📉",
            format!(
                "Only one {} session this week. Two to three keeps it moving.",
                muscle_group
            ),
        ),
        AdviceKind::OptimalFrequency {
            muscle_group,
            sessions,
        } => FeedbackItem::new(
            "optimal_frequency",
            "🎯",
            format!(
                "{} hit {} times this week, right in the sweet spot.",
                muscle_group, sessions
            ),
        ),
        AdviceKind::NoRestDay => FeedbackItem::new(
            "no_rest_day",
            "🚨",
            "No rest day in the last week. Muscles grow while you recover. Schedule one now."
                .to_string(),
        ),
        AdviceKind::LowRest { rest_days } => FeedbackItem::new(
            "low_rest",
            "🛌",
            format!(
                "Only {} rest day this week. Aim for at least two.",
                rest_days
            ),
        ),
        AdviceKind::GoodRestBalance { rest_days } => FeedbackItem::new(
            "rest_balance",
            "⚖️",
            format!("{} rest days this week, a healthy balance.", rest_days),
        ),
        AdviceKind::HighVolume { sessions } => FeedbackItem::new(
            "high_volume",
            "📦",
            format!(
                "{} sessions in seven days is a heavy load. Watch for lingering fatigue.",
                sessions
            ),
        ),
        AdviceKind::HighIntensity { vigorous, total } => FeedbackItem::new(
            "high_intensity",
            "🔥",
            format!(
                "{} of {} sessions this week were high intensity. Mix in lighter work.",
                vigorous, total
            ),
        ),
        AdviceKind::Balanced => FeedbackItem::new(
            "balanced",
            "✨",
            "Training load looks balanced this week. Keep it up.".to_string(),
        ),
    };
    match item.severity {
        Some(severity) => feedback.with_severity(severity),
        None => feedback,
    }
}

/// Render the rest-or-train call.
pub fn rest_decision_item(decision: &RestDecision) -> FeedbackItem {
    match &decision.reason {
        RestReason::ConsecutiveHighIntensity => FeedbackItem::new(
            "rest_recommended",
            "🛌",
            "Two hard days back to back. Today is a rest day.".to_string(),
        )
        .with_severity(Severity::Medium),
        RestReason::RepeatedMuscleGroup { muscle_group } => FeedbackItem::new(
            "rest_recommended",
            "🛌",
            format!(
                "You've hit {} two days running. Let it recover today.",
                muscle_group
            ),
        )
        .with_severity(Severity::Medium),
        RestReason::WeeklyOverload { .. } => FeedbackItem::new(
            "rest_recommended",
            "🛌",
            "This week's load is already in the red. Take today off.".to_string(),
        )
        .with_severity(Severity::High),
        RestReason::Ready => FeedbackItem::new(
            "train_ready",
            "💪",
            "You're recovered and ready to train today.".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_increase_message() {
        let rec = Recommendation::WeightIncrease {
            previous_kg: 60.0,
            current_kg: 62.5,
            percent: 4.2,
        };
        let item = recommendation_item("Bench Press", &rec);
        assert_eq!(item.kind, "weight_progress");
        assert!(item.message.contains("60 kg"));
        assert!(item.message.contains("62.5 kg"));
        assert!(item.message.contains("+4.2%"));
    }

    #[test]
    fn test_suggestion_text_always_non_empty() {
        // Even with every optional bump disabled, the fixed hints remain.
        let suggestion = StagnationSuggestion {
            current_weight_kg: 100.0,
            current_reps: 15,
            current_sets: 5,
            weight_increment_kg: (2.5, 5.0),
            add_reps: false,
            add_sets: false,
        };
        let text = suggestion_text(&suggestion);
        assert!(!text.is_empty());
        assert!(text.contains("2.5-5 kg"));
        assert!(text.contains("tempo"));
    }

    #[test]
    fn test_advice_item_carries_severity_tag() {
        let advice = AdviceItem {
            kind: AdviceKind::NoRestDay,
            severity: Some(Severity::Critical),
        };
        let item = advice_item(&advice);
        assert_eq!(item.kind, "no_rest_day");
        assert_eq!(item.severity, Some(Severity::Critical));
        assert_eq!(item.emoji, "🚨");
    }

    #[test]
    fn test_items_serialize_with_machine_tags() {
        let item = first_session_item("Deadlift");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "first_session");
        assert_eq!(json["emoji"], "🌱");
        assert!(json["message"].as_str().unwrap().contains("Deadlift"));
    }
}
