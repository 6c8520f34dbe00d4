use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize, Serializer};

use super::zone::ZoneId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    Work,
    Rest,
}

/// How much of a step there is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    DurationSeconds(u32),
    DistanceMeters(u32),
    /// Placeholder (strength, race) or a rest described only in words.
    Untimed,
}

impl Quantity {
    pub fn minutes(minutes: u32) -> Self {
        Quantity::DurationSeconds(minutes.saturating_mul(60))
    }

    pub fn kilometers(km: f64) -> Self {
        Quantity::DistanceMeters((km * 1000.0).round() as u32)
    }

    pub fn is_untimed(&self) -> bool {
        matches!(self, Quantity::Untimed)
    }
}

/// One atomic unit of work or rest.
///
/// Serializes flat as `{kind, duration_seconds, distance_meters, zone_id}`
/// with `null` for whatever the step does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutStep {
    pub kind: StepKind,
    pub quantity: Quantity,
    /// Always `None` for rest steps and placeholders.
    pub zone: Option<ZoneId>,
    pub note: Option<String>,
}

#[derive(Serialize)]
struct StepRecord<'s> {
    kind: StepKind,
    duration_seconds: Option<u32>,
    distance_meters: Option<u32>,
    zone_id: Option<ZoneId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'s str>,
}

impl Serialize for WorkoutStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StepRecord {
            kind: self.kind,
            duration_seconds: self.duration_seconds(),
            distance_meters: self.distance_meters(),
            zone_id: self.zone,
            note: self.note.as_deref(),
        }
        .serialize(serializer)
    }
}

impl WorkoutStep {
    pub fn work(quantity: Quantity, zone: ZoneId) -> Self {
        Self {
            kind: StepKind::Work,
            quantity,
            zone: Some(zone),
            note: None,
        }
    }

    pub fn rest(quantity: Quantity) -> Self {
        Self {
            kind: StepKind::Rest,
            quantity,
            zone: None,
            note: None,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            kind: StepKind::Work,
            quantity: Quantity::Untimed,
            zone: None,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_rest(&self) -> bool {
        self.kind == StepKind::Rest
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        match self.quantity {
            Quantity::DurationSeconds(seconds) => Some(seconds),
            _ => None,
        }
    }

    pub fn distance_meters(&self) -> Option<u32> {
        match self.quantity {
            Quantity::DistanceMeters(meters) => Some(meters),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Run,
    Strength,
    Race,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run => write!(f, "RUN"),
            Self::Strength => write!(f, "STRENGTH"),
            Self::Race => write!(f, "RACE"),
        }
    }
}

/// Calendar slot a workout is assembled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayContext {
    pub date: NaiveDate,
    pub week_number: Option<u32>,
    pub purpose: Option<String>,
}

impl DayContext {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            week_number: None,
            purpose: None,
        }
    }
}

/// A fully assembled workout. Steps and aggregates are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workout {
    date: NaiveDate,
    weekday: Weekday,
    category: Category,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
    description: String,
    steps: Vec<WorkoutStep>,
    total_duration_seconds: Option<u32>,
    total_distance_meters: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    week_number: Option<u32>,
}

impl Workout {
    pub fn new(
        day: &DayContext,
        category: Category,
        title: impl Into<String>,
        description: impl Into<String>,
        steps: Vec<WorkoutStep>,
    ) -> Self {
        let total_duration_seconds = sum_present(steps.iter().map(WorkoutStep::duration_seconds));
        let total_distance_meters = sum_present(steps.iter().map(WorkoutStep::distance_meters));

        Self {
            date: day.date,
            weekday: day.date.weekday(),
            category,
            title: title.into(),
            purpose: day.purpose.clone(),
            description: description.into(),
            steps,
            total_duration_seconds,
            total_distance_meters,
            week_number: day.week_number,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    /// Raw cell text the workout was parsed from.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn steps(&self) -> &[WorkoutStep] {
        &self.steps
    }

    pub fn work_steps(&self) -> impl Iterator<Item = &WorkoutStep> {
        self.steps.iter().filter(|step| !step.is_rest())
    }

    pub fn rest_steps(&self) -> impl Iterator<Item = &WorkoutStep> {
        self.steps.iter().filter(|step| step.is_rest())
    }

    pub fn total_duration_seconds(&self) -> Option<u32> {
        self.total_duration_seconds
    }

    pub fn total_distance_meters(&self) -> Option<u32> {
        self.total_distance_meters
    }

    pub fn week_number(&self) -> Option<u32> {
        self.week_number
    }
}

fn sum_present(values: impl Iterator<Item = Option<u32>>) -> Option<u32> {
    values.flatten().fold(None, |total, value| Some(total.unwrap_or(0u32).saturating_add(value)))
}
