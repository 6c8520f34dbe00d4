use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::workout::Workout;

/// Where a day's text came from on the sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellOrigin {
    /// A row labelled "Activity", possibly with Purpose / Session-Notes rows.
    #[default]
    ActivityRow,
    /// An unlabelled row holding "<Type>: <description>" cells.
    SingleCell,
}

/// Raw text for one day: the Activity cell plus optional Purpose and
/// Session-Notes cells from the rows below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub activity: String,
    pub purpose: Option<String>,
    pub session_notes: Option<String>,
    #[serde(default)]
    pub origin: CellOrigin,
}

impl DayCell {
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            purpose: None,
            session_notes: None,
            origin: CellOrigin::ActivityRow,
        }
    }

    pub fn single(text: impl Into<String>) -> Self {
        Self {
            origin: CellOrigin::SingleCell,
            ..Self::new(text)
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = non_blank(purpose.into());
        self
    }

    pub fn with_session_notes(mut self, notes: impl Into<String>) -> Self {
        self.session_notes = non_blank(notes.into());
        self
    }

    /// Blank cells and "rest" / "rest day" carry no workout.
    pub fn is_rest_day(&self) -> bool {
        let activity = self.activity.trim().to_lowercase();
        activity.is_empty() || activity == "rest" || activity == "rest day"
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// A week as it comes off the sheet, before its dates are resolved.
/// `days[0]` is Monday, `days[6]` is Sunday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawWeek {
    pub header: String,
    pub days: [Option<DayCell>; 7],
}

impl RawWeek {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            days: Default::default(),
        }
    }

    pub fn with_day(mut self, column: usize, cell: DayCell) -> Self {
        if let Some(slot) = self.days.get_mut(column) {
            *slot = Some(cell);
        }
        self
    }
}

/// A week with resolved dates. Iteration over `days` runs Monday to Sunday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBlock {
    pub week_number: Option<u32>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: BTreeMap<NaiveDate, DayCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekPlan {
    pub week_number: Option<u32>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub workouts: Vec<Workout>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCell {
    pub date: NaiveDate,
    pub text: String,
    pub reason: String,
    /// Text no grammar recognised, as opposed to a recognised workout with
    /// invalid content such as an unknown zone.
    pub soft: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanDiagnostics {
    pub skipped_weeks: usize,
    pub skipped_week_headers: Vec<String>,
    pub skipped_cells: Vec<SkippedCell>,
    pub ambiguous_splits: usize,
}

impl PlanDiagnostics {
    pub fn has_losses(&self) -> bool {
        self.skipped_weeks > 0 || !self.skipped_cells.is_empty()
    }

    /// Skipped cells that looked like workouts but could not be built.
    pub fn hard_skips(&self) -> impl Iterator<Item = &SkippedCell> {
        self.skipped_cells.iter().filter(|cell| !cell.soft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// No workouts at all; callers report this as "no workouts found".
    Empty,
    /// Some weeks or cells were dropped.
    Partial,
    Complete,
}

/// Parser output: weeks in input order, workouts in date then column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedPlan {
    weeks: Vec<WeekPlan>,
    diagnostics: PlanDiagnostics,
}

impl ParsedPlan {
    pub fn new(weeks: Vec<WeekPlan>, diagnostics: PlanDiagnostics) -> Self {
        Self { weeks, diagnostics }
    }

    pub fn weeks(&self) -> &[WeekPlan] {
        &self.weeks
    }

    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.weeks.iter().flat_map(|week| week.workouts.iter())
    }

    pub fn len(&self) -> usize {
        self.weeks.iter().map(|week| week.workouts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn diagnostics(&self) -> &PlanDiagnostics {
        &self.diagnostics
    }

    pub fn status(&self) -> PlanStatus {
        if self.is_empty() {
            PlanStatus::Empty
        } else if self.diagnostics.has_losses() {
            PlanStatus::Partial
        } else {
            PlanStatus::Complete
        }
    }

    /// Keep only the week with the given program week number.
    pub fn retain_week(mut self, week_number: u32) -> Self {
        self.weeks.retain(|week| week.week_number == Some(week_number));
        self
    }
}
