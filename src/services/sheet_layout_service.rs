use regex::Regex;

use crate::models::{DayCell, RawWeek};
use crate::parser::compile;

/// First day column; columns 2..=8 hold Monday..Sunday.
pub const FIRST_DAY_COLUMN: usize = 2;
const DAY_COLUMNS: usize = 7;

/// Groups raw sheet rows (CSV export or API values) into weeks.
///
/// Column 1 carries the row label: a week header ("Week 1\n22 Dec - 28
/// Dec"), "Activity", "Purpose" or "Session notes". A week in the simple
/// layout has no labels; its first row wide enough to hold all seven days
/// is the activity row.
pub struct SheetLayoutService {
    week_label: Regex,
    numbered_week: Regex,
    date_range: Regex,
}

impl Default for SheetLayoutService {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct WeekRows {
    header: String,
    activity: Option<[String; DAY_COLUMNS]>,
    purpose: Option<[String; DAY_COLUMNS]>,
    session_notes: Option<[String; DAY_COLUMNS]>,
    single_cells: bool,
}

impl WeekRows {
    fn new(header: &str) -> Self {
        Self {
            header: header.to_string(),
            activity: None,
            purpose: None,
            session_notes: None,
            single_cells: false,
        }
    }

    fn into_raw_week(self) -> RawWeek {
        let mut week = RawWeek::new(self.header);
        let Some(activity) = self.activity else {
            return week;
        };

        for (column, text) in activity.into_iter().enumerate() {
            if text.trim().is_empty() {
                continue;
            }

            let cell = if self.single_cells {
                DayCell::single(text)
            } else {
                DayCell::new(text)
            };
            let cell = match &self.purpose {
                Some(purpose) => cell.with_purpose(purpose[column].clone()),
                None => cell,
            };
            let cell = match &self.session_notes {
                Some(notes) => cell.with_session_notes(notes[column].clone()),
                None => cell,
            };
            week = week.with_day(column, cell);
        }
        week
    }
}

impl SheetLayoutService {
    pub fn new() -> Self {
        Self {
            week_label: compile(r"(?i)\bweek\b"),
            numbered_week: compile(r"(?i)^\s*week\s*\d"),
            date_range: compile(r"(?i)(?:\d{1,2}\s+[a-z]{3,9}|[a-z]{3,9}\s+\d{1,2})\s*-"),
        }
    }

    pub fn is_week_header(&self, label: &str) -> bool {
        self.week_label.is_match(label)
            && (self.numbered_week.is_match(label) || self.date_range.is_match(label))
    }

    pub fn group_rows(&self, rows: &[Vec<String>]) -> Vec<RawWeek> {
        let mut weeks = Vec::new();
        let mut current: Option<WeekRows> = None;

        for row in rows {
            let Some(label) = row.get(1).map(|label| label.trim()) else {
                continue;
            };

            if self.is_week_header(label) {
                if let Some(finished) = current.take() {
                    weeks.push(finished.into_raw_week());
                }
                current = Some(WeekRows::new(label));
                continue;
            }

            let Some(week) = current.as_mut() else {
                continue;
            };

            match label.to_lowercase().as_str() {
                "activity" | "activities" => week.activity = Some(day_cells(row)),
                "purpose" => week.purpose = Some(day_cells(row)),
                "session notes" | "session note" | "notes" => week.session_notes = Some(day_cells(row)),
                _ if week.activity.is_none() && row.len() >= FIRST_DAY_COLUMN + DAY_COLUMNS => {
                    week.activity = Some(day_cells(row));
                    week.single_cells = true;
                }
                other => tracing::debug!("Ignoring sheet row labelled {:?}", other),
            }
        }

        if let Some(finished) = current {
            weeks.push(finished.into_raw_week());
        }

        tracing::debug!("Grouped {} sheet rows into {} weeks", rows.len(), weeks.len());
        weeks
    }
}

fn day_cells(row: &[String]) -> [String; DAY_COLUMNS] {
    std::array::from_fn(|day| {
        row.get(FIRST_DAY_COLUMN + day)
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default()
    })
}
