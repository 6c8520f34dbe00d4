use regex::Regex;
use serde::Serialize;

use super::compile;
use crate::errors::{ParseError, ParseResult};
use crate::models::{CellOrigin, DayCell};

/// Which grammar set a cell is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanFormat {
    /// One "<WorkoutType>: <description>" cell.
    Simple,
    /// Separate Activity / Purpose / Session-Notes rows.
    Extensive,
}

/// Workout types a simple-format cell may start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkoutType {
    Recovery,
    Easy,
    Intervals,
    HillIntervals,
    Tempo,
    Threshold,
    Sprints,
    LongRun,
}

impl WorkoutType {
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        let workout_type = match normalized.as_str() {
            "recovery" => Self::Recovery,
            "easy" => Self::Easy,
            "intervals" => Self::Intervals,
            "hill intervals" => Self::HillIntervals,
            "tempo" => Self::Tempo,
            "threshold" => Self::Threshold,
            "sprints" => Self::Sprints,
            "long run" => Self::LongRun,
            _ => return None,
        };
        Some(workout_type)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Recovery => "Recovery",
            Self::Easy => "Easy",
            Self::Intervals => "Intervals",
            Self::HillIntervals => "Hill Intervals",
            Self::Tempo => "Tempo",
            Self::Threshold => "Threshold",
            Self::Sprints => "Sprints",
            Self::LongRun => "Long Run",
        }
    }

    /// Keyword looked up in the keyword -> zone table.
    pub fn keyword(&self) -> String {
        self.label().to_lowercase()
    }
}

/// A simple-format cell split into its type and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCell<'a> {
    pub workout_type: WorkoutType,
    pub description: &'a str,
}

pub struct FormatDetector {
    simple_pattern: Regex,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector {
    pub fn new() -> Self {
        Self {
            simple_pattern: compile(
                r"(?is)^\s*(recovery|easy|hill\s+intervals|intervals|tempo|threshold|sprints|long\s+run)\s*:\s*(.*?)\s*$",
            ),
        }
    }

    pub fn detect(&self, cell: &DayCell) -> ParseResult<PlanFormat> {
        let has_extra_rows = cell.purpose.is_some() || cell.session_notes.is_some();

        if !has_extra_rows && self.split_simple(&cell.activity).is_some() {
            return Ok(PlanFormat::Simple);
        }

        match cell.origin {
            CellOrigin::ActivityRow if !cell.activity.trim().is_empty() => Ok(PlanFormat::Extensive),
            _ => Err(ParseError::UnrecognizedFormat(cell.activity.clone())),
        }
    }

    pub fn split_simple<'a>(&self, text: &'a str) -> Option<SimpleCell<'a>> {
        let caps = self.simple_pattern.captures(text)?;
        let workout_type = WorkoutType::from_label(caps.get(1)?.as_str())?;
        let description = caps.get(2)?.as_str();

        Some(SimpleCell {
            workout_type,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_simple() {
        let detector = FormatDetector::new();
        for text in [
            "Recovery: 30 mins",
            "Easy: 40 mins + strides",
            "Hill Intervals: 8x60s hills",
            "long run: 90 mins",
            "Intervals:\n5x3:00 (60s) Z4\n4x1:00 (60s) Z5",
        ] {
            assert_eq!(detector.detect(&DayCell::single(text)).unwrap(), PlanFormat::Simple, "{text}");
        }
    }

    #[test]
    fn test_split_simple() {
        let detector = FormatDetector::new();
        let cell = detector.split_simple("Hill  Intervals:  6x90s hills ").unwrap();
        assert_eq!(cell.workout_type, WorkoutType::HillIntervals);
        assert_eq!(cell.description, "6x90s hills");
    }

    #[test]
    fn test_detect_extensive() {
        let detector = FormatDetector::new();
        let plain = DayCell::new("10x1km (60s) Z3-Z4");
        assert_eq!(detector.detect(&plain).unwrap(), PlanFormat::Extensive);

        let prefixed_with_rows = DayCell::new("Tempo: 20 mins").with_purpose("Threshold work");
        assert_eq!(detector.detect(&prefixed_with_rows).unwrap(), PlanFormat::Extensive);
    }

    #[test]
    fn test_detect_unrecognized() {
        let detector = FormatDetector::new();
        assert!(matches!(
            detector.detect(&DayCell::single("Yoga: 30 mins")),
            Err(ParseError::UnrecognizedFormat(_))
        ));
        assert!(detector.detect(&DayCell::new("   ")).is_err());
    }
}
