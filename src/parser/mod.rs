//! Turns sheet cells into workouts: format detection, interval grammars,
//! zone resolution, step assembly and compound-cell splitting.

pub mod assembler;
pub mod format;
pub mod grammar;
pub mod session_notes;
pub mod splitter;
pub mod week;
pub mod zones;

pub use assembler::WorkoutAssembler;
pub use format::{FormatDetector, PlanFormat, SimpleCell, WorkoutType};
pub use grammar::{GrammarKind, GrammarSet, MatchResult, RestSpec, Segment, ZoneHint};
pub use session_notes::SessionNotesParser;
pub use splitter::{Clauses, SplitOutcome, WorkoutSplitter};
pub use week::{day_date, weekday_for_column, WeekRange, WeekResolver, DAYS};
pub use zones::ZoneResolver;

use chrono::NaiveDate;
use regex::Regex;

use crate::config::ParserConfig;
use crate::errors::{ParseError, ParseResult};
use crate::models::{Category, DayCell, DayContext, Workout, WorkoutStep, ZoneSpec};

pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

/// What one day cell parsed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCell {
    pub format: PlanFormat,
    pub workouts: SplitOutcome<Workout>,
    /// Soft problems that did not stop the cell from parsing.
    pub warnings: Vec<ParseError>,
}

/// Per-clause inputs shared by both halves of a compound cell.
struct ClauseContext<'c> {
    cell: &'c DayCell,
    day: &'c DayContext,
    format: PlanFormat,
    title: Option<&'static str>,
    zone: Option<ZoneSpec>,
}

/// Parses one day's cells into workouts.
pub struct WorkoutParser<'a> {
    config: &'a ParserConfig,
    detector: FormatDetector,
    grammars: GrammarSet,
    zones: ZoneResolver<'a>,
    notes: SessionNotesParser,
    assembler: WorkoutAssembler,
    splitter: WorkoutSplitter,
    strength_pattern: Regex,
    reps_pattern: Regex,
}

impl<'a> WorkoutParser<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self {
            config,
            detector: FormatDetector::new(),
            grammars: GrammarSet::new(config),
            zones: ZoneResolver::new(config),
            notes: SessionNotesParser::new(config),
            assembler: WorkoutAssembler,
            splitter: WorkoutSplitter::new(),
            strength_pattern: compile(r"(?i)\b(?:strength|weights?|gym|lifting)\b"),
            reps_pattern: compile(r"(?i)\d+\s*x"),
        }
    }

    /// Parse a day cell. Rest days give `Ok(None)`.
    pub fn parse_cell(&self, cell: &DayCell, day: &DayContext) -> ParseResult<Option<ParsedCell>> {
        if cell.is_rest_day() {
            return Ok(None);
        }

        let format = self.detector.detect(cell)?;
        let day = DayContext {
            purpose: day.purpose.clone().or_else(|| cell.purpose.clone()),
            ..day.clone()
        };

        let (body, context) = match format {
            PlanFormat::Simple => {
                let simple = self
                    .detector
                    .split_simple(&cell.activity)
                    .ok_or_else(|| ParseError::UnrecognizedFormat(cell.activity.clone()))?;
                let context = ClauseContext {
                    cell,
                    day: &day,
                    format,
                    title: Some(simple.workout_type.label()),
                    zone: Some(self.zones.resolve(&simple.workout_type.keyword())?),
                };
                (simple.description, context)
            }
            PlanFormat::Extensive => {
                let context = ClauseContext {
                    cell,
                    day: &day,
                    format,
                    title: None,
                    zone: cell.purpose.as_deref().and_then(|purpose| self.zones.keyword_in(purpose)),
                };
                (cell.activity.as_str(), context)
            }
        };

        let mut warnings = Vec::new();
        let workouts = match format {
            PlanFormat::Simple => SplitOutcome::Single(self.clause_workout(body, &context, true)?),
            PlanFormat::Extensive => self.split_extensive(body, &context, &mut warnings)?,
        };

        tracing::debug!(
            "{} parsed into {} workout(s)",
            day.date,
            if workouts.is_split() { 2 } else { 1 }
        );

        Ok(Some(ParsedCell {
            format,
            workouts,
            warnings,
        }))
    }

    /// Parse free text as an extensive-format activity on `date`.
    pub fn parse_text(&self, text: &str, date: NaiveDate) -> ParseResult<Vec<Workout>> {
        Ok(self
            .parse_cell(&DayCell::new(text), &DayContext::new(date))?
            .map(|parsed| parsed.workouts.into_vec())
            .unwrap_or_default())
    }

    fn split_extensive(
        &self,
        body: &str,
        context: &ClauseContext,
        warnings: &mut Vec<ParseError>,
    ) -> ParseResult<SplitOutcome<Workout>> {
        let text = grammar::normalize(body);

        if self.grammars.try_specific(&text).is_some() {
            return Ok(SplitOutcome::Single(self.clause_workout(&text, context, true)?));
        }

        match self.splitter.clauses(&text, |clause| self.is_matchable(clause)) {
            Clauses::Pair(first, second) => {
                let first = self.clause_workout(first, context, true)?;
                let notes_used = first.category() == Category::Run;
                let second = self.clause_workout(second, context, !notes_used)?;
                Ok(SplitOutcome::Split(first, second))
            }
            Clauses::Ambiguous(clauses) => {
                let error = ParseError::AmbiguousSplit {
                    text: text.clone(),
                    clauses,
                };
                tracing::warn!("{}; keeping the cell whole", error);
                warnings.push(error);
                Ok(SplitOutcome::Single(self.clause_workout(&text, context, true)?))
            }
            Clauses::Whole => Ok(SplitOutcome::Single(self.clause_workout(&text, context, true)?)),
        }
    }

    fn is_matchable(&self, clause: &str) -> bool {
        self.strength_pattern.is_match(clause) || self.grammars.try_match(clause).is_some()
    }

    fn clause_workout(&self, clause: &str, context: &ClauseContext, use_notes: bool) -> ParseResult<Workout> {
        let text = grammar::normalize(clause);
        let title = context.title.map(str::to_string).unwrap_or_else(|| text.clone());
        let description = context.cell.activity.trim();

        if self.grammars.is_race(&text) {
            return Ok(self.placeholder(context.day, Category::Race, &title, description));
        }

        let matched = match context.format {
            PlanFormat::Simple => self.simple_match(clause),
            PlanFormat::Extensive => self.grammars.try_match(&text),
        };

        // A strength clause has no run quantity of its own
        let has_run_quantity = matched.as_ref().is_some_and(|found| {
            found.grammar != GrammarKind::Plain
                || found.segments.iter().any(|segment| {
                    matches!(segment, Segment::Steady { quantity, .. } if !quantity.is_untimed())
                })
        });
        if !has_run_quantity && self.strength_pattern.is_match(&text) {
            return Ok(self.placeholder(context.day, Category::Strength, &title, description));
        }

        let mut matched = matched.ok_or_else(|| ParseError::UnrecognizedFormat(clause.trim().to_string()))?;

        if use_notes && context.format == PlanFormat::Extensive {
            if let Some(from_notes) = self.session_notes(context) {
                tracing::debug!("Session notes replace {:?} steps for {}", matched.grammar, context.day.date);
                matched = from_notes;
            }
        }

        if !grammar::within_bounds(&matched.segments) {
            tracing::debug!("Rejecting out-of-range repetitions or totals in {:?}", clause);
            return Err(ParseError::UnrecognizedFormat(clause.trim().to_string()));
        }

        let segments = self
            .zones
            .resolve_segments(&matched.segments, context.zone.as_ref(), matched.default_zone)?;

        Ok(self
            .assembler
            .assemble(context.day, Category::Run, &title, description, &segments))
    }

    fn session_notes(&self, context: &ClauseContext) -> Option<MatchResult> {
        let notes = context.cell.session_notes.as_deref()?;
        if !self
            .notes
            .applies_to(notes, &context.cell.activity, context.cell.purpose.as_deref())
        {
            return None;
        }
        self.notes.parse(notes, &self.grammars)
    }

    /// Simple descriptions may hold several blocks, one per line or joined
    /// by "+" when no repetitions are involved.
    fn simple_match(&self, description: &str) -> Option<MatchResult> {
        if let Some(found) = self.grammars.try_specific(description) {
            return Some(found);
        }

        let blocks: Vec<&str> = if description.contains('\n') {
            description.lines().map(str::trim).filter(|block| !block.is_empty()).collect()
        } else if !self.reps_pattern.is_match(description) {
            description.split('+').map(str::trim).filter(|block| !block.is_empty()).collect()
        } else {
            vec![description]
        };

        if blocks.len() <= 1 {
            return self.grammars.try_match(description);
        }

        let mut segments = Vec::new();
        let mut default_zone = None;
        for block in blocks {
            match self.grammars.try_match(block) {
                Some(found) => {
                    default_zone.get_or_insert(found.default_zone);
                    segments.extend(found.segments);
                }
                None => tracing::debug!("Skipping unrecognised block {:?}", block),
            }
        }

        if segments.is_empty() {
            return None;
        }

        Some(MatchResult {
            grammar: GrammarKind::MultiBlock,
            segments,
            default_zone: default_zone.unwrap_or(self.config.unknown_keyword_zone),
        })
    }

    fn placeholder(&self, day: &DayContext, category: Category, title: &str, description: &str) -> Workout {
        Workout::new(day, category, title, description, vec![WorkoutStep::placeholder()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quantity, StepKind, ZoneId};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 22).unwrap()
    }

    fn parse(text: &str) -> Vec<Workout> {
        let config = ParserConfig::default();
        WorkoutParser::new(&config).parse_text(text, monday()).unwrap()
    }

    fn parse_single_cell(text: &str) -> Workout {
        let config = ParserConfig::default();
        let parsed = WorkoutParser::new(&config)
            .parse_cell(&DayCell::single(text), &DayContext::new(monday()))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.format, PlanFormat::Simple);
        parsed.workouts.into_vec().remove(0)
    }

    #[test]
    fn test_time_intervals_end_to_end() {
        let workouts = parse("5x3:00 (60s) Z4");

        assert_eq!(workouts.len(), 1);
        let workout = &workouts[0];
        assert_eq!(workout.category(), Category::Run);
        assert_eq!(workout.work_steps().count(), 5);
        assert_eq!(workout.total_duration_seconds(), Some(1140));
        assert_eq!(workout.title(), "5x3:00 (60s) Z4");
    }

    #[test]
    fn test_compound_cell_splits() {
        let workouts = parse("Recovery 30 mins and Leg Strength");

        assert_eq!(workouts.len(), 2);
        assert_eq!(workouts[0].category(), Category::Run);
        assert_eq!(workouts[0].total_duration_seconds(), Some(1800));
        assert_eq!(workouts[0].steps()[0].zone, Some(ZoneId::Z1));
        assert_eq!(workouts[1].category(), Category::Strength);
        assert_eq!(workouts[1].title(), "Leg Strength");
        assert_eq!(workouts[1].steps(), &[WorkoutStep::placeholder()]);
    }

    #[test]
    fn test_strides_are_not_split() {
        let workouts = parse("Easy 40 mins & Strides 5x10sec + 50sec rest");

        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].work_steps().count(), 6);
        assert_eq!(workouts[0].total_duration_seconds(), Some(2400 + 5 * 10 + 4 * 50));
    }

    #[test]
    fn test_ambiguous_split_is_soft() {
        let config = ParserConfig::default();
        let parsed = WorkoutParser::new(&config)
            .parse_cell(
                &DayCell::new("Easy 30 mins and Core Strength and Leg Strength"),
                &DayContext::new(monday()),
            )
            .unwrap()
            .unwrap();

        assert!(!parsed.workouts.is_split());
        assert_matches!(
            parsed.warnings.as_slice(),
            [ParseError::AmbiguousSplit { clauses: 3, .. }]
        );
    }

    #[test]
    fn test_race_cell() {
        let workouts = parse("Half Marathon Race");

        assert_eq!(workouts[0].category(), Category::Race);
        assert_eq!(workouts[0].steps().len(), 1);
        assert_eq!(workouts[0].steps()[0].zone, None);
    }

    #[test]
    fn test_rest_day_has_no_workout() {
        assert!(parse("Rest").is_empty());
        assert!(parse("rest day").is_empty());
    }

    #[test]
    fn test_unknown_zone_fails_cell() {
        let config = ParserConfig::default();
        let result = WorkoutParser::new(&config).parse_text("5x3:00 (60s) Z9", monday());
        assert_eq!(result, Err(ParseError::UnknownZone("Z9".to_string())));
    }

    #[test]
    fn test_unrecognized_text() {
        let config = ParserConfig::default();
        let result = WorkoutParser::new(&config).parse_text("Foam roller", monday());
        assert_matches!(result, Err(ParseError::UnrecognizedFormat(_)));
    }

    #[test]
    fn test_out_of_range_repetitions_fail_cell() {
        let config = ParserConfig::default();
        let parser = WorkoutParser::new(&config);

        for text in [
            "2x99999999:00 Z4",
            "3x2000000km (60s) Z4",
            "1000000x1km",
            "0x3:00 (60s) Z4",
        ] {
            assert_matches!(
                parser.parse_text(text, monday()),
                Err(ParseError::UnrecognizedFormat(_)),
                "{}",
                text
            );
        }

        let at_cap = parser.parse_text("100x200m (30s) Z5", monday()).unwrap();
        assert_eq!(at_cap[0].work_steps().count(), 100);
        assert_matches!(
            parser.parse_text("101x200m (30s) Z5", monday()),
            Err(ParseError::UnrecognizedFormat(_))
        );
    }

    #[test]
    fn test_simple_format_uses_type_zone() {
        let workout = parse_single_cell("Tempo: 3x10 mins (2 min jog)");

        assert_eq!(workout.title(), "Tempo");
        assert!(workout.work_steps().all(|step| step.zone == Some(ZoneId::Z3)));
        assert_eq!(workout.total_duration_seconds(), Some(3 * 600 + 2 * 120));
    }

    #[test]
    fn test_simple_multi_block() {
        let workout = parse_single_cell("Intervals:\n5x3:00 (60s) Z4\n4x1:00 (60s) Z5");

        assert_eq!(workout.work_steps().count(), 9);
        // rest between the two blocks is kept
        assert_eq!(workout.rest_steps().count(), 4 + 1 + 3);
        let last = workout.steps().last().unwrap();
        assert_eq!((last.kind, last.zone), (StepKind::Work, Some(ZoneId::Z5)));
    }

    #[test]
    fn test_simple_plus_blocks_without_reps() {
        let workout = parse_single_cell("Long Run: 60 mins Z2 + 20 mins Z3");

        let quantities: Vec<(Quantity, Option<ZoneId>)> =
            workout.steps().iter().map(|step| (step.quantity, step.zone)).collect();
        assert_eq!(
            quantities,
            vec![
                (Quantity::minutes(60), Some(ZoneId::Z2)),
                (Quantity::minutes(20), Some(ZoneId::Z3)),
            ]
        );
    }

    #[test]
    fn test_session_notes_replace_activity_steps() {
        let config = ParserConfig::default();
        let cell = DayCell::new("6x3:00 (90s) Z4")
            .with_purpose("VO2max")
            .with_session_notes("Interval session\n15 min warm up\n6x3:00 Z4 with 90 sec jog\n10 min cool down");
        let parsed = WorkoutParser::new(&config)
            .parse_cell(&cell, &DayContext::new(monday()))
            .unwrap()
            .unwrap();
        let workout = parsed.workouts.into_vec().remove(0);

        assert_eq!(workout.purpose(), Some("VO2max"));
        assert_eq!(workout.steps().first().and_then(|step| step.note.as_deref()), Some("warm-up"));
        assert_eq!(
            workout.total_duration_seconds(),
            Some(900 + 6 * 180 + 5 * 90 + 600)
        );
    }

    #[test]
    fn test_recovery_ignores_session_notes() {
        let config = ParserConfig::default();
        let cell = DayCell::new("Recovery 30 mins").with_session_notes("10 min easy / 20 min steady");
        let parsed = WorkoutParser::new(&config)
            .parse_cell(&cell, &DayContext::new(monday()))
            .unwrap()
            .unwrap();

        assert_eq!(parsed.workouts.into_vec()[0].total_duration_seconds(), Some(1800));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "10x1km (60s) Z3-Z4";
        assert_eq!(parse(text), parse(text));
    }
}
