use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::ParserConfig;
use crate::errors::ParseResult;
use crate::models::{DayContext, ParsedPlan, PlanDiagnostics, RawWeek, SkippedCell, WeekBlock, WeekPlan};
use crate::parser::{day_date, weekday_for_column, WeekResolver, WorkoutParser};

/// Builds a `ParsedPlan` from raw sheet weeks.
///
/// Failures never abort the build: a week whose header has no date range is
/// dropped, a cell that fails to parse is dropped, and both are recorded in
/// the plan diagnostics.
pub struct PlanBuilderService<'a> {
    resolver: WeekResolver,
    parser: WorkoutParser<'a>,
}

impl<'a> PlanBuilderService<'a> {
    /// `reference` anchors year inference for headers like "22 Dec - 28 Dec".
    pub fn new(config: &'a ParserConfig, reference: NaiveDate) -> Self {
        Self {
            resolver: WeekResolver::new(reference).with_year(config.plan_year),
            parser: WorkoutParser::new(config),
        }
    }

    pub fn parser(&self) -> &WorkoutParser<'a> {
        &self.parser
    }

    /// Attach calendar dates to a raw week's day cells.
    pub fn resolve_week(&self, raw: &RawWeek) -> ParseResult<WeekBlock> {
        let range = self.resolver.resolve_week(&raw.header)?;

        let days: BTreeMap<NaiveDate, _> = raw
            .days
            .iter()
            .enumerate()
            .filter_map(|(column, cell)| {
                let weekday = weekday_for_column(column)?;
                Some((day_date(range.start, weekday), cell.as_ref()?.clone()))
            })
            .collect();

        Ok(WeekBlock {
            week_number: range.week_number,
            start: range.start,
            end: range.end,
            days,
        })
    }

    pub fn build(&self, raw_weeks: &[RawWeek]) -> ParsedPlan {
        let mut diagnostics = PlanDiagnostics::default();
        let mut weeks = Vec::with_capacity(raw_weeks.len());

        for raw in raw_weeks {
            match self.resolve_week(raw) {
                Ok(block) => weeks.push(self.build_week(&block, &mut diagnostics)),
                Err(e) => {
                    warn!("Skipping week: {}", e);
                    diagnostics.skipped_weeks += 1;
                    diagnostics.skipped_week_headers.push(raw.header.clone());
                }
            }
        }

        let plan = ParsedPlan::new(weeks, diagnostics);
        info!(
            "Parsed {} workouts across {} weeks ({} weeks skipped, {} cells skipped of which {} invalid, {} ambiguous)",
            plan.len(),
            plan.weeks().len(),
            plan.diagnostics().skipped_weeks,
            plan.diagnostics().skipped_cells.len(),
            plan.diagnostics().hard_skips().count(),
            plan.diagnostics().ambiguous_splits
        );
        plan
    }

    /// Parse every day of a dated week, Monday to Sunday.
    pub fn build_week(&self, block: &WeekBlock, diagnostics: &mut PlanDiagnostics) -> WeekPlan {
        let mut workouts = Vec::new();

        for (date, cell) in &block.days {
            let day = DayContext {
                week_number: block.week_number,
                ..DayContext::new(*date)
            };

            match self.parser.parse_cell(cell, &day) {
                Ok(Some(parsed)) => {
                    diagnostics.ambiguous_splits += parsed.warnings.len();
                    workouts.extend(parsed.workouts.into_vec());
                }
                Ok(None) => debug!("{} is a rest day", date),
                Err(e) => {
                    let soft = e.is_soft();
                    if soft {
                        info!("Skipping {} cell {:?}: {}", date, cell.activity, e);
                    } else {
                        warn!("Skipping {} cell {:?}: {}", date, cell.activity, e);
                    }
                    diagnostics.skipped_cells.push(SkippedCell {
                        date: *date,
                        text: cell.activity.clone(),
                        reason: e.to_string(),
                        soft,
                    });
                }
            }
        }

        WeekPlan {
            week_number: block.week_number,
            start: block.start,
            end: block.end,
            workouts,
        }
    }
}
