use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use training_plan::models::PlanDiagnostics;
use training_plan::{ParsedPlan, PlanBuilderService, PlanStatus, SheetLayoutService};

use super::display;
use crate::config::Config;

#[derive(Args)]
pub struct PreviewCommand {
    /// CSV export of the plan sheet (defaults to `sheet.csv_path` in the config)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Only show this program week
    #[arg(short, long)]
    week: Option<u32>,

    /// Reference date for inferring header years (YYYY-MM-DD, default today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Show every step of each workout
    #[arg(short, long)]
    steps: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PreviewReport<'p> {
    status: PlanStatus,
    #[serde(flatten)]
    plan: &'p ParsedPlan,
}

impl PreviewCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let path = self
            .csv
            .clone()
            .or_else(|| config.sheet.csv_path.clone())
            .context("No CSV given: pass --csv or set sheet.csv_path in the config")?;

        let rows = read_rows(&path)?;
        let raw_weeks = SheetLayoutService::new().group_rows(&rows);
        tracing::info!("Read {} rows, {} weeks from {}", rows.len(), raw_weeks.len(), path.display());

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let plan = PlanBuilderService::new(&config.parser, today).build(&raw_weeks);
        let plan = match self.week {
            Some(week) => plan.retain_week(week),
            None => plan,
        };

        if self.json {
            let report = PreviewReport {
                status: plan.status(),
                plan: &plan,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            self.print_plan(&plan);
        }

        if plan.status() == PlanStatus::Empty {
            bail!("No workouts found in {}", path.display());
        }
        Ok(())
    }

    fn print_plan(&self, plan: &ParsedPlan) {
        for week in plan.weeks() {
            let label = match week.week_number {
                Some(number) => format!("Week {}", number),
                None => "Week".to_string(),
            };
            println!(
                "{}  {} - {}",
                label.bold(),
                week.start.format("%d %b %Y"),
                week.end.format("%d %b %Y")
            );

            for workout in &week.workouts {
                display::print_workout(workout, self.steps);
            }
            println!();
        }

        println!("{} workouts", plan.len());
        print_diagnostics(plan.diagnostics());
    }
}

fn print_diagnostics(diagnostics: &PlanDiagnostics) {
    for header in &diagnostics.skipped_week_headers {
        eprintln!("{} skipped week {:?}", "warning:".yellow().bold(), header);
    }
    for cell in &diagnostics.skipped_cells {
        let label = if cell.soft {
            "note:".cyan().bold()
        } else {
            "warning:".yellow().bold()
        };
        eprintln!("{} skipped {} {:?}: {}", label, cell.date, cell.text, cell.reason);
    }
    if diagnostics.ambiguous_splits > 0 {
        eprintln!(
            "{} {} compound cells kept whole",
            "note:".cyan().bold(),
            diagnostics.ambiguous_splits
        );
    }
}

/// Read every row of a headerless, ragged CSV export.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read CSV row in {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_ragged_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ",\"Week 1\n22 Dec - 28 Dec\"").unwrap();
        writeln!(file, ",Activity,Easy 30 mins,Rest").unwrap();

        let rows = read_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "Week 1\n22 Dec - 28 Dec");
        assert_eq!(rows[1].len(), 4);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = read_rows(Path::new("/nonexistent/plan.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
