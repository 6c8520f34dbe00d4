use chrono::{NaiveDate, Weekday};
use pretty_assertions::assert_eq;

use training_plan::models::PlanDiagnostics;
use training_plan::{Category, ParsedPlan, ParserConfig, PlanBuilderService, PlanStatus, SheetLayoutService};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn rows(table: &[&[&str]]) -> Vec<Vec<String>> {
    table
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn build(config: &ParserConfig, table: &[&[&str]]) -> ParsedPlan {
    let raw_weeks = SheetLayoutService::new().group_rows(&rows(table));
    PlanBuilderService::new(config, date(2025, 12, 1)).build(&raw_weeks)
}

#[test]
fn test_extensive_sheet() {
    let config = ParserConfig::default();
    let plan = build(
        &config,
        &[
            &["", "Week 1\n22 Dec - 28 Dec"],
            &[
                "",
                "Activity",
                "Recovery 30 mins and Leg Strength",
                "6x3:00 (90s) Z4",
                "Rest",
                "Easy 40 mins & Strides 5x10sec + 50sec rest",
                "Rest",
                "15km progression run",
                "Long 90 mins",
            ],
            &["", "Purpose", "", "VO2max", "", "", "", "", "Endurance"],
            &[
                "",
                "Session notes",
                "",
                "Interval session\n15 min warm up\n6x3:00 Z4 with 90 sec jog\n10 min cool down",
                "",
                "",
                "",
                "",
                "",
            ],
            &["", "Week 2\n29 Dec - 4 Jan"],
            &["", "Activity", "Easy 30 mins", "", "", "", "", "", "Half Marathon Race"],
        ],
    );

    assert_eq!(plan.status(), PlanStatus::Complete);
    assert_eq!(plan.diagnostics(), &PlanDiagnostics::default());

    let summary: Vec<(NaiveDate, Weekday, Category)> = plan
        .workouts()
        .map(|workout| (workout.date(), workout.weekday(), workout.category()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (date(2025, 12, 22), Weekday::Mon, Category::Run),
            (date(2025, 12, 22), Weekday::Mon, Category::Strength),
            (date(2025, 12, 23), Weekday::Tue, Category::Run),
            (date(2025, 12, 25), Weekday::Thu, Category::Run),
            (date(2025, 12, 27), Weekday::Sat, Category::Run),
            (date(2025, 12, 28), Weekday::Sun, Category::Run),
            (date(2025, 12, 29), Weekday::Mon, Category::Run),
            (date(2026, 1, 4), Weekday::Sun, Category::Race),
        ]
    );

    let tuesday = plan.workouts().nth(2).unwrap();
    assert_eq!(tuesday.purpose(), Some("VO2max"));
    assert_eq!(tuesday.total_duration_seconds(), Some(900 + 6 * 180 + 5 * 90 + 600));

    let weeks: Vec<(Option<u32>, NaiveDate, NaiveDate)> = plan
        .weeks()
        .iter()
        .map(|week| (week.week_number, week.start, week.end))
        .collect();
    assert_eq!(
        weeks,
        vec![
            (Some(1), date(2025, 12, 22), date(2025, 12, 28)),
            (Some(2), date(2025, 12, 29), date(2026, 1, 4)),
        ]
    );
}

#[test]
fn test_simple_sheet() {
    let config = ParserConfig::default();
    let plan = build(
        &config,
        &[
            &["", "Week 3 (Jan 5 - Jan 11)"],
            &[
                "",
                "",
                "Recovery: 30 mins",
                "Intervals: 5x3:00 (60s) Z4",
                "Rest",
                "Tempo: 3x10 mins (2 min jog)",
                "",
                "Easy: 40 mins",
                "Long Run: 90 mins",
            ],
        ],
    );

    let titles: Vec<&str> = plan.workouts().map(|workout| workout.title()).collect();
    assert_eq!(titles, vec!["Recovery", "Intervals", "Tempo", "Easy", "Long Run"]);
    assert_eq!(plan.weeks()[0].start, date(2026, 1, 5));
    assert!(plan.workouts().all(|workout| workout.week_number() == Some(3)));
}

#[test]
fn test_partial_plan_reports_losses() {
    let config = ParserConfig::default();
    let plan = build(
        &config,
        &[
            &["", "Week 1 (dates tbc)"],
            &["", "Activity", "Easy 30 mins"],
            &["", "Week 2\n29 Dec - 4 Jan"],
            &["", "Activity", "Yoga", "Easy 30 mins", "5x3:00 (60s) Z8"],
        ],
    );

    assert_eq!(plan.status(), PlanStatus::Partial);
    assert_eq!(plan.len(), 1);

    let diagnostics = plan.diagnostics();
    assert_eq!(diagnostics.skipped_weeks, 1);
    let skipped: Vec<(&str, NaiveDate, bool)> = diagnostics
        .skipped_cells
        .iter()
        .map(|cell| (cell.text.as_str(), cell.date, cell.soft))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("Yoga", date(2025, 12, 29), true),
            ("5x3:00 (60s) Z8", date(2025, 12, 31), false),
        ]
    );
    assert_eq!(diagnostics.hard_skips().count(), 1);
}

#[test]
fn test_pinned_year() {
    let config = ParserConfig {
        plan_year: Some(2024),
        ..ParserConfig::default()
    };
    let plan = build(
        &config,
        &[&["", "Week 1\n23 Dec - 29 Dec"], &["", "Activity", "Easy 30 mins"]],
    );

    assert_eq!(plan.weeks()[0].start, date(2024, 12, 23));
}

#[test]
fn test_week_filter() {
    let config = ParserConfig::default();
    let plan = build(
        &config,
        &[
            &["", "Week 1\n22 Dec - 28 Dec"],
            &["", "Activity", "Easy 30 mins"],
            &["", "Week 2\n29 Dec - 4 Jan"],
            &["", "Activity", "Easy 40 mins"],
        ],
    )
    .retain_week(2);

    assert_eq!(plan.weeks().len(), 1);
    assert_eq!(plan.workouts().next().unwrap().total_duration_seconds(), Some(2400));
}

#[test]
fn test_sheet_without_weeks_is_empty() {
    let config = ParserConfig::default();
    let plan = build(&config, &[&["", "Plan notes"], &["", "Activity", "Easy 30 mins"]]);

    assert_eq!(plan.status(), PlanStatus::Empty);
}
