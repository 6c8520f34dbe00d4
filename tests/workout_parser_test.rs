use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use training_plan::models::{DayContext, Quantity, StepKind, ZoneTable};
use training_plan::parser::WeekResolver;
use training_plan::{Category, DayCell, ParseError, ParserConfig, Workout, WorkoutParser, WorkoutStep, ZoneId};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 22).unwrap()
}

fn parse(text: &str) -> Vec<Workout> {
    let config = ParserConfig::default();
    WorkoutParser::new(&config).parse_text(text, monday()).unwrap()
}

fn step_summary(workout: &Workout) -> Vec<(StepKind, Quantity, Option<ZoneId>)> {
    workout
        .steps()
        .iter()
        .map(|step| (step.kind, step.quantity, step.zone))
        .collect()
}

#[test]
fn test_zone_table_lookup() {
    let table = ZoneTable::standard();
    let labels: Vec<(&str, u8)> = table.iter().map(|zone| (zone.label, zone.rpe)).collect();

    assert_eq!(
        labels,
        vec![
            ("Recovery", 1),
            ("Easy", 3),
            ("Tempo", 5),
            ("Threshold", 7),
            ("VO2 Max", 9),
            ("Sprint", 10),
        ]
    );
    assert_eq!(table.resolve("Z7"), Err(ParseError::UnknownZone("Z7".to_string())));
}

#[test]
fn test_time_intervals() {
    let workouts = parse("5x3:00 (60s) Z4");
    assert_eq!(workouts.len(), 1);

    let work = (StepKind::Work, Quantity::DurationSeconds(180), Some(ZoneId::Z4));
    let rest = (StepKind::Rest, Quantity::DurationSeconds(60), None);
    assert_eq!(
        step_summary(&workouts[0]),
        vec![work, rest, work, rest, work, rest, work, rest, work]
    );
    assert_eq!(workouts[0].total_duration_seconds(), Some(5 * 180 + 4 * 60));
    assert_eq!(workouts[0].total_distance_meters(), None);
}

#[test]
fn test_distance_intervals_with_zone_range() {
    let workouts = parse("10x1km (60s) Z3-Z4");
    let workout = &workouts[0];

    let zones: Vec<Option<ZoneId>> = workout.work_steps().map(|step| step.zone).collect();
    assert_eq!(&zones[..5], &[Some(ZoneId::Z3); 5]);
    assert_eq!(&zones[5..], &[Some(ZoneId::Z4); 5]);

    assert!(workout
        .work_steps()
        .all(|step| step.quantity == Quantity::DistanceMeters(1000)));
    assert!(workout
        .rest_steps()
        .all(|step| step.quantity == Quantity::DurationSeconds(60)));
    assert_eq!(workout.rest_steps().count(), 9);
    assert_eq!(workout.total_distance_meters(), Some(10_000));
    assert_eq!(workout.total_duration_seconds(), Some(9 * 60));
}

#[test]
fn test_descending_zone_range_starts_low() {
    let workouts = parse("4x1km (60s) Z4-Z3");

    let zones: Vec<Option<ZoneId>> = workouts[0].work_steps().map(|step| step.zone).collect();
    assert_eq!(
        zones,
        vec![Some(ZoneId::Z3), Some(ZoneId::Z3), Some(ZoneId::Z4), Some(ZoneId::Z4)]
    );
}

#[test]
fn test_progression_run() {
    let workouts = parse("15km progression run");
    let workout = &workouts[0];

    assert_eq!(workout.steps().len(), 3);
    assert_eq!(workout.rest_steps().count(), 0);
    assert!(workout
        .steps()
        .iter()
        .all(|step| step.quantity == Quantity::DistanceMeters(5000)));

    let zones: Vec<ZoneId> = workout.steps().iter().filter_map(|step| step.zone).collect();
    assert!(zones.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(workout.total_distance_meters(), Some(15_000));
    assert_eq!(workout.total_duration_seconds(), None);
}

#[test]
fn test_compound_cell() {
    let workouts = parse("Recovery 30 mins and Leg Strength");

    assert_eq!(workouts.len(), 2);
    assert!(workouts.iter().all(|workout| workout.date() == monday()));

    assert_eq!(workouts[0].category(), Category::Run);
    assert_eq!(
        step_summary(&workouts[0]),
        vec![(StepKind::Work, Quantity::DurationSeconds(1800), Some(ZoneId::Z1))]
    );

    assert_eq!(workouts[1].category(), Category::Strength);
    assert_eq!(workouts[1].steps(), &[WorkoutStep::placeholder()]);
    assert_eq!(workouts[1].total_duration_seconds(), None);
}

#[test]
fn test_hill_repeats_with_described_rest() {
    let workouts = parse("8x60s hills (steady jog back) Z4");
    let workout = &workouts[0];

    assert_eq!(workout.work_steps().count(), 8);
    assert_eq!(workout.rest_steps().count(), 7);
    assert!(workout
        .rest_steps()
        .all(|step| step.quantity == Quantity::Untimed && step.note.is_some()));
    // untimed rests do not count
    assert_eq!(workout.total_duration_seconds(), Some(480));
}

#[test]
fn test_long_run_including_intervals_keeps_total() {
    let workouts = parse("90 mins inc. 3x10 mins Z3");
    assert_eq!(workouts[0].total_duration_seconds(), Some(90 * 60));
}

#[test]
fn test_simple_format_cell() {
    let config = ParserConfig::default();
    let parsed = WorkoutParser::new(&config)
        .parse_cell(&DayCell::single("Easy: 40 mins"), &DayContext::new(monday()))
        .unwrap()
        .unwrap();
    let workouts = parsed.workouts.into_vec();

    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].title(), "Easy");
    assert_eq!(workouts[0].description(), "Easy: 40 mins");
    assert_eq!(
        step_summary(&workouts[0]),
        vec![(StepKind::Work, Quantity::DurationSeconds(2400), Some(ZoneId::Z2))]
    );
}

#[test]
fn test_week_header_resolution() {
    let resolver = WeekResolver::new(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    let week = resolver.resolve_week("Week 1\n22 Dec - 28 Dec").unwrap();

    assert_eq!(week.start, NaiveDate::from_ymd_opt(2025, 12, 22).unwrap());
    assert_eq!(week.end, NaiveDate::from_ymd_opt(2025, 12, 28).unwrap());

    let days: Vec<NaiveDate> = training_plan::parser::DAYS
        .iter()
        .map(|day| training_plan::parser::day_date(week.start, *day))
        .collect();
    assert_eq!(days.first(), Some(&week.start));
    assert_eq!(days.last(), Some(&week.end));
}

#[test]
fn test_failures_are_typed() {
    let config = ParserConfig::default();
    let parser = WorkoutParser::new(&config);

    assert_eq!(
        parser.parse_text("4x1km (90s) Z7", monday()),
        Err(ParseError::UnknownZone("Z7".to_string()))
    );
    assert!(matches!(
        parser.parse_text("Physio appointment", monday()),
        Err(ParseError::UnrecognizedFormat(_))
    ));
}

#[test]
fn test_workout_serializes_for_upload() {
    let workouts = parse("5x3:00 (60s) Z4");
    let json = serde_json::to_value(&workouts[0]).unwrap();

    assert_eq!(json["date"], "2025-12-22");
    assert_eq!(json["category"], "RUN");
    assert_eq!(json["total_duration_seconds"], 1140);
    assert_eq!(json["total_distance_meters"], serde_json::Value::Null);
    assert_eq!(
        json["steps"][0],
        serde_json::json!({
            "kind": "WORK",
            "duration_seconds": 180,
            "distance_meters": null,
            "zone_id": "Z4",
        })
    );
    assert_eq!(
        json["steps"][1],
        serde_json::json!({
            "kind": "REST",
            "duration_seconds": 60,
            "distance_meters": null,
            "zone_id": null,
        })
    );
}

#[test]
fn test_step_records_are_flat() {
    let distance = serde_json::to_value(&parse("10x1km (60s) Z3-Z4")[0]).unwrap();
    assert_eq!(
        distance["steps"][0],
        serde_json::json!({
            "kind": "WORK",
            "duration_seconds": null,
            "distance_meters": 1000,
            "zone_id": "Z3",
        })
    );

    let strength = serde_json::to_value(&parse("Leg Strength")[0]).unwrap();
    assert_eq!(strength["category"], "STRENGTH");
    assert_eq!(
        strength["steps"],
        serde_json::json!([{
            "kind": "WORK",
            "duration_seconds": null,
            "distance_meters": null,
            "zone_id": null,
        }])
    );

    let hills = serde_json::to_value(&parse("8x60s hills (steady jog back) Z4")[0]).unwrap();
    assert_eq!(hills["steps"][1]["note"], "steady jog back");
    assert_eq!(hills["steps"][1]["duration_seconds"], serde_json::Value::Null);
    assert!(hills["steps"][0].get("note").is_none());
}
