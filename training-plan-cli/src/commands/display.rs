use colored::{ColoredString, Colorize};

use training_plan::models::{Quantity, StepKind};
use training_plan::{Category, Workout, WorkoutStep};

/// "45:00", "1:30:00"
pub fn format_duration(seconds: u32) -> String {
    let (hours, minutes, seconds) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// "400 m", "10 km", "10.5 km"
pub fn format_distance(meters: u32) -> String {
    if meters < 1000 {
        format!("{} m", meters)
    } else if meters % 1000 == 0 {
        format!("{} km", meters / 1000)
    } else {
        format!("{:.1} km", f64::from(meters) / 1000.0)
    }
}

fn format_quantity(quantity: Quantity) -> String {
    match quantity {
        Quantity::DurationSeconds(seconds) => format_duration(seconds),
        Quantity::DistanceMeters(meters) => format_distance(meters),
        Quantity::Untimed => "untimed".to_string(),
    }
}

fn category_label(category: Category) -> ColoredString {
    let label = format!("{:<8}", category.to_string());
    match category {
        Category::Run => label.green(),
        Category::Strength => label.yellow(),
        Category::Race => label.red().bold(),
    }
}

pub fn step_line(step: &WorkoutStep) -> String {
    let mut line = match (step.kind, step.zone) {
        (StepKind::Rest, _) => format!("rest {}", format_quantity(step.quantity)),
        (StepKind::Work, Some(zone)) => format!("{} @ {}", format_quantity(step.quantity), zone),
        (StepKind::Work, None) => format_quantity(step.quantity),
    };
    if let Some(note) = &step.note {
        line.push_str(&format!(" ({})", note));
    }
    line
}

pub fn totals(workout: &Workout) -> String {
    let totals: Vec<String> = [
        workout.total_duration_seconds().map(format_duration),
        workout.total_distance_meters().map(format_distance),
    ]
    .into_iter()
    .flatten()
    .collect();

    if totals.is_empty() {
        "-".to_string()
    } else {
        totals.join(" + ")
    }
}

pub fn print_workout(workout: &Workout, show_steps: bool) {
    println!(
        "  {}  {}  {}  {}",
        workout.date().format("%a %d %b"),
        category_label(workout.category()),
        workout.title().bold(),
        totals(workout).dimmed()
    );

    if show_steps {
        for step in workout.steps() {
            println!("      {}", step_line(step));
        }
    }
}
