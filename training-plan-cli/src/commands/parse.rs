use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;

use training_plan::WorkoutParser;

use super::display;
use crate::config::Config;

#[derive(Args)]
pub struct ParseCommand {
    /// Cell text, e.g. "5x3:00 (60s) Z4"
    text: String,

    /// Date to schedule the workout on (YYYY-MM-DD, default today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl ParseCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let parser = WorkoutParser::new(&config.parser);

        let workouts = parser
            .parse_text(&self.text, date)
            .with_context(|| format!("Failed to parse {:?}", self.text))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&workouts)?);
            return Ok(());
        }

        if workouts.is_empty() {
            println!("Rest day");
            return Ok(());
        }

        for workout in &workouts {
            display::print_workout(workout, true);
        }

        Ok(())
    }
}
